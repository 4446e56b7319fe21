//! Insert-then-delete lifecycles for leads and cases.
//!
//! # Invariants
//! - Records created here are deleted in the same call; none stay live.
//! - Empty input creates and deletes nothing and succeeds.

use crate::model::case::{Case, CaseStatus};
use crate::model::lead::{Lead, LeadStatus};
use crate::model::record::RecordId;
use crate::repo::record_store::{RecordStore, RepoResult};
use log::info;

pub const SAMPLE_LEAD_COMPANY: &str = "Cloud Code Academy";
pub const SAMPLE_LEAD_STATUS: LeadStatus = LeadStatus::OpenNotContacted;
pub const SAMPLE_CASE_STATUS: CaseStatus = CaseStatus::New;

/// Lead and case lifecycle operations over an injected record store.
pub struct LifecycleService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> LifecycleService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Inserts one lead per last name, then deletes them all.
    pub fn create_and_delete_leads<N: AsRef<str>>(&self, last_names: &[N]) -> RepoResult<()> {
        let mut leads: Vec<Lead> = last_names
            .iter()
            .map(|name| Lead::new(name.as_ref(), SAMPLE_LEAD_COMPANY, SAMPLE_LEAD_STATUS))
            .collect();

        self.store.insert(&mut leads)?;
        self.store.delete(&leads)?;

        info!(
            "event=lead_create_delete module=service status=ok count={}",
            leads.len()
        );
        Ok(())
    }

    /// Inserts `count` cases under `account_id`, then deletes them all.
    pub fn create_and_delete_cases(&self, account_id: RecordId, count: usize) -> RepoResult<()> {
        let mut cases: Vec<Case> = (1..=count)
            .map(|number| {
                let mut case = Case::new(SAMPLE_CASE_STATUS);
                case.subject = Some(format!("Sample case {number}"));
                case.account_id = Some(account_id);
                case
            })
            .collect();

        self.store.insert(&mut cases)?;
        self.store.delete(&cases)?;

        info!(
            "event=case_create_delete module=service status=ok account_id={account_id} count={}",
            cases.len()
        );
        Ok(())
    }
}
