//! Opportunity operations.
//!
//! # Invariants
//! - Close dates derived here are always "today + 3 months" for the
//!   service's clock.
//! - Opportunities built for an account are only persisted after that
//!   account exists.

use crate::model::opportunity::{Opportunity, OpportunityStage};
use crate::model::record::{FieldValue, RecordId, RecordKind};
use crate::repo::record_store::{RecordStore, RepoError, RepoResult};
use crate::service::account_service::AccountService;
use chrono::{Local, Months, NaiveDate};
use log::info;
use std::collections::{HashMap, HashSet};

/// Amount written by `normalize_opportunities`.
pub const NORMALIZED_AMOUNT: f64 = 50_000.0;
/// Stage written by `normalize_opportunities`.
pub const NORMALIZED_STAGE: OpportunityStage = OpportunityStage::Qualification;
/// Stage of opportunities built by `upsert_opportunities_for_account`.
pub const NEW_OPPORTUNITY_STAGE: OpportunityStage = OpportunityStage::Prospecting;

const CLOSE_DATE_OFFSET_MONTHS: u32 = 3;

/// Close date used for opportunities touched on `today`.
pub fn close_date_from(today: NaiveDate) -> NaiveDate {
    today
        .checked_add_months(Months::new(CLOSE_DATE_OFFSET_MONTHS))
        .unwrap_or(NaiveDate::MAX)
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Opportunity operations over an injected record store.
pub struct OpportunityService<S: RecordStore> {
    store: S,
    today: fn() -> NaiveDate,
}

impl<S: RecordStore> OpportunityService<S> {
    /// Creates a service whose clock is the local calendar date.
    pub fn new(store: S) -> Self {
        Self::with_today(store, local_today)
    }

    /// Creates a service with an explicit clock.
    pub fn with_today(store: S, today: fn() -> NaiveDate) -> Self {
        Self { store, today }
    }

    /// Moves an existing opportunity to `stage`.
    pub fn update_opportunity_stage(
        &self,
        opportunity_id: RecordId,
        stage: OpportunityStage,
    ) -> RepoResult<()> {
        let mut opportunity: Opportunity = self.store.require(opportunity_id)?;
        opportunity.stage = stage;
        self.store.update(std::slice::from_ref(&opportunity))?;

        info!(
            "event=opportunity_stage_update module=service status=ok opportunity_id={} stage={}",
            opportunity_id,
            stage.as_str()
        );
        Ok(())
    }

    /// Forces stage, close date and amount on every opportunity, then upserts
    /// them all. Ids are written back onto `opportunities`.
    pub fn normalize_opportunities(&self, opportunities: &mut [Opportunity]) -> RepoResult<()> {
        let close_date = close_date_from((self.today)());
        for opportunity in opportunities.iter_mut() {
            opportunity.stage = NORMALIZED_STAGE;
            opportunity.close_date = close_date;
            opportunity.amount = Some(NORMALIZED_AMOUNT);
        }

        let outcomes = self.store.upsert(opportunities, None)?;
        info!(
            "event=opportunity_normalize module=service status=ok count={} created={}",
            outcomes.len(),
            outcomes.iter().filter(|outcome| outcome.created).count()
        );
        Ok(())
    }

    /// Creates or updates one opportunity per name under the account named
    /// `account_name`, creating that account first when needed.
    ///
    /// # Contract
    /// - Every opportunity gets stage `Prospecting` and close date
    ///   today + 3 months.
    /// - A live opportunity with the same name under the same account is
    ///   updated instead of duplicated.
    /// - A name repeated in `opportunity_names` yields one opportunity.
    pub fn upsert_opportunities_for_account<N: AsRef<str>>(
        &self,
        account_name: &str,
        opportunity_names: &[N],
    ) -> RepoResult<()> {
        let account = AccountService::new(&self.store).find_or_create_account(account_name)?;
        let account_id = account
            .id
            .ok_or(RepoError::MissingId(RecordKind::Account))?;

        let existing: HashMap<String, RecordId> = self
            .store
            .query_by_field::<Opportunity>(
                Opportunity::ACCOUNT_ID_FIELD,
                &FieldValue::Reference(account_id),
            )?
            .into_iter()
            .filter_map(|opportunity| opportunity.id.map(|id| (opportunity.name, id)))
            .collect();

        let close_date = close_date_from((self.today)());
        let mut seen = HashSet::new();
        let mut opportunities: Vec<Opportunity> = opportunity_names
            .iter()
            .map(|name| name.as_ref())
            .filter(|name| seen.insert(*name))
            .map(|name| {
                let mut opportunity = Opportunity::new(name, NEW_OPPORTUNITY_STAGE, close_date);
                opportunity.account_id = Some(account_id);
                opportunity.id = existing.get(name).copied();
                opportunity
            })
            .collect();

        let outcomes = self.store.upsert(&mut opportunities, None)?;
        info!(
            "event=opportunity_upsert_for_account module=service status=ok account_id={} count={} created={}",
            account_id,
            outcomes.len(),
            outcomes.iter().filter(|outcome| outcome.created).count()
        );
        Ok(())
    }
}
