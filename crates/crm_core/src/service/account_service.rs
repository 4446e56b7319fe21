//! Account operations, including find-or-create by name.
//!
//! # Invariants
//! - `find_or_create_account` never creates a second live account for a
//!   name that already has one.
//! - Returned accounts always carry their persisted id.

use crate::model::account::Account;
use crate::model::record::{FieldValue, RecordId};
use crate::repo::record_store::{RecordStore, RepoResult};
use log::info;

pub const DEFAULT_ACCOUNT_NAME: &str = "Cloud Code Academy";
pub const DEFAULT_ACCOUNT_INDUSTRY: &str = "Education";
pub const DEFAULT_ACCOUNT_EMPLOYEES: i64 = 50;
pub const DEFAULT_ACCOUNT_DESCRIPTION: &str = "Default account created by the sample operations";

/// Description written on accounts created by find-or-create.
pub const NEW_ACCOUNT_DESCRIPTION: &str = "New Account";
/// Description written on accounts found by find-or-create.
pub const UPDATED_ACCOUNT_DESCRIPTION: &str = "Updated Account";

/// Account operations over an injected record store.
pub struct AccountService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> AccountService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates the fixed sample account and returns its id.
    pub fn create_default_account(&self) -> RepoResult<RecordId> {
        let mut account = Account::new(DEFAULT_ACCOUNT_NAME);
        account.industry = Some(DEFAULT_ACCOUNT_INDUSTRY.to_string());
        account.number_of_employees = Some(DEFAULT_ACCOUNT_EMPLOYEES);
        account.description = Some(DEFAULT_ACCOUNT_DESCRIPTION.to_string());

        let id = self.store.insert_one(&mut account)?;
        info!("event=account_create_default module=service status=ok account_id={id}");
        Ok(id)
    }

    /// Creates an account with the given name and industry.
    pub fn create_account(&self, name: &str, industry: &str) -> RepoResult<()> {
        let mut account = Account::new(name);
        account.industry = Some(industry.to_string());

        let id = self.store.insert_one(&mut account)?;
        info!("event=account_create module=service status=ok account_id={id}");
        Ok(())
    }

    /// Replaces name and industry of an existing account.
    ///
    /// Returns `RepoError::NotFound` when `account_id` has no live account.
    pub fn update_account_fields(
        &self,
        account_id: RecordId,
        name: &str,
        industry: &str,
    ) -> RepoResult<()> {
        let mut account: Account = self.store.require(account_id)?;
        account.name = name.to_string();
        account.industry = Some(industry.to_string());
        self.store.update(std::slice::from_ref(&account))?;

        info!("event=account_update module=service status=ok account_id={account_id}");
        Ok(())
    }

    /// Returns the live account named `name`, creating it when missing.
    ///
    /// # Contract
    /// - Found: description becomes `"Updated Account"`.
    /// - Missing: a new account is created with description `"New Account"`.
    /// - Either way the account is persisted through one upsert, and the
    ///   returned value carries its id.
    pub fn find_or_create_account(&self, name: &str) -> RepoResult<Account> {
        let existing = self
            .store
            .query_by_field::<Account>(Account::NAME_FIELD, &FieldValue::from(name))?;

        let mut account = match existing.into_iter().next() {
            Some(mut found) => {
                found.description = Some(UPDATED_ACCOUNT_DESCRIPTION.to_string());
                found
            }
            None => {
                let mut created = Account::new(name);
                created.description = Some(NEW_ACCOUNT_DESCRIPTION.to_string());
                created
            }
        };

        let outcomes = self.store.upsert(std::slice::from_mut(&mut account), None)?;
        if let Some(outcome) = outcomes.first() {
            info!(
                "event=account_find_or_create module=service status=ok account_id={} created={}",
                outcome.id, outcome.created
            );
        }
        Ok(account)
    }
}
