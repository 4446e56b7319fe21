//! Contact operations and surname-based account linking.

use crate::model::contact::Contact;
use crate::model::record::{RecordId, RecordKind};
use crate::repo::record_store::{RecordStore, RepoError, RepoResult};
use crate::service::account_service::AccountService;
use log::info;
use std::collections::HashMap;

pub const SAMPLE_CONTACT_FIRST_NAME: &str = "John";
pub const SAMPLE_CONTACT_LAST_NAME: &str = "Doe";
pub const SAMPLE_CONTACT_EMAIL: &str = "john.doe@example.com";
pub const SAMPLE_CONTACT_PHONE: &str = "555-0100";

/// Contact operations over an injected record store.
pub struct ContactService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> ContactService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates the sample contact under `account_id` and returns its id.
    ///
    /// The account must already exist; the store rejects dangling references.
    pub fn create_contact_for_account(&self, account_id: RecordId) -> RepoResult<RecordId> {
        let mut contact = Contact::new(SAMPLE_CONTACT_LAST_NAME);
        contact.first_name = Some(SAMPLE_CONTACT_FIRST_NAME.to_string());
        contact.email = Some(SAMPLE_CONTACT_EMAIL.to_string());
        contact.phone = Some(SAMPLE_CONTACT_PHONE.to_string());
        contact.account_id = Some(account_id);

        let id = self.store.insert_one(&mut contact)?;
        info!(
            "event=contact_create module=service status=ok contact_id={id} account_id={account_id}"
        );
        Ok(id)
    }

    /// Renames an existing contact.
    pub fn update_contact_last_name(&self, contact_id: RecordId, last_name: &str) -> RepoResult<()> {
        let mut contact: Contact = self.store.require(contact_id)?;
        contact.last_name = last_name.to_string();
        self.store.update(std::slice::from_ref(&contact))?;

        info!("event=contact_rename module=service status=ok contact_id={contact_id}");
        Ok(())
    }

    /// Links every contact to the account named after its last name.
    ///
    /// # Contract
    /// - Each distinct last name is resolved once through find-or-create, so
    ///   repeated surnames in one batch share a single account.
    /// - All accounts exist before the contacts are upserted.
    /// - Contacts without ids are inserted; the rest are updated. Ids are
    ///   written back onto `contacts`.
    pub fn link_contacts_to_accounts(&self, contacts: &mut [Contact]) -> RepoResult<()> {
        let accounts = AccountService::new(&self.store);
        let mut account_ids: HashMap<String, RecordId> = HashMap::new();

        for contact in contacts.iter_mut() {
            let account_id = match account_ids.get(&contact.last_name) {
                Some(id) => *id,
                None => {
                    let account = accounts.find_or_create_account(&contact.last_name)?;
                    let id = account.id.ok_or(RepoError::MissingId(RecordKind::Account))?;
                    account_ids.insert(contact.last_name.clone(), id);
                    id
                }
            };
            contact.account_id = Some(account_id);
        }

        self.store.upsert(contacts, None)?;
        info!(
            "event=contact_link_accounts module=service status=ok contacts={} accounts={}",
            contacts.len(),
            account_ids.len()
        );
        Ok(())
    }
}
