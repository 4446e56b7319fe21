use crm_core::db::open_db_in_memory;
use crm_core::service::account_service::UPDATED_ACCOUNT_DESCRIPTION;
use crm_core::service::contact_service::{SAMPLE_CONTACT_EMAIL, SAMPLE_CONTACT_LAST_NAME};
use crm_core::{
    Account, AccountService, Contact, ContactService, FieldValue, RecordStore, RepoError,
    SqliteRecordStore,
};
use std::collections::HashSet;
use uuid::Uuid;

fn all_accounts(store: &SqliteRecordStore<'_>) -> Vec<Account> {
    // Every account created here has no industry.
    store
        .query_by_field(Account::INDUSTRY_FIELD, &FieldValue::Null)
        .unwrap()
}

#[test]
fn create_contact_for_account_links_sample_contact() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    let account_id = AccountService::new(&store)
        .find_or_create_account("Parent")
        .unwrap()
        .id
        .unwrap();

    let contact_id = ContactService::new(&store)
        .create_contact_for_account(account_id)
        .unwrap();

    let contact: Contact = store.require(contact_id).unwrap();
    assert_eq!(contact.account_id, Some(account_id));
    assert_eq!(contact.last_name, SAMPLE_CONTACT_LAST_NAME);
    assert_eq!(contact.email.as_deref(), Some(SAMPLE_CONTACT_EMAIL));
}

#[test]
fn create_contact_for_missing_account_propagates_store_error() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let err = ContactService::new(&store)
        .create_contact_for_account(Uuid::new_v4())
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound { .. }));
}

#[test]
fn create_contact_for_deleted_account_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    let account_id = AccountService::new(&store)
        .create_default_account()
        .unwrap();
    let account: Account = store.require(account_id).unwrap();
    store.delete(std::slice::from_ref(&account)).unwrap();

    let err = ContactService::new(&store)
        .create_contact_for_account(account_id)
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound { id, .. } if id == account_id));
    let linked: Vec<Contact> = store
        .query_by_field(Contact::ACCOUNT_ID_FIELD, &FieldValue::Reference(account_id))
        .unwrap();
    assert!(linked.is_empty());
}

#[test]
fn update_contact_last_name_renames_only_that_field() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    let service = ContactService::new(&store);
    let account_id = AccountService::new(&store)
        .find_or_create_account("Parent")
        .unwrap()
        .id
        .unwrap();
    let contact_id = service.create_contact_for_account(account_id).unwrap();

    service.update_contact_last_name(contact_id, "Smith").unwrap();

    let contact: Contact = store.require(contact_id).unwrap();
    assert_eq!(contact.last_name, "Smith");
    assert_eq!(contact.account_id, Some(account_id));
}

#[test]
fn update_contact_last_name_on_missing_contact_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let err = ContactService::new(&store)
        .update_contact_last_name(Uuid::new_v4(), "Smith")
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound { .. }));
}

#[test]
fn link_contacts_creates_one_account_per_distinct_surname() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    let mut contacts: Vec<Contact> = ["Doe", "Jane", "Doe"].into_iter().map(Contact::new).collect();

    ContactService::new(&store)
        .link_contacts_to_accounts(&mut contacts)
        .unwrap();

    let accounts = all_accounts(&store);
    let names: HashSet<_> = accounts.iter().map(|account| account.name.as_str()).collect();
    assert_eq!(accounts.len(), 2);
    assert_eq!(names, HashSet::from(["Doe", "Jane"]));

    for contact in &contacts {
        let stored: Contact = store.require(contact.id.unwrap()).unwrap();
        let account: Account = store.require(stored.account_id.unwrap()).unwrap();
        assert_eq!(account.name, contact.last_name);
    }
    assert_eq!(contacts[0].account_id, contacts[2].account_id);
    assert_ne!(contacts[0].account_id, contacts[1].account_id);
}

#[test]
fn link_contacts_reuses_existing_accounts_and_updates_saved_contacts() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    let existing = AccountService::new(&store)
        .find_or_create_account("Doe")
        .unwrap();
    let mut saved = Contact::new("Doe");
    store.insert_one(&mut saved).unwrap();

    let mut contacts = vec![saved.clone()];
    ContactService::new(&store)
        .link_contacts_to_accounts(&mut contacts)
        .unwrap();

    assert_eq!(contacts[0].id, saved.id);
    assert_eq!(contacts[0].account_id, existing.id);
    let account: Account = store.require(existing.id.unwrap()).unwrap();
    assert_eq!(account.description.as_deref(), Some(UPDATED_ACCOUNT_DESCRIPTION));
    assert_eq!(all_accounts(&store).len(), 1);
}

#[test]
fn link_contacts_with_empty_batch_does_nothing() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    ContactService::new(&store)
        .link_contacts_to_accounts(&mut [])
        .unwrap();
    assert!(all_accounts(&store).is_empty());
}
