use chrono::NaiveDate;
use crm_core::db::open_db_in_memory;
use crm_core::{
    Account, Case, CaseStatus, Contact, FieldValue, Lead, LeadStatus, Opportunity,
    OpportunityStage, RecordKind, RecordStore, RepoError, SqliteRecordStore,
};
use rusqlite::Connection;
use uuid::Uuid;

fn close_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 12, 31).unwrap()
}

fn count_rows(conn: &Connection, table: &str, deleted: bool) -> i64 {
    conn.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE is_deleted = ?1;"),
        [i64::from(deleted)],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn insert_assigns_ids_and_get_reads_back() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let mut accounts = vec![Account::new("Acme"), Account::new("Globex")];
    accounts[0].number_of_employees = Some(12);
    let ids = store.insert(&mut accounts).unwrap();

    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
    assert_eq!(accounts[0].id, Some(ids[0]));

    let loaded: Account = store.get(ids[0]).unwrap().unwrap();
    assert_eq!(loaded, accounts[0]);
}

#[test]
fn insert_rejects_record_with_existing_id() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let mut account = Account::new("Acme");
    store.insert_one(&mut account).unwrap();

    let err = store.insert_one(&mut account).unwrap_err();
    assert!(matches!(
        err,
        RepoError::IdAlreadyAssigned {
            kind: RecordKind::Account,
            ..
        }
    ));
}

#[test]
fn insert_batch_is_all_or_none() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let mut contacts = vec![Contact::new("Valid"), Contact::new("Dangling")];
    contacts[1].account_id = Some(Uuid::new_v4());

    let err = store.insert(&mut contacts).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            kind: RecordKind::Account,
            ..
        }
    ));
    assert!(contacts.iter().all(|contact| contact.id.is_none()));
    assert_eq!(count_rows(&conn, "contacts", false), 0);
}

#[test]
fn validation_failure_blocks_writes() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let mut blank = Account::new(" ");
    assert!(matches!(
        store.insert_one(&mut blank).unwrap_err(),
        RepoError::Validation(_)
    ));

    let mut account = Account::new("Acme");
    store.insert_one(&mut account).unwrap();
    account.name = String::new();
    assert!(matches!(
        store.update(std::slice::from_ref(&account)).unwrap_err(),
        RepoError::Validation(_)
    ));
}

#[test]
fn update_of_unknown_or_unsaved_record_fails() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let mut ghost = Account::new("Ghost");
    let err = store.update(std::slice::from_ref(&ghost)).unwrap_err();
    assert!(matches!(err, RepoError::MissingId(RecordKind::Account)));

    let missing_id = Uuid::new_v4();
    ghost.id = Some(missing_id);
    let err = store.update(std::slice::from_ref(&ghost)).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { id, .. } if id == missing_id));
}

#[test]
fn query_by_field_matches_live_records_in_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let mut accounts = vec![
        Account::new("Same"),
        Account::new("Other"),
        Account::new("Same"),
    ];
    store.insert(&mut accounts).unwrap();
    store.delete(&accounts[2..]).unwrap();
    let mut later = Account::new("Same");
    store.insert_one(&mut later).unwrap();

    let found: Vec<Account> = store
        .query_by_field("name", &FieldValue::from("Same"))
        .unwrap();
    let ids: Vec<_> = found.iter().map(|account| account.id).collect();
    assert_eq!(ids, vec![accounts[0].id, later.id]);
}

#[test]
fn query_by_field_supports_null_and_references() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let mut account = Account::new("Parent");
    let account_id = store.insert_one(&mut account).unwrap();
    let mut linked = Contact::new("Linked");
    linked.account_id = Some(account_id);
    let mut orphan = Contact::new("Orphan");
    store.insert_one(&mut linked).unwrap();
    store.insert_one(&mut orphan).unwrap();

    let by_account: Vec<Contact> = store
        .query_by_field(Contact::ACCOUNT_ID_FIELD, &FieldValue::Reference(account_id))
        .unwrap();
    assert_eq!(by_account, vec![linked]);

    let unlinked: Vec<Contact> = store
        .query_by_field(Contact::ACCOUNT_ID_FIELD, &FieldValue::Null)
        .unwrap();
    assert_eq!(unlinked, vec![orphan]);
}

#[test]
fn query_by_unknown_field_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let err = store
        .query_by_field::<Lead>("name", &FieldValue::from("x"))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::UnknownField {
            kind: RecordKind::Lead,
            ref field,
        } if field == "name"
    ));
}

#[test]
fn upsert_without_key_inserts_new_and_updates_existing() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let mut existing = Opportunity::new("Renewal", OpportunityStage::Prospecting, close_date());
    store.insert_one(&mut existing).unwrap();
    existing.amount = Some(10.5);

    let mut batch = vec![
        existing.clone(),
        Opportunity::new("Expansion", OpportunityStage::Qualification, close_date()),
    ];
    let outcomes = store.upsert(&mut batch, None).unwrap();

    assert!(!outcomes[0].created);
    assert_eq!(Some(outcomes[0].id), existing.id);
    assert!(outcomes[1].created);
    assert_eq!(batch[1].id, Some(outcomes[1].id));

    let reloaded: Opportunity = store.require(outcomes[0].id).unwrap();
    assert_eq!(reloaded.amount, Some(10.5));
    assert_eq!(reloaded.close_date, close_date());
}

#[test]
fn upsert_by_key_updates_the_matching_record_instead_of_duplicating() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let mut original = Account::new("Initech");
    let original_id = store.insert_one(&mut original).unwrap();

    let mut incoming = vec![Account::new("Initech")];
    incoming[0].industry = Some("Software".to_string());
    let outcomes = store.upsert(&mut incoming, Some("name")).unwrap();

    assert_eq!(outcomes[0].id, original_id);
    assert!(!outcomes[0].created);
    assert_eq!(incoming[0].id, Some(original_id));
    let all: Vec<Account> = store
        .query_by_field("name", &FieldValue::from("Initech"))
        .unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].industry.as_deref(), Some("Software"));
}

#[test]
fn upsert_by_key_with_ambiguous_match_fails() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let mut twins = vec![Account::new("Twin"), Account::new("Twin")];
    store.insert(&mut twins).unwrap();

    let mut incoming = vec![Account::new("Twin")];
    let err = store.upsert(&mut incoming, Some("name")).unwrap_err();
    assert!(matches!(
        err,
        RepoError::DuplicateMatch {
            field: "name",
            count: 2,
            ..
        }
    ));
    assert!(incoming[0].id.is_none());
}

#[test]
fn delete_tombstones_records_and_hides_them() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let mut leads = vec![
        Lead::new("One", "Co", LeadStatus::OpenNotContacted),
        Lead::new("Two", "Co", LeadStatus::WorkingContacted),
    ];
    store.insert(&mut leads).unwrap();
    store.delete(&leads).unwrap();

    for lead in &leads {
        assert!(store.get::<Lead>(lead.id.unwrap()).unwrap().is_none());
    }
    assert_eq!(count_rows(&conn, "leads", true), 2);

    let err = store.delete(&leads).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { .. }));
}

#[test]
fn empty_batches_are_successful_no_ops() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let mut cases: Vec<Case> = Vec::new();
    assert!(store.insert(&mut cases).unwrap().is_empty());
    store.update(&cases).unwrap();
    assert!(store.upsert(&mut cases, Some("subject")).unwrap().is_empty());
    store.delete(&cases).unwrap();
    assert_eq!(count_rows(&conn, "cases", false), 0);
}

#[test]
fn child_records_cannot_reference_missing_accounts() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let missing_id = Uuid::new_v4();
    let mut case = Case::new(CaseStatus::New);
    case.account_id = Some(missing_id);
    assert!(matches!(
        store.insert_one(&mut case).unwrap_err(),
        RepoError::NotFound {
            kind: RecordKind::Account,
            id,
        } if id == missing_id
    ));
}

#[test]
fn child_records_cannot_reference_deleted_accounts() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let mut kept = Account::new("Kept");
    let kept_id = store.insert_one(&mut kept).unwrap();
    let mut gone = Account::new("Gone");
    let gone_id = store.insert_one(&mut gone).unwrap();

    let mut contact = Contact::new("Linked");
    contact.account_id = Some(kept_id);
    store.insert_one(&mut contact).unwrap();
    store.delete(std::slice::from_ref(&gone)).unwrap();

    let is_gone = |err: RepoError| {
        matches!(
            err,
            RepoError::NotFound {
                kind: RecordKind::Account,
                id,
            } if id == gone_id
        )
    };

    let mut fresh = Contact::new("Fresh");
    fresh.account_id = Some(gone_id);
    assert!(is_gone(store.insert_one(&mut fresh).unwrap_err()));
    assert!(fresh.id.is_none());

    let mut opportunity = Opportunity::new("Orphaned", OpportunityStage::Prospecting, close_date());
    opportunity.account_id = Some(gone_id);
    assert!(is_gone(
        store.upsert(std::slice::from_mut(&mut opportunity), None).unwrap_err()
    ));

    contact.account_id = Some(gone_id);
    assert!(is_gone(store.update(std::slice::from_ref(&contact)).unwrap_err()));

    let stored: Contact = store.require(contact.id.unwrap()).unwrap();
    assert_eq!(stored.account_id, Some(kept_id));
    assert_eq!(count_rows(&conn, "opportunities", false), 0);
}

#[test]
fn corrupted_picklist_value_surfaces_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let mut lead = Lead::new("Corrupt", "Co", LeadStatus::OpenNotContacted);
    let id = store.insert_one(&mut lead).unwrap();
    conn.execute("UPDATE leads SET status = 'Bogus';", []).unwrap();

    let err = store.get::<Lead>(id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}
