//! SQLite-backed record store.
//!
//! # Responsibility
//! - Map `Record` field lists onto per-kind tables.
//! - Run each multi-record write in a single transaction.
//!
//! # Invariants
//! - Ids are generated here (UUID v4) and written back only after commit.
//! - Column names come from `Record::FIELDS`, never from caller strings.
//! - Deletes set `is_deleted = 1`; every read path filters tombstones.
//! - A written reference always names a live record; tombstoned parents
//!   are `NotFound` even though their rows still satisfy the foreign key.

use crate::db::migrations::{current_version, latest_version};
use crate::model::record::{FieldValue, Record, RecordId, ID_FIELD};
use crate::repo::record_store::{
    resolve_field, RecordStore, RepoError, RepoResult, UpsertOutcome,
};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use uuid::Uuid;

const TOUCH_UPDATED_AT: &str = "updated_at = (strftime('%s', 'now') * 1000)";

/// Record store over a migrated SQLite connection.
pub struct SqliteRecordStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordStore<'conn> {
    /// Wraps a connection returned by `open_db` / `open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Wraps a connection after checking its schema is current.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let version = current_version(conn)?;
        let expected = latest_version();
        if version != expected {
            return Err(RepoError::InvalidData(format!(
                "record store schema version {version} does not match expected {expected}"
            )));
        }
        Ok(Self::new(conn))
    }
}

impl RecordStore for SqliteRecordStore<'_> {
    fn insert<R: Record>(&self, records: &mut [R]) -> RepoResult<Vec<RecordId>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        for record in records.iter() {
            record.validate()?;
            if let Some(id) = record.id() {
                return Err(RepoError::IdAlreadyAssigned { kind: R::KIND, id });
            }
        }

        let ids: Vec<RecordId> = records.iter().map(|_| Uuid::new_v4()).collect();
        let tx = self.conn.unchecked_transaction()?;
        for (record, id) in records.iter().zip(&ids) {
            insert_row(&tx, record, *id)?;
        }
        tx.commit()?;

        for (record, id) in records.iter_mut().zip(&ids) {
            record.set_id(*id);
        }
        debug!(
            "event=record_insert module=repo status=ok kind={} count={}",
            R::KIND,
            ids.len()
        );
        Ok(ids)
    }

    fn update<R: Record>(&self, records: &[R]) -> RepoResult<()> {
        if records.is_empty() {
            return Ok(());
        }
        let ids = require_ids(records)?;
        for record in records {
            record.validate()?;
        }

        let tx = self.conn.unchecked_transaction()?;
        for (record, id) in records.iter().zip(&ids) {
            update_row(&tx, record, *id)?;
        }
        tx.commit()?;

        debug!(
            "event=record_update module=repo status=ok kind={} count={}",
            R::KIND,
            records.len()
        );
        Ok(())
    }

    fn upsert<R: Record>(
        &self,
        records: &mut [R],
        match_key: Option<&str>,
    ) -> RepoResult<Vec<UpsertOutcome>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let match_key = match match_key {
            Some(key) => Some(resolve_field::<R>(key)?).filter(|key| *key != ID_FIELD),
            None => None,
        };
        for record in records.iter() {
            record.validate()?;
        }

        let tx = self.conn.unchecked_transaction()?;
        let mut outcomes = Vec::with_capacity(records.len());
        for record in records.iter() {
            let matched = match match_key {
                Some(key) => find_match::<R>(&tx, key, record)?,
                None => None,
            };
            let outcome = match matched.or(record.id()) {
                Some(id) => {
                    update_row(&tx, record, id)?;
                    UpsertOutcome { id, created: false }
                }
                None => {
                    let id = Uuid::new_v4();
                    insert_row(&tx, record, id)?;
                    UpsertOutcome { id, created: true }
                }
            };
            outcomes.push(outcome);
        }
        tx.commit()?;

        for (record, outcome) in records.iter_mut().zip(&outcomes) {
            record.set_id(outcome.id);
        }
        debug!(
            "event=record_upsert module=repo status=ok kind={} count={} created={}",
            R::KIND,
            outcomes.len(),
            outcomes.iter().filter(|outcome| outcome.created).count()
        );
        Ok(outcomes)
    }

    fn delete<R: Record>(&self, records: &[R]) -> RepoResult<()> {
        if records.is_empty() {
            return Ok(());
        }
        let ids = require_ids(records)?;

        let tx = self.conn.unchecked_transaction()?;
        let sql = format!(
            "UPDATE {} SET is_deleted = 1, {TOUCH_UPDATED_AT} WHERE id = ?1 AND is_deleted = 0;",
            R::KIND.table()
        );
        for id in &ids {
            let changed = tx.execute(&sql, [id.to_string()])?;
            if changed == 0 {
                return Err(RepoError::NotFound { kind: R::KIND, id: *id });
            }
        }
        tx.commit()?;

        debug!(
            "event=record_delete module=repo status=ok kind={} count={}",
            R::KIND,
            ids.len()
        );
        Ok(())
    }

    fn query_by_field<R: Record>(&self, field: &str, value: &FieldValue) -> RepoResult<Vec<R>> {
        let column = resolve_field::<R>(field)?;
        let mut sql = format!(
            "SELECT id, {} FROM {} WHERE is_deleted = 0",
            R::FIELDS.join(", "),
            R::KIND.table()
        );
        let mut bind_values: Vec<Value> = Vec::new();
        if value.is_null() {
            sql.push_str(&format!(" AND {column} IS NULL"));
        } else {
            sql.push_str(&format!(" AND {column} = ?1"));
            bind_values.push(to_sql_value(value.clone()));
        }
        sql.push_str(" ORDER BY created_at ASC, rowid ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row::<R>(row)?);
        }
        Ok(records)
    }
}

fn require_ids<R: Record>(records: &[R]) -> RepoResult<Vec<RecordId>> {
    records
        .iter()
        .map(|record| record.id().ok_or(RepoError::MissingId(R::KIND)))
        .collect()
}

fn insert_row<R: Record>(conn: &Connection, record: &R, id: RecordId) -> RepoResult<()> {
    ensure_live_references(conn, record)?;
    let placeholders = (1..=R::FIELDS.len() + 1)
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {} (id, {}) VALUES ({placeholders});",
        R::KIND.table(),
        R::FIELDS.join(", ")
    );

    let mut bind_values = vec![Value::Text(id.to_string())];
    bind_values.extend(record.to_fields().into_iter().map(to_sql_value));
    conn.execute(&sql, params_from_iter(bind_values))?;
    Ok(())
}

fn update_row<R: Record>(conn: &Connection, record: &R, id: RecordId) -> RepoResult<()> {
    ensure_live_references(conn, record)?;
    let assignments = R::FIELDS
        .iter()
        .enumerate()
        .map(|(index, field)| format!("{field} = ?{}", index + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {} SET {assignments}, {TOUCH_UPDATED_AT} WHERE id = ?{} AND is_deleted = 0;",
        R::KIND.table(),
        R::FIELDS.len() + 1
    );

    let mut bind_values: Vec<Value> = record.to_fields().into_iter().map(to_sql_value).collect();
    bind_values.push(Value::Text(id.to_string()));
    let changed = conn.execute(&sql, params_from_iter(bind_values))?;
    if changed == 0 {
        return Err(RepoError::NotFound { kind: R::KIND, id });
    }
    Ok(())
}

fn ensure_live_references<R: Record>(conn: &Connection, record: &R) -> RepoResult<()> {
    for (field, target) in R::REFERENCES {
        let Some(FieldValue::Reference(target_id)) = record.field(field) else {
            continue;
        };
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1 AND is_deleted = 0);",
            target.table()
        );
        let live: bool = conn.query_row(&sql, [target_id.to_string()], |row| row.get(0))?;
        if !live {
            return Err(RepoError::NotFound {
                kind: *target,
                id: target_id,
            });
        }
    }
    Ok(())
}

/// Finds the single live record sharing `record`'s value for `key`.
fn find_match<R: Record>(
    conn: &Connection,
    key: &'static str,
    record: &R,
) -> RepoResult<Option<RecordId>> {
    let value = match record.field(key) {
        Some(value) if !value.is_null() => value,
        _ => return Ok(None),
    };
    let sql = format!(
        "SELECT id FROM {} WHERE is_deleted = 0 AND {key} = ?1 ORDER BY created_at ASC, rowid ASC;",
        R::KIND.table()
    );
    let mut stmt = conn.prepare(&sql)?;
    let ids = stmt
        .query_map([to_sql_value(value)], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    match ids.as_slice() {
        [] => Ok(None),
        [id] => parse_id(id).map(Some),
        _ => Err(RepoError::DuplicateMatch {
            kind: R::KIND,
            field: key,
            count: ids.len(),
        }),
    }
}

fn parse_record_row<R: Record>(row: &Row<'_>) -> RepoResult<R> {
    let id_text: String = row.get(0)?;
    let id = parse_id(&id_text)?;

    let mut values = Vec::with_capacity(R::FIELDS.len());
    for index in 1..=R::FIELDS.len() {
        values.push(from_sql_value(row.get::<_, Value>(index)?)?);
    }

    let record = R::from_fields(id, values).map_err(|err| {
        RepoError::InvalidData(format!("{} row {id}: {err}", R::KIND.table()))
    })?;
    record.validate()?;
    Ok(record)
}

fn parse_id(value: &str) -> RepoResult<RecordId> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid record id `{value}`")))
}

fn to_sql_value(value: FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Text(text) => Value::Text(text),
        FieldValue::Integer(number) => Value::Integer(number),
        FieldValue::Decimal(number) => Value::Real(number),
        FieldValue::Date(date) => Value::Text(FieldValue::date_text(date)),
        FieldValue::Reference(id) => Value::Text(id.to_string()),
    }
}

fn from_sql_value(value: Value) -> RepoResult<FieldValue> {
    match value {
        Value::Null => Ok(FieldValue::Null),
        Value::Integer(number) => Ok(FieldValue::Integer(number)),
        Value::Real(number) => Ok(FieldValue::Decimal(number)),
        Value::Text(text) => Ok(FieldValue::Text(text)),
        Value::Blob(_) => Err(RepoError::InvalidData(
            "unexpected blob column in record table".to_string(),
        )),
    }
}
