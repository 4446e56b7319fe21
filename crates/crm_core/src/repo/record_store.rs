//! Store capability contract.
//!
//! # Responsibility
//! - Describe persistence of any `Record` without naming a backend.
//! - Carry the single error type every record operation surfaces.
//!
//! # Invariants
//! - `insert` assigns ids; callers never pass pre-assigned ids.
//! - `update` and `delete` only touch live (non-deleted) records.
//! - Deleted records are invisible to `query_by_field` and `get`.

use crate::db::DbError;
use crate::model::record::{
    FieldValue, Record, RecordId, RecordKind, RecordValidationError, ID_FIELD,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Failure of a delegated store operation.
#[derive(Debug)]
pub enum RepoError {
    Validation(RecordValidationError),
    Db(DbError),
    NotFound {
        kind: RecordKind,
        id: RecordId,
    },
    /// Insert received a record that already has an id.
    IdAlreadyAssigned {
        kind: RecordKind,
        id: RecordId,
    },
    /// Update/delete received a record that was never persisted.
    MissingId(RecordKind),
    UnknownField {
        kind: RecordKind,
        field: String,
    },
    /// Upsert key matched more than one live record.
    DuplicateMatch {
        kind: RecordKind,
        field: &'static str,
        count: usize,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::IdAlreadyAssigned { kind, id } => {
                write!(f, "cannot insert {kind} that already has id {id}")
            }
            Self::MissingId(kind) => write!(f, "{kind} has no id; insert it first"),
            Self::UnknownField { kind, field } => write!(f, "{kind} has no field `{field}`"),
            Self::DuplicateMatch { kind, field, count } => write!(
                f,
                "{kind}.{field} matched {count} records; upsert needs at most one"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RecordValidationError> for RepoError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Per-record result of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub id: RecordId,
    /// `true` when the record was inserted, `false` when updated.
    pub created: bool,
}

/// Record persistence capability injected into every record operation.
pub trait RecordStore {
    /// Persists new records and writes the assigned ids back onto them.
    fn insert<R: Record>(&self, records: &mut [R]) -> RepoResult<Vec<RecordId>>;

    /// Overwrites persisted records identified by their ids.
    fn update<R: Record>(&self, records: &[R]) -> RepoResult<()>;

    /// Inserts or updates each record.
    ///
    /// With `match_key = None` a record is updated when it carries an id and
    /// inserted otherwise. With `Some(field)` the live record whose `field`
    /// equals the input's value is updated and its id copied onto the input.
    fn upsert<R: Record>(
        &self,
        records: &mut [R],
        match_key: Option<&str>,
    ) -> RepoResult<Vec<UpsertOutcome>>;

    /// Deletes persisted records. Deleted records stay as tombstones.
    fn delete<R: Record>(&self, records: &[R]) -> RepoResult<()>;

    /// Returns live records whose `field` equals `value`, oldest first.
    fn query_by_field<R: Record>(&self, field: &str, value: &FieldValue) -> RepoResult<Vec<R>>;

    fn get<R: Record>(&self, id: RecordId) -> RepoResult<Option<R>> {
        let found = self.query_by_field::<R>(ID_FIELD, &FieldValue::Reference(id))?;
        Ok(found.into_iter().next())
    }

    /// Like `get`, but a missing record is `RepoError::NotFound`.
    fn require<R: Record>(&self, id: RecordId) -> RepoResult<R> {
        self.get(id)?.ok_or(RepoError::NotFound { kind: R::KIND, id })
    }

    /// Inserts one record and returns its new id.
    fn insert_one<R: Record>(&self, record: &mut R) -> RepoResult<RecordId> {
        self.insert(std::slice::from_mut(record))?;
        record.id().ok_or(RepoError::MissingId(R::KIND))
    }
}

impl<S: RecordStore + ?Sized> RecordStore for &S {
    fn insert<R: Record>(&self, records: &mut [R]) -> RepoResult<Vec<RecordId>> {
        (**self).insert(records)
    }

    fn update<R: Record>(&self, records: &[R]) -> RepoResult<()> {
        (**self).update(records)
    }

    fn upsert<R: Record>(
        &self,
        records: &mut [R],
        match_key: Option<&str>,
    ) -> RepoResult<Vec<UpsertOutcome>> {
        (**self).upsert(records, match_key)
    }

    fn delete<R: Record>(&self, records: &[R]) -> RepoResult<()> {
        (**self).delete(records)
    }

    fn query_by_field<R: Record>(&self, field: &str, value: &FieldValue) -> RepoResult<Vec<R>> {
        (**self).query_by_field(field, value)
    }
}

/// Resolves a caller-provided field name to the record's declared name.
///
/// Only names returned from here are ever interpolated into storage queries.
pub fn resolve_field<R: Record>(field: &str) -> RepoResult<&'static str> {
    if field == ID_FIELD {
        return Ok(ID_FIELD);
    }
    R::FIELDS
        .iter()
        .copied()
        .find(|declared| *declared == field)
        .ok_or_else(|| RepoError::UnknownField {
            kind: R::KIND,
            field: field.to_string(),
        })
}
