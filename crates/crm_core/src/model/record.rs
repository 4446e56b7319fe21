//! Storage-neutral record contract.
//!
//! # Responsibility
//! - Describe each entity as an ordered list of named field values.
//! - Decode persisted field values back into typed entities.
//!
//! # Invariants
//! - `Record::FIELDS` order matches `to_fields()` and `from_fields()`.
//! - `id` is assigned by the store; callers never invent one.
//! - `id` is always a queryable field even though it is not in `FIELDS`.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Platform-assigned identifier for every record.
pub type RecordId = Uuid;

/// Field name under which every record's id can be queried.
pub const ID_FIELD: &str = "id";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// CRM object type of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Account,
    Contact,
    Opportunity,
    Lead,
    Case,
}

impl RecordKind {
    /// Storage table holding records of this kind.
    pub fn table(self) -> &'static str {
        match self {
            Self::Account => "accounts",
            Self::Contact => "contacts",
            Self::Opportunity => "opportunities",
            Self::Lead => "leads",
            Self::Case => "cases",
        }
    }

    /// Platform object label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Account => "Account",
            Self::Contact => "Contact",
            Self::Opportunity => "Opportunity",
            Self::Lead => "Lead",
            Self::Case => "Case",
        }
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One field value as exchanged between entities and the store.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Integer(i64),
    Decimal(f64),
    Date(NaiveDate),
    Reference(RecordId),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// `YYYY-MM-DD` rendering used when dates are stored as text.
    pub fn date_text(date: NaiveDate) -> String {
        date.format(DATE_FORMAT).to_string()
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Null, Self::Text)
    }
}

impl From<Option<i64>> for FieldValue {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Self::Null, Self::Integer)
    }
}

impl From<Option<f64>> for FieldValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Null, Self::Decimal)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<RecordId> for FieldValue {
    fn from(value: RecordId) -> Self {
        Self::Reference(value)
    }
}

impl From<Option<RecordId>> for FieldValue {
    fn from(value: Option<RecordId>) -> Self {
        value.map_or(Self::Null, Self::Reference)
    }
}

/// Record validation and decoding failures.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValidationError {
    /// Required field is missing or blank.
    MissingRequiredField {
        kind: RecordKind,
        field: &'static str,
    },
    /// Email does not look like `local@domain.tld`.
    InvalidEmail(String),
    /// Numeric field must not be negative.
    NegativeValue {
        kind: RecordKind,
        field: &'static str,
    },
    /// Stored value cannot be decoded into the field type.
    InvalidFieldValue {
        kind: RecordKind,
        field: &'static str,
        message: String,
    },
    /// Decoder received a different number of values than `FIELDS`.
    FieldCountMismatch {
        kind: RecordKind,
        expected: usize,
        actual: usize,
    },
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequiredField { kind, field } => {
                write!(f, "{kind}.{field} is required")
            }
            Self::InvalidEmail(value) => write!(f, "invalid email address `{value}`"),
            Self::NegativeValue { kind, field } => {
                write!(f, "{kind}.{field} must not be negative")
            }
            Self::InvalidFieldValue {
                kind,
                field,
                message,
            } => write!(f, "invalid value for {kind}.{field}: {message}"),
            Self::FieldCountMismatch {
                kind,
                expected,
                actual,
            } => write!(
                f,
                "{kind} expects {expected} field values, got {actual}"
            ),
        }
    }
}

impl Error for RecordValidationError {}

/// Storage-neutral contract implemented by every CRM entity.
pub trait Record: Clone {
    /// Object type, also selecting the storage table.
    const KIND: RecordKind;
    /// Ordered persisted field names, excluding `id`.
    const FIELDS: &'static [&'static str];
    /// Reference fields and the kind each one must point at. A set
    /// reference must name a live record of that kind.
    const REFERENCES: &'static [(&'static str, RecordKind)] = &[];

    fn id(&self) -> Option<RecordId>;

    fn set_id(&mut self, id: RecordId);

    /// Field values in `FIELDS` order.
    fn to_fields(&self) -> Vec<FieldValue>;

    /// Rebuilds a record from values in `FIELDS` order.
    fn from_fields(id: RecordId, values: Vec<FieldValue>) -> Result<Self, RecordValidationError>;

    /// Checks required fields and value ranges before persistence.
    fn validate(&self) -> Result<(), RecordValidationError>;

    /// Returns the current value of one named field, or `None` for names the
    /// record does not declare.
    fn field(&self, name: &str) -> Option<FieldValue> {
        if name == ID_FIELD {
            return Some(self.id().into());
        }
        let index = Self::FIELDS.iter().position(|field| *field == name)?;
        self.to_fields().into_iter().nth(index)
    }
}

/// Sequential decoder over field values in `FIELDS` order.
pub(crate) struct FieldReader {
    kind: RecordKind,
    fields: std::slice::Iter<'static, &'static str>,
    values: std::vec::IntoIter<FieldValue>,
}

impl FieldReader {
    pub(crate) fn new(
        kind: RecordKind,
        fields: &'static [&'static str],
        values: Vec<FieldValue>,
    ) -> Result<Self, RecordValidationError> {
        if fields.len() != values.len() {
            return Err(RecordValidationError::FieldCountMismatch {
                kind,
                expected: fields.len(),
                actual: values.len(),
            });
        }
        Ok(Self {
            kind,
            fields: fields.iter(),
            values: values.into_iter(),
        })
    }

    fn take(&mut self) -> (&'static str, FieldValue) {
        // Lengths were checked in `new`.
        let field = self.fields.next().copied().unwrap_or(ID_FIELD);
        let value = self.values.next().unwrap_or(FieldValue::Null);
        (field, value)
    }

    fn invalid(&self, field: &'static str, message: impl Into<String>) -> RecordValidationError {
        RecordValidationError::InvalidFieldValue {
            kind: self.kind,
            field,
            message: message.into(),
        }
    }

    pub(crate) fn text(&mut self) -> Result<String, RecordValidationError> {
        let kind = self.kind;
        let (field, value) = self.take();
        match value {
            FieldValue::Text(text) => Ok(text),
            FieldValue::Null => Err(RecordValidationError::MissingRequiredField { kind, field }),
            other => Err(self.invalid(field, format!("expected text, got {other:?}"))),
        }
    }

    pub(crate) fn optional_text(&mut self) -> Result<Option<String>, RecordValidationError> {
        let (field, value) = self.take();
        match value {
            FieldValue::Text(text) => Ok(Some(text)),
            FieldValue::Null => Ok(None),
            other => Err(self.invalid(field, format!("expected text, got {other:?}"))),
        }
    }

    pub(crate) fn optional_integer(&mut self) -> Result<Option<i64>, RecordValidationError> {
        let (field, value) = self.take();
        match value {
            FieldValue::Integer(number) => Ok(Some(number)),
            FieldValue::Null => Ok(None),
            other => Err(self.invalid(field, format!("expected integer, got {other:?}"))),
        }
    }

    pub(crate) fn optional_decimal(&mut self) -> Result<Option<f64>, RecordValidationError> {
        let (field, value) = self.take();
        match value {
            FieldValue::Decimal(number) => Ok(Some(number)),
            FieldValue::Integer(number) => Ok(Some(number as f64)),
            FieldValue::Null => Ok(None),
            other => Err(self.invalid(field, format!("expected decimal, got {other:?}"))),
        }
    }

    pub(crate) fn date(&mut self) -> Result<NaiveDate, RecordValidationError> {
        let kind = self.kind;
        let (field, value) = self.take();
        match value {
            FieldValue::Date(date) => Ok(date),
            FieldValue::Text(text) => NaiveDate::parse_from_str(&text, DATE_FORMAT)
                .map_err(|err| self.invalid(field, format!("`{text}`: {err}"))),
            FieldValue::Null => Err(RecordValidationError::MissingRequiredField { kind, field }),
            other => Err(self.invalid(field, format!("expected date, got {other:?}"))),
        }
    }

    pub(crate) fn optional_reference(&mut self) -> Result<Option<RecordId>, RecordValidationError> {
        let (field, value) = self.take();
        match value {
            FieldValue::Reference(id) => Ok(Some(id)),
            FieldValue::Text(text) => Uuid::parse_str(&text)
                .map(Some)
                .map_err(|_| self.invalid(field, format!("invalid record id `{text}`"))),
            FieldValue::Null => Ok(None),
            other => Err(self.invalid(field, format!("expected record id, got {other:?}"))),
        }
    }

    /// Decodes a required picklist value through its label parser.
    pub(crate) fn picklist<T>(
        &mut self,
        parse: fn(&str) -> Option<T>,
    ) -> Result<T, RecordValidationError> {
        let kind = self.kind;
        let (field, value) = self.take();
        match value {
            FieldValue::Text(text) => {
                parse(&text).ok_or_else(|| self.invalid(field, format!("unknown value `{text}`")))
            }
            FieldValue::Null => Err(RecordValidationError::MissingRequiredField { kind, field }),
            other => Err(self.invalid(field, format!("expected text, got {other:?}"))),
        }
    }
}

/// Fails when a required text field is blank after trim.
pub(crate) fn require_text(
    kind: RecordKind,
    field: &'static str,
    value: &str,
) -> Result<(), RecordValidationError> {
    if value.trim().is_empty() {
        return Err(RecordValidationError::MissingRequiredField { kind, field });
    }
    Ok(())
}

/// Fails when `value` is set and does not look like an email address.
pub(crate) fn check_email(value: Option<&str>) -> Result<(), RecordValidationError> {
    match value {
        Some(email) if !EMAIL_RE.is_match(email) => {
            Err(RecordValidationError::InvalidEmail(email.to_string()))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::{check_email, FieldReader, FieldValue, RecordKind, RecordValidationError};
    use chrono::NaiveDate;

    #[test]
    fn email_check_accepts_plain_addresses_and_rejects_garbage() {
        assert!(check_email(Some("john.doe@example.com")).is_ok());
        assert!(check_email(None).is_ok());
        assert_eq!(
            check_email(Some("not an email")),
            Err(RecordValidationError::InvalidEmail(
                "not an email".to_string()
            ))
        );
    }

    #[test]
    fn reader_rejects_wrong_value_count() {
        let result = FieldReader::new(RecordKind::Lead, &["a", "b"], vec![FieldValue::Null]);
        assert!(matches!(
            result,
            Err(RecordValidationError::FieldCountMismatch {
                expected: 2,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn reader_decodes_dates_from_storage_text() {
        let mut reader = FieldReader::new(
            RecordKind::Opportunity,
            &["close_date"],
            vec![FieldValue::Text("2026-01-31".to_string())],
        )
        .expect("count matches");
        assert_eq!(
            reader.date().expect("date should decode"),
            NaiveDate::from_ymd_opt(2026, 1, 31).expect("valid date")
        );
    }

    #[test]
    fn reader_reports_missing_required_text() {
        let mut reader =
            FieldReader::new(RecordKind::Account, &["name"], vec![FieldValue::Null])
                .expect("count matches");
        assert_eq!(
            reader.text(),
            Err(RecordValidationError::MissingRequiredField {
                kind: RecordKind::Account,
                field: "name",
            })
        );
    }
}
