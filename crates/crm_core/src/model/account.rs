//! Account entity.
//!
//! # Invariants
//! - `name` is non-blank; it doubles as the find-or-create identity.
//! - `number_of_employees` is never negative.

use crate::model::record::{
    require_text, FieldReader, FieldValue, Record, RecordId, RecordKind, RecordValidationError,
};
use serde::{Deserialize, Serialize};

/// Parent record for contacts, opportunities and cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// `None` until the store persists the record.
    pub id: Option<RecordId>,
    pub name: String,
    pub industry: Option<String>,
    pub number_of_employees: Option<i64>,
    pub description: Option<String>,
}

impl Account {
    pub const NAME_FIELD: &'static str = "name";
    pub const INDUSTRY_FIELD: &'static str = "industry";

    /// Creates an unsaved account with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            industry: None,
            number_of_employees: None,
            description: None,
        }
    }
}

impl Record for Account {
    const KIND: RecordKind = RecordKind::Account;
    const FIELDS: &'static [&'static str] =
        &["name", "industry", "number_of_employees", "description"];

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn to_fields(&self) -> Vec<FieldValue> {
        vec![
            self.name.clone().into(),
            self.industry.clone().into(),
            self.number_of_employees.into(),
            self.description.clone().into(),
        ]
    }

    fn from_fields(id: RecordId, values: Vec<FieldValue>) -> Result<Self, RecordValidationError> {
        let mut reader = FieldReader::new(Self::KIND, Self::FIELDS, values)?;
        Ok(Self {
            id: Some(id),
            name: reader.text()?,
            industry: reader.optional_text()?,
            number_of_employees: reader.optional_integer()?,
            description: reader.optional_text()?,
        })
    }

    fn validate(&self) -> Result<(), RecordValidationError> {
        require_text(Self::KIND, Self::NAME_FIELD, &self.name)?;
        if self.number_of_employees.is_some_and(|count| count < 0) {
            return Err(RecordValidationError::NegativeValue {
                kind: Self::KIND,
                field: "number_of_employees",
            });
        }
        Ok(())
    }
}
