//! Support case entity.

use crate::model::record::{
    FieldReader, FieldValue, Record, RecordId, RecordKind, RecordValidationError,
};
use serde::{Deserialize, Serialize};

/// Case handling status, stored by its platform label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    New,
    Working,
    Escalated,
    Closed,
}

impl CaseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Working => "Working",
            Self::Escalated => "Escalated",
            Self::Closed => "Closed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "New" => Some(Self::New),
            "Working" => Some(Self::Working),
            "Escalated" => Some(Self::Escalated),
            "Closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// Customer support case, optionally attached to an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub id: Option<RecordId>,
    pub subject: Option<String>,
    pub status: CaseStatus,
    pub account_id: Option<RecordId>,
}

impl Case {
    pub const ACCOUNT_ID_FIELD: &'static str = "account_id";

    pub fn new(status: CaseStatus) -> Self {
        Self {
            id: None,
            subject: None,
            status,
            account_id: None,
        }
    }
}

impl Record for Case {
    const KIND: RecordKind = RecordKind::Case;
    const FIELDS: &'static [&'static str] = &["subject", "status", "account_id"];
    const REFERENCES: &'static [(&'static str, RecordKind)] =
        &[(Self::ACCOUNT_ID_FIELD, RecordKind::Account)];

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn to_fields(&self) -> Vec<FieldValue> {
        vec![
            self.subject.clone().into(),
            self.status.as_str().into(),
            self.account_id.into(),
        ]
    }

    fn from_fields(id: RecordId, values: Vec<FieldValue>) -> Result<Self, RecordValidationError> {
        let mut reader = FieldReader::new(Self::KIND, Self::FIELDS, values)?;
        Ok(Self {
            id: Some(id),
            subject: reader.optional_text()?,
            status: reader.picklist(CaseStatus::parse)?,
            account_id: reader.optional_reference()?,
        })
    }

    fn validate(&self) -> Result<(), RecordValidationError> {
        Ok(())
    }
}
