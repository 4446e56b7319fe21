//! Lead entity.

use crate::model::record::{
    require_text, FieldReader, FieldValue, Record, RecordId, RecordKind, RecordValidationError,
};
use serde::{Deserialize, Serialize};

/// Lead qualification status, stored by its platform label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    OpenNotContacted,
    WorkingContacted,
    ClosedConverted,
    ClosedNotConverted,
}

impl LeadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenNotContacted => "Open - Not Contacted",
            Self::WorkingContacted => "Working - Contacted",
            Self::ClosedConverted => "Closed - Converted",
            Self::ClosedNotConverted => "Closed - Not Converted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Open - Not Contacted" => Some(Self::OpenNotContacted),
            "Working - Contacted" => Some(Self::WorkingContacted),
            "Closed - Converted" => Some(Self::ClosedConverted),
            "Closed - Not Converted" => Some(Self::ClosedNotConverted),
            _ => None,
        }
    }
}

/// Unqualified prospect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: Option<RecordId>,
    pub last_name: String,
    pub company: String,
    pub status: LeadStatus,
}

impl Lead {
    pub fn new(last_name: impl Into<String>, company: impl Into<String>, status: LeadStatus) -> Self {
        Self {
            id: None,
            last_name: last_name.into(),
            company: company.into(),
            status,
        }
    }
}

impl Record for Lead {
    const KIND: RecordKind = RecordKind::Lead;
    const FIELDS: &'static [&'static str] = &["last_name", "company", "status"];

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn to_fields(&self) -> Vec<FieldValue> {
        vec![
            self.last_name.clone().into(),
            self.company.clone().into(),
            self.status.as_str().into(),
        ]
    }

    fn from_fields(id: RecordId, values: Vec<FieldValue>) -> Result<Self, RecordValidationError> {
        let mut reader = FieldReader::new(Self::KIND, Self::FIELDS, values)?;
        Ok(Self {
            id: Some(id),
            last_name: reader.text()?,
            company: reader.text()?,
            status: reader.picklist(LeadStatus::parse)?,
        })
    }

    fn validate(&self) -> Result<(), RecordValidationError> {
        require_text(Self::KIND, "last_name", &self.last_name)?;
        require_text(Self::KIND, "company", &self.company)
    }
}
