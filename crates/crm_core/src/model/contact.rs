//! Contact entity.

use crate::model::record::{
    check_email, require_text, FieldReader, FieldValue, Record, RecordId, RecordKind,
    RecordValidationError,
};
use serde::{Deserialize, Serialize};

/// Person attached to an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: Option<RecordId>,
    pub first_name: Option<String>,
    /// Required. Also used as the account name when linking by surname.
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Must reference a persisted account when set.
    pub account_id: Option<RecordId>,
}

impl Contact {
    pub const LAST_NAME_FIELD: &'static str = "last_name";
    pub const ACCOUNT_ID_FIELD: &'static str = "account_id";

    pub fn new(last_name: impl Into<String>) -> Self {
        Self {
            id: None,
            first_name: None,
            last_name: last_name.into(),
            email: None,
            phone: None,
            account_id: None,
        }
    }
}

impl Record for Contact {
    const KIND: RecordKind = RecordKind::Contact;
    const FIELDS: &'static [&'static str] =
        &["first_name", "last_name", "email", "phone", "account_id"];
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
            self.first_name.clone().into(),
            self.last_name.clone().into(),
            self.email.clone().into(),
            self.phone.clone().into(),
            self.account_id.into(),
        ]
    }

    fn from_fields(id: RecordId, values: Vec<FieldValue>) -> Result<Self, RecordValidationError> {
        let mut reader = FieldReader::new(Self::KIND, Self::FIELDS, values)?;
        Ok(Self {
            id: Some(id),
            first_name: reader.optional_text()?,
            last_name: reader.text()?,
            email: reader.optional_text()?,
            phone: reader.optional_text()?,
            account_id: reader.optional_reference()?,
        })
    }

    fn validate(&self) -> Result<(), RecordValidationError> {
        require_text(Self::KIND, Self::LAST_NAME_FIELD, &self.last_name)?;
        check_email(self.email.as_deref())
    }
}
