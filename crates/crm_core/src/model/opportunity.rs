//! Opportunity entity and its sales stage picklist.
//!
//! # Invariants
//! - `name`, `stage` and `close_date` are always present.
//! - `amount` is never negative when set.

use crate::model::record::{
    require_text, FieldReader, FieldValue, Record, RecordId, RecordKind, RecordValidationError,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sales stage, stored by its platform label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityStage {
    Prospecting,
    Qualification,
    NeedsAnalysis,
    ValueProposition,
    IdDecisionMakers,
    PerceptionAnalysis,
    ProposalPriceQuote,
    NegotiationReview,
    ClosedWon,
    ClosedLost,
}

impl OpportunityStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prospecting => "Prospecting",
            Self::Qualification => "Qualification",
            Self::NeedsAnalysis => "Needs Analysis",
            Self::ValueProposition => "Value Proposition",
            Self::IdDecisionMakers => "Id. Decision Makers",
            Self::PerceptionAnalysis => "Perception Analysis",
            Self::ProposalPriceQuote => "Proposal/Price Quote",
            Self::NegotiationReview => "Negotiation/Review",
            Self::ClosedWon => "Closed Won",
            Self::ClosedLost => "Closed Lost",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Prospecting" => Some(Self::Prospecting),
            "Qualification" => Some(Self::Qualification),
            "Needs Analysis" => Some(Self::NeedsAnalysis),
            "Value Proposition" => Some(Self::ValueProposition),
            "Id. Decision Makers" => Some(Self::IdDecisionMakers),
            "Perception Analysis" => Some(Self::PerceptionAnalysis),
            "Proposal/Price Quote" => Some(Self::ProposalPriceQuote),
            "Negotiation/Review" => Some(Self::NegotiationReview),
            "Closed Won" => Some(Self::ClosedWon),
            "Closed Lost" => Some(Self::ClosedLost),
            _ => None,
        }
    }
}

/// Potential deal, optionally attached to an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: Option<RecordId>,
    pub name: String,
    pub stage: OpportunityStage,
    pub close_date: NaiveDate,
    pub amount: Option<f64>,
    pub account_id: Option<RecordId>,
}

impl Opportunity {
    pub const NAME_FIELD: &'static str = "name";
    pub const ACCOUNT_ID_FIELD: &'static str = "account_id";

    pub fn new(name: impl Into<String>, stage: OpportunityStage, close_date: NaiveDate) -> Self {
        Self {
            id: None,
            name: name.into(),
            stage,
            close_date,
            amount: None,
            account_id: None,
        }
    }
}

impl Record for Opportunity {
    const KIND: RecordKind = RecordKind::Opportunity;
    const FIELDS: &'static [&'static str] =
        &["name", "stage", "close_date", "amount", "account_id"];
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
            self.name.clone().into(),
            self.stage.as_str().into(),
            self.close_date.into(),
            self.amount.into(),
            self.account_id.into(),
        ]
    }

    fn from_fields(id: RecordId, values: Vec<FieldValue>) -> Result<Self, RecordValidationError> {
        let mut reader = FieldReader::new(Self::KIND, Self::FIELDS, values)?;
        Ok(Self {
            id: Some(id),
            name: reader.text()?,
            stage: reader.picklist(OpportunityStage::parse)?,
            close_date: reader.date()?,
            amount: reader.optional_decimal()?,
            account_id: reader.optional_reference()?,
        })
    }

    fn validate(&self) -> Result<(), RecordValidationError> {
        require_text(Self::KIND, Self::NAME_FIELD, &self.name)?;
        if self.amount.is_some_and(|amount| amount < 0.0) {
            return Err(RecordValidationError::NegativeValue {
                kind: Self::KIND,
                field: "amount",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::OpportunityStage;

    #[test]
    fn stage_labels_parse_back() {
        for stage in [
            OpportunityStage::Prospecting,
            OpportunityStage::IdDecisionMakers,
            OpportunityStage::ProposalPriceQuote,
            OpportunityStage::ClosedLost,
        ] {
            assert_eq!(OpportunityStage::parse(stage.as_str()), Some(stage));
        }
        assert_eq!(OpportunityStage::parse("prospecting"), None);
    }
}
