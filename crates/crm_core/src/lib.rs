//! Core record operations for the CRM sample workspace.
//! Every operation runs against an injected `RecordStore`.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::account::Account;
pub use model::case::{Case, CaseStatus};
pub use model::contact::Contact;
pub use model::lead::{Lead, LeadStatus};
pub use model::opportunity::{Opportunity, OpportunityStage};
pub use model::record::{FieldValue, Record, RecordId, RecordKind, RecordValidationError};
pub use repo::record_store::{RecordStore, RepoError, RepoResult, UpsertOutcome};
pub use repo::sqlite_store::SqliteRecordStore;
pub use service::account_service::AccountService;
pub use service::contact_service::ContactService;
pub use service::lifecycle_service::LifecycleService;
pub use service::opportunity_service::OpportunityService;

/// Minimal health-check API for wiring probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
