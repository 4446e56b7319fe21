//! Record operations over an injected store.
//!
//! # Responsibility
//! - Expose each create/update/upsert/delete pattern as one service method.
//! - Keep every operation storage-agnostic through `RecordStore`.
//!
//! # Invariants
//! - An account is persisted (and has an id) before any record references it.
//! - Store failures propagate unchanged; nothing is retried or compensated.

pub mod account_service;
pub mod contact_service;
pub mod lifecycle_service;
pub mod opportunity_service;
