//! CRM record model shared by store and services.
//!
//! # Responsibility
//! - Define the five CRM entities and their enumerated picklists.
//! - Expose one storage-neutral `Record` contract the store persists.
//!
//! # Invariants
//! - Every persisted record is identified by a store-assigned `RecordId`.
//! - Deletion is a tombstone owned by the store, not a model field.

pub mod account;
pub mod case;
pub mod contact;
pub mod lead;
pub mod opportunity;
pub mod record;
