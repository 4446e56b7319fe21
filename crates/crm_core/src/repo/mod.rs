//! Record store contract and its SQLite implementation.
//!
//! # Responsibility
//! - Define the generic insert/update/upsert/delete/query capability the
//!   record operations are written against.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Every write validates records before touching storage.
//! - Multi-record writes are all-or-none.
//! - Empty input is a successful no-op for every operation.

pub mod record_store;
pub mod sqlite_store;
