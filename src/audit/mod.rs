//! Append-only audit log of ledger writes
//!
//! Every create, update and delete made through the services is recorded as
//! one JSON line with the entity state before and after the change.

mod diff;
mod entry;
mod logger;

pub use diff::summarize_changes;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
