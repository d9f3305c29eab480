//! Store use-cases.
//!
//! # Responsibility
//! - Expose the `NotesStore` facade consumed by every screen/CLI command.
//! - Keep callers decoupled from SQL and connection handling.

pub mod backup;
pub mod import;
pub mod store;
