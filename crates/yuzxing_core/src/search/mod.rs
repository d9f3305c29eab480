//! Note search.
//!
//! # Responsibility
//! - Match notes against user query text.
//!
//! # Invariants
//! - Matching is a Unicode case-insensitive substring test over title and
//!   content; no index is involved.

pub mod substring;

pub use substring::filter_notes;
