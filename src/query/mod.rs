//! Query analysis: parsing, clause extraction and truncation.
//!
//! ```text
//! query text ──parse──▶ ParsedQuery ──extract──▶ QueryStructure
//!      │
//!      └──build_truncated(boundary)──▶ query text without trailing clauses
//! ```
//!
//! Parsing is delegated to `sqlparser` using the SQLite dialect. Everything
//! here is pure; nothing touches the data store.

mod clause;
mod extract;
mod parse;
mod truncate;

pub use clause::ClauseKind;
pub use extract::{extract, JoinDescriptor, OrderDescriptor, QueryStructure, SortDirection};
pub use parse::{is_read_only, strip_leading_comments, ParseError, ParsedQuery};
pub use truncate::{build_truncated, BuildError};
