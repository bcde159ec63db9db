//! # sqlviz
//!
//! A backend that shows learners how a SQL query is evaluated, one clause
//! at a time.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                 Query text (from learner)                │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [query::parse]
//! ┌─────────────────────────────────────────────────────────┐
//! │           ParsedQuery  →  QueryStructure                 │
//! │   (tables, joins, filter, grouping, ordering, columns)   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [visualize]
//! ┌─────────────────────────────────────────────────────────┐
//! │   per clause: build_truncated → DataStore::execute       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [analysis]
//! ┌─────────────────────────────────────────────────────────┐
//! │   steps + full results + tips + complexity               │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Around the core sit the lesson curriculum ([`lessons`]), the detective
//! case ([`case`]), and the HTTP API ([`web`], behind the `server` feature).

pub mod analysis;
pub mod case;
pub mod config;
pub mod content;
pub mod lessons;
pub mod lint;
pub mod query;
pub mod store;
pub mod visualize;

#[cfg(feature = "server")]
pub mod web;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::analysis::{run_query, QueryError, QueryReport};
    pub use crate::query::{
        build_truncated, extract, is_read_only, ClauseKind, ParsedQuery, QueryStructure,
    };
    pub use crate::store::{DataStore, ExecutionError, QueryResult, SqliteStore};
    pub use crate::visualize::{generate_steps, StepKind, VisualizationStep};
}

pub use analysis::run_query;
pub use visualize::generate_steps;
