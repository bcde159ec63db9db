//! HTTP API for the sqlviz frontend.
//!
//! Every handler hands its blocking work (SQLite, file reads) to
//! `tokio::task::spawn_blocking` and returns JSON.

mod content;
mod server;

pub use server::{router, serve, ApiError, AppState, ServerError};
