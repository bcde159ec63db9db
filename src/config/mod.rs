//! Configuration module for sqlviz.
//!
//! Handles the TOML settings file and environment variable expansion.

mod settings;

pub use settings::{
    expand_env_vars, ContentSettings, DatabaseSettings, LoggingSettings, ResolvedPaths,
    ServerSettings, Settings, SettingsError,
};
