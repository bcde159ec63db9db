//! sqlviz CLI - serve the visualizer API or inspect queries locally
//!
//! Usage:
//!   sqlviz serve [--host <host>] [--port <port>] [--database <db>]
//!   sqlviz steps <query> [--database <db>]
//!   sqlviz run <query> [--database <db>]
//!   sqlviz lint <query>
//!   sqlviz schema [--database <db>]
//!   sqlviz seed <path>
//!
//! Examples:
//!   sqlviz seed employees.db
//!   sqlviz steps "SELECT name FROM employees WHERE salary > 80000"
//!   sqlviz serve --port 8080

use clap::{Parser, Subcommand};
use serde::Serialize;
use sqlviz::analysis::run_query;
use sqlviz::config::{Settings, SettingsError};
use sqlviz::lint::{analyze_query, complexity_score};
use sqlviz::store::{DataStore, SqliteStore, DEMO_SCRIPT};
use sqlviz::visualize::generate_steps;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "sqlviz")]
#[command(about = "sqlviz - step-by-step SQL query visualizer backend")]
#[command(version)]
struct Cli {
    /// Path to a sqlviz.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    #[cfg(feature = "server")]
    Serve {
        /// Interface to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Main SQLite database
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Print the visualization steps of a query as JSON
    Steps {
        query: String,

        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Print the full analysis of a query as JSON
    Run {
        query: String,

        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Print tips and complexity for a query
    Lint { query: String },

    /// Print the database schema as JSON
    Schema {
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Create the demo employees database
    Seed {
        /// Where to write the database
        path: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match load_settings(cli.config.as_ref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    install_tracing_subscriber(&settings.logging.filter);

    match cli.command {
        #[cfg(feature = "server")]
        Commands::Serve {
            host,
            port,
            database,
        } => cmd_serve(settings, host, port, database),
        Commands::Steps { query, database } => {
            with_store(&settings, database, |store| {
                print_json(&generate_steps(store, &query))
            })
        }
        Commands::Run { query, database } => with_store(&settings, database, |store| {
            match run_query(store, &query) {
                Ok(report) => print_json(&report),
                Err(e) => {
                    eprintln!("{}", e.user_message());
                    ExitCode::FAILURE
                }
            }
        }),
        Commands::Lint { query } => {
            #[derive(Serialize)]
            struct LintOutput {
                tips: Vec<sqlviz::lint::Tip>,
                complexity: sqlviz::lint::Complexity,
            }
            print_json(&LintOutput {
                tips: analyze_query(&query),
                complexity: complexity_score(&query),
            })
        }
        Commands::Schema { database } => with_store(&settings, database, |store| {
            match store.schema() {
                Ok(schema) => print_json(&schema),
                Err(e) => {
                    eprintln!("Database error: {}", e);
                    ExitCode::FAILURE
                }
            }
        }),
        Commands::Seed { path } => cmd_seed(path),
    }
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings, SettingsError> {
    match path {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    }
}

fn install_tracing_subscriber(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Open the main database (flag overrides config) and run `f` against it.
fn with_store(
    settings: &Settings,
    database: Option<PathBuf>,
    f: impl FnOnce(&dyn DataStore) -> ExitCode,
) -> ExitCode {
    let path = match database {
        Some(path) => path,
        None => match settings.resolve_paths() {
            Ok(paths) => paths.database,
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                return ExitCode::FAILURE;
            }
        },
    };
    if !path.exists() {
        eprintln!(
            "Database '{}' not found. Create one with `sqlviz seed {}`.",
            path.display(),
            path.display()
        );
        return ExitCode::FAILURE;
    }
    let store = SqliteStore::new(path);
    f(&store)
}

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Serialization error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_seed(path: PathBuf) -> ExitCode {
    match SqliteStore::create_from_script(&path, DEMO_SCRIPT) {
        Ok(_) => {
            println!("Seeded demo database at {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to seed '{}': {}", path.display(), e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(feature = "server")]
fn cmd_serve(
    mut settings: Settings,
    host: Option<String>,
    port: Option<u16>,
    database: Option<PathBuf>,
) -> ExitCode {
    use std::sync::Arc;
    use sqlviz::web::{serve, AppState};

    if let Some(host) = host {
        settings.server.host = host;
    }
    if let Some(port) = port {
        settings.server.port = port;
    }

    let paths = match settings.resolve_paths() {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let database = database.unwrap_or(paths.database);

    for (label, path) in [("database", &database), ("case database", &paths.case_database)] {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "{} file does not exist", label);
        }
    }

    let state = AppState {
        store: Arc::new(SqliteStore::new(database)),
        case_store: Arc::new(SqliteStore::new(paths.case_database)),
        curriculum_path: paths.curriculum,
        case_file_path: paths.case_file,
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(serve(state, &settings.server)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
