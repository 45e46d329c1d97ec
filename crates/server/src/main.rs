//! Mutuo web service
//!
//! Serves a single page that answers mortgage and financing questions from
//! a pre-built passage index, with optional source citations.

mod markdown;
mod page;
mod server;
mod state;

use anyhow::Context;
use clap::Parser;
use mutuo_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;
use tokio::net::TcpListener;

use crate::state::AppState;

/// Mortgage and financing Q&A assistant
#[derive(Parser, Debug)]
#[command(name = "mutuo")]
#[command(about = "Mortgage and financing Q&A over a local passage index", long_about = None)]
#[command(version)]
struct Cli {
    /// Address to listen on (default: 127.0.0.1:8501)
    #[arg(short, long, env = "MUTUO_BIND")]
    bind: Option<String>,

    /// Directory holding index.sqlite (default: vectordb)
    #[arg(short, long, env = "MUTUO_INDEX_DIR")]
    index_dir: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, env = "MUTUO_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    no_color: bool,
}

/// Process-level settings: listening address and logging.
///
/// Taken from the merged configuration, or from the command line alone when
/// the configuration failed to load.
#[derive(Debug, PartialEq)]
struct ProcessSettings {
    bind: String,
    log_level: Option<String>,
    no_color: bool,
}

impl ProcessSettings {
    fn from_config(config: &AppConfig) -> Self {
        Self {
            bind: config.bind.clone(),
            log_level: config.log_level.clone(),
            no_color: config.no_color,
        }
    }

    fn from_cli(cli: &Cli) -> Self {
        let config = AppConfig::default().with_overrides(
            cli.bind.clone(),
            None,
            cli.log_level.clone(),
            cli.verbose,
            cli.no_color,
        );
        Self::from_config(&config)
    }

    fn resolve(cli: &Cli, config: &AppResult<AppConfig>) -> Self {
        match config {
            Ok(config) => Self::from_config(config),
            Err(_) => Self::from_cli(cli),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env must be loaded before clap reads env fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Configuration errors are served as pages, not process failures
    let config = AppConfig::load(cli.config.as_deref()).map(|config| {
        config.with_overrides(
            cli.bind.clone(),
            cli.index_dir.clone(),
            cli.log_level.clone(),
            cli.verbose,
            cli.no_color,
        )
    });
    let settings = ProcessSettings::resolve(&cli, &config);

    logging::init_logging(settings.log_level.as_deref(), settings.no_color)?;

    tracing::info!("Mutuo starting");
    if let Ok(ref config) = config {
        tracing::debug!("Configuration: {:?}", config);
    }

    let state = AppState::initialize(config)?;
    let app = server::router::router(state);

    let listener = TcpListener::bind(&settings.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", settings.bind))?;
    let addr = listener.local_addr()?;

    println!("Mutuo listening on http://{}", addr);
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mutuo_core::AppError;
    use tempfile::TempDir;

    fn cli() -> Cli {
        Cli {
            bind: None,
            index_dir: None,
            config: None,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }

    #[test]
    fn test_logging_follows_yaml_settings() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mutuo.yaml");
        std::fs::write(
            &path,
            "bind: 0.0.0.0:9100\nlogging:\n  level: warn\n  color: false\n",
        )
        .unwrap();

        let config = AppConfig::from_lookup(
            |key| (key == "OPENAI_API_KEY").then(|| "sk-test".to_string()),
            Some(&path),
        );
        let settings = ProcessSettings::resolve(&cli(), &config);

        assert_eq!(
            settings,
            ProcessSettings {
                bind: "0.0.0.0:9100".to_string(),
                log_level: Some("warn".to_string()),
                no_color: true,
            }
        );
    }

    #[test]
    fn test_cli_flags_override_yaml_logging() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mutuo.yaml");
        std::fs::write(&path, "logging:\n  level: warn\n").unwrap();

        let mut cli = cli();
        cli.log_level = Some("trace".to_string());
        let config = AppConfig::from_lookup(
            |key| (key == "OPENAI_API_KEY").then(|| "sk-test".to_string()),
            Some(&path),
        )
        .map(|config| config.with_overrides(None, None, cli.log_level.clone(), false, false));

        let settings = ProcessSettings::resolve(&cli, &config);
        assert_eq!(settings.log_level.as_deref(), Some("trace"));
    }

    #[test]
    fn test_failed_config_falls_back_to_cli() {
        let mut cli = cli();
        cli.bind = Some("127.0.0.1:9200".to_string());
        cli.verbose = true;
        cli.no_color = true;

        let config = Err(AppError::MissingCredential("OPENAI_API_KEY".to_string()));
        let settings = ProcessSettings::resolve(&cli, &config);

        assert_eq!(settings.bind, "127.0.0.1:9200");
        assert_eq!(settings.log_level.as_deref(), Some("debug"));
        assert!(settings.no_color);
    }

    #[test]
    fn test_failed_config_without_flags_uses_defaults() {
        let config = Err(AppError::MissingCredential("OPENAI_API_KEY".to_string()));
        let settings = ProcessSettings::resolve(&cli(), &config);

        assert_eq!(settings.bind, AppConfig::default().bind);
        assert_eq!(settings.log_level, None);
    }
}
