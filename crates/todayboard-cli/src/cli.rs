//! Command-line interface definition.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use todayboard_core::{OutputFormat, TracingConfig};
use tracing::Level;

use crate::config::{ClientConfig, CredentialOverrides};

/// todayboard - Today's calendar events and tasks at a glance
#[derive(Debug, Parser)]
#[command(name = "todayboard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "TODAYBOARD_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// OAuth client ID (from Google Cloud Console)
    #[arg(long, env = "GOOGLE_CLIENT_ID", global = true)]
    pub client_id: Option<String>,

    /// OAuth client secret (from Google Cloud Console)
    #[arg(long, env = "GOOGLE_CLIENT_SECRET", global = true, hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Path to a Google Cloud Console client secrets JSON file
    #[arg(long, env = "GOOGLE_CREDENTIALS_FILE", global = true)]
    pub credentials_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Returns the output format based on CLI flags.
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Tty
        }
    }

    /// OAuth client credentials given on the command line or environment.
    pub fn credential_overrides(&self) -> CredentialOverrides {
        CredentialOverrides {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            credentials_file: self.credentials_file.clone(),
        }
    }

    /// Whether the command keeps running until interrupted.
    pub fn is_long_running(&self) -> bool {
        matches!(self.command, Some(Command::Watch { .. } | Command::Serve { .. }))
    }

    /// Picks the logging setup for the command being run.
    pub fn tracing_config(&self) -> TracingConfig {
        match (self.is_long_running(), self.debug) {
            (true, false) => TracingConfig::daemon(),
            (true, true) => TracingConfig::daemon().with_level(Level::DEBUG),
            (false, false) => TracingConfig::cli(),
            (false, true) => TracingConfig::cli_debug(),
        }
    }

    /// The configuration file in effect.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(ClientConfig::default_path)
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Authentication commands
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Show today's events and tasks (the default)
    Show,

    /// Re-render today's dashboard on an interval
    Watch {
        /// Refresh interval in seconds (defaults to [refresh].interval_secs)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Add a task due today
    Add {
        /// Task title
        title: String,
    },

    /// Mark a task completed
    Done {
        /// Task id, as shown by `todayboard show`
        task_id: String,
    },

    /// Run the web dashboard
    Serve {
        /// Address to listen on (defaults to [server].bind)
        #[arg(long)]
        bind: Option<SocketAddr>,

        /// Externally visible base URL used for the OAuth redirect
        #[arg(long)]
        public_url: Option<String>,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Authentication actions.
#[derive(Debug, Subcommand)]
pub enum AuthAction {
    /// Authorize access to Google Calendar and Tasks in the browser
    Login {
        /// Force re-authentication even if already authenticated
        #[arg(long, short)]
        force: bool,
    },

    /// Forget the stored credential
    Logout,

    /// Show whether a credential is stored
    Status,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
