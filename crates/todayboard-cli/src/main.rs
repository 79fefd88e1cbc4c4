//! todayboard CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use todayboard_core::init_tracing;

use todayboard_cli::cli::{AuthAction, Cli, Command, ConfigAction};
use todayboard_cli::commands::{self, LOGIN_HINT};
use todayboard_cli::config::ClientConfig;
use todayboard_cli::error::{ClientError, ClientResult};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.tracing_config()) {
        eprintln!("warning: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            if e.needs_login() {
                eprintln!("{}", LOGIN_HINT);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config_path = cli.config_path();
    let config = if cli.config.is_some() {
        ClientConfig::load_from(&config_path)
    } else {
        ClientConfig::load()
    }
    .map_err(ClientError::Config)?;

    let overrides = cli.credential_overrides();
    let format = cli.output_format();

    match cli.command {
        Some(Command::Auth { action }) => match action {
            AuthAction::Login { force } => commands::auth::login(&config, &overrides, force).await,
            AuthAction::Logout => commands::auth::logout(&config),
            AuthAction::Status => commands::auth::status(&config, format),
        },
        Some(Command::Show) | None => commands::show::show(&config, &overrides, format).await,
        Some(Command::Watch { interval }) => {
            commands::watch::watch(&config, &overrides, format, interval).await
        }
        Some(Command::Add { title }) => {
            commands::tasks::add(&config, &overrides, &title, format).await
        }
        Some(Command::Done { task_id }) => {
            commands::tasks::done(&config, &overrides, &task_id, format).await
        }
        Some(Command::Serve { bind, public_url }) => {
            commands::serve::serve(&config, &overrides, bind, public_url).await
        }
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config, &overrides),
            ConfigAction::Path => commands::config::path(&config_path),
        },
    }
}
