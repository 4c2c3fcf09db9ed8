use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use oobgrant::auth::oauth::{self, Endpoints, StateMode};
use oobgrant::auth::storage::SqliteTokenStore;
use oobgrant::auth::{Authorizer, GrantOutcome};
use oobgrant::config::Config;
use oobgrant::consts::{DEFAULT_HTTP_TIMEOUT_SECS, GOOGLE_OAUTH2_BASE_URL, default_db_path};
use oobgrant::paste::PasteApproval;
use oobgrant::ui::TerminalView;

#[derive(Parser)]
#[command(
    name = "oobgrant",
    version,
    about = "Obtain and revoke a Google OAuth2 refresh token."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// SQLite database path for the token and config (use :memory: for ephemeral)
    #[arg(short, long, global = true)]
    db: Option<String>,

    /// OAuth client ID (overrides the stored value)
    #[arg(long, env = "OOBGRANT_CLIENT_ID", global = true)]
    client_id: Option<String>,

    /// OAuth client secret (overrides the stored value)
    #[arg(long, env = "OOBGRANT_CLIENT_SECRET", hide_env_values = true, global = true)]
    client_secret: Option<String>,

    /// Provider base URL
    #[arg(long, default_value = GOOGLE_OAUTH2_BASE_URL, global = true)]
    base_url: String,

    /// Timeout in seconds for each provider request
    #[arg(short, long, default_value_t = DEFAULT_HTTP_TIMEOUT_SECS, global = true)]
    timeout: u64,

    /// Send a random `state` and verify it on return
    #[arg(long, default_value_t = false, global = true)]
    random_state: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Obtain a refresh token through the browser
    Grant,
    /// Revoke the stored refresh token
    Revoke,
    /// Show whether a refresh token is stored
    Status,
    /// Read or change stored configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print a stored value
    Get { key: String },
    /// Store a value (client_id or client_secret)
    Set { key: String, value: String },
    /// Remove a stored value
    Unset { key: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("oobgrant=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let db = match cli.db.clone() {
        Some(db) => db,
        None => {
            let path = default_db_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            path.to_string_lossy().into_owned()
        }
    };
    let config = Config::open(&db)?;

    if let Command::Config { action } = &cli.command {
        handle_config(&config, action)?;
        return Ok(ExitCode::SUCCESS);
    }

    let credentials = config.credentials(cli.client_id.clone(), cli.client_secret.clone())?;
    let http = oauth::http_client(Duration::from_secs(cli.timeout))?;
    let store = Arc::new(SqliteTokenStore::open(&db)?);
    let view = Arc::new(TerminalView::new());
    let state_mode = if cli.random_state {
        StateMode::Random
    } else {
        StateMode::Fixed
    };

    let authorizer = Authorizer::new(credentials, http, store, view.clone())
        .with_endpoints(Endpoints::new(cli.base_url.as_str()))
        .with_state_mode(state_mode);

    let initial = authorizer.bootstrap()?;

    match cli.command {
        Command::Status => view.render(),
        Command::Grant => {
            if initial.is_granted() {
                view.render();
                anyhow::bail!("a refresh token is already stored; revoke it first");
            }
            // Failures are already shown by the view.
            match authorizer.start_grant(&PasteApproval::stdin()).await {
                Ok(GrantOutcome::Granted { .. }) => println!("✓ Refresh token obtained.\n"),
                Ok(GrantOutcome::Abandoned) => println!("\nNo approval received.\n"),
                Err(_) => return Ok(ExitCode::FAILURE),
            }
            view.render();
        }
        Command::Revoke => {
            if authorizer.revoke().await.is_err() {
                return Ok(ExitCode::FAILURE);
            }
            println!("✓ Refresh token revoked.\n");
            view.render();
        }
        Command::Config { .. } => {}
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_config(config: &Config, action: &ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => match config.get(key)? {
            Some(value) => println!("{value}"),
            None => anyhow::bail!("{key} is not set"),
        },
        ConfigAction::Set { key, value } => {
            config.set(key, value)?;
            println!("✓ {key} saved.");
        }
        ConfigAction::Unset { key } => {
            config.remove(key)?;
            println!("✓ {key} removed.");
        }
    }
    Ok(())
}
