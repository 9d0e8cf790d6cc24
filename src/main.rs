use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gatepost::accounts::{self, AccountStore};
use gatepost::clock::Clock;
use gatepost::config::Config;
use gatepost::image_host::ImageHost;
use gatepost::ledger::{Ledger, OperatorCredential};
use gatepost::server;

#[derive(Parser)]
#[command(name = "gatepost", version, about = "Membership-gated content service")]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "/etc/gatepost/config.toml", env = "GATEPOST_CONFIG")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the member-facing service
    Serve,

    /// Operator maintenance against the stores, without a running server
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Extend a member's subscription
    Extend {
        username: String,
        /// Days to grant; defaults to the configured extension period
        #[arg(long)]
        days: Option<i64>,
    },
    /// Dump the member table as JSON
    Accounts,
    /// Upload an image to the configured host and print its URL
    UploadImage { file: PathBuf },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

async fn run_admin(action: AdminAction, cfg: Config) -> Result<(), Box<dyn Error + Send + Sync>> {
    match action {
        AdminAction::Extend { username, days } => {
            let store = accounts::open(&cfg.accounts_db_path).await?;
            let clock = Clock::from_offset_hours(cfg.utc_offset_hours)?;
            let operator = OperatorCredential {
                username: cfg.operator.username.clone(),
                password: cfg.operator.password.clone(),
            };
            let ledger = Ledger::new(store, operator, clock);
            let days = days.unwrap_or(cfg.default_extension_days);
            let new_expiry = ledger.extend_subscription(&username, days).await?;
            println!("{username} active until {new_expiry}");
        }
        AdminAction::Accounts => {
            let store = accounts::open(&cfg.accounts_db_path).await?;
            let rows = store.list().await?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        AdminAction::UploadImage { file } => {
            let Some(host_cfg) = cfg.image_host.as_ref() else {
                return Err("no [image_host] section configured".into());
            };
            let host = ImageHost::new(host_cfg)?;
            match host.upload(&file).await? {
                Some(url) => println!("{url}"),
                None => println!("upload failed, publish without an image"),
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let cfg = match Config::from_file(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("failed to load config {}: {e}", cli.config);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Serve => server::run(cfg, cli.config.clone()).await,
        Commands::Admin { action } => run_admin(action, cfg).await,
    };

    if let Err(e) = result {
        tracing::error!("command failed: {e}");
        std::process::exit(1);
    }
}
