use clap::Parser;
use finn::args::{Args, Command, LinkSubcommand, SettingsSubcommand};
use finn::{commands, Config, Result};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().finn_home().path();
    let api_url = args.common().api_url();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init => commands::init(home, api_url).await?.print(),

        Command::Login(login_args) => {
            let config = load(home, api_url).await?;
            commands::login(&config, login_args.phone()).await?.print()
        }

        Command::Verify(verify_args) => {
            let config = load(home, api_url).await?;
            commands::verify(&config, verify_args.phone(), verify_args.code())
                .await?
                .print()
        }

        Command::Logout => commands::logout(&load(home, api_url).await?)
            .await?
            .print(),

        Command::Status(status_args) => {
            let config = load(home, api_url).await?;
            commands::status(&config, status_args.ping()).await?.print()
        }

        Command::Accounts => commands::accounts(&load(home, api_url).await?)
            .await?
            .print(),

        Command::Transactions(transactions_args) => {
            let config = load(home, api_url).await?;
            commands::transactions(&config, transactions_args.query())
                .await?
                .print()
        }

        Command::Dashboard(dashboard_args) => {
            let config = load(home, api_url).await?;
            let today = chrono::Local::now().date_naive();
            commands::dashboard(&config, dashboard_args.days(), today)
                .await?
                .print()
        }

        Command::Link(link_args) => {
            let config = load(home, api_url).await?;
            match link_args.action() {
                LinkSubcommand::Token => commands::link_token(&config).await?.print(),
                LinkSubcommand::Exchange(exchange_args) => commands::link_exchange(
                    &config,
                    exchange_args.public_token(),
                    exchange_args.signup_phone(),
                )
                .await?
                .print(),
                LinkSubcommand::Status => commands::link_status(&config).await?.print(),
            }
        }

        Command::Settings(settings_args) => {
            let config = load(home, api_url).await?;
            match settings_args.action() {
                SettingsSubcommand::Get => commands::settings_get(&config).await?.print(),
                SettingsSubcommand::Set(set_args) => {
                    commands::settings_set(&config, set_args.update())
                        .await?
                        .print()
                }
            }
        }

        Command::Chat(chat_args) => {
            let config = load(home, api_url).await?;
            commands::chat(&config, chat_args.message()).await?.print()
        }
    };
    Ok(())
}

/// Loads `$FINN_HOME/config.json`, with `--api-url` taking precedence over the saved URL.
async fn load(home: &Path, api_url: Option<&str>) -> Result<Config> {
    Ok(Config::load(home).await?.with_api_url(api_url))
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
