//! These structs provide the CLI interface for the finn CLI.

use crate::model::plaid::{DEFAULT_DAYS, DEFAULT_STOCK_DAYS};
use crate::model::{SettingsUpdate, TransactionQuery};
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// finn: the command-line front-end for Finn AI.
///
/// Sign in with your phone number, link a bank through Plaid, and look at your accounts,
/// transactions and spending from the terminal. A Finn backend must be running; by default it is
/// expected at http://localhost:5001/api.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and its configuration file and session database.
    ///
    /// Run this once before anything else. The backend URL given with --api-url (or
    /// FINN_API_URL) is saved to the config file.
    Init,
    /// Text a verification code to your phone.
    Login(LoginArgs),
    /// Check the code you received and sign in.
    Verify(VerifyArgs),
    /// Sign out and forget the stored session.
    Logout,
    /// Show who is signed in.
    Status(StatusArgs),
    /// List your linked accounts and their balances.
    Accounts,
    /// List recent transactions, newest first.
    Transactions(TransactionsArgs),
    /// Show total balance, spending by category and the balance history of the last 30 days.
    Dashboard(DashboardArgs),
    /// Connect a bank through Plaid Link.
    Link(LinkArgs),
    /// Show or change your notification and assistant settings.
    Settings(SettingsArgs),
    /// Ask the Finn assistant a question.
    Chat(ChatArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where finn configuration and the session are held. Defaults to ~/finn
    #[arg(long, env = "FINN_HOME", default_value_t = default_finn_home())]
    finn_home: DisplayPath,

    /// The backend URL, e.g. http://localhost:5001/api. Overrides the config file.
    #[arg(long, env = "FINN_API_URL")]
    api_url: Option<String>,
}

impl Common {
    pub fn new(log_level: LevelFilter, finn_home: PathBuf, api_url: Option<String>) -> Self {
        Self {
            log_level,
            finn_home: finn_home.into(),
            api_url,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn finn_home(&self) -> &DisplayPath {
        &self.finn_home
    }

    pub fn api_url(&self) -> Option<&str> {
        self.api_url.as_deref()
    }
}

/// (Not shown): Args for the `finn login` command.
#[derive(Debug, Parser, Clone)]
pub struct LoginArgs {
    /// Your phone number. Numbers without a leading + are treated as US numbers.
    #[arg(long)]
    phone: String,
}

impl LoginArgs {
    pub fn new(phone: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
        }
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }
}

/// (Not shown): Args for the `finn verify` command.
#[derive(Debug, Parser, Clone)]
pub struct VerifyArgs {
    /// The phone number the code was sent to.
    #[arg(long)]
    phone: String,

    /// The 6-digit code from the text message.
    #[arg(long)]
    code: String,
}

impl VerifyArgs {
    pub fn new(phone: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            code: code.into(),
        }
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

/// (Not shown): Args for the `finn status` command.
#[derive(Debug, Parser, Clone)]
pub struct StatusArgs {
    /// Also check that the backend is reachable.
    #[arg(long)]
    ping: bool,
}

impl StatusArgs {
    pub fn ping(&self) -> bool {
        self.ping
    }
}

/// (Not shown): Args for the `finn transactions` command.
#[derive(Debug, Parser, Clone)]
pub struct TransactionsArgs {
    /// How many days back to look. Defaults to 30, or 365 with --stock-only.
    #[arg(long)]
    days: Option<u32>,

    /// Only investment transactions.
    #[arg(long)]
    stock_only: bool,

    /// Leave out transactions that were entered by hand.
    #[arg(long)]
    no_custom: bool,
}

impl TransactionsArgs {
    pub fn new(days: Option<u32>, stock_only: bool, no_custom: bool) -> Self {
        Self {
            days,
            stock_only,
            no_custom,
        }
    }

    pub fn query(&self) -> TransactionQuery {
        let default_days = if self.stock_only {
            DEFAULT_STOCK_DAYS
        } else {
            DEFAULT_DAYS
        };
        TransactionQuery {
            days: self.days.unwrap_or(default_days),
            stock_only: self.stock_only,
            include_custom: !self.no_custom,
        }
    }
}

/// (Not shown): Args for the `finn dashboard` command.
#[derive(Debug, Parser, Clone)]
pub struct DashboardArgs {
    /// How many days of transactions to fetch for the spending breakdown.
    #[arg(long, default_value_t = DEFAULT_DAYS)]
    days: u32,
}

impl DashboardArgs {
    pub fn days(&self) -> u32 {
        self.days
    }
}

/// (Not shown): Args for the `finn link` command.
#[derive(Debug, Parser, Clone)]
pub struct LinkArgs {
    #[command(subcommand)]
    action: LinkSubcommand,
}

impl LinkArgs {
    pub fn action(&self) -> &LinkSubcommand {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum LinkSubcommand {
    /// Create a Plaid Link token to open Plaid Link with.
    Token,
    /// Exchange the public token Plaid Link returned.
    Exchange(ExchangeArgs),
    /// Show whether a bank is linked.
    Status,
}

/// (Not shown): Args for the `finn link exchange` command.
#[derive(Debug, Parser, Clone)]
pub struct ExchangeArgs {
    /// The public token from Plaid Link.
    public_token: String,

    /// Link during signup, before signing in, for the user with this phone number.
    #[arg(long)]
    signup_phone: Option<String>,
}

impl ExchangeArgs {
    pub fn public_token(&self) -> &str {
        &self.public_token
    }

    pub fn signup_phone(&self) -> Option<&str> {
        self.signup_phone.as_deref()
    }
}

/// (Not shown): Args for the `finn settings` command.
#[derive(Debug, Parser, Clone)]
pub struct SettingsArgs {
    #[command(subcommand)]
    action: SettingsSubcommand,
}

impl SettingsArgs {
    pub fn action(&self) -> &SettingsSubcommand {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum SettingsSubcommand {
    /// Show your settings.
    Get,
    /// Change one or more settings. Settings you leave out keep their value.
    Set(SettingsSetArgs),
}

/// (Not shown): Args for the `finn settings set` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct SettingsSetArgs {
    /// Daily notification time, HH:MM.
    #[arg(long)]
    notification_time: Option<String>,

    /// The assistant model.
    #[arg(long)]
    model: Option<String>,

    /// The assistant's sampling temperature.
    #[arg(long)]
    temperature: Option<f64>,

    /// An IANA timezone, e.g. America/New_York.
    #[arg(long)]
    timezone: Option<String>,

    /// Send a weekly finance summary: true or false.
    #[arg(long)]
    financial_weekly_summary: Option<bool>,

    /// When to send the weekly finance summary, HH:MM.
    #[arg(long)]
    financial_weekly_summary_time: Option<String>,

    /// Send a weekly stock summary: true or false.
    #[arg(long)]
    stock_weekly_summary: Option<bool>,

    /// When to send the weekly stock summary, HH:MM.
    #[arg(long)]
    stock_weekly_summary_time: Option<String>,
}

impl SettingsSetArgs {
    pub fn update(&self) -> SettingsUpdate {
        SettingsUpdate {
            notification_time: self.notification_time.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
            timezone: self.timezone.clone(),
            financial_weekly_summary: self.financial_weekly_summary,
            financial_weekly_summary_time: self.financial_weekly_summary_time.clone(),
            stock_weekly_summary: self.stock_weekly_summary,
            stock_weekly_summary_time: self.stock_weekly_summary_time.clone(),
        }
    }
}

/// (Not shown): Args for the `finn chat` command.
#[derive(Debug, Parser, Clone)]
pub struct ChatArgs {
    /// What to ask.
    message: String,
}

impl ChatArgs {
    pub fn message(&self) -> &str {
        &self.message
    }
}

fn default_finn_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("finn"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --finn-home or FINN_HOME instead of relying on the default \
                finn home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("finn")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
