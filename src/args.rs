//! These structs provide the CLI interface for the wallet CLI.

use crate::api::Mode;
use crate::error::{ErrorType, IntoResult};
use crate::model::{TransactionId, UserId};
use crate::sync::LoadOrdering;
use crate::{Config, Result};
use anyhow::anyhow;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, error};
use tracing_subscriber::filter::LevelFilter;

/// wallet: A command-line client for a wallet service.
///
/// The purpose of this program is to show the transactions and the balance, income and expenses
/// that a wallet service holds for a user, and to delete transactions from it. Every command
/// talks to the service directly; nothing is cached between runs.
///
/// Run `wallet init --api-url <URL>` once to write a config file, or pass --api-url (or set
/// WALLET_API_URL) on every run instead.
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
    /// Write a config file pointing at your wallet service.
    ///
    /// The file is written to --config, which defaults to $HOME/wallet/config.json. The URL comes
    /// from --api-url or WALLET_API_URL and should be the base of the service's API, e.g.
    /// https://wallet.example.com/api
    Init(InitArgs),
    /// Load and print the transactions, balance, income and expenses of a user.
    List,
    /// Load and print only the balance, income and expenses of a user.
    Summary,
    /// Delete a transaction, then reload the user's transactions and summary.
    Delete(DeleteArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber crate for instructions.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The path to the config file. Defaults to ~/wallet/config.json
    #[arg(long, env = "WALLET_CONFIG", default_value_t = default_config_path())]
    config: DisplayPath,

    /// The base URL of the wallet service. Overrides the URL in the config file.
    #[arg(long, env = "WALLET_API_URL")]
    api_url: Option<String>,

    /// The user whose transactions are loaded. This is the identifier your sign-in provider
    /// assigned to you.
    #[arg(long, env = "WALLET_USER_ID")]
    user_id: Option<String>,
}

impl Common {
    pub fn new(
        log_level: LevelFilter,
        config: PathBuf,
        api_url: Option<String>,
        user_id: Option<String>,
    ) -> Self {
        Self {
            log_level,
            config: config.into(),
            api_url,
            user_id,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn config_path(&self) -> &DisplayPath {
        &self.config
    }

    pub fn api_url(&self) -> Option<&str> {
        self.api_url.as_deref()
    }

    /// The user ID, or `None` if it was not given or is blank.
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
            .as_deref()
            .map(UserId::from)
            .filter(|u| !u.is_empty())
    }

    /// Resolves the `Config` to run with.
    ///
    /// - If the config file exists it is loaded, and --api-url, when given, replaces its URL.
    /// - Otherwise --api-url alone is enough.
    /// - Otherwise, in test mode, the default config is used since nothing goes over the network.
    ///
    /// # Errors
    /// - Returns an `ErrorType::Config` error when none of the above applies, or when the file or
    ///   the URL is invalid.
    pub async fn config(&self, mode: Mode) -> Result<Config> {
        let path = self.config.path();
        let exists = tokio::fs::try_exists(path).await.unwrap_or(false);
        if exists {
            debug!("Loading config from {}", self.config);
            let config = Config::load(path).await?;
            return match self.api_url() {
                Some(api_url) => config.with_api_url(api_url),
                None => Ok(config),
            };
        }
        match (self.api_url(), mode) {
            (Some(api_url), _) => Config::new(api_url),
            (None, Mode::Testing) => Ok(Config::default()),
            (None, Mode::Http) => Err(anyhow!(
                "No config file found at {} and no --api-url given. Run `wallet init --api-url \
                <URL>` first, or pass --api-url or set WALLET_API_URL",
                self.config
            ))
            .pub_result(ErrorType::Config),
        }
    }
}

/// Args for the `wallet init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// How long to wait for each request to the wallet service, in seconds. When omitted the
    /// HTTP client's own default applies.
    #[arg(long)]
    request_timeout_secs: Option<u64>,

    /// What to do when loads overlap: last_write_wins installs whichever load finishes last,
    /// latest_started discards a load that finishes after a newer one.
    #[arg(long, value_enum, default_value_t = LoadOrdering::LastWriteWins)]
    load_ordering: LoadOrdering,
}

impl InitArgs {
    pub fn new(request_timeout_secs: Option<u64>, load_ordering: LoadOrdering) -> Self {
        Self {
            request_timeout_secs,
            load_ordering,
        }
    }

    pub fn request_timeout_secs(&self) -> Option<u64> {
        self.request_timeout_secs
    }

    pub fn load_ordering(&self) -> LoadOrdering {
        self.load_ordering
    }
}

/// Args for the `wallet delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The ID of the transaction to delete.
    id: String,
}

impl DeleteArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> TransactionId {
        TransactionId::new(self.id.trim())
    }
}

fn default_config_path() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("wallet").join("config.json"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --config or WALLET_CONFIG instead of relying on the default \
                config location.",
            );
            PathBuf::from("wallet").join("config.json")
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

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
