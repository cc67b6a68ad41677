//! Configuration file handling for Finn.
//!
//! The configuration file is stored at `$FINN_HOME/config.json` and holds the backend origin and
//! request settings. The session database lives next to it at `$FINN_HOME/finn.sqlite`.

use crate::api::{ApiClient, DEFAULT_API_URL};
use crate::db::Db;
use crate::session::{SessionStore, SqliteStore};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_NAME: &str = "finn";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const FINN_SQLITE: &str = "finn.sqlite";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$FINN_HOME` and from there it loads `$FINN_HOME/config.json`. It provides the
/// backend client and the persisted session store.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    sqlite_path: PathBuf,
}

impl Config {
    /// Creates the data directory and:
    /// - writes an initial `config.json`, using `api_url` if given, otherwise the default backend
    /// - initializes the SQLite session database
    ///
    /// # Errors
    /// - Returns an error if the directory or either file cannot be created.
    pub async fn create(dir: impl Into<PathBuf>, api_url: Option<&str>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the finn home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            api_url: api_url.unwrap_or(DEFAULT_API_URL).to_string(),
            ..ConfigFile::default()
        };
        // Fail early on a URL the client could never use.
        let _ = ApiClient::new(&config_file.api_url)?;
        config_file.save(&config_path).await?;

        let sqlite_path = root.join(FINN_SQLITE);
        Db::init(&sqlite_path)
            .await
            .context("Unable to create SQLite DB")?;

        Ok(Self {
            root,
            config_path,
            config_file,
            sqlite_path,
        })
    }

    /// This will
    /// - validate that `finn_home` exists and that the config file exists
    /// - load the config file
    /// - return the loaded configuration object
    pub async fn load(finn_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = finn_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Finn Home is missing, run 'finn init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run 'finn init' first",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path).await?;

        Ok(Self {
            sqlite_path: root.join(FINN_SQLITE),
            root,
            config_path,
            config_file,
        })
    }

    /// Replaces the backend URL for this process only; the file on disk is untouched.
    pub fn with_api_url(mut self, api_url: Option<&str>) -> Self {
        if let Some(api_url) = api_url {
            self.config_file.api_url = api_url.to_string();
        }
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn sqlite_path(&self) -> &Path {
        &self.sqlite_path
    }

    pub fn api_url(&self) -> &str {
        &self.config_file.api_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.config_file.timeout_secs.map(Duration::from_secs)
    }

    /// Creates a client for the configured backend.
    pub fn api_client(&self) -> Result<ApiClient> {
        ApiClient::with_timeout(self.api_url(), self.timeout())
    }

    /// Opens the SQLite database and hydrates the session stored in it.
    pub async fn open_session(&self) -> Result<SessionStore<SqliteStore>> {
        let db = Db::load(&self.sqlite_path)
            .await
            .context("Unable to load SQLite DB")?;
        Ok(SessionStore::open(SqliteStore::new(db)).await)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "finn",
///   "config_version": 1,
///   "api_url": "http://localhost:5001/api",
///   "timeout_secs": 30
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "finn"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Base URL of the backend API, including the `/api` prefix
    api_url: String,

    /// Overall per-request timeout. No timeout when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or names another application
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
