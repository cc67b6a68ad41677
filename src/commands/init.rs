use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory with its `config.json` and SQLite session store.
///
/// # Arguments
/// - `finn_home` - The directory that will be the root of the data directory, e.g. `$HOME/finn`
/// - `api_url` - The backend URL to save. The default local backend is used when `None`.
///
/// # Errors
/// - Returns an error if `api_url` is not an http(s) URL or any file operation fails.
pub async fn init(finn_home: &Path, api_url: Option<&str>) -> Result<Out<()>> {
    let config = Config::create(finn_home, api_url)
        .await
        .context("Unable to create the data directory and configs")?;
    Ok(format!(
        "Created {} using backend {}",
        config.root().display(),
        config.api_url()
    )
    .into())
}
