use anyhow::{Context, Result};
use siftin_core::{LocalCache, LocalStorage};
use siftin_sync::{ApiClient, ApiConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Global options shared by every command
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub storage: Option<PathBuf>,
    pub timeout_ms: u64,
}

impl Settings {
    pub fn storage(&self) -> Result<LocalStorage> {
        let path = match &self.storage {
            Some(path) => path.clone(),
            None => LocalStorage::default_path().context("Could not locate local storage")?,
        };
        tracing::debug!("Using local storage at {}", path.display());
        Ok(LocalStorage::open(path))
    }

    pub fn cache(&self) -> Result<LocalCache> {
        Ok(LocalCache::new(self.storage()?))
    }

    pub fn api_config(&self) -> Result<ApiConfig> {
        Ok(ApiConfig::new(&self.api_url)?
            .with_status_timeout(Duration::from_millis(self.timeout_ms)))
    }

    /// API client whose 401 handling points the user back at `siftin auth login`
    pub fn api_client(&self) -> Result<ApiClient> {
        let client = ApiClient::new(self.api_config()?, self.storage()?)?;
        Ok(client.with_login_redirect(|| {
            eprintln!(
                "{} Session expired. Run `siftin auth login --token <TOKEN>` to sign in again.",
                console::style("!").yellow().bold()
            );
        }))
    }
}
