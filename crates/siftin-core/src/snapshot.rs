use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serialized DOM of a loaded page, as seen by the page context
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub url: Option<String>,
    pub title: Option<String>,
    pub html: String,
}

impl PageSnapshot {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            url: None,
            title: None,
            html: html.into(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Load a saved page from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let html = std::fs::read_to_string(path)?;
        tracing::debug!("Loaded {} bytes of HTML from {}", html.len(), path.display());
        Ok(Self::new(html))
    }
}
