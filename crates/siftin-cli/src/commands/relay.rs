use super::detect::{PageSource, load_snapshot};
use crate::OutputFormat;
use crate::indicator::styled_label;
use crate::settings::Settings;
use anyhow::{Result, anyhow};
use siftin_detectors::LoginDetector;
use siftin_sync::UiState;
use std::sync::Arc;

/// Detect in the page context and hand the verdict to the store, which caches and pushes it
pub fn execute(settings: &Settings, source: PageSource, format: OutputFormat) -> Result<()> {
    let runtime = super::runtime()?;

    runtime.block_on(async {
        let (messenger, store) = siftin_sync::channel(settings.cache()?);
        let store = store.with_api(Arc::new(settings.api_client()?));
        let store_task = tokio::spawn(store.run());

        let snapshot = load_snapshot(source).await?;
        let verdict = LoginDetector::default().detect(&snapshot).into_status();
        messenger.send(verdict);
        drop(messenger);

        let stored = store_task
            .await
            .map_err(|e| anyhow!("Verdict store stopped unexpectedly: {}", e))?
            .ok_or_else(|| anyhow!("No verdict reached the store"))?;

        let state = UiState::from_status(&stored);
        match format {
            OutputFormat::Json => println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "relayed": stored,
                    "ui": state,
                }))?
            ),
            OutputFormat::Pretty => println!("Relayed: {}", styled_label(&state)),
        }

        Ok(())
    })
}
