use crate::OutputFormat;
use crate::indicator::ConsoleIndicator;
use crate::settings::Settings;
use anyhow::Result;
use siftin_sync::SyncOrchestrator;
use std::sync::Arc;

/// Run one sync cycle, as a page does on load or when it becomes visible again
pub fn execute(settings: &Settings, format: OutputFormat) -> Result<()> {
    let runtime = super::runtime()?;

    runtime.block_on(async {
        let orchestrator =
            SyncOrchestrator::new(settings.cache()?, Arc::new(settings.api_client()?));
        let indicator = ConsoleIndicator::new(format == OutputFormat::Pretty);

        let state = orchestrator.sync(&indicator).await;
        orchestrator.flush().await;

        if format == OutputFormat::Json {
            let source = orchestrator.current().map(|status| status.source());
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "ui": state,
                    "label": state.label(),
                    "source": source,
                }))?
            );
        }

        Ok(())
    })
}
