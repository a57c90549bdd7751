use crate::OutputFormat;
use crate::settings::Settings;
use anyhow::Result;
use siftin_sync::Ack;

#[derive(Debug, Clone, Copy)]
pub enum ServerAction {
    Health,
    ClearCache,
}

pub fn execute(settings: &Settings, action: ServerAction, format: OutputFormat) -> Result<()> {
    let runtime = super::runtime()?;
    let client = settings.api_client()?;

    let ack = match action {
        ServerAction::Health => runtime.block_on(client.health())?,
        ServerAction::ClearCache => runtime.block_on(client.clear_server_cache())?,
    };

    print_ack(&ack, format)
}

fn print_ack(ack: &Ack, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(ack)?),
        OutputFormat::Pretty => println!(
            "{}: {}",
            ack.status.as_deref().unwrap_or("ok"),
            ack.message.as_deref().unwrap_or("")
        ),
    }
    Ok(())
}
