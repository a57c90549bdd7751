use crate::OutputFormat;
use crate::settings::Settings;
use anyhow::Result;
use console::style;

/// Ask the backend to detect the LinkedIn session directly
pub fn execute(settings: &Settings, format: OutputFormat) -> Result<()> {
    let runtime = super::runtime()?;
    let client = settings.api_client()?;

    let status = runtime.block_on(client.login_status())?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status)?),
        OutputFormat::Pretty => {
            let verdict = match status.logged_in {
                Some(true) => style("Logged In").green().bold(),
                Some(false) => style("Not Logged In").red().bold(),
                None => style("Unknown").yellow().bold(),
            };
            println!("LinkedIn: {}", verdict);
            if let Some(name) = &status.user_name {
                println!("User:     {}", name);
            }
            if let Some(message) = &status.message {
                println!("Message:  {}", message);
            }
            if status.cached {
                println!("{}", style("(cached by server)").dim());
            }
        }
    }

    Ok(())
}
