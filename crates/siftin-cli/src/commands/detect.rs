use crate::OutputFormat;
use crate::settings::Settings;
use anyhow::Result;
use siftin_browser::CdpSession;
use siftin_core::PageSnapshot;
use siftin_detectors::{Detection, LoginDetector};
use siftin_sync::StatusApi;
use std::path::PathBuf;

/// Where the page to inspect comes from
pub enum PageSource {
    File { html: PathBuf, url: Option<String> },
    Browser { port: u16 },
}

pub fn execute(
    settings: &Settings,
    source: PageSource,
    save: bool,
    push: bool,
    format: OutputFormat,
) -> Result<()> {
    let runtime = super::runtime()?;

    runtime.block_on(async {
        let snapshot = load_snapshot(source).await?;
        let detection = LoginDetector::default().detect(&snapshot);

        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&detection)?),
            OutputFormat::Pretty => print_pretty(&detection, &snapshot),
        }

        let status = detection.into_status();

        if save {
            settings.cache()?.put(&status);
            tracing::info!("Saved verdict to local cache");
        }

        if push {
            let client = settings.api_client()?;
            if let Err(e) = client.push(&status).await {
                eprintln!("{} Could not push status: {}", console::style("!").yellow().bold(), e);
            }
        }

        Ok(())
    })
}

pub(crate) async fn load_snapshot(source: PageSource) -> Result<PageSnapshot> {
    match source {
        PageSource::File { html, url } => {
            let snapshot = PageSnapshot::from_file(&html)?;
            Ok(match url {
                Some(url) => snapshot.with_url(url),
                None => snapshot,
            })
        }
        PageSource::Browser { port } => Ok(CdpSession::new(port).snapshot_linkedin().await?),
    }
}

fn print_pretty(detection: &Detection, snapshot: &PageSnapshot) {
    use console::style;

    println!(
        "\n{}",
        style(format!("LinkedIn Login Detection: {}", page_label(snapshot)))
            .bold()
            .cyan()
    );
    println!();

    let verdict = if detection.logged_in {
        style("Logged In").green().bold()
    } else {
        style("Not Logged In").red().bold()
    };
    println!("  Verdict:    {}", verdict);
    println!(
        "  User:       {}",
        detection.user_name.as_deref().unwrap_or("(unknown)")
    );
    println!("  Score:      {}", detection.score);
    if !detection.matched.is_empty() {
        println!("  Indicators: {}", detection.matched.join(", "));
    }
    println!();
}

fn page_label(snapshot: &PageSnapshot) -> String {
    snapshot
        .url
        .clone()
        .or_else(|| snapshot.title.clone())
        .unwrap_or_else(|| "saved page".to_string())
}

