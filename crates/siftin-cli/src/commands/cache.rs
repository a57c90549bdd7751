use crate::OutputFormat;
use crate::settings::Settings;
use anyhow::Result;
use console::style;
use siftin_core::now_millis;

#[derive(Debug, Clone, Copy)]
pub enum CacheAction {
    Show,
    Clear,
}

pub fn execute(settings: &Settings, action: CacheAction, format: OutputFormat) -> Result<()> {
    let cache = settings.cache()?;

    match action {
        CacheAction::Show => {
            let cached = cache.get();
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&cached)?),
                OutputFormat::Pretty => match cached {
                    Some(status) => {
                        let verdict = if status.logged_in() {
                            style("Logged In").green().bold()
                        } else {
                            style("Not Logged In").red().bold()
                        };
                        println!("Cached verdict: {}", verdict);
                        println!("User:           {}", status.user_name().unwrap_or("(unknown)"));
                        println!("Age:            {}", format_age(status.age_at(now_millis())));
                    }
                    None => println!("No cached LinkedIn status"),
                },
            }
        }
        CacheAction::Clear => {
            cache.clear();
            if format == OutputFormat::Pretty {
                println!("Cleared cached LinkedIn status");
            }
        }
    }

    Ok(())
}

fn format_age(age_ms: i64) -> String {
    let age = chrono::Duration::milliseconds(age_ms);
    if age.num_hours() > 0 {
        format!("{}h {}m", age.num_hours(), age.num_minutes() % 60)
    } else if age.num_minutes() > 0 {
        format!("{}m {}s", age.num_minutes(), age.num_seconds() % 60)
    } else {
        format!("{}s", age.num_seconds())
    }
}
