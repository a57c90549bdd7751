use crate::OutputFormat;
use crate::settings::Settings;
use anyhow::{Result, bail};
use siftin_core::{AUTH_TOKEN_KEY, USER_EMAIL_KEY};

#[derive(Debug, Clone)]
pub enum AuthAction {
    Login { token: String, email: Option<String> },
    Logout,
    Status,
}

/// Manage the API credentials kept in local storage
pub fn execute(settings: &Settings, action: AuthAction, format: OutputFormat) -> Result<()> {
    let storage = settings.storage()?;

    match action {
        AuthAction::Login { token, email } => {
            let token = token.trim();
            if token.is_empty() {
                bail!("Token must not be empty");
            }
            storage.set_item(AUTH_TOKEN_KEY, token)?;
            if let Some(email) = email {
                storage.set_item(USER_EMAIL_KEY, &email)?;
            }
            println!("Saved API credentials to {}", storage.path().display());
        }
        AuthAction::Logout => {
            storage.clear_auth()?;
            println!("Cleared API credentials");
        }
        AuthAction::Status => {
            let has_token = storage.get_item(AUTH_TOKEN_KEY)?.is_some();
            let email = storage.get_item(USER_EMAIL_KEY)?;

            match format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "authenticated": has_token,
                        "user_email": email,
                    }))?
                ),
                OutputFormat::Pretty => {
                    if has_token {
                        println!(
                            "Signed in{}",
                            email.map(|e| format!(" as {}", e)).unwrap_or_default()
                        );
                    } else {
                        println!("Not signed in");
                    }
                }
            }
        }
    }

    Ok(())
}
