use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use siftin_browser::DEFAULT_DEBUGGING_PORT;
use siftin_cli::OutputFormat;
use siftin_cli::commands;
use siftin_cli::commands::auth::AuthAction;
use siftin_cli::commands::cache::CacheAction;
use siftin_cli::commands::detect::PageSource;
use siftin_cli::commands::server::ServerAction;
use siftin_cli::settings::Settings;
use siftin_sync::DEFAULT_BASE_URL;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "siftin")]
#[command(author, version)]
#[command(
    about = "Detect and sync LinkedIn login status for Siftin lead capture",
    long_about = "Siftin checks whether the browser session is logged into LinkedIn, caches the \
                  verdict locally and keeps the Siftin backend in sync with it."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (pretty, json)
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,

    /// Base URL of the Siftin API
    #[arg(long, global = true, env = "SIFTIN_API_URL", default_value = DEFAULT_BASE_URL)]
    api_url: String,

    /// Local storage file (defaults to ~/.siftin/local_storage.json)
    #[arg(long, global = true, env = "SIFTIN_STORAGE", value_name = "FILE")]
    storage: Option<PathBuf>,

    /// Timeout for status API calls in milliseconds
    #[arg(long, global = true, env = "SIFTIN_TIMEOUT_MS", default_value_t = 5000)]
    timeout_ms: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect LinkedIn login status from a saved page or the live browser tab
    Detect {
        /// Saved LinkedIn page to inspect instead of the live tab
        #[arg(long, value_name = "FILE")]
        html: Option<PathBuf>,

        /// URL the saved page was loaded from
        #[arg(long, requires = "html")]
        url: Option<String>,

        /// Remote-debugging port of the running browser
        #[arg(long, default_value_t = DEFAULT_DEBUGGING_PORT, conflicts_with = "html")]
        port: u16,

        /// Store the verdict in the local cache
        #[arg(long)]
        save: bool,

        /// Report the verdict to the API
        #[arg(long)]
        push: bool,
    },

    /// Detect in the LinkedIn tab and relay the verdict to the local store and API
    Relay {
        /// Saved LinkedIn page to inspect instead of the live tab
        #[arg(long, value_name = "FILE")]
        html: Option<PathBuf>,

        /// Remote-debugging port of the running browser
        #[arg(long, default_value_t = DEFAULT_DEBUGGING_PORT, conflicts_with = "html")]
        port: u16,
    },

    /// Run one sync cycle: local cache first, then the API
    Sync,

    /// Ask the API to check the LinkedIn session directly
    Check,

    /// Inspect or clear the cached LinkedIn status
    Cache {
        #[command(subcommand)]
        action: CacheCommand,
    },

    /// Manage API credentials
    Auth {
        #[command(subcommand)]
        action: AuthCommand,
    },

    /// Talk to the API server
    Server {
        #[command(subcommand)]
        action: ServerCommand,
    },

    /// Generate shell completion scripts
    #[command(long_about = "Generate shell completion scripts.\n\n\
        SUPPORTED SHELLS: bash, zsh, fish, powershell, elvish\n\n\
        INSTALLATION:\n  \
        bash: siftin completion --shell bash >> ~/.bashrc\n  \
        zsh:  siftin completion --shell zsh > ~/.zfunc/_siftin")]
    Completion {
        /// Target shell
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum CacheCommand {
    /// Show the cached verdict if it is still fresh
    Show,
    /// Remove the cached verdict
    Clear,
}

#[derive(Subcommand)]
enum AuthCommand {
    /// Store an API token
    Login {
        /// Bearer token issued by the Siftin backend
        #[arg(long, env = "SIFTIN_TOKEN")]
        token: String,

        /// Account email to remember alongside the token
        #[arg(long)]
        email: Option<String>,
    },
    /// Forget the stored token and email
    Logout,
    /// Show whether a token is stored
    Status,
}

#[derive(Subcommand)]
enum ServerCommand {
    /// Check that the API is running
    Health,
    /// Make the API re-check LinkedIn on its next query
    ClearCache,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    let settings = Settings {
        api_url: cli.api_url.clone(),
        storage: cli.storage.clone(),
        timeout_ms: cli.timeout_ms,
    };

    // Execute the command
    match cli.command {
        Commands::Detect {
            html,
            url,
            port,
            save,
            push,
        } => {
            let source = match html {
                Some(html) => PageSource::File { html, url },
                None => PageSource::Browser { port },
            };
            commands::detect::execute(&settings, source, save, push, cli.format)
        }
        Commands::Relay { html, port } => {
            let source = match html {
                Some(html) => PageSource::File { html, url: None },
                None => PageSource::Browser { port },
            };
            commands::relay::execute(&settings, source, cli.format)
        }
        Commands::Sync => commands::sync::execute(&settings, cli.format),
        Commands::Check => commands::check::execute(&settings, cli.format),
        Commands::Cache { action } => {
            let action = match action {
                CacheCommand::Show => CacheAction::Show,
                CacheCommand::Clear => CacheAction::Clear,
            };
            commands::cache::execute(&settings, action, cli.format)
        }
        Commands::Auth { action } => {
            let action = match action {
                AuthCommand::Login { token, email } => AuthAction::Login { token, email },
                AuthCommand::Logout => AuthAction::Logout,
                AuthCommand::Status => AuthAction::Status,
            };
            commands::auth::execute(&settings, action, cli.format)
        }
        Commands::Server { action } => {
            let action = match action {
                ServerCommand::Health => ServerAction::Health,
                ServerCommand::ClearCache => ServerAction::ClearCache,
            };
            commands::server::execute(&settings, action, cli.format)
        }
        Commands::Completion { shell } => commands::completion::execute(shell, &mut Cli::command()),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new(
            "siftin=debug,siftin_cli=debug,siftin_core=debug,siftin_detectors=debug,\
             siftin_sync=debug,siftin_browser=debug",
        )
    } else {
        EnvFilter::new("siftin=info,siftin_cli=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
