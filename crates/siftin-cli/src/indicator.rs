use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use siftin_sync::{StatusIndicator, UiState};
use std::sync::Mutex;
use std::time::Duration;

/// Terminal login indicator: a spinner while checking, a styled line once settled
pub struct ConsoleIndicator {
    spinner: Mutex<Option<ProgressBar>>,
    print_settled: bool,
}

impl ConsoleIndicator {
    pub fn new(print_settled: bool) -> Self {
        Self {
            spinner: Mutex::new(None),
            print_settled,
        }
    }

    fn clear_spinner(&self) {
        let mut spinner = self.spinner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(bar) = spinner.take() {
            bar.finish_and_clear();
        }
    }
}

impl StatusIndicator for ConsoleIndicator {
    fn render(&self, state: &UiState) {
        self.clear_spinner();

        match state {
            UiState::Checking => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(
                    ProgressStyle::with_template("{spinner:.cyan} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                bar.set_message("Checking LinkedIn status...");
                bar.enable_steady_tick(Duration::from_millis(100));
                *self.spinner.lock().unwrap_or_else(|e| e.into_inner()) = Some(bar);
            }
            settled if self.print_settled => println!("{}", styled_label(settled)),
            _ => {}
        }
    }
}

pub fn styled_label(state: &UiState) -> String {
    match state {
        UiState::LoggedIn { .. } => format!(
            "{} {}",
            style("●").green(),
            style(state.label()).green().bold()
        ),
        UiState::NotLoggedIn => {
            format!("{} {}", style("●").red(), style(state.label()).red().bold())
        }
        UiState::Checking => format!("{} {}", style("●").yellow(), state.label()),
    }
}
