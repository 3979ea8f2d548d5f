//! Terminal implementations of the display traits.

use std::sync::Mutex;
use std::time::Duration;

use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};

use super::{Notifier, ResultsView, StatusLevel, NO_RESULTS_MESSAGE};
use crate::models::ResultCard;

/// Writes status messages to stderr, optionally above a spinner.
#[derive(Default)]
pub struct ConsoleNotifier {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a spinner with the given message until [`finish_spinner`](Self::finish_spinner).
    ///
    /// Status messages printed while it runs appear above it.
    pub fn start_spinner(&self, message: &str) {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));

        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(old) = slot.replace(pb) {
                old.finish_and_clear();
            }
        }
    }

    pub fn finish_spinner(&self) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(pb) = slot.take() {
                pb.finish_and_clear();
            }
        }
    }

    fn format(level: StatusLevel, message: &str) -> String {
        match level {
            StatusLevel::Info => style(message).cyan().to_string(),
            StatusLevel::Success => style(message).green().to_string(),
            StatusLevel::Error => style(message).red().bold().to_string(),
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, level: StatusLevel, message: &str) {
        let line = Self::format(level, message);

        if let Ok(slot) = self.spinner.lock() {
            if let Some(pb) = slot.as_ref() {
                pb.println(line);
                return;
            }
        }
        let _ = Term::stderr().write_line(&line);
    }
}

/// Prints result cards to stdout.
#[derive(Default)]
pub struct ConsoleResultsView;

impl ConsoleResultsView {
    pub fn new() -> Self {
        Self
    }

    fn render_card(card: &ResultCard) -> String {
        format!(
            "{}\n  {}\n  {} · {}\n",
            style(&card.title).bold(),
            card.excerpt,
            style(&card.type_label).yellow(),
            style(&card.date).dim()
        )
    }
}

impl ResultsView for ConsoleResultsView {
    fn render_results(&self, cards: &[ResultCard]) {
        let term = Term::stdout();
        for card in cards {
            let _ = term.write_line(&Self::render_card(card));
        }
    }

    fn render_no_results(&self) {
        let _ = Term::stdout().write_line(&style(NO_RESULTS_MESSAGE).dim().to_string());
    }
}
