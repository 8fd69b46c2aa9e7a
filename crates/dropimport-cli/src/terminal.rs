//! Terminal prompt and notifier

use dropimport_core::{
    BatchSummary, DocumentKind, Level, NameAffordance, Notifier, Prompt, PromptAnswer,
    PromptError, ResolutionRequest,
};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

/// Asks about each item on stderr and reads answers from stdin
pub(crate) struct TerminalPrompt {
    input: Mutex<Lines<BufReader<Stdin>>>,
}

impl TerminalPrompt {
    pub(crate) fn new() -> Self {
        Self {
            input: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

/// Kind choice typed at the prompt
#[derive(Debug, PartialEq, Eq)]
enum KindChoice {
    Kind(DocumentKind),
    Skip,
    Invalid,
}

fn parse_kind(input: &str, default: DocumentKind) -> KindChoice {
    match input.trim().to_ascii_lowercase().as_str() {
        "" => KindChoice::Kind(default),
        "a" => KindChoice::Kind(DocumentKind::Actor),
        "n" | "j" => KindChoice::Kind(DocumentKind::Note),
        "s" | "skip" => KindChoice::Skip,
        other => other
            .parse::<DocumentKind>()
            .map_or(KindChoice::Invalid, KindChoice::Kind),
    }
}

fn show(text: &str) -> Result<(), PromptError> {
    let mut err = std::io::stderr().lock();
    err.write_all(text.as_bytes())
        .and_then(|()| err.flush())
        .map_err(|e| PromptError::Rendering(e.to_string()))
}

#[async_trait::async_trait]
impl Prompt for TerminalPrompt {
    async fn ask(&self, request: &ResolutionRequest<'_>) -> Result<PromptAnswer, PromptError> {
        let mut input = self.input.lock().await;

        let indicator = match request.affordance() {
            NameAffordance::ExistingEntry => "matches catalog",
            NameAffordance::NewEntry => "new entry",
        };
        show(&format!(
            "\n{}\n  name: {} ({indicator})\n",
            request.title(),
            request.initial_name()
        ))?;

        let kind = loop {
            show(&format!(
                "  [a]ctor, [n]ote or [s]kip (default {}): ",
                request.default_kind
            ))?;
            let Some(line) = input.next_line().await.map_err(|_| PromptError::Closed)? else {
                return Ok(PromptAnswer::Dismissed);
            };
            match parse_kind(&line, request.default_kind) {
                KindChoice::Kind(kind) => break kind,
                KindChoice::Skip => return Ok(PromptAnswer::Skipped),
                KindChoice::Invalid => show("  unrecognised choice\n")?,
            }
        };

        show(&format!("  name [{}]: ", request.initial_name()))?;
        let Some(name) = input.next_line().await.map_err(|_| PromptError::Closed)? else {
            return Ok(PromptAnswer::Dismissed);
        };
        Ok(PromptAnswer::Chosen { kind, name })
    }
}

/// Prints notifications and the summary to stderr
#[derive(Debug, Default)]
pub(crate) struct ConsoleNotifier;

#[async_trait::async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, level: Level, message: &str) {
        let tag = match level {
            Level::Info => "info",
            Level::Warn => "warning",
            Level::Error => "error",
        };
        eprintln!("[{tag}] {message}");
    }

    async fn deliver_summary(&self, summary: &BatchSummary) {
        eprintln!("\n{}", summary.render());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_choices() {
        assert_eq!(parse_kind("", DocumentKind::Note), KindChoice::Kind(DocumentKind::Note));
        assert_eq!(parse_kind(" A ", DocumentKind::Note), KindChoice::Kind(DocumentKind::Actor));
        assert_eq!(parse_kind("journal", DocumentKind::Actor), KindChoice::Kind(DocumentKind::Note));
        assert_eq!(parse_kind("s", DocumentKind::Actor), KindChoice::Skip);
        assert_eq!(parse_kind("dragon", DocumentKind::Actor), KindChoice::Invalid);
    }
}
