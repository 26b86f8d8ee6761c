use super::{Page, Prompter};
use std::io::{self, BufRead, Write};
use tokio::runtime::{Handle, RuntimeFlavor};

/// Writes rendered output to stdout.
///
/// There is no persistent view to re-render in a one-shot CLI, so `reload`
/// only reports that the server-side feed list changed.
#[derive(Debug, Default)]
pub struct TerminalPage;

impl Page for TerminalPage {
    fn reload(&self) {
        tracing::debug!("Feed list changed, reload requested");
        eprintln!("Feed list updated.");
    }

    fn show_output(&self, rendered: &str) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if let Err(e) = writeln!(out, "{rendered}") {
            tracing::warn!(error = %e, "Failed to write API output");
        }
    }
}

/// Reads answers from stdin, asking on stderr so stdout stays clean for
/// rendered output.
#[derive(Debug, Default)]
pub struct TerminalPrompter {
    /// Answer every confirmation with yes (`--yes`).
    pub assume_yes: bool,
}

impl TerminalPrompter {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }

    fn read_answer(&self, question: &str) -> Option<String> {
        if let Err(e) = ask(&mut io::stderr().lock(), question) {
            tracing::warn!(error = %e, "Failed to write prompt");
        }

        let read = || read_line_from(&mut io::stdin().lock());
        // Blocking on stdin must not stall a runtime worker
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(read)
            }
            _ => read(),
        }
    }
}

fn ask(out: &mut impl Write, question: &str) -> io::Result<()> {
    write!(out, "{question} ")?;
    out.flush()
}

/// One answer line without its line ending. EOF counts as cancel.
fn read_line_from(input: &mut impl BufRead) -> Option<String> {
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(strip_line_ending(&line).to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read from stdin");
            None
        }
    }
}

impl Prompter for TerminalPrompter {
    fn prompt(&self, message: &str) -> Option<String> {
        self.read_answer(message)
    }

    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            tracing::debug!(question = message, "Confirmation skipped (--yes)");
            return true;
        }
        self.read_answer(&format!("{message} [y/N]"))
            .is_some_and(|answer| is_affirmative(&answer))
    }
}

fn strip_line_ending(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
