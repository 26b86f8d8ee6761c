//! Presentation seams used by the actions.
//!
//! Actions never touch a terminal or document directly. They are handed a
//! [`Page`] (where results go) and a [`Prompter`] (where interactive input
//! comes from), so tests can swap in recording doubles.
//!
//! # Module Structure
//!
//! - `terminal` - stdin/stdout implementations used by the CLI

mod terminal;

pub use terminal::{TerminalPage, TerminalPrompter};

/// Where action results are shown.
pub trait Page {
    /// The feed collection changed on the server; re-render it.
    fn reload(&self);

    /// Show a rendered API response in the dedicated output area.
    fn show_output(&self, rendered: &str);
}

/// Source of interactive input.
pub trait Prompter {
    /// Ask for a value. `None` means the user cancelled.
    fn prompt(&self, message: &str) -> Option<String>;

    /// Ask a yes/no question. Anything but an explicit yes is a no.
    fn confirm(&self, message: &str) -> bool;
}
