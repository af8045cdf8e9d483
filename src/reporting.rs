//! Types for standardized reports to the user about plotting operations.
//!
//! A plot either fails outright or is drawn; anything in between (ranges on
//! other chromosomes that were dropped, genes without a symbol, sites outside
//! the window) is collected in a [`Report`] and handed back to the caller.
//!

use log::warn;

/// The [`CommandOutput<U>`] type output is generic over some data output
/// from a command, and a [`Report`] that reports information to the user.
pub struct CommandOutput<U> {
    value: U,
    report: Report,
}

impl<U> CommandOutput<U> {
    pub fn new(value: U, report: Report) -> Self {
        Self { value, report }
    }

    pub fn value(&self) -> &U {
        &self.value
    }

    pub fn report(&self) -> &Report {
        &self.report
    }
}

/// A type to (semi) standardize reporting to the user.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Report {
    entries: Vec<String>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_issue(&mut self, message: String) {
        self.entries.push(message)
    }

    /// Append every issue of `other`.
    pub fn merge(&mut self, other: Report) {
        self.entries.extend(other.entries)
    }

    pub fn issues(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Emit every issue through the `log` facade.
    pub fn log_issues(&self) {
        for entry in &self.entries {
            warn!("{}", entry);
        }
    }
}
