//! Status codes, result payloads and the output-emission contract
//!
//! Handlers and the dispatcher never print. They emit [`CommandOutput`]
//! payloads through an [`OutputSink`]; rendering is the embedder's business.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Contract status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Success,
    AllocationFailed,
    CommandNotFound,
    OptionNotFound,
    ArgumentCountMismatch,
    ExtraArgumentsFound,
    Unknown,
    /// Only used on intermediate streaming `on_success` calls
    Running,
}

impl Status {
    /// Numeric code, also used as the process exit code
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::AllocationFailed => 1,
            Self::CommandNotFound => 2,
            Self::OptionNotFound => 3,
            Self::ArgumentCountMismatch => 4,
            Self::ExtraArgumentsFound => 5,
            Self::Unknown => 6,
            Self::Running => 7,
        }
    }

    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Tag describing the shape of a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultKind {
    PlainText,
    TabularData,
    ProgressUpdate,
}

/// A payload emitted by a handler or the dispatcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CommandOutput {
    PlainText(String),
    Table(Table),
    Progress(Progress),
}

impl CommandOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self::PlainText(text.into())
    }

    #[must_use]
    pub const fn kind(&self) -> ResultKind {
        match self {
            Self::PlainText(_) => ResultKind::PlainText,
            Self::Table(_) => ResultKind::TabularData,
            Self::Progress(_) => ResultKind::ProgressUpdate,
        }
    }

    /// Text of a plain-text payload
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::PlainText(text) => Some(text),
            _ => None,
        }
    }
}

/// Tabular result with a header row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; short rows are padded and long rows truncated to the header width
    pub fn push_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = row.into_iter().map(Into::into).collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One line of a multi-entry progress display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub id: String,
    pub message: String,
    pub current: Option<u64>,
    pub total: Option<u64>,
    /// Preformatted progress text supplied by the producer
    pub detail: Option<String>,
}

/// Snapshot of several concurrent progress entries keyed by id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub entries: Vec<ProgressEntry>,
}

impl Progress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new entry or update the one with the same id in place
    pub fn update(&mut self, entry: ProgressEntry) {
        match self.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ProgressEntry> {
        self.entries.iter().find(|e| e.id == id)
    }
}

/// The two output-emission callbacks handed to every handler
pub trait OutputSink {
    fn on_success(&mut self, status: Status, output: CommandOutput);
    fn on_error(&mut self, status: Status, output: CommandOutput);
}

/// Adapter turning a pair of closures into an [`OutputSink`]
pub struct FnSink<S, E> {
    success: S,
    error: E,
}

impl<S, E> FnSink<S, E>
where
    S: FnMut(Status, CommandOutput),
    E: FnMut(Status, CommandOutput),
{
    pub const fn new(success: S, error: E) -> Self {
        Self { success, error }
    }
}

impl<S, E> OutputSink for FnSink<S, E>
where
    S: FnMut(Status, CommandOutput),
    E: FnMut(Status, CommandOutput),
{
    fn on_success(&mut self, status: Status, output: CommandOutput) {
        (self.success)(status, output);
    }

    fn on_error(&mut self, status: Status, output: CommandOutput) {
        (self.error)(status, output);
    }
}

/// Which callback an emission went through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Success,
    Error,
}

/// A single recorded emission
#[derive(Debug, Clone, PartialEq)]
pub struct Emission {
    pub channel: Channel,
    pub status: Status,
    pub output: CommandOutput,
}

/// Sink that records every emission in order
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub emissions: Vec<Emission>,
}

impl CollectingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emissions that went through `on_success`
    pub fn successes(&self) -> impl Iterator<Item = &Emission> {
        self.emissions
            .iter()
            .filter(|e| e.channel == Channel::Success)
    }

    /// Emissions that went through `on_error`
    pub fn errors(&self) -> impl Iterator<Item = &Emission> {
        self.emissions.iter().filter(|e| e.channel == Channel::Error)
    }

    pub fn clear(&mut self) {
        self.emissions.clear();
    }
}

impl OutputSink for CollectingSink {
    fn on_success(&mut self, status: Status, output: CommandOutput) {
        self.emissions.push(Emission {
            channel: Channel::Success,
            status,
            output,
        });
    }

    fn on_error(&mut self, status: Status, output: CommandOutput) {
        self.emissions.push(Emission {
            channel: Channel::Error,
            status,
            output,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_rows_match_header_width() {
        let mut table = Table::new(["REPOSITORY", "TAG"]);
        table.push_row(["alpine"]);
        table.push_row(["busybox", "latest", "extra"]);
        assert_eq!(table.rows[0], vec!["alpine", ""]);
        assert_eq!(table.rows[1], vec!["busybox", "latest"]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_progress_updates_by_id() {
        let mut progress = Progress::new();
        let entry = |id: &str, message: &str| ProgressEntry {
            id: id.to_string(),
            message: message.to_string(),
            current: None,
            total: None,
            detail: None,
        };
        progress.update(entry("a1", "Waiting"));
        progress.update(entry("b2", "Waiting"));
        progress.update(entry("a1", "Downloading"));

        assert_eq!(progress.entries.len(), 2);
        assert_eq!(progress.get("a1").unwrap().message, "Downloading");
    }

    #[test]
    fn test_fn_sink_routes_channels() {
        let mut ok = Vec::new();
        let mut failed = Vec::new();
        {
            let mut sink = FnSink::new(
                |status, _| ok.push(status),
                |status, _| failed.push(status),
            );
            sink.on_success(Status::Running, CommandOutput::text("step"));
            sink.on_error(Status::Unknown, CommandOutput::text("boom"));
        }
        assert_eq!(ok, vec![Status::Running]);
        assert_eq!(failed, vec![Status::Unknown]);
    }

    #[test]
    fn test_output_kinds() {
        assert_eq!(CommandOutput::text("x").kind(), ResultKind::PlainText);
        assert_eq!(
            CommandOutput::Table(Table::default()).kind(),
            ResultKind::TabularData
        );
        assert_eq!(
            CommandOutput::Progress(Progress::new()).kind(),
            ResultKind::ProgressUpdate
        );
    }
}
