//! Console rendering of dispatcher output

use crate::core::{CommandOutput, OutputSink, Progress, Status, Table};
use std::io::{self, Write};
use tracing::debug;

/// Writes successes to one stream and errors to another
pub struct ConsoleSink<O, E> {
    out: O,
    err: E,
    last_progress: Progress,
}

impl ConsoleSink<io::Stdout, io::Stderr> {
    /// Sink bound to the process's standard output and error
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> ConsoleSink<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self {
            out,
            err,
            last_progress: Progress::new(),
        }
    }

    /// Give back the underlying writers
    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }

    fn render(&mut self, output: &CommandOutput) -> String {
        match output {
            CommandOutput::PlainText(text) => text.clone(),
            CommandOutput::Table(table) => render_table(table),
            CommandOutput::Progress(progress) => {
                // Only entries that changed since the previous snapshot are printed
                let lines: Vec<String> = progress
                    .entries
                    .iter()
                    .filter(|e| self.last_progress.get(&e.id) != Some(*e))
                    .map(|e| match &e.detail {
                        Some(detail) => format!("{}: {} {}", e.id, e.message, detail),
                        None => format!("{}: {}", e.id, e.message),
                    })
                    .collect();
                self.last_progress = progress.clone();
                lines.join("\n")
            }
        }
    }
}

impl<O: Write, E: Write> OutputSink for ConsoleSink<O, E> {
    fn on_success(&mut self, status: Status, output: CommandOutput) {
        if status != Status::Running {
            self.last_progress = Progress::new();
        }
        let text = self.render(&output);
        if text.is_empty() {
            return;
        }
        if let Err(e) = writeln!(self.out, "{}", text.trim_end()) {
            debug!("Failed to write output: {}", e);
        }
    }

    fn on_error(&mut self, status: Status, output: CommandOutput) {
        let text = self.render(&output);
        if let Err(e) = writeln!(self.err, "Error ({}): {}", status, text.trim_end()) {
            debug!("Failed to write error output: {}", e);
        }
    }
}

/// Left-aligned columns separated by three spaces
#[must_use]
pub fn render_table(table: &Table) -> String {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    std::iter::once(&table.headers)
        .chain(&table.rows)
        .map(|row| {
            row.iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("   ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ProgressEntry;

    fn written(sink: ConsoleSink<Vec<u8>, Vec<u8>>) -> (String, String) {
        let (out, err) = sink.into_inner();
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_render_table_aligns_columns() {
        let mut table = Table::new(["REPOSITORY", "TAG"]);
        table.push_row(["alpine", "3.19"]);
        table.push_row(["registry.local/app", "latest"]);
        let rendered = render_table(&table);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "REPOSITORY           TAG");
        assert_eq!(lines[1], "alpine               3.19");
        assert_eq!(lines[2], "registry.local/app   latest");
    }

    #[test]
    fn test_errors_go_to_error_stream() {
        let mut sink = ConsoleSink::new(Vec::new(), Vec::new());
        sink.on_success(Status::Success, CommandOutput::text("done"));
        sink.on_error(Status::CommandNotFound, CommandOutput::text("nope"));
        let (out, err) = written(sink);
        assert_eq!(out, "done\n");
        assert_eq!(err, "Error (CommandNotFound): nope\n");
    }

    #[test]
    fn test_progress_prints_only_changes() {
        let entry = |id: &str, message: &str| ProgressEntry {
            id: id.to_string(),
            message: message.to_string(),
            current: None,
            total: None,
            detail: None,
        };
        let mut sink = ConsoleSink::new(Vec::new(), Vec::new());
        let mut progress = Progress::new();
        progress.update(entry("a", "Waiting"));
        sink.on_success(Status::Running, CommandOutput::Progress(progress.clone()));
        progress.update(entry("b", "Waiting"));
        sink.on_success(Status::Running, CommandOutput::Progress(progress.clone()));
        progress.update(entry("a", "Pull complete"));
        sink.on_success(Status::Running, CommandOutput::Progress(progress));

        let (out, _) = written(sink);
        assert_eq!(out, "a: Waiting\nb: Waiting\na: Pull complete\n");
    }
}
