//! Command execution for the CLI
//!
//! Runs a single command line, a script of lines, or an interactive session
//! against one dispatcher. The command tree is reused for every line.

use crate::{
    cli::images::{ImageStore, image_commands},
    config::Config,
    core::{Dispatcher, LineSplitter, OutputSink, Status, TokenStream},
};
use anyhow::Context;
use std::{
    io::{self, BufRead, Write},
    path::Path,
};
use tracing::{debug, info, instrument, warn};

/// Execute the command line, script or interactive session selected by `config`
#[instrument(skip(config))]
pub fn execute_command(config: &Config, tokens: &[String]) -> anyhow::Result<Status> {
    let mut dispatcher = build_dispatcher(config)?;
    let mut store = ImageStore::new();
    let mut sink = crate::cli::ConsoleSink::stdio();

    if let Some(script) = &config.script {
        return run_script(&mut dispatcher, &mut store, &mut sink, script);
    }

    if config.interactive {
        let stdin = io::stdin();
        return run_interactive(
            &mut dispatcher,
            &mut store,
            &mut sink,
            stdin.lock(),
            &config.prompt,
        );
    }

    Ok(run_tokens(
        &mut dispatcher,
        &mut store,
        &mut sink,
        TokenStream::new(tokens.iter().map(String::as_str)),
    ))
}

/// Dispatcher with every command group of the binary registered
pub fn build_dispatcher(config: &Config) -> anyhow::Result<Dispatcher<ImageStore>> {
    let mut dispatcher = Dispatcher::new(config.dispatch_options());
    dispatcher
        .register(image_commands())
        .context("Failed to register image commands")?;
    Ok(dispatcher)
}

/// Route one tokenized line: `help ...` and empty lines go to help, the rest is executed
pub fn run_tokens(
    dispatcher: &mut Dispatcher<ImageStore>,
    store: &mut ImageStore,
    sink: &mut dyn OutputSink,
    mut tokens: TokenStream,
) -> Status {
    if tokens.get(0) == Some("help") {
        tokens.consume(1);
        return dispatcher.help(&mut tokens, sink);
    }
    if tokens.is_empty() {
        return dispatcher.help(&mut tokens, sink);
    }
    dispatcher.execute(store, &mut tokens, sink)
}

/// Dispatch every line of `path`, stopping at the first failure
#[instrument(skip(dispatcher, store, sink))]
pub fn run_script(
    dispatcher: &mut Dispatcher<ImageStore>,
    store: &mut ImageStore,
    sink: &mut dyn OutputSink,
    path: &Path,
) -> anyhow::Result<Status> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    let splitter = LineSplitter::new()?;

    let lines = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !is_skippable(line));
    let mut executed = 0;
    for (number, line) in lines {
        debug!("Script line {}: {}", number + 1, line);
        let status = run_tokens(dispatcher, store, sink, splitter.split(line));
        executed += 1;
        if !status.is_success() {
            warn!("Script stopped at line {} with {}", number + 1, status);
            return Ok(status);
        }
    }

    info!("Script completed: {} line(s) executed", executed);
    Ok(Status::Success)
}

/// Read lines from `input` until end of input or `exit`; returns the status of the last line
pub fn run_interactive<R: BufRead>(
    dispatcher: &mut Dispatcher<ImageStore>,
    store: &mut ImageStore,
    sink: &mut dyn OutputSink,
    input: R,
    prompt: &str,
) -> anyhow::Result<Status> {
    let splitter = LineSplitter::new()?;
    let mut status = Status::Success;
    let mut lines = input.lines();

    loop {
        print!("{prompt}");
        io::stdout().flush().context("Failed to flush prompt")?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read input line")?;
        let line = line.trim();
        if matches!(line, "exit" | "quit") {
            break;
        }
        if is_skippable(line) {
            continue;
        }
        status = run_tokens(dispatcher, store, sink, splitter.split(line));
    }

    Ok(status)
}

fn is_skippable(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line.starts_with('#')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CollectingSink, CommandOutput};
    use std::fs;
    use tempfile::NamedTempFile;

    fn setup() -> (Dispatcher<ImageStore>, ImageStore, CollectingSink) {
        (
            build_dispatcher(&Config::default()).unwrap(),
            ImageStore::new(),
            CollectingSink::new(),
        )
    }

    #[test]
    fn test_help_routing() {
        let (mut dispatcher, mut store, mut sink) = setup();
        let status = run_tokens(
            &mut dispatcher,
            &mut store,
            &mut sink,
            TokenStream::new(["help", "image", "pull"]),
        );
        assert_eq!(status, Status::Success);
        assert_eq!(
            sink.emissions[0].output,
            CommandOutput::text("Docker Image Pull")
        );
    }

    #[test]
    fn test_script_stops_at_first_failure() {
        let (mut dispatcher, mut store, mut sink) = setup();
        let file = NamedTempFile::new().unwrap();
        fs::write(
            file.path(),
            "# seed\nimage pull -q alpine\n\nimage pull\nimage pull -q busybox\n",
        )
        .unwrap();

        let status = run_script(&mut dispatcher, &mut store, &mut sink, file.path()).unwrap();
        assert_eq!(status, Status::ArgumentCountMismatch);
        assert_eq!(store.images().len(), 1);
    }

    #[test]
    fn test_missing_script_is_an_error() {
        let (mut dispatcher, mut store, mut sink) = setup();
        let result = run_script(
            &mut dispatcher,
            &mut store,
            &mut sink,
            Path::new("/nonexistent/script.cld"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_interactive_reuses_tree() {
        let (mut dispatcher, mut store, mut sink) = setup();
        let input = "image pull -q \"alpine:3.19\"\nimage ls\nexit\nimage pull busybox\n";

        let status = run_interactive(
            &mut dispatcher,
            &mut store,
            &mut sink,
            input.as_bytes(),
            "> ",
        )
        .unwrap();

        assert_eq!(status, Status::Success);
        assert_eq!(store.images().len(), 1);
        assert!(store.find("alpine", "3.19").is_some());
    }
}
