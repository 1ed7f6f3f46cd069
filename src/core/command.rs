//! Command tree nodes and the handler contract

use crate::{
    core::{
        argument::Argument,
        option::CommandOption,
        output::{OutputSink, Status},
        value::{Value, ValueKind},
    },
    error::{DispatchError, Result},
};
use std::{collections::HashSet, fmt};

/// Capability of executing a command once its options and arguments are parsed.
///
/// `C` is the opaque context the embedder threads through every dispatch.
pub trait Handler<C> {
    fn invoke(
        &self,
        ctx: &mut C,
        invocation: &Invocation<'_>,
        output: &mut dyn OutputSink,
    ) -> Status;
}

impl<C, F> Handler<C> for F
where
    F: Fn(&mut C, &Invocation<'_>, &mut dyn OutputSink) -> Status,
{
    fn invoke(
        &self,
        ctx: &mut C,
        invocation: &Invocation<'_>,
        output: &mut dyn OutputSink,
    ) -> Status {
        self(ctx, invocation, output)
    }
}

/// Parsed view handed to a handler: chain-wide options and leaf arguments
#[derive(Debug, Clone)]
pub struct Invocation<'a> {
    options: Vec<&'a CommandOption>,
    arguments: &'a [Argument],
}

impl<'a> Invocation<'a> {
    #[must_use]
    pub const fn new(options: Vec<&'a CommandOption>, arguments: &'a [Argument]) -> Self {
        Self { options, arguments }
    }

    /// Every option of the resolved chain, root command first
    #[must_use]
    pub fn options(&self) -> &[&'a CommandOption] {
        &self.options
    }

    /// Positional arguments of the leaf command
    #[must_use]
    pub const fn arguments(&self) -> &'a [Argument] {
        self.arguments
    }

    /// Look up an option by long name; the deepest command declaring it wins
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&'a CommandOption> {
        self.options.iter().rev().copied().find(|o| o.matches_long(name))
    }

    #[must_use]
    pub fn value(&self, name: &str) -> Option<&'a Value> {
        self.option(name).map(CommandOption::value)
    }

    /// Whether a flag or boolean option is set; unknown names read as unset
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        self.value(name).and_then(Value::as_bool).unwrap_or(false)
    }

    #[must_use]
    pub fn string(&self, name: &str) -> Option<&'a str> {
        self.value(name).and_then(Value::as_str)
    }

    #[must_use]
    pub fn int(&self, name: &str) -> Option<i64> {
        self.value(name).and_then(Value::as_int)
    }

    #[must_use]
    pub fn argument(&self, index: usize) -> Option<&'a Argument> {
        self.arguments.get(index)
    }

    /// String payload of the positional argument at `index`
    #[must_use]
    pub fn arg_str(&self, index: usize) -> Option<&'a str> {
        self.argument(index).and_then(|a| a.value().as_str())
    }
}

/// A node of the command tree
pub struct Command<C> {
    pub name: String,
    pub short_name: Option<String>,
    pub description: String,
    handler: Option<Box<dyn Handler<C>>>,
    subcommands: Vec<Command<C>>,
    options: Vec<CommandOption>,
    arguments: Vec<Argument>,
}

impl<C> Command<C> {
    /// Create a namespace command; attach a handler to make it executable
    pub fn new(
        name: impl Into<String>,
        short_name: Option<&str>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            short_name: short_name.map(str::to_string),
            description: description.into(),
            handler: None,
            subcommands: Vec::new(),
            options: Vec::new(),
            arguments: Vec::new(),
        }
    }

    /// Attach a function or closure as the handler
    #[must_use]
    pub fn handler<F>(self, handler: F) -> Self
    where
        F: Fn(&mut C, &Invocation<'_>, &mut dyn OutputSink) -> Status + 'static,
    {
        self.with_handler(handler)
    }

    /// Attach any [`Handler`] implementation
    #[must_use]
    pub fn with_handler(mut self, handler: impl Handler<C> + 'static) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }

    #[must_use]
    pub fn subcommand(mut self, command: Self) -> Self {
        self.subcommands.push(command);
        self
    }

    #[must_use]
    pub fn option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }

    #[must_use]
    pub fn argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Whether `token` is this command's name or short name
    #[must_use]
    pub fn matches(&self, token: &str) -> bool {
        self.name == token || self.short_name.as_deref() == Some(token)
    }

    #[must_use]
    pub fn handler_ref(&self) -> Option<&dyn Handler<C>> {
        self.handler.as_deref()
    }

    /// Namespace-only commands have no handler
    #[must_use]
    pub const fn is_namespace(&self) -> bool {
        self.handler.is_none()
    }

    #[must_use]
    pub fn subcommands(&self) -> &[Self] {
        &self.subcommands
    }

    pub(crate) fn subcommands_mut(&mut self) -> &mut [Self] {
        &mut self.subcommands
    }

    #[must_use]
    pub fn options(&self) -> &[CommandOption] {
        &self.options
    }

    #[must_use]
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub(crate) fn arguments_mut(&mut self) -> &mut [Argument] {
        &mut self.arguments
    }

    /// Disjoint mutable views of options, arguments and subcommands
    pub(crate) fn parts_mut(
        &mut self,
    ) -> (&mut [CommandOption], &mut [Argument], &mut [Self]) {
        (&mut self.options, &mut self.arguments, &mut self.subcommands)
    }

    /// Restore every option and argument value of this command to its default
    pub fn reset(&mut self) {
        self.options.iter_mut().for_each(CommandOption::reset);
        self.arguments.iter_mut().for_each(Argument::reset);
    }

    /// Check names of this command, its options and its subtree
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(DispatchError::registration("command name is empty"));
        }

        let mut option_names = HashSet::new();
        for option in &self.options {
            if option.name.is_empty() {
                return Err(DispatchError::registration(format!(
                    "option with empty name on command {}",
                    self.name
                )));
            }
            let spellings = std::iter::once(format!("--{}", option.name))
                .chain(option.short_name.iter().map(|s| format!("-{s}")));
            for spelling in spellings {
                if !option_names.insert(spelling.clone()) {
                    return Err(DispatchError::registration(format!(
                        "duplicate option {} on command {}",
                        spelling, self.name
                    )));
                }
            }
        }

        check_siblings(&self.subcommands)?;
        self.subcommands.iter().try_for_each(Self::validate)
    }

    /// Multi-line help text for this command
    #[must_use]
    pub fn usage(&self) -> String {
        let mut lines = vec![format!("{} - {}", self.display_name(), self.description)];

        let mut synopsis = format!("Usage: {}", self.name);
        if !self.options.is_empty() {
            synopsis.push_str(" [OPTIONS]");
        }
        if !self.subcommands.is_empty() {
            synopsis.push_str(" <COMMAND>");
        }
        for arg in &self.arguments {
            synopsis.push_str(&format!(" <{}>", arg.name));
        }
        lines.push(String::new());
        lines.push(synopsis);

        if !self.subcommands.is_empty() {
            lines.push(String::new());
            lines.push("Commands:".to_string());
            for sub in &self.subcommands {
                lines.push(format!("  {:<20} {}", sub.display_name(), sub.description));
            }
        }

        if !self.options.is_empty() {
            lines.push(String::new());
            lines.push("Options:".to_string());
            for opt in &self.options {
                let spelling = match &opt.short_name {
                    Some(short) => format!("-{short}, --{}", opt.name),
                    None => format!("--{}", opt.name),
                };
                let spelling = match opt.kind() {
                    ValueKind::Flag => spelling,
                    kind => format!("{spelling} <{kind}>"),
                };
                lines.push(format!("  {spelling:<28} {}", opt.description));
            }
        }

        if !self.arguments.is_empty() {
            lines.push(String::new());
            lines.push("Arguments:".to_string());
            for arg in &self.arguments {
                lines.push(format!(
                    "  {:<20} {:<8} {}",
                    format!("<{}>", arg.name),
                    arg.kind(),
                    arg.description
                ));
            }
        }

        lines.join("\n")
    }

    /// `name (short)` or just `name`
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.short_name {
            Some(short) => format!("{} ({short})", self.name),
            None => self.name.clone(),
        }
    }
}

impl<C> fmt::Debug for Command<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("short_name", &self.short_name)
            .field("description", &self.description)
            .field("has_handler", &self.handler.is_some())
            .field("subcommands", &self.subcommands)
            .field("options", &self.options)
            .field("arguments", &self.arguments)
            .finish()
    }
}

/// Names and short names must be distinct across a list of siblings
pub(crate) fn check_siblings<C>(commands: &[Command<C>]) -> Result<()> {
    let mut seen = HashSet::new();
    for command in commands {
        let spellings = std::iter::once(command.name.as_str()).chain(command.short_name.as_deref());
        for spelling in spellings {
            if !seen.insert(spelling) {
                return Err(DispatchError::registration(format!(
                    "duplicate command name {spelling}"
                )));
            }
        }
    }
    Ok(())
}
