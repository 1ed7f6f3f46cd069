//! The dispatch loop
//!
//! Resolves the command chain, parses chain-wide options, parses the leaf's
//! positional arguments and invokes every handler of the chain in order.

use crate::{
    core::{
        command::{Command, Invocation, check_siblings},
        output::{CommandOutput, OutputSink, Status},
        parser::{parse_arguments, parse_options},
        resolver::{ResolvedChain, resolve_chain},
        token::TokenStream,
        value::Coercion,
    },
    error::{DispatchError, Result},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Engine-side settings applied to every dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchOptions {
    /// Policy for malformed numeric tokens
    pub coercion: Coercion,
}

/// Owns the registered command tree and runs dispatches against it
pub struct Dispatcher<C> {
    commands: Vec<Command<C>>,
    options: DispatchOptions,
}

impl<C> Dispatcher<C> {
    #[must_use]
    pub const fn new(options: DispatchOptions) -> Self {
        Self {
            commands: Vec::new(),
            options,
        }
    }

    #[must_use]
    pub const fn options(&self) -> DispatchOptions {
        self.options
    }

    /// Top-level commands in registration order
    #[must_use]
    pub fn commands(&self) -> &[Command<C>] {
        &self.commands
    }

    /// Add a top-level command after validating its subtree.
    ///
    /// Its name and short name must not collide with an already registered command.
    pub fn register(&mut self, command: Command<C>) -> Result<()> {
        command.validate()?;
        let name = command.name.clone();
        self.commands.push(command);
        if let Err(err) = check_siblings(&self.commands) {
            self.commands.pop();
            return Err(err);
        }
        debug!("Registered command {}", name);
        Ok(())
    }

    /// Resolve the command chain at the head of `tokens`
    pub fn resolve(&self, tokens: &mut TokenStream) -> ResolvedChain {
        resolve_chain(&self.commands, tokens)
    }

    /// Run one command line.
    ///
    /// Structural and arity failures are reported through `output.on_error`
    /// and returned as their status; otherwise the status of the last handler
    /// invoked is returned.
    #[instrument(skip_all, fields(tokens = ?tokens.as_slice()))]
    pub fn execute(
        &mut self,
        ctx: &mut C,
        tokens: &mut TokenStream,
        output: &mut dyn OutputSink,
    ) -> Status {
        match self.try_execute(ctx, tokens, output) {
            Ok(status) => {
                debug!("Dispatch finished with {}", status);
                status
            }
            Err(err) => {
                debug!("Dispatch failed: {}", err);
                let status = err.status();
                output.on_error(status, CommandOutput::text(err.to_string()));
                status
            }
        }
    }

    fn try_execute(
        &mut self,
        ctx: &mut C,
        tokens: &mut TokenStream,
        output: &mut dyn OutputSink,
    ) -> Result<Status> {
        let coercion = self.options.coercion;

        let chain = resolve_chain(&self.commands, tokens);
        if chain.is_empty() {
            return Err(match tokens.get(0) {
                Some(token) => DispatchError::command_not_found(token),
                None => DispatchError::no_command(),
            });
        }
        debug!("Executing {}", chain.describe(&self.commands));

        // Values from a previous dispatch must not leak into this one
        chain.reset(&mut self.commands);

        let mut options = chain.options_mut(&mut self.commands);
        parse_options(&mut options, tokens, coercion)?;

        let mut status = Status::Success;
        for depth in 0..chain.len() {
            let is_leaf = depth + 1 == chain.len();

            if is_leaf {
                let leaf = chain
                    .leaf_mut(&mut self.commands)
                    .ok_or_else(|| DispatchError::unknown("resolved chain has no leaf"))?;
                let expected = leaf.arguments().len();
                if tokens.len() > expected {
                    return Err(DispatchError::extra_arguments(tokens.len() - expected));
                }
                parse_arguments(leaf.arguments_mut(), tokens, coercion)?;
            }

            let commands = chain.commands(&self.commands);
            let command = commands[depth];
            let leaf = commands[commands.len() - 1];

            match command.handler_ref() {
                Some(handler) => {
                    let invocation = Invocation::new(
                        commands.iter().copied().flat_map(Command::options).collect(),
                        leaf.arguments(),
                    );
                    status = handler.invoke(ctx, &invocation, output);
                    debug!("Handler of {} returned {}", command.name, status);
                }
                None if is_leaf => {
                    debug!("{} is a namespace, emitting usage", command.name);
                    output.on_success(Status::Success, CommandOutput::text(command.usage()));
                }
                None => debug!("Skipping namespace {}", command.name),
            }
        }

        Ok(status)
    }

    /// Emit the description of the command named by `tokens`.
    ///
    /// An empty stream lists the top-level commands instead.
    #[instrument(skip_all, fields(tokens = ?tokens.as_slice()))]
    pub fn help(&self, tokens: &mut TokenStream, output: &mut dyn OutputSink) -> Status {
        if tokens.is_empty() {
            output.on_success(Status::Success, CommandOutput::text(self.general_help()));
            return Status::Success;
        }

        let first = tokens.get(0).unwrap_or_default().to_string();
        let chain = resolve_chain(&self.commands, tokens);
        match chain.leaf(&self.commands) {
            Some(leaf) => {
                output.on_success(Status::Success, CommandOutput::text(leaf.description.clone()));
                Status::Success
            }
            None => {
                let err = DispatchError::command_not_found(first);
                output.on_error(err.status(), CommandOutput::text(err.to_string()));
                err.status()
            }
        }
    }

    /// Description of the command reached by following long `names` from the root
    pub fn help_for(&self, names: &[&str]) -> Result<&str> {
        if names.is_empty() {
            return Err(DispatchError::unknown("no command names given"));
        }

        let mut level = self.commands.as_slice();
        let mut description = "";
        for name in names {
            let command = level
                .iter()
                .find(|c| c.name == *name)
                .ok_or_else(|| DispatchError::command_not_found(*name))?;
            description = command.description.as_str();
            level = command.subcommands();
        }
        Ok(description)
    }

    /// Listing of every top-level command
    #[must_use]
    pub fn general_help(&self) -> String {
        let mut lines = vec!["Available commands:".to_string()];
        for command in &self.commands {
            lines.push(format!(
                "  {:<20} {}",
                command.display_name(),
                command.description
            ));
        }
        lines.push(String::new());
        lines.push("Type help <command> for details".to_string());
        lines.join("\n")
    }
}

impl<C> Default for Dispatcher<C> {
    fn default() -> Self {
        Self::new(DispatchOptions::default())
    }
}
