//! Command-chain resolution
//!
//! Walks the command tree against the head of the token stream and records
//! the matched path as child indices, root first.

use crate::core::{command::Command, option::CommandOption, token::TokenStream};
use tracing::debug;

/// Root-to-leaf path of matched commands, stored as indices into each level
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedChain {
    path: Vec<usize>,
}

impl ResolvedChain {
    #[must_use]
    pub fn len(&self) -> usize {
        self.path.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    #[must_use]
    pub fn path(&self) -> &[usize] {
        &self.path
    }

    /// The matched commands, root first.
    ///
    /// The walk stops early if `roots` is not the tree this chain was resolved on.
    #[must_use]
    pub fn commands<'a, C>(&self, roots: &'a [Command<C>]) -> Vec<&'a Command<C>> {
        let mut chain = Vec::with_capacity(self.path.len());
        let mut level = roots;
        for &index in &self.path {
            let Some(command) = level.get(index) else {
                break;
            };
            chain.push(command);
            level = command.subcommands();
        }
        chain
    }

    /// The deepest matched command
    #[must_use]
    pub fn leaf<'a, C>(&self, roots: &'a [Command<C>]) -> Option<&'a Command<C>> {
        self.commands(roots).pop()
    }

    pub(crate) fn leaf_mut<'a, C>(&self, roots: &'a mut [Command<C>]) -> Option<&'a mut Command<C>> {
        let (&last, ancestors) = self.path.split_last()?;
        let mut level = roots;
        for &index in ancestors {
            level = level.get_mut(index)?.subcommands_mut();
        }
        level.get_mut(last)
    }

    /// Every option of every matched command, in chain then declaration order
    pub(crate) fn options_mut<'a, C>(&self, roots: &'a mut [Command<C>]) -> Vec<&'a mut CommandOption> {
        let mut options = Vec::new();
        let mut level = roots;
        for &index in &self.path {
            let Some(command) = level.get_mut(index) else {
                break;
            };
            let (own, _, children) = command.parts_mut();
            options.extend(own.iter_mut());
            level = children;
        }
        options
    }

    /// Reset option and argument values of every matched command
    pub(crate) fn reset<C>(&self, roots: &mut [Command<C>]) {
        let mut level = roots;
        for &index in &self.path {
            let Some(command) = level.get_mut(index) else {
                break;
            };
            command.reset();
            level = command.subcommands_mut();
        }
    }

    /// Space-separated long names of the chain, for diagnostics
    #[must_use]
    pub fn describe<C>(&self, roots: &[Command<C>]) -> String {
        self.commands(roots)
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Match leading tokens against the tree and consume one token per matched command.
///
/// Scanning stops at the first token that is not a child of the current
/// command; that token and everything after it stay in the stream.
pub fn resolve_chain<C>(commands: &[Command<C>], tokens: &mut TokenStream) -> ResolvedChain {
    let mut path = Vec::new();
    let mut level = commands;

    for token in tokens.iter() {
        match level.iter().position(|c| c.matches(token)) {
            Some(index) => {
                debug!("Found command {}", level[index].name);
                path.push(index);
                level = level[index].subcommands();
            }
            None => break,
        }
    }

    tokens.consume(path.len());
    ResolvedChain { path }
}
