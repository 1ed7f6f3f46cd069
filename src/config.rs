//! Runtime configuration for the `cld` binary
//!
//! Centralizes options derived from the process flags and validates them.

use crate::{
    cli::Args,
    core::{dispatcher::DispatchOptions, value::Coercion},
    error::DispatchError,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Enable debug logging
    pub debug: bool,
    /// Numeric coercion policy handed to the dispatcher
    pub coercion: Coercion,
    /// Script whose lines are dispatched in order
    pub script: Option<PathBuf>,
    /// Read lines from standard input
    pub interactive: bool,
    /// Interactive prompt
    pub prompt: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            coercion: Coercion::Strict,
            script: None,
            interactive: false,
            prompt: "cld> ".to_string(),
        }
    }
}

impl Config {
    /// Create configuration from command line arguments
    pub fn from_args(args: &Args) -> Result<Self, DispatchError> {
        let config = Self {
            debug: args.debug,
            coercion: if args.lenient {
                Coercion::Lenient
            } else {
                Coercion::Strict
            },
            script: args.script.clone(),
            interactive: args.interactive,
            prompt: args.prompt.clone(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), DispatchError> {
        if let Some(script) = self.script.as_ref().filter(|s| !s.is_file()) {
            return Err(DispatchError::config(format!(
                "Script file not found: {}",
                script.display()
            )));
        }

        if self.interactive && self.prompt.is_empty() {
            return Err(DispatchError::config("Interactive prompt must not be empty"));
        }

        Ok(())
    }

    /// Engine settings derived from this configuration
    #[must_use]
    pub const fn dispatch_options(&self) -> DispatchOptions {
        DispatchOptions {
            coercion: self.coercion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::NamedTempFile;

    #[test]
    fn test_lenient_flag_selects_policy() {
        let args = Args::try_parse_from(["cld", "--lenient", "image", "ls"]).unwrap();
        let config = Config::from_args(&args).unwrap();
        assert_eq!(config.coercion, Coercion::Lenient);
        assert_eq!(config.dispatch_options().coercion, Coercion::Lenient);
    }

    #[test]
    fn test_missing_script_is_rejected() {
        let args = Args::try_parse_from(["cld", "--script", "/nonexistent/run.cld"]).unwrap();
        let err = Config::from_args(&args).unwrap_err();
        assert!(matches!(err, DispatchError::Config { .. }));
    }

    #[test]
    fn test_existing_script_is_accepted() {
        let file = NamedTempFile::new().unwrap();
        let config = Config {
            script: Some(file.path().to_path_buf()),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_prompt_is_rejected() {
        let config = Config {
            interactive: true,
            prompt: String::new(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
