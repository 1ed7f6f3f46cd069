//! Error types for the dispatcher
//!
//! Every failure of the parsing pipeline is a structured variant that maps onto
//! exactly one contract [`Status`] code.

use crate::core::{output::Status, value::ValueKind};
use thiserror::Error;

/// Main error type for command registration and dispatch
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    /// No command in the tree matched the leading token
    #[error("No valid command found: {token}. Type help to get more help")]
    CommandNotFound { token: String },

    /// The dispatched line held no tokens at all
    #[error("No command given. Type help to get more help")]
    NoCommand,

    /// An option marker did not match any option of the resolved chain
    #[error("Unknown option {option}")]
    OptionNotFound { option: String },

    /// A value-taking option was the last token of the stream
    #[error("Value missing for option {option}")]
    MissingOptionValue { option: String },

    /// The leaf command received a different number of positional tokens
    #[error("Expected {expected} argument(s), found {found}")]
    ArgumentCountMismatch { expected: usize, found: usize },

    /// Tokens were left over after every stage consumed its share
    #[error("{count} extra argument(s) found")]
    ExtraArgumentsFound { count: usize },

    /// A token could not be coerced to the declared value kind
    #[error("Invalid {kind} value: {token}")]
    InvalidToken { token: String, kind: ValueKind },

    /// The command tree was built inconsistently
    #[error("Registration error: {message}")]
    Registration { message: String },

    /// Runtime configuration is invalid
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Anything the pipeline does not classify
    #[error("{message}")]
    Unknown { message: String },
}

impl DispatchError {
    /// Create a new command-not-found error
    pub fn command_not_found(token: impl Into<String>) -> Self {
        Self::CommandNotFound {
            token: token.into(),
        }
    }

    /// Create a new empty-line error
    pub const fn no_command() -> Self {
        Self::NoCommand
    }

    /// Create a new option-not-found error
    pub fn option_not_found(option: impl Into<String>) -> Self {
        Self::OptionNotFound {
            option: option.into(),
        }
    }

    /// Create a new missing-value error
    pub fn missing_option_value(option: impl Into<String>) -> Self {
        Self::MissingOptionValue {
            option: option.into(),
        }
    }

    /// Create a new arity error
    pub const fn argument_count_mismatch(expected: usize, found: usize) -> Self {
        Self::ArgumentCountMismatch { expected, found }
    }

    /// Create a new leftover-tokens error
    pub const fn extra_arguments(count: usize) -> Self {
        Self::ExtraArgumentsFound { count }
    }

    /// Create a new coercion error
    pub fn invalid_token(token: impl Into<String>, kind: ValueKind) -> Self {
        Self::InvalidToken {
            token: token.into(),
            kind,
        }
    }

    /// Create a new registration error
    pub fn registration(message: impl Into<String>) -> Self {
        Self::Registration {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new unclassified error
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    /// The contract status code reported for this error
    #[must_use]
    pub const fn status(&self) -> Status {
        match self {
            Self::CommandNotFound { .. } | Self::NoCommand => Status::CommandNotFound,
            Self::OptionNotFound { .. } | Self::MissingOptionValue { .. } => {
                Status::OptionNotFound
            }
            Self::ArgumentCountMismatch { .. } => Status::ArgumentCountMismatch,
            Self::ExtraArgumentsFound { .. } => Status::ExtraArgumentsFound,
            Self::Registration { .. } => Status::AllocationFailed,
            Self::InvalidToken { .. } | Self::Config { .. } | Self::Unknown { .. } => {
                Status::Unknown
            }
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, DispatchError>;
