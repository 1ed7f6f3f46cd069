//! Typed values carried by options and arguments
//!
//! A [`Value`] is a tagged union: the variant is the declared kind and holds
//! the only payload that is ever inspected.

use crate::error::{DispatchError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Declared kind of an option or argument value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Presence-only switch; never consumes a value token
    Flag,
    /// Integer token interpreted as `> 0`
    Boolean,
    Integer,
    Double,
    String,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Flag => "flag",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Double => "double",
            Self::String => "string",
        };
        f.write_str(name)
    }
}

/// How malformed numeric tokens are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coercion {
    /// Reject tokens that are not entirely a number of the declared kind
    #[default]
    Strict,
    /// Use the longest numeric prefix, or zero when there is none
    Lenient,
}

/// A typed value with exactly one active payload
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Flag(bool),
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
}

impl Value {
    /// Create the zero value of the given kind
    #[must_use]
    pub const fn new(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Flag => Self::Flag(false),
            ValueKind::Boolean => Self::Boolean(false),
            ValueKind::Integer => Self::Integer(0),
            ValueKind::Double => Self::Double(0.0),
            ValueKind::String => Self::String(String::new()),
        }
    }

    /// The kind this value was declared with
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Flag(_) => ValueKind::Flag,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Integer(_) => ValueKind::Integer,
            Self::Double(_) => ValueKind::Double,
            Self::String(_) => ValueKind::String,
        }
    }

    /// Reset the payload to the zero value of its kind
    pub fn reset(&mut self) {
        *self = Self::new(self.kind());
    }

    /// Mark a flag as present
    pub fn set_flag(&mut self) {
        if let Self::Flag(present) = self {
            *present = true;
        }
    }

    /// Parse `token` into this value according to its kind.
    ///
    /// Flags never take a value token, so parsing into one is an error.
    pub fn parse(&mut self, token: &str, coercion: Coercion) -> Result<()> {
        let kind = self.kind();
        match self {
            Self::Flag(_) => {
                return Err(DispatchError::unknown(format!(
                    "flag values cannot be parsed from a token ({token})"
                )));
            }
            Self::Boolean(b) => *b = parse_integer(token, kind, coercion)? > 0,
            Self::Integer(i) => *i = parse_integer(token, kind, coercion)?,
            Self::Double(d) => *d = parse_double(token, coercion)?,
            Self::String(s) => token.clone_into(s),
        }
        debug!("Parsed {} value from '{}': {}", kind, token, self);
        Ok(())
    }

    /// Boolean payload of a flag or boolean value
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Flag(b) | Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(d) => Some(*d),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(b) | Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Double(d) => write!(f, "{d}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

fn parse_integer(token: &str, kind: ValueKind, coercion: Coercion) -> Result<i64> {
    if let Ok(v) = token.trim().parse::<i64>() {
        return Ok(v);
    }
    match coercion {
        Coercion::Strict => Err(DispatchError::invalid_token(token, kind)),
        Coercion::Lenient => {
            let prefix = integer_prefix(token);
            let v = prefix.parse::<i64>().unwrap_or(0);
            warn!("Malformed {} token '{}', using {}", kind, token, v);
            Ok(v)
        }
    }
}

fn parse_double(token: &str, coercion: Coercion) -> Result<f64> {
    if let Ok(v) = token.trim().parse::<f64>() {
        return Ok(v);
    }
    match coercion {
        Coercion::Strict => Err(DispatchError::invalid_token(token, ValueKind::Double)),
        Coercion::Lenient => {
            let prefix = double_prefix(token);
            let v = prefix.parse::<f64>().unwrap_or(0.0);
            warn!("Malformed double token '{}', using {}", token, v);
            Ok(v)
        }
    }
}

/// Leading `[+-]?digits` of `token`, after leading whitespace
fn integer_prefix(token: &str) -> &str {
    let s = token.trim_start();
    let bytes = s.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    &s[..end]
}

/// Leading decimal number (with optional fraction and exponent) of `token`
fn double_prefix(token: &str) -> &str {
    let s = token.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut has_digits = int_end > end;
    end = int_end;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_end = digits_from(end + 1);
        has_digits |= frac_end > end + 1;
        end = frac_end;
    }
    if !has_digits {
        return "";
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp = end + 1;
        if exp < bytes.len() && matches!(bytes[exp], b'+' | b'-') {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    &s[..end]
}
