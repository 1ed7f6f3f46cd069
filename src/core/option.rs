//! Named switches attached to commands

use crate::{
    core::value::{Value, ValueKind},
    error::{DispatchError, Result},
};

/// A `--name` / `-short` switch wrapping a typed value
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOption {
    /// Long form, matched after `--`
    pub name: String,
    /// Abbreviated form, matched after a single `-`
    pub short_name: Option<String>,
    pub description: String,
    value: Value,
    default_value: Value,
}

impl CommandOption {
    /// Create a new option whose default is the zero value of `kind`
    pub fn new(
        name: impl Into<String>,
        short_name: Option<&str>,
        kind: ValueKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            short_name: short_name.map(str::to_string),
            description: description.into(),
            value: Value::new(kind),
            default_value: Value::new(kind),
        }
    }

    /// Create a presence-only flag option
    pub fn flag(
        name: impl Into<String>,
        short_name: Option<&str>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(name, short_name, ValueKind::Flag, description)
    }

    /// Replace the default value; its kind must match the declared kind
    pub fn with_default(mut self, default_value: Value) -> Result<Self> {
        if default_value.kind() != self.kind() {
            return Err(DispatchError::registration(format!(
                "default for option --{} is {}, expected {}",
                self.name,
                default_value.kind(),
                self.kind()
            )));
        }
        self.value = default_value.clone();
        self.default_value = default_value;
        Ok(self)
    }

    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        self.default_value.kind()
    }

    /// Current value
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    pub(crate) fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    #[must_use]
    pub const fn default_value(&self) -> &Value {
        &self.default_value
    }

    /// Restore the current value from the default
    pub fn reset(&mut self) {
        self.value.clone_from(&self.default_value);
    }

    /// Whether `long` equals the long name
    #[must_use]
    pub fn matches_long(&self, long: &str) -> bool {
        self.name == long
    }

    /// Whether `short` equals the short name
    #[must_use]
    pub fn matches_short(&self, short: &str) -> bool {
        self.short_name.as_deref() == Some(short)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_long_and_short() {
        let opt = CommandOption::flag("verbose", Some("v"), "Verbose output");
        assert!(opt.matches_long("verbose"));
        assert!(opt.matches_short("v"));
        assert!(!opt.matches_short("verbose"));

        let no_short = CommandOption::flag("all", None, "Show all");
        assert!(!no_short.matches_short(""));
    }

    #[test]
    fn test_with_default_checks_kind() {
        let opt = CommandOption::new("limit", Some("n"), ValueKind::Integer, "Max rows")
            .with_default(Value::Integer(10))
            .unwrap();
        assert_eq!(opt.value(), &Value::Integer(10));

        let err = CommandOption::new("limit", None, ValueKind::Integer, "")
            .with_default(Value::String("ten".to_string()))
            .unwrap_err();
        assert!(matches!(err, DispatchError::Registration { .. }));
    }

    #[test]
    fn test_reset_restores_default() {
        let mut opt = CommandOption::new("limit", None, ValueKind::Integer, "")
            .with_default(Value::Integer(5))
            .unwrap();
        *opt.value_mut() = Value::Integer(99);
        opt.reset();
        assert_eq!(opt.value().as_int(), Some(5));
    }
}
