//! Positional arguments attached to leaf commands

use crate::{
    core::value::{Value, ValueKind},
    error::{DispatchError, Result},
};

/// A positional slot; its identity is its index in the owning command
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: String,
    pub description: String,
    /// Recorded for help output only; arity is always exact
    pub optional: bool,
    value: Value,
    default_value: Value,
}

impl Argument {
    /// Create a new required argument of the given kind
    pub fn new(name: impl Into<String>, kind: ValueKind, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            optional: false,
            value: Value::new(kind),
            default_value: Value::new(kind),
        }
    }

    /// Replace the default value; its kind must match the declared kind
    pub fn with_default(mut self, default_value: Value) -> Result<Self> {
        if default_value.kind() != self.kind() {
            return Err(DispatchError::registration(format!(
                "default for argument <{}> is {}, expected {}",
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

    pub fn reset(&mut self) {
        self.value.clone_from(&self.default_value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_argument_is_required() {
        let arg = Argument::new("image name", ValueKind::String, "Image to pull");
        assert!(!arg.optional);
        assert_eq!(arg.kind(), ValueKind::String);
        assert_eq!(arg.value().as_str(), Some(""));
    }

    #[test]
    fn test_default_kind_mismatch() {
        let result = Argument::new("count", ValueKind::Integer, "").with_default(Value::Double(1.0));
        assert!(result.is_err());
    }
}
