//! Validators for converted form values.

use crate::form::types::Value;

/// The value under validation plus the errors reported against it.
#[derive(Debug)]
pub struct Validatable<'a> {
    label: &'a str,
    value: Option<&'a Value>,
    errors: Vec<String>,
}

impl<'a> Validatable<'a> {
    pub fn new(label: &'a str, value: Option<&'a Value>) -> Self {
        Self {
            label,
            value,
            errors: Vec::new(),
        }
    }

    /// Converted value, `None` when the input was empty.
    pub fn value(&self) -> Option<&'a Value> {
        self.value
    }

    /// Label of the component, for messages.
    pub fn label(&self) -> &'a str {
        self.label
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }
}

pub trait Validator: Send + Sync {
    fn validate(&self, validatable: &mut Validatable<'_>);

    /// Whether to run when there is no value. Off by default.
    fn accepts_null(&self) -> bool {
        false
    }
}

/// String length bounds, in characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringLengthValidator {
    min: Option<usize>,
    max: Option<usize>,
}

impl StringLengthValidator {
    pub fn between(min: usize, max: usize) -> Self {
        Self { min: Some(min), max: Some(max) }
    }

    pub fn minimum(min: usize) -> Self {
        Self { min: Some(min), max: None }
    }

    pub fn maximum(max: usize) -> Self {
        Self { min: None, max: Some(max) }
    }
}

impl Validator for StringLengthValidator {
    fn validate(&self, validatable: &mut Validatable<'_>) {
        let Some(text) = validatable.value().and_then(Value::as_str) else {
            return;
        };
        let length = text.chars().count();
        let label = validatable.label();
        match (self.min, self.max) {
            (Some(min), Some(max)) if length < min || length > max => validatable.error(format!(
                "'{}' must be between {} and {} characters long",
                label, min, max
            )),
            (Some(min), None) if length < min => {
                validatable.error(format!("'{}' must be at least {} characters long", label, min))
            }
            (None, Some(max)) if length > max => {
                validatable.error(format!("'{}' must be at most {} characters long", label, max))
            }
            _ => {}
        }
    }
}

/// Inclusive numeric range.
#[derive(Debug, Clone, Copy)]
pub struct RangeValidator {
    min: f64,
    max: f64,
}

impl RangeValidator {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl Validator for RangeValidator {
    fn validate(&self, validatable: &mut Validatable<'_>) {
        let Some(number) = validatable.value().and_then(Value::as_f64) else {
            return;
        };
        if number < self.min || number > self.max {
            let message = format!(
                "'{}' must be between {} and {}",
                validatable.label(),
                self.min,
                self.max
            );
            validatable.error(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(validator: &dyn Validator, value: Option<&Value>) -> Vec<String> {
        let mut validatable = Validatable::new("field", value);
        validator.validate(&mut validatable);
        validatable.into_errors()
    }

    #[test]
    fn test_string_length() {
        let validator = StringLengthValidator::between(2, 4);
        assert!(run(&validator, Some(&Value::String("abc".into()))).is_empty());
        assert_eq!(
            run(&validator, Some(&Value::String("a".into()))),
            vec!["'field' must be between 2 and 4 characters long"]
        );
        assert!(run(&StringLengthValidator::maximum(2), Some(&Value::String("ææ".into()))).is_empty());
        assert_eq!(run(&StringLengthValidator::minimum(3), Some(&Value::String("ab".into()))).len(), 1);
    }

    #[test]
    fn test_range() {
        let validator = RangeValidator::new(1.0, 10.0);
        assert!(run(&validator, Some(&Value::I32(10))).is_empty());
        assert_eq!(
            run(&validator, Some(&Value::U64(11))),
            vec!["'field' must be between 1 and 10"]
        );
        assert!(run(&validator, Some(&Value::String("x".into()))).is_empty());
    }
}
