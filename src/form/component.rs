//! Form components: raw input, conversion and validation for one field.

use crate::form::types::{TypeDescriptor, Value};
use crate::form::validation::{Validatable, Validator};

pub struct FormComponent {
    id: String,
    label: Option<String>,
    resource_label: Option<String>,
    type_descriptor: TypeDescriptor,
    required: bool,
    raw_input: Option<String>,
    converted: Option<Value>,
    validators: Vec<Box<dyn Validator>>,
    errors: Vec<String>,
}

impl FormComponent {
    /// A text field converting to `String`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            resource_label: None,
            type_descriptor: TypeDescriptor::default(),
            required: false,
            raw_input: None,
            converted: None,
            validators: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// A text field with an initial value.
    pub fn with_value(id: impl Into<String>, value: impl Into<String>) -> Self {
        let mut component = Self::new(id);
        component.set_input(Some(value.into()));
        component
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_type(&mut self, type_descriptor: TypeDescriptor) -> &mut Self {
        self.type_descriptor = type_descriptor;
        self
    }

    pub fn type_descriptor(&self) -> &TypeDescriptor {
        &self.type_descriptor
    }

    pub fn set_label(&mut self, label: impl Into<String>) -> &mut Self {
        self.label = Some(label.into());
        self
    }

    /// Label looked up from the owning form's resource strings.
    pub(crate) fn set_resource_label(&mut self, label: Option<String>) {
        self.resource_label = label;
    }

    /// Label from resource strings, else the id.
    pub fn default_label(&self) -> &str {
        self.resource_label.as_deref().unwrap_or(&self.id)
    }

    /// Explicit label, else the default label.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or_else(|| self.default_label())
    }

    pub fn set_required(&mut self, required: bool) -> &mut Self {
        self.required = required;
        self
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn add_validator(&mut self, validator: impl Validator + 'static) -> &mut Self {
        self.validators.push(Box::new(validator));
        self
    }

    /// Replace the raw input; clears the previous conversion.
    pub fn set_input(&mut self, input: Option<String>) {
        self.raw_input = input;
        self.converted = None;
    }

    /// Raw input as submitted.
    pub fn input(&self) -> Option<&str> {
        self.raw_input.as_deref()
    }

    /// Value from the last successful conversion.
    pub fn converted_value(&self) -> Option<&Value> {
        self.converted.as_ref()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Convert the raw input. Empty input converts to no value.
    pub fn convert_input(&mut self) -> bool {
        self.converted = None;
        let input = match self.raw_input.as_deref() {
            Some(input) if !input.trim().is_empty() => input,
            _ => return true,
        };
        match self.type_descriptor.convert(input) {
            Ok(value) => {
                self.converted = Some(value);
                true
            }
            Err(e) => {
                tracing::debug!(component = %self.id, error = %e, "Conversion failed");
                self.errors.push(e.to_string());
                false
            }
        }
    }

    /// Check required, convert, then run validators.
    ///
    /// Validators that do not accept null are skipped when there is no value.
    /// A failed conversion skips validators entirely.
    pub fn validate(&mut self) -> bool {
        self.errors.clear();

        let empty = self.raw_input.as_deref().map_or(true, |input| input.trim().is_empty());
        if self.required && empty {
            self.errors.push(format!("'{}' is required", self.label()));
            return false;
        }

        if !self.convert_input() {
            return false;
        }

        let mut validatable = Validatable::new(self.label(), self.converted.as_ref());
        for validator in &self.validators {
            if validatable.value().is_some() || validator.accepts_null() {
                validator.validate(&mut validatable);
            }
        }
        let errors = validatable.into_errors();
        self.errors.extend(errors);
        self.is_valid()
    }
}

impl std::fmt::Debug for FormComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormComponent")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("type", &self.type_descriptor.to_string())
            .field("required", &self.required)
            .field("raw_input", &self.raw_input)
            .field("converted", &self.converted)
            .field("validators", &self.validators.len())
            .field("errors", &self.errors)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::types::ScalarKind;
    use crate::form::validation::StringLengthValidator;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_array_type() {
        let mut fc = FormComponent::new("foo");
        fc.set_type(TypeDescriptor::array(ScalarKind::String, 1));
        assert_eq!(fc.type_descriptor(), &"String[]".parse::<TypeDescriptor>().unwrap());
    }

    #[test]
    fn test_multi_dimensional_array_type() {
        let mut fc = FormComponent::new("foo");
        fc.set_type("String[][][]".parse().unwrap());
        assert_eq!(fc.type_descriptor().to_string(), "String[][][]");
    }

    #[test]
    fn test_primitive_array_type() {
        let mut fc = FormComponent::new("foo");
        fc.set_type(TypeDescriptor::array(ScalarKind::Bool, 1));
        assert_eq!(fc.type_descriptor().to_string(), "bool[]");
    }

    #[test]
    fn test_default_label() {
        let mut fc = FormComponent::new("field2");
        assert_eq!(fc.default_label(), "field2");
        fc.set_resource_label(Some("set".into()));
        assert_eq!(fc.default_label(), "set");
        fc.set_label("Explicit");
        assert_eq!(fc.label(), "Explicit");
        assert_eq!(fc.default_label(), "set");
    }

    #[test]
    fn test_null_accepting_validators() {
        struct Recording {
            called: Arc<AtomicBool>,
            accepts_null: bool,
        }

        impl Validator for Recording {
            fn validate(&self, _validatable: &mut Validatable<'_>) {
                self.called.store(true, Ordering::SeqCst);
            }

            fn accepts_null(&self) -> bool {
                self.accepts_null
            }
        }

        let null_accepting = Arc::new(AtomicBool::new(false));
        let plain = Arc::new(AtomicBool::new(false));

        let mut fc = FormComponent::new("fc");
        fc.add_validator(Recording { called: null_accepting.clone(), accepts_null: true });
        fc.add_validator(Recording { called: plain.clone(), accepts_null: false });
        assert!(fc.validate());

        assert!(null_accepting.load(Ordering::SeqCst));
        assert!(!plain.load(Ordering::SeqCst));
    }

    #[test]
    fn test_conversion_failure_skips_validators() {
        let mut fc = FormComponent::new("age");
        fc.set_type(TypeDescriptor::scalar(ScalarKind::U32));
        fc.add_validator(StringLengthValidator::maximum(0));
        fc.set_input(Some("old".into()));

        assert!(!fc.validate());
        assert_eq!(fc.errors(), ["'old' is not a valid u32"]);
        assert!(fc.converted_value().is_none());
    }

    #[test]
    fn test_required() {
        let mut fc = FormComponent::new("name");
        fc.set_required(true).set_label("Name");
        fc.set_input(Some("  ".into()));
        assert!(!fc.validate());
        assert_eq!(fc.errors(), ["'Name' is required"]);

        fc.set_input(Some("Ann".into()));
        assert!(fc.validate());
        assert_eq!(fc.converted_value(), Some(&Value::String("Ann".into())));
    }
}
