//! Form processing subsystem.
//!
//! # Data Flow
//! ```text
//! POST body (application/x-www-form-urlencoded)
//!     → Form::submit (raw input per component id)
//!     → component.rs (required check, conversion)
//!     → types.rs (TypeDescriptor → Value)
//!     → validation.rs (validators)
//!     → valid / per-component errors
//! ```
//!
//! # Design Decisions
//! - Components keep the submitted input even when invalid, so a form can
//!   be re-rendered with what the user typed
//! - Labels can come from resource strings keyed `<form-id>.<component-id>`

pub mod component;
pub mod types;
pub mod validation;

use std::collections::HashMap;

pub use component::FormComponent;
pub use types::{ConversionError, ScalarKind, TypeDescriptor, Value};
pub use validation::{RangeValidator, StringLengthValidator, Validatable, Validator};

#[derive(Debug)]
pub struct Form {
    id: String,
    components: Vec<FormComponent>,
    resource_strings: HashMap<String, String>,
}

impl Form {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            components: Vec::new(),
            resource_strings: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Register a resource string such as `form.field1 = Name`.
    pub fn set_resource_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.resource_strings.insert(key.into(), value.into());
        for component in &mut self.components {
            let label = Self::lookup_label(&self.id, &self.resource_strings, component.id());
            component.set_resource_label(label);
        }
    }

    pub fn add(&mut self, mut component: FormComponent) -> &mut Self {
        let label = Self::lookup_label(&self.id, &self.resource_strings, component.id());
        component.set_resource_label(label);
        self.components.push(component);
        self
    }

    pub fn get(&self, id: &str) -> Option<&FormComponent> {
        self.components.iter().find(|c| c.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut FormComponent> {
        self.components.iter_mut().find(|c| c.id() == id)
    }

    pub fn components(&self) -> &[FormComponent] {
        &self.components
    }

    /// Apply a urlencoded body, then validate every component.
    ///
    /// Components without a value in the body get no input. The first value
    /// wins when a name repeats. Returns whether the whole form is valid.
    pub fn submit(&mut self, body: &str) -> bool {
        let mut values: HashMap<String, String> = HashMap::new();
        for (name, value) in url::form_urlencoded::parse(body.as_bytes()) {
            values.entry(name.into_owned()).or_insert_with(|| value.into_owned());
        }

        for component in &mut self.components {
            component.set_input(values.remove(component.id()));
        }

        let mut valid = true;
        for component in &mut self.components {
            valid &= component.validate();
        }
        tracing::debug!(form = %self.id, valid, "Form submitted");
        valid
    }

    /// Errors by component id, in component order.
    pub fn errors(&self) -> Vec<(&str, &str)> {
        self.components
            .iter()
            .flat_map(|c| c.errors().iter().map(move |e| (c.id(), e.as_str())))
            .collect()
    }

    fn lookup_label(form_id: &str, strings: &HashMap<String, String>, component_id: &str) -> Option<String> {
        strings.get(&format!("{}.{}", form_id, component_id)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_form() -> Form {
        let mut form = Form::new("form");
        form.set_resource_string("form.field1", "set");
        form.add(FormComponent::with_value("field1", ""));
        form.add(FormComponent::with_value("field2", ""));
        form
    }

    #[test]
    fn test_default_label_from_resource_strings() {
        let form = test_form();
        assert_eq!(form.get("field1").unwrap().default_label(), "set");
        assert_eq!(form.get("field2").unwrap().default_label(), "field2");
    }

    #[test]
    fn test_submit_keeps_values() {
        let mut form = test_form();
        assert!(form.submit("field1=foo&field2=bar"));
        assert_eq!(form.get("field1").unwrap().input(), Some("foo"));
        assert_eq!(form.get("field2").unwrap().input(), Some("bar"));
    }

    #[test]
    fn test_submit_decodes_and_validates() {
        let mut form = Form::new("order");
        form.add(FormComponent::new("quantity"));
        form.get_mut("quantity")
            .unwrap()
            .set_type(TypeDescriptor::scalar(ScalarKind::I32))
            .add_validator(RangeValidator::new(1.0, 5.0));
        form.add(FormComponent::new("tags"));
        form.get_mut("tags").unwrap().set_type("String[]".parse().unwrap());

        assert!(!form.submit("quantity=9&tags=red%2Cgreen+blue"));
        assert_eq!(form.errors(), vec![("quantity", "'quantity' must be between 1 and 5")]);
        assert_eq!(
            form.get("tags").unwrap().converted_value(),
            Some(&Value::Array(vec![
                Value::String("red".into()),
                Value::String("green blue".into())
            ]))
        );

        assert!(form.submit("quantity=3"));
        assert!(form.get("tags").unwrap().input().is_none());
    }
}
