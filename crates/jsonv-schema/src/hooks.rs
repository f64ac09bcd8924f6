//! # Behavior Hooks
//!
//! A schema node may replace its default validation, coercion, or template
//! behavior with a strategy object. Hooks are shared behind `Arc` so cloning
//! a schema is cheap and the clone behaves identically.
//!
//! Two stock strategies cover the common cases:
//!
//! - [`SplitDelimited`] turns `"a,b,c"` into `["a","b","c"]` during coercion.
//! - [`Constant`] always produces the same value, for coercion or templates.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::coerce::CoercionOptions;
use crate::template::TemplateOptions;
use crate::validate::{Location, ValidationResult};

/// Custom validation. Runs before the node's keywords; a failing result
/// is returned as-is and the keywords are not evaluated.
pub trait ValidateHook: Send + Sync {
    fn validate(&self, value: &Value, at: &Location) -> ValidationResult;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Custom coercion. Replaces the node's default coercion entirely.
pub trait CoerceHook: Send + Sync {
    fn coerce(&self, value: &Value, options: &CoercionOptions) -> Value;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Custom template. Receives the value chosen from `const`/seed/`default`
/// and may replace it; returning `None` keeps the incoming value.
pub trait TemplateHook: Send + Sync {
    fn template(&self, value: Option<&Value>, options: &TemplateOptions) -> Option<Value>;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// The hooks attached to one node.
#[derive(Clone, Default)]
pub struct Hooks {
    pub(crate) validate: Option<Arc<dyn ValidateHook>>,
    pub(crate) coerce: Option<Arc<dyn CoerceHook>>,
    pub(crate) template: Option<Arc<dyn TemplateHook>>,
}

impl Hooks {
    pub fn is_empty(&self) -> bool {
        self.validate.is_none() && self.coerce.is_none() && self.template.is_none()
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("validate", &self.validate.as_ref().map(|h| h.name().to_string()))
            .field("coerce", &self.coerce.as_ref().map(|h| h.name().to_string()))
            .field("template", &self.template.as_ref().map(|h| h.name().to_string()))
            .finish()
    }
}

/// Coerce a delimited string into an array of strings.
///
/// Strings are split on the delimiter (a string without the delimiter
/// becomes a one-element array), arrays have their elements stringified,
/// and any other scalar becomes a one-element array of its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitDelimited {
    pub delimiter: char,
}

impl SplitDelimited {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }
}

impl Default for SplitDelimited {
    fn default() -> Self {
        Self::new(',')
    }
}

impl CoerceHook for SplitDelimited {
    fn coerce(&self, value: &Value, _options: &CoercionOptions) -> Value {
        match value {
            Value::String(s) => s
                .split(self.delimiter)
                .map(|part| Value::String(part.to_string()))
                .collect(),
            Value::Array(items) => items.iter().map(|v| Value::String(text_of(v))).collect(),
            Value::Null => value.clone(),
            other => Value::Array(vec![Value::String(text_of(other))]),
        }
    }

    fn name(&self) -> &str {
        "split-delimited"
    }
}

/// Always yields the same value.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant(pub Value);

impl CoerceHook for Constant {
    fn coerce(&self, _value: &Value, _options: &CoercionOptions) -> Value {
        self.0.clone()
    }

    fn name(&self) -> &str {
        "constant"
    }
}

impl TemplateHook for Constant {
    fn template(&self, _value: Option<&Value>, _options: &TemplateOptions) -> Option<Value> {
        Some(self.0.clone())
    }

    fn name(&self) -> &str {
        "constant"
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_delimited() {
        let hook = SplitDelimited::default();
        let opts = CoercionOptions::default();
        assert_eq!(hook.coerce(&json!("a,b,c"), &opts), json!(["a", "b", "c"]));
        assert_eq!(hook.coerce(&json!("a"), &opts), json!(["a"]));
        assert_eq!(hook.coerce(&json!(["a", 1]), &opts), json!(["a", "1"]));
        assert_eq!(hook.coerce(&json!(7), &opts), json!(["7"]));
    }

    #[test]
    fn test_split_delimited_is_idempotent() {
        let hook = SplitDelimited::new(';');
        let opts = CoercionOptions::default();
        let once = hook.coerce(&json!("x;y"), &opts);
        assert_eq!(hook.coerce(&once, &opts), once);
    }

    #[test]
    fn test_constant_hook() {
        let hook = Constant(json!("fixed"));
        assert_eq!(
            CoerceHook::coerce(&hook, &json!(1), &CoercionOptions::default()),
            json!("fixed")
        );
        assert_eq!(
            TemplateHook::template(&hook, None, &TemplateOptions::default()),
            Some(json!("fixed"))
        );
    }

    #[test]
    fn test_hooks_debug_names() {
        let hooks = Hooks {
            coerce: Some(Arc::new(SplitDelimited::default())),
            ..Hooks::default()
        };
        assert!(format!("{hooks:?}").contains("split-delimited"));
        assert!(!hooks.is_empty());
    }
}
