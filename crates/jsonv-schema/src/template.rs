//! # Templates
//!
//! Materialize a default instance from a schema. Per node, the first of
//! these that applies wins:
//!
//! 1. `const`
//! 2. the seed value passed in, then `default`
//! 3. the first `enum` value, with `with_extended_optional` only
//! 4. nothing, if the node is optional and optional nodes are not wanted
//! 5. a custom template hook
//! 6. the structural default of the kind: `""`, `0`, `false`, `[]`,
//!    `null`, or a recursively templated object
//!
//! A nested object whose template has no keys is dropped unless
//! `with_extended_optional` is set, so optional sub-objects vanish from
//! the result instead of appearing as `{}`. The root object always yields
//! an object.
//!
//! Self-references are not expanded: a template never recurses through a
//! recursive schema's link, so it always terminates.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::node::{SchemaId, SchemaKind};
use crate::schema::Schema;

/// Options for template generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateOptions {
    /// Include optional properties.
    pub with_optional: bool,
    /// Fall back to the first `enum` value and keep empty nested objects.
    pub with_extended_optional: bool,
}

impl Schema {
    /// Template with no seed and default options.
    pub fn template(&self) -> Option<Value> {
        self.template_with(None, &TemplateOptions::default())
    }

    pub fn template_with(&self, seed: Option<&Value>, options: &TemplateOptions) -> Option<Value> {
        self.template_node(self.root, seed, options, false)
    }

    fn template_node(&self, id: SchemaId, seed: Option<&Value>, options: &TemplateOptions, nested: bool) -> Option<Value> {
        let node = self.node(id);
        match node.kind {
            SchemaKind::Bool(_) | SchemaKind::Link(_) | SchemaKind::Hole(_) => return seed.cloned(),
            _ => {}
        }

        let mut value = node
            .const_value()
            .or(seed)
            .or_else(|| node.default_value())
            .or_else(|| {
                options
                    .with_extended_optional
                    .then(|| node.enum_values().and_then(|e| e.first()))
                    .flatten()
            })
            .cloned();

        if value.is_none() && node.optional && !options.with_optional {
            return None;
        }

        if let Some(hook) = &node.hooks.template {
            if let Some(replaced) = hook.template(value.as_ref(), options) {
                value = Some(replaced);
            }
        }

        match node.kind {
            SchemaKind::Object => self.template_object(id, value, options, nested),
            SchemaKind::String => value.or(Some(Value::String(String::new()))),
            SchemaKind::Number | SchemaKind::Integer => value.or(Some(Value::from(0))),
            SchemaKind::Boolean => value.or(Some(Value::Bool(false))),
            SchemaKind::Array => value.or(Some(Value::Array(Vec::new()))),
            SchemaKind::Null => value.or(Some(Value::Null)),
            _ => value,
        }
    }

    fn template_object(&self, id: SchemaId, value: Option<Value>, options: &TemplateOptions, nested: bool) -> Option<Value> {
        let base = match &value {
            Some(Value::Object(map)) => map.clone(),
            Some(other) => return Some(other.clone()),
            None => Map::new(),
        };
        let mut out = base.clone();
        for (key, prop) in self.node(id).properties() {
            let current = base.get(key);
            let skip = self.node(*prop).optional && !options.with_optional && current.is_none() && value.is_none();
            if skip {
                continue;
            }
            if let Some(filled) = self.template_node(*prop, current, options, true) {
                out.insert(key.clone(), filled);
            }
        }
        if out.is_empty() && nested && !options.with_extended_optional {
            return None;
        }
        Some(Value::Object(out))
    }
}
