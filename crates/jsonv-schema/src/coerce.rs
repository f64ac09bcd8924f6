//! # Coercion
//!
//! Best-effort, type-directed conversion of loosely typed input (query
//! strings, form fields, environment variables) into the shape a schema
//! describes. Coercion never validates and never invents missing values;
//! filling defaults is the template generator's job.
//!
//! | Kind | Conversion |
//! |------|------------|
//! | string | numbers become their decimal text |
//! | number, integer | numeric strings are parsed |
//! | boolean | `1`/`0`, `"true"`/`"false"`, `"1"`/`"0"` |
//! | object | JSON text starting with `{` is parsed; declared properties are coerced; undeclared ones are kept, coerced, or dropped |
//! | array | elements are coerced through `prefixItems`/`items` |
//! | union, any | unchanged: the engine does not guess a branch |
//!
//! A custom coerce hook replaces all of the above for its node. Coercion is
//! idempotent: coercing an already coerced value returns it unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use jsonv_core::{number_value, SchemaError};

use crate::keywords::display_number;
use crate::node::{SchemaId, SchemaKind};
use crate::resolver::MAX_REF_DEPTH;
use crate::schema::Schema;
use crate::validate::{Evaluator, Location};

/// Options for coercion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoercionOptions {
    /// Drop object keys that are not declared in `properties`.
    pub drop_unknown: bool,
}

impl Schema {
    /// Coerce `value` with default options.
    pub fn coerce(&self, value: &Value) -> Result<Value, SchemaError> {
        self.coerce_with(value, &CoercionOptions::default())
    }

    pub fn coerce_with(&self, value: &Value, options: &CoercionOptions) -> Result<Value, SchemaError> {
        self.coerce_at(self.root, value, options)
    }

    pub(crate) fn coerce_at(&self, id: SchemaId, value: &Value, options: &CoercionOptions) -> Result<Value, SchemaError> {
        self.coerce_node(id, value, options, 0)
    }

    fn coerce_node(&self, id: SchemaId, value: &Value, options: &CoercionOptions, depth: usize) -> Result<Value, SchemaError> {
        let mut depth = depth;
        let id = self.follow(id, &mut depth)?;
        let node = self.node(id);

        if let Some(hook) = &node.hooks.coerce {
            return Ok(hook.coerce(value, options));
        }

        if let Some(reference) = node.reference() {
            let target = self.resolver().resolve(reference)?;
            if depth + 1 > MAX_REF_DEPTH {
                return Err(SchemaError::RecursionLimit(MAX_REF_DEPTH));
            }
            return self.coerce_node(target, value, options, depth + 1);
        }

        Ok(match node.kind {
            SchemaKind::String => coerce_string(value),
            SchemaKind::Number | SchemaKind::Integer => coerce_number(value),
            SchemaKind::Boolean => coerce_boolean(value),
            SchemaKind::Object => self.coerce_object(id, value, options, depth)?,
            SchemaKind::Array => self.coerce_array(id, value, options, depth)?,
            _ => value.clone(),
        })
    }

    fn coerce_object(&self, id: SchemaId, value: &Value, options: &CoercionOptions, depth: usize) -> Result<Value, SchemaError> {
        let parsed;
        let value = match value {
            Value::String(s) if s.trim_start().starts_with('{') => match serde_json::from_str::<Value>(s) {
                Ok(v @ Value::Object(_)) => {
                    parsed = v;
                    &parsed
                }
                _ => value,
            },
            _ => value,
        };
        let Value::Object(input) = value else {
            return Ok(value.clone());
        };

        let node = self.node(id);
        let declared = node.properties();
        let is_strict = !declared.is_empty() && declared.iter().all(|(_, p)| !self.node(*p).optional);

        let mut out: Map<String, Value> = if options.drop_unknown || is_strict {
            declared
                .iter()
                .filter_map(|(key, _)| input.get(key).map(|v| (key.clone(), v.clone())))
                .collect()
        } else {
            input.clone()
        };

        for (key, prop) in declared {
            if let Some(v) = input.get(key) {
                let coerced = self.coerce_node(*prop, v, options, depth)?;
                out.insert(key.clone(), coerced);
            }
        }

        if options.drop_unknown {
            return Ok(Value::Object(out));
        }
        let additional = node.additional_properties();
        let open = match additional {
            None => true,
            Some(ap) => Evaluator::lenient(self).accepts(ap, &Value::Null, &Location::default(), depth)?,
        };
        if open {
            for (key, v) in input {
                if declared.iter().any(|(k, _)| k == key) {
                    continue;
                }
                let coerced = match additional {
                    Some(ap) => self.coerce_node(ap, v, options, depth)?,
                    None => v.clone(),
                };
                out.insert(key.clone(), coerced);
            }
        }
        Ok(Value::Object(out))
    }

    fn coerce_array(&self, id: SchemaId, value: &Value, options: &CoercionOptions, depth: usize) -> Result<Value, SchemaError> {
        let Value::Array(elements) = value else {
            return Ok(value.clone());
        };
        let node = self.node(id);
        let prefix = node.prefix_items();
        let items = node.items();
        elements
            .iter()
            .enumerate()
            .map(|(i, element)| match prefix.get(i).copied().or(items) {
                Some(schema) => self.coerce_node(schema, element, options, depth),
                None => Ok(element.clone()),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }
}

/// Numbers become their shortest decimal text.
pub fn coerce_string(value: &Value) -> Value {
    match value {
        Value::Number(n) => Value::String(match n.as_f64() {
            Some(f) if !(n.is_i64() || n.is_u64()) => display_number(f),
            _ => n.to_string(),
        }),
        _ => value.clone(),
    }
}

/// Numeric strings become numbers. Used for both `number` and `integer`.
pub fn coerce_number(value: &Value) -> Value {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return value.clone();
            }
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .and_then(number_value)
                .unwrap_or_else(|| value.clone())
        }
        _ => value.clone(),
    }
}

pub fn coerce_boolean(value: &Value) -> Value {
    match value {
        Value::Number(n) if n.as_f64() == Some(1.0) => Value::Bool(true),
        Value::Number(n) if n.as_f64() == Some(0.0) => Value::Bool(false),
        Value::String(s) => match s.as_str() {
            "true" | "1" => Value::Bool(true),
            "false" | "0" => Value::Bool(false),
            _ => value.clone(),
        },
        _ => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::SplitDelimited;
    use serde_json::json;

    #[test]
    fn test_string_from_number() {
        assert_eq!(Schema::string().coerce(&json!(30)).unwrap(), json!("30"));
        assert_eq!(Schema::string().coerce(&json!(1.5)).unwrap(), json!("1.5"));
        assert_eq!(Schema::string().coerce(&json!(2.0)).unwrap(), json!("2"));
        assert_eq!(Schema::string().coerce(&json!(true)).unwrap(), json!(true));
        assert_eq!(Schema::string().coerce(&json!({"a": 1})).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_number_from_string() {
        assert_eq!(Schema::number().coerce(&json!("30")).unwrap(), json!(30));
        assert_eq!(Schema::number().coerce(&json!(" 1.5 ")).unwrap(), json!(1.5));
        assert_eq!(Schema::number().coerce(&json!("abc")).unwrap(), json!("abc"));
        assert_eq!(Schema::number().coerce(&json!("")).unwrap(), json!(""));
        assert_eq!(Schema::number().coerce(&json!("inf")).unwrap(), json!("inf"));
        assert_eq!(Schema::integer().coerce(&json!("42")).unwrap(), json!(42));
    }

    #[test]
    fn test_boolean_mapping() {
        let schema = Schema::boolean();
        assert_eq!(schema.coerce(&json!(1)).unwrap(), json!(true));
        assert_eq!(schema.coerce(&json!(0)).unwrap(), json!(false));
        assert_eq!(schema.coerce(&json!("true")).unwrap(), json!(true));
        assert_eq!(schema.coerce(&json!("0")).unwrap(), json!(false));
        assert_eq!(schema.coerce(&json!(2)).unwrap(), json!(2));
        assert_eq!(schema.coerce(&json!("yes")).unwrap(), json!("yes"));
    }

    #[test]
    fn test_object_coerces_declared_properties() {
        let schema = Schema::object([("name", Schema::string()), ("age", Schema::number())]);
        assert_eq!(
            schema.coerce(&json!({"name": "John", "age": "30"})).unwrap(),
            json!({"name": "John", "age": 30})
        );
    }

    #[test]
    fn test_object_keeps_unknown_keys_when_open() {
        let schema = Schema::object([("age", Schema::number().optional())]);
        assert_eq!(
            schema.coerce(&json!({"age": "1", "extra": "x"})).unwrap(),
            json!({"age": 1, "extra": "x"})
        );
    }

    #[test]
    fn test_drop_unknown() {
        let schema = Schema::object([("age", Schema::number().optional())]);
        let options = CoercionOptions { drop_unknown: true };
        assert_eq!(
            schema.coerce_with(&json!({"age": "1", "extra": "x"}), &options).unwrap(),
            json!({"age": 1})
        );
    }

    #[test]
    fn test_additional_properties_coercer() {
        let schema = Schema::object([("a", Schema::string().optional())])
            .additional_properties(Schema::any_of(vec![Schema::number(), Schema::null()]));
        let open = Schema::object([("a", Schema::string().optional())])
            .additional_properties(Schema::number().optional());
        assert_eq!(
            schema.coerce(&json!({"a": 1, "b": "2"})).unwrap(),
            json!({"a": "1", "b": "2"})
        );
        assert_eq!(
            open.coerce(&json!({"a": 1, "b": "2"})).unwrap(),
            json!({"a": "1", "b": "2"})
        );
    }

    #[test]
    fn test_closed_object_does_not_merge_extras() {
        let schema = Schema::object([("a", Schema::string())]).strict().unwrap();
        assert_eq!(schema.coerce(&json!({"a": 1, "b": 2})).unwrap(), json!({"a": "1"}));
    }

    #[test]
    fn test_object_from_json_text() {
        let schema = Schema::object([("n", Schema::number())]);
        assert_eq!(schema.coerce(&json!(r#"{"n": "5"}"#)).unwrap(), json!({"n": 5}));
        assert_eq!(schema.coerce(&json!("{oops")).unwrap(), json!("{oops"));
        assert_eq!(schema.coerce(&json!(7)).unwrap(), json!(7));
    }

    #[test]
    fn test_array_elements() {
        let schema = Schema::array(Schema::number()).prefix_items(vec![Schema::string()]);
        assert_eq!(schema.coerce(&json!([1, "2", "3"])).unwrap(), json!(["1", 2, 3]));
    }

    #[test]
    fn test_union_left_alone() {
        let schema = Schema::any_of(vec![Schema::number(), Schema::boolean()]);
        assert_eq!(schema.coerce(&json!("1")).unwrap(), json!("1"));
    }

    #[test]
    fn test_union_with_hook() {
        let schema = Schema::any_of(vec![Schema::string(), Schema::array(Schema::string())])
            .coerce_hook(SplitDelimited::default());
        assert_eq!(schema.coerce(&json!("a,b")).unwrap(), json!(["a", "b"]));
    }

    #[test]
    fn test_nested_and_recursive() {
        let tree = Schema::recursive(|this| {
            Schema::object([("value", Schema::integer()), ("children", Schema::array(this).optional())])
        });
        let input = json!({"value": "1", "children": [{"value": "2"}]});
        assert_eq!(
            tree.coerce(&input).unwrap(),
            json!({"value": 1, "children": [{"value": 2}]})
        );
    }

    #[test]
    fn test_ref_target_coercer() {
        let schema = Schema::object([
            ("count", Schema::integer()),
            ("again", Schema::reference("#/properties/count").optional()),
        ]);
        assert_eq!(
            schema.coerce(&json!({"count": "1", "again": "2"})).unwrap(),
            json!({"count": 1, "again": 2})
        );
    }

    #[test]
    fn test_idempotent() {
        let schema = Schema::object([
            ("a", Schema::number()),
            ("b", Schema::boolean().optional()),
            ("c", Schema::array(Schema::string()).optional()),
        ]);
        let once = schema.coerce(&json!({"c": [1, 2], "a": "3", "b": "1", "z": 0})).unwrap();
        assert_eq!(schema.coerce(&once).unwrap(), once);
    }
}
