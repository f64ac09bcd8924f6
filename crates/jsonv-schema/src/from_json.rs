//! # Loading JSON-Schema Documents
//!
//! [`Schema::from_json`] builds a schema tree from a raw document. The
//! node kind is chosen from `type` (a single type selects its kind, several
//! types or none select `Any`, and `anyOf`/`oneOf` without `type` select
//! `Union`). Keyword order is preserved. Unknown keywords are kept as
//! annotations so `to_json` reproduces them.
//!
//! Properties not listed in `required` are marked optional, which is what
//! the template generator and coercion consult.

use serde_json::{Map, Value};

use jsonv_core::{to_json_pointer, InstanceType, PathSegment, SchemaError};

use crate::node::{Keyword, Pattern, SchemaId, SchemaKind, SchemaNode};
use crate::schema::Schema;

impl Schema {
    /// Build a schema from a JSON-Schema document (an object or a boolean).
    pub fn from_json(document: &Value) -> Result<Self, SchemaError> {
        Loader::default().load(document)
    }
}

#[derive(Default)]
struct Loader {
    path: Vec<PathSegment>,
}

impl Loader {
    fn load(&mut self, document: &Value) -> Result<Schema, SchemaError> {
        let map = match document {
            Value::Bool(b) => return Ok(Schema::from_node(SchemaNode::new(SchemaKind::Bool(*b)))),
            Value::Object(map) => map,
            other => return Err(self.invalid(format!("expected an object or boolean, found {other}"))),
        };

        let mut schema = Schema::from_node(SchemaNode::new(kind_of(map)?));
        let mut keywords = Vec::with_capacity(map.len());
        for (name, value) in map {
            self.path.push(PathSegment::from(name.as_str()));
            let keyword = self.keyword(&mut schema, name, value);
            self.path.pop();
            keywords.push(keyword?);
        }

        let root = schema.root();
        schema.node_mut(root).keywords = keywords;
        mark_optional(&mut schema, root);
        Ok(schema)
    }

    fn keyword(&mut self, schema: &mut Schema, name: &str, value: &Value) -> Result<Keyword, SchemaError> {
        Ok(match name {
            "type" => Keyword::Type(self.types(value)?),
            "const" => Keyword::Const(value.clone()),
            "default" => Keyword::Default(value.clone()),
            "enum" => Keyword::Enum(self.array(value)?.to_vec()),

            "allOf" => Keyword::AllOf(self.subschema_list(schema, value)?),
            "anyOf" => Keyword::AnyOf(self.subschema_list(schema, value)?),
            "oneOf" => Keyword::OneOf(self.subschema_list(schema, value)?),
            "prefixItems" => Keyword::PrefixItems(self.subschema_list(schema, value)?),
            "not" => Keyword::Not(self.subschema(schema, value)?),
            "if" => Keyword::If(self.subschema(schema, value)?),
            "then" => Keyword::Then(self.subschema(schema, value)?),
            "else" => Keyword::Else(self.subschema(schema, value)?),
            "items" => Keyword::Items(self.subschema(schema, value)?),
            "contains" => Keyword::Contains(self.subschema(schema, value)?),
            "additionalProperties" => Keyword::AdditionalProperties(self.subschema(schema, value)?),
            "propertyNames" => Keyword::PropertyNames(self.subschema(schema, value)?),

            "properties" => Keyword::Properties(self.subschema_map(schema, value)?),
            "dependentSchemas" => Keyword::DependentSchemas(self.subschema_map(schema, value)?),
            "$defs" => Keyword::Defs(self.subschema_map(schema, value)?),
            "patternProperties" => {
                let mut entries = Vec::new();
                for (source, id) in self.subschema_map(schema, value)? {
                    entries.push((Pattern::new(&source)?, id));
                }
                Keyword::PatternProperties(entries)
            }

            "minLength" => Keyword::MinLength(self.count(value)?),
            "maxLength" => Keyword::MaxLength(self.count(value)?),
            "minProperties" => Keyword::MinProperties(self.count(value)?),
            "maxProperties" => Keyword::MaxProperties(self.count(value)?),
            "minItems" => Keyword::MinItems(self.count(value)?),
            "maxItems" => Keyword::MaxItems(self.count(value)?),
            "minContains" => Keyword::MinContains(self.count(value)?),
            "maxContains" => Keyword::MaxContains(self.count(value)?),

            "minimum" => Keyword::Minimum(self.number(value)?),
            "maximum" => Keyword::Maximum(self.number(value)?),
            "exclusiveMinimum" => Keyword::ExclusiveMinimum(self.number(value)?),
            "exclusiveMaximum" => Keyword::ExclusiveMaximum(self.number(value)?),
            "multipleOf" => Keyword::MultipleOf(self.number(value)?),

            "pattern" => Keyword::Pattern(Pattern::new(self.string(value)?)?),
            "format" => Keyword::Format(self.string(value)?.to_string()),
            "$ref" => Keyword::Ref(self.string(value)?.to_string()),
            "$id" => Keyword::Id(self.string(value)?.to_string()),
            "uniqueItems" => Keyword::UniqueItems(
                value
                    .as_bool()
                    .ok_or_else(|| self.invalid("expected a boolean".to_string()))?,
            ),
            "required" => Keyword::Required(self.strings(value)?),
            "dependentRequired" => {
                let mut entries = Vec::new();
                for (key, deps) in self.object(value)? {
                    self.path.push(PathSegment::from(key.as_str()));
                    let deps = self.strings(deps);
                    self.path.pop();
                    entries.push((key.clone(), deps?));
                }
                Keyword::DependentRequired(entries)
            }

            other => Keyword::Annotation(other.to_string(), value.clone()),
        })
    }

    fn subschema(&mut self, schema: &mut Schema, value: &Value) -> Result<SchemaId, SchemaError> {
        let child = self.load(value)?;
        Ok(schema.adopt(child))
    }

    fn subschema_list(&mut self, schema: &mut Schema, value: &Value) -> Result<Vec<SchemaId>, SchemaError> {
        let mut ids = Vec::new();
        for (i, item) in self.array(value)?.iter().enumerate() {
            self.path.push(PathSegment::Index(i));
            let id = self.subschema(schema, item);
            self.path.pop();
            ids.push(id?);
        }
        Ok(ids)
    }

    fn subschema_map(&mut self, schema: &mut Schema, value: &Value) -> Result<Vec<(String, SchemaId)>, SchemaError> {
        let mut entries = Vec::new();
        for (key, item) in self.object(value)? {
            self.path.push(PathSegment::from(key.as_str()));
            let id = self.subschema(schema, item);
            self.path.pop();
            entries.push((key.clone(), id?));
        }
        Ok(entries)
    }

    fn types(&self, value: &Value) -> Result<Vec<InstanceType>, SchemaError> {
        match value {
            Value::String(s) => Ok(vec![s.parse()?]),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.parse(),
                    _ => Err(self.invalid("type names must be strings".to_string())),
                })
                .collect(),
            _ => Err(self.invalid("expected a type name or a list of type names".to_string())),
        }
    }

    fn array<'v>(&self, value: &'v Value) -> Result<&'v Vec<Value>, SchemaError> {
        value
            .as_array()
            .ok_or_else(|| self.invalid("expected an array".to_string()))
    }

    fn object<'v>(&self, value: &'v Value) -> Result<&'v Map<String, Value>, SchemaError> {
        value
            .as_object()
            .ok_or_else(|| self.invalid("expected an object".to_string()))
    }

    fn string<'v>(&self, value: &'v Value) -> Result<&'v str, SchemaError> {
        value
            .as_str()
            .ok_or_else(|| self.invalid("expected a string".to_string()))
    }

    fn strings(&self, value: &Value) -> Result<Vec<String>, SchemaError> {
        self.array(value)?
            .iter()
            .map(|v| self.string(v).map(String::from))
            .collect()
    }

    fn count(&self, value: &Value) -> Result<u64, SchemaError> {
        match value.as_u64() {
            Some(n) => Ok(n),
            None => match value.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 => Ok(f as u64),
                _ => Err(self.invalid("expected a non-negative integer".to_string())),
            },
        }
    }

    fn number(&self, value: &Value) -> Result<f64, SchemaError> {
        value
            .as_f64()
            .ok_or_else(|| self.invalid("expected a number".to_string()))
    }

    fn invalid(&self, reason: String) -> SchemaError {
        SchemaError::InvalidSchema {
            location: to_json_pointer(&self.path),
            reason,
        }
    }
}

fn kind_of(map: &Map<String, Value>) -> Result<SchemaKind, SchemaError> {
    match map.get("type") {
        Some(Value::String(s)) => Ok(SchemaKind::for_type(s.parse()?)),
        Some(Value::Array(items)) if items.len() == 1 => match &items[0] {
            Value::String(s) => Ok(SchemaKind::for_type(s.parse()?)),
            _ => Ok(SchemaKind::Any),
        },
        Some(_) => Ok(SchemaKind::Any),
        None if map.contains_key("anyOf") || map.contains_key("oneOf") => Ok(SchemaKind::Union),
        None => Ok(SchemaKind::Any),
    }
}

/// Properties not named in `required` are optional.
fn mark_optional(schema: &mut Schema, id: SchemaId) {
    let node = schema.node(id);
    let required: Vec<String> = node
        .keywords()
        .iter()
        .find_map(|k| match k {
            Keyword::Required(keys) => Some(keys.clone()),
            _ => None,
        })
        .unwrap_or_default();
    let optional: Vec<SchemaId> = node
        .properties()
        .iter()
        .filter(|(key, _)| !required.contains(key))
        .map(|(_, p)| *p)
        .collect();
    for p in optional {
        schema.node_mut(p).optional = true;
    }
}
