//! # Schema Nodes
//!
//! A schema tree is stored as an arena of [`SchemaNode`]s addressed by
//! [`SchemaId`]. Each node carries a sealed [`SchemaKind`] that selects its
//! coercion and template behavior, an ordered list of [`Keyword`]s, an
//! `optional` flag, and optional behavior hooks.
//!
//! ## Keyword Order
//!
//! Keywords are kept in declaration order. Validation evaluates them in that
//! order and serialization emits them in that order, so a node built as
//! `{type, minLength, pattern}` reports a `type` failure before a
//! `minLength` failure and serializes back with the same key order.

use std::fmt;

use regex::Regex;
use serde_json::Value;

use jsonv_core::{InstanceType, PathSegment, SchemaError};

use crate::hooks::Hooks;

/// Address of a node inside a [`crate::Schema`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(pub(crate) usize);

impl SchemaId {
    /// Position of the node in its arena.
    pub fn index(&self) -> usize {
        self.0
    }

    pub(crate) fn offset(self, by: usize) -> Self {
        Self(self.0 + by)
    }
}

/// The variant of a schema node.
///
/// The set is closed: every kind the engine knows how to coerce and
/// template is listed here.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    /// No `type`, or several types. Validates by keywords only.
    Any,
    String,
    Number,
    Integer,
    Boolean,
    Null,
    Object,
    Array,
    /// `anyOf`/`oneOf` composition with no `type`.
    Union,
    /// The boolean schemas `true` (accept everything) and `false`
    /// (reject everything).
    Bool(bool),
    /// A self-reference created by [`crate::Schema::recursive`].
    Link(SchemaId),
    /// Unpatched self-reference. Only exists while a recursive schema is
    /// being built.
    Hole(u64),
}

impl SchemaKind {
    /// The kind implied by a single declared instance type.
    pub fn for_type(t: InstanceType) -> Self {
        match t {
            InstanceType::String => Self::String,
            InstanceType::Number => Self::Number,
            InstanceType::Integer => Self::Integer,
            InstanceType::Boolean => Self::Boolean,
            InstanceType::Object => Self::Object,
            InstanceType::Array => Self::Array,
            InstanceType::Null => Self::Null,
        }
    }

    /// Short label used in logs and walker output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Object => "object",
            Self::Array => "array",
            Self::Union => "union",
            Self::Bool(true) => "true",
            Self::Bool(false) => "false",
            Self::Link(_) | Self::Hole(_) => "link",
        }
    }
}

/// A compiled regular expression that remembers its source text.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `source`.
    pub fn new(source: &str) -> Result<Self, SchemaError> {
        let regex = Regex::new(source).map_err(|e| SchemaError::InvalidPattern {
            pattern: source.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Unanchored search, as JSON Schema requires.
    pub fn is_match(&self, s: &str) -> bool {
        self.regex.is_match(s)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({:?})", self.source)
    }
}

/// One keyword of a schema node.
///
/// Subschema-bearing keywords hold [`SchemaId`]s into the owning arena.
#[derive(Debug, Clone, PartialEq)]
pub enum Keyword {
    Type(Vec<InstanceType>),
    Const(Value),
    Enum(Vec<Value>),
    Default(Value),

    AllOf(Vec<SchemaId>),
    AnyOf(Vec<SchemaId>),
    OneOf(Vec<SchemaId>),
    Not(SchemaId),
    If(SchemaId),
    Then(SchemaId),
    Else(SchemaId),

    MinLength(u64),
    MaxLength(u64),
    Pattern(Pattern),
    Format(String),

    Minimum(f64),
    Maximum(f64),
    ExclusiveMinimum(f64),
    ExclusiveMaximum(f64),
    MultipleOf(f64),

    Properties(Vec<(String, SchemaId)>),
    Required(Vec<String>),
    AdditionalProperties(SchemaId),
    PatternProperties(Vec<(Pattern, SchemaId)>),
    PropertyNames(SchemaId),
    MinProperties(u64),
    MaxProperties(u64),
    DependentRequired(Vec<(String, Vec<String>)>),
    DependentSchemas(Vec<(String, SchemaId)>),

    Items(SchemaId),
    PrefixItems(Vec<SchemaId>),
    MinItems(u64),
    MaxItems(u64),
    UniqueItems(bool),
    Contains(SchemaId),
    MinContains(u64),
    MaxContains(u64),

    Ref(String),
    Id(String),
    Defs(Vec<(String, SchemaId)>),

    /// `title`, `description`, `examples`, and any keyword the engine does
    /// not interpret. Carried through serialization untouched.
    Annotation(String, Value),
}

impl Keyword {
    /// The keyword's JSON spelling.
    pub fn name(&self) -> &str {
        match self {
            Self::Type(_) => "type",
            Self::Const(_) => "const",
            Self::Enum(_) => "enum",
            Self::Default(_) => "default",
            Self::AllOf(_) => "allOf",
            Self::AnyOf(_) => "anyOf",
            Self::OneOf(_) => "oneOf",
            Self::Not(_) => "not",
            Self::If(_) => "if",
            Self::Then(_) => "then",
            Self::Else(_) => "else",
            Self::MinLength(_) => "minLength",
            Self::MaxLength(_) => "maxLength",
            Self::Pattern(_) => "pattern",
            Self::Format(_) => "format",
            Self::Minimum(_) => "minimum",
            Self::Maximum(_) => "maximum",
            Self::ExclusiveMinimum(_) => "exclusiveMinimum",
            Self::ExclusiveMaximum(_) => "exclusiveMaximum",
            Self::MultipleOf(_) => "multipleOf",
            Self::Properties(_) => "properties",
            Self::Required(_) => "required",
            Self::AdditionalProperties(_) => "additionalProperties",
            Self::PatternProperties(_) => "patternProperties",
            Self::PropertyNames(_) => "propertyNames",
            Self::MinProperties(_) => "minProperties",
            Self::MaxProperties(_) => "maxProperties",
            Self::DependentRequired(_) => "dependentRequired",
            Self::DependentSchemas(_) => "dependentSchemas",
            Self::Items(_) => "items",
            Self::PrefixItems(_) => "prefixItems",
            Self::MinItems(_) => "minItems",
            Self::MaxItems(_) => "maxItems",
            Self::UniqueItems(_) => "uniqueItems",
            Self::Contains(_) => "contains",
            Self::MinContains(_) => "minContains",
            Self::MaxContains(_) => "maxContains",
            Self::Ref(_) => "$ref",
            Self::Id(_) => "$id",
            Self::Defs(_) => "$defs",
            Self::Annotation(name, _) => name,
        }
    }

    /// Subschemas held by this keyword, each with the path segments that
    /// address it relative to the owning node (`["properties", "name"]`,
    /// `["anyOf", 1]`, `["items"]`).
    pub fn subschemas(&self) -> Vec<(Vec<PathSegment>, SchemaId)> {
        let name = PathSegment::from(self.name());
        match self {
            Self::Not(id)
            | Self::If(id)
            | Self::Then(id)
            | Self::Else(id)
            | Self::AdditionalProperties(id)
            | Self::PropertyNames(id)
            | Self::Items(id)
            | Self::Contains(id) => vec![(vec![name], *id)],
            Self::AllOf(ids) | Self::AnyOf(ids) | Self::OneOf(ids) | Self::PrefixItems(ids) => ids
                .iter()
                .enumerate()
                .map(|(i, id)| (vec![name.clone(), PathSegment::Index(i)], *id))
                .collect(),
            Self::Properties(entries) | Self::DependentSchemas(entries) | Self::Defs(entries) => {
                entries
                    .iter()
                    .map(|(key, id)| (vec![name.clone(), PathSegment::from(key.as_str())], *id))
                    .collect()
            }
            Self::PatternProperties(entries) => entries
                .iter()
                .map(|(p, id)| (vec![name.clone(), PathSegment::from(p.as_str())], *id))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Rewrite every held [`SchemaId`] through `f`.
    pub(crate) fn remap(&mut self, f: impl Fn(SchemaId) -> SchemaId) {
        match self {
            Self::Not(id)
            | Self::If(id)
            | Self::Then(id)
            | Self::Else(id)
            | Self::AdditionalProperties(id)
            | Self::PropertyNames(id)
            | Self::Items(id)
            | Self::Contains(id) => *id = f(*id),
            Self::AllOf(ids) | Self::AnyOf(ids) | Self::OneOf(ids) | Self::PrefixItems(ids) => {
                ids.iter_mut().for_each(|id| *id = f(*id));
            }
            Self::Properties(entries) | Self::DependentSchemas(entries) | Self::Defs(entries) => {
                entries.iter_mut().for_each(|(_, id)| *id = f(*id));
            }
            Self::PatternProperties(entries) => {
                entries.iter_mut().for_each(|(_, id)| *id = f(*id));
            }
            _ => {}
        }
    }
}

/// One node of a schema arena.
#[derive(Debug, Clone)]
pub struct SchemaNode {
    pub(crate) kind: SchemaKind,
    pub(crate) keywords: Vec<Keyword>,
    pub(crate) optional: bool,
    pub(crate) hooks: Hooks,
}

impl SchemaNode {
    pub(crate) fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            keywords: Vec::new(),
            optional: false,
            hooks: Hooks::default(),
        }
    }

    /// A node of the given kind carrying its `type` keyword.
    pub(crate) fn typed(t: InstanceType) -> Self {
        let mut node = Self::new(SchemaKind::for_type(t));
        node.keywords.push(Keyword::Type(vec![t]));
        node
    }

    pub fn kind(&self) -> &SchemaKind {
        &self.kind
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// First keyword with the given JSON spelling.
    pub fn keyword(&self, name: &str) -> Option<&Keyword> {
        self.keywords.iter().find(|k| k.name() == name)
    }

    /// Replace the keyword with the same spelling in place, or append it.
    pub(crate) fn set_keyword(&mut self, keyword: Keyword) {
        match self.keywords.iter_mut().find(|k| k.name() == keyword.name()) {
            Some(slot) => *slot = keyword,
            None => self.keywords.push(keyword),
        }
    }

    pub(crate) fn remove_keyword(&mut self, name: &str) {
        self.keywords.retain(|k| k.name() != name);
    }

    pub fn properties(&self) -> &[(String, SchemaId)] {
        self.keywords
            .iter()
            .find_map(|k| match k {
                Keyword::Properties(entries) => Some(entries.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn additional_properties(&self) -> Option<SchemaId> {
        self.keywords.iter().find_map(|k| match k {
            Keyword::AdditionalProperties(id) => Some(*id),
            _ => None,
        })
    }

    pub fn items(&self) -> Option<SchemaId> {
        self.keywords.iter().find_map(|k| match k {
            Keyword::Items(id) => Some(*id),
            _ => None,
        })
    }

    pub fn prefix_items(&self) -> &[SchemaId] {
        self.keywords
            .iter()
            .find_map(|k| match k {
                Keyword::PrefixItems(ids) => Some(ids.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn const_value(&self) -> Option<&Value> {
        self.keywords.iter().find_map(|k| match k {
            Keyword::Const(v) => Some(v),
            _ => None,
        })
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.keywords.iter().find_map(|k| match k {
            Keyword::Default(v) => Some(v),
            _ => None,
        })
    }

    pub fn enum_values(&self) -> Option<&[Value]> {
        self.keywords.iter().find_map(|k| match k {
            Keyword::Enum(v) => Some(v.as_slice()),
            _ => None,
        })
    }

    pub fn reference(&self) -> Option<&str> {
        self.keywords.iter().find_map(|k| match k {
            Keyword::Ref(r) => Some(r.as_str()),
            _ => None,
        })
    }

    pub fn id(&self) -> Option<&str> {
        self.keywords.iter().find_map(|k| match k {
            Keyword::Id(r) => Some(r.as_str()),
            _ => None,
        })
    }

    pub(crate) fn remap(&mut self, f: impl Fn(SchemaId) -> SchemaId + Copy) {
        for keyword in &mut self.keywords {
            keyword.remap(f);
        }
        if let SchemaKind::Link(target) = &mut self.kind {
            *target = f(*target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_rejects_invalid_regex() {
        let err = Pattern::new("^(abc]").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPattern { .. }));
    }

    #[test]
    fn test_pattern_is_unanchored() {
        let p = Pattern::new("b+").unwrap();
        assert!(p.is_match("abbbc"));
        assert!(!p.is_match("ac"));
        assert_eq!(p.as_str(), "b+");
    }

    #[test]
    fn test_set_keyword_replaces_in_place() {
        let mut node = SchemaNode::typed(InstanceType::String);
        node.set_keyword(Keyword::MinLength(1));
        node.set_keyword(Keyword::MaxLength(5));
        node.set_keyword(Keyword::MinLength(2));
        let names: Vec<&str> = node.keywords().iter().map(|k| k.name()).collect();
        assert_eq!(names, ["type", "minLength", "maxLength"]);
        assert_eq!(node.keyword("minLength"), Some(&Keyword::MinLength(2)));
    }

    #[test]
    fn test_subschema_paths() {
        let kw = Keyword::AnyOf(vec![SchemaId(3), SchemaId(4)]);
        let subs = kw.subschemas();
        assert_eq!(subs[1].0, vec![PathSegment::from("anyOf"), PathSegment::Index(1)]);
        assert_eq!(subs[1].1, SchemaId(4));

        let kw = Keyword::Properties(vec![("name".into(), SchemaId(1))]);
        assert_eq!(
            kw.subschemas()[0].0,
            vec![PathSegment::from("properties"), PathSegment::from("name")]
        );
    }

    #[test]
    fn test_remap_offsets_ids() {
        let mut node = SchemaNode::new(SchemaKind::Link(SchemaId(0)));
        node.keywords.push(Keyword::Items(SchemaId(2)));
        node.remap(|id| id.offset(10));
        assert_eq!(node.items(), Some(SchemaId(12)));
        assert_eq!(node.kind(), &SchemaKind::Link(SchemaId(10)));
    }
}
