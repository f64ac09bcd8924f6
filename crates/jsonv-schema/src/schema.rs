//! # Schema Trees
//!
//! [`Schema`] owns an arena of nodes plus the id of its root. Builders
//! compose schemas by splicing child arenas into the parent, so a parent
//! exclusively owns its children and no reference counting is involved.
//!
//! Self-referential schemas are built with [`Schema::recursive`]: the
//! closure receives a placeholder node, embeds it wherever the recursion
//! occurs, and every placeholder is patched into a [`SchemaKind::Link`] to
//! the finished root once the closure returns.
//!
//! ## Mutators
//!
//! Only [`Schema::make_strict`] and [`Schema::make_partial`] change an
//! existing tree. Both require an object root and recompute `required`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use jsonv_core::{number_value, InstanceType, PathSegment, SchemaError};

use crate::hooks::{CoerceHook, Constant, Hooks, TemplateHook, ValidateHook};
use crate::node::{Keyword, Pattern, SchemaId, SchemaKind, SchemaNode};
use crate::resolver::{Resolver, MAX_REF_DEPTH};

static NEXT_HOLE: AtomicU64 = AtomicU64::new(1);

/// A schema tree.
///
/// Cloning is a deep copy of the arena; hooks are shared.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) nodes: Vec<SchemaNode>,
    pub(crate) root: SchemaId,
    resolver: OnceLock<Resolver>,
}

impl Schema {
    pub(crate) fn from_node(node: SchemaNode) -> Self {
        Self {
            nodes: vec![node],
            root: SchemaId(0),
            resolver: OnceLock::new(),
        }
    }

    fn typed(t: InstanceType) -> Self {
        Self::from_node(SchemaNode::typed(t))
    }

    // -- Builders --------------------------------------------------------

    pub fn string() -> Self {
        Self::typed(InstanceType::String)
    }

    pub fn number() -> Self {
        Self::typed(InstanceType::Number)
    }

    pub fn integer() -> Self {
        Self::typed(InstanceType::Integer)
    }

    pub fn boolean() -> Self {
        Self::typed(InstanceType::Boolean)
    }

    pub fn null() -> Self {
        Self::typed(InstanceType::Null)
    }

    /// A schema with no `type`: accepts any value its keywords accept.
    pub fn any() -> Self {
        Self::from_node(SchemaNode::new(SchemaKind::Any))
    }

    /// The boolean schema `true`.
    pub fn always() -> Self {
        Self::from_node(SchemaNode::new(SchemaKind::Bool(true)))
    }

    /// The boolean schema `false`.
    pub fn never() -> Self {
        Self::from_node(SchemaNode::new(SchemaKind::Bool(false)))
    }

    /// An object schema. `required` lists every property whose schema is
    /// not optional, in declaration order.
    pub fn object<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        let mut schema = Self::typed(InstanceType::Object);
        let entries: Vec<(String, SchemaId)> = properties
            .into_iter()
            .map(|(key, child)| (key.into(), schema.adopt(child)))
            .collect();
        let root = schema.root;
        schema.node_mut(root).keywords.push(Keyword::Properties(entries));
        schema.sync_required(root);
        schema
    }

    /// An object schema that rejects undeclared properties.
    pub fn strict_object<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        let mut schema = Self::object(properties);
        schema.close(schema.root);
        schema
    }

    /// An object schema whose properties are all optional.
    pub fn partial_object<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        let mut schema = Self::object(properties);
        schema.open(schema.root);
        schema
    }

    pub fn array(items: Schema) -> Self {
        Self::typed(InstanceType::Array).items(items)
    }

    /// `anyOf` composition. Coercion leaves union values untouched.
    pub fn any_of(branches: Vec<Schema>) -> Self {
        Self::composite(SchemaKind::Union, branches, Keyword::AnyOf)
    }

    /// `oneOf` composition.
    pub fn one_of(branches: Vec<Schema>) -> Self {
        Self::composite(SchemaKind::Union, branches, Keyword::OneOf)
    }

    pub fn all_of(parts: Vec<Schema>) -> Self {
        Self::composite(SchemaKind::Any, parts, Keyword::AllOf)
    }

    pub fn not(negated: Schema) -> Self {
        let mut schema = Self::any();
        let id = schema.adopt(negated);
        schema.root_node_mut().keywords.push(Keyword::Not(id));
        schema
    }

    fn composite(kind: SchemaKind, parts: Vec<Schema>, keyword: fn(Vec<SchemaId>) -> Keyword) -> Self {
        let mut schema = Self::from_node(SchemaNode::new(kind));
        let ids = parts.into_iter().map(|p| schema.adopt(p)).collect();
        schema.root_node_mut().keywords.push(keyword(ids));
        schema
    }

    /// A `const` leaf with no `type`.
    pub fn literal(value: Value) -> Self {
        Self::any().const_value(value)
    }

    /// A read-only string constant. Coercion always produces the constant
    /// and templates default to it.
    pub fn string_const(value: &str) -> Self {
        Self::string()
            .const_value(Value::from(value))
            .default_value(Value::from(value))
            .annotation("readOnly", Value::Bool(true))
            .coerce_hook(Constant(Value::from(value)))
    }

    /// A bare `$ref`.
    pub fn reference(pointer: &str) -> Self {
        Self::any().with_keyword(Keyword::Ref(pointer.to_string()))
    }

    /// Build a schema that contains itself.
    ///
    /// ```
    /// use jsonv_schema::Schema;
    ///
    /// let tree = Schema::recursive(|this| {
    ///     Schema::object([("name", Schema::string()), ("children", Schema::array(this))])
    /// });
    /// let data = serde_json::json!({"name": "a", "children": [{"name": "b", "children": []}]});
    /// assert!(tree.validate(&data).unwrap().valid);
    /// ```
    pub fn recursive(build: impl FnOnce(Schema) -> Schema) -> Self {
        let token = NEXT_HOLE.fetch_add(1, Ordering::Relaxed);
        let mut schema = build(Self::from_node(SchemaNode::new(SchemaKind::Hole(token))));
        let root = schema.root;
        // A closure that returns its argument unchanged describes nothing.
        let patched = if schema.node(root).kind == SchemaKind::Hole(token) {
            SchemaKind::Any
        } else {
            SchemaKind::Link(root)
        };
        for node in &mut schema.nodes {
            if node.kind == SchemaKind::Hole(token) {
                node.kind = patched.clone();
            }
        }
        schema.invalidate();
        schema
    }

    // -- Keyword setters -------------------------------------------------

    /// Set a keyword on the root, replacing one with the same name.
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.root_node_mut().set_keyword(keyword);
        self
    }

    fn with_child(mut self, child: Schema, keyword: fn(SchemaId) -> Keyword) -> Self {
        let id = self.adopt(child);
        self.with_keyword(keyword(id))
    }

    fn with_children(mut self, children: Vec<Schema>, keyword: fn(Vec<SchemaId>) -> Keyword) -> Self {
        let ids = children.into_iter().map(|c| self.adopt(c)).collect();
        self.with_keyword(keyword(ids))
    }

    pub fn const_value(self, value: Value) -> Self {
        self.with_keyword(Keyword::Const(value))
    }

    pub fn enum_values(self, values: Vec<Value>) -> Self {
        self.with_keyword(Keyword::Enum(values))
    }

    pub fn default_value(self, value: Value) -> Self {
        self.with_keyword(Keyword::Default(value))
    }

    pub fn title(self, title: &str) -> Self {
        self.annotation("title", Value::from(title))
    }

    pub fn description(self, description: &str) -> Self {
        self.annotation("description", Value::from(description))
    }

    /// Attach a keyword the engine carries but does not interpret.
    pub fn annotation(self, name: &str, value: Value) -> Self {
        self.with_keyword(Keyword::Annotation(name.to_string(), value))
    }

    pub fn id(self, id: &str) -> Self {
        self.with_keyword(Keyword::Id(id.to_string()))
    }

    pub fn min_length(self, n: u64) -> Self {
        self.with_keyword(Keyword::MinLength(n))
    }

    pub fn max_length(self, n: u64) -> Self {
        self.with_keyword(Keyword::MaxLength(n))
    }

    pub fn pattern(self, pattern: &str) -> Result<Self, SchemaError> {
        Ok(self.with_keyword(Keyword::Pattern(Pattern::new(pattern)?)))
    }

    pub fn format(self, format: &str) -> Self {
        self.with_keyword(Keyword::Format(format.to_string()))
    }

    pub fn minimum(self, n: f64) -> Self {
        self.with_keyword(Keyword::Minimum(n))
    }

    pub fn maximum(self, n: f64) -> Self {
        self.with_keyword(Keyword::Maximum(n))
    }

    pub fn exclusive_minimum(self, n: f64) -> Self {
        self.with_keyword(Keyword::ExclusiveMinimum(n))
    }

    pub fn exclusive_maximum(self, n: f64) -> Self {
        self.with_keyword(Keyword::ExclusiveMaximum(n))
    }

    pub fn multiple_of(self, n: f64) -> Self {
        self.with_keyword(Keyword::MultipleOf(n))
    }

    pub fn items(self, items: Schema) -> Self {
        self.with_child(items, Keyword::Items)
    }

    pub fn prefix_items(self, prefix: Vec<Schema>) -> Self {
        self.with_children(prefix, Keyword::PrefixItems)
    }

    pub fn min_items(self, n: u64) -> Self {
        self.with_keyword(Keyword::MinItems(n))
    }

    pub fn max_items(self, n: u64) -> Self {
        self.with_keyword(Keyword::MaxItems(n))
    }

    pub fn unique_items(self, unique: bool) -> Self {
        self.with_keyword(Keyword::UniqueItems(unique))
    }

    pub fn contains(self, contains: Schema) -> Self {
        self.with_child(contains, Keyword::Contains)
    }

    pub fn min_contains(self, n: u64) -> Self {
        self.with_keyword(Keyword::MinContains(n))
    }

    pub fn max_contains(self, n: u64) -> Self {
        self.with_keyword(Keyword::MaxContains(n))
    }

    pub fn min_properties(self, n: u64) -> Self {
        self.with_keyword(Keyword::MinProperties(n))
    }

    pub fn max_properties(self, n: u64) -> Self {
        self.with_keyword(Keyword::MaxProperties(n))
    }

    pub fn additional_properties(self, schema: Schema) -> Self {
        self.with_child(schema, Keyword::AdditionalProperties)
    }

    pub fn property_names(self, schema: Schema) -> Self {
        self.with_child(schema, Keyword::PropertyNames)
    }

    pub fn pattern_properties<'a>(
        mut self,
        entries: impl IntoIterator<Item = (&'a str, Schema)>,
    ) -> Result<Self, SchemaError> {
        let mut compiled = Vec::new();
        for (source, child) in entries {
            let pattern = Pattern::new(source)?;
            compiled.push((pattern, self.adopt(child)));
        }
        Ok(self.with_keyword(Keyword::PatternProperties(compiled)))
    }

    pub fn dependent_required<'a>(
        self,
        entries: impl IntoIterator<Item = (&'a str, Vec<&'a str>)>,
    ) -> Self {
        let entries = entries
            .into_iter()
            .map(|(key, deps)| (key.to_string(), deps.into_iter().map(String::from).collect()))
            .collect();
        self.with_keyword(Keyword::DependentRequired(entries))
    }

    pub fn dependent_schemas<'a>(mut self, entries: impl IntoIterator<Item = (&'a str, Schema)>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(key, child)| (key.to_string(), self.adopt(child)))
            .collect();
        self.with_keyword(Keyword::DependentSchemas(entries))
    }

    /// `if`/`then`/`else`. Either branch may be omitted.
    pub fn if_then_else(mut self, condition: Schema, then: Option<Schema>, otherwise: Option<Schema>) -> Self {
        let id = self.adopt(condition);
        self.root_node_mut().set_keyword(Keyword::If(id));
        if let Some(then) = then {
            self = self.with_child(then, Keyword::Then);
        }
        if let Some(otherwise) = otherwise {
            self = self.with_child(otherwise, Keyword::Else);
        }
        self
    }

    pub fn validate_hook(mut self, hook: impl ValidateHook + 'static) -> Self {
        self.root_node_mut().hooks.validate = Some(std::sync::Arc::new(hook));
        self
    }

    pub fn coerce_hook(mut self, hook: impl CoerceHook + 'static) -> Self {
        self.root_node_mut().hooks.coerce = Some(std::sync::Arc::new(hook));
        self
    }

    pub fn template_hook(mut self, hook: impl TemplateHook + 'static) -> Self {
        self.root_node_mut().hooks.template = Some(std::sync::Arc::new(hook));
        self
    }

    // -- Optional / strict / partial ---------------------------------------

    /// Mark this schema as omissible when used as an object property.
    pub fn optional(mut self) -> Self {
        self.root_node_mut().optional = true;
        self
    }

    pub fn is_optional(&self) -> bool {
        self.root_node().optional
    }

    /// Reject undeclared properties. Optional properties stay optional.
    pub fn make_strict(&mut self) -> Result<&mut Self, SchemaError> {
        self.expect_object("strict")?;
        self.close(self.root);
        Ok(self)
    }

    /// Make every declared property optional and drop `required`.
    pub fn make_partial(&mut self) -> Result<&mut Self, SchemaError> {
        self.expect_object("partial")?;
        self.open(self.root);
        Ok(self)
    }

    pub fn strict(mut self) -> Result<Self, SchemaError> {
        self.make_strict()?;
        Ok(self)
    }

    pub fn partial(mut self) -> Result<Self, SchemaError> {
        self.make_partial()?;
        Ok(self)
    }

    fn expect_object(&self, operation: &'static str) -> Result<(), SchemaError> {
        match self.root_node().kind {
            SchemaKind::Object => Ok(()),
            _ => Err(SchemaError::NotAnObject(operation)),
        }
    }

    fn close(&mut self, id: SchemaId) {
        self.sync_required(id);
        let closed = self
            .node(id)
            .additional_properties()
            .is_some_and(|ap| self.node(ap).kind == SchemaKind::Bool(false));
        if closed {
            return;
        }
        self.nodes.push(SchemaNode::new(SchemaKind::Bool(false)));
        let never = SchemaId(self.nodes.len() - 1);
        self.node_mut(id).set_keyword(Keyword::AdditionalProperties(never));
    }

    fn open(&mut self, id: SchemaId) {
        let props: Vec<SchemaId> = self.node(id).properties().iter().map(|(_, p)| *p).collect();
        for p in props {
            self.node_mut(p).optional = true;
        }
        self.sync_required(id);
    }

    /// Recompute `required` from the optional flags of the properties.
    pub(crate) fn sync_required(&mut self, id: SchemaId) {
        let required: Vec<String> = self
            .node(id)
            .properties()
            .iter()
            .filter(|(_, p)| !self.node(*p).optional)
            .map(|(key, _)| key.clone())
            .collect();
        let node = self.node_mut(id);
        if required.is_empty() {
            node.remove_keyword("required");
        } else {
            node.set_keyword(Keyword::Required(required));
        }
    }

    // -- Arena access ------------------------------------------------------

    pub fn root(&self) -> SchemaId {
        self.root
    }

    pub fn node(&self, id: SchemaId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: SchemaId) -> &mut SchemaNode {
        self.invalidate();
        &mut self.nodes[id.0]
    }

    pub fn root_node(&self) -> &SchemaNode {
        self.node(self.root)
    }

    fn root_node_mut(&mut self) -> &mut SchemaNode {
        let root = self.root;
        self.node_mut(root)
    }

    pub fn kind(&self) -> &SchemaKind {
        &self.root_node().kind
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// A borrowed view of the root node.
    pub fn view(&self) -> SchemaRef<'_> {
        self.at(self.root)
    }

    /// A borrowed view of any node in the arena.
    pub fn at(&self, id: SchemaId) -> SchemaRef<'_> {
        SchemaRef { schema: self, id }
    }

    /// Move `child`'s nodes into this arena and return its new root id.
    pub(crate) fn adopt(&mut self, child: Schema) -> SchemaId {
        let base = self.nodes.len();
        let root = child.root.offset(base);
        for mut node in child.nodes {
            node.remap(move |id| id.offset(base));
            self.nodes.push(node);
        }
        self.invalidate();
        root
    }

    fn invalidate(&mut self) {
        self.resolver = OnceLock::new();
    }

    /// The `$ref` index of this tree, built on first use.
    pub fn resolver(&self) -> &Resolver {
        self.resolver.get_or_init(|| Resolver::index(self))
    }

    /// Follow self-reference links, counting each hop against `depth`.
    pub(crate) fn follow(&self, mut id: SchemaId, depth: &mut usize) -> Result<SchemaId, SchemaError> {
        while let SchemaKind::Link(target) = self.node(id).kind {
            *depth += 1;
            if *depth > MAX_REF_DEPTH {
                return Err(SchemaError::RecursionLimit(MAX_REF_DEPTH));
            }
            id = target;
        }
        Ok(id)
    }

    // -- Children ----------------------------------------------------------

    /// Structural children of the root node.
    pub fn children(&self) -> Vec<Child<'_>> {
        self.view().children()
    }

    // -- Serialization -----------------------------------------------------

    /// Serialize back to a JSON-Schema document.
    ///
    /// Keywords appear in declaration order. Boolean schemas serialize to
    /// `true`/`false`; self-references serialize as `{"$ref": <pointer>}`.
    pub fn to_json(&self) -> Value {
        self.node_json(self.root)
    }

    pub(crate) fn node_json(&self, id: SchemaId) -> Value {
        let node = self.node(id);
        match node.kind {
            SchemaKind::Bool(b) => return Value::Bool(b),
            SchemaKind::Link(target) => {
                let pointer = self.resolver().pointer_of(target).unwrap_or("#");
                let mut map = Map::new();
                map.insert("$ref".to_string(), Value::from(pointer));
                return Value::Object(map);
            }
            _ => {}
        }
        let mut map = Map::new();
        for keyword in &node.keywords {
            map.insert(keyword.name().to_string(), self.keyword_json(keyword));
        }
        Value::Object(map)
    }

    fn keyword_json(&self, keyword: &Keyword) -> Value {
        let number = |n: f64| number_value(n).unwrap_or(Value::Null);
        let schemas = |ids: &[SchemaId]| Value::Array(ids.iter().map(|id| self.node_json(*id)).collect());
        let keyed = |entries: &[(String, SchemaId)]| {
            Value::Object(
                entries
                    .iter()
                    .map(|(key, id)| (key.clone(), self.node_json(*id)))
                    .collect(),
            )
        };
        match keyword {
            Keyword::Type(types) => match types.as_slice() {
                [single] => Value::from(single.as_str()),
                many => many.iter().map(|t| Value::from(t.as_str())).collect(),
            },
            Keyword::Const(v) | Keyword::Default(v) | Keyword::Annotation(_, v) => v.clone(),
            Keyword::Enum(values) => Value::Array(values.clone()),
            Keyword::AllOf(ids) | Keyword::AnyOf(ids) | Keyword::OneOf(ids) | Keyword::PrefixItems(ids) => {
                schemas(ids.as_slice())
            }
            Keyword::Not(id)
            | Keyword::If(id)
            | Keyword::Then(id)
            | Keyword::Else(id)
            | Keyword::AdditionalProperties(id)
            | Keyword::PropertyNames(id)
            | Keyword::Items(id)
            | Keyword::Contains(id) => self.node_json(*id),
            Keyword::MinLength(n)
            | Keyword::MaxLength(n)
            | Keyword::MinProperties(n)
            | Keyword::MaxProperties(n)
            | Keyword::MinItems(n)
            | Keyword::MaxItems(n)
            | Keyword::MinContains(n)
            | Keyword::MaxContains(n) => Value::from(*n),
            Keyword::Minimum(n)
            | Keyword::Maximum(n)
            | Keyword::ExclusiveMinimum(n)
            | Keyword::ExclusiveMaximum(n)
            | Keyword::MultipleOf(n) => number(*n),
            Keyword::Pattern(p) => Value::from(p.as_str()),
            Keyword::Format(s) | Keyword::Ref(s) | Keyword::Id(s) => Value::from(s.as_str()),
            Keyword::UniqueItems(b) => Value::Bool(*b),
            Keyword::Required(keys) => keys.iter().map(|k| Value::from(k.as_str())).collect(),
            Keyword::Properties(entries) | Keyword::DependentSchemas(entries) | Keyword::Defs(entries) => {
                keyed(entries.as_slice())
            }
            Keyword::PatternProperties(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(p, id)| (p.as_str().to_string(), self.node_json(*id)))
                    .collect(),
            ),
            Keyword::DependentRequired(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, deps)| {
                        (key.clone(), deps.iter().map(|d| Value::from(d.as_str())).collect())
                    })
                    .collect(),
            ),
        }
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Schema::from_json(&value).map_err(serde::de::Error::custom)
    }
}

/// A borrowed handle to one node of a [`Schema`].
///
/// Validation through a `SchemaRef` resolves `$ref`s against the whole
/// tree it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct SchemaRef<'s> {
    pub(crate) schema: &'s Schema,
    pub(crate) id: SchemaId,
}

impl<'s> SchemaRef<'s> {
    pub fn id(&self) -> SchemaId {
        self.id
    }

    /// The tree this node belongs to.
    pub fn tree(&self) -> &'s Schema {
        self.schema
    }

    pub fn node(&self) -> &'s SchemaNode {
        self.schema.node(self.id)
    }

    pub fn kind(&self) -> &'s SchemaKind {
        &self.node().kind
    }

    pub fn is_optional(&self) -> bool {
        self.node().optional
    }

    pub fn to_json(&self) -> Value {
        self.schema.node_json(self.id)
    }

    /// Structural children: one per property of an object, one per
    /// `prefixItems` slot and one for `items` of an array. Unions,
    /// `allOf`, `not` and self-references have none.
    ///
    /// The `items` child is placed at the first index not covered by
    /// `prefixItems`.
    pub fn children(&self) -> Vec<Child<'s>> {
        self.children_for(None)
    }

    /// Like [`SchemaRef::children`], but when `data` is an array the
    /// `items` schema yields one child per element past the prefix.
    pub fn children_for(&self, data: Option<&Value>) -> Vec<Child<'s>> {
        let node = self.node();
        let child = |id: SchemaId, keyword_path: Vec<PathSegment>, instance: PathSegment| Child {
            schema: self.schema.at(id),
            instance_path: vec![instance],
            keyword_path,
        };
        match node.kind {
            SchemaKind::Object => node
                .properties()
                .iter()
                .map(|(key, id)| {
                    child(
                        *id,
                        vec!["properties".into(), key.as_str().into()],
                        key.as_str().into(),
                    )
                })
                .collect(),
            SchemaKind::Array => {
                let prefix = node.prefix_items();
                let mut out: Vec<Child<'s>> = prefix
                    .iter()
                    .enumerate()
                    .map(|(i, id)| child(*id, vec!["prefixItems".into(), i.into()], i.into()))
                    .collect();
                if let Some(items) = node.items() {
                    match data {
                        Some(Value::Array(elements)) => {
                            for i in prefix.len()..elements.len() {
                                out.push(child(items, vec!["items".into()], i.into()));
                            }
                        }
                        _ => out.push(child(items, vec!["items".into()], prefix.len().into())),
                    }
                }
                out
            }
            _ => Vec::new(),
        }
    }
}

/// A structural child with its path relative to the parent.
#[derive(Debug, Clone)]
pub struct Child<'s> {
    pub schema: SchemaRef<'s>,
    pub instance_path: Vec<PathSegment>,
    pub keyword_path: Vec<PathSegment>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn required_of(schema: &Schema) -> Option<Vec<String>> {
        schema.root_node().keywords().iter().find_map(|k| match k {
            Keyword::Required(keys) => Some(keys.clone()),
            _ => None,
        })
    }

    #[test]
    fn test_required_derivation() {
        let schema = Schema::object([
            ("name", Schema::string()),
            ("age", Schema::number().optional()),
            ("email", Schema::string()),
        ]);
        assert_eq!(required_of(&schema), Some(vec!["name".into(), "email".into()]));
    }

    #[test]
    fn test_required_absent_when_empty() {
        let schema = Schema::object([("a", Schema::string().optional())]);
        assert_eq!(required_of(&schema), None);
        assert_eq!(schema.to_json().get("required"), None);
    }

    #[test]
    fn test_partial_drops_required() {
        let schema = Schema::object([("a", Schema::string()), ("b", Schema::number())])
            .partial()
            .unwrap();
        assert_eq!(required_of(&schema), None);
        assert!(schema.root_node().properties().iter().all(|(_, id)| schema.node(*id).is_optional()));
    }

    #[test]
    fn test_strict_closes_and_keeps_optional() {
        let mut schema = Schema::object([("a", Schema::string()), ("b", Schema::string().optional())]);
        schema.make_strict().unwrap();
        assert_eq!(required_of(&schema), Some(vec!["a".into()]));
        assert_eq!(
            schema.to_json(),
            json!({
                "type": "object",
                "properties": {"a": {"type": "string"}, "b": {"type": "string"}},
                "required": ["a"],
                "additionalProperties": false
            })
        );
        assert!(schema.validate(&json!({"a": "x"})).unwrap().valid);
        assert!(!schema.validate(&json!({"a": "x", "c": 1})).unwrap().valid);
    }

    #[test]
    fn test_strict_twice_reuses_node() {
        let mut schema = Schema::object([("a", Schema::string())]);
        schema.make_strict().unwrap();
        let len = schema.len();
        schema.make_strict().unwrap();
        assert_eq!(schema.len(), len);
    }

    #[test]
    fn test_strict_twice_keeps_one_keyword() {
        let mut schema = Schema::object([("a", Schema::string())]);
        schema.make_strict().unwrap().make_strict().unwrap();
        let count = schema
            .root_node()
            .keywords()
            .iter()
            .filter(|k| k.name() == "additionalProperties")
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_strict_on_non_object_fails() {
        let mut schema = Schema::string();
        assert_eq!(schema.make_strict().unwrap_err(), SchemaError::NotAnObject("strict"));
        assert!(Schema::array(Schema::string()).partial().is_err());
    }

    #[test]
    fn test_to_json_keyword_order() {
        let schema = Schema::string().min_length(2).pattern("^a").unwrap().max_length(5);
        let json = schema.to_json();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["type", "minLength", "pattern", "maxLength"]);
    }

    #[test]
    fn test_boolean_schema_serializes_as_bool() {
        assert_eq!(Schema::always().to_json(), json!(true));
        assert_eq!(Schema::never().to_json(), json!(false));
    }

    #[test]
    fn test_numbers_serialize_as_integers_when_integral() {
        let schema = Schema::number().minimum(1.0).multiple_of(0.5);
        assert_eq!(schema.to_json(), json!({"type": "number", "minimum": 1, "multipleOf": 0.5}));
    }

    #[test]
    fn test_nested_splicing_keeps_children_apart() {
        let inner = Schema::object([("x", Schema::integer())]);
        let outer = Schema::object([("inner", inner), ("list", Schema::array(Schema::boolean()))]);
        assert_eq!(
            outer.to_json(),
            json!({
                "type": "object",
                "properties": {
                    "inner": {
                        "type": "object",
                        "properties": {"x": {"type": "integer"}},
                        "required": ["x"]
                    },
                    "list": {"type": "array", "items": {"type": "boolean"}}
                },
                "required": ["inner", "list"]
            })
        );
    }

    #[test]
    fn test_recursive_serializes_link_as_ref() {
        let tree = Schema::recursive(|this| Schema::object([("next", this.optional())]));
        assert_eq!(
            tree.to_json(),
            json!({
                "type": "object",
                "properties": {"next": {"$ref": "#"}}
            })
        );
    }

    #[test]
    fn test_recursive_nested_link_points_at_subtree() {
        let tree = Schema::recursive(|this| Schema::array(this));
        let outer = Schema::object([("tree", tree)]);
        assert_eq!(
            outer.to_json()["properties"]["tree"]["items"],
            json!({"$ref": "#/properties/tree"})
        );
    }

    #[test]
    fn test_recursive_identity_is_any() {
        let schema = Schema::recursive(|this| this);
        assert_eq!(schema.kind(), &SchemaKind::Any);
    }

    #[test]
    fn test_children_of_object() {
        let schema = Schema::object([("a", Schema::string()), ("b", Schema::number())]);
        let children = schema.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[1].instance_path, vec![PathSegment::from("b")]);
        assert_eq!(
            children[1].keyword_path,
            vec![PathSegment::from("properties"), PathSegment::from("b")]
        );
    }

    #[test]
    fn test_children_of_array() {
        let schema = Schema::array(Schema::string()).prefix_items(vec![Schema::number(), Schema::boolean()]);
        let children = schema.children();
        assert_eq!(children.len(), 3);
        assert_eq!(children[2].instance_path, vec![PathSegment::Index(2)]);
        assert_eq!(children[2].keyword_path, vec![PathSegment::from("items")]);

        let data = json!([1, true, "x", "y"]);
        assert_eq!(schema.view().children_for(Some(&data)).len(), 4);
    }

    #[test]
    fn test_unions_have_no_children() {
        let schema = Schema::any_of(vec![Schema::object([("a", Schema::string())]), Schema::string()]);
        assert!(schema.children().is_empty());
        assert!(Schema::not(Schema::string()).children().is_empty());
    }

    #[test]
    fn test_string_const() {
        let schema = Schema::string_const("ref/resource");
        assert_eq!(
            schema.to_json(),
            json!({"type": "string", "const": "ref/resource", "default": "ref/resource", "readOnly": true})
        );
    }

    #[test]
    fn test_serde_round_trip() {
        let schema = Schema::object([("a", Schema::string().min_length(1))]);
        let text = serde_json::to_string(&schema).unwrap();
        let back: Schema = serde_json::from_str(&text).unwrap();
        assert_eq!(back.to_json(), schema.to_json());
    }
}
