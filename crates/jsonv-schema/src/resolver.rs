//! # `$ref` Resolution
//!
//! Each schema tree lazily builds one [`Resolver`]: an index from JSON
//! pointer (`#/properties/name`) and `$id` to node ids. The index is
//! computed on first use, memoized on the tree, and discarded whenever the
//! tree is mutated.
//!
//! ## Supported references
//!
//! - `#` and the empty string: the root.
//! - `#/<pointer>`: a keyword path from the root, e.g. `#/items`,
//!   `#/anyOf/1`, `#/properties/a~1b`.
//! - `<id>` or `<id>#/<pointer>`: a node declaring `$id`, optionally
//!   followed by a pointer relative to it.
//!
//! `#/$defs/...` is rejected as unsupported. Anything else that does not
//! resolve is an [`SchemaError::UnresolvedRef`].

use std::collections::{HashMap, HashSet};

use jsonv_core::{from_json_pointer, to_json_pointer, PathSegment, SchemaError};

use crate::node::SchemaId;
use crate::schema::Schema;

/// Maximum number of nested `$ref` or self-reference hops in one
/// validation, coercion, or walk.
pub const MAX_REF_DEPTH: usize = 256;

/// Pointer and `$id` index of one schema tree.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    by_pointer: HashMap<String, SchemaId>,
    by_id: HashMap<String, SchemaId>,
    pointers: HashMap<SchemaId, String>,
}

impl Resolver {
    /// Index every node reachable from the root through keywords.
    pub(crate) fn index(schema: &Schema) -> Self {
        let mut resolver = Self::default();
        let mut seen = HashSet::new();
        let mut stack: Vec<(SchemaId, Vec<PathSegment>)> = vec![(schema.root(), Vec::new())];

        while let Some((id, path)) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            let pointer = format!("#{}", to_json_pointer(&path));
            let node = schema.node(id);
            if let Some(declared) = node.id() {
                resolver.by_id.entry(declared.to_string()).or_insert(id);
            }
            for keyword in node.keywords().iter().rev() {
                for (segments, child) in keyword.subschemas().into_iter().rev() {
                    let mut child_path = path.clone();
                    child_path.extend(segments);
                    stack.push((child, child_path));
                }
            }
            resolver.by_pointer.insert(pointer.clone(), id);
            resolver.pointers.insert(id, pointer);
        }

        tracing::trace!(
            pointers = resolver.by_pointer.len(),
            ids = resolver.by_id.len(),
            "built $ref index"
        );
        resolver
    }

    /// Resolve a `$ref` string to a node id.
    pub fn resolve(&self, reference: &str) -> Result<SchemaId, SchemaError> {
        if let Some(id) = self.by_id.get(reference) {
            tracing::trace!(reference, "resolved $ref by $id");
            return Ok(*id);
        }

        let (base, fragment) = match reference.split_once('#') {
            Some((base, fragment)) => (base, fragment),
            None => (reference, ""),
        };

        let segments = from_json_pointer(fragment)
            .map_err(|_| SchemaError::UnresolvedRef(reference.to_string()))?;
        if matches!(segments.first(), Some(PathSegment::Key(k)) if k == "$defs") {
            tracing::debug!(reference, "rejecting $defs reference");
            return Err(SchemaError::Unsupported {
                feature: "$defs".to_string(),
            });
        }

        let start = if base.is_empty() {
            "#"
        } else {
            self.by_id
                .get(base)
                .and_then(|id| self.pointer_of(*id))
                .ok_or_else(|| SchemaError::UnresolvedRef(reference.to_string()))?
        };

        let target = format!("{start}{}", to_json_pointer(&segments));
        match self.by_pointer.get(&target) {
            Some(id) => {
                tracing::trace!(reference, target = %target, "resolved $ref");
                Ok(*id)
            }
            None => Err(SchemaError::UnresolvedRef(reference.to_string())),
        }
    }

    /// The canonical pointer of a node, if it is reachable from the root.
    pub fn pointer_of(&self, id: SchemaId) -> Option<&str> {
        self.pointers.get(&id).map(String::as_str)
    }

    /// Number of indexed nodes.
    pub fn len(&self) -> usize {
        self.by_pointer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_pointer.is_empty()
    }
}
