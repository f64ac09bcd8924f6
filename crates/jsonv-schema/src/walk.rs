//! # Walker
//!
//! Depth-first, pre-order traversal over a schema and, optionally, a bound
//! data value. Each step yields a [`Node`] carrying the sub-schema, its
//! instance and keyword paths, its depth, and the piece of data found at
//! its instance path if that data validates against the sub-schema.
//!
//! `depth` is the length of the instance path, so `max_depth` bounds how
//! far into the data the walk goes, not how deep the schema nests.
//! Self-references are yielded but not expanded.

use serde_json::Value;

use jsonv_core::{get_path, to_json_pointer, PathSegment};

use crate::node::SchemaKind;
use crate::schema::{Schema, SchemaRef};

/// Options for a walk.
#[derive(Debug, Clone)]
pub struct WalkOptions<'d> {
    /// Data to bind to nodes. Cloned once when the walk starts.
    pub data: Option<&'d Value>,
    /// Do not expand nodes at this depth or deeper.
    pub max_depth: Option<usize>,
    /// Yield the starting node itself.
    pub include_self: bool,
    pub instance_path: Vec<PathSegment>,
    pub keyword_path: Vec<PathSegment>,
}

impl Default for WalkOptions<'_> {
    fn default() -> Self {
        Self {
            data: None,
            max_depth: None,
            include_self: true,
            instance_path: Vec::new(),
            keyword_path: Vec::new(),
        }
    }
}

/// One step of a walk.
#[derive(Debug, Clone)]
pub struct Node<'s> {
    pub schema: SchemaRef<'s>,
    pub instance_path: Vec<PathSegment>,
    pub keyword_path: Vec<PathSegment>,
    pub depth: usize,
    pub data: Option<Value>,
}

impl Node<'_> {
    pub fn instance_location(&self) -> String {
        to_json_pointer(&self.instance_path)
    }

    pub fn keyword_location(&self) -> String {
        to_json_pointer(&self.keyword_path)
    }
}

struct Pending<'s> {
    schema: SchemaRef<'s>,
    instance_path: Vec<PathSegment>,
    keyword_path: Vec<PathSegment>,
}

/// Iterator returned by [`Schema::walk`].
pub struct Walker<'s> {
    data: Option<Value>,
    base_depth: usize,
    max_depth: Option<usize>,
    skip_first: bool,
    stack: Vec<Pending<'s>>,
}

impl<'s> Walker<'s> {
    fn new(start: SchemaRef<'s>, options: WalkOptions<'_>) -> Self {
        Self {
            data: options.data.cloned(),
            base_depth: options.instance_path.len(),
            max_depth: options.max_depth,
            skip_first: !options.include_self,
            stack: vec![Pending {
                schema: start,
                instance_path: options.instance_path,
                keyword_path: options.keyword_path,
            }],
        }
    }

    /// Data at `path`, relative to the walk's starting instance path.
    fn data_at(&self, path: &[PathSegment]) -> Option<&Value> {
        let data = self.data.as_ref()?;
        get_path(data, path.get(self.base_depth..)?)
    }

    fn bind(&self, schema: SchemaRef<'s>, path: &[PathSegment]) -> Option<Value> {
        let value = self.data_at(path)?;
        match schema.validate(value) {
            Ok(result) if result.valid => Some(value.clone()),
            Ok(_) => None,
            Err(err) => {
                tracing::trace!(path = %to_json_pointer(path), error = %err, "walker skipped data binding");
                None
            }
        }
    }
}

impl<'s> Iterator for Walker<'s> {
    type Item = Node<'s>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let pending = self.stack.pop()?;
            let depth = pending.instance_path.len();
            let expand = self.max_depth.map_or(true, |max| depth < max)
                && !matches!(pending.schema.kind(), SchemaKind::Link(_));

            if expand {
                let here = self.data_at(&pending.instance_path);
                let children = pending.schema.children_for(here);
                for child in children.into_iter().rev() {
                    let mut instance_path = pending.instance_path.clone();
                    instance_path.extend(child.instance_path);
                    let mut keyword_path = pending.keyword_path.clone();
                    keyword_path.extend(child.keyword_path);
                    self.stack.push(Pending {
                        schema: child.schema,
                        instance_path,
                        keyword_path,
                    });
                }
            }

            if std::mem::take(&mut self.skip_first) {
                continue;
            }

            let data = self.bind(pending.schema, &pending.instance_path);
            return Some(Node {
                schema: pending.schema,
                instance_path: pending.instance_path,
                keyword_path: pending.keyword_path,
                depth,
                data,
            });
        }
    }
}

impl Schema {
    /// Walk the schema depth-first.
    pub fn walk<'s>(&'s self, options: WalkOptions<'_>) -> Walker<'s> {
        self.view().walk(options)
    }
}

impl<'s> SchemaRef<'s> {
    pub fn walk(self, options: WalkOptions<'_>) -> Walker<'s> {
        Walker::new(self, options)
    }
}
