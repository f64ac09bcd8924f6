//! # jsonv-schema: Runtime Schema Engine
//!
//! Composable, JSON-Schema-shaped schema trees with validation, coercion,
//! default templates, `$ref` resolution and depth-first traversal.
//!
//! ## Building Schemas
//!
//! Schemas are built either with the builders on [`Schema`] or loaded
//! from a JSON-Schema document with [`Schema::from_json`]. Both produce
//! the same arena-backed tree, and [`Schema::to_json`] serializes either
//! back to a document.
//!
//! ```
//! use jsonv_schema::Schema;
//! use serde_json::json;
//!
//! let person = Schema::object([
//!     ("name", Schema::string().min_length(1)),
//!     ("age", Schema::integer().minimum(0.0).optional()),
//! ]);
//! assert!(person.validate(&json!({"name": "Ada"})).unwrap().valid);
//! assert_eq!(person.coerce(&json!({"name": "Ada", "age": "36"})).unwrap()["age"], json!(36));
//! ```
//!
//! ## Engines
//!
//! - [`validate`]: structured errors with keyword and instance locations.
//! - [`coerce`]: best-effort conversion of loosely typed input.
//! - [`template`]: default instances from `const`, `default` and types.
//! - [`walk`]: pre-order traversal with optional data binding.
//! - [`parse`]: coerce, template and validate in one call.
//!
//! ## Crate Policy
//!
//! - Depends only on `jsonv-core` internally.
//! - Data problems are results, never errors. `Err(SchemaError)` is
//!   reserved for malformed or unsupported schemas.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod coerce;
pub mod format;
pub mod from_json;
pub mod hooks;
mod keywords;
pub mod node;
pub mod parse;
pub mod resolver;
pub mod schema;
pub mod template;
pub mod validate;
pub mod walk;

pub use coerce::{coerce_boolean, coerce_number, coerce_string, CoercionOptions};
pub use format::{list_formats, register_format, unregister_format, FormatRegistry, BUILTIN_FORMATS};
pub use hooks::{CoerceHook, Constant, Hooks, SplitDelimited, TemplateHook, ValidateHook};
pub use node::{Keyword, Pattern, SchemaId, SchemaKind, SchemaNode};
pub use parse::{parse, ParseError, ParseOptions};
pub use resolver::{Resolver, MAX_REF_DEPTH};
pub use schema::{Child, Schema, SchemaRef};
pub use template::TemplateOptions;
pub use validate::{ErrorDetail, Issue, Location, ValidationOptions, ValidationResult};
pub use walk::{Node, WalkOptions, Walker};

pub use jsonv_core::{InstanceType, PathSegment, SchemaError};
