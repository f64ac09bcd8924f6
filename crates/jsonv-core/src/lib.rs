//! # jsonv-core: Foundational Types for jsonv
//!
//! This crate is the leaf of the jsonv dependency graph. It defines the
//! primitives every other crate builds on and depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **One error taxonomy.** `SchemaError` names every way a schema tree can
//!    be malformed or unsupported. Data problems are never errors; they are
//!    reported as validation results by `jsonv-schema`.
//!
//! 2. **`CanonicalForm` newtype.** All equality checks between JSON values
//!    (`const`, `enum`, `uniqueItems`) flow through `CanonicalForm::new()`,
//!    which applies NFC normalization and JCS serialization.
//!
//! 3. **Typed paths.** Locations are `PathSegment` lists rendered as JSON
//!    pointers only at the reporting boundary.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `jsonv-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod error;
pub mod pointer;
pub mod value;

pub use canonical::{canonical_eq, normalize, CanonicalForm};
pub use error::{PointerError, SchemaError};
pub use pointer::{from_json_pointer, get_path, to_json_pointer, PathSegment};
pub use value::{is_integer, number_value, string_length, InstanceType};
