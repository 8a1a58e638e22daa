//! Entity Schema Generator
//!
//! Derives declarative entity schemas from introspected type descriptors, so
//! that a data model's schema document follows the types programmers write
//! instead of being maintained by hand.
//!
//! ## Features
//!
//! - **Type Classification**: Host types map onto a closed set of canonical types
//! - **Recursive Derivation**: Nested objects and arrays of objects expand in place
//! - **Constraints**: Required, identity, item count, string length and enum bounds
//! - **Versioning**: Version, extended versions and changelog metadata
//! - **Sync Checks**: SHA256 checksums flag stale schema documents
//!
//! ## Architecture
//!
//! ```text
//! Introspector ──► SchemaGenerator ──► EntitySchema ──► render ──► JSON
//!                   ├── TypeClassifier
//!                   ├── ConstraintDeriver
//!                   └── Version::resolve
//! ```

pub mod checksum;
pub mod config;
pub mod constraint;
pub mod descriptor;
pub mod error;
pub mod generator;
pub mod render;
pub mod schema;
pub mod types;
pub mod version;

pub use checksum::Checksum;
pub use config::{GeneratorConfig, OutputFormat};
pub use constraint::{Bound, Constraint, ConstraintDeriver, ConstraintRule};
pub use descriptor::{
    DescriptorCatalog, FieldDescriptor, Introspector, Marker, TypeDescriptor, TypeId, TypeRef,
    ValueGenerator, VersionInfo,
};
pub use error::{Result, SchemaError};
pub use generator::SchemaGenerator;
pub use render::render_schema;
pub use schema::{ArrayElement, EntitySchema, Field, FieldKind, FieldSet, SchemaStatus};
pub use types::{CanonicalType, SimpleType, TypeClassifier};
pub use version::Version;
