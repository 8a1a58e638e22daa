//! Entity schema tree
//!
//! An [`EntitySchema`] is built bottom-up during one generation call and is
//! not mutated afterwards. Fields are a sum type so that the canonical type
//! of a field and its shape can never disagree:
//!
//! ```text
//! Field
//! ├── Simple(SimpleType)
//! ├── Object(FieldSet)
//! └── Array(ArrayElement)
//!     ├── Simple(SimpleType)
//!     └── Object(FieldSet)
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::constraint::Constraint;
use crate::descriptor::ValueGenerator;
use crate::error::{Result, SchemaError};
use crate::types::{CanonicalType, SimpleType};
use crate::version::Version;

/// Lifecycle status of a schema; generation only produces `Active`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaStatus {
    Active,
}

impl SchemaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaStatus::Active => "active",
        }
    }
}

/// Root of a generated schema
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySchema {
    pub name: String,
    pub status: SchemaStatus,
    pub version: Version,
    pub fields: FieldSet,
}

impl EntitySchema {
    /// Look up a field by dotted path (e.g. `"addresses.state.code"`).
    /// Array items are entered transparently.
    pub fn field(&self, path: &str) -> Option<&Field> {
        let mut segments = path.split('.');
        let mut current = self.fields.get(segments.next()?)?;
        for segment in segments {
            current = current.nested_fields()?.get(segment)?;
        }
        Some(current)
    }
}

/// Ordered, name-unique collection of fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    fields: Vec<Field>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, rejecting a name already present
    pub fn insert(&mut self, field: Field) -> Result<()> {
        if self.contains(&field.name) {
            return Err(SchemaError::DuplicateField { name: field.name });
        }
        self.fields.push(field);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'a> IntoIterator for &'a FieldSet {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Element of an array field: exactly one of the two kinds
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayElement {
    Simple(SimpleType),
    Object(FieldSet),
}

/// Shape of a field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Simple(SimpleType),
    Object(FieldSet),
    Array(ArrayElement),
}

/// A node in the schema tree
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub constraints: BTreeSet<Constraint>,
    pub properties: BTreeMap<String, Value>,
    pub value_generator: Option<ValueGenerator>,
}

impl Field {
    fn with_kind(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            constraints: BTreeSet::new(),
            properties: BTreeMap::new(),
            value_generator: None,
        }
    }

    pub fn simple(name: impl Into<String>, ty: SimpleType) -> Self {
        Self::with_kind(name, FieldKind::Simple(ty))
    }

    pub fn object(name: impl Into<String>, fields: FieldSet) -> Self {
        Self::with_kind(name, FieldKind::Object(fields))
    }

    pub fn array(name: impl Into<String>, element: ArrayElement) -> Self {
        Self::with_kind(name, FieldKind::Array(element))
    }

    pub fn canonical_type(&self) -> CanonicalType {
        match &self.kind {
            FieldKind::Simple(ty) => CanonicalType::Simple(*ty),
            FieldKind::Object(_) => CanonicalType::Object,
            FieldKind::Array(_) => CanonicalType::Array,
        }
    }

    /// Fields of an object, or of an array's object element
    pub fn nested_fields(&self) -> Option<&FieldSet> {
        match &self.kind {
            FieldKind::Object(fields) | FieldKind::Array(ArrayElement::Object(fields)) => Some(fields),
            FieldKind::Simple(_) | FieldKind::Array(ArrayElement::Simple(_)) => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.properties.get("description").and_then(Value::as_str)
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.properties
            .insert("description".to_string(), Value::String(description.into()));
    }

    pub fn has_constraint(&self, constraint: &Constraint) -> bool {
        self.constraints.contains(constraint)
    }
}
