//! Introspection descriptors
//!
//! The generator never looks at host types directly. An [`Introspector`]
//! turns a type identity into a [`TypeDescriptor`]: the entity name, its
//! version and the ordered list of [`FieldDescriptor`]s. Descriptors may be
//! produced by reflection, code generation or built by hand; the
//! [`DescriptorCatalog`] covers the last two cases and can be loaded from JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::error::{Result, SchemaError};
use crate::types::normalize_type_name;

/// Host type identity (e.g. `"String"`, `"Vec<Address>"`, `"Address"`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(String);

impl TypeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identity with transparent wrappers and module paths removed,
    /// so `Option<model::Address>` and `Address` name the same type
    pub fn normalized(&self) -> TypeId {
        Self(normalize_type_name(&self.0))
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TypeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A reference to a host type as seen from a field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    pub id: TypeId,
    /// The type is an iterable of elements
    #[serde(default)]
    pub iterable: bool,
}

impl TypeRef {
    pub fn simple(id: impl Into<TypeId>) -> Self {
        Self { id: id.into(), iterable: false }
    }

    pub fn iterable(id: impl Into<TypeId>) -> Self {
        Self { id: id.into(), iterable: true }
    }
}

/// Opaque value generator directive (sequence, UUID, timestamp, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueGenerator {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub configuration: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub overwrite: bool,
}

impl ValueGenerator {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            configuration: BTreeMap::new(),
            overwrite: false,
        }
    }

    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.configuration.insert(key.into(), value.into());
        self
    }

    pub fn overwriting(mut self) -> Self {
        self.overwrite = true;
        self
    }
}

/// A custom metadata flag, resolved through the configured marker table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
}

impl Marker {
    pub fn flag(name: impl Into<String>) -> Self {
        Self { name: name.into(), value: None }
    }

    pub fn valued(name: impl Into<String>, value: i64) -> Self {
        Self { name: name.into(), value: Some(value) }
    }
}

/// One structural member of a host type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name: String,
    pub host_type: TypeRef,
    /// Present iff `host_type` is iterable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_host_type: Option<TypeRef>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub identifying: bool,
    #[serde(default)]
    pub element_identifying: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_generator: Option<ValueGenerator>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<Marker>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, host_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            host_type,
            element_host_type: None,
            required: false,
            identifying: false,
            element_identifying: false,
            min_items: None,
            min_length: None,
            max_length: None,
            description: None,
            enum_name: None,
            value_generator: None,
            markers: Vec::new(),
        }
    }

    /// Field holding a non-iterable type
    pub fn scalar(name: impl Into<String>, ty: impl Into<TypeId>) -> Self {
        Self::new(name, TypeRef::simple(ty))
    }

    /// Field holding an iterable of `element`
    pub fn iterable(name: impl Into<String>, ty: impl Into<TypeId>, element: TypeRef) -> Self {
        let mut field = Self::new(name, TypeRef::iterable(ty));
        field.element_host_type = Some(element);
        field
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn identifying(mut self) -> Self {
        self.identifying = true;
        self
    }

    pub fn element_identifying(mut self) -> Self {
        self.element_identifying = true;
        self
    }

    pub fn min_items(mut self, n: i64) -> Self {
        self.min_items = Some(n);
        self
    }

    pub fn min_length(mut self, n: i64) -> Self {
        self.min_length = Some(n);
        self
    }

    pub fn max_length(mut self, n: i64) -> Self {
        self.max_length = Some(n);
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn enum_name(mut self, name: impl Into<String>) -> Self {
        self.enum_name = Some(name.into());
        self
    }

    pub fn value_generator(mut self, generator: ValueGenerator) -> Self {
        self.value_generator = Some(generator);
        self
    }

    pub fn marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }
}

/// Entity version as declared on the host type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub value: String,
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub changelog: String,
}

impl VersionInfo {
    pub fn new(value: impl Into<String>, changelog: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            extends: Vec::new(),
            changelog: changelog.into(),
        }
    }

    pub fn extending<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extends = versions.into_iter().map(Into::into).collect();
        self
    }
}

/// Everything the generator needs to know about one host type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDescriptor {
    pub type_id: TypeId,
    pub entity_name: String,
    /// Only root entities carry a version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionInfo>,
    /// Fields in declared order
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor {
    pub fn new(type_id: impl Into<TypeId>, entity_name: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            entity_name: entity_name.into(),
            version: None,
            fields: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: VersionInfo) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }
}

/// Source of type descriptors
///
/// Implementations must be safe for concurrent reads if a generator is
/// shared across threads; descriptors are treated as immutable snapshots.
pub trait Introspector {
    fn reflect(&self, ty: &TypeId) -> Result<TypeDescriptor>;
}

impl<T: Introspector + ?Sized> Introspector for &T {
    fn reflect(&self, ty: &TypeId) -> Result<TypeDescriptor> {
        (**self).reflect(ty)
    }
}

/// An introspector backed by a fixed set of descriptors, keyed by
/// normalized type identity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DescriptorCatalog {
    types: BTreeMap<TypeId, TypeDescriptor>,
}

impl DescriptorCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a JSON array of type descriptors
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let descriptors: Vec<TypeDescriptor> = serde_json::from_str(content)?;
        Ok(descriptors.into_iter().fold(Self::new(), Self::with))
    }

    pub fn with(mut self, descriptor: TypeDescriptor) -> Self {
        self.insert(descriptor);
        self
    }

    pub fn insert(&mut self, descriptor: TypeDescriptor) {
        self.types.insert(descriptor.type_id.normalized(), descriptor);
    }

    /// Find a root descriptor by entity name or type identity
    pub fn find_entity(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types
            .values()
            .find(|d| d.entity_name == name)
            .or_else(|| self.types.get(&TypeId::from(name).normalized()))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Introspector for DescriptorCatalog {
    fn reflect(&self, ty: &TypeId) -> Result<TypeDescriptor> {
        self.types
            .get(&ty.normalized())
            .cloned()
            .ok_or_else(|| SchemaError::UnknownType(ty.to_string()))
    }
}
