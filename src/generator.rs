//! Schema Generator
//!
//! Walks a type's field descriptors in declared order and builds the
//! schema tree:
//!
//! ```text
//! classify(host type)
//! ├── simple  → Field::Simple
//! ├── array   → classify(element type)
//! │   ├── simple → Array(Simple element)
//! │   ├── object → Array(Object element) ── recurse into element type
//! │   └── array  → UnsupportedType
//! └── object  → Field::Object ── recurse into host type
//! ```
//!
//! The generator holds no mutable state; one instance may serve concurrent
//! calls as long as its introspector can.

use tracing::{debug, trace};

use crate::config::GeneratorConfig;
use crate::constraint::ConstraintDeriver;
use crate::descriptor::{FieldDescriptor, Introspector, TypeDescriptor, TypeId};
use crate::error::{Result, SchemaError};
use crate::schema::{ArrayElement, EntitySchema, Field, FieldSet, SchemaStatus};
use crate::types::{CanonicalType, TypeClassifier};
use crate::version::Version;

/// Types currently being expanded, root first
type ExpansionPath = Vec<TypeId>;

/// Derives entity schemas from introspected type descriptors
pub struct SchemaGenerator<I> {
    introspector: I,
    classifier: TypeClassifier,
    deriver: ConstraintDeriver,
    require_semver: bool,
    detect_cycles: bool,
}

impl<I: Introspector> SchemaGenerator<I> {
    /// Create a generator with the built-in type table and cycle detection
    pub fn new(introspector: I) -> Self {
        Self::with_config(introspector, &GeneratorConfig::default())
    }

    /// Create a generator with configured type mappings, markers and checks
    pub fn with_config(introspector: I, config: &GeneratorConfig) -> Self {
        Self {
            introspector,
            classifier: TypeClassifier::with_overrides(config.types.clone()),
            deriver: ConstraintDeriver::with_markers(config.markers.clone()),
            require_semver: config.validation.require_semver,
            detect_cycles: config.validation.detect_cycles,
        }
    }

    /// Generate the schema of the entity with the given type identity
    pub fn generate(&self, ty: &TypeId) -> Result<EntitySchema> {
        let descriptor = self.introspector.reflect(ty)?;
        self.generate_from(&descriptor)
    }

    /// Generate the schema of an already reflected root descriptor
    pub fn generate_from(&self, descriptor: &TypeDescriptor) -> Result<EntitySchema> {
        debug!(entity = %descriptor.entity_name, type_id = %descriptor.type_id, "generating schema");

        let info = descriptor
            .version
            .as_ref()
            .ok_or_else(|| SchemaError::MissingVersion(descriptor.entity_name.clone()))?;
        let version = Version::resolve(info);
        if self.require_semver {
            version.validate_semver()?;
        }

        let mut path = vec![descriptor.type_id.normalized()];
        let fields = self.build_fields(descriptor, &mut path)?;

        debug!(entity = %descriptor.entity_name, fields = fields.len(), "schema generated");

        Ok(EntitySchema {
            name: descriptor.entity_name.clone(),
            status: SchemaStatus::Active,
            version,
            fields,
        })
    }

    fn build_fields(&self, descriptor: &TypeDescriptor, path: &mut ExpansionPath) -> Result<FieldSet> {
        let mut fields = FieldSet::new();

        for field_descriptor in &descriptor.fields {
            let mut field = self.build_field(field_descriptor, path)?;

            field.constraints = self.deriver.derive(field_descriptor);
            if let Some(description) = &field_descriptor.description {
                field.set_description(description.clone());
            }
            field.value_generator = field_descriptor.value_generator.clone();

            fields.insert(field)?;
        }

        Ok(fields)
    }

    fn build_field(&self, field: &FieldDescriptor, path: &mut ExpansionPath) -> Result<Field> {
        let ty = self.classifier.classify(&field.host_type);
        trace!(field = %field.name, host_type = %field.host_type.id, canonical = %ty, "classified field");

        match ty {
            CanonicalType::Simple(simple) => Ok(Field::simple(&field.name, simple)),
            CanonicalType::Array => {
                let element = field
                    .element_host_type
                    .as_ref()
                    .ok_or_else(|| SchemaError::MissingElementType { field: field.name.clone() })?;

                match self.classifier.classify(element) {
                    CanonicalType::Simple(simple) => {
                        Ok(Field::array(&field.name, ArrayElement::Simple(simple)))
                    }
                    CanonicalType::Object => {
                        let nested = self.expand(&element.id, path)?;
                        Ok(Field::array(&field.name, ArrayElement::Object(nested)))
                    }
                    CanonicalType::Array => Err(SchemaError::UnsupportedType {
                        field: field.name.clone(),
                        element: element.id.to_string(),
                    }),
                }
            }
            CanonicalType::Object => {
                let nested = self.expand(&field.host_type.id, path)?;
                Ok(Field::object(&field.name, nested))
            }
        }
    }

    /// Reflect a nested type and build its fields
    fn expand(&self, ty: &TypeId, path: &mut ExpansionPath) -> Result<FieldSet> {
        let ty = &ty.normalized();
        if self.detect_cycles && path.contains(ty) {
            let chain = path
                .iter()
                .chain(std::iter::once(ty))
                .map(TypeId::as_str)
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(SchemaError::CyclicType { path: chain });
        }

        let descriptor = self.introspector.reflect(ty)?;
        trace!(type_id = %ty, depth = path.len(), "expanding nested type");

        path.push(ty.clone());
        let fields = self.build_fields(&descriptor, path)?;
        path.pop();

        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::Constraint;
    use crate::descriptor::{DescriptorCatalog, TypeRef, VersionInfo};
    use crate::schema::FieldKind;
    use crate::types::SimpleType;

    fn root(fields: Vec<FieldDescriptor>) -> TypeDescriptor {
        fields.into_iter().fold(
            TypeDescriptor::new("Root", "root").with_version(VersionInfo::new("1.0.0", "")),
            TypeDescriptor::with_field,
        )
    }

    #[test]
    fn test_simple_fields_in_declared_order() {
        let catalog = DescriptorCatalog::new().with(root(vec![
            FieldDescriptor::scalar("z", "String"),
            FieldDescriptor::scalar("a", "i32"),
            FieldDescriptor::scalar("m", "f64"),
        ]));
        let schema = SchemaGenerator::new(catalog).generate(&TypeId::from("Root")).unwrap();

        assert_eq!(schema.status, SchemaStatus::Active);
        assert_eq!(schema.fields.names().collect::<Vec<_>>(), vec!["z", "a", "m"]);
        assert_eq!(schema.fields.get("a").unwrap().kind, FieldKind::Simple(SimpleType::Integer));
    }

    #[test]
    fn test_array_of_simple() {
        let catalog = DescriptorCatalog::new().with(root(vec![FieldDescriptor::iterable(
            "tags",
            "Vec<String>",
            TypeRef::simple("String"),
        )]));
        let schema = SchemaGenerator::new(catalog).generate(&TypeId::from("Root")).unwrap();

        assert_eq!(
            schema.fields.get("tags").unwrap().kind,
            FieldKind::Array(ArrayElement::Simple(SimpleType::String))
        );
    }

    #[test]
    fn test_nested_array_rejected() {
        let catalog = DescriptorCatalog::new().with(root(vec![FieldDescriptor::iterable(
            "grid",
            "Vec<Vec<String>>",
            TypeRef::iterable("Vec<String>"),
        )]));
        let err = SchemaGenerator::new(catalog).generate(&TypeId::from("Root")).unwrap_err();

        match err {
            SchemaError::UnsupportedType { field, element } => {
                assert_eq!(field, "grid");
                assert_eq!(element, "Vec<String>");
            }
            other => panic!("Expected UnsupportedType, got {:?}", other),
        }
    }

    #[test]
    fn test_iterable_without_element_type() {
        let catalog = DescriptorCatalog::new().with(root(vec![FieldDescriptor::new(
            "items",
            TypeRef::iterable("Vec<Item>"),
        )]));
        let err = SchemaGenerator::new(catalog).generate(&TypeId::from("Root")).unwrap_err();
        assert!(matches!(err, SchemaError::MissingElementType { ref field } if field == "items"));
    }

    #[test]
    fn test_optional_nested_object() {
        let catalog = DescriptorCatalog::new()
            .with(root(vec![FieldDescriptor::scalar("billing", "Option<Address>")]))
            .with(TypeDescriptor::new("Address", "address").with_field(FieldDescriptor::scalar("city", "String")));
        let schema = SchemaGenerator::new(catalog).generate(&TypeId::from("Root")).unwrap();

        let billing = schema.fields.get("billing").unwrap();
        assert_eq!(billing.canonical_type(), CanonicalType::Object);
        assert!(billing.nested_fields().unwrap().contains("city"));
    }

    #[test]
    fn test_boxed_self_reference_is_a_cycle() {
        let catalog = DescriptorCatalog::new().with(
            TypeDescriptor::new("Node", "node")
                .with_version(VersionInfo::new("1.0.0", ""))
                .with_field(FieldDescriptor::iterable("children", "Vec<Box<Node>>", TypeRef::simple("Box<Node>"))),
        );
        let err = SchemaGenerator::new(catalog).generate(&TypeId::from("Node")).unwrap_err();
        assert!(matches!(err, SchemaError::CyclicType { ref path } if path == "Node -> Node"));
    }

    #[test]
    fn test_missing_version() {
        let catalog = DescriptorCatalog::new().with(TypeDescriptor::new("Bare", "bare"));
        let err = SchemaGenerator::new(catalog).generate(&TypeId::from("Bare")).unwrap_err();
        assert!(matches!(err, SchemaError::MissingVersion(ref name) if name == "bare"));
    }

    #[test]
    fn test_unknown_nested_type_propagates() {
        let catalog = DescriptorCatalog::new().with(root(vec![FieldDescriptor::scalar("owner", "Person")]));
        let err = SchemaGenerator::new(catalog).generate(&TypeId::from("Root")).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType(ref id) if id == "Person"));
    }

    #[test]
    fn test_constraints_and_description_attached() {
        let catalog = DescriptorCatalog::new().with(root(vec![FieldDescriptor::scalar("name", "String")
            .required()
            .max_length(40)
            .description("Display name")]));
        let schema = SchemaGenerator::new(catalog).generate(&TypeId::from("Root")).unwrap();
        let field = schema.fields.get("name").unwrap();

        assert!(field.has_constraint(&Constraint::Required));
        assert!(field.has_constraint(&Constraint::max_length(40)));
        assert_eq!(field.description(), Some("Display name"));
    }

    #[test]
    fn test_semver_required_by_config() {
        let catalog = DescriptorCatalog::new()
            .with(TypeDescriptor::new("Root", "root").with_version(VersionInfo::new("next", "")));
        let mut config = GeneratorConfig::default();
        config.validation.require_semver = true;

        let err = SchemaGenerator::with_config(&catalog, &config)
            .generate(&TypeId::from("Root"))
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidVersion(_)));

        assert!(SchemaGenerator::new(&catalog).generate(&TypeId::from("Root")).is_ok());
    }

    #[test]
    fn test_type_override_from_config() {
        let catalog = DescriptorCatalog::new().with(root(vec![FieldDescriptor::scalar("id", "uuid::Uuid")]));
        let mut config = GeneratorConfig::default();
        config
            .types
            .insert("Uuid".to_string(), CanonicalType::Simple(SimpleType::String));

        let schema = SchemaGenerator::with_config(catalog, &config)
            .generate(&TypeId::from("Root"))
            .unwrap();
        assert_eq!(schema.fields.get("id").unwrap().kind, FieldKind::Simple(SimpleType::String));
    }
}
