//! Canonical schema types and host type classification
//!
//! Every host type is classified into one of a closed set of canonical
//! types. The first matching rule wins:
//!
//! ```text
//! string → boolean → date → bigdecimal → biginteger → binary
//!        → double → integer → array (iterable) → object (fallback)
//! ```
//!
//! Configured overrides are consulted before the built-in table.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::descriptor::TypeRef;

/// Canonical types a field may hold without nesting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SimpleType {
    String,
    Boolean,
    Date,
    BigDecimal,
    BigInteger,
    Binary,
    Double,
    Integer,
}

impl SimpleType {
    /// Name used in rendered schema documents
    pub fn name(&self) -> &'static str {
        match self {
            SimpleType::String => "string",
            SimpleType::Boolean => "boolean",
            SimpleType::Date => "date",
            SimpleType::BigDecimal => "bigdecimal",
            SimpleType::BigInteger => "biginteger",
            SimpleType::Binary => "binary",
            SimpleType::Double => "double",
            SimpleType::Integer => "integer",
        }
    }
}

impl fmt::Display for SimpleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The closed set of schema-level types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CanonicalType {
    Simple(SimpleType),
    Array,
    Object,
}

impl CanonicalType {
    pub fn is_simple(&self) -> bool {
        matches!(self, CanonicalType::Simple(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            CanonicalType::Simple(simple) => simple.name(),
            CanonicalType::Array => "array",
            CanonicalType::Object => "object",
        }
    }
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CanonicalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "string" => CanonicalType::Simple(SimpleType::String),
            "boolean" => CanonicalType::Simple(SimpleType::Boolean),
            "date" => CanonicalType::Simple(SimpleType::Date),
            "bigdecimal" => CanonicalType::Simple(SimpleType::BigDecimal),
            "biginteger" => CanonicalType::Simple(SimpleType::BigInteger),
            "binary" => CanonicalType::Simple(SimpleType::Binary),
            "double" => CanonicalType::Simple(SimpleType::Double),
            "integer" => CanonicalType::Simple(SimpleType::Integer),
            "array" => CanonicalType::Array,
            "object" => CanonicalType::Object,
            _ => return Err(format!("unknown canonical type '{}'", s)),
        };
        Ok(ty)
    }
}

impl TryFrom<String> for CanonicalType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CanonicalType> for String {
    fn from(ty: CanonicalType) -> Self {
        ty.name().to_string()
    }
}

/// Built-in host type identities, in match order
const BUILTIN_RULES: &[(SimpleType, &[&str])] = &[
    (SimpleType::String, &["String", "str", "&str", "Cow<str>", "Box<str>", "Arc<str>"]),
    (SimpleType::Boolean, &["bool"]),
    (
        SimpleType::Date,
        &["DateTime<Utc>", "DateTime<FixedOffset>", "DateTime<Local>", "NaiveDateTime", "NaiveDate", "SystemTime", "OffsetDateTime", "Timestamp"],
    ),
    (SimpleType::BigDecimal, &["BigDecimal", "Decimal"]),
    (SimpleType::BigInteger, &["BigInt", "BigUint"]),
    (SimpleType::Binary, &["Vec<u8>", "[u8]", "&[u8]", "Bytes", "Box<[u8]>"]),
    (SimpleType::Double, &["f64", "f32"]),
    (
        SimpleType::Integer,
        &["i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize"],
    ),
];

/// Wrappers that do not change a type's schema classification
const TRANSPARENT_WRAPPERS: &[&str] = &["Option", "Box", "Arc", "Rc"];

/// Maps host types to canonical types.
///
/// Pure and total: unknown identities fall back to `object`. Override keys
/// match without regard to case, since config sources lowercase table keys.
#[derive(Debug, Clone, Default)]
pub struct TypeClassifier {
    overrides: HashMap<String, CanonicalType>,
}

impl TypeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a classifier with extra identity mappings that take precedence
    /// over the built-in table
    pub fn with_overrides(overrides: HashMap<String, CanonicalType>) -> Self {
        let overrides = overrides
            .into_iter()
            .map(|(id, ty)| (override_key(&id), ty))
            .collect();
        Self { overrides }
    }

    pub fn classify(&self, ty: &TypeRef) -> CanonicalType {
        let name = normalize_type_name(ty.id.as_str());

        if let Some(canonical) = self.overrides.get(&name.to_ascii_lowercase()) {
            return *canonical;
        }

        for (simple, names) in BUILTIN_RULES {
            if names.contains(&name.as_str()) {
                return CanonicalType::Simple(*simple);
            }
        }

        if ty.iterable {
            return CanonicalType::Array;
        }

        CanonicalType::Object
    }
}

/// Normalize a host type identity for table lookup.
///
/// Removes whitespace, peels transparent wrappers (`Option<T>`, `Box<T>`, ...)
/// and drops the module path of the outermost type.
pub fn normalize_type_name(raw: &str) -> String {
    let mut name: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    loop {
        name = strip_module_path(&name);
        let peeled = TRANSPARENT_WRAPPERS.iter().find_map(|wrapper| {
            name.strip_prefix(wrapper)
                .and_then(|rest| rest.strip_prefix('<'))
                .and_then(|rest| rest.strip_suffix('>'))
                .map(str::to_string)
        });
        match peeled {
            // Box<str> and Box<[u8]> are identities in their own right
            Some(inner) if !BUILTIN_RULES.iter().any(|(_, names)| names.contains(&name.as_str())) => {
                name = inner;
            }
            _ => return name,
        }
    }
}

fn override_key(raw: &str) -> String {
    normalize_type_name(raw).to_ascii_lowercase()
}

fn strip_module_path(name: &str) -> String {
    let head_end = name.find('<').unwrap_or(name.len());
    match name[..head_end].rfind("::") {
        Some(idx) => name[idx + 2..].to_string(),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple(id: &str) -> TypeRef {
        TypeRef::simple(id)
    }

    #[test]
    fn test_builtin_simple_types() {
        let classifier = TypeClassifier::new();
        assert_eq!(classifier.classify(&simple("String")), CanonicalType::Simple(SimpleType::String));
        assert_eq!(classifier.classify(&simple("bool")), CanonicalType::Simple(SimpleType::Boolean));
        assert_eq!(classifier.classify(&simple("NaiveDate")), CanonicalType::Simple(SimpleType::Date));
        assert_eq!(classifier.classify(&simple("BigDecimal")), CanonicalType::Simple(SimpleType::BigDecimal));
        assert_eq!(classifier.classify(&simple("BigInt")), CanonicalType::Simple(SimpleType::BigInteger));
        assert_eq!(classifier.classify(&simple("f64")), CanonicalType::Simple(SimpleType::Double));
        assert_eq!(classifier.classify(&simple("u32")), CanonicalType::Simple(SimpleType::Integer));
    }

    #[test]
    fn test_bytes_are_binary_not_array() {
        let classifier = TypeClassifier::new();
        let bytes = TypeRef::iterable("Vec<u8>");
        assert_eq!(classifier.classify(&bytes), CanonicalType::Simple(SimpleType::Binary));
    }

    #[test]
    fn test_iterable_is_array_regardless_of_element() {
        let classifier = TypeClassifier::new();
        assert_eq!(classifier.classify(&TypeRef::iterable("Vec<Address>")), CanonicalType::Array);
        assert_eq!(classifier.classify(&TypeRef::iterable("HashSet<String>")), CanonicalType::Array);
    }

    #[test]
    fn test_unknown_falls_back_to_object() {
        let classifier = TypeClassifier::new();
        assert_eq!(classifier.classify(&simple("PhoneNumber")), CanonicalType::Object);
        assert_eq!(classifier.classify(&simple("Strng")), CanonicalType::Object);
    }

    #[test]
    fn test_wrappers_and_paths_are_normalized() {
        let classifier = TypeClassifier::new();
        assert_eq!(classifier.classify(&simple("Option<bool>")), CanonicalType::Simple(SimpleType::Boolean));
        assert_eq!(classifier.classify(&simple("std::string::String")), CanonicalType::Simple(SimpleType::String));
        assert_eq!(
            classifier.classify(&simple("Option<chrono::DateTime<Utc>>")),
            CanonicalType::Simple(SimpleType::Date)
        );
        assert_eq!(classifier.classify(&simple("Box<str>")), CanonicalType::Simple(SimpleType::String));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut overrides = HashMap::new();
        overrides.insert("Uuid".to_string(), CanonicalType::Simple(SimpleType::String));
        overrides.insert("String".to_string(), CanonicalType::Simple(SimpleType::Binary));
        let classifier = TypeClassifier::with_overrides(overrides);

        assert_eq!(classifier.classify(&simple("uuid::Uuid")), CanonicalType::Simple(SimpleType::String));
        assert_eq!(classifier.classify(&simple("String")), CanonicalType::Simple(SimpleType::Binary));
    }

    #[test]
    fn test_override_keys_ignore_case() {
        let mut overrides = HashMap::new();
        overrides.insert("uuid".to_string(), CanonicalType::Simple(SimpleType::String));
        let classifier = TypeClassifier::with_overrides(overrides);

        assert_eq!(classifier.classify(&simple("Uuid")), CanonicalType::Simple(SimpleType::String));
        assert_eq!(classifier.classify(&simple("Option<uuid::Uuid>")), CanonicalType::Simple(SimpleType::String));
    }

    #[test]
    fn test_canonical_type_parsing() {
        assert_eq!("big-decimal".parse::<CanonicalType>(), Ok(CanonicalType::Simple(SimpleType::BigDecimal)));
        assert_eq!("Array".parse::<CanonicalType>(), Ok(CanonicalType::Array));
        assert!("matrix".parse::<CanonicalType>().is_err());
        assert!(!CanonicalType::Object.is_simple());
        assert!(CanonicalType::Simple(SimpleType::Date).is_simple());
    }
}
