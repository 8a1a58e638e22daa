//! Rendering of entity schemas into JSON documents
//!
//! Produces the `schema` object of an entity metadata document. Field order
//! in the output follows the order of each [`FieldSet`].

use serde_json::{json, Map, Value};

use crate::config::OutputFormat;
use crate::constraint::{Bound, Constraint};
use crate::error::Result;
use crate::schema::{ArrayElement, EntitySchema, Field, FieldKind, FieldSet};

/// Render a schema as a JSON value
pub fn render_schema(schema: &EntitySchema) -> Value {
    let mut version = Map::new();
    version.insert("value".to_string(), json!(schema.version.value));
    if let Some(extends) = &schema.version.extends {
        version.insert("extends".to_string(), json!(extends));
    }
    version.insert("changelog".to_string(), json!(schema.version.changelog));

    json!({
        "name": schema.name,
        "status": { "value": schema.status.as_str() },
        "version": Value::Object(version),
        "fields": render_fields(&schema.fields),
    })
}

/// Render a schema to a string in the requested format
pub fn to_string(schema: &EntitySchema, format: OutputFormat) -> Result<String> {
    let value = render_schema(schema);
    let rendered = match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(&value)?,
        OutputFormat::Compact => serde_json::to_string(&value)?,
    };
    Ok(rendered)
}

pub fn render_fields(fields: &FieldSet) -> Value {
    let rendered: Map<String, Value> = fields
        .iter()
        .map(|field| (field.name.clone(), render_field(field)))
        .collect();
    Value::Object(rendered)
}

pub fn render_field(field: &Field) -> Value {
    let mut out = Map::new();
    out.insert("type".to_string(), json!(field.canonical_type().name()));

    match &field.kind {
        FieldKind::Simple(_) => {}
        FieldKind::Object(fields) => {
            out.insert("fields".to_string(), render_fields(fields));
        }
        FieldKind::Array(element) => {
            out.insert("items".to_string(), render_element(element));
        }
    }

    out.insert(
        "description".to_string(),
        field.description().map_or(Value::Null, |d| json!(d)),
    );
    for (key, value) in &field.properties {
        if key != "description" {
            out.insert(key.clone(), value.clone());
        }
    }

    if !field.constraints.is_empty() {
        out.insert("constraints".to_string(), render_constraints(field));
    }

    if let Some(generator) = &field.value_generator {
        // ValueGenerator serialization cannot fail: string keys only
        if let Ok(value) = serde_json::to_value(generator) {
            out.insert("valueGenerator".to_string(), value);
        }
    }

    Value::Object(out)
}

fn render_element(element: &ArrayElement) -> Value {
    match element {
        ArrayElement::Simple(ty) => json!({ "type": ty.name() }),
        ArrayElement::Object(fields) => json!({
            "type": "object",
            "fields": render_fields(fields),
        }),
    }
}

fn render_constraints(field: &Field) -> Value {
    let mut out = Map::new();
    for constraint in &field.constraints {
        let (key, value) = match constraint {
            Constraint::Required => ("required", json!(true)),
            Constraint::Identity => ("identity", json!(true)),
            Constraint::MinItems(value) => ("minItems", json!(value)),
            Constraint::StringLength { bound: Bound::Min, value } => ("minLength", json!(value)),
            Constraint::StringLength { bound: Bound::Max, value } => ("maxLength", json!(value)),
            Constraint::Enum(name) => ("enum", json!(name)),
        };
        out.insert(key.to_string(), value);
    }
    Value::Object(out)
}
