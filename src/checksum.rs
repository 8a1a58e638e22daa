//! Checksums for detecting stale schema documents

use sha2::{Digest, Sha256};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::render::render_schema;
use crate::schema::EntitySchema;

/// SHA256 checksum of a rendered schema
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    /// Compute checksum from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Compute checksum from JSON value (compact rendering)
    pub fn from_json(value: &serde_json::Value) -> Self {
        Self::from_bytes(value.to_string().as_bytes())
    }

    /// Compute checksum of a generated schema
    pub fn of_schema(schema: &EntitySchema) -> Self {
        Self::from_json(&render_schema(schema))
    }

    /// Verify that a stored JSON document matches this checksum
    pub fn verify_json(&self, value: &serde_json::Value) -> bool {
        *self == Self::from_json(value)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
