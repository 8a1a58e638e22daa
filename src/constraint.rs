//! Field constraints and their derivation from descriptor metadata

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

use crate::descriptor::FieldDescriptor;

/// Which end of a range a bound constrains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bound {
    Min,
    Max,
}

/// A named restriction attached to a field
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Constraint {
    Required,
    Identity,
    /// Minimum item count; there is no maximum counterpart
    MinItems(i64),
    StringLength { bound: Bound, value: i64 },
    /// Value must belong to the named enum catalog
    Enum(String),
}

impl Constraint {
    pub fn min_items(value: i64) -> Self {
        Constraint::MinItems(value)
    }

    pub fn min_length(value: i64) -> Self {
        Constraint::StringLength { bound: Bound::Min, value }
    }

    pub fn max_length(value: i64) -> Self {
        Constraint::StringLength { bound: Bound::Max, value }
    }
}

/// Constraint constructors a custom marker may map to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstraintRule {
    Required,
    Identity,
    MinItems,
    MinLength,
    MaxLength,
}

impl ConstraintRule {
    /// Build the constraint, or `None` when a parameterised rule has no value
    fn build(&self, value: Option<i64>) -> Option<Constraint> {
        match self {
            ConstraintRule::Required => Some(Constraint::Required),
            ConstraintRule::Identity => Some(Constraint::Identity),
            ConstraintRule::MinItems => value.map(Constraint::min_items),
            ConstraintRule::MinLength => value.map(Constraint::min_length),
            ConstraintRule::MaxLength => value.map(Constraint::max_length),
        }
    }
}

/// Derives the constraint set of a field from its descriptor.
///
/// Marker names match without regard to case.
#[derive(Debug, Clone, Default)]
pub struct ConstraintDeriver {
    markers: HashMap<String, ConstraintRule>,
}

impl ConstraintDeriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_markers(markers: HashMap<String, ConstraintRule>) -> Self {
        let markers = markers
            .into_iter()
            .map(|(name, rule)| (name.to_ascii_lowercase(), rule))
            .collect();
        Self { markers }
    }

    /// Every rule is independent; a field accumulates any subset.
    ///
    /// There is deliberately no max-items rule.
    pub fn derive(&self, field: &FieldDescriptor) -> BTreeSet<Constraint> {
        let mut constraints = BTreeSet::new();

        if field.required {
            constraints.insert(Constraint::Required);
        }

        if let Some(n) = field.min_items {
            constraints.insert(Constraint::min_items(n));
        }

        if let Some(n) = field.min_length {
            constraints.insert(Constraint::min_length(n));
        }

        if let Some(n) = field.max_length {
            constraints.insert(Constraint::max_length(n));
        }

        if field.identifying || field.element_identifying {
            constraints.insert(Constraint::Identity);
        }

        if let Some(name) = &field.enum_name {
            constraints.insert(Constraint::Enum(name.clone()));
        }

        for marker in &field.markers {
            let Some(rule) = self.markers.get(&marker.name.to_ascii_lowercase()) else {
                debug!(field = %field.name, marker = %marker.name, "ignoring unmapped marker");
                continue;
            };
            match rule.build(marker.value) {
                Some(constraint) => {
                    constraints.insert(constraint);
                }
                None => warn!(
                    field = %field.name,
                    marker = %marker.name,
                    "marker maps to {:?} but carries no value, skipping",
                    rule
                ),
            }
        }

        constraints
    }
}
