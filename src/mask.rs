//! Partial-update masks.
//!
//! An update mask is a tree mirroring the shape of a resource's `config`
//! map. Each node names one field and says whether it was changed
//! ([`Operation::Update`]) or removed ([`Operation::Delete`]); fields that
//! did not change are absent from the mask.
//!
//! Executors build masks with [`compute_mask`]. Providers trust them and
//! use [`apply_mask`] to merge only the masked fields into the current
//! state, leaving everything else untouched.
//!
//! # Example
//!
//! ```
//! use athanor_sdk::mask::{compute_mask, UpdateMaskField};
//! use athanor_sdk::value::Value;
//!
//! let old = Value::map([("a", "1"), ("b", "2")]);
//! let new = Value::map([("a", "1"), ("c", "3")]);
//!
//! let mask = compute_mask(&old, &new).unwrap();
//! assert_eq!(mask, vec![UpdateMaskField::delete("b"), UpdateMaskField::update("c")]);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::generated;
use crate::value::Value;

/// What happened to a masked field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// The field was added or changed and should be applied.
    Update,
    /// The field was removed and should be cleared, along with its subtree.
    Delete,
}

/// One node of an update mask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateMaskField {
    /// The field name within its parent map.
    pub name: String,
    /// How the field changed.
    pub operation: Operation,
    /// Changed children of a map field.
    ///
    /// Empty for leaves. Ignored under a `Delete`, which always removes
    /// the whole subtree.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_fields: Vec<UpdateMaskField>,
}

impl UpdateMaskField {
    /// An `Update` leaf.
    pub fn update(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operation: Operation::Update,
            sub_fields: Vec::new(),
        }
    }

    /// A `Delete` leaf.
    pub fn delete(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operation: Operation::Delete,
            sub_fields: Vec::new(),
        }
    }

    /// Attach changed children.
    pub fn with_sub_fields(mut self, sub_fields: Vec<UpdateMaskField>) -> Self {
        self.sub_fields = sub_fields;
        self
    }
}

/// Compare two config trees and list the fields that changed.
///
/// Both values must be maps (`Nil` counts as an empty map). Nested maps
/// are compared recursively; any other differing value, including an
/// `Immutable` one, is reported as a leaf `Update`. Fields are listed in
/// name order.
pub fn compute_mask(old: &Value, new: &Value) -> Result<Vec<UpdateMaskField>, ProviderError> {
    let empty = BTreeMap::new();
    let old = map_or_empty(old.inner(), &empty)?;
    let new = map_or_empty(new.inner(), &empty)?;
    Ok(diff_maps(old, new))
}

fn map_or_empty<'a>(
    value: &'a Value,
    empty: &'a BTreeMap<String, Value>,
) -> Result<&'a BTreeMap<String, Value>, ProviderError> {
    match value {
        Value::Nil => Ok(empty),
        Value::Map(map) => Ok(map),
        other => Err(ProviderError::internal(format!(
            "update masks are computed over maps, got {}",
            other.kind()
        ))),
    }
}

fn diff_maps(old: &BTreeMap<String, Value>, new: &BTreeMap<String, Value>) -> Vec<UpdateMaskField> {
    let names: BTreeSet<&String> = old.keys().chain(new.keys()).collect();

    let mut mask = Vec::new();
    for name in names {
        match (old.get(name), new.get(name)) {
            (Some(_), None) => mask.push(UpdateMaskField::delete(name.as_str())),
            (None, Some(_)) => mask.push(UpdateMaskField::update(name.as_str())),
            (Some(before), Some(after)) if before == after => {}
            (Some(Value::Map(before)), Some(Value::Map(after))) => {
                mask.push(
                    UpdateMaskField::update(name.as_str())
                        .with_sub_fields(diff_maps(before, after)),
                );
            }
            (Some(_), Some(_)) => mask.push(UpdateMaskField::update(name.as_str())),
            (None, None) => {}
        }
    }
    mask
}

/// Merge the masked fields of `desired` into `current`.
///
/// * `Delete` removes the field and its whole subtree; its sub-fields are
///   not looked at.
/// * `Update` without sub-fields replaces the field with the desired value.
/// * `Update` with sub-fields recurses and applies only those children.
///
/// Fields not named in the mask keep their current value.
pub fn apply_mask(
    current: &Value,
    desired: &Value,
    mask: &[UpdateMaskField],
) -> Result<Value, ProviderError> {
    let empty = BTreeMap::new();
    let mut result = map_or_empty(current.inner(), &empty)?.clone();
    let desired = map_or_empty(desired.inner(), &empty)?;

    for field in mask {
        match field.operation {
            Operation::Delete => {
                result.remove(&field.name);
            }
            Operation::Update => {
                let new = desired.get(&field.name).ok_or_else(|| {
                    ProviderError::internal(format!(
                        "update mask names field '{}' which is not in the config",
                        field.name
                    ))
                })?;

                let merged = if field.sub_fields.is_empty() {
                    new.clone()
                } else {
                    let existing = result.get(&field.name).unwrap_or(&Value::Nil);
                    apply_mask(existing, new, &field.sub_fields)?
                };
                result.insert(field.name.clone(), merged);
            }
        }
    }

    Ok(Value::Map(result))
}

/// Reject a mask that updates a field marked [`Value::Immutable`] in `config`.
pub fn check_immutable(config: &Value, mask: &[UpdateMaskField]) -> Result<(), ProviderError> {
    check_immutable_at(config, mask, "")
}

fn check_immutable_at(
    config: &Value,
    mask: &[UpdateMaskField],
    path: &str,
) -> Result<(), ProviderError> {
    let Value::Map(entries) = config.inner() else {
        return Ok(());
    };

    for field in mask.iter().filter(|f| f.operation == Operation::Update) {
        let field_path = if path.is_empty() {
            field.name.clone()
        } else {
            format!("{}.{}", path, field.name)
        };

        match entries.get(&field.name) {
            Some(value) if value.is_immutable() => {
                return Err(ProviderError::internal(format!(
                    "field '{}' is immutable and cannot be updated",
                    field_path
                )));
            }
            Some(value) => check_immutable_at(value, &field.sub_fields, &field_path)?,
            None => {}
        }
    }
    Ok(())
}

// =========================================================================
// Wire conversion
// =========================================================================

impl From<&UpdateMaskField> for generated::Field {
    fn from(field: &UpdateMaskField) -> Self {
        let operation = match field.operation {
            Operation::Update => generated::Operation::Update,
            Operation::Delete => generated::Operation::Delete,
        };
        Self {
            name: field.name.clone(),
            operation: operation as i32,
            sub_fields: field.sub_fields.iter().map(Into::into).collect(),
        }
    }
}

impl TryFrom<generated::Field> for UpdateMaskField {
    type Error = ProviderError;

    fn try_from(proto: generated::Field) -> Result<Self, Self::Error> {
        let operation = match generated::Operation::try_from(proto.operation) {
            Ok(generated::Operation::Update) => Operation::Update,
            Ok(generated::Operation::Delete) => Operation::Delete,
            Ok(generated::Operation::Unspecified) | Err(_) => {
                return Err(ProviderError::internal(format!(
                    "update mask field '{}' has invalid operation {}",
                    proto.name, proto.operation
                )));
            }
        };

        Ok(Self {
            name: proto.name,
            operation,
            sub_fields: mask_from_proto(proto.sub_fields)?,
        })
    }
}

/// Convert a mask to its wire representation.
pub fn mask_to_proto(mask: &[UpdateMaskField]) -> Vec<generated::Field> {
    mask.iter().map(Into::into).collect()
}

/// Parse a mask from its wire representation.
pub fn mask_from_proto(
    fields: Vec<generated::Field>,
) -> Result<Vec<UpdateMaskField>, ProviderError> {
    fields.into_iter().map(UpdateMaskField::try_from).collect()
}
