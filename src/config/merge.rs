//! Configuration merge logic
//!
//! Layers are merged with:
//! - Objects: deep-merge by key
//! - Arrays: REPLACE (last wins)
//! - Scalars: override (last wins)

use serde_json::Value;

/// Deepest object nesting the merge will follow (serde_json's own parse limit).
pub const MAX_MERGE_DEPTH: usize = 128;

/// Merge failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    /// Nesting runs deeper than any real configuration; treated as a
    /// self-referential structure.
    #[error("Merge exceeded nesting depth {limit} at '{path}' (cyclic or runaway configuration)")]
    DepthExceeded { path: String, limit: usize },
}

/// Deep merge two JSON values.
///
/// Merge semantics:
/// - Objects: deep-merge by key (recursive)
/// - Arrays: REPLACE (overlay wins entirely, no concatenation)
/// - Scalars: override (overlay wins)
/// - Null: override (null can override any value)
pub fn deep_merge(base: Value, overlay: Value) -> Result<Value, MergeError> {
    merge_at(base, overlay, &mut Vec::new())
}

fn merge_at(base: Value, overlay: Value, path: &mut Vec<String>) -> Result<Value, MergeError> {
    match (base, overlay) {
        // Both objects: deep merge
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            if path.len() >= MAX_MERGE_DEPTH {
                return Err(MergeError::DepthExceeded {
                    path: path.join("."),
                    limit: MAX_MERGE_DEPTH,
                });
            }

            // Existing keys are merged in place so key order follows the base
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(base_value) => {
                        path.push(key.clone());
                        *base_value = merge_at(base_value.take(), overlay_value, path)?;
                        path.pop();
                    }
                    None => {
                        base_map.insert(key, overlay_value);
                    }
                }
            }
            Ok(Value::Object(base_map))
        }

        // Arrays, scalars and mixed kinds: overlay wins
        (_, overlay) => Ok(overlay),
    }
}

/// Merge multiple config layers in order (first is base, last has highest precedence)
pub fn merge_layers(layers: Vec<Value>) -> Result<Value, MergeError> {
    layers
        .into_iter()
        .try_fold(Value::Null, deep_merge)
}
