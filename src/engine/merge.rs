//! Deep merge of intersection outputs.

use crate::path::{Path, PathSegment};
use crate::value::{Object, Value};

/// Merges the outputs of both sides of an intersection.
///
/// Equal values merge to themselves; objects merge key by key; arrays of
/// equal length merge element by element. Anything else is a conflict,
/// reported at the path where the two sides disagree.
pub(crate) fn merge_values(left: Value, right: Value) -> Result<Value, Path> {
    if left == right {
        return Ok(left);
    }
    match (left, right) {
        (Value::Object(left), Value::Object(right)) => merge_objects(left, right),
        (Value::Array(left), Value::Array(right)) => {
            if left.len() != right.len() {
                return Err(Path::root());
            }
            let mut merged = Vec::with_capacity(left.len());
            for (index, (l, r)) in left.into_iter().zip(right).enumerate() {
                let value = merge_values(l, r).map_err(|mut path| {
                    path.prepend(PathSegment::Index(index));
                    path
                })?;
                merged.push(value);
            }
            Ok(Value::Array(merged))
        }
        _ => Err(Path::root()),
    }
}

fn merge_objects(mut left: Object, right: Object) -> Result<Value, Path> {
    for (key, r) in right {
        match left.get_mut(&key) {
            Some(slot) => {
                let l = std::mem::take(slot);
                *slot = merge_values(l, r).map_err(|mut path| {
                    path.prepend(PathSegment::Key(key.clone()));
                    path
                })?;
            }
            None => {
                left.insert(key, r);
            }
        }
    }
    Ok(Value::Object(left))
}
