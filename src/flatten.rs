//! Conversion between nested records and the flat field keyspace.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::{entry::FieldEntry, path::FieldPath};

/// Flatten a nested record into leaf paths.
///
/// Objects are walked recursively; every other non-null value (scalars and
/// arrays alike) is a leaf. `null` leaves and empty objects produce nothing.
/// Output order follows the record's key order.
pub fn flatten(record: &Map<String, Value>) -> IndexMap<FieldPath, Value> {
    let mut out = IndexMap::new();
    for (key, value) in record {
        flatten_into(FieldPath::root(key.as_str()), value, &mut out);
    }
    out
}

fn flatten_into(path: FieldPath, value: &Value, out: &mut IndexMap<FieldPath, Value>) {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(path.child(key.as_str()), child, out);
            }
        }
        leaf => {
            out.insert(path, leaf.clone());
        }
    }
}

/// Rebuild a nested record from `paths`, reading each leaf's current value
/// from `fields`.
///
/// Intermediate objects are created as needed, so the result does not depend
/// on the order of `paths`. A path missing from `fields` contributes `""`.
/// If two paths overlap (one prefixes the other) the one placed first is kept
/// and the other is dropped with a warning.
pub fn unflatten<'a>(
    paths: impl IntoIterator<Item = &'a FieldPath>,
    fields: &IndexMap<FieldPath, FieldEntry>,
) -> Map<String, Value> {
    let mut root = Map::new();
    for path in paths {
        let value = fields
            .get(path)
            .map_or_else(|| Value::String(String::new()), |entry| entry.value.clone());
        insert_at(&mut root, path, value);
    }
    root
}

fn insert_at(root: &mut Map<String, Value>, path: &FieldPath, value: Value) {
    let Some((leaf, parents)) = path.segments().split_last() else {
        return;
    };

    let mut node = root;
    for segment in parents {
        node = match node
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()))
        {
            Value::Object(map) => map,
            _ => {
                tracing::warn!(%path, "field overlaps a shorter field; dropped");
                return;
            }
        };
    }

    if matches!(node.get(&**leaf), Some(Value::Object(_))) {
        tracing::warn!(%path, "field overlaps a nested field; dropped");
        return;
    }
    node.insert(leaf.to_string(), value);
}
