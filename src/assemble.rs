//! Submission payloads.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{flatten::unflatten, store::FieldStore};

/// The two payloads handed to a submission: domain data and provenance.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FormData {
    pub data: Map<String, Value>,
    pub prov: Map<String, Value>,
}

impl FieldStore {
    /// Every field, reassembled into nested `data` and `prov` records.
    pub fn data(&self) -> FormData {
        self.assemble(|_, _| true)
    }

    /// Only the changed fields, reassembled like [`FieldStore::data`].
    ///
    /// Returns `None` when no data field changed: provenance edits on their
    /// own are not something to submit.
    pub fn modified_data(&self) -> Option<FormData> {
        let policy = self.inner.options.change_policy;
        let modified = self.assemble(|value, initial| policy.changed(value, initial));
        if modified.data.is_empty() {
            None
        } else {
            Some(modified)
        }
    }

    fn assemble(&self, include: impl Fn(&Value, &Value) -> bool) -> FormData {
        let fields = self.inner.fields.borrow();
        let mut data = Vec::new();
        let mut prov = Vec::new();
        for (path, entry) in fields.iter() {
            if !include(&entry.value, &entry.initial_value) {
                continue;
            }
            if entry.kind.is_provenance() {
                prov.push(path);
            } else {
                data.push(path);
            }
        }

        FormData {
            data: unflatten(data, &fields),
            prov: unflatten(prov, &fields),
        }
    }
}
