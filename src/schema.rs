//! Field classification.
//!
//! Each field is tagged once, at initialization, as either domain data or
//! provenance (audit metadata describing who changed what, when, why and how).
//! Provenance fields are carried alongside the data but never make a form
//! dirty and are submitted as a separate payload.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::path::FieldPath;

/// Top-level names classified as provenance by [`FormSchema::default`].
pub const PROVENANCE_FIELDS: [&str; 5] = ["what", "when", "who", "why", "how"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Data,
    Provenance,
}

impl FieldKind {
    pub fn is_provenance(self) -> bool {
        self == FieldKind::Provenance
    }
}

/// Maps top-level field names to their [`FieldKind`].
///
/// Names that are not listed are [`FieldKind::Data`]. The default schema lists
/// the audit names in [`PROVENANCE_FIELDS`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormSchema {
    kinds: FxHashMap<Box<str>, FieldKind>,
}

impl Default for FormSchema {
    fn default() -> Self {
        let mut schema = FormSchema::empty();
        for name in PROVENANCE_FIELDS {
            schema = schema.with_kind(name, FieldKind::Provenance);
        }
        schema
    }
}

impl FormSchema {
    /// A schema that classifies every field as data.
    pub fn empty() -> Self {
        FormSchema {
            kinds: FxHashMap::default(),
        }
    }

    /// Tag every field under the top-level name `name` as `kind`.
    pub fn with_kind(mut self, name: impl Into<Box<str>>, kind: FieldKind) -> Self {
        self.kinds.insert(name.into(), kind);
        self
    }

    pub fn kind_of(&self, path: &FieldPath) -> FieldKind {
        self.kinds.get(path.top()).copied().unwrap_or_default()
    }
}
