use serde_json::Value;

use crate::schema::FieldKind;

/// State of one field in a [`FieldStore`](crate::FieldStore).
///
/// `initial_value` is fixed at initialization; ordinary edits only replace
/// `value`. The default entry (all `null`, no error) is what reading an
/// unknown path returns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldEntry {
    pub value: Value,
    pub initial_value: Value,
    pub error: Option<String>,
    pub kind: FieldKind,
}

impl FieldEntry {
    pub(crate) fn from_seed(seed: FieldSeed, kind: FieldKind) -> Self {
        FieldEntry {
            initial_value: seed.value.clone(),
            value: seed.value,
            error: seed.error,
            kind,
        }
    }
}

/// A value and optional error used to seed one field at initialization.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldSeed {
    pub value: Value,
    pub error: Option<String>,
}

impl FieldSeed {
    pub fn new(value: impl Into<Value>) -> Self {
        FieldSeed {
            value: value.into(),
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

impl From<Value> for FieldSeed {
    fn from(value: Value) -> Self {
        FieldSeed::new(value)
    }
}

/// The part of an entry a bound field control renders.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldView {
    pub value: Value,
    pub error: Option<String>,
    pub disabled: bool,
}
