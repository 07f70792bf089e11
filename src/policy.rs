use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// How a field's current value is compared with its initial value.
///
/// The comparison decides both whether a form is dirty and which fields make
/// it into [`modified_data`](crate::FieldStore::modified_data).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangePolicy {
    /// Compares what a text control would show. `null`, `false`, `0` and `""`
    /// all mean "no value", and other scalars compare by their text, so `5`
    /// and `"5"` are the same. Arrays and objects compare structurally.
    #[default]
    Loose,
    /// Only `null` and `""` are interchangeable. Everything else compares
    /// structurally, so `0` and `false` are real values.
    Nullish,
    /// Plain structural equality; clearing a field to `""` is a change.
    Strict,
}

impl ChangePolicy {
    pub fn unchanged(self, value: &Value, initial: &Value) -> bool {
        match self {
            ChangePolicy::Strict => value == initial,
            ChangePolicy::Nullish => (is_blank(value) && is_blank(initial)) || value == initial,
            ChangePolicy::Loose => Shown::of(value) == Shown::of(initial),
        }
    }

    pub fn changed(self, value: &Value, initial: &Value) -> bool {
        !self.unchanged(value, initial)
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// A value as a text control displays it.
#[derive(PartialEq)]
enum Shown<'a> {
    Text(Cow<'a, str>),
    Nested(&'a Value),
}

impl<'a> Shown<'a> {
    fn of(value: &'a Value) -> Self {
        match value {
            Value::Null | Value::Bool(false) => Shown::Text(Cow::Borrowed("")),
            Value::Bool(true) => Shown::Text(Cow::Borrowed("true")),
            Value::Number(number) => Shown::Text(number_text(number)),
            Value::String(s) => Shown::Text(Cow::Borrowed(s.as_str())),
            Value::Array(_) | Value::Object(_) => Shown::Nested(value),
        }
    }
}

/// Largest float that still converts to an integer exactly.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

fn number_text(number: &Number) -> Cow<'static, str> {
    match number.as_f64() {
        Some(f) if f == 0.0 => Cow::Borrowed(""),
        // `5.0` shows as `5`.
        Some(f) if number.is_f64() && f.fract() == 0.0 && f.abs() < MAX_EXACT_FLOAT => {
            Cow::Owned((f as i64).to_string())
        }
        _ => Cow::Owned(number.to_string()),
    }
}
