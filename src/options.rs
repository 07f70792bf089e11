use serde::{Deserialize, Serialize};

use crate::{policy::ChangePolicy, schema::FormSchema};

/// Per-form configuration.
///
/// Built in code with the builder methods, or deserialized from an
/// application config; missing keys fall back to the defaults.
///
/// ```rust
/// use floem_form::{ChangePolicy, FieldKind, FormOptions, FormSchema};
///
/// let options = FormOptions::default()
///     .change_policy(ChangePolicy::Strict)
///     .schema(FormSchema::default().with_kind("reason", FieldKind::Provenance));
/// assert_eq!(options.change_policy, ChangePolicy::Strict);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormOptions {
    pub change_policy: ChangePolicy,
    pub schema: FormSchema,
}

impl FormOptions {
    pub fn change_policy(mut self, policy: ChangePolicy) -> Self {
        self.change_policy = policy;
        self
    }

    pub fn schema(mut self, schema: FormSchema) -> Self {
        self.schema = schema;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::FieldPath;

    #[test]
    fn missing_keys_use_defaults() {
        let options: FormOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, FormOptions::default());
        assert!(options.schema.kind_of(&FieldPath::from("why")).is_provenance());
    }

    #[test]
    fn reads_policy_from_config() {
        let options: FormOptions = serde_json::from_str(r#"{"change_policy": "strict"}"#).unwrap();
        assert_eq!(options.change_policy, ChangePolicy::Strict);
    }
}
