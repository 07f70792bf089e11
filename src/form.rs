//! The owning form.
//!
//! A [`Form`] ties a [`FieldStore`] to the nested record it edits. It rebuilds
//! the store whenever the record changes, restores it on reset, and takes the
//! outcome of a submission back in.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::{
    assemble::FormData,
    binder::{BinderOptions, FieldBinder, FieldControl},
    dirty::DirtyTracker,
    entry::FieldSeed,
    error::FormError,
    flatten::flatten,
    options::FormOptions,
    path::FieldPath,
    store::FieldStore,
};

/// A rejected submission.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Problem {
    pub message: Option<String>,
    pub field_errors: Vec<(FieldPath, String)>,
}

impl Problem {
    pub fn new(message: impl Into<String>) -> Self {
        Problem {
            message: Some(message.into()),
            field_errors: Vec::new(),
        }
    }

    pub fn field_error(mut self, path: impl Into<FieldPath>, message: impl Into<String>) -> Self {
        self.field_errors.push((path.into(), message.into()));
        self
    }
}

pub struct FormBuilder {
    source: Map<String, Value>,
    overrides: IndexMap<FieldPath, FieldSeed>,
    options: FormOptions,
}

impl FormBuilder {
    /// Seed `path` directly, bypassing (and winning over) the flattened record.
    pub fn override_field(
        mut self,
        path: impl Into<FieldPath>,
        seed: impl Into<FieldSeed>,
    ) -> Self {
        self.overrides.insert(path.into(), seed.into());
        self
    }

    pub fn options(mut self, options: FormOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<Form, FormError> {
        let form = Form {
            store: FieldStore::new(self.options),
            source: self.source,
            overrides: self.overrides,
            problem: None,
        };
        form.store.initialize(form.seeds(&form.source))?;
        Ok(form)
    }
}

/// One form instance and the record it edits.
///
/// # Example
///
/// ```rust
/// use floem_form::Form;
/// use serde_json::json;
///
/// let record = json!({ "name": "abi-1", "status": "live" });
/// let form = Form::new(record.as_object().unwrap().clone()).unwrap();
///
/// form.store().update_field("name", json!("abi-2"));
/// assert!(form.is_dirty());
/// assert_eq!(form.modified_data().unwrap().data["name"], json!("abi-2"));
///
/// form.reset().unwrap();
/// assert!(!form.is_dirty());
/// ```
pub struct Form {
    store: FieldStore,
    source: Map<String, Value>,
    overrides: IndexMap<FieldPath, FieldSeed>,
    problem: Option<Problem>,
}

impl Form {
    pub fn new(source: Map<String, Value>) -> Result<Self, FormError> {
        Self::builder(source).build()
    }

    pub fn builder(source: Map<String, Value>) -> FormBuilder {
        FormBuilder {
            source,
            overrides: IndexMap::new(),
            options: FormOptions::default(),
        }
    }

    pub fn store(&self) -> &FieldStore {
        &self.store
    }

    /// The record the fields were last initialized from.
    pub fn source(&self) -> &Map<String, Value> {
        &self.source
    }

    /// The last rejected submission, until the next successful one.
    pub fn problem(&self) -> Option<&Problem> {
        self.problem.as_ref()
    }

    fn seeds(&self, source: &Map<String, Value>) -> IndexMap<FieldPath, FieldSeed> {
        let mut seeds: IndexMap<FieldPath, FieldSeed> = flatten(source)
            .into_iter()
            .map(|(path, value)| (path, FieldSeed::new(value)))
            .collect();
        for (path, seed) in &self.overrides {
            seeds.insert(path.clone(), seed.clone());
        }
        seeds
    }

    /// Point the form at a new record.
    ///
    /// The store is rebuilt only if `source` differs from the current record;
    /// the return value says whether it was. On error nothing changes.
    pub fn set_source(&mut self, source: Map<String, Value>) -> Result<bool, FormError> {
        if source == self.source {
            return Ok(false);
        }
        self.store.initialize(self.seeds(&source))?;
        self.source = source;
        Ok(true)
    }

    /// Discard every edit by re-initializing from the current record.
    pub fn reset(&self) -> Result<(), FormError> {
        self.store.initialize(self.seeds(&self.source))
    }

    pub fn data(&self) -> FormData {
        self.store.data()
    }

    pub fn modified_data(&self) -> Option<FormData> {
        self.store.modified_data()
    }

    pub fn is_dirty(&self) -> bool {
        self.store.is_dirty()
    }

    /// Whether navigating away would lose nothing.
    pub fn can_leave(&self) -> bool {
        !self.store.is_dirty()
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.store.set_disabled(disabled);
    }

    pub fn bind<C>(&self, path: impl Into<FieldPath>, control: C) -> FieldBinder<C>
    where
        C: FieldControl + 'static,
    {
        self.store.bind(path, control)
    }

    pub fn bind_with<C>(
        &self,
        path: impl Into<FieldPath>,
        options: BinderOptions,
        control: C,
    ) -> FieldBinder<C>
    where
        C: FieldControl + 'static,
    {
        self.store.bind_with(path, options, control)
    }

    pub fn track_dirty(&self, render: impl FnMut(bool) + 'static) -> DirtyTracker {
        self.store.track_dirty(render)
    }

    /// Take the outcome of a submission back in.
    ///
    /// On success the returned record becomes the new source and the form is
    /// clean again. On failure the values stay as edited, previous errors are
    /// cleared and the problem's field errors are shown.
    pub fn finish_submit(
        &mut self,
        outcome: Result<Map<String, Value>, Problem>,
    ) -> Result<(), FormError> {
        match outcome {
            Ok(record) => {
                self.problem = None;
                if !self.set_source(record)? {
                    self.reset()?;
                }
            }
            Err(problem) => {
                tracing::debug!(
                    reason = problem.message.as_deref().unwrap_or_default(),
                    fields = problem.field_errors.len(),
                    "submission rejected"
                );
                self.store.batch(|| {
                    self.store.clear_errors();
                    for (path, message) in &problem.field_errors {
                        self.store.set_error(path.clone(), Some(message.clone()));
                    }
                });
                self.problem = Some(problem);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn overrides_win_over_flattened_values() {
        let form = Form::builder(object(json!({ "name": "abi-1", "status": "live" })))
            .override_field("status", FieldSeed::new("dead").with_error("cannot edit"))
            .override_field("why", json!(""))
            .build()
            .unwrap();
        let status = form.store().field("status");
        assert_eq!(status.value, json!("dead"));
        assert_eq!(status.initial_value, json!("dead"));
        assert_eq!(status.error.as_deref(), Some("cannot edit"));
        assert!(form.store().contains("why"));
        assert!(!form.is_dirty());
    }

    #[test]
    fn colliding_override_is_rejected() {
        let err = Form::builder(object(json!({ "address": { "city": "X" } })))
            .override_field("address", json!("flat"))
            .build()
            .err();
        assert!(matches!(err, Some(FormError::PathCollision { .. })));
    }

    #[test]
    fn set_source_rebuilds_only_on_change() {
        let mut form = Form::new(object(json!({ "name": "abi-1" }))).unwrap();
        form.store().update_field("name", json!("edited"));

        assert!(!form.set_source(object(json!({ "name": "abi-1" }))).unwrap());
        assert_eq!(form.store().field("name").value, json!("edited"));

        assert!(form.set_source(object(json!({ "name": "abi-3" }))).unwrap());
        assert_eq!(form.store().field("name").value, json!("abi-3"));
        assert!(!form.is_dirty());
    }

    #[test]
    fn failed_set_source_keeps_previous_state() {
        let mut form = Form::builder(object(json!({ "name": "abi-1" })))
            .override_field("address", json!("flat"))
            .build()
            .unwrap();
        let err = form.set_source(object(json!({ "address": { "city": "X" } })));
        assert!(err.is_err());
        assert_eq!(form.source(), &object(json!({ "name": "abi-1" })));
        assert_eq!(form.store().field("name").value, json!("abi-1"));
    }

    #[test]
    fn successful_submit_cleans_the_form() {
        let mut form = Form::new(object(json!({ "name": "abi-1", "why": "" }))).unwrap();
        form.store().update_field("name", json!("abi-2"));
        form.store().update_field("why", json!("rename"));
        assert!(!form.can_leave());

        let sent = form.modified_data().unwrap();
        let mut saved = object(json!({ "why": "" }));
        saved.extend(sent.data);
        form.finish_submit(Ok(saved)).unwrap();

        assert!(form.can_leave());
        assert_eq!(form.store().field("name").initial_value, json!("abi-2"));
        assert_eq!(form.store().field("why").value, json!(""));
    }

    #[test]
    fn submit_returning_same_record_still_resets() {
        let mut form = Form::new(object(json!({ "name": "abi-1" }))).unwrap();
        form.store().update_field("name", json!("typo"));
        form.finish_submit(Ok(object(json!({ "name": "abi-1" })))).unwrap();
        assert!(!form.is_dirty());
    }

    #[test]
    fn rejected_submit_shows_field_errors() {
        let mut form = Form::new(object(json!({ "name": "abi-1", "status": "live" }))).unwrap();
        form.store().set_error("status", Some("stale".into()));
        form.store().update_field("name", json!("abi 2"));

        let problem = Problem::new("invalid").field_error("name", "must not contain spaces");
        form.finish_submit(Err(problem.clone())).unwrap();

        assert_eq!(
            form.store().field("name").error.as_deref(),
            Some("must not contain spaces")
        );
        assert_eq!(form.store().field("status").error, None);
        assert_eq!(form.store().field("name").value, json!("abi 2"));
        assert_eq!(form.problem(), Some(&problem));
        assert!(form.is_dirty());
    }
}
