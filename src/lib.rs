//! # Floem Form
//!
//! Controlled form state for [Floem](https://github.com/lapce/floem) with
//! per-field subscriptions.
//!
//! A form edits a nested record. The record is flattened into a
//! [`FieldStore`], one [`FieldEntry`] per leaf, each remembering its value at
//! initialization. Controls are bound to single fields through
//! [`FieldBinder`]s and only re-render when their own field changes; the
//! dirty flag is derived from the store and only reported when it flips. On
//! submit the store is reassembled into nested `data` and `prov` payloads,
//! with provenance (audit) fields kept apart from the domain data.
//!
//! ```rust
//! use floem_form::{FieldProps, Form};
//! use serde_json::json;
//!
//! let record = json!({ "name": "abi-1", "address": { "city": "X", "zip": "1" } });
//! let form = Form::new(record.as_object().unwrap().clone()).unwrap();
//!
//! let zip = form.bind("address:zip", |props: FieldProps<'_>| {
//!     let _ = props.value;
//! });
//! let city = form.bind("address:city", |_: FieldProps<'_>| {});
//!
//! zip.change_handle().on_change(floem_form::ChangeEvent::new("2"));
//! assert_eq!(zip.render_count(), 2);
//! assert_eq!(city.render_count(), 1);
//!
//! let modified = form.modified_data().unwrap();
//! assert_eq!(modified.data["address"], json!({ "zip": "2" }));
//! ```

mod assemble;
mod binder;
mod dirty;
mod entry;
mod error;
mod flatten;
mod form;
mod options;
mod path;
mod policy;
mod reactive;
mod schema;
mod store;

pub use assemble::FormData;
pub use binder::{BinderOptions, ChangeEvent, ChangeHandle, FieldBinder, FieldControl, FieldProps};
pub use dirty::DirtyTracker;
pub use entry::{FieldEntry, FieldSeed, FieldView};
pub use error::FormError;
pub use flatten::{flatten, unflatten};
pub use form::{Form, FormBuilder, Problem};
pub use options::FormOptions;
pub use path::{FieldPath, SEPARATOR};
pub use policy::ChangePolicy;
pub use reactive::{DirtySignal, FieldSignal};
pub use schema::{FieldKind, FormSchema, PROVENANCE_FIELDS};
pub use store::{FieldStore, FormAction, StoreEvent, Subscription, WeakFieldStore};
