//! Central field store.
//!
//! A [`FieldStore`] owns every field of one form. Readers subscribe to it and
//! re-read the fields they care about when notified; writers go through
//! [`FieldStore::update_field`], [`FieldStore::initialize`] or
//! [`FieldStore::dispatch`]. Keeping the state outside the view tree means an
//! edit only re-renders the controls whose field actually changed.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    fmt,
    rc::{Rc, Weak},
};

use indexmap::IndexMap;
use serde_json::Value;

use crate::{
    entry::{FieldEntry, FieldSeed, FieldView},
    error::FormError,
    options::FormOptions,
    path::FieldPath,
};

/// Change notification delivered to store listeners.
#[derive(Clone, Debug, PartialEq)]
pub enum StoreEvent {
    /// The whole store was rebuilt.
    Initialized,
    /// The value at this path was replaced.
    FieldChanged(FieldPath),
    /// The error at this path was set or cleared.
    ErrorChanged(FieldPath),
    /// The form-wide disabled flag flipped.
    DisabledChanged,
}

/// A write request, for callers that prefer a single dispatch entry point.
#[derive(Clone, Debug, PartialEq)]
pub enum FormAction {
    Initialize(IndexMap<FieldPath, FieldSeed>),
    UpdateField { path: FieldPath, value: Value },
    SetError { path: FieldPath, error: Option<String> },
    SetDisabled(bool),
}

type Listener = Rc<dyn Fn(&StoreEvent)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct ListenerId(u64);

/// State shared between a store handle and the subscriptions derived from it.
pub(crate) struct StoreInner {
    pub(crate) fields: RefCell<IndexMap<FieldPath, FieldEntry>>,
    pub(crate) disabled: Cell<bool>,
    pub(crate) options: FormOptions,
    listeners: RefCell<IndexMap<ListenerId, Listener>>,
    next_listener: Cell<u64>,
    /// Events waiting to be delivered, in issue order.
    pending: RefCell<VecDeque<StoreEvent>>,
    delivering: Cell<bool>,
    batch_depth: Cell<usize>,
}

impl StoreInner {
    fn new(options: FormOptions) -> Self {
        Self {
            fields: RefCell::new(IndexMap::new()),
            disabled: Cell::new(false),
            options,
            listeners: RefCell::new(IndexMap::new()),
            next_listener: Cell::new(0),
            pending: RefCell::new(VecDeque::new()),
            delivering: Cell::new(false),
            batch_depth: Cell::new(0),
        }
    }
}

/// The single source of truth for the fields of one form.
///
/// `FieldStore` is a cheap `Rc` handle: clones share the same fields. All
/// notifications are synchronous; by the time a write returns, every listener
/// has observed it.
///
/// # Example
///
/// ```rust
/// use floem_form::{FieldPath, FieldSeed, FieldStore};
/// use serde_json::json;
///
/// let store = FieldStore::default();
/// store
///     .initialize([(FieldPath::from("name"), FieldSeed::new("abi-1"))])
///     .unwrap();
///
/// store.update_field("name", json!("abi-2"));
/// assert_eq!(store.field("name").value, json!("abi-2"));
/// assert_eq!(store.field("name").initial_value, json!("abi-1"));
/// assert!(store.is_dirty());
/// ```
#[derive(Clone)]
pub struct FieldStore {
    pub(crate) inner: Rc<StoreInner>,
}

impl Default for FieldStore {
    fn default() -> Self {
        Self::new(FormOptions::default())
    }
}

impl fmt::Debug for FieldStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldStore")
            .field("fields", &self.inner.fields.borrow().len())
            .field("listeners", &self.inner.listeners.borrow().len())
            .field("disabled", &self.inner.disabled.get())
            .finish()
    }
}

impl FieldStore {
    pub fn new(options: FormOptions) -> Self {
        Self {
            inner: Rc::new(StoreInner::new(options)),
        }
    }

    pub fn options(&self) -> &FormOptions {
        &self.inner.options
    }

    /// Replace every field with `seeds`.
    ///
    /// Each seed becomes both the value and the initial value of its field, and
    /// is tagged with its [`FieldKind`](crate::FieldKind) from the schema. If
    /// one path prefixes another the store is left untouched and
    /// [`FormError::PathCollision`] is returned.
    pub fn initialize<I>(&self, seeds: I) -> Result<(), FormError>
    where
        I: IntoIterator<Item = (FieldPath, FieldSeed)>,
    {
        let seeds: IndexMap<FieldPath, FieldSeed> = seeds.into_iter().collect();
        check_collisions(seeds.keys())?;

        let schema = &self.inner.options.schema;
        let fields: IndexMap<FieldPath, FieldEntry> = seeds
            .into_iter()
            .map(|(path, seed)| {
                let kind = schema.kind_of(&path);
                (path, FieldEntry::from_seed(seed, kind))
            })
            .collect();

        tracing::debug!(fields = fields.len(), "form store initialized");
        *self.inner.fields.borrow_mut() = fields;
        self.emit(StoreEvent::Initialized);
        Ok(())
    }

    /// Replace the current value of one field.
    ///
    /// Neither the initial value nor the error is touched. Writing to a path
    /// that was never initialized creates a sparse entry whose initial value
    /// is `null`, unless that path would nest inside (or around) an existing
    /// field, in which case the write is dropped.
    pub fn update_field(&self, path: impl Into<FieldPath>, value: impl Into<Value>) {
        let path: FieldPath = path.into();
        let value: Value = value.into();
        {
            let mut fields = self.inner.fields.borrow_mut();
            if let Some(entry) = fields.get_mut(&path) {
                entry.value = value;
            } else if let Some(existing) = fields
                .keys()
                .find(|existing| existing.is_prefix_of(&path) || path.is_prefix_of(existing))
            {
                tracing::warn!(%path, %existing, "update would overlap an existing field; ignored");
                return;
            } else {
                tracing::warn!(%path, "update to unknown field; creating sparse entry");
                let kind = self.inner.options.schema.kind_of(&path);
                fields.insert(
                    path.clone(),
                    FieldEntry {
                        value,
                        kind,
                        ..FieldEntry::default()
                    },
                );
            }
        }
        tracing::trace!(%path, "field updated");
        self.emit(StoreEvent::FieldChanged(path));
    }

    /// Set or clear the validation message of a field.
    ///
    /// Errors are supplied from outside (usually a rejected submission). An
    /// error for a path the store does not hold is dropped.
    pub fn set_error(&self, path: impl Into<FieldPath>, error: Option<String>) {
        let path: FieldPath = path.into();
        let changed = {
            let mut fields = self.inner.fields.borrow_mut();
            match fields.get_mut(&path) {
                Some(entry) if entry.error != error => {
                    entry.error = error;
                    true
                }
                Some(_) => false,
                None => {
                    tracing::warn!(%path, "error for unknown field ignored");
                    false
                }
            }
        };
        if changed {
            self.emit(StoreEvent::ErrorChanged(path));
        }
    }

    /// Clear every field error.
    pub fn clear_errors(&self) {
        let cleared: Vec<FieldPath> = self
            .inner
            .fields
            .borrow_mut()
            .iter_mut()
            .filter_map(|(path, entry)| entry.error.take().map(|_| path.clone()))
            .collect();
        self.batch(|| {
            for path in cleared {
                self.emit(StoreEvent::ErrorChanged(path));
            }
        });
    }

    /// Set the form-wide disabled flag seen by every bound control.
    pub fn set_disabled(&self, disabled: bool) {
        if self.inner.disabled.replace(disabled) != disabled {
            self.emit(StoreEvent::DisabledChanged);
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.inner.disabled.get()
    }

    /// Apply a [`FormAction`]. Only `Initialize` can fail.
    pub fn dispatch(&self, action: FormAction) -> Result<(), FormError> {
        match action {
            FormAction::Initialize(seeds) => return self.initialize(seeds),
            FormAction::UpdateField { path, value } => self.update_field(path, value),
            FormAction::SetError { path, error } => self.set_error(path, error),
            FormAction::SetDisabled(disabled) => self.set_disabled(disabled),
        }
        Ok(())
    }

    /// The entry at `path`, or the default (empty) entry if there is none.
    pub fn field(&self, path: impl Into<FieldPath>) -> FieldEntry {
        let path: FieldPath = path.into();
        self.with_field(&path, |entry| entry.cloned().unwrap_or_default())
    }

    /// Read the entry at `path` in place. `f` must not write to the store.
    pub(crate) fn with_field<R>(
        &self,
        path: &FieldPath,
        f: impl FnOnce(Option<&FieldEntry>) -> R,
    ) -> R {
        f(self.inner.fields.borrow().get(path))
    }

    pub fn contains(&self, path: impl Into<FieldPath>) -> bool {
        let path: FieldPath = path.into();
        self.inner.fields.borrow().contains_key(&path)
    }

    pub fn len(&self) -> usize {
        self.inner.fields.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.fields.borrow().is_empty()
    }

    pub fn paths(&self) -> Vec<FieldPath> {
        self.inner.fields.borrow().keys().cloned().collect()
    }

    /// A copy of every entry.
    pub fn snapshot(&self) -> IndexMap<FieldPath, FieldEntry> {
        self.inner.fields.borrow().clone()
    }

    /// What a control bound to `path` renders, before local overrides.
    pub(crate) fn view(&self, path: &FieldPath) -> FieldView {
        let disabled = self.inner.disabled.get();
        self.with_field(path, |entry| match entry {
            Some(entry) => FieldView {
                value: entry.value.clone(),
                error: entry.error.clone(),
                disabled,
            },
            None => FieldView {
                disabled,
                ..FieldView::default()
            },
        })
    }

    /// Register `listener` for every store event.
    ///
    /// The listener stays registered until the returned [`Subscription`] is
    /// dropped. Listeners run in subscription order.
    pub fn subscribe(&self, listener: impl Fn(&StoreEvent) + 'static) -> Subscription {
        let id = ListenerId(self.inner.next_listener.get());
        self.inner.next_listener.set(id.0 + 1);
        self.inner
            .listeners
            .borrow_mut()
            .insert(id, Rc::new(listener));
        Subscription {
            store: Rc::downgrade(&self.inner),
            id,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Run `f`, delivering the events it produces only once it returns.
    ///
    /// Events keep their issue order. Nested batches are flushed by the
    /// outermost one.
    pub fn batch<R>(&self, f: impl FnOnce() -> R) -> R {
        let result = {
            let _depth = DepthGuard::enter(&self.inner.batch_depth);
            f()
        };
        if self.inner.batch_depth.get() == 0 {
            self.deliver();
        }
        result
    }

    pub fn downgrade(&self) -> WeakFieldStore {
        WeakFieldStore {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub(crate) fn emit(&self, event: StoreEvent) {
        self.inner.pending.borrow_mut().push_back(event);
        if self.inner.batch_depth.get() == 0 {
            self.deliver();
        }
    }

    /// Drain pending events to the listeners.
    ///
    /// A write made from inside a listener lands in `pending` and is picked up
    /// by the loop already running, so listeners are never re-entered.
    fn deliver(&self) {
        if self.inner.delivering.replace(true) {
            return;
        }
        // Reset even if a listener panics.
        let _delivering = FlagGuard(&self.inner.delivering);
        loop {
            let Some(event) = self.inner.pending.borrow_mut().pop_front() else {
                break;
            };
            let listeners: Vec<(ListenerId, Listener)> = self
                .inner
                .listeners
                .borrow()
                .iter()
                .map(|(id, listener)| (*id, listener.clone()))
                .collect();
            tracing::trace!(?event, listeners = listeners.len(), "delivering store event");
            for (id, listener) in listeners {
                // Skip listeners unsubscribed earlier in this round.
                if !self.inner.listeners.borrow().contains_key(&id) {
                    continue;
                }
                listener(&event);
            }
        }
    }
}

/// Clears a flag when dropped, unwinding included.
struct FlagGuard<'a>(&'a Cell<bool>);

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Holds one level of batch nesting until dropped.
struct DepthGuard<'a>(&'a Cell<usize>);

impl<'a> DepthGuard<'a> {
    fn enter(depth: &'a Cell<usize>) -> Self {
        depth.set(depth.get() + 1);
        DepthGuard(depth)
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

fn check_collisions<'a>(paths: impl Iterator<Item = &'a FieldPath>) -> Result<(), FormError> {
    let mut sorted: Vec<&FieldPath> = paths.collect();
    sorted.sort();
    for pair in sorted.windows(2) {
        if pair[0].is_prefix_of(pair[1]) {
            return Err(FormError::PathCollision {
                prefix: pair[0].clone(),
                path: pair[1].clone(),
            });
        }
    }
    Ok(())
}

/// A non-owning store handle.
#[derive(Clone)]
pub struct WeakFieldStore {
    inner: Weak<StoreInner>,
}

impl WeakFieldStore {
    pub fn upgrade(&self) -> Option<FieldStore> {
        self.inner.upgrade().map(|inner| FieldStore { inner })
    }
}

/// Keeps a store listener registered. Dropping it unsubscribes.
///
/// A subscription only holds a weak reference, so it never keeps the store
/// alive.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    store: Weak<StoreInner>,
    id: ListenerId,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            inner.listeners.borrow_mut().shift_remove(&self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Subscription").field(&self.id.0).finish()
    }
}
