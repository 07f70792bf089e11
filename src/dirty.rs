//! Dirtiness tracking.
//!
//! A form is dirty when any data field differs from its initial value under
//! the store's [`ChangePolicy`](crate::ChangePolicy). Provenance fields never
//! count.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use crate::store::{FieldStore, StoreEvent, Subscription};

impl FieldStore {
    /// Whether any data field has been changed since the last initialization.
    pub fn is_dirty(&self) -> bool {
        let policy = self.inner.options.change_policy;
        self.inner.fields.borrow().values().any(|entry| {
            !entry.kind.is_provenance() && policy.changed(&entry.value, &entry.initial_value)
        })
    }

    /// Call `render` with the dirty flag now and whenever it flips.
    ///
    /// The flag is re-evaluated after every value change, but `render` only
    /// runs when the result differs from what it last saw, so a save button
    /// bound to it does not churn on every keystroke.
    pub fn track_dirty(&self, render: impl FnMut(bool) + 'static) -> DirtyTracker {
        let state = Rc::new(DirtyState {
            dirty: Cell::new(self.is_dirty()),
            renders: Cell::new(0),
            render: RefCell::new(Box::new(render)),
        });

        let subscription = self.subscribe({
            let store = self.downgrade();
            let state = state.clone();
            move |event| {
                if !matches!(event, StoreEvent::Initialized | StoreEvent::FieldChanged(_)) {
                    return;
                }
                let Some(store) = store.upgrade() else {
                    return;
                };
                let dirty = store.is_dirty();
                if state.dirty.replace(dirty) != dirty {
                    state.render(dirty);
                }
            }
        });

        self.batch(|| state.render(state.dirty.get()));

        DirtyTracker {
            state,
            _subscription: subscription,
        }
    }
}

struct DirtyState {
    dirty: Cell<bool>,
    renders: Cell<usize>,
    render: RefCell<Box<dyn FnMut(bool)>>,
}

impl DirtyState {
    fn render(&self, dirty: bool) {
        self.renders.set(self.renders.get() + 1);
        let mut render = self.render.borrow_mut();
        (*render)(dirty);
    }
}

/// Live dirty-flag subscription created by [`FieldStore::track_dirty`].
///
/// Dropping the tracker stops the callbacks.
pub struct DirtyTracker {
    state: Rc<DirtyState>,
    _subscription: Subscription,
}

impl DirtyTracker {
    /// The flag as of the last store event.
    pub fn is_dirty(&self) -> bool {
        self.state.dirty.get()
    }

    /// How many times the render callback has run, the initial run included.
    pub fn render_count(&self) -> usize {
        self.state.renders.get()
    }
}
