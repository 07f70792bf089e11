//! Mirroring store state into Floem signals.
//!
//! Floem views track `floem_reactive` signals. These adapters keep a signal
//! in step with one field (or with the dirty flag) so a view can read it like
//! any other reactive value. The signal is only written when the mirrored
//! value actually changed, so effects depending on it stay quiet otherwise.

use floem_reactive::{RwSignal, SignalGet, SignalUpdate, SignalWith, create_rw_signal};

use crate::{
    entry::FieldView,
    path::FieldPath,
    store::{FieldStore, StoreEvent, Subscription},
};

/// A field view mirrored into an [`RwSignal`].
///
/// Keep this alive for as long as the signal should follow the store.
pub struct FieldSignal {
    signal: RwSignal<FieldView>,
    _subscription: Subscription,
}

impl FieldSignal {
    pub fn signal(&self) -> RwSignal<FieldView> {
        self.signal
    }

    pub fn get_untracked(&self) -> FieldView {
        self.signal.get_untracked()
    }
}

/// The dirty flag mirrored into an [`RwSignal`].
pub struct DirtySignal {
    signal: RwSignal<bool>,
    _subscription: Subscription,
}

impl DirtySignal {
    pub fn signal(&self) -> RwSignal<bool> {
        self.signal
    }

    pub fn get_untracked(&self) -> bool {
        self.signal.get_untracked()
    }
}

fn set_if_changed<T: PartialEq + 'static>(signal: RwSignal<T>, value: T) {
    if !signal.with_untracked(|current| *current == value) {
        signal.set(value);
    }
}

impl FieldStore {
    /// Mirror the field at `path` into a signal in the current reactive scope.
    pub fn field_signal(&self, path: impl Into<FieldPath>) -> FieldSignal {
        let path: FieldPath = path.into();
        let signal = create_rw_signal(self.view(&path));
        let subscription = self.subscribe({
            let store = self.downgrade();
            move |_| {
                if let Some(store) = store.upgrade() {
                    set_if_changed(signal, store.view(&path));
                }
            }
        });
        FieldSignal {
            signal,
            _subscription: subscription,
        }
    }

    /// Mirror the dirty flag into a signal in the current reactive scope.
    pub fn dirty_signal(&self) -> DirtySignal {
        let signal = create_rw_signal(self.is_dirty());
        let subscription = self.subscribe({
            let store = self.downgrade();
            move |event| {
                if !matches!(event, StoreEvent::Initialized | StoreEvent::FieldChanged(_)) {
                    return;
                }
                if let Some(store) = store.upgrade() {
                    set_if_changed(signal, store.is_dirty());
                }
            }
        });
        DirtySignal {
            signal,
            _subscription: subscription,
        }
    }
}
