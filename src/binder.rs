//! Per-field bindings.
//!
//! A [`FieldBinder`] connects one presentational control to one field of a
//! [`FieldStore`]. The binder listens to the store, but it only re-renders its
//! control when the value, error or disabled state of *its* field changed, so
//! typing into one input never re-renders its siblings.

use std::{cell::RefCell, rc::Rc};

use serde_json::Value;

use crate::{
    entry::FieldView,
    path::FieldPath,
    store::{FieldStore, Subscription, WeakFieldStore},
};

/// Properties passed to a control each time it renders.
#[derive(Debug)]
pub struct FieldProps<'a> {
    pub value: &'a Value,
    pub error: Option<&'a str>,
    pub disabled: bool,
    /// The error message if there is one, otherwise the configured helper text.
    pub helper_text: Option<&'a str>,
    pub on_change: &'a ChangeHandle,
}

/// A raw edit coming from a control.
#[derive(Clone, Debug, PartialEq)]
pub struct ChangeEvent {
    pub value: Value,
}

impl ChangeEvent {
    pub fn new(value: impl Into<Value>) -> Self {
        ChangeEvent {
            value: value.into(),
        }
    }
}

/// Writes a control's edits back into the store.
///
/// Controls may keep a clone of the handle. It holds the store weakly, so
/// edits after the form is gone are ignored.
#[derive(Clone)]
pub struct ChangeHandle {
    store: WeakFieldStore,
    path: FieldPath,
}

impl ChangeHandle {
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn on_change(&self, event: ChangeEvent) {
        if let Some(store) = self.store.upgrade() {
            store.update_field(self.path.clone(), event.value);
        }
    }
}

impl std::fmt::Debug for ChangeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeHandle").field("path", &self.path).finish()
    }
}

/// Something that can display a field.
pub trait FieldControl {
    fn render(&mut self, props: FieldProps<'_>);
}

impl<F: FnMut(FieldProps<'_>)> FieldControl for F {
    fn render(&mut self, props: FieldProps<'_>) {
        self(props)
    }
}

/// Local settings for a single binding.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BinderOptions {
    /// Overrides the form-wide disabled flag when set.
    pub disabled: Option<bool>,
    pub helper_text: Option<String>,
}

impl BinderOptions {
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = Some(disabled);
        self
    }

    pub fn helper_text(mut self, text: impl Into<String>) -> Self {
        self.helper_text = Some(text.into());
        self
    }
}

struct BinderState<C> {
    control: C,
    options: BinderOptions,
    handle: ChangeHandle,
    last: FieldView,
    renders: usize,
}

impl<C: FieldControl> BinderState<C> {
    fn local_view(&self, mut view: FieldView) -> FieldView {
        if let Some(disabled) = self.options.disabled {
            view.disabled = disabled;
        }
        view
    }

    fn render(&mut self) {
        self.renders += 1;
        let helper_text = self
            .last
            .error
            .as_deref()
            .or(self.options.helper_text.as_deref());
        self.control.render(FieldProps {
            value: &self.last.value,
            error: self.last.error.as_deref(),
            disabled: self.last.disabled,
            helper_text,
            on_change: &self.handle,
        });
    }

    /// Re-render only if what the control shows would change.
    fn refresh(&mut self, view: FieldView) {
        let view = self.local_view(view);
        if view != self.last {
            self.last = view;
            self.render();
        }
    }
}

impl FieldStore {
    /// Bind `control` to the field at `path` with default options.
    pub fn bind<C>(&self, path: impl Into<FieldPath>, control: C) -> FieldBinder<C>
    where
        C: FieldControl + 'static,
    {
        self.bind_with(path, BinderOptions::default(), control)
    }

    /// Bind `control` to the field at `path`.
    ///
    /// The control renders once immediately and afterwards whenever its view
    /// of the field changes. Dropping the returned binder unsubscribes it.
    pub fn bind_with<C>(
        &self,
        path: impl Into<FieldPath>,
        options: BinderOptions,
        control: C,
    ) -> FieldBinder<C>
    where
        C: FieldControl + 'static,
    {
        let path: FieldPath = path.into();
        let handle = ChangeHandle {
            store: self.downgrade(),
            path: path.clone(),
        };
        let mut state = BinderState {
            control,
            options,
            handle,
            last: FieldView::default(),
            renders: 0,
        };
        state.last = state.local_view(self.view(&path));
        let state = Rc::new(RefCell::new(state));

        let subscription = self.subscribe({
            let store = self.downgrade();
            let state = state.clone();
            let path = path.clone();
            move |_| {
                let Some(store) = store.upgrade() else {
                    return;
                };
                let view = store.view(&path);
                state.borrow_mut().refresh(view);
            }
        });

        self.batch(|| state.borrow_mut().render());

        FieldBinder {
            path,
            state,
            _subscription: subscription,
        }
    }
}

/// A live binding between a control and one field.
pub struct FieldBinder<C> {
    path: FieldPath,
    state: Rc<RefCell<BinderState<C>>>,
    _subscription: Subscription,
}

impl<C> FieldBinder<C> {
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// How many times the control has rendered, the initial render included.
    pub fn render_count(&self) -> usize {
        self.state.borrow().renders
    }

    /// The view the control last rendered.
    pub fn view(&self) -> FieldView {
        self.state.borrow().last.clone()
    }

    pub fn change_handle(&self) -> ChangeHandle {
        self.state.borrow().handle.clone()
    }

    /// Inspect the control. Edits made from `f` are delivered once it returns.
    pub fn with_control<R>(&self, f: impl FnOnce(&C) -> R) -> R {
        let store = self.state.borrow().handle.store.upgrade();
        let read = || f(&self.state.borrow().control);
        match store {
            Some(store) => store.batch(read),
            None => read(),
        }
    }

    /// Stop listening to the store and return the control.
    pub fn unbind(self) -> Option<C> {
        let FieldBinder {
            state,
            _subscription: subscription,
            ..
        } = self;
        drop(subscription);
        Rc::try_unwrap(state)
            .ok()
            .map(|state| state.into_inner().control)
    }
}
