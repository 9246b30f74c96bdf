//! Framework-managed component state with per-property change bindings.
//!
//! [`ReactiveProps`] is the reactivity layer components are built on. It holds
//! a component's current properties and notifies bindings synchronously when
//! a property changes, whoever changed it: the host through a patch, or the
//! component's own logic reacting to user input.
//!
//! # Invariants
//!
//! 1. Setting a property to a value equal to the current one is a no-op
//!    (no version bump, no notification).
//! 2. A patch applies all of its values before any binding runs; bindings
//!    then fire once per changed property, in patch order.
//! 3. At most one live two-way binding per property ([`ReactiveProps::bind`]).
//!    Registering a second one while the first guard is alive fails with
//!    `DoubleRegistration`. Plain subscriptions ([`ReactiveProps::subscribe`])
//!    are unlimited; components use them to redraw themselves.
//! 4. On change, subscriptions run first (in registration order), then the
//!    two-way binding.
//! 5. Dropping a guard stops delivery before the next notification; dead
//!    entries are pruned lazily.
//!
//! Bindings run outside the internal borrow, so a binding may read or write
//! the store again.

use crate::{Error, Result};
use ellx_types::{Props, Value};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type CallbackRc = Rc<dyn Fn(&Value)>;
type CallbackWeak = Weak<dyn Fn(&Value)>;

#[derive(Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Subscriber,
    Bound,
}

struct BindingEntry {
    property: String,
    kind: EntryKind,
    callback: CallbackWeak,
}

struct StoreInner {
    values: Props,
    version: u64,
    bindings: Vec<BindingEntry>,
}

/// Shared, version-tracked property store. Cloning shares the same state.
#[derive(Clone)]
pub struct ReactiveProps {
    inner: Rc<RefCell<StoreInner>>,
}

impl ReactiveProps {
    pub fn new(initial: Props) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                values: initial,
                version: 0,
                bindings: Vec::new(),
            })),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.borrow().values.get(key).cloned()
    }

    /// Copy of all current properties.
    pub fn snapshot(&self) -> Props {
        self.inner.borrow().values.clone()
    }

    /// Increments once per changed property.
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Set one property. Returns whether it changed.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> bool {
        let patch = Props::new().with(key, value);
        !self.set_many(&patch).is_empty()
    }

    /// Apply a patch and notify bindings of every property it changed.
    ///
    /// Returns the changed keys in patch order.
    pub fn set_many(&self, patch: &Props) -> Vec<String> {
        let changed: Vec<String> = {
            let mut inner = self.inner.borrow_mut();
            let mut changed = Vec::new();
            for (key, value) in patch.iter() {
                if inner.values.get(key) == Some(value) {
                    continue;
                }
                inner.values.insert(key.clone(), value.clone());
                inner.version += 1;
                changed.push(key.clone());
            }
            changed
        };

        for key in &changed {
            self.notify(key);
        }
        changed
    }

    /// Register the two-way binding for `property`.
    pub fn bind(
        &self,
        property: &str,
        callback: impl Fn(&Value) + 'static,
    ) -> Result<BindingRegistration> {
        let mut inner = self.inner.borrow_mut();
        inner.bindings.retain(|b| b.callback.strong_count() > 0);
        if inner
            .bindings
            .iter()
            .any(|b| b.kind == EntryKind::Bound && b.property == property)
        {
            return Err(Error::DoubleRegistration {
                property: property.to_string(),
            });
        }

        let strong: CallbackRc = Rc::new(callback);
        inner.bindings.push(BindingEntry {
            property: property.to_string(),
            kind: EntryKind::Bound,
            callback: Rc::downgrade(&strong),
        });

        Ok(BindingRegistration {
            property: property.to_string(),
            _guard: strong,
        })
    }

    /// Observe `property` without claiming its two-way binding.
    pub fn subscribe(&self, property: &str, callback: impl Fn(&Value) + 'static) -> Subscription {
        let strong: CallbackRc = Rc::new(callback);
        self.inner.borrow_mut().bindings.push(BindingEntry {
            property: property.to_string(),
            kind: EntryKind::Subscriber,
            callback: Rc::downgrade(&strong),
        });
        Subscription { _guard: strong }
    }

    /// Number of two-way bindings whose guards are still alive.
    pub fn live_bindings(&self) -> usize {
        self.inner
            .borrow()
            .bindings
            .iter()
            .filter(|b| b.kind == EntryKind::Bound && b.callback.strong_count() > 0)
            .count()
    }

    fn notify(&self, key: &str) {
        let (callbacks, value): (Vec<CallbackRc>, Option<Value>) = {
            let mut inner = self.inner.borrow_mut();
            inner.bindings.retain(|b| b.callback.strong_count() > 0);
            let mut callbacks = Vec::new();
            for kind in [EntryKind::Subscriber, EntryKind::Bound] {
                callbacks.extend(
                    inner
                        .bindings
                        .iter()
                        .filter(|b| b.kind == kind && b.property == key)
                        .filter_map(|b| b.callback.upgrade()),
                );
            }
            (callbacks, inner.values.get(key).cloned())
        };

        let Some(value) = value else {
            return;
        };
        for cb in &callbacks {
            cb(&value);
        }
    }
}

impl fmt::Debug for ReactiveProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ReactiveProps")
            .field("values", &inner.values)
            .field("version", &inner.version)
            .field("bindings", &inner.bindings.len())
            .finish()
    }
}

/// RAII guard for a property binding. Dropping it unbinds.
pub struct BindingRegistration {
    property: String,
    _guard: CallbackRc,
}

impl BindingRegistration {
    pub fn property(&self) -> &str {
        &self.property
    }
}

impl fmt::Debug for BindingRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingRegistration")
            .field("property", &self.property)
            .finish_non_exhaustive()
    }
}

/// RAII guard for a plain subscription. Dropping it unsubscribes.
pub struct Subscription {
    _guard: CallbackRc,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
