//! Reference widgets.
//!
//! Each widget keeps its state in a [`ReactiveProps`] store and draws into
//! the node it is constructed with, the way a real framework component
//! would. The registry built by [`registry`] records a [`WidgetHandle`] for
//! every instance so tests can play the user: `handle.input(x)` changes the
//! bound value exactly like an interaction would.

mod greeter;
mod pretty;
mod range_input;
mod text_input;

pub use greeter::Greeter;
pub use pretty::Pretty;
pub use range_input::{Bounds, RangeInput};
pub use text_input::TextInput;

use anyhow::Result;
use ellx_runtime::{Component, ComponentOptions, ComponentRegistry, Constructor, ReactiveProps};
use ellx_types::{Props, VALUE_PROP, Value};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub const RANGE_INPUT: &str = "range_input";
pub const INPUT: &str = "input";
pub const PRETTY: &str = "pretty";
pub const HELLO: &str = "hello";

/// Maps a user-supplied value onto what the widget would actually accept.
type Normalizer = fn(&Props, Value) -> Value;

/// Test-side view of one widget instance.
#[derive(Clone)]
pub struct WidgetHandle {
    tag: &'static str,
    props: ReactiveProps,
    normalize: Normalizer,
    destroyed: Rc<Cell<bool>>,
}

impl WidgetHandle {
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn props(&self) -> &ReactiveProps {
        &self.props
    }

    pub fn value(&self) -> Option<Value> {
        self.props.get(VALUE_PROP)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.props.get(key)
    }

    /// Simulate the user setting the widget's value.
    ///
    /// Returns whether the value changed (and therefore emitted).
    pub fn input(&self, value: impl Into<Value>) -> bool {
        let value = (self.normalize)(&self.props.snapshot(), value.into());
        self.props.set(VALUE_PROP, value)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }
}

impl std::fmt::Debug for WidgetHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetHandle")
            .field("tag", &self.tag)
            .field("value", &self.value())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

/// Every widget built through a tracked registry, in construction order.
#[derive(Clone, Default)]
pub struct Widgets {
    built: Rc<RefCell<Vec<WidgetHandle>>>,
}

impl Widgets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.built.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.built.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<WidgetHandle> {
        self.built.borrow().get(index).cloned()
    }

    pub fn last(&self) -> Option<WidgetHandle> {
        self.built.borrow().last().cloned()
    }

    /// Instances not yet destroyed.
    pub fn live(&self) -> usize {
        self.built
            .borrow()
            .iter()
            .filter(|w| !w.is_destroyed())
            .count()
    }

    fn track(&self, handle: WidgetHandle) {
        self.built.borrow_mut().push(handle);
    }
}

struct Tracked<C> {
    inner: C,
    destroyed: Rc<Cell<bool>>,
}

impl<C: Component> Component for Tracked<C> {
    fn props(&self) -> &ReactiveProps {
        self.inner.props()
    }

    fn set(&mut self, patch: &Props) -> Result<()> {
        self.inner.set(patch)
    }

    fn destroy(&mut self) {
        self.inner.destroy();
        self.destroyed.set(true);
    }
}

fn tracked<C, F>(widgets: &Widgets, tag: &'static str, normalize: Normalizer, build: F) -> Constructor
where
    C: Component + 'static,
    F: Fn(ComponentOptions) -> Result<C> + 'static,
{
    let widgets = widgets.clone();
    ellx_runtime::constructor(move |options| {
        let inner = build(options)?;
        let destroyed = Rc::new(Cell::new(false));
        widgets.track(WidgetHandle {
            tag,
            props: inner.props().clone(),
            normalize,
            destroyed: Rc::clone(&destroyed),
        });
        Ok(Tracked { inner, destroyed })
    })
}

fn identity(_: &Props, value: Value) -> Value {
    value
}

/// Registry with every reference widget, recording instances into `widgets`.
pub fn registry(widgets: &Widgets) -> Result<ComponentRegistry> {
    let registry = ComponentRegistry::new()
        .with(
            RANGE_INPUT,
            tracked(widgets, RANGE_INPUT, range_input::normalize_input, RangeInput::new),
        )?
        .with(
            INPUT,
            tracked(widgets, INPUT, text_input::normalize_input, TextInput::new),
        )?
        .with(PRETTY, tracked(widgets, PRETTY, identity, Pretty::new))?
        .with(HELLO, tracked(widgets, HELLO, identity, Greeter::new))?;
    Ok(registry)
}

/// [`registry`] without instance tracking.
pub fn default_registry() -> Result<ComponentRegistry> {
    registry(&Widgets::new())
}
