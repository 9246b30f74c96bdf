//! Component specs for the reference widgets.
//!
//! These mirror the helper functions a document would call to place a
//! widget in a cell: `range_input(5)` yields a spec the host resolves
//! against the registry from [`crate::components::registry`].

use crate::components::{HELLO, INPUT, PRETTY, RANGE_INPUT};
use ellx_types::{ComponentSpec, Props, Value};

fn spec(tag: &str) -> ComponentSpec {
    ComponentSpec::named(tag).expect("reference widget tags are valid")
}

/// Slider starting at `value` with the default 0..=100 range.
pub fn range_input(value: impl Into<Value>) -> ComponentSpec {
    spec(RANGE_INPUT).with_prop("value", value)
}

pub fn text_input(value: &str) -> ComponentSpec {
    spec(INPUT).with_prop("value", value)
}

pub fn pretty(value: impl Into<Value>) -> ComponentSpec {
    spec(PRETTY).with_prop("value", value)
}

/// Greeter for `name`. Carries no `value`, so a rebuild into it keeps the
/// previous cell value as initial state.
pub fn hello(name: &str) -> ComponentSpec {
    spec(HELLO).with_prop("name", name)
}

/// Spec in its tagged-props wire form.
pub fn tagged(spec: ComponentSpec) -> Props {
    spec.into_tagged_props()
}
