//! Binding registration shim.
//!
//! One call that asks the framework to run a callback whenever a
//! component's bound property changes, so the bridge never touches the
//! framework's binding mechanics directly.

use crate::Result;
use crate::component::Component;
use crate::reactive::BindingRegistration;
use ellx_types::Value;

/// Invoke `callback` with the new value every time `property` changes on
/// `component`.
///
/// The callback runs synchronously inside the framework's update, before
/// the framework moves on. The returned guard scopes the registration to
/// its owner; dropping it unregisters. A second registration for the same
/// instance and property fails with `DoubleRegistration` while the first
/// guard is alive.
pub fn register_binding<F>(
    component: &dyn Component,
    property: &str,
    callback: F,
) -> Result<BindingRegistration>
where
    F: Fn(Value) + 'static,
{
    component
        .props()
        .bind(property, move |value| callback(value.clone()))
}
