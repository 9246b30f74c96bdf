//! Component output bridge.
//!
//! A [`Bridge`] owns one component instance and its detached render surface,
//! and turns the component's bound-property change callbacks into an
//! [`OutputStream`] the host pulls from.
//!
//! Lifecycle: `Constructed` → `Mounted` (after `render`) → `Disposed`.
//! Every call after `dispose` fails with `UseAfterDispose`; disposing also
//! ends the output stream so a suspended consumer resumes with end-of-stream.

mod slot;
mod stream;

pub use stream::OutputStream;

use crate::binding::register_binding;
use crate::component::{Component, ComponentOptions, Constructor};
use crate::config::{RenderPolicy, RuntimeConfig};
use crate::reactive::BindingRegistration;
use crate::surface::Node;
use crate::{Error, Result};
use ellx_types::{BridgeId, ComponentTag, Props, VALUE_PROP, Value};
use slot::OutputSlot;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Constructed,
    Mounted,
    Disposed,
}

/// Construction-time settings for a bridge.
#[derive(Debug, Clone)]
pub struct BridgeOptions {
    /// Value restored by the host from a previous instance. Takes precedence
    /// over the `value` entry of the initial props.
    pub init_state: Option<Value>,
    pub value_property: String,
    pub surface_tag: String,
    pub render_policy: RenderPolicy,
    /// Registered name, kept for logging.
    pub tag: Option<ComponentTag>,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            init_state: None,
            value_property: VALUE_PROP.to_string(),
            surface_tag: "div".to_string(),
            render_policy: RenderPolicy::default(),
            tag: None,
        }
    }
}

impl BridgeOptions {
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            init_state: None,
            value_property: config.value_property.clone(),
            surface_tag: config.surface_tag.clone(),
            render_policy: config.render_policy,
            tag: None,
        }
    }

    pub fn with_init_state(mut self, value: Value) -> Self {
        self.init_state = Some(value);
        self
    }

    pub fn with_tag(mut self, tag: ComponentTag) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn with_render_policy(mut self, policy: RenderPolicy) -> Self {
        self.render_policy = policy;
        self
    }
}

pub struct Bridge {
    id: BridgeId,
    tag: Option<ComponentTag>,
    state: BridgeState,
    value_property: String,
    render_policy: RenderPolicy,
    target: Node,
    // Declared before `component` so the registration is released first.
    binding: Option<BindingRegistration>,
    component: Option<Box<dyn Component>>,
    slot: Rc<OutputSlot>,
}

impl Bridge {
    /// Construct with default options.
    pub fn new(constructor: &Constructor, props: Props) -> Result<Self> {
        Self::construct(constructor, props, BridgeOptions::default())
    }

    /// Build the component into a fresh detached surface and bind its value
    /// property to the output slot.
    pub fn construct(constructor: &Constructor, props: Props, options: BridgeOptions) -> Result<Self> {
        let id = BridgeId::new();
        let target = Node::element(options.surface_tag.as_str());
        let property = options.value_property;

        let current = options
            .init_state
            .or_else(|| props.get(&property).cloned())
            .unwrap_or(Value::Null);

        let mut initial = props;
        initial.insert(property.clone(), current.clone());

        let mut component = constructor(ComponentOptions {
            target: target.clone(),
            props: initial,
        })?;

        let slot = Rc::new(OutputSlot::new(id, current));
        let registered = register_binding(component.as_ref(), &property, {
            let slot = Rc::downgrade(&slot);
            move |value| {
                let Some(slot) = slot.upgrade() else {
                    return;
                };
                tracing::trace!(bridge = %id.short(), "emission");
                if let Err(err) = slot.emit(value) {
                    tracing::warn!(bridge = %id.short(), error = %err, "dropped emission");
                }
            }
        });
        let binding = match registered {
            Ok(binding) => binding,
            Err(err) => {
                // Constructed but never handed out: destroy it here.
                component.destroy();
                target.clear();
                return Err(err);
            }
        };

        // The component may normalize its value while constructing.
        if let Some(actual) = component.props().get(&property) {
            slot.resync(actual);
        }

        tracing::debug!(
            bridge = %id.short(),
            tag = options.tag.as_ref().map(|t| t.as_str()).unwrap_or("<anonymous>"),
            "bridge constructed"
        );

        Ok(Self {
            id,
            tag: options.tag,
            state: BridgeState::Constructed,
            value_property: property,
            render_policy: options.render_policy,
            target,
            binding: Some(binding),
            component: Some(component),
            slot,
        })
    }

    pub fn id(&self) -> BridgeId {
        self.id
    }

    pub fn tag(&self) -> Option<&ComponentTag> {
        self.tag.as_ref()
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    pub fn is_disposed(&self) -> bool {
        self.state == BridgeState::Disposed
    }

    pub fn value_property(&self) -> &str {
        &self.value_property
    }

    /// Last value observed on the bound property.
    pub fn current_value(&self) -> Value {
        self.slot.current()
    }

    /// Number of emissions delivered so far.
    pub fn emissions(&self) -> u64 {
        self.slot.emissions()
    }

    /// The container this bridge renders into.
    pub fn surface(&self) -> &Node {
        &self.target
    }

    /// Forward a property patch to the component.
    ///
    /// Keys are not validated. The output only changes if the patch alters
    /// the bound property or the component re-emits on its own.
    pub fn update(&mut self, patch: &Props) -> Result<()> {
        let component = self.live_component("update")?;
        component.set(patch)?;
        Ok(())
    }

    /// Attach the surface under `host`.
    ///
    /// Under `RenderPolicy::Reparent` a repeat call moves the surface to the
    /// new host (same host: no-op). Under `RenderPolicy::Once` it fails with
    /// `AlreadyMounted`.
    pub fn render(&mut self, host: &Node) -> Result<()> {
        self.attach(host, None)
    }

    /// Like [`render`](Self::render), but places the surface right before
    /// `sibling`, which must already be a child of `host`.
    pub fn render_before(&mut self, host: &Node, sibling: &Node) -> Result<()> {
        self.attach(host, Some(sibling))
    }

    fn attach(&mut self, host: &Node, sibling: Option<&Node>) -> Result<()> {
        self.ensure_live("render")?;

        if self.state == BridgeState::Mounted {
            if self.render_policy == RenderPolicy::Once {
                return Err(Error::AlreadyMounted { bridge: self.id });
            }
            if sibling.is_none() && self.target.parent().is_some_and(|p| p.ptr_eq(host)) {
                return Ok(());
            }
        }

        let attached = match sibling {
            Some(sibling) => host.insert_before(&self.target, sibling),
            None => host.append_child(&self.target),
        };
        if !attached {
            return Err(Error::InvalidMount { bridge: self.id });
        }
        self.state = BridgeState::Mounted;
        tracing::debug!(bridge = %self.id.short(), host = %host.tag(), "bridge mounted");
        Ok(())
    }

    /// Open the output sequence. Only one consumer at a time.
    pub fn output(&self) -> Result<OutputStream> {
        self.ensure_live("output")?;
        self.slot.attach_consumer()?;
        Ok(OutputStream::new(Rc::clone(&self.slot)))
    }

    /// Destroy the component, release the surface and end the output.
    pub fn dispose(&mut self) -> Result<()> {
        self.ensure_live("dispose")?;
        self.state = BridgeState::Disposed;

        self.binding = None;
        if let Some(mut component) = self.component.take() {
            component.destroy();
        }
        self.target.remove();
        self.target.clear();

        let woke_consumer = self.slot.close();
        tracing::debug!(
            bridge = %self.id.short(),
            woke_consumer,
            "bridge disposed"
        );
        Ok(())
    }

    fn ensure_live(&self, operation: &'static str) -> Result<()> {
        if self.is_disposed() {
            return Err(Error::UseAfterDispose {
                bridge: self.id,
                operation,
            });
        }
        Ok(())
    }

    fn live_component(&mut self, operation: &'static str) -> Result<&mut Box<dyn Component>> {
        let id = self.id;
        self.component.as_mut().ok_or(Error::UseAfterDispose {
            bridge: id,
            operation,
        })
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        if !self.is_disposed() {
            let _ = self.dispose();
        }
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("id", &self.id.short())
            .field("tag", &self.tag)
            .field("state", &self.state)
            .field("current", &self.slot.current())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::constructor;
    use crate::reactive::ReactiveProps;
    use futures::FutureExt;
    use futures::StreamExt;
    use serde_json::json;
    use std::cell::{Cell, RefCell};

    /// Minimal widget: keeps its props in the store and hands the store out
    /// so tests can play the framework.
    struct Stub {
        props: ReactiveProps,
        destroyed: Rc<Cell<u32>>,
    }

    impl Component for Stub {
        fn props(&self) -> &ReactiveProps {
            &self.props
        }

        fn destroy(&mut self) {
            self.destroyed.set(self.destroyed.get() + 1);
        }
    }

    struct Harness {
        ctor: Constructor,
        store: Rc<RefCell<Option<ReactiveProps>>>,
        destroyed: Rc<Cell<u32>>,
    }

    impl Harness {
        fn new() -> Self {
            let store = Rc::new(RefCell::new(None));
            let destroyed = Rc::new(Cell::new(0));
            let ctor = {
                let store = Rc::clone(&store);
                let destroyed = Rc::clone(&destroyed);
                constructor(move |options: ComponentOptions| {
                    let props = ReactiveProps::new(options.props);
                    *store.borrow_mut() = Some(props.clone());
                    Ok(Stub {
                        props,
                        destroyed: Rc::clone(&destroyed),
                    })
                })
            };
            Self {
                ctor,
                store,
                destroyed,
            }
        }

        fn emit(&self, value: Value) {
            let store = self.store.borrow().clone().unwrap();
            store.set("value", value);
        }
    }

    #[test]
    fn test_first_pull_yields_initial_value() {
        let h = Harness::new();
        let bridge = Bridge::new(&h.ctor, Props::new().with("value", 5)).unwrap();
        let mut out = bridge.output().unwrap();

        assert_eq!(out.next().now_or_never(), Some(Some(json!(5))));
        assert_eq!(bridge.state(), BridgeState::Constructed);
    }

    #[test]
    fn test_second_pull_suspends_until_emission() {
        let h = Harness::new();
        let bridge = Bridge::new(&h.ctor, Props::new().with("value", 5)).unwrap();
        let mut out = bridge.output().unwrap();
        let _ = out.try_next();

        assert_eq!(out.try_next(), None);
        h.emit(json!(7));
        assert_eq!(out.try_next(), Some(json!(7)));
        assert_eq!(bridge.current_value(), json!(7));
    }

    #[test]
    fn test_init_state_overrides_prop_value() {
        let h = Harness::new();
        let options = BridgeOptions::default().with_init_state(json!(42));
        let bridge = Bridge::construct(&h.ctor, Props::new().with("value", 1), options).unwrap();

        assert_eq!(bridge.current_value(), json!(42));
        let store = h.store.borrow().clone().unwrap();
        assert_eq!(store.get("value"), Some(json!(42)));
    }

    #[test]
    fn test_missing_value_defaults_to_null() {
        let h = Harness::new();
        let bridge = Bridge::new(&h.ctor, Props::new().with("label", "x")).unwrap();
        assert_eq!(bridge.current_value(), Value::Null);
    }

    #[test]
    fn test_construct_failure_propagates() {
        let ctor: Constructor =
            Rc::new(|_: ComponentOptions| -> anyhow::Result<Box<dyn Component>> {
                Err(anyhow::anyhow!("malformed props"))
            });
        let err = Bridge::new(&ctor, Props::new()).unwrap_err();
        assert!(matches!(err, Error::Component(_)));
        assert!(err.to_string().contains("malformed props"));
    }

    /// Holds the value binding for itself, leaving none for a bridge.
    struct SelfBound {
        props: ReactiveProps,
        _own: BindingRegistration,
        destroyed: Rc<Cell<u32>>,
    }

    impl Component for SelfBound {
        fn props(&self) -> &ReactiveProps {
            &self.props
        }

        fn destroy(&mut self) {
            self.destroyed.set(self.destroyed.get() + 1);
        }
    }

    #[test]
    fn test_failed_binding_destroys_component() {
        let destroyed = Rc::new(Cell::new(0));
        let ctor = {
            let destroyed = Rc::clone(&destroyed);
            constructor(move |options: ComponentOptions| {
                let props = ReactiveProps::new(options.props);
                let own = props.bind("value", |_| {})?;
                Ok(SelfBound {
                    props,
                    _own: own,
                    destroyed: Rc::clone(&destroyed),
                })
            })
        };

        let err = Bridge::new(&ctor, Props::new().with("value", 1)).unwrap_err();
        assert!(matches!(err, Error::DoubleRegistration { ref property } if property == "value"));
        assert_eq!(destroyed.get(), 1);
    }

    #[test]
    fn test_render_before_sibling() {
        let h = Harness::new();
        let host = Node::element("body");
        let first = Node::element("p");
        let last = Node::element("p");
        host.append_child(&first);
        host.append_child(&last);
        let mut bridge = Bridge::new(&h.ctor, Props::new()).unwrap();

        bridge.render_before(&host, &last).unwrap();
        let children = host.children();
        assert!(children[1].ptr_eq(bridge.surface()));
        assert_eq!(bridge.state(), BridgeState::Mounted);

        let stranger = Node::element("p");
        assert!(matches!(
            bridge.render_before(&host, &stranger),
            Err(Error::InvalidMount { .. })
        ));
    }

    #[test]
    fn test_dispose_destroys_once_and_blocks_everything() {
        let h = Harness::new();
        let host = Node::element("body");
        let mut bridge = Bridge::new(&h.ctor, Props::new().with("value", 1)).unwrap();
        bridge.render(&host).unwrap();

        bridge.dispose().unwrap();
        assert_eq!(h.destroyed.get(), 1);
        assert_eq!(host.child_count(), 0);

        assert!(matches!(
            bridge.update(&Props::new().with("value", 9)),
            Err(Error::UseAfterDispose { operation: "update", .. })
        ));
        assert!(matches!(
            bridge.render(&host),
            Err(Error::UseAfterDispose { operation: "render", .. })
        ));
        assert!(matches!(
            bridge.output(),
            Err(Error::UseAfterDispose { operation: "output", .. })
        ));
        assert!(matches!(
            bridge.dispose(),
            Err(Error::UseAfterDispose { operation: "dispose", .. })
        ));

        drop(bridge);
        assert_eq!(h.destroyed.get(), 1);
    }

    #[test]
    fn test_drop_disposes() {
        let h = Harness::new();
        let bridge = Bridge::new(&h.ctor, Props::new()).unwrap();
        drop(bridge);
        assert_eq!(h.destroyed.get(), 1);
    }

    #[test]
    fn test_emission_after_dispose_is_ignored() {
        let h = Harness::new();
        let mut bridge = Bridge::new(&h.ctor, Props::new().with("value", 1)).unwrap();
        bridge.dispose().unwrap();

        h.emit(json!(2));
        assert_eq!(bridge.current_value(), json!(1));
        assert_eq!(bridge.emissions(), 0);
    }

    #[test]
    fn test_render_reparents_by_default() {
        let h = Harness::new();
        let a = Node::element("section");
        let b = Node::element("section");
        let mut bridge = Bridge::new(&h.ctor, Props::new()).unwrap();

        bridge.render(&a).unwrap();
        bridge.render(&a).unwrap();
        assert_eq!(a.child_count(), 1);

        bridge.render(&b).unwrap();
        assert_eq!(a.child_count(), 0);
        assert_eq!(b.child_count(), 1);
        assert_eq!(bridge.state(), BridgeState::Mounted);
    }

    #[test]
    fn test_render_once_policy() {
        let h = Harness::new();
        let host = Node::element("body");
        let options = BridgeOptions::default().with_render_policy(RenderPolicy::Once);
        let mut bridge = Bridge::construct(&h.ctor, Props::new(), options).unwrap();

        bridge.render(&host).unwrap();
        assert!(matches!(
            bridge.render(&host),
            Err(Error::AlreadyMounted { .. })
        ));
    }

    #[test]
    fn test_render_into_own_surface_fails() {
        let h = Harness::new();
        let mut bridge = Bridge::new(&h.ctor, Props::new()).unwrap();
        let inner = Node::element("span");
        bridge.surface().append_child(&inner);

        assert!(matches!(
            bridge.render(&inner),
            Err(Error::InvalidMount { .. })
        ));
        assert_eq!(bridge.state(), BridgeState::Constructed);
    }

    #[test]
    fn test_single_consumer_seat() {
        let h = Harness::new();
        let bridge = Bridge::new(&h.ctor, Props::new()).unwrap();
        let first = bridge.output().unwrap();
        assert!(matches!(bridge.output(), Err(Error::OutputBusy { .. })));

        drop(first);
        assert!(bridge.output().is_ok());
    }

    #[test]
    fn test_update_with_empty_patch_is_silent() {
        let h = Harness::new();
        let mut bridge = Bridge::new(&h.ctor, Props::new().with("value", 3)).unwrap();
        let mut out = bridge.output().unwrap();
        let _ = out.try_next();

        bridge.update(&Props::new()).unwrap();
        assert_eq!(out.try_next(), None);
        assert_eq!(bridge.current_value(), json!(3));
        assert_eq!(bridge.emissions(), 0);
    }
}
