use crate::reactive::ReactiveProps;
use crate::surface::Node;
use ellx_types::Props;
use std::rc::Rc;

/// What a component receives at construction.
#[derive(Debug, Clone)]
pub struct ComponentOptions {
    /// Element the component draws into. Owned by whoever constructed it.
    pub target: Node,
    /// Initial properties, including the bound value.
    pub props: Props,
}

/// A renderable, framework-managed widget.
///
/// Implementors keep their state in a [`ReactiveProps`] store so the
/// framework can observe changes; anything else about the widget is
/// opaque to the bridge.
pub trait Component {
    /// Framework store backing this instance.
    fn props(&self) -> &ReactiveProps;

    /// Apply a property patch. Unknown keys are the component's business.
    fn set(&mut self, patch: &Props) -> anyhow::Result<()> {
        self.props().set_many(patch);
        Ok(())
    }

    /// Release resources held by the instance. Called exactly once.
    fn destroy(&mut self) {}
}

/// Builds a component from its options. Failures propagate to the caller.
pub type Constructor = Rc<dyn Fn(ComponentOptions) -> anyhow::Result<Box<dyn Component>>>;

/// Wrap a plain constructor function.
pub fn constructor<C, F>(build: F) -> Constructor
where
    C: Component + 'static,
    F: Fn(ComponentOptions) -> anyhow::Result<C> + 'static,
{
    Rc::new(move |options| Ok(Box::new(build(options)?) as Box<dyn Component>))
}
