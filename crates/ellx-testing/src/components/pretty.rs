use anyhow::Result;
use ellx_runtime::{Component, ComponentOptions, Node, ReactiveProps, Subscription};
use ellx_types::{VALUE_PROP, Value};

fn format(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Read-only display of its value. Renders a `<pre>`.
///
/// Never changes its own value, so a bridge around it only emits when the
/// host patches `value`.
pub struct Pretty {
    props: ReactiveProps,
    block: Node,
    _redraw: Subscription,
}

impl Pretty {
    pub fn new(options: ComponentOptions) -> Result<Self> {
        let ComponentOptions { target, props } = options;

        let block = Node::element("pre");
        block.set_text(format(props.get(VALUE_PROP).unwrap_or(&Value::Null)));
        target.append_child(&block);

        let props = ReactiveProps::new(props);
        let redraw = props.subscribe(VALUE_PROP, {
            let block = block.clone();
            move |value| block.set_text(format(value))
        });

        Ok(Self {
            props,
            block,
            _redraw: redraw,
        })
    }
}

impl Component for Pretty {
    fn props(&self) -> &ReactiveProps {
        &self.props
    }

    fn destroy(&mut self) {
        self.block.remove();
    }
}
