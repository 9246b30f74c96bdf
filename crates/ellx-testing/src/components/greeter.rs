use anyhow::Result;
use ellx_runtime::{Component, ComponentOptions, Node, ReactiveProps, Subscription};
use ellx_types::{Props, VALUE_PROP, Value};

/// Greets `name` and counts how many times it has been configured.
///
/// Construction counts as the first update. Every non-empty host patch
/// recomputes the greeting, so each such `update` on its bridge produces an
/// emission.
pub struct Greeter {
    props: ReactiveProps,
    updates: u32,
    line: Node,
    _redraw: Subscription,
}

impl Greeter {
    pub fn new(options: ComponentOptions) -> Result<Self> {
        let ComponentOptions { target, mut props } = options;
        let greeting = greet(&props, 1);
        props.insert(VALUE_PROP, greeting.clone());

        let line = Node::element("p");
        line.set_text(greeting);
        target.append_child(&line);

        let props = ReactiveProps::new(props);
        let redraw = props.subscribe(VALUE_PROP, {
            let line = line.clone();
            move |value| line.set_text(value.as_str().unwrap_or_default())
        });

        Ok(Self {
            props,
            updates: 1,
            line,
            _redraw: redraw,
        })
    }

    pub fn updates(&self) -> u32 {
        self.updates
    }
}

fn greet(props: &Props, updates: u32) -> String {
    let name = match props.get("name") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "undefined".to_string(),
        Some(other) => other.to_string(),
    };
    format!("Hello {}! (updated {} times)", name, updates)
}

impl Component for Greeter {
    fn props(&self) -> &ReactiveProps {
        &self.props
    }

    fn set(&mut self, patch: &Props) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        self.updates += 1;
        let next = self.props.snapshot().merged(patch);
        let mut patch = patch.clone();
        patch.insert(VALUE_PROP, greet(&next, self.updates));
        self.props.set_many(&patch);
        Ok(())
    }

    fn destroy(&mut self) {
        self.line.remove();
    }
}
