use anyhow::Result;
use ellx_runtime::{Component, ComponentOptions, Node, ReactiveProps, Subscription};
use ellx_types::{Props, VALUE_PROP, Value};

/// Coerce anything into the string a text box would hold.
fn as_text(value: Option<&Value>) -> Value {
    match value {
        None | Some(Value::Null) => Value::String(String::new()),
        Some(Value::String(s)) => Value::String(s.clone()),
        Some(other) => Value::String(other.to_string()),
    }
}

pub(super) fn normalize_input(_: &Props, value: Value) -> Value {
    as_text(Some(&value))
}

/// Single-line text box. Renders an `<input type="text">`.
pub struct TextInput {
    props: ReactiveProps,
    input: Node,
    redraw: Vec<Subscription>,
}

impl TextInput {
    pub fn new(options: ComponentOptions) -> Result<Self> {
        let ComponentOptions { target, mut props } = options;
        let text = as_text(props.get(VALUE_PROP));
        props.insert(VALUE_PROP, text);

        let input = Node::element("input");
        input.set_attribute("type", "text");
        for key in [VALUE_PROP, "placeholder"] {
            if let Some(Value::String(s)) = props.get(key) {
                input.set_attribute(key, s.as_str());
            }
        }
        target.append_child(&input);

        let props = ReactiveProps::new(props);
        let redraw = [VALUE_PROP, "placeholder"]
            .into_iter()
            .map(|key| {
                let input = input.clone();
                props.subscribe(key, move |value| {
                    input.set_attribute(key, value.as_str().unwrap_or_default())
                })
            })
            .collect();

        Ok(Self {
            props,
            input,
            redraw,
        })
    }

    /// Current text.
    pub fn text(&self) -> String {
        self.props
            .get(VALUE_PROP)
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default()
    }
}

impl Component for TextInput {
    fn props(&self) -> &ReactiveProps {
        &self.props
    }

    fn set(&mut self, patch: &Props) -> Result<()> {
        let mut patch = patch.clone();
        if patch.contains_key(VALUE_PROP) {
            let text = as_text(patch.get(VALUE_PROP));
            patch.insert(VALUE_PROP, text);
        }
        self.props.set_many(&patch);
        Ok(())
    }

    fn destroy(&mut self) {
        self.redraw.clear();
        self.input.remove();
    }
}
