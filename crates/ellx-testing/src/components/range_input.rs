use anyhow::{Result, bail};
use ellx_runtime::{Component, ComponentOptions, Node, ReactiveProps, Subscription};
use ellx_types::{Props, VALUE_PROP, Value};

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Numeric limits of a slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
            step: 1.0,
        }
    }
}

impl Bounds {
    pub fn from_props(props: &Props) -> Result<Self> {
        let defaults = Self::default();
        let bounds = Self {
            min: number(props, "min")?.unwrap_or(defaults.min),
            max: number(props, "max")?.unwrap_or(defaults.max),
            step: number(props, "step")?.unwrap_or(defaults.step),
        };
        if bounds.min > bounds.max {
            bail!("range min {} exceeds max {}", bounds.min, bounds.max);
        }
        if bounds.step <= 0.0 {
            bail!("range step must be positive, got {}", bounds.step);
        }
        Ok(bounds)
    }

    /// Clamp into `[min, max]` and snap to the nearest step from `min`.
    /// Non-numeric input falls back to `min`.
    pub fn normalize(&self, value: Option<&Value>) -> Value {
        let raw = value.and_then(Value::as_f64).unwrap_or(self.min);
        let clamped = raw.clamp(self.min, self.max);
        let steps = ((clamped - self.min) / self.step).round();
        let snapped = (self.min + steps * self.step).min(self.max);
        to_value(snapped)
    }
}

fn number(props: &Props, key: &str) -> Result<Option<f64>> {
    match props.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => match value.as_f64() {
            Some(n) if n.is_finite() => Ok(Some(n)),
            _ => bail!("range '{}' must be a number, got {}", key, value),
        },
    }
}

fn to_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

pub(super) fn normalize_input(props: &Props, value: Value) -> Value {
    match Bounds::from_props(props) {
        Ok(bounds) => bounds.normalize(Some(&value)),
        Err(_) => value,
    }
}

/// Slider over a numeric range. Renders an `<input type="range">`.
///
/// The value is always kept inside the bounds: patches that move `min` or
/// `max` past the current value pull it back in, which the bridge sees as
/// an emission.
pub struct RangeInput {
    props: ReactiveProps,
    input: Node,
    redraw: Vec<Subscription>,
}

impl RangeInput {
    pub fn new(options: ComponentOptions) -> Result<Self> {
        let ComponentOptions { target, mut props } = options;
        let bounds = Bounds::from_props(&props)?;
        let value = bounds.normalize(props.get(VALUE_PROP));
        props.insert(VALUE_PROP, value);

        let input = Node::element("input");
        input.set_attribute("type", "range");
        draw_bounds(&input, &bounds);
        if let Some(value) = props.get(VALUE_PROP) {
            input.set_attribute("value", value.to_string());
        }
        target.append_child(&input);

        let props = ReactiveProps::new(props);
        let redraw = vec![props.subscribe(VALUE_PROP, {
            let input = input.clone();
            move |value| input.set_attribute("value", value.to_string())
        })];

        Ok(Self {
            props,
            input,
            redraw,
        })
    }

    pub fn bounds(&self) -> Result<Bounds> {
        Bounds::from_props(&self.props.snapshot())
    }
}

fn draw_bounds(input: &Node, bounds: &Bounds) {
    input.set_attribute("min", to_value(bounds.min).to_string());
    input.set_attribute("max", to_value(bounds.max).to_string());
    input.set_attribute("step", to_value(bounds.step).to_string());
}

impl Component for RangeInput {
    fn props(&self) -> &ReactiveProps {
        &self.props
    }

    fn set(&mut self, patch: &Props) -> Result<()> {
        let next = self.props.snapshot().merged(patch);
        let bounds = Bounds::from_props(&next)?;

        // Normalize before applying so the bound value changes at most once.
        let mut patch = patch.clone();
        patch.insert(VALUE_PROP, bounds.normalize(next.get(VALUE_PROP)));
        self.props.set_many(&patch);
        draw_bounds(&self.input, &bounds);
        Ok(())
    }

    fn destroy(&mut self) {
        self.redraw.clear();
        self.input.remove();
    }
}
