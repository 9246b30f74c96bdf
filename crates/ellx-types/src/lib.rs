pub mod domain;
pub mod error;
pub mod props;
mod util;

pub use domain::*;
pub use error::{Error, Result};
pub use props::{Props, Value};
pub use util::*;

/// Property key that marks a props object as naming a component to bridge.
pub const META_KEY: &str = "__EllxMeta__";

/// Field inside the [`META_KEY`] object holding the component tag.
pub const META_COMPONENT_FIELD: &str = "component";

/// Well-known two-way-bound property carrying a component's value.
pub const VALUE_PROP: &str = "value";
