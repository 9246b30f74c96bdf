mod bridge;
mod spec;
mod tag;

pub use bridge::BridgeId;
pub use spec::ComponentSpec;
pub use tag::ComponentTag;
