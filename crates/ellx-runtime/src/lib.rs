//! ellx-runtime: bridge stateful, callback-driven components into
//! pull-based value streams.
//!
//! A host builds a [`Bridge`] around a [`Component`], mounts its surface
//! with `render`, pushes property patches with `update`, and pulls the
//! component's value changes from `output()`:
//!
//! ```no_run
//! use ellx_runtime::{Bridge, Node};
//! use ellx_types::Props;
//! use futures::StreamExt;
//!
//! # async fn demo(ctor: ellx_runtime::Constructor) -> ellx_runtime::Result<()> {
//! let body = Node::element("body");
//! let mut bridge = Bridge::new(&ctor, Props::new().with("value", 5))?;
//! bridge.render(&body)?;
//!
//! let mut values = bridge.output()?;
//! assert_eq!(values.next().await, Some(serde_json::json!(5)));
//! # Ok(())
//! # }
//! ```
//!
//! Everything here is single-threaded: state is shared through `Rc` and
//! `RefCell`, and streams are driven by a local executor.

pub mod binding;
pub mod bridge;
pub mod component;
pub mod config;
pub mod error;
pub mod host;
pub mod reactive;
pub mod registry;
pub mod surface;

pub use binding::register_binding;
pub use bridge::{Bridge, BridgeOptions, BridgeState, OutputStream};
pub use component::{Component, ComponentOptions, Constructor, constructor};
pub use config::{RenderPolicy, RuntimeConfig, resolve_config_path};
pub use error::{Error, Result};
pub use host::{ComponentHost, Evaluation};
pub use reactive::{BindingRegistration, ReactiveProps, Subscription};
pub use registry::ComponentRegistry;
pub use surface::Node;
