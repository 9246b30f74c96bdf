//! Testing infrastructure for ellx integration tests.
//!
//! This crate provides utilities for writing bridge tests:
//! - `TestWorld`: isolated host document with a config file and a registry
//! - `components`: reference widgets and the handles tests drive them with
//! - `fixtures`: component specs for the reference widgets
//! - `assertions`: output-stream and mount assertions

pub mod assertions;
pub mod components;
pub mod fixtures;
pub mod world;

pub use components::{WidgetHandle, Widgets};
pub use world::TestWorld;
