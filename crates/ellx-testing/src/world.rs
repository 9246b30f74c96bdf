//! TestWorld pattern for declarative integration test setup.
//!
//! Provides a fluent interface for:
//! - Creating an isolated config directory
//! - Building a host over the reference widget registry
//! - Mounting cells into a document body
//! - Reaching the widget behind a cell to simulate user input

use anyhow::{Context, Result};
use ellx_runtime::{ComponentHost, Evaluation, Node, RuntimeConfig};
use ellx_types::{BridgeId, ComponentSpec};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::components::{self, WidgetHandle, Widgets};

/// Declarative test environment builder.
///
/// # Example
/// ```no_run
/// use ellx_testing::TestWorld;
/// use ellx_testing::fixtures::range_input;
///
/// let mut world = TestWorld::new();
/// world.mount("slider", range_input(5)).unwrap();
///
/// world.widget("slider").unwrap().input(7);
/// assert_eq!(world.host().value("slider").unwrap(), serde_json::json!(7));
/// ```
pub struct TestWorld {
    // Dropped before `temp_dir`.
    host: ComponentHost,
    body: Node,
    widgets: Widgets,
    cells: HashMap<String, WidgetHandle>,
    config_path: PathBuf,
    temp_dir: TempDir,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    /// Create a new environment with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Create an environment whose host loads `config` from disk.
    pub fn with_config(config: RuntimeConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("ellx").join("config.toml");
        config
            .save_to(&config_path)
            .expect("Failed to write config");

        let loaded = RuntimeConfig::load_from(&config_path).expect("Failed to load config");
        let widgets = Widgets::new();
        let registry = components::registry(&widgets).expect("Failed to build registry");
        let host = ComponentHost::new(registry, loaded).expect("Invalid config");

        Self {
            host,
            body: Node::element("body"),
            widgets,
            cells: HashMap::new(),
            config_path,
            temp_dir,
        }
    }

    /// The document node cells are mounted under.
    pub fn body(&self) -> &Node {
        &self.body
    }

    pub fn host(&self) -> &ComponentHost {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut ComponentHost {
        &mut self.host
    }

    pub fn widgets(&self) -> &Widgets {
        &self.widgets
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Root of the isolated environment.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Evaluate `cell` and mount it under the body.
    pub fn mount(&mut self, cell: &str, spec: ComponentSpec) -> Result<BridgeId> {
        let before = self.widgets.len();
        let id = self.host.mount(cell, spec, &self.body)?;
        self.track_new_widget(cell, before);
        Ok(id)
    }

    /// Re-evaluate `cell` without touching where it is mounted.
    pub fn evaluate(&mut self, cell: &str, spec: ComponentSpec) -> Result<Evaluation> {
        let before = self.widgets.len();
        let outcome = self.host.evaluate(cell, spec)?;
        self.track_new_widget(cell, before);
        Ok(outcome)
    }

    /// Dispose `cell` through the host.
    pub fn remove(&mut self, cell: &str) -> Result<serde_json::Value> {
        self.cells.remove(cell);
        Ok(self.host.remove(cell)?)
    }

    /// Widget currently backing `cell`.
    pub fn widget(&self, cell: &str) -> Result<WidgetHandle> {
        self.cells
            .get(cell)
            .cloned()
            .with_context(|| format!("No widget for cell '{}'", cell))
    }

    fn track_new_widget(&mut self, cell: &str, before: usize) {
        if self.widgets.len() > before
            && let Some(handle) = self.widgets.last()
        {
            self.cells.insert(cell.to_string(), handle);
        }
    }
}
