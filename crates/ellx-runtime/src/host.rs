use crate::bridge::{Bridge, BridgeOptions, OutputStream};
use crate::config::{RenderPolicy, RuntimeConfig};
use crate::registry::ComponentRegistry;
use crate::surface::Node;
use crate::{Error, Result};
use ellx_types::{BridgeId, ComponentSpec, Props, Value};
use std::collections::BTreeMap;

/// What [`ComponentHost::evaluate`] did with a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// No bridge existed; a new one was built.
    Created,
    /// Same component; the new props were pushed through `update`.
    Updated,
    /// Different component; the old bridge was disposed and replaced.
    Rebuilt,
}

/// Owns the live bridges of a document, keyed by cell id.
///
/// Cells are re-evaluated with fresh specs as the document changes. A spec
/// naming the same component updates the existing bridge in place; a spec
/// naming a different one replaces it, carrying the old value over when the
/// new spec does not set one, and re-mounting under the old parent.
pub struct ComponentHost {
    registry: ComponentRegistry,
    config: RuntimeConfig,
    cells: BTreeMap<String, Bridge>,
}

impl ComponentHost {
    pub fn new(registry: ComponentRegistry, config: RuntimeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            registry,
            config,
            cells: BTreeMap::new(),
        })
    }

    pub fn with_registry(registry: ComponentRegistry) -> Self {
        Self {
            registry,
            config: RuntimeConfig::default(),
            cells: BTreeMap::new(),
        }
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Read a component spec out of a tagged props object.
    pub fn resolve_props(&self, props: Props) -> Result<ComponentSpec> {
        if !props.contains_key(&self.config.meta_key) {
            return Err(Error::NotAComponent(format!(
                "props have no '{}' marker",
                self.config.meta_key
            )));
        }
        Ok(ComponentSpec::from_props_with_key(
            props,
            &self.config.meta_key,
        )?)
    }

    /// Create, update or rebuild the bridge for `cell`.
    pub fn evaluate(&mut self, cell: &str, spec: ComponentSpec) -> Result<Evaluation> {
        let Some(existing) = self.cells.get_mut(cell) else {
            let bridge = self
                .registry
                .instantiate(&spec, BridgeOptions::from_config(&self.config))?;
            tracing::debug!(cell, bridge = %bridge.id().short(), "cell created");
            self.cells.insert(cell.to_string(), bridge);
            return Ok(Evaluation::Created);
        };

        if existing.tag() == Some(&spec.tag) {
            existing.update(&spec.props)?;
            return Ok(Evaluation::Updated);
        }

        let mut options = BridgeOptions::from_config(&self.config);
        if !spec.props.contains_key(&self.config.value_property) {
            options = options.with_init_state(existing.current_value());
        }
        let old_surface = existing.surface().clone();

        // Build the replacement first so a failing constructor leaves the
        // old bridge in place.
        let mut replacement = self.registry.instantiate(&spec, options)?;
        if let Some(parent) = old_surface.parent() {
            replacement.render_before(&parent, &old_surface)?;
        }

        if let Some(mut old) = self.cells.insert(cell.to_string(), replacement) {
            old.dispose()?;
        }
        tracing::debug!(cell, tag = %spec.tag, "cell rebuilt");
        Ok(Evaluation::Rebuilt)
    }

    /// [`evaluate`](Self::evaluate) for a tagged props object.
    pub fn evaluate_props(&mut self, cell: &str, props: Props) -> Result<Evaluation> {
        let spec = self.resolve_props(props)?;
        self.evaluate(cell, spec)
    }

    /// Evaluate `cell` and attach its surface under `host_node`.
    ///
    /// A cell already mounted under `host_node` keeps its place. Moving a
    /// mounted cell to another node is checked against the render policy
    /// before anything is evaluated.
    pub fn mount(&mut self, cell: &str, spec: ComponentSpec, host_node: &Node) -> Result<BridgeId> {
        if let Some(existing) = self.cells.get(cell) {
            let elsewhere = existing
                .surface()
                .parent()
                .is_some_and(|parent| !parent.ptr_eq(host_node));
            if elsewhere && self.config.render_policy == RenderPolicy::Once {
                return Err(Error::AlreadyMounted {
                    bridge: existing.id(),
                });
            }
        }

        self.evaluate(cell, spec)?;
        let bridge = self.bridge_mut(cell)?;
        let in_place = bridge
            .surface()
            .parent()
            .is_some_and(|parent| parent.ptr_eq(host_node));
        if !in_place {
            bridge.render(host_node)?;
        }
        Ok(bridge.id())
    }

    pub fn render(&mut self, cell: &str, host_node: &Node) -> Result<()> {
        self.bridge_mut(cell)?.render(host_node)
    }

    pub fn update(&mut self, cell: &str, patch: &Props) -> Result<()> {
        self.bridge_mut(cell)?.update(patch)
    }

    pub fn output(&self, cell: &str) -> Result<OutputStream> {
        self.bridge(cell)?.output()
    }

    pub fn value(&self, cell: &str) -> Result<Value> {
        Ok(self.bridge(cell)?.current_value())
    }

    pub fn bridge(&self, cell: &str) -> Result<&Bridge> {
        self.cells
            .get(cell)
            .ok_or_else(|| Error::UnknownCell(cell.to_string()))
    }

    fn bridge_mut(&mut self, cell: &str) -> Result<&mut Bridge> {
        self.cells
            .get_mut(cell)
            .ok_or_else(|| Error::UnknownCell(cell.to_string()))
    }

    /// Dispose and forget `cell`, returning its last value.
    pub fn remove(&mut self, cell: &str) -> Result<Value> {
        let mut bridge = self
            .cells
            .remove(cell)
            .ok_or_else(|| Error::UnknownCell(cell.to_string()))?;
        let last = bridge.current_value();
        bridge.dispose()?;
        Ok(last)
    }

    /// Cell ids in sorted order.
    pub fn cells(&self) -> Vec<&str> {
        self.cells.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Snapshot of every cell's current value.
    pub fn values(&self) -> Props {
        self.cells
            .iter()
            .map(|(cell, bridge)| (cell.clone(), bridge.current_value()))
            .collect()
    }

    /// Dispose every bridge. Returns how many were disposed.
    pub fn shutdown(&mut self) -> usize {
        let cells = std::mem::take(&mut self.cells);
        let count = cells.len();
        for (cell, mut bridge) in cells {
            if let Err(err) = bridge.dispose() {
                tracing::warn!(cell = %cell, error = %err, "dispose failed during shutdown");
            }
        }
        tracing::debug!(count, "host shut down");
        count
    }
}

impl Drop for ComponentHost {
    fn drop(&mut self) {
        if !self.cells.is_empty() {
            self.shutdown();
        }
    }
}

impl std::fmt::Debug for ComponentHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentHost")
            .field("registry", &self.registry)
            .field("cells", &self.cells())
            .finish()
    }
}
