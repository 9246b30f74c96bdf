use crate::bridge::{Bridge, BridgeOptions};
use crate::component::Constructor;
use crate::{Error, Result};
use ellx_types::{ComponentSpec, ComponentTag};
use std::collections::BTreeMap;

/// Explicit mapping from component tag to constructor.
///
/// Tags are validated when registered, so lookups only ever fail for
/// names nobody registered.
#[derive(Default, Clone)]
pub struct ComponentRegistry {
    constructors: BTreeMap<ComponentTag, Constructor>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tag: &str, constructor: Constructor) -> Result<()> {
        let tag = ComponentTag::new(tag)?;
        if self.constructors.contains_key(&tag) {
            return Err(Error::DuplicateComponent(tag.to_string()));
        }
        tracing::debug!(tag = %tag, "component registered");
        self.constructors.insert(tag, constructor);
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, tag: &str, constructor: Constructor) -> Result<Self> {
        self.register(tag, constructor)?;
        Ok(self)
    }

    pub fn unregister(&mut self, tag: &str) -> bool {
        match ComponentTag::new(tag) {
            Ok(tag) => self.constructors.remove(&tag).is_some(),
            Err(_) => false,
        }
    }

    pub fn resolve(&self, tag: &ComponentTag) -> Result<&Constructor> {
        self.constructors
            .get(tag)
            .ok_or_else(|| Error::UnknownComponent(tag.to_string()))
    }

    pub fn contains(&self, tag: &str) -> bool {
        ComponentTag::new(tag)
            .map(|tag| self.constructors.contains_key(&tag))
            .unwrap_or(false)
    }

    /// Registered tags in sorted order.
    pub fn tags(&self) -> Vec<&ComponentTag> {
        self.constructors.keys().collect()
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Build a bridge for `spec`.
    pub fn instantiate(&self, spec: &ComponentSpec, options: BridgeOptions) -> Result<Bridge> {
        let constructor = self.resolve(&spec.tag)?;
        Bridge::construct(
            constructor,
            spec.props.clone(),
            options.with_tag(spec.tag.clone()),
        )
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}
