use crate::{Error, Result};
use ellx_types::{META_KEY, VALUE_PROP};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "ELLX_CONFIG";

/// Resolve the config file path based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. ELLX_CONFIG environment variable (with tilde expansion)
/// 3. XDG config directory
/// 4. ~/.ellx/config.toml (fallback for systems without XDG)
pub fn resolve_config_path(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(config_dir) = dirs::config_dir() {
        return Ok(config_dir.join("ellx").join("config.toml"));
    }

    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".ellx").join("config.toml"));
    }

    Err(Error::Config(
        "Could not determine config path: no HOME directory or XDG config directory found"
            .to_string(),
    ))
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

/// What a second `render()` on the same bridge does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderPolicy {
    /// Attach again: the surface moves under the new host node.
    /// Rendering into the current parent is a no-op.
    #[default]
    Reparent,
    /// A second call fails with `AlreadyMounted`.
    Once,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Two-way-bound property the bridge observes.
    pub value_property: String,
    /// Marker key identifying tagged props objects.
    pub meta_key: String,
    /// Element name of the detached container each bridge owns.
    pub surface_tag: String,
    pub render_policy: RenderPolicy,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            value_property: VALUE_PROP.to_string(),
            meta_key: META_KEY.to_string(),
            surface_tag: "div".to_string(),
            render_policy: RenderPolicy::default(),
        }
    }
}

impl RuntimeConfig {
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path(None)?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: RuntimeConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.value_property.is_empty() {
            return Err(Error::Config("value_property must not be empty".to_string()));
        }
        if self.meta_key.is_empty() {
            return Err(Error::Config("meta_key must not be empty".to_string()));
        }
        if self.meta_key == self.value_property {
            return Err(Error::Config(format!(
                "meta_key and value_property are both '{}'",
                self.meta_key
            )));
        }
        Ok(())
    }

    pub fn with_render_policy(mut self, policy: RenderPolicy) -> Self {
        self.render_policy = policy;
        self
    }

    pub fn with_value_property(mut self, name: impl Into<String>) -> Self {
        self.value_property = name.into();
        self
    }
}
