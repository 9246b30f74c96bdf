use serde::{Deserialize, Serialize};

use super::tag::ComponentTag;
use crate::error::{Error, Result};
use crate::props::{Props, Value, kind_of};
use crate::{META_COMPONENT_FIELD, META_KEY};

/// A request to instantiate a named component with some properties.
///
/// This is the explicit form of a "tagged" props object. Hosts that receive
/// loosely-typed JSON can round-trip through [`ComponentSpec::from_props`] and
/// [`ComponentSpec::into_tagged_props`], which read and write the marker key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    pub tag: ComponentTag,
    #[serde(default)]
    pub props: Props,
}

impl ComponentSpec {
    pub fn new(tag: ComponentTag) -> Self {
        Self {
            tag,
            props: Props::new(),
        }
    }

    /// Shorthand that validates `tag` in place.
    pub fn named(tag: &str) -> Result<Self> {
        Ok(Self::new(ComponentTag::new(tag)?))
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key, value);
        self
    }

    /// Whether `props` carries the default marker key.
    pub fn is_tagged(props: &Props) -> bool {
        props.contains_key(META_KEY)
    }

    /// Extract a spec from a props object carrying the default marker key.
    pub fn from_props(props: Props) -> Result<Self> {
        Self::from_props_with_key(props, META_KEY)
    }

    /// Extract a spec from a props object whose marker lives under `meta_key`.
    ///
    /// The marker is removed; all other keys become the component's props.
    pub fn from_props_with_key(mut props: Props, meta_key: &str) -> Result<Self> {
        let meta = props
            .remove(meta_key)
            .ok_or_else(|| Error::InvalidProps(format!("missing marker key '{}'", meta_key)))?;

        let tag = match &meta {
            Value::Object(obj) => match obj.get(META_COMPONENT_FIELD) {
                Some(Value::String(tag)) => ComponentTag::new(tag.clone())?,
                Some(other) => {
                    return Err(Error::InvalidProps(format!(
                        "'{}.{}' must be a string, got {}",
                        meta_key,
                        META_COMPONENT_FIELD,
                        kind_of(other)
                    )));
                }
                None => {
                    return Err(Error::InvalidProps(format!(
                        "'{}' has no '{}' field",
                        meta_key, META_COMPONENT_FIELD
                    )));
                }
            },
            other => {
                return Err(Error::InvalidProps(format!(
                    "'{}' must be an object, got {}",
                    meta_key,
                    kind_of(other)
                )));
            }
        };

        Ok(Self { tag, props })
    }

    /// Render this spec as a props object carrying the default marker key.
    pub fn into_tagged_props(self) -> Props {
        self.into_tagged_props_with_key(META_KEY)
    }

    pub fn into_tagged_props_with_key(self, meta_key: &str) -> Props {
        let mut meta = serde_json::Map::new();
        meta.insert(
            META_COMPONENT_FIELD.to_string(),
            Value::String(self.tag.into()),
        );

        let mut out = self.props;
        out.insert(meta_key, Value::Object(meta));
        out
    }
}
