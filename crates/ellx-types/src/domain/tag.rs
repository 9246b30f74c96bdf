use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::util::{MAX_TAG_LEN, is_valid_tag, truncate};

/// Registered name of a component constructor.
///
/// Validated on construction: ASCII letter or underscore first, then
/// letters, digits, `_` or `-`, at most [`MAX_TAG_LEN`] bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ComponentTag(String);

impl ComponentTag {
    pub fn new(tag: impl Into<String>) -> Result<Self> {
        let tag = tag.into();
        if !is_valid_tag(&tag) {
            return Err(Error::InvalidTag(format!(
                "'{}' (expected [A-Za-z_][A-Za-z0-9_-]*, at most {} chars)",
                truncate(&tag, MAX_TAG_LEN),
                MAX_TAG_LEN
            )));
        }
        Ok(Self(tag))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ComponentTag {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<&str> for ComponentTag {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl From<ComponentTag> for String {
    fn from(tag: ComponentTag) -> Self {
        tag.0
    }
}

impl AsRef<str> for ComponentTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
