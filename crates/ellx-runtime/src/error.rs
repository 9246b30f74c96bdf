use ellx_types::BridgeId;
use std::fmt;

/// Result type for ellx-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer
#[derive(Debug)]
pub enum Error {
    /// An operation was invoked on a bridge after `dispose()` ran
    UseAfterDispose {
        bridge: BridgeId,
        operation: &'static str,
    },

    /// A second live binding was registered for the same instance/property pair
    DoubleRegistration { property: String },

    /// The output sequence ended because the bridge was disposed
    StalledConsumer { bridge: BridgeId },

    /// `render()` called twice under `RenderPolicy::Once`
    AlreadyMounted { bridge: BridgeId },

    /// `render()` target lies inside the bridge's own surface, or the
    /// requested sibling is not a child of the target
    InvalidMount { bridge: BridgeId },

    /// `output()` called while another consumer still holds the sequence
    OutputBusy { bridge: BridgeId },

    /// No constructor registered under this tag
    UnknownComponent(String),

    /// A constructor is already registered under this tag
    DuplicateComponent(String),

    /// Props object does not name a component
    NotAComponent(String),

    /// Host has no cell with this id
    UnknownCell(String),

    /// Types layer error (tag or props validation)
    Types(ellx_types::Error),

    /// Component construction or update failed
    Component(anyhow::Error),

    /// IO operation failed
    Io(std::io::Error),

    /// Configuration error
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UseAfterDispose { bridge, operation } => {
                write!(f, "Bridge {} used after dispose: {}", bridge.short(), operation)
            }
            Error::DoubleRegistration { property } => {
                write!(f, "Binding already registered for property '{}'", property)
            }
            Error::StalledConsumer { bridge } => {
                write!(f, "Output of bridge {} ended: bridge disposed", bridge.short())
            }
            Error::AlreadyMounted { bridge } => {
                write!(f, "Bridge {} is already mounted", bridge.short())
            }
            Error::InvalidMount { bridge } => {
                write!(f, "Bridge {} cannot be mounted at the requested position", bridge.short())
            }
            Error::OutputBusy { bridge } => {
                write!(f, "Output of bridge {} already has a consumer", bridge.short())
            }
            Error::UnknownComponent(tag) => write!(f, "Unknown component: {}", tag),
            Error::DuplicateComponent(tag) => write!(f, "Component already registered: {}", tag),
            Error::NotAComponent(msg) => write!(f, "Not a component: {}", msg),
            Error::UnknownCell(cell) => write!(f, "Unknown cell: {}", cell),
            Error::Types(err) => write!(f, "{}", err),
            Error::Component(err) => write!(f, "Component error: {}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Types(err) => Some(err),
            Error::Component(err) => Some(err.as_ref()),
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl Error {
    /// Whether this error means the bridge is gone for good.
    pub fn is_disposed(&self) -> bool {
        matches!(
            self,
            Error::UseAfterDispose { .. } | Error::StalledConsumer { .. }
        )
    }
}

impl From<ellx_types::Error> for Error {
    fn from(err: ellx_types::Error) -> Self {
        Error::Types(err)
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Component(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}
