//! Broker Module
//!
//! Provides the `Broker` trait that abstracts calling another service by name
//! through a message broker, and the `CallError` type shared by every call
//! primitive the resolver drives (broker calls and model actions).

use serde_json::{Map, Value};
use std::fmt;

/// Query payload sent to a broker action or a model action
pub type Query = Map<String, Value>;

/// Options passed alongside a broker call (`nodeID`, `timeout`, `meta`, ...)
pub type CallOptions = Map<String, Value>;

/// Options key used to pin a broker call to a specific node
pub const NODE_ID_OPTION: &str = "nodeID";

/// Error raised by a call primitive
#[derive(Debug, Clone, PartialEq)]
pub enum CallError {
    /// A remote broker action failed
    Broker {
        action: String,
        message: String,
    },
    /// A local data-access action failed
    Model {
        model: String,
        operation: String,
        message: String,
    },
    /// Other call errors
    Other(String),
}

impl CallError {
    pub fn broker(action: impl Into<String>, message: impl Into<String>) -> Self {
        CallError::Broker {
            action: action.into(),
            message: message.into(),
        }
    }

    pub fn model(
        model: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        CallError::Model {
            model: model.into(),
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Underlying failure message without the call context
    pub fn message(&self) -> &str {
        match self {
            CallError::Broker { message, .. } => message,
            CallError::Model { message, .. } => message,
            CallError::Other(message) => message,
        }
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::Broker { action, message } => {
                write!(f, "Broker call '{action}' failed: {message}")
            }
            CallError::Model {
                model,
                operation,
                message,
            } => {
                write!(f, "Model action '{model}.{operation}' failed: {message}")
            }
            CallError::Other(message) => {
                write!(f, "Call error: {message}")
            }
        }
    }
}

impl std::error::Error for CallError {}

/// Trait for calling other services through a message broker
///
/// Implementations wrap whatever transport the hosting service uses. Calls are
/// synchronous from the caller's point of view; under the `may` runtime a
/// blocking call only parks the calling coroutine.
///
/// # Examples
///
/// ```
/// use lookout::broker::{Broker, CallError, CallOptions, Query};
/// use serde_json::{json, Value};
///
/// struct Echo;
///
/// impl Broker for Echo {
///     fn call(&self, _action: &str, payload: &Query, _options: &CallOptions) -> Result<Value, CallError> {
///         Ok(Value::Object(payload.clone()))
///     }
/// }
///
/// let payload = json!({ "id": 1 }).as_object().cloned().unwrap();
/// let value = Echo.call("users.get", &payload, &CallOptions::new()).unwrap();
/// assert_eq!(value, json!({ "id": 1 }));
/// ```
pub trait Broker: Send + Sync {
    /// Call the remote action `action` with `payload`
    ///
    /// # Arguments
    ///
    /// * `action` - Fully-qualified action name (e.g. `users.get`)
    /// * `payload` - Query payload forwarded as the action params
    /// * `options` - Call options; `nodeID` targets a specific node
    ///
    /// # Errors
    ///
    /// Returns `CallError` if the remote call fails.
    fn call(&self, action: &str, payload: &Query, options: &CallOptions) -> Result<Value, CallError>;
}

impl<B: Broker + ?Sized> Broker for std::sync::Arc<B> {
    fn call(&self, action: &str, payload: &Query, options: &CallOptions) -> Result<Value, CallError> {
        (**self).call(action, payload, options)
    }
}

/// Broker target of a lookup
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
pub struct BrokerSpec {
    /// Remote action name
    #[serde(default)]
    pub name: String,
    /// Node the call must be routed to
    #[serde(default)]
    pub node: Option<String>,
    #[serde(default, deserialize_with = "crate::json_helpers::deserialize_null_default")]
    pub options: CallOptions,
}

impl BrokerSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn on_node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    /// Options sent with the call, with `nodeID` injected when a node is set
    pub fn call_options(&self) -> CallOptions {
        let mut options = self.options.clone();
        if let Some(node) = self.node.as_deref().filter(|node| !node.is_empty()) {
            options.insert(NODE_ID_OPTION.to_string(), Value::String(node.to_string()));
        }
        options
    }
}
