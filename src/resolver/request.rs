//! Lookup requests.
//!
//! A [`QueryRequest`] is built fresh for every lookup and consumed by a single
//! resolution. The call target is decided once, at build time: a named broker
//! wins over a model, and a request with neither is rejected.

use serde::Deserialize;
use serde_json::Value;
use std::fmt;

use crate::broker::{BrokerSpec, CallError, Query};
use crate::error::{ErrorSpec, StructuredError};
use crate::helpers::path;
use crate::model::{Dialect, ModelSpec, DEFAULT_MODEL_OPERATION};
use crate::resolver::error::ResolveError;

/// Callback invoked with a found entity
pub type FoundCallback = Box<dyn Fn(Value) -> Result<Value, StructuredError> + Send + Sync>;

/// Callback invoked when no entity could be produced
pub type NotFoundCallback =
    Box<dyn Fn(NotFoundReason<'_>) -> Result<Value, StructuredError> + Send + Sync>;

/// Why a lookup produced no entity
#[derive(Debug, Clone, Copy)]
pub enum NotFoundReason<'a> {
    /// The call settled with an empty result
    Empty { error: &'a ErrorSpec },
    /// The call itself failed
    Failed {
        error: &'a ErrorSpec,
        cause: &'a CallError,
    },
}

impl<'a> NotFoundReason<'a> {
    /// The request's error spec
    pub fn error(&self) -> &'a ErrorSpec {
        match *self {
            NotFoundReason::Empty { error } => error,
            NotFoundReason::Failed { error, .. } => error,
        }
    }

    /// The call failure, if the call did not settle
    pub fn cause(&self) -> Option<&'a CallError> {
        match *self {
            NotFoundReason::Empty { .. } => None,
            NotFoundReason::Failed { cause, .. } => Some(cause),
        }
    }
}

/// Outcome hook: either a callback or a bare flag
pub enum Handler<C> {
    Callback(C),
    Flag(bool),
}

impl<C> Handler<C> {
    /// Whether the handler participates in routing (`false` flags do not)
    pub fn is_set(&self) -> bool {
        match self {
            Handler::Callback(_) => true,
            Handler::Flag(flag) => *flag,
        }
    }

    pub fn callback(&self) -> Option<&C> {
        match self {
            Handler::Callback(callback) => Some(callback),
            Handler::Flag(_) => None,
        }
    }
}

impl<C> fmt::Debug for Handler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Callback(_) => f.write_str("Callback(..)"),
            Handler::Flag(flag) => write!(f, "Flag({flag})"),
        }
    }
}

/// Outcome hooks of a lookup
#[derive(Debug, Default)]
pub struct ActionSpec {
    pub on_found: Option<Handler<FoundCallback>>,
    pub on_not_found: Option<Handler<NotFoundCallback>>,
}

impl ActionSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_found<F>(mut self, callback: F) -> Self
    where
        F: Fn(Value) -> Result<Value, StructuredError> + Send + Sync + 'static,
    {
        self.on_found = Some(Handler::Callback(Box::new(callback)));
        self
    }

    /// Legacy boolean form of `onFound`
    pub fn on_found_flag(mut self, flag: bool) -> Self {
        self.on_found = Some(Handler::Flag(flag));
        self
    }

    pub fn on_not_found<F>(mut self, callback: F) -> Self
    where
        F: Fn(NotFoundReason<'_>) -> Result<Value, StructuredError> + Send + Sync + 'static,
    {
        self.on_not_found = Some(Handler::Callback(Box::new(callback)));
        self
    }

    pub fn on_not_found_flag(mut self, flag: bool) -> Self {
        self.on_not_found = Some(Handler::Flag(flag));
        self
    }

    pub(crate) fn found(&self) -> Option<&Handler<FoundCallback>> {
        self.on_found.as_ref().filter(|handler| handler.is_set())
    }

    pub(crate) fn not_found_callback(&self) -> Option<&NotFoundCallback> {
        self.on_not_found.as_ref().and_then(Handler::callback)
    }
}

/// Where a lookup is sent
#[derive(Debug, Clone)]
pub enum CallTarget {
    Broker(BrokerSpec),
    Model(ModelSpec),
}

impl CallTarget {
    /// Short label used in logs and spans
    pub fn describe(&self) -> String {
        match self {
            CallTarget::Broker(spec) => format!("broker:{}", spec.name),
            CallTarget::Model(spec) => format!("model:{}.{}", spec.name, spec.operation),
        }
    }
}

/// A single lookup
#[derive(Debug)]
pub struct QueryRequest {
    pub query: Query,
    pub error: ErrorSpec,
    pub actions: ActionSpec,
    pub target: CallTarget,
}

impl QueryRequest {
    pub fn builder() -> QueryRequestBuilder {
        QueryRequestBuilder::default()
    }

    /// Calling convention used if this request goes to a model
    pub fn dialect(&self) -> Option<Dialect> {
        match self.target {
            CallTarget::Model(_) => Some(Dialect::detect(&self.query)),
            CallTarget::Broker(_) => None,
        }
    }
}

/// JSON form of the data-only parts of a request
#[derive(Debug, Default, Deserialize)]
struct QueryParams {
    #[serde(default)]
    query: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    model: Option<ModelSpec>,
    #[serde(default)]
    broker: Option<BrokerSpec>,
}

/// Builder for [`QueryRequest`]
///
/// Every field starts at an explicit default: empty query, default error
/// spec, no actions, no target.
///
/// # Example
///
/// ```
/// use lookout::resolver::{CallTarget, QueryRequest};
/// use lookout::model::ModelSpec;
/// use serde_json::json;
///
/// let request = QueryRequest::builder()
///     .query(json!({ "id": 1 }))
///     .model(ModelSpec::new("User"))
///     .build()
///     .unwrap();
///
/// assert!(matches!(request.target, CallTarget::Model(ref m) if m.operation == "findOne"));
/// ```
#[derive(Debug)]
pub struct QueryRequestBuilder {
    query: Value,
    error: ErrorSpec,
    actions: ActionSpec,
    model: Option<ModelSpec>,
    broker: Option<BrokerSpec>,
    default_operation: String,
}

impl Default for QueryRequestBuilder {
    fn default() -> Self {
        Self {
            query: Value::Object(Query::new()),
            error: ErrorSpec::default(),
            actions: ActionSpec::default(),
            model: None,
            broker: None,
            default_operation: DEFAULT_MODEL_OPERATION.to_string(),
        }
    }
}

impl QueryRequestBuilder {
    /// Query payload; must be a JSON object (null means empty)
    pub fn query(mut self, query: Value) -> Self {
        self.query = query;
        self
    }

    pub fn error(mut self, error: ErrorSpec) -> Self {
        self.error = error;
        self
    }

    pub fn actions(mut self, actions: ActionSpec) -> Self {
        self.actions = actions;
        self
    }

    pub fn on_found<F>(mut self, callback: F) -> Self
    where
        F: Fn(Value) -> Result<Value, StructuredError> + Send + Sync + 'static,
    {
        self.actions = self.actions.on_found(callback);
        self
    }

    pub fn on_not_found<F>(mut self, callback: F) -> Self
    where
        F: Fn(NotFoundReason<'_>) -> Result<Value, StructuredError> + Send + Sync + 'static,
    {
        self.actions = self.actions.on_not_found(callback);
        self
    }

    pub fn model(mut self, model: ModelSpec) -> Self {
        self.model = Some(model);
        self
    }

    pub fn broker(mut self, broker: BrokerSpec) -> Self {
        self.broker = Some(broker);
        self
    }

    /// Operation substituted when the model spec leaves it empty
    pub fn default_operation(mut self, operation: impl Into<String>) -> Self {
        self.default_operation = operation.into();
        self
    }

    /// Apply JSON params (`query`, `error`, `model`, `broker`) over the current values
    ///
    /// `error` is merged key by key over the current error spec; the other
    /// keys replace what was set before.
    pub fn params(mut self, params: Value) -> Result<Self, ResolveError> {
        let params: QueryParams = serde_json::from_value(params)
            .map_err(|e| ResolveError::Configuration(format!("invalid query params: {e}")))?;

        if let Some(query) = params.query {
            self.query = query;
        }
        if let Some(mut patch) = params.error {
            if let Value::Object(fields) = &mut patch {
                if let Some(msg) = fields.remove("msg") {
                    fields.entry("message").or_insert(msg);
                }
            }
            let mut merged = serde_json::to_value(&self.error)
                .map_err(|e| ResolveError::Configuration(format!("invalid error spec: {e}")))?;
            path::merge(&mut merged, patch);
            self.error = serde_json::from_value(merged)
                .map_err(|e| ResolveError::Configuration(format!("invalid error spec: {e}")))?;
        }
        if let Some(model) = params.model {
            self.model = Some(model);
        }
        if let Some(broker) = params.broker {
            self.broker = Some(broker);
        }
        Ok(self)
    }

    /// Validate and freeze the request
    ///
    /// # Errors
    ///
    /// - `ResolveError::Resolution` if neither a model nor a broker was supplied
    /// - `ResolveError::Configuration` if the chosen target has no name, or the
    ///   query is not a JSON object
    pub fn build(self) -> Result<QueryRequest, ResolveError> {
        let query = match self.query {
            Value::Object(map) => map,
            Value::Null => Query::new(),
            other => {
                return Err(ResolveError::Configuration(format!(
                    "query must be a JSON object, got {other}"
                )))
            }
        };

        let target = match (self.broker, self.model) {
            (Some(broker), _) if !broker.name.is_empty() => CallTarget::Broker(broker),
            (_, Some(mut model)) => {
                if model.name.is_empty() {
                    return Err(ResolveError::Configuration("model name is required".to_string()));
                }
                if model.operation.trim().is_empty() {
                    model.operation = self.default_operation;
                }
                CallTarget::Model(model)
            }
            (Some(_), None) => {
                return Err(ResolveError::Configuration("broker name is required".to_string()))
            }
            (None, None) => {
                return Err(ResolveError::Resolution(
                    "can't create call: neither model nor broker supplied".to_string(),
                ))
            }
        };

        Ok(QueryRequest {
            query,
            error: self.error,
            actions: self.actions,
            target,
        })
    }
}
