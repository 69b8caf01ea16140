//! Query resolution.
//!
//! [`QueryResolver`] is the entry point: it builds requests seeded with its
//! configured defaults, lets the [`Dispatcher`] run exactly one call, feeds the
//! raw result through [`normalize`] and routes it with the [`ActionRouter`].
//!
//! ```
//! use lookout::config::ResolverConfig;
//! use lookout::model::{ModelSpec, ModelTable, ReadyQuery};
//! use lookout::resolver::QueryResolver;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let models = ModelTable::new()
//!     .with_action("User", "findOne", |_query| ReadyQuery::ok(json!({ "id": 1, "name": "ada" })));
//! let resolver = QueryResolver::new(ResolverConfig::default()).with_model_table(Arc::new(models));
//!
//! let request = resolver
//!     .request()
//!     .query(json!({ "id": 1 }))
//!     .model(ModelSpec::new("User"))
//!     .build()
//!     .unwrap();
//! assert_eq!(resolver.resolve(request).unwrap(), Some(json!({ "id": 1, "name": "ada" })));
//! ```

pub mod dispatch;
pub mod error;
mod error_handling;
pub mod normalize;
pub mod request;
pub mod router;

pub use dispatch::{Dispatcher, PreparedCall};
pub use error::ResolveError;
pub use normalize::{is_empty, normalize};
pub use request::{
    ActionSpec, CallTarget, FoundCallback, Handler, NotFoundCallback, NotFoundReason, QueryRequest,
    QueryRequestBuilder,
};
pub use router::{ActionRouter, Outcome};

use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::broker::Broker;
use crate::config::ResolverConfig;
#[cfg(feature = "metrics")]
use crate::metrics::METRICS;
#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;
use crate::model::ModelTable;
use error_handling::log_call_failure;

/// Resolves single-entity lookups against a broker or a model table
///
/// The broker and the fallback model table are injected once and only read
/// afterwards, so a resolver can be shared freely (`Arc<QueryResolver>`)
/// between coroutines.
#[derive(Clone, Default)]
pub struct QueryResolver {
    broker: Option<Arc<dyn Broker>>,
    models: Option<Arc<ModelTable>>,
    config: ResolverConfig,
}

impl QueryResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            broker: None,
            models: None,
            config,
        }
    }

    /// Attach the broker used for broker targets
    pub fn with_broker(mut self, broker: Arc<dyn Broker>) -> Self {
        self.broker = Some(broker);
        self
    }

    /// Attach the table used by model targets that bring no table of their own
    pub fn with_model_table(mut self, models: Arc<ModelTable>) -> Self {
        self.models = Some(models);
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Request builder seeded with this resolver's default error and operation
    pub fn request(&self) -> QueryRequestBuilder {
        QueryRequest::builder()
            .error(self.config.default_error_spec())
            .default_operation(self.config.model_operation.clone())
    }

    /// Resolve `request` and raise failures as errors
    ///
    /// Returns `Ok(None)` only when `onFound` is set and nothing was found.
    ///
    /// # Errors
    ///
    /// - `ResolveError::Configuration` / `ResolveError::Resolution` when the
    ///   request cannot be dispatched
    /// - `ResolveError::Domain` with the request's error (or the one a callback
    ///   returned) when the lookup fails
    pub fn resolve(&self, request: QueryRequest) -> Result<Option<Value>, ResolveError> {
        self.resolve_outcome(request)?
            .into_result()
            .map_err(ResolveError::Domain)
    }

    /// Build a request from JSON params plus hooks, then resolve it
    ///
    /// `params` may carry `query`, `error`, `model` and `broker`; `error` is
    /// merged over the configured default.
    pub fn resolve_params(&self, params: Value, actions: ActionSpec) -> Result<Option<Value>, ResolveError> {
        let request = self.request().params(params)?.actions(actions).build()?;
        self.resolve(request)
    }

    /// Resolve `request` and return the routed outcome without raising it
    ///
    /// # Errors
    ///
    /// Only dispatch problems are errors here; lookup failures come back as
    /// [`Outcome::Failed`].
    pub fn resolve_outcome(&self, request: QueryRequest) -> Result<Outcome, ResolveError> {
        let correlation_id = Uuid::new_v4().to_string();
        let target = request.target.describe();
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::resolve_span(&correlation_id, &target).entered();
        let start = Instant::now();

        let QueryRequest {
            query,
            error,
            actions,
            target: call_target,
        } = request;

        let dispatcher = Dispatcher::new(self.broker.as_ref(), self.models.as_deref());
        let call = match dispatcher.prepare(query, call_target) {
            Ok(call) => call,
            Err(err) => {
                log::warn!("[{correlation_id}] cannot dispatch {target}: {err}");
                return Err(err);
            }
        };

        let call_label = call.to_string();
        let call_kind = call.kind();
        log::debug!("[{correlation_id}] dispatching {call_label}");

        let router = ActionRouter::new(&actions, &error);
        let raw = {
            #[cfg(feature = "tracing")]
            let _call_span = tracing_helpers::call_span(&call_label).entered();
            call.execute()
        };
        let outcome = match raw {
            Ok(raw) => router.route(normalize(raw)),
            Err(cause) => {
                log_call_failure(&correlation_id, &call_label, &cause);
                #[cfg(feature = "metrics")]
                METRICS.record_call_failure(call_kind);
                router.route_failure(&cause)
            }
        };

        #[cfg(feature = "metrics")]
        METRICS.record_resolution(outcome.label(), start.elapsed());
        log::debug!(
            "[{correlation_id}] {target} ({call_kind}) resolved as {} in {:?}",
            outcome.label(),
            start.elapsed()
        );
        Ok(outcome)
    }
}

impl fmt::Debug for QueryResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryResolver")
            .field("broker", &self.broker.as_ref().map(|_| "Broker"))
            .field("models", &self.models)
            .field("config", &self.config)
            .finish()
    }
}
