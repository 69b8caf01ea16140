//! # Lookout
//!
//! Entity lookup resolution for services on the `may` coroutine runtime.
//!
//! A lookup is sent either to another service through a [`Broker`] or to a
//! local data-access action in a [`ModelTable`]. The raw result is normalized
//! so that emptiness means "not found", then routed through the request's
//! `onFound` / `onNotFound` hooks or turned into a [`StructuredError`].
//!
//! Modules:
//! - [`resolver`]: `QueryResolver`, requests, dispatch, normalization, routing
//! - [`broker`] and [`model`]: the two call targets
//! - [`error`]: structured errors and `throw_error`
//! - [`helpers`]: path access, filter and entity builders, numeric helpers
//! - [`config`]: `ResolverConfig` loaded from `config/config.toml` and env
//! - [`metrics`]: optional OpenTelemetry metrics and tracing spans

pub mod broker;
pub mod config;
pub mod error;
pub mod helpers;
pub mod json_helpers;
mod macros;
pub mod metrics;
pub mod model;
pub mod resolver;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use broker::{Broker, BrokerSpec, CallError, CallOptions, Query};
pub use config::ResolverConfig;
#[allow(deprecated)]
pub use error::format_error;
pub use error::{normalize_uid, throw_error, ErrorSpec, StructuredError};
pub use model::{Dialect, ModelAction, ModelQuery, ModelSpec, ModelTable, ReadyQuery};
pub use resolver::{
    ActionSpec, CallTarget, Outcome, QueryRequest, QueryRequestBuilder, QueryResolver, ResolveError,
};

#[doc(hidden)]
pub use may as __may;
