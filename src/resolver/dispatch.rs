//! Call dispatch.
//!
//! The dispatcher resolves a request's [`CallTarget`] into a [`PreparedCall`]
//! (validating that a broker or a model action is actually available) and then
//! executes exactly one call path.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::broker::{Broker, CallError, CallOptions, Query};
use crate::model::{Dialect, ModelAction, ModelTable};
use crate::resolver::error::ResolveError;
use crate::resolver::request::CallTarget;

/// Chooses and prepares the call for a request
pub struct Dispatcher<'a> {
    broker: Option<&'a Arc<dyn Broker>>,
    fallback_models: Option<&'a ModelTable>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(broker: Option<&'a Arc<dyn Broker>>, fallback_models: Option<&'a ModelTable>) -> Self {
        Self {
            broker,
            fallback_models,
        }
    }

    /// Resolve `target` into an executable call
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::Configuration` when no broker is attached for a
    /// broker target, when no model table is available, or when the table has
    /// no action for `model.operation`.
    pub fn prepare(&self, query: Query, target: CallTarget) -> Result<PreparedCall, ResolveError> {
        match target {
            CallTarget::Broker(spec) => {
                let broker = self.broker.ok_or_else(|| {
                    ResolveError::Configuration(format!(
                        "no broker attached to call '{}'",
                        spec.name
                    ))
                })?;
                let options = spec.call_options();
                Ok(PreparedCall::Broker {
                    broker: Arc::clone(broker),
                    action: spec.name,
                    payload: query,
                    options,
                })
            }
            CallTarget::Model(spec) => {
                let table = spec
                    .action
                    .as_deref()
                    .or(self.fallback_models)
                    .ok_or_else(|| {
                        ResolveError::Configuration(format!(
                            "no model table available for model '{}'",
                            spec.name
                        ))
                    })?;

                let action = table.action(&spec.name, &spec.operation).ok_or_else(|| {
                    if table.contains_model(&spec.name) {
                        ResolveError::Configuration(format!(
                            "model '{}' has no '{}' action",
                            spec.name, spec.operation
                        ))
                    } else {
                        ResolveError::Configuration(format!("unknown model '{}'", spec.name))
                    }
                })?;

                Ok(PreparedCall::Model {
                    action: Arc::clone(action),
                    dialect: Dialect::detect(&query),
                    model: spec.name,
                    operation: spec.operation,
                    query,
                    populate: spec.populate,
                    select: spec.select,
                })
            }
        }
    }
}

/// A call ready to run
pub enum PreparedCall {
    Broker {
        broker: Arc<dyn Broker>,
        action: String,
        payload: Query,
        options: CallOptions,
    },
    Model {
        action: ModelAction,
        dialect: Dialect,
        model: String,
        operation: String,
        query: Query,
        populate: Vec<String>,
        select: Vec<String>,
    },
}

impl PreparedCall {
    /// `"broker"` or `"model"`
    pub fn kind(&self) -> &'static str {
        match self {
            PreparedCall::Broker { .. } => "broker",
            PreparedCall::Model { .. } => "model",
        }
    }

    /// Broker call options, for broker calls
    pub fn options(&self) -> Option<&CallOptions> {
        match self {
            PreparedCall::Broker { options, .. } => Some(options),
            PreparedCall::Model { .. } => None,
        }
    }

    /// Calling convention, for model calls
    pub fn dialect(&self) -> Option<Dialect> {
        match self {
            PreparedCall::Broker { .. } => None,
            PreparedCall::Model { dialect, .. } => Some(*dialect),
        }
    }

    /// Run the call and return its raw, settled value
    ///
    /// # Errors
    ///
    /// Returns the collaborator's `CallError` unchanged.
    pub fn execute(self) -> Result<Value, CallError> {
        match self {
            PreparedCall::Broker {
                broker,
                action,
                payload,
                options,
            } => broker.call(&action, &payload, &options),
            PreparedCall::Model {
                action,
                dialect,
                query,
                populate,
                select,
                ..
            } => {
                let pending = action(&query);
                match dialect {
                    Dialect::Relational => pending.exec(),
                    Dialect::Document => pending.populate(&populate).select(&select).exec(),
                }
            }
        }
    }
}

impl fmt::Display for PreparedCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreparedCall::Broker { action, options, .. } => match options.get("nodeID") {
                Some(node) => write!(f, "broker call '{action}' on node {node}"),
                None => write!(f, "broker call '{action}'"),
            },
            PreparedCall::Model {
                model,
                operation,
                dialect,
                ..
            } => write!(f, "model action '{model}.{operation}' ({})", dialect.as_str()),
        }
    }
}
