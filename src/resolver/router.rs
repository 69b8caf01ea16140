//! Outcome routing.
//!
//! The router turns a normalized entity (or a call failure) plus the request's
//! outcome hooks into an explicit [`Outcome`]. Nothing is raised here; only
//! the resolver boundary converts `Failed` into an error.

use serde_json::Value;

use crate::broker::CallError;
use crate::error::{ErrorSpec, StructuredError};
use crate::resolver::normalize::is_empty;
use crate::resolver::request::{ActionSpec, Handler, NotFoundReason};

/// Result of routing a lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The entity, or what `onFound` made of it
    Found(Value),
    /// What `onNotFound` returned for an empty result or a failed call
    Recovered(Value),
    /// `onFound` was set but the result was empty; nothing is returned
    NotFound,
    /// The error to raise for the caller
    Failed(StructuredError),
}

impl Outcome {
    /// Convert to the value/error pair callers with exception semantics expect
    pub fn into_result(self) -> Result<Option<Value>, StructuredError> {
        match self {
            Outcome::Found(value) | Outcome::Recovered(value) => Ok(Some(value)),
            Outcome::NotFound => Ok(None),
            Outcome::Failed(err) => Err(err),
        }
    }

    /// Stable label for logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Found(_) => "found",
            Outcome::Recovered(_) => "recovered",
            Outcome::NotFound => "not_found",
            Outcome::Failed(_) => "failed",
        }
    }
}

/// Routes one lookup's result through its outcome hooks
pub struct ActionRouter<'a> {
    actions: &'a ActionSpec,
    error: &'a ErrorSpec,
}

impl<'a> ActionRouter<'a> {
    pub fn new(actions: &'a ActionSpec, error: &'a ErrorSpec) -> Self {
        Self { actions, error }
    }

    /// Route a settled, normalized entity
    pub fn route(&self, entity: Value) -> Outcome {
        if let Some(on_found) = self.actions.found() {
            if is_empty(&entity) {
                return Outcome::NotFound;
            }
            return match on_found {
                Handler::Callback(callback) => settle(callback(entity), Outcome::Found),
                // Legacy flag: a found entity raises the request error
                Handler::Flag(_) => self.fail(),
            };
        }

        if is_empty(&entity) {
            return self.recover(NotFoundReason::Empty { error: self.error });
        }
        Outcome::Found(entity)
    }

    /// Route a call that failed before settling
    pub fn route_failure(&self, cause: &CallError) -> Outcome {
        self.recover(NotFoundReason::Failed {
            error: self.error,
            cause,
        })
    }

    fn recover(&self, reason: NotFoundReason<'_>) -> Outcome {
        match self.actions.not_found_callback() {
            Some(callback) => settle(callback(reason), Outcome::Recovered),
            None => self.fail(),
        }
    }

    fn fail(&self) -> Outcome {
        Outcome::Failed(StructuredError::from_spec(self.error))
    }
}

fn settle(result: Result<Value, StructuredError>, wrap: fn(Value) -> Outcome) -> Outcome {
    match result {
        Ok(value) => wrap(value),
        Err(err) => Outcome::Failed(err),
    }
}
