//! Pending model queries and calling conventions.
//!
//! A model action returns a [`ModelQuery`]. Document-style queries are chained
//! with `populate` and `select` before execution; relational queries (whose
//! payload carries a `where` clause) are executed as-is.

use serde_json::Value;

use crate::broker::{CallError, Query};

/// Key whose presence marks a relational query
pub const WHERE_KEY: &str = "where";

/// Calling convention of a model action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Document store: `action(query).populate(..).select(..)`
    Document,
    /// Relational store: `action(query)` with a `where` clause, no chaining
    Relational,
}

impl Dialect {
    /// Infer the dialect from the query payload alone
    pub fn detect(query: &Query) -> Self {
        if query.contains_key(WHERE_KEY) {
            Dialect::Relational
        } else {
            Dialect::Document
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Document => "document",
            Dialect::Relational => "relational",
        }
    }
}

/// A query built by a model action, not yet executed
///
/// Chaining methods consume the boxed query and return the next step, so
/// implementations can either mutate themselves or wrap a new builder.
pub trait ModelQuery: Send {
    /// Populate the given relation paths
    fn populate(self: Box<Self>, paths: &[String]) -> Box<dyn ModelQuery>;

    /// Restrict the returned fields
    fn select(self: Box<Self>, fields: &[String]) -> Box<dyn ModelQuery>;

    /// Run the query and return its settled value
    ///
    /// # Errors
    ///
    /// Returns `CallError` if the data-access layer fails.
    fn exec(self: Box<Self>) -> Result<Value, CallError>;
}

/// A query whose result is already settled
///
/// Chaining is a no-op. Useful for relational actions and for wrapping plain
/// values in tests.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadyQuery {
    result: Result<Value, CallError>,
}

impl ReadyQuery {
    pub fn new(result: Result<Value, CallError>) -> Self {
        Self { result }
    }

    pub fn ok(value: Value) -> Self {
        Self::new(Ok(value))
    }

    pub fn err(error: CallError) -> Self {
        Self::new(Err(error))
    }
}

impl ModelQuery for ReadyQuery {
    fn populate(self: Box<Self>, _paths: &[String]) -> Box<dyn ModelQuery> {
        self
    }

    fn select(self: Box<Self>, _fields: &[String]) -> Box<dyn ModelQuery> {
        self
    }

    fn exec(self: Box<Self>) -> Result<Value, CallError> {
        self.result
    }
}
