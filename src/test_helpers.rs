//! Test doubles for the resolver's collaborators.
//!
//! `RecordingBroker` answers scripted actions and keeps every call it saw;
//! `RecordingQuery` writes each chaining step to a shared [`ChainLog`] so
//! tests can assert which calling convention was used.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::broker::{Broker, CallError, CallOptions, Query};
use crate::model::ModelQuery;

/// Build a query payload from a JSON object literal; anything else is empty
pub fn query(value: Value) -> Query {
    match value {
        Value::Object(map) => map,
        _ => Query::new(),
    }
}

/// Shared, ordered log of chaining steps
#[derive(Debug, Clone, Default)]
pub struct ChainLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl ChainLog {
    pub fn push(&self, entry: impl Into<String>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry.into());
        }
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

/// A pending model query that records how it was driven
#[derive(Debug)]
pub struct RecordingQuery {
    log: ChainLog,
    result: Result<Value, CallError>,
}

impl RecordingQuery {
    pub fn new(log: ChainLog, result: Result<Value, CallError>) -> Self {
        Self { log, result }
    }
}

impl ModelQuery for RecordingQuery {
    fn populate(self: Box<Self>, paths: &[String]) -> Box<dyn ModelQuery> {
        self.log.push(format!("populate({paths:?})"));
        self
    }

    fn select(self: Box<Self>, fields: &[String]) -> Box<dyn ModelQuery> {
        self.log.push(format!("select({fields:?})"));
        self
    }

    fn exec(self: Box<Self>) -> Result<Value, CallError> {
        self.log.push("exec");
        self.result
    }
}

/// A broker call as the recording broker received it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub action: String,
    pub payload: Query,
    pub options: CallOptions,
}

/// Broker double with scripted responses per action
#[derive(Debug, Default)]
pub struct RecordingBroker {
    responses: HashMap<String, Result<Value, CallError>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the response for `action`
    pub fn respond(mut self, action: impl Into<String>, response: Result<Value, CallError>) -> Self {
        self.responses.insert(action.into(), response);
        self
    }

    /// Calls received so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Broker for RecordingBroker {
    fn call(&self, action: &str, payload: &Query, options: &CallOptions) -> Result<Value, CallError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                action: action.to_string(),
                payload: payload.clone(),
                options: options.clone(),
            });
        }
        self.responses
            .get(action)
            .cloned()
            .unwrap_or_else(|| Err(CallError::broker(action, "no response scripted")))
    }
}
