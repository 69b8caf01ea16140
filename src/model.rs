//! Local data-access targets for lookups
//!
//! A [`ModelTable`] is a two-level table of named, typed data-access actions:
//! `table[model][operation](query)`. A [`ModelSpec`] names the entry a lookup
//! should invoke, plus the `populate`/`select` lists applied to document-style
//! queries.

pub mod query;

pub use query::{Dialect, ModelQuery, ReadyQuery};

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::broker::Query;
use crate::json_helpers::{deserialize_field_list, deserialize_null_default};

/// Operation used when a model spec does not name one
pub const DEFAULT_MODEL_OPERATION: &str = "findOne";

/// A data-access callable: builds the pending query for `query`
pub type ModelAction = Arc<dyn Fn(&Query) -> Box<dyn ModelQuery> + Send + Sync>;

/// Two-level table of model actions keyed by model name, then operation
///
/// # Example
///
/// ```
/// use lookout::model::{ModelTable, ReadyQuery};
/// use serde_json::json;
///
/// let table = ModelTable::new()
///     .with_action("User", "findOne", |query| ReadyQuery::ok(json!({ "id": query.get("id") })));
///
/// assert!(table.action("User", "findOne").is_some());
/// assert!(table.action("User", "find").is_none());
/// ```
#[derive(Clone, Default)]
pub struct ModelTable {
    models: HashMap<String, HashMap<String, ModelAction>>,
}

impl ModelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `action` as `model.operation`, replacing any previous entry
    pub fn register<F, Q>(&mut self, model: impl Into<String>, operation: impl Into<String>, action: F)
    where
        F: Fn(&Query) -> Q + Send + Sync + 'static,
        Q: ModelQuery + 'static,
    {
        let action: ModelAction = Arc::new(move |query: &Query| Box::new(action(query)) as Box<dyn ModelQuery>);
        self.models
            .entry(model.into())
            .or_default()
            .insert(operation.into(), action);
    }

    /// Builder-style variant of [`ModelTable::register`]
    pub fn with_action<F, Q>(mut self, model: impl Into<String>, operation: impl Into<String>, action: F) -> Self
    where
        F: Fn(&Query) -> Q + Send + Sync + 'static,
        Q: ModelQuery + 'static,
    {
        self.register(model, operation, action);
        self
    }

    /// Look up `model.operation`
    pub fn action(&self, model: &str, operation: &str) -> Option<&ModelAction> {
        self.models.get(model).and_then(|ops| ops.get(operation))
    }

    pub fn contains_model(&self, model: &str) -> bool {
        self.models.contains_key(model)
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl fmt::Debug for ModelTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<(&String, Vec<&String>)> = self
            .models
            .iter()
            .map(|(model, ops)| {
                let mut ops: Vec<&String> = ops.keys().collect();
                ops.sort();
                (model, ops)
            })
            .collect();
        names.sort();
        f.debug_struct("ModelTable").field("models", &names).finish()
    }
}

/// Model target of a lookup
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ModelSpec {
    /// Model name in the table
    #[serde(default)]
    pub name: String,
    /// Operation to invoke; empty means the configured default (`findOne`)
    #[serde(default = "default_operation", rename = "type", deserialize_with = "deserialize_null_default")]
    pub operation: String,
    /// Explicit table; the resolver's fallback table is used when absent
    #[serde(skip)]
    pub action: Option<Arc<ModelTable>>,
    /// Relations to populate (document dialect only)
    #[serde(default, deserialize_with = "deserialize_field_list")]
    pub populate: Vec<String>,
    /// Fields to select (document dialect only)
    #[serde(default, deserialize_with = "deserialize_field_list")]
    pub select: Vec<String>,
}

fn default_operation() -> String {
    DEFAULT_MODEL_OPERATION.to_string()
}

impl ModelSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operation: default_operation(),
            ..Self::default()
        }
    }

    pub fn operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = operation.into();
        self
    }

    pub fn table(mut self, table: Arc<ModelTable>) -> Self {
        self.action = Some(table);
        self
    }

    pub fn populate<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.populate = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = fields.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_model_spec_defaults_to_find_one() {
        let spec = ModelSpec::new("User");
        assert_eq!(spec.operation, "findOne");
        assert!(spec.populate.is_empty());
        assert!(spec.select.is_empty());
        assert!(spec.action.is_none());
    }

    #[test]
    fn test_model_spec_deserialize() {
        let spec: ModelSpec = serde_json::from_value(json!({
            "name": "Post",
            "populate": "author comments",
            "select": ["title"]
        }))
        .unwrap();
        assert_eq!(spec.name, "Post");
        assert_eq!(spec.operation, "findOne");
        assert_eq!(spec.populate, vec!["author", "comments"]);
        assert_eq!(spec.select, vec!["title"]);

        let spec: ModelSpec = serde_json::from_value(json!({ "name": "Post", "type": "find" })).unwrap();
        assert_eq!(spec.operation, "find");
    }

    #[test]
    fn test_model_table_lookup() {
        let mut table = ModelTable::new();
        assert!(table.is_empty());
        table.register("User", "findOne", |_query| ReadyQuery::ok(json!({ "id": 1 })));

        assert!(table.contains_model("User"));
        assert!(!table.contains_model("Post"));
        assert!(table.action("User", "findById").is_none());

        let action = table.action("User", "findOne").unwrap();
        let value = action(&Query::new()).exec().unwrap();
        assert_eq!(value, json!({ "id": 1 }));
    }

    #[test]
    fn test_model_table_debug_lists_actions() {
        let table = ModelTable::new()
            .with_action("User", "findOne", |_q| ReadyQuery::ok(json!(null)))
            .with_action("User", "count", |_q| ReadyQuery::ok(json!(0)));
        let debug = format!("{table:?}");
        assert!(debug.contains("User"));
        assert!(debug.contains("count"));
        assert!(debug.contains("findOne"));
    }
}
