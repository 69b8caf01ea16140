//! End-to-end lookups: dispatch, normalization, routing and error surfacing.

use lookout::test_helpers::{ChainLog, RecordingBroker, RecordingQuery};
use lookout::{
    throw_error, ActionSpec, BrokerSpec, CallError, ErrorSpec, ModelSpec, ModelTable, Outcome,
    QueryResolver, ReadyQuery, ResolveError, ResolverConfig,
};
use serde_json::{json, Value};
use std::sync::Arc;

// A user service backed by a document-style table, with a broker for remote lookups
fn user_service(log: &ChainLog) -> (QueryResolver, Arc<RecordingBroker>) {
    let log = log.clone();
    let models = ModelTable::new()
        .with_action("User", "findOne", move |query| {
            let result = match query.get("id") {
                Some(id) if id == &json!(1) => json!({ "id": 1, "name": "a" }),
                _ => Value::Null,
            };
            RecordingQuery::new(log.clone(), Ok(result))
        })
        .with_action("User", "count", |query| {
            let n = if query.contains_key("where") { 0 } else { 3 };
            ReadyQuery::ok(json!(n))
        })
        .with_action("User", "exists", |_query| ReadyQuery::ok(json!(true)));

    let broker = Arc::new(
        RecordingBroker::new()
            .respond("users.get", Ok(json!({ "id": 1, "name": "remote" })))
            .respond("users.ping", Ok(json!(false)))
            .respond("users.slow", Err(CallError::broker("users.slow", "Request timed out"))),
    );

    let resolver = QueryResolver::new(ResolverConfig::default())
        .with_model_table(Arc::new(models))
        .with_broker(broker.clone());
    (resolver, broker)
}

#[test]
fn test_document_lookup_without_where_chains_populate_and_select() {
    let log = ChainLog::default();
    let (resolver, _) = user_service(&log);

    let request = resolver
        .request()
        .query(json!({ "id": 1 }))
        .model(ModelSpec::new("User"))
        .build()
        .unwrap();

    assert_eq!(
        resolver.resolve(request).unwrap(),
        Some(json!({ "id": 1, "name": "a" }))
    );
    assert_eq!(log.entries(), vec!["populate([])", "select([])", "exec"]);
}

#[test]
fn test_relational_lookup_with_where_is_not_chained() {
    let log = ChainLog::default();
    let (resolver, _) = user_service(&log);

    let request = resolver
        .request()
        .query(json!({ "where": { "id": 1 } }))
        .model(ModelSpec::new("User").populate(["roles"]).select(["name"]))
        .build()
        .unwrap();

    // The relational payload has no top-level id, so nothing is found
    let err = resolver.resolve(request).unwrap_err();
    assert!(matches!(err, ResolveError::Domain(_)));
    assert_eq!(log.entries(), vec!["exec"]);
}

#[test]
fn test_zero_count_raises_request_error() {
    let (resolver, _) = user_service(&ChainLog::default());

    let request = resolver
        .request()
        .query(json!({ "where": { "active": false } }))
        .error(ErrorSpec::new("No active users").with_uid("users empty").with_code(404))
        .model(ModelSpec::new("User").operation("count"))
        .build()
        .unwrap();

    let err = resolver.resolve(request).unwrap_err().into_structured();
    assert_eq!(err.uid, "USERS.EMPTY");
    assert_eq!(err.name, "USERS.EMPTY");
    assert_eq!(err.code, 404);
    assert_eq!(err.message, "No active users");
}

#[test]
fn test_positive_count_and_true_are_normalized_to_strings() {
    let (resolver, _) = user_service(&ChainLog::default());

    let count = resolver
        .request()
        .model(ModelSpec::new("User").operation("count"))
        .build()
        .unwrap();
    assert_eq!(resolver.resolve(count).unwrap(), Some(json!("3")));

    let exists = resolver
        .request()
        .model(ModelSpec::new("User").operation("exists"))
        .build()
        .unwrap();
    assert_eq!(resolver.resolve(exists).unwrap(), Some(json!("true")));
}

#[test]
fn test_on_found_callback_result_is_returned() {
    let (resolver, _) = user_service(&ChainLog::default());

    let request = resolver
        .request()
        .query(json!({ "id": 1 }))
        .model(ModelSpec::new("User"))
        .on_found(|entity| Ok(json!({ "greeting": format!("hello {}", entity["name"].as_str().unwrap_or("")) })))
        .build()
        .unwrap();

    assert_eq!(
        resolver.resolve(request).unwrap(),
        Some(json!({ "greeting": "hello a" }))
    );
}

#[test]
fn test_broker_lookup_pins_node() {
    let (resolver, broker) = user_service(&ChainLog::default());

    let request = resolver
        .request()
        .query(json!({ "id": 1 }))
        .broker(BrokerSpec::new("users.get").on_node("node-2").with_option("timeout", json!(500)))
        .model(ModelSpec::new("User"))
        .build()
        .unwrap();

    assert_eq!(
        resolver.resolve(request).unwrap(),
        Some(json!({ "id": 1, "name": "remote" }))
    );

    let calls = broker.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].action, "users.get");
    assert_eq!(calls[0].payload.get("id"), Some(&json!(1)));
    assert_eq!(calls[0].options.get("nodeID"), Some(&json!("node-2")));
    assert_eq!(calls[0].options.get("timeout"), Some(&json!(500)));
}

#[test]
fn test_false_broker_result_goes_to_on_not_found() {
    let (resolver, _) = user_service(&ChainLog::default());

    let request = resolver
        .request()
        .broker(BrokerSpec::new("users.ping"))
        .on_not_found(|reason| Ok(json!({ "message": reason.error().message, "failed": reason.cause().is_some() })))
        .build()
        .unwrap();

    assert_eq!(
        resolver.resolve_outcome(request).unwrap(),
        Outcome::Recovered(json!({ "message": "Request error", "failed": false }))
    );
}

#[test]
fn test_broker_failure_is_recovered_or_raised() {
    let (resolver, _) = user_service(&ChainLog::default());

    let recovered = resolver
        .request()
        .broker(BrokerSpec::new("users.slow"))
        .on_not_found(|reason| Ok(json!(reason.cause().map(|c| c.to_string()))))
        .build()
        .unwrap();
    assert_eq!(
        resolver.resolve(recovered).unwrap(),
        Some(json!("Broker call 'users.slow' failed: Request timed out"))
    );

    let raised = resolver
        .request()
        .error(ErrorSpec::new("User service unavailable").with_code(503))
        .broker(BrokerSpec::new("users.slow"))
        .build()
        .unwrap();
    let err = resolver.resolve(raised).unwrap_err();
    assert!(matches!(err, ResolveError::Domain(ref e) if e.code == 503 && e.uid == "COMMON"));
}

#[test]
fn test_on_found_with_missing_entity_is_silent() {
    let (resolver, _) = user_service(&ChainLog::default());

    let request = resolver
        .request()
        .query(json!({ "id": 99 }))
        .model(ModelSpec::new("User"))
        .actions(
            ActionSpec::new()
                .on_found(|entity| Ok(entity))
                .on_not_found(|_| Ok(json!("unreachable"))),
        )
        .build()
        .unwrap();

    assert_eq!(resolver.resolve_outcome(request).unwrap(), Outcome::NotFound);
}

#[test]
fn test_on_found_error_is_raised_unchanged() {
    let (resolver, _) = user_service(&ChainLog::default());

    let request = resolver
        .request()
        .query(json!({ "id": 1 }))
        .model(ModelSpec::new("User"))
        .on_found(|_| {
            throw_error(
                &ErrorSpec::new("User already exists")
                    .with_uid("user exists")
                    .with_code(409)
                    .with_extra(json!({ "field": "id" })),
            )
        })
        .build()
        .unwrap();

    let err = resolver.resolve(request).unwrap_err().into_structured();
    assert_eq!(
        serde_json::to_value(&err).unwrap(),
        json!({
            "name": "USER.EXISTS",
            "message": "User already exists",
            "code": 409,
            "uid": "USER.EXISTS",
            "extra": { "field": "id" }
        })
    );
}

#[test]
fn test_request_without_target_fails_to_build() {
    let (resolver, _) = user_service(&ChainLog::default());
    let err = resolver.request().query(json!({ "id": 1 })).build().unwrap_err();
    assert!(matches!(err, ResolveError::Resolution(_)));
    assert_eq!(err.into_structured().code, 500);
}

#[test]
fn test_unknown_action_is_a_configuration_error() {
    let (resolver, _) = user_service(&ChainLog::default());
    let request = resolver
        .request()
        .model(ModelSpec::new("User").operation("findAll"))
        .on_not_found(|_| Ok(json!("not used for configuration errors")))
        .build()
        .unwrap();

    assert!(matches!(
        resolver.resolve(request),
        Err(ResolveError::Configuration(ref m)) if m.contains("findAll")
    ));
}

#[test]
fn test_json_params_with_legacy_error_shape() {
    let (resolver, _) = user_service(&ChainLog::default());

    let err = resolver
        .resolve_params(
            json!({
                "query": { "id": 2 },
                "model": { "name": "User" },
                "error": { "msg": "User not found", "uid": "user  not\tfound", "code": "404" }
            }),
            ActionSpec::new(),
        )
        .unwrap_err()
        .into_structured();

    assert_eq!(err.message, "User not found");
    assert_eq!(err.uid, "USER.NOT.FOUND");
    assert_eq!(err.code, 404);
}
