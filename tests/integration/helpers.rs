//! Query helpers used the way a list endpoint would use them.

use lookout::helpers::filter::{build_filter, AllowedFilter, FilterKind};
use lookout::helpers::normalize::{build, clean, FieldMapping};
use lookout::helpers::number::{generate_rand_num, parse_number_dec};
use lookout::{ModelSpec, ModelTable, QueryResolver, ReadyQuery, ResolverConfig};
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;

#[test]
fn test_filter_feeds_document_lookup() {
    let allowed: Vec<AllowedFilter> = serde_json::from_value(json!([
        { "name": "name", "field": "profile.name", "type": "search" },
        { "name": "active", "field": "active", "type": "boolean", "default": "true" }
    ]))
    .unwrap();
    let params = json!({ "name": "ad", "active": null, "role": "admin" });
    let filter = build_filter(params.as_object().unwrap(), &allowed);
    assert_eq!(
        filter,
        json!({ "profile": { "name": { "$regex": "ad", "$options": "i" } }, "active": true })
    );

    let models = ModelTable::new().with_action("User", "find", |query| {
        ReadyQuery::ok(json!([{ "filter": serde_json::Value::Object(query.clone()) }]))
    });
    let resolver = QueryResolver::new(ResolverConfig::default()).with_model_table(Arc::new(models));
    let request = resolver
        .request()
        .query(filter.clone())
        .model(ModelSpec::new("User").operation("find"))
        .build()
        .unwrap();

    assert_eq!(resolver.resolve(request).unwrap(), Some(json!([{ "filter": filter }])));
}

#[test]
fn test_build_then_clean_entity() {
    let raw = json!({
        "_id": "u1",
        "profile": { "name": "Ada", "password": "hash" },
        "balance": "12.345"
    });
    let shaped = build(
        &raw,
        &[
            FieldMapping::new("_id", "id"),
            FieldMapping::new("profile.name", "name"),
            FieldMapping::new("profile.password", "secret.password"),
            FieldMapping::new("balance", "balance"),
        ],
    );
    let public = clean(&shaped, &["secret.password"]);
    assert_eq!(
        public,
        json!({ "id": "u1", "name": "Ada", "secret": {}, "balance": "12.345" })
    );

    let balance = parse_number_dec(&public["balance"], 2).unwrap();
    assert_eq!(balance, Decimal::new(1235, 2));
}

#[test]
fn test_generated_codes_have_requested_length() {
    let code = generate_rand_num(6).unwrap();
    assert!((100_000..=999_999).contains(&code));
    assert!(generate_rand_num(0).is_none());
}
