/// A coroutine + resolution combo macro. Spawns a `may::go!` coroutine that
/// resolves a request on a shared resolver.
///
/// With two arguments the coroutine's `JoinHandle` is returned. With a binding
/// name in the middle, the macro joins the coroutine and binds its result; a
/// panicking coroutine becomes a `ResolveError::Resolution`.
///
/// # Example
/// ```
/// use lookout::config::ResolverConfig;
/// use lookout::model::{ModelSpec, ModelTable, ReadyQuery};
/// use lookout::resolve_go;
/// use lookout::resolver::QueryResolver;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let models = ModelTable::new().with_action("User", "findOne", |_q| ReadyQuery::ok(json!({ "id": 1 })));
/// let resolver = Arc::new(QueryResolver::new(ResolverConfig::default()).with_model_table(Arc::new(models)));
/// let request = resolver.request().model(ModelSpec::new("User")).build().unwrap();
///
/// resolve_go!(resolver, user, request);
/// assert_eq!(user.unwrap(), Some(json!({ "id": 1 })));
/// ```
#[macro_export]
macro_rules! resolve_go {
    ($resolver:expr, $ret:ident, $request:expr) => {
        let $ret: ::std::result::Result<
            ::std::option::Option<::serde_json::Value>,
            $crate::resolver::ResolveError,
        > = {
            let handle = $crate::resolve_go!($resolver, $request);
            match handle.join() {
                Ok(join_result) => join_result,
                Err(e) => Err($crate::resolver::ResolveError::Resolution(format!(
                    "resolution coroutine panicked: {:?}",
                    e
                ))),
            }
        };
    };
    ($resolver:expr, $request:expr) => {{
        let resolver = ::std::sync::Arc::clone(&$resolver);
        let request = $request;
        $crate::__may::go!(move || resolver.resolve(request))
    }};
}

#[cfg(test)]
mod tests {
    use crate::broker::{BrokerSpec, CallError};
    use crate::model::{ModelSpec, ModelTable, ReadyQuery};
    use crate::resolver::{QueryResolver, ResolveError};
    use crate::test_helpers::RecordingBroker;
    use serde_json::json;
    use std::sync::Arc;

    fn resolver() -> Arc<QueryResolver> {
        let models = ModelTable::new()
            .with_action("User", "findOne", |q| ReadyQuery::ok(json!({ "id": q.get("id") })));
        let broker = RecordingBroker::new()
            .respond("users.get", Err(CallError::broker("users.get", "Service not available")));
        Arc::new(
            QueryResolver::default()
                .with_model_table(Arc::new(models))
                .with_broker(Arc::new(broker)),
        )
    }

    #[test]
    fn test_resolve_go_binds_result() {
        let resolver = resolver();
        let request = resolver
            .request()
            .query(json!({ "id": 4 }))
            .model(ModelSpec::new("User"))
            .build()
            .unwrap();

        resolve_go!(resolver, user, request);
        assert_eq!(user, Ok(Some(json!({ "id": 4 }))));
    }

    #[test]
    fn test_resolve_go_returns_handle() {
        let resolver = resolver();
        let handles: Vec<_> = (1..=4)
            .map(|id| {
                let request = resolver
                    .request()
                    .query(json!({ "id": id }))
                    .model(ModelSpec::new("User"))
                    .build()
                    .unwrap();
                resolve_go!(resolver, request)
            })
            .collect();

        for (id, handle) in (1..=4).zip(handles) {
            assert_eq!(handle.join().unwrap(), Ok(Some(json!({ "id": id }))));
        }
    }

    #[test]
    fn test_resolve_go_surfaces_domain_errors() {
        let resolver = resolver();
        let request = resolver
            .request()
            .broker(BrokerSpec::new("users.get"))
            .build()
            .unwrap();

        resolve_go!(resolver, user, request);
        assert!(matches!(user, Err(ResolveError::Domain(_))));
    }
}
