//! Tests for route resolution.

#[cfg(test)]
mod routing_tests {
    use std::sync::Arc;

    use crate::parser::{HttpRequest, Method};
    use crate::routing::RouteRegistry;
    use crate::server::{responder_fn, Error, HttpResponse, Parameters, Responder, StatusCode};

    fn tagged(tag: &'static str) -> Arc<dyn Responder> {
        responder_fn(move |_req, response: HttpResponse, _params| async move {
            Ok(response.with_body_string(tag))
        })
    }

    async fn body_of(responder: Arc<dyn Responder>, params: Parameters) -> String {
        let request = HttpRequest::get("/");
        let response = responder
            .generate_response(&request, HttpResponse::new(StatusCode::Ok), params)
            .await
            .unwrap();
        String::from_utf8(response.body).unwrap()
    }

    #[tokio::test]
    async fn test_exact_route_dispatches_by_method() {
        let mut registry = RouteRegistry::new();
        registry.add(&[Method::GET], "/status", tagged("get")).unwrap();
        registry.add(&[Method::POST], "/status", tagged("post")).unwrap();

        let (responder, params) = registry.resolve(Method::GET, "/status").unwrap();
        assert!(params.is_empty());
        assert_eq!(body_of(responder, params).await, "get");

        let (responder, params) = registry.resolve(Method::POST, "/status").unwrap();
        assert_eq!(body_of(responder, params).await, "post");
    }

    #[tokio::test]
    async fn test_exact_path_with_unregistered_method_is_configuration_error() {
        let mut registry = RouteRegistry::new();
        registry.add(&[Method::GET], "/status", tagged("get")).unwrap();
        registry.add(&[Method::DELETE], "/:thing", tagged("dynamic")).unwrap();
        registry.set_default(Some(tagged("default")));

        let result = registry.resolve(Method::DELETE, "/status");
        assert!(matches!(result, Err(Error::MethodNotRegistered(Method::DELETE, ref p)) if p == "/status"));
    }

    #[tokio::test]
    async fn test_dynamic_route_extracts_parameters() {
        let mut registry = RouteRegistry::new();
        registry.add(&[Method::GET], "/a/:x/b", tagged("ax")).unwrap();

        let (responder, params) = registry.resolve(Method::GET, "/a/123/b").unwrap();
        assert_eq!(params["x"], "123");
        assert_eq!(body_of(responder, params).await, "ax");

        let result = registry.resolve(Method::GET, "/a/123/456/b");
        assert!(matches!(result, Err(Error::RouteNotFound(_, _))));
    }

    #[tokio::test]
    async fn test_first_registered_dynamic_route_wins() {
        let mut registry = RouteRegistry::new();
        registry.add(&[Method::GET], "/items/:id", tagged("first")).unwrap();
        registry.add(&[Method::GET], "/:kind/:id", tagged("second")).unwrap();

        let (responder, params) = registry.resolve(Method::GET, "/items/7").unwrap();
        assert_eq!(body_of(responder, params).await, "first");

        let (responder, params) = registry.resolve(Method::GET, "/things/7").unwrap();
        assert_eq!(params["kind"], "things");
        assert_eq!(body_of(responder, params).await, "second");
    }

    #[tokio::test]
    async fn test_reregistration_keeps_original_priority() {
        let mut registry = RouteRegistry::new();
        registry.add(&[Method::GET], "/items/:id", tagged("first")).unwrap();
        registry.add(&[Method::GET], "/:kind/:id", tagged("second")).unwrap();
        registry.add(&[Method::GET], "/items/:id", tagged("replaced")).unwrap();

        let (responder, params) = registry.resolve(Method::GET, "/items/7").unwrap();
        assert_eq!(body_of(responder, params).await, "replaced");
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_dynamic_route_skipped_when_method_missing() {
        let mut registry = RouteRegistry::new();
        registry.add(&[Method::POST], "/items/:id", tagged("post-only")).unwrap();
        registry.add(&[Method::GET], "/:kind/:id", tagged("any")).unwrap();

        let (responder, params) = registry.resolve(Method::GET, "/items/7").unwrap();
        assert_eq!(body_of(responder, params).await, "any");
    }

    #[tokio::test]
    async fn test_default_responder_fallback() {
        let mut registry = RouteRegistry::new();
        registry.add(&[Method::GET], "/known", tagged("known")).unwrap();

        assert!(matches!(
            registry.resolve(Method::GET, "/unknown"),
            Err(Error::RouteNotFound(Method::GET, _))
        ));

        assert!(!registry.has_default());
        registry.set_default(Some(tagged("default")));
        assert!(registry.has_default());
        let (responder, params) = registry.resolve(Method::GET, "/unknown").unwrap();
        assert!(params.is_empty());
        assert_eq!(body_of(responder, params).await, "default");
    }

    #[test]
    fn test_missing_methods_or_path_is_noop() {
        let mut registry = RouteRegistry::new();
        registry.add(&[], "/x", tagged("x")).unwrap();
        registry.add(&[Method::GET], "", tagged("x")).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let mut registry = RouteRegistry::new();
        let result = registry.add(&[Method::GET], "/:id/:id", tagged("x"));
        assert!(matches!(result, Err(Error::InvalidRoute(_, _))));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_route_listing() {
        let mut registry = RouteRegistry::new();
        registry.add(&[Method::POST, Method::GET], "/b", tagged("b")).unwrap();
        registry.add(&[Method::GET], "/a", tagged("a")).unwrap();
        registry.add(&[Method::GET], "/u/:id", tagged("u")).unwrap();

        let routes = registry.routes();
        assert_eq!(routes, vec![
            (Method::GET, "/a".to_string()),
            (Method::GET, "/b".to_string()),
            (Method::POST, "/b".to_string()),
            (Method::GET, "/u/:id".to_string()),
        ]);
    }
}
