//! HTTP surface: middleware resolution and the route description handler.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use odata_routing::config::{ODataRouteConfig, RoutingConfig};
use odata_routing::http::HttpServer;

fn router() -> Router {
    let config = RoutingConfig {
        virtual_path_root: "/services".into(),
        routes: vec![
            ODataRouteConfig {
                name: "tenant".into(),
                prefix: Some("{tenant}/odata".into()),
                relaxed_version: false,
                host: None,
            },
            ODataRouteConfig {
                name: "default".into(),
                prefix: Some("odata".into()),
                relaxed_version: true,
                host: None,
            },
        ],
        ..RoutingConfig::default()
    };
    HttpServer::new(config).unwrap().router()
}

async fn body_json(body: Body) -> Value {
    let bytes = to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_matched_request_is_described() {
    let response = router()
        .oneshot(
            Request::builder()
                .uri("/services/odata/Customers(1)")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response.into_body()).await,
        json!({
            "route": "default",
            "values": { "odataPath": "Customers(1)" },
            "link": "odata/Customers(1)"
        })
    );
}

#[tokio::test]
async fn test_delegated_route_regenerates_link() {
    let response = router()
        .oneshot(
            Request::builder()
                .uri("/services/contoso/odata/People")
                .header("OData-Version", "4.0")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["route"], "tenant");
    assert_eq!(body["values"]["tenant"], "contoso");
    assert_eq!(body["link"], "contoso/odata/People");
}

#[tokio::test]
async fn test_unmatched_request_is_not_found() {
    let response = router()
        .oneshot(Request::builder().uri("/elsewhere/People").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_strict_route_rejects_legacy_header() {
    // Strict tenant route refuses; relaxed default route only serves "odata/...".
    let response = router()
        .oneshot(
            Request::builder()
                .uri("/services/contoso/odata/People")
                .header("DataServiceVersion", "3.0")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_only_get_is_described() {
    let response = router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/services/odata/People")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
