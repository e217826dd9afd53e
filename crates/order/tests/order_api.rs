use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use order::{
    abstract_trait::order::repository::DynOrderQueryRepository, handler::AppRouter,
    repository::order::InMemoryOrderRepository, state::AppState,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn app(repository: InMemoryOrderRepository) -> Router {
    let state = AppState::build(Arc::new(repository) as DynOrderQueryRepository, 100).unwrap();
    AppRouter::build(Arc::new(state))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, body)
}

fn order_ids(body: &Value) -> Vec<i64> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|order| order["order_id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn v1_returns_full_aggregates() {
    let app = app(InMemoryOrderRepository::seeded());

    let (status, body) = get(&app, "/api/v1/orders").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    let first = &body["data"][0];
    assert_eq!(first["order"]["order_id"], 1);
    assert_eq!(first["member"]["name"], "userA");
    assert_eq!(first["delivery"]["status"], "READY");
    assert_eq!(first["order_items"].as_array().unwrap().len(), 2);
    assert_eq!(first["order_items"][1]["item"]["name"], "JPA2 BOOK");
}

#[tokio::test]
async fn summary_endpoints_agree() {
    let app = app(InMemoryOrderRepository::seeded());

    let (status, v2) = get(&app, "/api/v2/orders").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order_ids(&v2), vec![1, 2]);

    let line = &v2["data"][1]["items"][0];
    assert_eq!(line["item_name"], "SPRING1 BOOK");
    assert_eq!(line["price"], 20000);
    assert_eq!(line["quantity"], 3);
    assert_eq!(v2["data"][1]["address"]["city"], "Busan");
    assert_eq!(v2["data"][1]["status"], "ORDERED");

    for uri in ["/api/v3/orders", "/api/v3.1/orders", "/api/v5/orders", "/api/v6/orders"] {
        let (status, body) = get(&app, uri).await;

        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["data"], v2["data"], "{uri}");
    }
}

#[tokio::test]
async fn batched_endpoint_paginates() {
    let app = app(InMemoryOrderRepository::seeded());

    let (status, body) = get(&app, "/api/v3.1/orders?offset=0&limit=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order_ids(&body), vec![1]);

    let (_, body) = get(&app, "/api/v3.1/orders?offset=1").await;
    assert_eq!(order_ids(&body), vec![2]);

    let (_, body) = get(&app, "/api/v3.1/orders?offset=5&limit=10").await;
    assert!(order_ids(&body).is_empty());
}

#[tokio::test]
async fn join_endpoints_ignore_offset_and_limit() {
    let app = app(InMemoryOrderRepository::seeded());

    for uri in ["/api/v3/orders?offset=1&limit=1", "/api/v6/orders?offset=1&limit=1"] {
        let (status, body) = get(&app, uri).await;

        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(order_ids(&body), vec![1, 2], "{uri}");
    }
}

#[tokio::test]
async fn negative_window_is_rejected() {
    let app = app(InMemoryOrderRepository::seeded());

    for uri in [
        "/api/v3.1/orders?offset=-1",
        "/api/v3.1/orders?limit=-5",
        "/api/v3/orders?offset=-1",
        "/api/v6/orders?limit=-1",
    ] {
        let (status, body) = get(&app, uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "Validation failed", "{uri}");
    }

    let (_, body) = get(&app, "/api/v3.1/orders?offset=-1").await;
    assert_eq!(body["details"]["offset"][0], "offset must not be negative");
}

#[tokio::test]
async fn unparseable_window_is_rejected() {
    let app = app(InMemoryOrderRepository::seeded());

    let (status, body) = get(&app, "/api/v3.1/orders?limit=ten").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid query");
}

#[tokio::test]
async fn simple_order_endpoints_have_no_lines() {
    let app = app(InMemoryOrderRepository::seeded());

    let (_, expected) = get(&app, "/api/v4/orders").await;
    assert_eq!(order_ids(&expected), vec![1, 2]);
    assert!(expected["data"][0].get("items").is_none());
    assert_eq!(expected["data"][0]["member_name"], "userA");

    for uri in [
        "/api/v2/simple-orders",
        "/api/v3/simple-orders",
        "/api/v4/simple-orders",
    ] {
        let (status, body) = get(&app, uri).await;

        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["data"], expected["data"], "{uri}");
    }
}

#[tokio::test]
async fn simple_order_entities_resolve_only_member_and_delivery() {
    let app = app(InMemoryOrderRepository::seeded());

    let (status, body) = get(&app, "/api/v1/simple-orders").await;

    assert_eq!(status, StatusCode::OK);
    let orders = body["data"].as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["member"]["name"], "userA");
    assert_eq!(orders[1]["member"]["name"], "userB");
    assert_eq!(orders[1]["delivery"]["address"]["city"], "Busan");
    assert!(
        orders
            .iter()
            .all(|order| order["order_items"].as_array().unwrap().is_empty())
    );
}

#[tokio::test]
async fn empty_store_returns_empty_lists() {
    let app = app(InMemoryOrderRepository::new());

    for uri in ["/api/v1/orders", "/api/v3.1/orders", "/api/v6/orders", "/api/v4/simple-orders"] {
        let (status, body) = get(&app, uri).await;

        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["data"], Value::Array(vec![]), "{uri}");
    }
}

#[tokio::test]
async fn store_failure_is_an_internal_error() {
    let app = app(InMemoryOrderRepository::seeded().failing("store offline"));

    let (status, body) = get(&app, "/api/v2/orders").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "store offline");
}

#[tokio::test]
async fn metrics_expose_round_trips_per_strategy() {
    let app = app(InMemoryOrderRepository::seeded());

    get(&app, "/api/v3.1/orders").await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(text.contains("order_retrieval_round_trips"));
    assert!(text.contains("order_query_service_requests_total"));
}

#[tokio::test]
async fn openapi_document_lists_every_endpoint() {
    let app = app(InMemoryOrderRepository::seeded());

    let (status, body) = get(&app, "/api-docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    for path in [
        "/api/v1/orders",
        "/api/v3.1/orders",
        "/api/v6/orders",
        "/api/v1/simple-orders",
        "/api/v4/simple-orders",
    ] {
        assert!(body["paths"].get(path).is_some(), "{path}");
    }
}
