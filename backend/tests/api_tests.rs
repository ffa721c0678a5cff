//! HTTP API tests
//!
//! Drives the full router over the in-memory store with
//! `tower::ServiceExt::oneshot`, checking status codes and error bodies.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use stock_ledger::{create_app, store::MemoryStore, AppState, Config};
use tower::ServiceExt;

fn app() -> Router {
    let config = Config::defaults("test").unwrap();
    create_app(AppState::new(Arc::new(MemoryStore::new()), config))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}

async fn create_product(app: &Router, name: &str, initial_quantity: i64) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/products",
        Some(json!({
            "name": name,
            "unit_price": "2.50",
            "initial_quantity": initial_quantity
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

// ============================================================================
// Movements
// ============================================================================

#[cfg(test)]
mod movement_api_tests {
    use super::*;

    #[tokio::test]
    async fn test_record_movement_returns_created() {
        let app = app();
        let product_id = create_product(&app, "Gasoil", 10).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/movements",
            Some(json!({
                "product_id": product_id,
                "movement_type": "outgoing",
                "quantity": 4
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], body["movement"]["id"]);
        assert_eq!(body["movement"]["movement_type"], "outgoing");

        let (status, product) =
            send(&app, Method::GET, &format!("/api/v1/products/{}", product_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(product["quantity"], 6);
    }

    #[tokio::test]
    async fn test_oversell_is_unprocessable() {
        let app = app();
        let product_id = create_product(&app, "Huile", 2).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/movements",
            Some(json!({
                "product_id": product_id,
                "movement_type": "outgoing",
                "quantity": 3
            })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "INSUFFICIENT_STOCK");
        assert!(body["error"]["message_fr"]
            .as_str()
            .unwrap()
            .starts_with("Stock insuffisant"));
    }

    #[tokio::test]
    async fn test_zero_quantity_is_bad_request() {
        let app = app();
        let product_id = create_product(&app, "Huile", 2).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/movements",
            Some(json!({
                "product_id": product_id,
                "movement_type": "incoming",
                "quantity": 0
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn test_unknown_movement_type_rejected() {
        let app = app();
        let product_id = create_product(&app, "Huile", 2).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/movements",
            Some(json!({
                "product_id": product_id,
                "movement_type": "2",
                "quantity": 1
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_ARGUMENT");
        assert!(body["error"]["message_en"].as_str().unwrap().contains("movement_type"));
    }

    #[tokio::test]
    async fn test_malformed_body_uses_error_envelope() {
        let app = app();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/movements")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"product_id\": "))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "INVALID_ARGUMENT");
        assert!(body["error"]["message_fr"].is_string());
    }

    #[tokio::test]
    async fn test_missing_field_on_category_is_bad_request() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/categories",
            Some(json!({ "description": "sans nom" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn test_movement_log_and_csv_export() {
        let app = app();
        create_product(&app, "Gasoil", 10).await;

        let (status, log) = send(&app, Method::GET, "/api/v1/movements", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(log.as_array().unwrap().len(), 1);
        assert_eq!(log[0]["product_name"], "Gasoil");

        let (status, csv) =
            send(&app, Method::GET, "/api/v1/movements/export?format=csv", None).await;
        assert_eq!(status, StatusCode::OK);
        let csv = csv.as_str().unwrap();
        assert!(csv.starts_with("id,product_id,product_name"));
        assert!(csv.contains("Gasoil"));
    }

    #[tokio::test]
    async fn test_movements_cannot_be_edited() {
        let app = app();
        create_product(&app, "Gasoil", 10).await;
        let (_, log) = send(&app, Method::GET, "/api/v1/movements", None).await;
        let id = log[0]["id"].as_str().unwrap();

        let (status, _) =
            send(&app, Method::DELETE, &format!("/api/v1/movements/{}", id), None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}

// ============================================================================
// Products, categories and dashboard
// ============================================================================

#[cfg(test)]
mod record_api_tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::GET,
            "/api/v1/products/00000000-0000-0000-0000-000000000000",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_delete_referenced_category_conflicts() {
        let app = app();
        let (status, category) = send(
            &app,
            Method::POST,
            "/api/v1/categories",
            Some(json!({ "name": "Carburants" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let category_id = category["id"].as_str().unwrap();

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/products",
            Some(json!({
                "name": "Gasoil",
                "unit_price": "1.20",
                "category_id": category_id
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            &app,
            Method::DELETE,
            &format!("/api/v1/categories/{}", category_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "REFERENTIAL_CONFLICT");
    }

    #[tokio::test]
    async fn test_low_stock_and_audit() {
        let app = app();
        let low_id = create_product(&app, "Gasoil", 3).await;
        create_product(&app, "Huile", 40).await;

        let (status, low) = send(&app, Method::GET, "/api/v1/products/low-stock", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(low.as_array().unwrap().len(), 1);
        assert_eq!(low[0]["id"], low_id.as_str());

        let (status, audit) = send(
            &app,
            Method::GET,
            &format!("/api/v1/products/{}/audit", low_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(audit["consistent"], true);
        assert_eq!(audit["incoming_total"], 3);
    }

    #[tokio::test]
    async fn test_dashboard_stats_empty() {
        let app = app();
        let (status, stats) = send(&app, Method::GET, "/api/v1/dashboard/stats", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["total_products"], 0);
        assert_eq!(stats["total_movements"], 0);
        assert_eq!(stats["total_suppliers"], 0);
    }

    #[tokio::test]
    async fn test_stock_value_overflow_rejected_on_create() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/products",
            Some(json!({
                "name": "Kerosene",
                "unit_price": "9999999999",
                "initial_quantity": 9_000_000_000_000_000_000i64
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_ARGUMENT");

        let (status, stats) = send(&app, Method::GET, "/api/v1/dashboard/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["total_products"], 0);
    }

    #[tokio::test]
    async fn test_health() {
        let app = app();
        let (status, health) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["database"], "connected");
    }
}
