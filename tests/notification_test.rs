mod common;

use std::time::Duration;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use serde_json::json;

use common::TestApp;

/// Polls the notification listing until at least `min` rows show up.
/// Notifications are written asynchronously by the event loop.
async fn wait_for_notifications(app: &TestApp, user_id: uuid::Uuid, min: u64) -> serde_json::Value {
    for _ in 0..50 {
        let response = app
            .request(
                Method::GET,
                &format!("/api/v1/notifications/user/{}", user_id),
                None,
            )
            .await;
        let body = TestApp::body_json(response).await;
        if body["data"]["total"].as_u64().unwrap_or(0) >= min {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("notifications never arrived for user {user_id}");
}

#[tokio::test]
async fn placing_an_order_notifies_the_buyer() {
    let app = TestApp::new().await;
    let user = app.seed_user("Buyer", "customer").await;
    let vendor = app.seed_vendor("Vendor").await;
    let product = app
        .seed_product(vendor.id, "Bagels", dec!(1.25), 6, false)
        .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "user_id": user.id,
                "product_id": product.id,
                "quantity": 2,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = wait_for_notifications(&app, user.id, 1).await;
    let message = body["data"]["notifications"][0]["message"]
        .as_str()
        .unwrap();
    assert!(message.contains("Order placed"));
    assert!(message.contains("Bagels"));
}

#[tokio::test]
async fn notification_lifecycle_create_read_delete() {
    let app = TestApp::new().await;
    let user = app.seed_user("Reader", "customer").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/notifications",
            Some(json!({
                "user_id": user.id,
                "message": "Welcome to WasteSmart",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = TestApp::body_json(response).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["read_status"], false);

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/notifications/{}/read", id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = TestApp::body_json(response).await;
    assert_eq!(body["data"]["read_status"], true);

    let response = app
        .request(Method::DELETE, &format!("/api/v1/notifications/{}", id), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .request(Method::DELETE, &format!("/api/v1/notifications/{}", id), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn notification_for_unknown_user_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/notifications",
            Some(json!({
                "user_id": uuid::Uuid::new_v4(),
                "message": "Hello",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
