mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use serde_json::json;

use common::{decimal_value, TestApp};

async fn place_order(app: &TestApp) -> (uuid::Uuid, String) {
    let user = app.seed_user("Payer", "customer").await;
    let vendor = app.seed_vendor("Vendor").await;
    let product = app
        .seed_product(vendor.id, "Pastries", dec!(2.50), 10, false)
        .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "user_id": user.id,
                "product_id": product.id,
                "quantity": 3,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = TestApp::body_json(response).await;
    let order_id = body["data"]["id"].as_str().unwrap().to_string();
    (user.id, order_id)
}

#[tokio::test]
async fn exact_payment_is_recorded_as_pending() {
    let app = TestApp::new().await;
    let (user_id, order_id) = place_order(&app).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/payments",
            Some(json!({
                "user_id": user_id,
                "order_id": order_id,
                "amount": "7.50",
                "payment_method": "card",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = TestApp::body_json(response).await;
    let data = &body["data"];
    assert_eq!(data["status"], "pending");
    assert_eq!(data["payment_method"], "card");
    assert_eq!(decimal_value(&data["amount"]), dec!(7.50));
}

#[tokio::test]
async fn mismatched_amount_is_rejected_and_nothing_is_persisted() {
    let app = TestApp::new().await;
    let (user_id, order_id) = place_order(&app).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/payments",
            Some(json!({
                "user_id": user_id,
                "order_id": order_id,
                "amount": "7.49",
                "payment_method": "card",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = TestApp::body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("Amount mismatch"));

    // No payment row exists for the order.
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/payments?order_id={}", order_id),
            None,
        )
        .await;
    let body = TestApp::body_json(response).await;
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn payment_for_unknown_order_is_not_found() {
    let app = TestApp::new().await;
    let user = app.seed_user("Ghost", "customer").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/payments",
            Some(json!({
                "user_id": user.id,
                "order_id": uuid::Uuid::new_v4(),
                "amount": "1.00",
                "payment_method": "paypal",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_payment_method_is_rejected() {
    let app = TestApp::new().await;
    let (user_id, order_id) = place_order(&app).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/payments",
            Some(json!({
                "user_id": user_id,
                "order_id": order_id,
                "amount": "7.50",
                "payment_method": "bitcoin",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_payments_for_one_order_are_both_recorded() {
    let app = TestApp::new().await;
    let (user_id, order_id) = place_order(&app).await;

    for _ in 0..2 {
        let response = app
            .request(
                Method::POST,
                "/api/v1/payments",
                Some(json!({
                    "user_id": user_id,
                    "order_id": order_id,
                    "amount": "7.50",
                    "payment_method": "upi",
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/payments?order_id={}", order_id),
            None,
        )
        .await;
    let body = TestApp::body_json(response).await;
    assert_eq!(body["data"]["total"], 2);
}

#[tokio::test]
async fn payment_status_lifecycle_is_enforced() {
    let app = TestApp::new().await;
    let (user_id, order_id) = place_order(&app).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/payments",
            Some(json!({
                "user_id": user_id,
                "order_id": order_id,
                "amount": "7.50",
                "payment_method": "card",
            })),
        )
        .await;
    let body = TestApp::body_json(response).await;
    let payment_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/payments/{}/status", payment_id),
            Some(json!({"status": "completed"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // completed is terminal.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/payments/{}/status", payment_id),
            Some(json!({"status": "failed"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
