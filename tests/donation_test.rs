mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use serde_json::json;

use common::{decimal_value, TestApp};

#[tokio::test]
async fn monetary_donation_is_recorded_as_pending() {
    let app = TestApp::new().await;
    let user = app.seed_user("Donor", "customer").await;
    let charity = app.seed_charity("Food Bank").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/donations/money",
            Some(json!({
                "user_id": user.id,
                "charity_id": charity.id,
                "amount": "25.00",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = TestApp::body_json(response).await;
    let data = &body["data"];
    assert_eq!(data["status"], "pending");
    assert_eq!(decimal_value(&data["amount"]), dec!(25.00));
}

#[tokio::test]
async fn donation_to_unknown_charity_is_not_found() {
    let app = TestApp::new().await;
    let user = app.seed_user("Donor", "customer").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/donations/money",
            Some(json!({
                "user_id": user.id,
                "charity_id": uuid::Uuid::new_v4(),
                "amount": "10.00",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_positive_donation_amount_is_rejected() {
    let app = TestApp::new().await;
    let user = app.seed_user("Donor", "customer").await;
    let charity = app.seed_charity("Shelter").await;

    for amount in ["0", "-5.00"] {
        let response = app
            .request(
                Method::POST,
                "/api/v1/donations/money",
                Some(json!({
                    "user_id": user.id,
                    "charity_id": charity.id,
                    "amount": amount,
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn product_donation_decrements_stock() {
    let app = TestApp::new().await;
    let user = app.seed_user("Vendor User", "vendor").await;
    let vendor = app.seed_vendor("Bakery").await;
    let charity = app.seed_charity("Community Kitchen").await;
    let product = app
        .seed_product(vendor.id, "Rolls", dec!(1.00), 8, true)
        .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/donations/products",
            Some(json!({
                "user_id": user.id,
                "charity_id": charity.id,
                "product_id": product.id,
                "quantity": 5,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = TestApp::body_json(response).await;
    assert_eq!(body["data"]["quantity"], 5);

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/products/{}", product.id),
            None,
        )
        .await;
    let body = TestApp::body_json(response).await;
    assert_eq!(body["data"]["quantity"], 3);
}

#[tokio::test]
async fn donating_more_than_available_stock_is_rejected() {
    let app = TestApp::new().await;
    let user = app.seed_user("Vendor User", "vendor").await;
    let vendor = app.seed_vendor("Grocer").await;
    let charity = app.seed_charity("Pantry").await;
    let product = app
        .seed_product(vendor.id, "Cheese", dec!(3.00), 2, true)
        .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/donations/products",
            Some(json!({
                "user_id": user.id,
                "charity_id": charity.id,
                "product_id": product.id,
                "quantity": 3,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/products/{}", product.id),
            None,
        )
        .await;
    let body = TestApp::body_json(response).await;
    assert_eq!(body["data"]["quantity"], 2);
}

#[tokio::test]
async fn ineligible_product_cannot_be_donated() {
    let app = TestApp::new().await;
    let user = app.seed_user("Vendor User", "vendor").await;
    let vendor = app.seed_vendor("Deli").await;
    let charity = app.seed_charity("Mission").await;
    let product = app
        .seed_product(vendor.id, "Hot meals", dec!(5.00), 4, false)
        .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/donations/products",
            Some(json!({
                "user_id": user.id,
                "charity_id": charity.id,
                "product_id": product.id,
                "quantity": 1,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = TestApp::body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("not marked"));
}

#[tokio::test]
async fn donation_status_lifecycle_is_enforced() {
    let app = TestApp::new().await;
    let user = app.seed_user("Donor", "customer").await;
    let charity = app.seed_charity("Relief Fund").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/donations/money",
            Some(json!({
                "user_id": user.id,
                "charity_id": charity.id,
                "amount": "15.00",
            })),
        )
        .await;
    let body = TestApp::body_json(response).await;
    let donation_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/donations/{}/status", donation_id),
            Some(json!({"status": "failed"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // failed is terminal.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/donations/{}/status", donation_id),
            Some(json!({"status": "completed"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn donation_listings_filter_by_charity() {
    let app = TestApp::new().await;
    let user = app.seed_user("Donor", "customer").await;
    let first = app.seed_charity("First").await;
    let second = app.seed_charity("Second").await;

    for charity_id in [first.id, first.id, second.id] {
        let response = app
            .request(
                Method::POST,
                "/api/v1/donations/money",
                Some(json!({
                    "user_id": user.id,
                    "charity_id": charity_id,
                    "amount": "5.00",
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/donations?charity_id={}", first.id),
            None,
        )
        .await;
    let body = TestApp::body_json(response).await;
    assert_eq!(body["data"]["total"], 2);
}
