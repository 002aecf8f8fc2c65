mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn expiry_date_round_trips_exactly() {
    let app = TestApp::new().await;
    let vendor = app.seed_vendor("Bakery").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({
                "name": "Sourdough",
                "price": "3.25",
                "quantity": 6,
                "expiry_date": "2025-03-01",
                "vendor_id": vendor.id,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = TestApp::body_json(response).await;
    let product_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["expiry_date"], "2025-03-01");

    // The stored date reads back without any timezone shift.
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/products/{}", product_id),
            None,
        )
        .await;
    let body = TestApp::body_json(response).await;
    assert_eq!(body["data"]["expiry_date"], "2025-03-01");
}

#[tokio::test]
async fn malformed_expiry_date_is_rejected() {
    let app = TestApp::new().await;
    let vendor = app.seed_vendor("Grocer").await;

    for bad_date in ["03/01/2025", "2025-13-40", "tomorrow"] {
        let response = app
            .request(
                Method::POST,
                "/api/v1/products",
                Some(json!({
                    "name": "Milk",
                    "price": "1.10",
                    "quantity": 3,
                    "expiry_date": bad_date,
                    "vendor_id": vendor.id,
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{bad_date}");
    }
}

#[tokio::test]
async fn creating_product_for_unknown_vendor_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({
                "name": "Eggs",
                "price": "2.00",
                "quantity": 12,
                "expiry_date": "2025-04-01",
                "vendor_id": uuid::Uuid::new_v4(),
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn negative_price_is_rejected() {
    let app = TestApp::new().await;
    let vendor = app.seed_vendor("Stand").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({
                "name": "Pears",
                "price": "-1.00",
                "quantity": 5,
                "expiry_date": "2025-04-01",
                "vendor_id": vendor.id,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn only_the_owning_vendor_can_update_or_delete() {
    let app = TestApp::new().await;
    let owner = app.seed_vendor("Owner").await;
    let other = app.seed_vendor("Other").await;
    let product = app
        .seed_product(owner.id, "Juice", dec!(2.00), 4, false)
        .await;

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/products/{}", product.id),
            Some(json!({
                "vendor_id": other.id,
                "price": "1.00",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/products/{}?vendor_id={}", product.id, other.id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The owner can do both.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/products/{}", product.id),
            Some(json!({
                "vendor_id": owner.id,
                "price": "1.50",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/products/{}?vendor_id={}", product.id, owner.id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/products/{}", product.id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn referenced_product_cannot_be_deleted() {
    let app = TestApp::new().await;
    let user = app.seed_user("Buyer", "customer").await;
    let vendor = app.seed_vendor("Shop").await;
    let product = app
        .seed_product(vendor.id, "Salad", dec!(3.50), 5, false)
        .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "user_id": user.id,
                "product_id": product.id,
                "quantity": 1,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/products/{}?vendor_id={}", product.id, vendor.id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn product_listing_paginates() {
    let app = TestApp::new().await;
    let vendor = app.seed_vendor("Warehouse").await;

    for i in 0..5 {
        app.seed_product(vendor.id, &format!("Item {i}"), dec!(1.00), 1, false)
            .await;
    }

    let response = app
        .request(Method::GET, "/api/v1/products?page=1&per_page=2", None)
        .await;
    let body = TestApp::body_json(response).await;
    assert_eq!(body["data"]["total"], 5);
    assert_eq!(body["data"]["products"].as_array().unwrap().len(), 2);
}
