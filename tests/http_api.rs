//! End-to-end HTTP tests through the full router.

mod common;

use axum::http::{Method, StatusCode};
use common::{cart, TestApp};
use serde_json::json;

#[tokio::test]
async fn checkout_round_trip() {
    let app = TestApp::new().await;
    app.insert_product(1, 10.0, "22K Gold", 100.0, 1000.0).await;

    let (status, body) = app
        .request(Method::POST, "/create-payment", Some(cart("user-1", &[(1, 1000.0, 2)])))
        .await;
    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["order"]["status"], json!("pending"));
    assert_eq!(body["order"]["subtotal"], json!(2000.0));
    assert_eq!(body["order"]["advance_paid"], json!(500.0));
    assert_eq!(body["order"]["remaining"], json!(1500.0));
    assert!(body["message"].as_str().unwrap().contains("Advance due now"));

    let order_id = body["order"]["id"].as_str().unwrap().to_string();
    let order_number = body["order"]["order_number"].as_str().unwrap().to_string();

    let (status, body) = app
        .request(
            Method::POST,
            "/verify-payment",
            Some(json!({ "orderId": order_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["success"], json!(true));

    let (status, body) = app
        .request(Method::GET, &format!("/api/v1/orders/{order_id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("confirmed"));
    assert!(body["data"]["payment_id"]
        .as_str()
        .unwrap()
        .starts_with("offline_"));

    let (status, body) = app
        .request(
            Method::GET,
            &format!("/api/v1/orders/by-number/{order_number}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], json!(order_id));

    let (status, body) = app
        .request(Method::GET, "/api/v1/users/user-1/orders", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn second_verification_reports_already_confirmed() {
    let app = TestApp::new().await;
    let (_, body) = app
        .request(Method::POST, "/create-payment", Some(cart("user-2", &[(50, 100.0, 1)])))
        .await;
    let order_id = body["order"]["id"].clone();

    let (first, _) = app
        .request(Method::POST, "/verify-payment", Some(json!({ "orderId": order_id })))
        .await;
    let (second, body) = app
        .request(Method::POST, "/verify-payment", Some(json!({ "orderId": order_id })))
        .await;
    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("already confirmed"));
}

#[tokio::test]
async fn empty_cart_returns_error_body() {
    let app = TestApp::new().await;
    let (status, body) = app
        .request(
            Method::POST,
            "/create-payment",
            Some(json!({ "items": [], "userId": "user-3" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn verify_payment_rejects_bad_ids() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request(
            Method::POST,
            "/verify-payment",
            Some(json!({ "orderId": "not-a-uuid" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid order id"));

    let (status, body) = app
        .request(
            Method::POST,
            "/verify-payment",
            Some(json!({ "orderId": uuid::Uuid::new_v4().to_string() })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn order_lookup_errors() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request(Method::GET, "/api/v1/orders/not-a-uuid", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Bad Request"));

    let (status, body) = app
        .request(
            Method::GET,
            &format!("/api/v1/orders/{}", uuid::Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("Not Found"));
}

#[tokio::test]
async fn product_price_and_reprice() {
    let app = TestApp::new().await;
    app.insert_making_cost("22K Gold", 10.0).await;
    app.insert_product(2, 10.0, "22K Gold", 100.0, 1000.0).await;

    let (status, body) = app
        .request(Method::GET, "/api/v1/products/2/price", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["unit_price"], json!(1100.0));
    assert_eq!(body["data"]["gst_percentage"], json!(18.0));
    assert_eq!(body["data"]["gst_source"], json!("default"));
    assert_eq!(body["data"]["making_charge_source"], json!("stored"));

    let (status, body) = app
        .request(Method::POST, "/api/v1/products/2/reprice", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Product 2 repriced"));

    let (status, _) = app
        .request(Method::GET, "/api/v1/products/999/price", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = TestApp::new().await;
    let response = app.raw_request(Method::GET, "/status", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let rid = response
        .headers()
        .get("x-request-id")
        .expect("request id header")
        .to_str()
        .unwrap();
    assert!(!rid.is_empty());
}

#[tokio::test]
async fn operational_endpoints() {
    let app = TestApp::new().await;

    let (status, body) = app.request(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("healthy"));

    let (status, body) = app.request(Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/create-payment"].is_object());

    // Create one order so the counter has something to show
    app.request(Method::POST, "/create-payment", Some(cart("user-4", &[(60, 10.0, 1)])))
        .await;
    let (status, body) = app.request(Method::GET, "/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_str().unwrap().contains("orders_created_total"));
}
