mod common;

use http::StatusCode;
use serde_json::json;

use common::TestApp;

async fn create_buyer(app: &TestApp, name: &str) -> String {
    let (status, buyer) = app
        .post(
            "/api/v1/buyers",
            json!({ "name": name, "contact_person": "A. Khan", "email": "khan@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{buyer}");
    buyer["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn buyer_crud_roundtrip() {
    let app = TestApp::new().await;
    let id = create_buyer(&app, "Evergreen Apparel").await;

    let (status, buyer) = app.get(&format!("/api/v1/buyers/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(buyer["name"], "Evergreen Apparel");

    let (status, updated) = app
        .put(&format!("/api/v1/buyers/{id}"), json!({ "phone": "555-0101" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["phone"], "555-0101");

    let (status, _) = app.delete(&format!("/api/v1/buyers/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&format!("/api/v1/buyers/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn buyer_search_deduplicates_case_insensitively() {
    let app = TestApp::new().await;
    create_buyer(&app, "Evergreen Apparel").await;
    create_buyer(&app, "EVERGREEN APPAREL").await;
    create_buyer(&app, "Northwind Garments").await;

    let (status, hits) = app.get("/api/v1/orders/search/buyers?q=vergreen").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits.as_array().unwrap().len(), 1, "{hits}");
}

#[tokio::test]
async fn order_requires_existing_buyer() {
    let app = TestApp::new().await;
    let (status, body) = app
        .post(
            "/api/v1/orders",
            json!({
                "order_number": "SO-100",
                "buyer_id": "00000000-0000-0000-0000-000000000000",
                "style_number": "ST-9",
                "quantity": 500
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
}

#[tokio::test]
async fn order_status_lifecycle() {
    let app = TestApp::new().await;
    let buyer_id = create_buyer(&app, "Evergreen Apparel").await;

    let (status, order) = app
        .post(
            "/api/v1/orders",
            json!({
                "order_number": "SO-100",
                "buyer_id": buyer_id,
                "style_number": "ST-9",
                "quantity": 500,
                "delivery_date": "2026-10-01"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{order}");
    assert_eq!(order["status"], "pending");
    let order_id = order["id"].as_str().unwrap();

    let (status, order) = app
        .put(
            &format!("/api/v1/orders/{order_id}/status"),
            json!({ "status": "in_production" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "in_production");

    let (status, _) = app
        .put(
            &format!("/api/v1/orders/{order_id}/status"),
            json!({ "status": "shipped" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, filtered) = app
        .get(&format!("/api/v1/orders?status=in_production&buyer_id={buyer_id}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(filtered["items"].as_array().unwrap().len(), 1);
    assert_eq!(filtered["total"], 1);
}

#[tokio::test]
async fn production_records_attach_to_orders_and_machines() {
    let app = TestApp::new().await;
    let buyer_id = create_buyer(&app, "Evergreen Apparel").await;
    let (_, order) = app
        .post(
            "/api/v1/orders",
            json!({
                "order_number": "SO-101",
                "buyer_id": buyer_id,
                "style_number": "ST-9",
                "quantity": 500
            }),
        )
        .await;
    let order_id = order["id"].as_str().unwrap();

    let (status, machine) = app
        .post(
            "/api/v1/machines",
            json!({ "machine_number": "M-07", "machine_type": "overlock", "brand": "Juki" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(machine["status"], "active");
    let machine_id = machine["id"].as_str().unwrap();

    let (status, production) = app
        .post(
            "/api/v1/productions",
            json!({
                "order_id": order_id,
                "production_date": "2026-08-20",
                "stage": "stitching",
                "quantity": 120,
                "machine_id": machine_id,
                "operator": "Meena"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{production}");

    let (status, _) = app
        .post(
            "/api/v1/productions",
            json!({
                "order_id": order_id,
                "production_date": "2026-08-20",
                "stage": "ironing",
                "quantity": 120
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "unknown stage");

    let (status, listed) = app
        .get(&format!("/api/v1/productions?order_id={order_id}&stage=stitching"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn machine_status_updates_are_validated() {
    let app = TestApp::new().await;
    let (_, machine) = app
        .post(
            "/api/v1/machines",
            json!({ "machine_number": "M-08", "machine_type": "lockstitch" }),
        )
        .await;
    let id = machine["id"].as_str().unwrap();

    let (status, updated) = app
        .put(&format!("/api/v1/machines/{id}"), json!({ "status": "maintenance" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "maintenance");

    let (status, _) = app
        .put(&format!("/api/v1/machines/{id}"), json!({ "status": "broken" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn listing_is_paginated() {
    let app = TestApp::new().await;
    for i in 0..5 {
        create_buyer(&app, &format!("Buyer {i}")).await;
    }

    let (status, page) = app.get("/api/v1/buyers?page=1&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["items"].as_array().unwrap().len(), 2);
    assert_eq!(page["total"], 5);
    assert_eq!(page["page"], 1);
    assert_eq!(page["limit"], 2);

    let (_, last) = app.get("/api/v1/buyers?page=3&limit=2").await;
    assert_eq!(last["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn health_and_status_respond() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = app.get("/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "garment-api");
    assert_eq!(body["environment"], "test");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new().await;
    let (status, doc) = app.get("/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]
        .as_object()
        .unwrap()
        .contains_key("/api/v1/store-entries"));
}
