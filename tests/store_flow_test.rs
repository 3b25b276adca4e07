mod common;

use http::StatusCode;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use common::{dec, TestApp};

async fn create_completed_purchase(app: &TestApp) -> (String, String) {
    let (status, purchase) = app
        .post(
            "/api/v1/purchases",
            json!({
                "purchase_number": "PO-1001",
                "purchase_date": "2026-08-01",
                "items": [
                    {
                        "supplier_name": "Shah Textiles",
                        "item_name": "Poplin White",
                        "unit": "m",
                        "quantity": 100,
                        "unit_cost": 50,
                        "gst_rate": 5,
                        "details": { "kind": "fabric", "color": "white", "gsm": 120 }
                    },
                    {
                        "supplier_name": "Button House",
                        "item_name": "Buttons 18L",
                        "unit": "gross",
                        "quantity": 50,
                        "unit_cost": 10,
                        "gst_rate": 5,
                        "details": { "kind": "buttons", "size_ligne": 18 }
                    }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "create purchase: {purchase}");
    let id = purchase["id"].as_str().unwrap().to_string();

    let (status, _) = app.patch(&format!("/api/v1/purchases/{id}/complete")).await;
    assert_eq!(status, StatusCode::OK);

    (id, purchase["purchase_number"].as_str().unwrap().to_string())
}

async fn create_store_entry(app: &TestApp, purchase_id: &str) -> String {
    let (status, entry) = app
        .post(
            "/api/v1/store-entries",
            json!({
                "purchase_id": purchase_id,
                "entry_date": "2026-08-05",
                "items": [
                    {
                        "item_name": "Poplin White",
                        "supplier_name": "Shah Textiles",
                        "unit": "m",
                        "purchase_qty": 100,
                        "invoice_qty": 100,
                        "store_in_qty": 95
                    },
                    {
                        "item_name": "Buttons 18L",
                        "supplier_name": "Button House",
                        "unit": "gross",
                        "purchase_qty": 50,
                        "invoice_qty": 45,
                        "store_in_qty": 50
                    }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "create store entry: {entry}");
    entry["id"].as_str().unwrap().to_string()
}

fn stock_row<'a>(rows: &'a Value, item_name: &str) -> &'a Value {
    rows.as_array()
        .unwrap()
        .iter()
        .find(|row| row["item_name"] == item_name)
        .unwrap_or_else(|| panic!("no row for {item_name} in {rows}"))
}

#[tokio::test]
async fn purchase_total_includes_gst() {
    let app = TestApp::new().await;
    let (id, _) = create_completed_purchase(&app).await;

    let (status, purchase) = app.get(&format!("/api/v1/purchases/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    // 100 x 50 x 1.05 + 50 x 10 x 1.05
    assert_eq!(dec(&purchase["total_amount"]), dec!(5775));
}

#[tokio::test]
async fn purchase_status_only_moves_forward() {
    let app = TestApp::new().await;
    let (id, _) = create_completed_purchase(&app).await;

    let (status, body) = app.patch(&format!("/api/v1/purchases/{id}/partial")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, _) = app.patch(&format!("/api/v1/purchases/{id}/complete")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn completed_purchase_shows_as_pending_entry_until_received() {
    let app = TestApp::new().await;
    let (purchase_id, purchase_number) = create_completed_purchase(&app).await;

    let (status, pending) = app.get("/api/v1/store-entries/pending-purchases").await;
    assert_eq!(status, StatusCode::OK);
    assert!(pending
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p["id"] == purchase_id.as_str()));

    let (status, rows) = app.get("/api/v1/store-entries").await;
    assert_eq!(status, StatusCode::OK);
    let row = rows
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["purchase_id"] == purchase_id.as_str())
        .expect("synthetic pending row");
    assert_eq!(row["status"], "pending");
    assert_eq!(row["purchase_number"], purchase_number.as_str());
    assert!(row["id"].is_null());
    assert!(row["entry_date"].is_null());

    create_store_entry(&app, &purchase_id).await;

    let (_, pending) = app.get("/api/v1/store-entries/pending-purchases").await;
    assert!(pending.as_array().unwrap().is_empty());

    let (_, rows) = app.get("/api/v1/store-entries").await;
    let row = rows
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["purchase_id"] == purchase_id.as_str())
        .expect("persisted row");
    assert_eq!(row["status"], "completed");
    assert!(!row["id"].is_null());
}

#[tokio::test]
async fn store_entry_splits_shortage_and_surplus() {
    let app = TestApp::new().await;
    let (purchase_id, _) = create_completed_purchase(&app).await;
    let entry_id = create_store_entry(&app, &purchase_id).await;

    let (status, entry) = app.get(&format!("/api/v1/store-entries/{entry_id}")).await;
    assert_eq!(status, StatusCode::OK);

    let fabric = stock_row(&entry["items"], "Poplin White");
    assert_eq!(dec(&fabric["shortage"]), dec!(5));
    assert_eq!(dec(&fabric["surplus"]), dec!(0));

    let buttons = stock_row(&entry["items"], "Buttons 18L");
    assert_eq!(dec(&buttons["shortage"]), dec!(0));
    assert_eq!(dec(&buttons["surplus"]), dec!(5));
}

#[tokio::test]
async fn second_store_entry_for_same_purchase_conflicts() {
    let app = TestApp::new().await;
    let (purchase_id, _) = create_completed_purchase(&app).await;
    create_store_entry(&app, &purchase_id).await;

    let (status, body) = app
        .post(
            "/api/v1/store-entries",
            json!({
                "purchase_id": purchase_id,
                "entry_date": "2026-08-06",
                "items": [{
                    "item_name": "Poplin White",
                    "supplier_name": "Shah Textiles",
                    "unit": "m",
                    "purchase_qty": 100,
                    "invoice_qty": 100,
                    "store_in_qty": 100
                }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Conflict");
}

#[tokio::test]
async fn store_entry_requires_completed_purchase() {
    let app = TestApp::new().await;
    let (status, purchase) = app
        .post(
            "/api/v1/purchases",
            json!({
                "purchase_number": "PO-2001",
                "purchase_date": "2026-08-01",
                "items": [{
                    "supplier_name": "Shah Textiles",
                    "item_name": "Poplin White",
                    "unit": "m",
                    "quantity": 10,
                    "unit_cost": 50,
                    "gst_rate": 5,
                    "details": { "kind": "fabric", "color": null, "gsm": null }
                }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let purchase_id = purchase["id"].as_str().unwrap();

    let (status, body) = app
        .post(
            "/api/v1/store-entries",
            json!({
                "purchase_id": purchase_id,
                "entry_date": "2026-08-05",
                "items": [{
                    "item_name": "Poplin White",
                    "supplier_name": "Shah Textiles",
                    "unit": "m",
                    "purchase_qty": 10,
                    "invoice_qty": 10,
                    "store_in_qty": 10
                }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, _) = app
        .post(
            "/api/v1/store-entries",
            json!({
                "purchase_id": "00000000-0000-0000-0000-000000000000",
                "entry_date": "2026-08-05",
                "items": [{
                    "item_name": "Poplin White",
                    "supplier_name": "Shah Textiles",
                    "unit": "m",
                    "purchase_qty": 10,
                    "invoice_qty": 10,
                    "store_in_qty": 10
                }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stock_is_reconciled_from_logs() {
    let app = TestApp::new().await;
    let (purchase_id, _) = create_completed_purchase(&app).await;
    let entry_id = create_store_entry(&app, &purchase_id).await;

    let (status, stock) = app
        .get(&format!("/api/v1/store-logs/available-stock/{entry_id}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    let fabric = stock_row(&stock["stockData"], "Poplin White");
    assert_eq!(dec(&fabric["available_stock"]), dec!(95));
    assert_eq!(fabric["status"], "available");

    let (status, _) = app
        .post(
            "/api/v1/store-logs",
            json!({
                "store_entry_id": entry_id,
                "worker_name": "Ravi",
                "log_date": "2026-08-10",
                "items": [{ "item_name": "Poplin White", "taken_qty": 80 }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // 15 left, below 20% of 95.
    let (_, stock) = app
        .get(&format!("/api/v1/store-logs/available-stock/{entry_id}"))
        .await;
    let fabric = stock_row(&stock["stockData"], "Poplin White");
    assert_eq!(dec(&fabric["available_stock"]), dec!(15));
    assert_eq!(dec(&fabric["total_taken"]), dec!(80));
    assert_eq!(fabric["status"], "low");

    // Returning material brings it back up.
    let (status, _) = app
        .post(
            "/api/v1/store-logs",
            json!({
                "store_entry_id": entry_id,
                "worker_name": "Ravi",
                "log_date": "2026-08-11",
                "items": [{ "item_name": "Poplin White", "taken_qty": 0, "returned_qty": 10 }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, stock) = app
        .get(&format!("/api/v1/store-logs/available-stock/{entry_id}"))
        .await;
    let fabric = stock_row(&stock["stockData"], "Poplin White");
    assert_eq!(dec(&fabric["available_stock"]), dec!(25));
    assert_eq!(dec(&fabric["total_returned"]), dec!(10));
    assert_eq!(fabric["status"], "available");
}

#[tokio::test]
async fn taking_more_than_available_is_rejected() {
    let app = TestApp::new().await;
    let (purchase_id, _) = create_completed_purchase(&app).await;
    let entry_id = create_store_entry(&app, &purchase_id).await;

    let (status, _) = app
        .post(
            "/api/v1/store-logs",
            json!({
                "store_entry_id": entry_id,
                "worker_name": "Ravi",
                "log_date": "2026-08-10",
                "items": [{ "item_name": "Poplin White", "taken_qty": 90 }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Only 5 left.
    let (status, body) = app
        .post(
            "/api/v1/store-logs",
            json!({
                "store_entry_id": entry_id,
                "worker_name": "Sita",
                "log_date": "2026-08-10",
                "items": [{ "item_name": "Poplin White", "taken_qty": 6 }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["message"].as_str().unwrap().contains("Insufficient stock"),
        "{body}"
    );

    let (status, _) = app
        .post(
            "/api/v1/store-logs",
            json!({
                "store_entry_id": entry_id,
                "worker_name": "Sita",
                "log_date": "2026-08-10",
                "items": [{ "item_name": "Poplin White", "taken_qty": 5 }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, stock) = app
        .get(&format!("/api/v1/store-logs/available-stock/{entry_id}"))
        .await;
    let fabric = stock_row(&stock["stockData"], "Poplin White");
    assert_eq!(dec(&fabric["available_stock"]), dec!(0));
    assert_eq!(fabric["status"], "out_of_stock");
}

#[tokio::test]
async fn split_lines_for_one_item_cannot_overdraw_in_aggregate() {
    let app = TestApp::new().await;
    let (purchase_id, _) = create_completed_purchase(&app).await;
    let entry_id = create_store_entry(&app, &purchase_id).await;

    // 95 in store; each line fits on its own but not together.
    let (status, body) = app
        .post(
            "/api/v1/store-logs",
            json!({
                "store_entry_id": entry_id,
                "worker_name": "Ravi",
                "log_date": "2026-08-10",
                "items": [
                    { "item_name": "Poplin White", "taken_qty": 50 },
                    { "item_name": "Poplin White", "taken_qty": 50 }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert!(
        body["message"].as_str().unwrap().contains("Insufficient stock"),
        "{body}"
    );

    // Splitting the same item is fine when the total fits.
    let (status, _) = app
        .post(
            "/api/v1/store-logs",
            json!({
                "store_entry_id": entry_id,
                "worker_name": "Ravi",
                "log_date": "2026-08-10",
                "items": [
                    { "item_name": "Poplin White", "taken_qty": 50 },
                    { "item_name": "Poplin White", "taken_qty": 45 }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, stock) = app
        .get(&format!("/api/v1/store-logs/available-stock/{entry_id}"))
        .await;
    let fabric = stock_row(&stock["stockData"], "Poplin White");
    assert_eq!(dec(&fabric["available_stock"]), dec!(0));
    assert_eq!(fabric["status"], "out_of_stock");
}

#[tokio::test]
async fn store_log_rejects_items_outside_the_entry() {
    let app = TestApp::new().await;
    let (purchase_id, _) = create_completed_purchase(&app).await;
    let entry_id = create_store_entry(&app, &purchase_id).await;

    let (status, body) = app
        .post(
            "/api/v1/store-logs",
            json!({
                "store_entry_id": entry_id,
                "worker_name": "Ravi",
                "log_date": "2026-08-10",
                "items": [{ "item_name": "Zips", "taken_qty": 1 }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, _) = app
        .post(
            "/api/v1/store-logs",
            json!({
                "store_entry_id": "00000000-0000-0000-0000-000000000000",
                "worker_name": "Ravi",
                "log_date": "2026-08-10",
                "items": [{ "item_name": "Poplin White", "taken_qty": 1 }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn store_log_status_can_be_updated() {
    let app = TestApp::new().await;
    let (purchase_id, _) = create_completed_purchase(&app).await;
    let entry_id = create_store_entry(&app, &purchase_id).await;

    let (_, log) = app
        .post(
            "/api/v1/store-logs",
            json!({
                "store_entry_id": entry_id,
                "worker_name": "Ravi",
                "log_date": "2026-08-10",
                "items": [{ "item_name": "Poplin White", "taken_qty": 10 }]
            }),
        )
        .await;
    let log_id = log["id"].as_str().unwrap();
    assert_eq!(log["status"], "in_store");

    let (status, updated) = app
        .put(
            &format!("/api/v1/store-logs/{log_id}/status"),
            json!({ "status": "completed" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "completed");

    let (status, _) = app
        .put(
            &format!("/api/v1/store-logs/{log_id}/status"),
            json!({ "status": "nonsense" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn inventory_lists_and_filters_reconciled_rows() {
    let app = TestApp::new().await;
    let (purchase_id, _) = create_completed_purchase(&app).await;
    let entry_id = create_store_entry(&app, &purchase_id).await;

    let (_, _) = app
        .post(
            "/api/v1/store-logs",
            json!({
                "store_entry_id": entry_id,
                "worker_name": "Ravi",
                "log_date": "2026-08-10",
                "items": [{ "item_name": "Poplin White", "taken_qty": 95 }]
            }),
        )
        .await;

    let (status, rows) = app.get("/api/v1/inventory").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows.as_array().unwrap().len(), 2);
    let fabric = stock_row(&rows, "Poplin White");
    assert_eq!(fabric["status"], "out_of_stock");
    let buttons = stock_row(&rows, "Buttons 18L");
    assert_eq!(buttons["status"], "available");

    let (status, filtered) = app.get("/api/v1/inventory?status=out_of_stock").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(filtered.as_array().unwrap().len(), 1);
    assert_eq!(filtered[0]["item_name"], "Poplin White");

    let (status, _) = app.get("/api/v1/inventory?status=bogus").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, low) = app.get("/api/v1/inventory/low-stock").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(low.as_array().unwrap().len(), 1);
    assert_eq!(low[0]["item_name"], "Poplin White");
}

#[tokio::test]
async fn supplier_search_deduplicates_by_name() {
    let app = TestApp::new().await;
    create_completed_purchase(&app).await;

    let (status, purchase) = app
        .post(
            "/api/v1/purchases",
            json!({
                "purchase_number": "PO-1002",
                "purchase_date": "2026-08-02",
                "items": [{
                    "supplier_name": "shah textiles",
                    "item_name": "Poplin Blue",
                    "unit": "m",
                    "quantity": 40,
                    "unit_cost": 55,
                    "gst_rate": 5,
                    "details": { "kind": "fabric", "color": "blue", "gsm": 120 }
                }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{purchase}");

    let (status, hits) = app.get("/api/v1/purchases/search/suppliers?q=ha").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = hits
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["supplier_name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 1, "case-insensitive duplicate kept: {names:?}");
}
