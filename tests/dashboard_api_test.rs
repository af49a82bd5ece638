mod common;

use axum::http::StatusCode;
use common::{decimal, id_of, response_json, TestApp};
use procure_ease::seed::seed_demo_data;
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn empty_dashboard() {
    let app = TestApp::new().await;

    let response = app.get("/api/v1/dashboard").await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = response_json(response).await;
    let data = &payload["data"];
    assert_eq!(data["total_requisitions"], 0);
    assert_eq!(data["total_purchase_orders"], 0);
    assert_eq!(data["recent_requisitions"], json!([]));
    assert_eq!(decimal(&data["total_orders_value"]), dec!(0));
    assert_eq!(decimal(&data["total_paid"]), dec!(0));
}

#[tokio::test]
async fn dashboard_over_demo_data() {
    let app = TestApp::new().await;
    let summary = seed_demo_data(&app.state.db).await.unwrap();
    assert!(!summary.is_empty());

    let payload = response_json(app.get("/api/v1/dashboard").await).await;
    let data = &payload["data"];
    assert_eq!(data["total_vendors"], 3);
    assert_eq!(data["total_requisitions"], 4);
    assert_eq!(data["total_purchase_orders"], 2);
    assert_eq!(data["total_goods_receipts"], 1);
    assert_eq!(data["total_invoices"], 2);
    assert_eq!(data["pending_approvals"], 0);
    assert_eq!(data["overdue_invoices"], 1);
    assert_eq!(decimal(&data["total_orders_value"]), dec!(14675.00));
    // 8% tax on both orders, no discounts
    assert_eq!(decimal(&data["total_invoiced"]), dec!(15849.00));
    assert_eq!(decimal(&data["total_paid"]), dec!(15390.00));
    assert_eq!(data["recent_requisitions"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn pending_approvals_track_open_orders() {
    let app = TestApp::new().await;
    let first = id_of(&app.create_purchase_order("dash-a", "120.00").await);
    app.create_purchase_order("dash-b", "80.00").await;
    let draft_requisition = app.approved_requisition("dash draft").await;
    let vendor_id = id_of(&app.create_vendor("dash-c@vendor.test").await);
    app.create(
        "/api/v1/purchase-orders",
        json!({
            "requisition_id": draft_requisition,
            "vendor_id": vendor_id,
            "total_amount": "1.00",
            "status": "Draft",
            "order_date": common::today().to_string()
        }),
    )
    .await;

    let payload = response_json(app.get("/api/v1/dashboard").await).await;
    assert_eq!(payload["data"]["pending_approvals"], 2);
    assert_eq!(
        payload["data"]["pending_purchase_orders"]
            .as_array()
            .unwrap()
            .len(),
        2
    );
    assert_eq!(decimal(&payload["data"]["total_orders_value"]), dec!(201.00));

    app.transition(&format!("/api/v1/purchase-orders/{}/approve", first))
        .await;
    let payload = response_json(app.get("/api/v1/dashboard").await).await;
    assert_eq!(payload["data"]["pending_approvals"], 1);
}
