mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::{
    days_from_today, decimal, field_errors, id_of, month_code, previous_month_code,
    response_json, today, TestApp,
};
use procure_ease::models::{purchase_order, PurchaseOrderStatus};
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, NotSet, Set};
use serde_json::{json, Value};

/// Stores an order directly, bypassing number allocation.
async fn insert_order(app: &TestApp, template: &Value, order_number: String) {
    let now = Utc::now();
    purchase_order::ActiveModel {
        id: NotSet,
        requisition_id: Set(template["requisition_id"].as_i64().unwrap() as i32),
        vendor_id: Set(template["vendor_id"].as_i64().unwrap() as i32),
        order_number: Set(order_number),
        total_amount: Set(dec!(10)),
        status: Set(PurchaseOrderStatus::Approved),
        order_date: Set(today()),
        expected_delivery_date: Set(None),
        notes: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&*app.state.db)
    .await
    .expect("insert purchase order");
}

#[tokio::test]
async fn order_numbers_follow_the_monthly_sequence() {
    let app = TestApp::new().await;

    let first = app.create_purchase_order("seq-a", "100.00").await;
    let second = app.create_purchase_order("seq-b", "200.00").await;

    let prefix = month_code("PO");
    assert_eq!(first["order_number"], format!("{}0001", prefix));
    assert_eq!(second["order_number"], format!("{}0002", prefix));
    assert_eq!(first["status"], "Pending Approval");
    assert_eq!(decimal(&first["total_amount"]), dec!(100));
    // scale survives the SQLite round trip
    assert_eq!(first["total_amount"], "100.00");
    let fetched = response_json(
        app.get(&format!("/api/v1/purchase-orders/{}", id_of(&second)))
            .await,
    )
    .await;
    assert_eq!(fetched["data"]["total_amount"], "200.00");
}

#[tokio::test]
async fn order_numbers_continue_from_the_highest_suffix() {
    let app = TestApp::new().await;
    let prefix = month_code("PO");
    let first = app.create_purchase_order("gap-a", "50.00").await;
    assert_eq!(first["order_number"], format!("{}0001", prefix));

    insert_order(&app, &first, format!("{}0007", prefix)).await;
    insert_order(&app, &first, format!("{}0042", previous_month_code("PO"))).await;

    let next = app.create_purchase_order("gap-b", "60.00").await;
    assert_eq!(next["order_number"], format!("{}0008", prefix));

    // removing an older order does not free its number for reuse
    let response = app
        .delete(&format!("/api/v1/purchase-orders/{}", id_of(&first)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let after_delete = app.create_purchase_order("gap-c", "70.00").await;
    assert_eq!(after_delete["order_number"], format!("{}0009", prefix));
}

#[tokio::test]
async fn concurrent_creates_draw_distinct_numbers() {
    let app = TestApp::new().await;
    let mut bodies = Vec::new();
    for tag in ["race-a", "race-b"] {
        let requisition_id = app.approved_requisition(&format!("{} item", tag)).await;
        let vendor_id = id_of(&app.create_vendor(&format!("{}@vendor.test", tag)).await);
        bodies.push(json!({
            "requisition_id": requisition_id,
            "vendor_id": vendor_id,
            "total_amount": "25.00",
            "order_date": today().to_string()
        }));
    }

    let (a, b) = tokio::join!(
        app.post("/api/v1/purchase-orders", bodies[0].clone()),
        app.post("/api/v1/purchase-orders", bodies[1].clone())
    );
    assert_eq!(a.status(), StatusCode::CREATED);
    assert_eq!(b.status(), StatusCode::CREATED);

    let mut numbers = vec![
        response_json(a).await["data"]["order_number"].clone(),
        response_json(b).await["data"]["order_number"].clone(),
    ];
    numbers.sort_by_key(|n| n.as_str().unwrap_or_default().to_string());
    let prefix = month_code("PO");
    assert_eq!(
        numbers,
        vec![json!(format!("{}0001", prefix)), json!(format!("{}0002", prefix))]
    );
}

#[tokio::test]
async fn full_lifecycle_from_draft_to_completed() {
    let app = TestApp::new().await;
    let requisition_id = app.approved_requisition("Server racks").await;
    let vendor_id = id_of(&app.create_vendor("racks@vendor.test").await);

    let order = app
        .create(
            "/api/v1/purchase-orders",
            json!({
                "requisition_id": requisition_id,
                "vendor_id": vendor_id,
                "total_amount": "9800.00",
                "status": "Draft",
                "order_date": today().to_string(),
                "expected_delivery_date": days_from_today(14),
                "notes": "Deliver to loading bay"
            }),
        )
        .await;
    assert_eq!(order["status"], "Draft");
    let id = id_of(&order);

    for (action, expected) in [
        ("submit", "Pending Approval"),
        ("approve", "Approved"),
        ("issue", "Issued"),
        ("complete", "Completed"),
    ] {
        let data = app
            .transition(&format!("/api/v1/purchase-orders/{}/{}", id, action))
            .await;
        assert_eq!(data["status"], expected, "after {}", action);
    }

    let response = app
        .post_empty(&format!("/api/v1/purchase-orders/{}/cancel", id))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let payload = response_json(response).await;
    assert_eq!(
        payload["message"],
        "Cannot cancel purchase order with status 'Completed'"
    );
}

#[tokio::test]
async fn out_of_order_transitions_conflict() {
    let app = TestApp::new().await;
    let id = id_of(&app.create_purchase_order("skip", "75.00").await);

    let response = app
        .post_empty(&format!("/api/v1/purchase-orders/{}/issue", id))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .post_empty(&format!("/api/v1/purchase-orders/{}/submit", id))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let data = app
        .transition(&format!("/api/v1/purchase-orders/{}/cancel", id))
        .await;
    assert_eq!(data["status"], "Cancelled");

    let response = app
        .post_empty(&format!("/api/v1/purchase-orders/{}/approve", id))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn orders_require_an_approved_requisition() {
    let app = TestApp::new().await;
    let pending = id_of(&app.create_requisition("Pending item").await);
    let vendor_id = id_of(&app.create_vendor("approval@vendor.test").await);

    let response = app
        .post(
            "/api/v1/purchase-orders",
            json!({
                "requisition_id": pending,
                "vendor_id": vendor_id,
                "total_amount": "10.00",
                "order_date": today().to_string()
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = response_json(response).await;
    assert_eq!(
        field_errors(&payload, "requisition_id")[0],
        "Requisition must be Approved before ordering (currently Pending)"
    );

    let response = app
        .post(
            "/api/v1/purchase-orders",
            json!({
                "requisition_id": 4040,
                "vendor_id": 4041,
                "total_amount": "10.00",
                "order_date": today().to_string()
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = response_json(response).await;
    assert_eq!(
        field_errors(&payload, "requisition_id")[0],
        "The selected requisition does not exist"
    );
}

#[tokio::test]
async fn create_rejects_bad_dates_status_and_amounts() {
    let app = TestApp::new().await;
    let requisition_id = app.approved_requisition("Cables").await;
    let vendor_id = id_of(&app.create_vendor("cables@vendor.test").await);
    let base = |extra: serde_json::Value| {
        let mut body = json!({
            "requisition_id": requisition_id,
            "vendor_id": vendor_id,
            "total_amount": "42.00",
            "order_date": today().to_string()
        });
        if let (Some(body), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
            body.extend(extra.clone());
        }
        body
    };

    let response = app
        .post(
            "/api/v1/purchase-orders",
            base(json!({ "expected_delivery_date": days_from_today(-1) })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = response_json(response).await;
    assert_eq!(
        field_errors(&payload, "expected_delivery_date")[0],
        "expected_delivery_date must not be before order_date"
    );

    let response = app
        .post("/api/v1/purchase-orders", base(json!({ "status": "Issued" })))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = response_json(response).await;
    assert!(!field_errors(&payload, "status").is_empty());

    let response = app
        .post(
            "/api/v1/purchase-orders",
            base(json!({ "total_amount": "-5.00" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = response_json(response).await;
    assert_eq!(field_errors(&payload, "total_amount")[0], "must not be negative");

    let payload = response_json(app.get("/api/v1/purchase-orders").await).await;
    assert_eq!(payload["data"]["total"], 0);
}

#[tokio::test]
async fn update_edits_open_orders_only() {
    let app = TestApp::new().await;
    let id = id_of(&app.create_purchase_order("edit", "500.00").await);
    let uri = format!("/api/v1/purchase-orders/{}", id);

    let response = app
        .put(&uri, json!({ "total_amount": "650.25", "notes": "Revised quote" }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = response_json(response).await;
    assert_eq!(decimal(&payload["data"]["total_amount"]), dec!(650.25));
    assert_eq!(payload["data"]["notes"], "Revised quote");

    let response = app.put(&uri, json!({ "status": "Approved" })).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .put(&uri, json!({ "expected_delivery_date": days_from_today(-30) }))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    app.transition(&format!("{}/cancel", uri)).await;
    let response = app.put(&uri, json!({ "notes": "Too late" })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn detail_includes_related_records() {
    let app = TestApp::new().await;
    let id = app.issued_purchase_order("detail", "1000.00").await;

    app.create(
        "/api/v1/goods-receipts",
        json!({
            "purchase_order_id": id,
            "received_date": today().to_string(),
            "quantity_received": 4,
            "item": "detail item",
            "received_by": "Warehouse"
        }),
    )
    .await;

    let response = app.get(&format!("/api/v1/purchase-orders/{}", id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = response_json(response).await;
    let data = &payload["data"];
    assert_eq!(data["status"], "Issued");
    assert_eq!(data["requisition"]["item"], "detail item");
    assert_eq!(data["vendor"]["email"], "detail@vendor.test");
    assert_eq!(data["goods_receipts"].as_array().unwrap().len(), 1);
    assert_eq!(data["invoices"], json!([]));
}

#[tokio::test]
async fn list_filters_by_status_and_vendor() {
    let app = TestApp::new().await;
    let issued = app.issued_purchase_order("flt-a", "10.00").await;
    let pending = app.create_purchase_order("flt-b", "20.00").await;

    let payload = response_json(app.get("/api/v1/purchase-orders?status=Issued").await).await;
    assert_eq!(payload["data"]["total"], 1);
    assert_eq!(payload["data"]["items"][0]["id"], issued);

    let payload = response_json(
        app.get("/api/v1/purchase-orders?status=Pending%20Approval")
            .await,
    )
    .await;
    assert_eq!(payload["data"]["total"], 1);

    let payload = response_json(
        app.get(&format!(
            "/api/v1/purchase-orders?vendor_id={}",
            pending["vendor_id"]
        ))
        .await,
    )
    .await;
    assert_eq!(payload["data"]["total"], 1);
    assert_eq!(payload["data"]["items"][0]["id"], pending["id"]);
}

#[tokio::test]
async fn delete_purchase_order() {
    let app = TestApp::new().await;
    let id = id_of(&app.create_purchase_order("del", "5.00").await);

    let response = app.delete(&format!("/api/v1/purchase-orders/{}", id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = response_json(response).await;
    assert_eq!(payload["message"], "Purchase order deleted successfully");

    let response = app.get(&format!("/api/v1/purchase-orders/{}", id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = response_json(response).await;
    assert_eq!(payload["message"], format!("Purchase order {} not found", id));
}

#[tokio::test]
async fn order_with_receipts_cannot_be_deleted() {
    let app = TestApp::new().await;
    let id = app.issued_purchase_order("keep", "5.00").await;
    app.create(
        "/api/v1/goods-receipts",
        json!({
            "purchase_order_id": id,
            "received_date": today().to_string(),
            "quantity_received": 1,
            "item": "keep item",
            "received_by": "Dock"
        }),
    )
    .await;

    let response = app.delete(&format!("/api/v1/purchase-orders/{}", id)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn transitions_also_accept_patch() {
    let app = TestApp::new().await;
    let id = id_of(&app.create_purchase_order("patch", "30.00").await);

    let response = app
        .patch_empty(&format!("/api/v1/purchase-orders/{}/approve", id))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = response_json(response).await;
    assert_eq!(payload["data"]["status"], "Approved");

    let response = app
        .patch_empty(&format!("/api/v1/purchase-orders/{}/approve", id))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
