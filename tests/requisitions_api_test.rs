mod common;

use axum::http::StatusCode;
use common::{decimal, field_errors, id_of, response_json, today, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn create_and_fetch_requisition() {
    let app = TestApp::new().await;

    let created = app
        .create(
            "/api/v1/requisitions",
            json!({
                "item": "Standing desks",
                "quantity": 6,
                "requestedBy": "Operations",
                "date": today().to_string(),
                "priority": "High",
                "estimated_cost": "2400.50",
                "description": "Second floor refit"
            }),
        )
        .await;

    assert_eq!(created["status"], "Pending");
    assert_eq!(created["priority"], "High");
    assert_eq!(created["requested_by"], "Operations");
    assert_eq!(decimal(&created["estimated_cost"]), dec!(2400.50));

    let response = app
        .get(&format!("/api/v1/requisitions/{}", id_of(&created)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = response_json(response).await;
    assert_eq!(payload["success"], true);
    assert_eq!(payload["data"]["item"], "Standing desks");
    assert_eq!(payload["data"]["purchase_orders"], json!([]));
    assert!(payload["meta"]["timestamp"].is_string());
}

#[tokio::test]
async fn priority_defaults_to_medium() {
    let app = TestApp::new().await;
    let created = app.create_requisition("Whiteboard markers").await;
    assert_eq!(created["priority"], "Medium");
    assert!(created["estimated_cost"].is_null());
}

#[tokio::test]
async fn missing_fields_return_field_map() {
    let app = TestApp::new().await;

    let response = app
        .post("/api/v1/requisitions", json!({ "quantity": 0 }))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let payload = response_json(response).await;
    assert_eq!(payload["message"], "The given data was invalid");
    assert_eq!(
        field_errors(&payload, "item")[0],
        "The item field is required"
    );
    assert!(!field_errors(&payload, "requested_by").is_empty());
    assert!(!field_errors(&payload, "date").is_empty());
    assert!(!field_errors(&payload, "quantity").is_empty());
}

#[tokio::test]
async fn new_requisition_cannot_start_approved() {
    let app = TestApp::new().await;

    let response = app
        .post(
            "/api/v1/requisitions",
            json!({
                "item": "Projector",
                "quantity": 1,
                "requested_by": "Training",
                "date": today().to_string(),
                "status": "Approved"
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = response_json(response).await;
    assert!(!field_errors(&payload, "status").is_empty());
}

#[tokio::test]
async fn update_is_partial_and_rejects_status() {
    let app = TestApp::new().await;
    let id = id_of(&app.create_requisition("Monitors").await);

    let response = app
        .put(
            &format!("/api/v1/requisitions/{}", id),
            json!({ "quantity": 12, "priority": "Urgent" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = response_json(response).await;
    assert_eq!(payload["data"]["quantity"], 12);
    assert_eq!(payload["data"]["priority"], "Urgent");
    assert_eq!(payload["data"]["item"], "Monitors");

    let response = app
        .put(
            &format!("/api/v1/requisitions/{}", id),
            json!({ "status": "Approved" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = response_json(response).await;
    assert!(!field_errors(&payload, "status").is_empty());
}

#[tokio::test]
async fn approve_and_reject_only_from_pending() {
    let app = TestApp::new().await;
    let approved = id_of(&app.create_requisition("Laptops").await);
    let rejected = id_of(&app.create_requisition("Gaming chairs").await);

    let data = app
        .transition(&format!("/api/v1/requisitions/{}/approve", approved))
        .await;
    assert_eq!(data["status"], "Approved");

    let data = app
        .transition(&format!("/api/v1/requisitions/{}/reject", rejected))
        .await;
    assert_eq!(data["status"], "Rejected");

    let response = app
        .post_empty(&format!("/api/v1/requisitions/{}/approve", approved))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let payload = response_json(response).await;
    assert_eq!(
        payload["message"],
        "Cannot approve requisition with status 'Approved'"
    );

    let response = app
        .post_empty(&format!("/api/v1/requisitions/{}/approve", rejected))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn list_filters_by_status_and_paginates() {
    let app = TestApp::new().await;
    for item in ["Pens", "Paper", "Staplers"] {
        app.create_requisition(item).await;
    }
    app.approved_requisition("Toner").await;

    let response = app.get("/api/v1/requisitions?status=Pending").await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = response_json(response).await;
    assert_eq!(payload["data"]["total"], 3);

    let payload = response_json(app.get("/api/v1/requisitions?page=2&limit=3").await).await;
    assert_eq!(payload["data"]["total"], 4);
    assert_eq!(payload["data"]["page"], 2);
    assert_eq!(payload["data"]["total_pages"], 2);
    let items = payload["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    // newest first, so the oldest lands on the last page
    assert_eq!(items[0]["item"], "Pens");

    let response = app.get("/api/v1/requisitions?status=Shipped").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = response_json(response).await;
    assert!(!field_errors(&payload, "query").is_empty());
}

#[tokio::test]
async fn delete_requisition() {
    let app = TestApp::new().await;
    let id = id_of(&app.create_requisition("Coffee machine").await);

    let response = app.delete(&format!("/api/v1/requisitions/{}", id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = response_json(response).await;
    assert_eq!(payload["message"], "Requisition deleted successfully");

    let response = app.get(&format!("/api/v1/requisitions/{}", id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = response_json(response).await;
    assert_eq!(payload["message"], format!("Requisition {} not found", id));
}

#[tokio::test]
async fn requisition_with_orders_cannot_be_deleted() {
    let app = TestApp::new().await;
    let order = app.create_purchase_order("reqdel", "300.00").await;
    let requisition_id = order["requisition_id"].as_i64().unwrap();

    let response = app
        .delete(&format!("/api/v1/requisitions/{}", requisition_id))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let payload = response_json(
        app.get(&format!("/api/v1/requisitions/{}", requisition_id))
            .await,
    )
    .await;
    assert_eq!(payload["data"]["purchase_orders"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_requisition_is_not_found() {
    let app = TestApp::new().await;
    for response in [
        app.get("/api/v1/requisitions/999").await,
        app.put("/api/v1/requisitions/999", json!({ "quantity": 2 })).await,
        app.delete("/api/v1/requisitions/999").await,
        app.post_empty("/api/v1/requisitions/999/approve").await,
    ] {
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
