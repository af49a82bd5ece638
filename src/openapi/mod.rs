use axum::{response::Json, routing::get, Router};
use utoipa::OpenApi;

use crate::AppState;

/// Path the generated document is served from
pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ProcureEase API",
        version = "1.0.0",
        description = r#"
# ProcureEase Procurement API

Tracks the procurement cycle from an internal request through to payment:

- **Requisitions**: internal requests for goods, approved or rejected
- **Vendors**: suppliers with contact details, rating and active flag
- **Purchase Orders**: orders placed with a vendor against an approved requisition
- **Goods Receipts**: deliveries recorded against issued purchase orders
- **Invoices**: vendor bills, submitted, paid or cancelled
- **Dashboard**: aggregate counts and totals

## Responses

Successful responses are wrapped in an envelope:

```json
{ "success": true, "data": { }, "meta": { "timestamp": "2024-06-01T10:30:00+00:00" } }
```

Validation failures answer `422` with a field map:

```json
{
  "error": "Unprocessable Entity",
  "message": "The given data was invalid",
  "errors": { "quantity": ["quantity must be at least 1"] },
  "timestamp": "2024-06-01T10:30:00+00:00"
}
```

Refused status changes and edits of closed records answer `409`.

## Pagination

List endpoints accept `page` (default 1) and `per_page` (alias `limit`).
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "requisitions", description = "Purchase requisitions"),
        (name = "vendors", description = "Vendor directory"),
        (name = "purchase-orders", description = "Purchase order lifecycle"),
        (name = "goods-receipts", description = "Deliveries against purchase orders"),
        (name = "invoices", description = "Vendor invoices and payment"),
        (name = "dashboard", description = "Aggregate figures"),
        (name = "health", description = "Health check endpoints")
    ),
    paths(
        // Requisitions
        crate::handlers::requisitions::list_requisitions,
        crate::handlers::requisitions::create_requisition,
        crate::handlers::requisitions::get_requisition,
        crate::handlers::requisitions::update_requisition,
        crate::handlers::requisitions::delete_requisition,
        crate::handlers::requisitions::approve_requisition,
        crate::handlers::requisitions::reject_requisition,

        // Vendors
        crate::handlers::vendors::list_vendors,
        crate::handlers::vendors::create_vendor,
        crate::handlers::vendors::get_vendor,
        crate::handlers::vendors::update_vendor,
        crate::handlers::vendors::delete_vendor,
        crate::handlers::vendors::activate_vendor,
        crate::handlers::vendors::deactivate_vendor,
        crate::handlers::vendors::rate_vendor,

        // Purchase orders
        crate::handlers::purchase_orders::list_purchase_orders,
        crate::handlers::purchase_orders::create_purchase_order,
        crate::handlers::purchase_orders::get_purchase_order,
        crate::handlers::purchase_orders::update_purchase_order,
        crate::handlers::purchase_orders::delete_purchase_order,
        crate::handlers::purchase_orders::submit_purchase_order,
        crate::handlers::purchase_orders::approve_purchase_order,
        crate::handlers::purchase_orders::issue_purchase_order,
        crate::handlers::purchase_orders::complete_purchase_order,
        crate::handlers::purchase_orders::cancel_purchase_order,

        // Goods receipts
        crate::handlers::goods_receipts::list_goods_receipts,
        crate::handlers::goods_receipts::create_goods_receipt,
        crate::handlers::goods_receipts::get_goods_receipt,
        crate::handlers::goods_receipts::update_goods_receipt,
        crate::handlers::goods_receipts::delete_goods_receipt,

        // Invoices
        crate::handlers::invoices::list_invoices,
        crate::handlers::invoices::create_invoice,
        crate::handlers::invoices::get_invoice,
        crate::handlers::invoices::update_invoice,
        crate::handlers::invoices::delete_invoice,
        crate::handlers::invoices::submit_invoice,
        crate::handlers::invoices::pay_invoice,
        crate::handlers::invoices::cancel_invoice,

        // Dashboard & health
        crate::handlers::dashboard::get_dashboard,
        crate::handlers::health::health_check,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,
            crate::ResponseMeta,

            // Entities and their enums
            crate::models::requisition::Model,
            crate::models::vendor::Model,
            crate::models::purchase_order::Model,
            crate::models::goods_receipt::Model,
            crate::models::invoice::Model,
            crate::models::RequisitionStatus,
            crate::models::Priority,
            crate::models::PurchaseOrderStatus,
            crate::models::GoodsCondition,
            crate::models::InvoiceStatus,
            crate::models::PaymentMethod,

            // Requests
            crate::handlers::requisitions::CreateRequisitionRequest,
            crate::handlers::requisitions::UpdateRequisitionRequest,
            crate::handlers::vendors::CreateVendorRequest,
            crate::handlers::vendors::UpdateVendorRequest,
            crate::handlers::vendors::RateVendorRequest,
            crate::handlers::purchase_orders::CreatePurchaseOrderRequest,
            crate::handlers::purchase_orders::UpdatePurchaseOrderRequest,
            crate::handlers::goods_receipts::CreateGoodsReceiptRequest,
            crate::handlers::goods_receipts::UpdateGoodsReceiptRequest,
            crate::handlers::invoices::CreateInvoiceRequest,
            crate::handlers::invoices::UpdateInvoiceRequest,
            crate::handlers::invoices::PayInvoiceRequest,

            // Read models
            crate::services::requisitions::RequisitionDetail,
            crate::services::vendors::VendorDetail,
            crate::services::purchase_orders::PurchaseOrderDetail,
            crate::services::goods_receipts::GoodsReceiptDetail,
            crate::services::invoices::InvoiceView,
            crate::services::invoices::InvoiceDetail,
            crate::services::dashboard::DashboardSummary,
            crate::handlers::health::HealthResponse,
            crate::handlers::health::ComponentHealth,
            crate::handlers::health::ComponentStatus,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDocV1::openapi())
}

/// Serves the generated document as JSON.
pub fn openapi_routes() -> Router<AppState> {
    Router::new().route(OPENAPI_JSON_PATH, get(openapi_json))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_resource() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("ProcureEase API"));
        for path in [
            "/api/v1/requisitions/{id}/approve",
            "/api/v1/vendors/{id}/rating",
            "/api/v1/purchase-orders/{id}/issue",
            "/api/v1/goods-receipts",
            "/api/v1/invoices/{id}/pay",
            "/api/v1/dashboard",
            "/api/v1/health",
        ] {
            assert!(openapi.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn entity_schemas_use_resource_names() {
        let openapi = ApiDocV1::openapi();
        let schemas = &openapi.components.expect("components").schemas;
        for name in ["Requisition", "Vendor", "PurchaseOrder", "GoodsReceipt", "Invoice"] {
            assert!(schemas.contains_key(name), "missing schema {}", name);
        }
    }
}
