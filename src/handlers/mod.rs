pub mod common;
pub mod dashboard;
pub mod goods_receipts;
pub mod health;
pub mod invoices;
pub mod purchase_orders;
pub mod requisitions;
pub mod vendors;

use crate::events::EventSender;
use crate::{
    db::DbPool,
    services::{
        dashboard::DashboardService, goods_receipts::GoodsReceiptService,
        invoices::InvoiceService, purchase_orders::PurchaseOrderService,
        requisitions::RequisitionService, vendors::VendorService,
    },
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub requisitions: Arc<RequisitionService>,
    pub vendors: Arc<VendorService>,
    pub purchase_orders: Arc<PurchaseOrderService>,
    pub goods_receipts: Arc<GoodsReceiptService>,
    pub invoices: Arc<InvoiceService>,
    pub dashboard: Arc<DashboardService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            requisitions: Arc::new(RequisitionService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            vendors: Arc::new(VendorService::new(db_pool.clone(), event_sender.clone())),
            purchase_orders: Arc::new(PurchaseOrderService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            goods_receipts: Arc::new(GoodsReceiptService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            invoices: Arc::new(InvoiceService::new(db_pool.clone(), event_sender)),
            dashboard: Arc::new(DashboardService::new(db_pool)),
        }
    }
}
