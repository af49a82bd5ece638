use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

use super::invoices::overdue_condition;
use crate::{
    commands::today,
    db::DbPool,
    errors::ServiceError,
    models::{
        goods_receipt, invoice, purchase_order, requisition, vendor, InvoiceStatus,
        PurchaseOrderStatus,
    },
};

/// Number of rows in each dashboard list
pub const RECENT_LIMIT: u64 = 5;

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub total_requisitions: u64,
    pub total_vendors: u64,
    pub total_purchase_orders: u64,
    pub total_goods_receipts: u64,
    pub total_invoices: u64,
    /// Sum of `total_amount` across all purchase orders
    #[serde(serialize_with = "crate::models::money::serialize")]
    pub total_orders_value: Decimal,
    pub pending_approvals: u64,
    pub recent_requisitions: Vec<requisition::Model>,
    pub pending_purchase_orders: Vec<purchase_order::Model>,
    pub overdue_invoices: u64,
    /// Net amount of every non-cancelled invoice
    #[serde(serialize_with = "crate::models::money::serialize")]
    pub total_invoiced: Decimal,
    /// Net amount of paid invoices
    #[serde(serialize_with = "crate::models::money::serialize")]
    pub total_paid: Decimal,
}

#[derive(Clone)]
pub struct DashboardService {
    db_pool: Arc<DbPool>,
}

impl DashboardService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn summary(&self) -> Result<DashboardSummary, ServiceError> {
        let db = &*self.db_pool;

        // Money is summed in Decimal; SQLite would otherwise add floats.
        let order_amounts: Vec<Decimal> = purchase_order::Entity::find()
            .select_only()
            .column(purchase_order::Column::TotalAmount)
            .into_tuple()
            .all(db)
            .await?;

        let invoices = invoice::Entity::find()
            .filter(invoice::Column::Status.ne(InvoiceStatus::Cancelled))
            .all(db)
            .await?;
        let total_invoiced = invoices.iter().map(|inv| inv.net_amount()).sum();
        let total_paid = invoices
            .iter()
            .filter(|inv| inv.status == InvoiceStatus::Paid)
            .map(|inv| inv.net_amount())
            .sum();

        let pending = purchase_order::Column::Status.eq(PurchaseOrderStatus::PendingApproval);

        Ok(DashboardSummary {
            total_requisitions: requisition::Entity::find().count(db).await?,
            total_vendors: vendor::Entity::find().count(db).await?,
            total_purchase_orders: order_amounts.len() as u64,
            total_goods_receipts: goods_receipt::Entity::find().count(db).await?,
            total_invoices: invoice::Entity::find().count(db).await?,
            total_orders_value: order_amounts.into_iter().sum(),
            pending_approvals: purchase_order::Entity::find()
                .filter(pending.clone())
                .count(db)
                .await?,
            recent_requisitions: requisition::Entity::find()
                .order_by_desc(requisition::Column::Id)
                .limit(RECENT_LIMIT)
                .all(db)
                .await?,
            pending_purchase_orders: purchase_order::Entity::find()
                .filter(pending)
                .order_by_desc(purchase_order::Column::Id)
                .limit(RECENT_LIMIT)
                .all(db)
                .await?,
            overdue_invoices: invoice::Entity::find()
                .filter(overdue_condition(today()))
                .count(db)
                .await?,
            total_invoiced,
            total_paid,
        })
    }
}
