use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use super::{fetch_page, invoices::InvoiceView, PageRequest};
use crate::{
    commands::{
        purchase_orders::{
            ensure_active_vendor, ensure_delivery_after_order, ensure_orderable_requisition,
            CreatePurchaseOrderCommand, TransitionPurchaseOrderCommand,
        },
        today, Command,
    },
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{
        goods_receipt, invoice, purchase_order, requisition, vendor, PurchaseOrderAction,
        PurchaseOrderStatus,
    },
    PaginatedResponse,
};

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PurchaseOrderFilter {
    pub status: Option<PurchaseOrderStatus>,
    pub vendor_id: Option<i32>,
    pub requisition_id: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct PurchaseOrderChanges {
    pub requisition_id: Option<i32>,
    pub vendor_id: Option<i32>,
    pub total_amount: Option<Decimal>,
    pub order_date: Option<NaiveDate>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Purchase order with everything that hangs off it
#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseOrderDetail {
    #[serde(flatten)]
    pub purchase_order: purchase_order::Model,
    pub requisition: Option<requisition::Model>,
    pub vendor: Option<vendor::Model>,
    pub goods_receipts: Vec<goods_receipt::Model>,
    pub invoices: Vec<InvoiceView>,
}

#[derive(Clone)]
pub struct PurchaseOrderService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl PurchaseOrderService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: PurchaseOrderFilter,
        page: PageRequest,
    ) -> Result<PaginatedResponse<purchase_order::Model>, ServiceError> {
        let mut query = purchase_order::Entity::find().order_by_desc(purchase_order::Column::Id);
        if let Some(status) = filter.status {
            query = query.filter(purchase_order::Column::Status.eq(status));
        }
        if let Some(vendor_id) = filter.vendor_id {
            query = query.filter(purchase_order::Column::VendorId.eq(vendor_id));
        }
        if let Some(requisition_id) = filter.requisition_id {
            query = query.filter(purchase_order::Column::RequisitionId.eq(requisition_id));
        }
        fetch_page(&self.db_pool, query, page).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<purchase_order::Model, ServiceError> {
        purchase_order::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Purchase order", id))
    }

    #[instrument(skip(self))]
    pub async fn detail(&self, id: i32) -> Result<PurchaseOrderDetail, ServiceError> {
        let db = &*self.db_pool;
        let order = self.get(id).await?;
        let requisition = order.find_related(requisition::Entity).one(db).await?;
        let vendor = order.find_related(vendor::Entity).one(db).await?;
        let goods_receipts = order
            .find_related(goods_receipt::Entity)
            .order_by_desc(goods_receipt::Column::Id)
            .all(db)
            .await?;
        let on = today();
        let invoices = order
            .find_related(invoice::Entity)
            .order_by_desc(invoice::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(|inv| InvoiceView::new(inv, on))
            .collect();

        Ok(PurchaseOrderDetail {
            purchase_order: order,
            requisition,
            vendor,
            goods_receipts,
            invoices,
        })
    }

    #[instrument(skip(self, command))]
    pub async fn create(
        &self,
        command: CreatePurchaseOrderCommand,
    ) -> Result<purchase_order::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    /// Edits order details. Completed and cancelled orders are frozen.
    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        id: i32,
        changes: PurchaseOrderChanges,
    ) -> Result<purchase_order::Model, ServiceError> {
        let db = &*self.db_pool;
        let current = self.get(id).await?;
        if current.status.is_terminal() {
            return Err(ServiceError::Conflict(format!(
                "Purchase order {} is {} and can no longer be edited",
                id, current.status
            )));
        }

        if let Some(requisition_id) = changes.requisition_id {
            if requisition_id != current.requisition_id {
                ensure_orderable_requisition(db, requisition_id).await?;
            }
        }
        if let Some(vendor_id) = changes.vendor_id {
            if vendor_id != current.vendor_id {
                ensure_active_vendor(db, vendor_id).await?;
            }
        }
        ensure_delivery_after_order(
            changes.order_date.unwrap_or(current.order_date),
            changes
                .expected_delivery_date
                .or(current.expected_delivery_date),
        )?;

        let mut active = current.into_active_model();
        if let Some(requisition_id) = changes.requisition_id {
            active.requisition_id = Set(requisition_id);
        }
        if let Some(vendor_id) = changes.vendor_id {
            active.vendor_id = Set(vendor_id);
        }
        if let Some(total_amount) = changes.total_amount {
            active.total_amount = Set(total_amount);
        }
        if let Some(order_date) = changes.order_date {
            active.order_date = Set(order_date);
        }
        if let Some(expected) = changes.expected_delivery_date {
            active.expected_delivery_date = Set(Some(expected));
        }
        if let Some(notes) = changes.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(Utc::now());

        let updated = active
            .update(db)
            .await
            .map_err(|e| ServiceError::from_write(e, "Referenced requisition or vendor no longer exists"))?;
        self.event_sender
            .publish(Event::PurchaseOrderUpdated(id))
            .await;
        Ok(updated)
    }

    /// Orders with receipts or invoices on file cannot be deleted; cancel them instead.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let order = self.get(id).await?;
        let receipts = order.find_related(goods_receipt::Entity).count(db).await?;
        let invoices = order.find_related(invoice::Entity).count(db).await?;
        if receipts > 0 || invoices > 0 {
            return Err(ServiceError::Conflict(format!(
                "Purchase order {} has {} goods receipt(s) and {} invoice(s) and cannot be deleted",
                id, receipts, invoices
            )));
        }

        order
            .delete(db)
            .await
            .map_err(|e| ServiceError::from_write(e, "Purchase order is referenced by other records"))?;

        info!(purchase_order_id = id, "Purchase order deleted");
        self.event_sender
            .publish(Event::PurchaseOrderDeleted(id))
            .await;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn transition(
        &self,
        id: i32,
        action: PurchaseOrderAction,
    ) -> Result<purchase_order::Model, ServiceError> {
        TransitionPurchaseOrderCommand { id, action }
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }
}
