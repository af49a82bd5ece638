use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DbErr, NotSet, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{ensure_active_vendor, ensure_delivery_after_order, ensure_orderable_requisition};
use crate::{
    commands::{today, Command},
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    middleware_helpers::retry::{with_retry, RetryConfig, WriteContentionPolicy},
    models::{purchase_order, PurchaseOrderStatus},
    numbering::next_number,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePurchaseOrderCommand {
    pub requisition_id: i32,
    pub vendor_id: i32,
    pub total_amount: Decimal,
    pub status: PurchaseOrderStatus,
    pub order_date: NaiveDate,
    pub expected_delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[async_trait]
impl Command for CreatePurchaseOrderCommand {
    type Result = purchase_order::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(requisition_id = self.requisition_id, vendor_id = self.vendor_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let db = &*db_pool;

        if !self.status.is_initial() {
            return Err(ServiceError::field(
                "status",
                "New purchase orders start as Draft or Pending Approval",
            ));
        }
        ensure_delivery_after_order(self.order_date, self.expected_delivery_date)?;
        ensure_orderable_requisition(db, self.requisition_id).await?;
        ensure_active_vendor(db, self.vendor_id).await?;

        let code_date = today();
        let command = self;
        let order = with_retry(&RetryConfig::default(), WriteContentionPolicy, move || async move {
            let txn = db.begin().await?;
            let order_number = next_number::<purchase_order::Entity, _>(&txn, code_date).await?;
            let now = Utc::now();
            let order = purchase_order::ActiveModel {
                id: NotSet,
                requisition_id: Set(command.requisition_id),
                vendor_id: Set(command.vendor_id),
                order_number: Set(order_number),
                total_amount: Set(command.total_amount),
                status: Set(command.status),
                order_date: Set(command.order_date),
                expected_delivery_date: Set(command.expected_delivery_date),
                notes: Set(command.notes.clone()),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?;
            txn.commit().await?;
            Ok::<_, DbErr>(order)
        })
        .await
        .map_err(|e| ServiceError::from_write(e, "Could not allocate a unique order number"))?;

        info!(
            purchase_order_id = order.id,
            order_number = %order.order_number,
            "Purchase order created"
        );
        event_sender
            .publish(Event::PurchaseOrderCreated {
                purchase_order_id: order.id,
                order_number: order.order_number.clone(),
            })
            .await;

        Ok(order)
    }
}
