use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, DbErr, NotSet, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::{
    commands::{purchase_orders::ensure_fulfillable_order, today, Command},
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    middleware_helpers::retry::{with_retry, RetryConfig, WriteContentionPolicy},
    models::{goods_receipt, GoodsCondition},
    numbering::next_number,
};

/// Records a delivery against an issued purchase order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGoodsReceiptCommand {
    pub purchase_order_id: i32,
    pub received_date: NaiveDate,
    pub quantity_received: i32,
    pub item: String,
    pub condition: GoodsCondition,
    pub received_by: Option<String>,
    pub warehouse_location: Option<String>,
    pub notes: Option<String>,
}

#[async_trait]
impl Command for CreateGoodsReceiptCommand {
    type Result = goods_receipt::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(purchase_order_id = self.purchase_order_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let db = &*db_pool;
        ensure_fulfillable_order(db, self.purchase_order_id).await?;

        let code_date = today();
        let command = self;
        let receipt = with_retry(&RetryConfig::default(), WriteContentionPolicy, move || async move {
            let txn = db.begin().await?;
            let receipt_number = next_number::<goods_receipt::Entity, _>(&txn, code_date).await?;
            let now = Utc::now();
            let receipt = goods_receipt::ActiveModel {
                id: NotSet,
                purchase_order_id: Set(command.purchase_order_id),
                receipt_number: Set(receipt_number),
                received_date: Set(command.received_date),
                quantity_received: Set(command.quantity_received),
                item: Set(command.item.clone()),
                condition: Set(command.condition),
                received_by: Set(command.received_by.clone()),
                warehouse_location: Set(command.warehouse_location.clone()),
                notes: Set(command.notes.clone()),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?;
            txn.commit().await?;
            Ok::<_, DbErr>(receipt)
        })
        .await
        .map_err(|e| ServiceError::from_write(e, "Could not allocate a unique receipt number"))?;

        info!(
            goods_receipt_id = receipt.id,
            receipt_number = %receipt.receipt_number,
            "Goods receipt recorded"
        );
        event_sender
            .publish(Event::GoodsReceived {
                goods_receipt_id: receipt.id,
                receipt_number: receipt.receipt_number.clone(),
                purchase_order_id: receipt.purchase_order_id,
                quantity_received: receipt.quantity_received,
            })
            .await;

        Ok(receipt)
    }
}
