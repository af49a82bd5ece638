use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use super::{fetch_page, PageRequest};
use crate::{
    commands::{
        goods_receipts::CreateGoodsReceiptCommand, purchase_orders::ensure_fulfillable_order,
        Command,
    },
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{goods_receipt, purchase_order, GoodsCondition},
    PaginatedResponse,
};

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GoodsReceiptFilter {
    pub purchase_order_id: Option<i32>,
    pub condition: Option<GoodsCondition>,
}

#[derive(Debug, Clone, Default)]
pub struct GoodsReceiptChanges {
    pub purchase_order_id: Option<i32>,
    pub received_date: Option<NaiveDate>,
    pub quantity_received: Option<i32>,
    pub item: Option<String>,
    pub condition: Option<GoodsCondition>,
    pub received_by: Option<String>,
    pub warehouse_location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GoodsReceiptDetail {
    #[serde(flatten)]
    pub goods_receipt: goods_receipt::Model,
    pub purchase_order: Option<purchase_order::Model>,
}

#[derive(Clone)]
pub struct GoodsReceiptService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl GoodsReceiptService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: GoodsReceiptFilter,
        page: PageRequest,
    ) -> Result<PaginatedResponse<goods_receipt::Model>, ServiceError> {
        let mut query = goods_receipt::Entity::find().order_by_desc(goods_receipt::Column::Id);
        if let Some(purchase_order_id) = filter.purchase_order_id {
            query = query.filter(goods_receipt::Column::PurchaseOrderId.eq(purchase_order_id));
        }
        if let Some(condition) = filter.condition {
            query = query.filter(goods_receipt::Column::Condition.eq(condition));
        }
        fetch_page(&self.db_pool, query, page).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<goods_receipt::Model, ServiceError> {
        goods_receipt::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Goods receipt", id))
    }

    #[instrument(skip(self))]
    pub async fn detail(&self, id: i32) -> Result<GoodsReceiptDetail, ServiceError> {
        let goods_receipt = self.get(id).await?;
        let purchase_order = goods_receipt
            .find_related(purchase_order::Entity)
            .one(&*self.db_pool)
            .await?;
        Ok(GoodsReceiptDetail {
            goods_receipt,
            purchase_order,
        })
    }

    #[instrument(skip(self, command))]
    pub async fn create(
        &self,
        command: CreateGoodsReceiptCommand,
    ) -> Result<goods_receipt::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        id: i32,
        changes: GoodsReceiptChanges,
    ) -> Result<goods_receipt::Model, ServiceError> {
        let db = &*self.db_pool;
        let current = self.get(id).await?;
        if let Some(purchase_order_id) = changes.purchase_order_id {
            if purchase_order_id != current.purchase_order_id {
                ensure_fulfillable_order(db, purchase_order_id).await?;
            }
        }

        let mut active = current.into_active_model();
        if let Some(purchase_order_id) = changes.purchase_order_id {
            active.purchase_order_id = Set(purchase_order_id);
        }
        if let Some(received_date) = changes.received_date {
            active.received_date = Set(received_date);
        }
        if let Some(quantity) = changes.quantity_received {
            active.quantity_received = Set(quantity);
        }
        if let Some(item) = changes.item {
            active.item = Set(item);
        }
        if let Some(condition) = changes.condition {
            active.condition = Set(condition);
        }
        if let Some(received_by) = changes.received_by {
            active.received_by = Set(Some(received_by));
        }
        if let Some(location) = changes.warehouse_location {
            active.warehouse_location = Set(Some(location));
        }
        if let Some(notes) = changes.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(Utc::now());

        let updated = active
            .update(db)
            .await
            .map_err(|e| ServiceError::from_write(e, "Referenced purchase order no longer exists"))?;
        self.event_sender
            .publish(Event::GoodsReceiptUpdated(id))
            .await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let receipt = self.get(id).await?;
        receipt.delete(&*self.db_pool).await?;

        info!(goods_receipt_id = id, "Goods receipt deleted");
        self.event_sender
            .publish(Event::GoodsReceiptDeleted(id))
            .await;
        Ok(())
    }
}
