use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{sea_query::Expr, ColumnTrait, EntityTrait, QueryFilter};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::{
    commands::Command,
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{purchase_order, PurchaseOrderAction},
};

/// Moves a purchase order one step along its lifecycle.
#[derive(Debug, Clone)]
pub struct TransitionPurchaseOrderCommand {
    pub id: i32,
    pub action: PurchaseOrderAction,
}

#[async_trait]
impl Command for TransitionPurchaseOrderCommand {
    type Result = purchase_order::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(purchase_order_id = self.id, action = %self.action))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let db = &*db_pool;
        let order = purchase_order::Entity::find_by_id(self.id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Purchase order", self.id))?;

        let next = order.status.apply(self.action)?;

        // Guard on the status we read so a concurrent transition cannot be overwritten.
        let result = purchase_order::Entity::update_many()
            .col_expr(purchase_order::Column::Status, Expr::value(next))
            .col_expr(purchase_order::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(purchase_order::Column::Id.eq(self.id))
            .filter(purchase_order::Column::Status.eq(order.status))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::Conflict(format!(
                "Purchase order {} was modified concurrently",
                self.id
            )));
        }

        let updated = purchase_order::Entity::find_by_id(self.id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Purchase order", self.id))?;

        info!(
            old_status = %order.status,
            new_status = %updated.status,
            "Purchase order status changed"
        );
        event_sender
            .publish(Event::PurchaseOrderStatusChanged {
                purchase_order_id: self.id,
                old_status: order.status.to_string(),
                new_status: updated.status.to_string(),
            })
            .await;

        Ok(updated)
    }
}
