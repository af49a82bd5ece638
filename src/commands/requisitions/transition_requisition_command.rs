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
    models::{requisition, RequisitionAction},
};

/// Approves or rejects a pending requisition.
#[derive(Debug, Clone)]
pub struct TransitionRequisitionCommand {
    pub id: i32,
    pub action: RequisitionAction,
}

#[async_trait]
impl Command for TransitionRequisitionCommand {
    type Result = requisition::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(requisition_id = self.id, action = %self.action))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let db = &*db_pool;
        let current = requisition::Entity::find_by_id(self.id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Requisition", self.id))?;

        let next = current.status.apply(self.action)?;

        let result = requisition::Entity::update_many()
            .col_expr(requisition::Column::Status, Expr::value(next))
            .col_expr(requisition::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(requisition::Column::Id.eq(self.id))
            .filter(requisition::Column::Status.eq(current.status))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::Conflict(format!(
                "Requisition {} was modified concurrently",
                self.id
            )));
        }

        let updated = requisition::Entity::find_by_id(self.id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Requisition", self.id))?;

        info!(new_status = %updated.status, "Requisition status changed");
        event_sender
            .publish(Event::RequisitionStatusChanged {
                requisition_id: self.id,
                old_status: current.status.to_string(),
                new_status: updated.status.to_string(),
            })
            .await;

        Ok(updated)
    }
}
