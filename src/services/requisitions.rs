use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, ModelTrait, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use super::{fetch_page, PageRequest};
use crate::{
    commands::{requisitions::TransitionRequisitionCommand, Command},
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{purchase_order, requisition, Priority, RequisitionAction, RequisitionStatus},
    PaginatedResponse,
};

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RequisitionFilter {
    pub status: Option<RequisitionStatus>,
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone)]
pub struct NewRequisition {
    pub item: String,
    pub quantity: i32,
    pub requested_by: String,
    pub date: NaiveDate,
    pub priority: Priority,
    pub estimated_cost: Option<Decimal>,
    pub description: Option<String>,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct RequisitionChanges {
    pub item: Option<String>,
    pub quantity: Option<i32>,
    pub requested_by: Option<String>,
    pub date: Option<NaiveDate>,
    pub priority: Option<Priority>,
    pub estimated_cost: Option<Decimal>,
    pub description: Option<String>,
}

/// Requisition with the purchase orders raised against it
#[derive(Debug, Serialize, ToSchema)]
pub struct RequisitionDetail {
    #[serde(flatten)]
    pub requisition: requisition::Model,
    pub purchase_orders: Vec<purchase_order::Model>,
}

#[derive(Clone)]
pub struct RequisitionService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl RequisitionService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Lists requisitions, newest first
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: RequisitionFilter,
        page: PageRequest,
    ) -> Result<PaginatedResponse<requisition::Model>, ServiceError> {
        let mut query = requisition::Entity::find().order_by_desc(requisition::Column::Id);
        if let Some(status) = filter.status {
            query = query.filter(requisition::Column::Status.eq(status));
        }
        if let Some(priority) = filter.priority {
            query = query.filter(requisition::Column::Priority.eq(priority));
        }
        fetch_page(&self.db_pool, query, page).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<requisition::Model, ServiceError> {
        requisition::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Requisition", id))
    }

    #[instrument(skip(self))]
    pub async fn detail(&self, id: i32) -> Result<RequisitionDetail, ServiceError> {
        let requisition = self.get(id).await?;
        let purchase_orders = requisition
            .find_related(purchase_order::Entity)
            .order_by_desc(purchase_order::Column::Id)
            .all(&*self.db_pool)
            .await?;
        Ok(RequisitionDetail {
            requisition,
            purchase_orders,
        })
    }

    /// New requisitions always start as Pending.
    #[instrument(skip(self, input), fields(item = %input.item))]
    pub async fn create(&self, input: NewRequisition) -> Result<requisition::Model, ServiceError> {
        let now = Utc::now();
        let created = requisition::ActiveModel {
            id: NotSet,
            item: Set(input.item),
            quantity: Set(input.quantity),
            status: Set(RequisitionStatus::Pending),
            requested_by: Set(input.requested_by),
            date: Set(input.date),
            priority: Set(input.priority),
            estimated_cost: Set(input.estimated_cost),
            description: Set(input.description),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db_pool)
        .await?;

        info!(requisition_id = created.id, "Requisition created");
        self.event_sender
            .publish(Event::RequisitionCreated(created.id))
            .await;
        Ok(created)
    }

    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        id: i32,
        changes: RequisitionChanges,
    ) -> Result<requisition::Model, ServiceError> {
        let mut active = self.get(id).await?.into_active_model();
        if let Some(item) = changes.item {
            active.item = Set(item);
        }
        if let Some(quantity) = changes.quantity {
            active.quantity = Set(quantity);
        }
        if let Some(requested_by) = changes.requested_by {
            active.requested_by = Set(requested_by);
        }
        if let Some(date) = changes.date {
            active.date = Set(date);
        }
        if let Some(priority) = changes.priority {
            active.priority = Set(priority);
        }
        if let Some(cost) = changes.estimated_cost {
            active.estimated_cost = Set(Some(cost));
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db_pool).await?;
        self.event_sender
            .publish(Event::RequisitionUpdated(id))
            .await;
        Ok(updated)
    }

    /// Refuses to delete a requisition that purchase orders still reference.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let requisition = self.get(id).await?;
        let orders = requisition
            .find_related(purchase_order::Entity)
            .count(db)
            .await?;
        if orders > 0 {
            return Err(ServiceError::Conflict(format!(
                "Requisition {} has {} purchase order(s) and cannot be deleted",
                id, orders
            )));
        }

        requisition
            .delete(db)
            .await
            .map_err(|e| ServiceError::from_write(e, "Requisition is referenced by purchase orders"))?;

        info!(requisition_id = id, "Requisition deleted");
        self.event_sender
            .publish(Event::RequisitionDeleted(id))
            .await;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn transition(
        &self,
        id: i32,
        action: RequisitionAction,
    ) -> Result<requisition::Model, ServiceError> {
        TransitionRequisitionCommand { id, action }
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }
}
