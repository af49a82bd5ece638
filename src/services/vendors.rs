use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, ModelTrait,
    NotSet, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use super::{fetch_page, PageRequest};
use crate::{
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{purchase_order, vendor},
    PaginatedResponse,
};

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VendorFilter {
    /// Only active (`true`) or inactive (`false`) vendors
    pub active: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewVendor {
    pub name: String,
    pub contact: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub is_active: bool,
    pub rating: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct VendorChanges {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
    pub rating: Option<Decimal>,
}

/// Vendor with its purchase orders and their combined value
#[derive(Debug, Serialize, ToSchema)]
pub struct VendorDetail {
    #[serde(flatten)]
    pub vendor: vendor::Model,
    pub purchase_orders: Vec<purchase_order::Model>,
    #[serde(serialize_with = "crate::models::money::serialize")]
    pub total_order_value: Decimal,
}

#[derive(Clone)]
pub struct VendorService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl VendorService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: VendorFilter,
        page: PageRequest,
    ) -> Result<PaginatedResponse<vendor::Model>, ServiceError> {
        let mut query = vendor::Entity::find().order_by_desc(vendor::Column::Id);
        if let Some(active) = filter.active {
            query = query.filter(vendor::Column::IsActive.eq(active));
        }
        fetch_page(&self.db_pool, query, page).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<vendor::Model, ServiceError> {
        vendor::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Vendor", id))
    }

    #[instrument(skip(self))]
    pub async fn detail(&self, id: i32) -> Result<VendorDetail, ServiceError> {
        let vendor = self.get(id).await?;
        let purchase_orders = vendor
            .find_related(purchase_order::Entity)
            .order_by_desc(purchase_order::Column::Id)
            .all(&*self.db_pool)
            .await?;
        let total_order_value = purchase_orders.iter().map(|po| po.total_amount).sum();
        Ok(VendorDetail {
            vendor,
            purchase_orders,
            total_order_value,
        })
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create(&self, input: NewVendor) -> Result<vendor::Model, ServiceError> {
        let db = &*self.db_pool;
        ensure_email_free(db, &input.email, None).await?;

        let now = Utc::now();
        let created = vendor::ActiveModel {
            id: NotSet,
            name: Set(input.name),
            contact: Set(input.contact),
            email: Set(input.email),
            phone: Set(input.phone),
            address: Set(input.address),
            is_active: Set(input.is_active),
            rating: Set(input.rating),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .map_err(|e| ServiceError::from_write(e, "A vendor with this email already exists"))?;

        info!(vendor_id = created.id, "Vendor created");
        self.event_sender.publish(Event::VendorCreated(created.id)).await;
        Ok(created)
    }

    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: i32, changes: VendorChanges) -> Result<vendor::Model, ServiceError> {
        let db = &*self.db_pool;
        let current = self.get(id).await?;
        if let Some(email) = &changes.email {
            if email != &current.email {
                ensure_email_free(db, email, Some(id)).await?;
            }
        }

        let mut active = current.into_active_model();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(contact) = changes.contact {
            active.contact = Set(contact);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(phone);
        }
        if let Some(address) = changes.address {
            active.address = Set(Some(address));
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        if let Some(rating) = changes.rating {
            active.rating = Set(rating);
        }
        active.updated_at = Set(Utc::now());

        let updated = active
            .update(db)
            .await
            .map_err(|e| ServiceError::from_write(e, "A vendor with this email already exists"))?;
        self.event_sender.publish(Event::VendorUpdated(id)).await;
        Ok(updated)
    }

    /// Vendors with purchase orders on file cannot be deleted; deactivate them instead.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let vendor = self.get(id).await?;
        let orders = vendor.find_related(purchase_order::Entity).count(db).await?;
        if orders > 0 {
            return Err(ServiceError::Conflict(format!(
                "Vendor {} has {} purchase order(s) and cannot be deleted",
                id, orders
            )));
        }

        vendor
            .delete(db)
            .await
            .map_err(|e| ServiceError::from_write(e, "Vendor is referenced by purchase orders"))?;

        info!(vendor_id = id, "Vendor deleted");
        self.event_sender.publish(Event::VendorDeleted(id)).await;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn set_active(&self, id: i32, is_active: bool) -> Result<vendor::Model, ServiceError> {
        let mut active = self.get(id).await?.into_active_model();
        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db_pool).await?;

        info!(vendor_id = id, is_active, "Vendor activation changed");
        self.event_sender
            .publish(Event::VendorActivationChanged {
                vendor_id: id,
                is_active,
            })
            .await;
        Ok(updated)
    }

    /// Stores the rating clamped to the 0-5 scale.
    #[instrument(skip(self))]
    pub async fn set_rating(&self, id: i32, rating: Decimal) -> Result<vendor::Model, ServiceError> {
        let rating = vendor::clamp_rating(rating);
        let mut active = self.get(id).await?.into_active_model();
        active.rating = Set(rating);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db_pool).await?;

        self.event_sender
            .publish(Event::VendorRated {
                vendor_id: id,
                rating,
            })
            .await;
        Ok(updated)
    }
}

async fn ensure_email_free<C: ConnectionTrait>(
    db: &C,
    email: &str,
    except_id: Option<i32>,
) -> Result<(), ServiceError> {
    let mut query = vendor::Entity::find().filter(vendor::Column::Email.eq(email));
    if let Some(id) = except_id {
        query = query.filter(vendor::Column::Id.ne(id));
    }
    if query.count(db).await? > 0 {
        return Err(ServiceError::field("email", "The email has already been taken"));
    }
    Ok(())
}
