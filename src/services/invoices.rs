use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use super::{fetch_page, PageRequest};
use crate::{
    commands::{
        invoices::{
            check_invoice_amounts, CreateInvoiceCommand, PaymentDetails, TransitionInvoiceCommand,
        },
        purchase_orders::ensure_fulfillable_order,
        today, Command,
    },
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{invoice, purchase_order, InvoiceAction, InvoiceStatus, PaymentMethod},
    PaginatedResponse,
};

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InvoiceFilter {
    /// Matches the status clients see, so `Overdue` includes pending invoices past due
    pub status: Option<InvoiceStatus>,
    pub purchase_order_id: Option<i32>,
    pub overdue: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct InvoiceChanges {
    pub purchase_order_id: Option<i32>,
    pub invoice_number: Option<String>,
    pub amount: Option<Decimal>,
    pub tax_amount: Option<Decimal>,
    pub discount_amount: Option<Decimal>,
    pub invoice_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
}

/// Invoice plus the values derived from today's date
#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceView {
    #[serde(flatten)]
    pub invoice: invoice::Model,
    pub effective_status: InvoiceStatus,
    pub is_overdue: bool,
    /// Negative once past due
    pub days_until_due: Option<i64>,
    #[serde(serialize_with = "crate::models::money::serialize")]
    pub net_amount: Decimal,
}

impl InvoiceView {
    pub fn new(invoice: invoice::Model, today: NaiveDate) -> Self {
        Self {
            effective_status: invoice.effective_status(today),
            is_overdue: invoice.is_overdue(today),
            days_until_due: invoice.days_until_due(today),
            net_amount: invoice.net_amount(),
            invoice,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: InvoiceView,
    pub purchase_order: Option<purchase_order::Model>,
}

/// Rows whose effective status is Overdue on `today`.
pub(crate) fn overdue_condition(today: NaiveDate) -> Condition {
    Condition::any()
        .add(invoice::Column::Status.eq(InvoiceStatus::Overdue))
        .add(
            Condition::all()
                .add(invoice::Column::Status.eq(InvoiceStatus::Pending))
                .add(invoice::Column::DueDate.is_not_null())
                .add(invoice::Column::DueDate.lt(today)),
        )
}

fn status_condition(status: InvoiceStatus, today: NaiveDate) -> Condition {
    match status {
        InvoiceStatus::Overdue => overdue_condition(today),
        InvoiceStatus::Pending => Condition::all()
            .add(invoice::Column::Status.eq(InvoiceStatus::Pending))
            .add(
                Condition::any()
                    .add(invoice::Column::DueDate.is_null())
                    .add(invoice::Column::DueDate.gte(today)),
            ),
        other => Condition::all().add(invoice::Column::Status.eq(other)),
    }
}

#[derive(Clone)]
pub struct InvoiceService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl InvoiceService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: InvoiceFilter,
        page: PageRequest,
    ) -> Result<PaginatedResponse<InvoiceView>, ServiceError> {
        let on = today();
        let mut query = invoice::Entity::find().order_by_desc(invoice::Column::Id);
        if let Some(status) = filter.status {
            query = query.filter(status_condition(status, on));
        }
        if let Some(purchase_order_id) = filter.purchase_order_id {
            query = query.filter(invoice::Column::PurchaseOrderId.eq(purchase_order_id));
        }
        match filter.overdue {
            Some(true) => query = query.filter(overdue_condition(on)),
            Some(false) => query = query.filter(overdue_condition(on).not()),
            None => {}
        }

        let page = fetch_page(&self.db_pool, query, page).await?;
        Ok(page.map(|inv| InvoiceView::new(inv, on)))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<invoice::Model, ServiceError> {
        invoice::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Invoice", id))
    }

    #[instrument(skip(self))]
    pub async fn detail(&self, id: i32) -> Result<InvoiceDetail, ServiceError> {
        let invoice = self.get(id).await?;
        let purchase_order = invoice
            .find_related(purchase_order::Entity)
            .one(&*self.db_pool)
            .await?;
        Ok(InvoiceDetail {
            invoice: InvoiceView::new(invoice, today()),
            purchase_order,
        })
    }

    #[instrument(skip(self, command))]
    pub async fn create(&self, command: CreateInvoiceCommand) -> Result<InvoiceView, ServiceError> {
        let created = command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await?;
        Ok(InvoiceView::new(created, today()))
    }

    /// Paid and cancelled invoices are read-only.
    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: i32, changes: InvoiceChanges) -> Result<InvoiceView, ServiceError> {
        let db = &*self.db_pool;
        let current = self.get(id).await?;
        if matches!(current.status, InvoiceStatus::Paid | InvoiceStatus::Cancelled) {
            return Err(ServiceError::Conflict(format!(
                "Invoice {} is {} and can no longer be edited",
                id, current.status
            )));
        }

        check_invoice_amounts(
            changes.amount.unwrap_or(current.amount),
            changes.tax_amount.unwrap_or(current.tax_amount),
            changes.discount_amount.unwrap_or(current.discount_amount),
            changes.invoice_date.unwrap_or(current.invoice_date),
            changes.due_date.or(current.due_date),
        )?;
        if let Some(purchase_order_id) = changes.purchase_order_id {
            if purchase_order_id != current.purchase_order_id {
                ensure_fulfillable_order(db, purchase_order_id).await?;
            }
        }
        if let Some(number) = &changes.invoice_number {
            if number != &current.invoice_number {
                let taken = invoice::Entity::find()
                    .filter(invoice::Column::InvoiceNumber.eq(number.as_str()))
                    .count(db)
                    .await?;
                if taken > 0 {
                    return Err(ServiceError::field(
                        "invoice_number",
                        "The invoice_number has already been taken",
                    ));
                }
            }
        }

        let mut active = current.into_active_model();
        if let Some(purchase_order_id) = changes.purchase_order_id {
            active.purchase_order_id = Set(purchase_order_id);
        }
        if let Some(number) = changes.invoice_number {
            active.invoice_number = Set(number);
        }
        if let Some(amount) = changes.amount {
            active.amount = Set(amount);
        }
        if let Some(tax) = changes.tax_amount {
            active.tax_amount = Set(tax);
        }
        if let Some(discount) = changes.discount_amount {
            active.discount_amount = Set(discount);
        }
        if let Some(invoice_date) = changes.invoice_date {
            active.invoice_date = Set(invoice_date);
        }
        if let Some(due_date) = changes.due_date {
            active.due_date = Set(Some(due_date));
        }
        if let Some(method) = changes.payment_method {
            active.payment_method = Set(Some(method));
        }
        if let Some(reference) = changes.reference_number {
            active.reference_number = Set(Some(reference));
        }
        if let Some(notes) = changes.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(Utc::now());

        let updated = active
            .update(db)
            .await
            .map_err(|e| ServiceError::from_write(e, "The invoice_number has already been taken"))?;
        self.event_sender.publish(Event::InvoiceUpdated(id)).await;
        Ok(InvoiceView::new(updated, today()))
    }

    /// Paid invoices are part of the payment record and stay.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let invoice = self.get(id).await?;
        if invoice.status == InvoiceStatus::Paid {
            return Err(ServiceError::Conflict(format!(
                "Invoice {} has been paid and cannot be deleted",
                id
            )));
        }
        invoice.delete(&*self.db_pool).await?;

        info!(invoice_id = id, "Invoice deleted");
        self.event_sender.publish(Event::InvoiceDeleted(id)).await;
        Ok(())
    }

    #[instrument(skip(self, payment))]
    pub async fn transition(
        &self,
        id: i32,
        action: InvoiceAction,
        payment: PaymentDetails,
    ) -> Result<InvoiceView, ServiceError> {
        let updated = TransitionInvoiceCommand {
            id,
            action,
            payment,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone())
        .await?;
        Ok(InvoiceView::new(updated, today()))
    }
}
