use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

use super::check_invoice_amounts;
use crate::{
    commands::{purchase_orders::ensure_fulfillable_order, today, Command},
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    middleware_helpers::retry::{with_retry, RetryConfig, WriteContentionPolicy},
    models::{invoice, InvoiceStatus, PaymentMethod},
    numbering::next_number,
};

/// Raises a vendor invoice against an issued purchase order.
///
/// The invoice number is generated unless the caller supplies the vendor's own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvoiceCommand {
    pub purchase_order_id: i32,
    pub invoice_number: Option<String>,
    pub amount: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub status: InvoiceStatus,
    pub invoice_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
}

impl CreateInvoiceCommand {
    fn active_model(&self, invoice_number: String) -> invoice::ActiveModel {
        let now = Utc::now();
        invoice::ActiveModel {
            id: NotSet,
            purchase_order_id: Set(self.purchase_order_id),
            invoice_number: Set(invoice_number),
            amount: Set(self.amount),
            tax_amount: Set(self.tax_amount),
            discount_amount: Set(self.discount_amount),
            status: Set(self.status),
            invoice_date: Set(self.invoice_date),
            due_date: Set(self.due_date),
            paid_date: Set(None),
            payment_method: Set(self.payment_method),
            reference_number: Set(self.reference_number.clone()),
            notes: Set(self.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    async fn ensure_number_free<C: ConnectionTrait>(
        db: &C,
        invoice_number: &str,
    ) -> Result<(), ServiceError> {
        let taken = invoice::Entity::find()
            .filter(invoice::Column::InvoiceNumber.eq(invoice_number))
            .count(db)
            .await?;
        if taken > 0 {
            return Err(ServiceError::field(
                "invoice_number",
                "The invoice_number has already been taken",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Command for CreateInvoiceCommand {
    type Result = invoice::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(purchase_order_id = self.purchase_order_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let db = &*db_pool;

        if !self.status.is_initial() {
            return Err(ServiceError::field(
                "status",
                "New invoices start as Draft or Pending",
            ));
        }
        check_invoice_amounts(
            self.amount,
            self.tax_amount,
            self.discount_amount,
            self.invoice_date,
            self.due_date,
        )?;
        ensure_fulfillable_order(db, self.purchase_order_id).await?;

        let created = match &self.invoice_number {
            Some(number) => {
                Self::ensure_number_free(db, number).await?;
                self.active_model(number.clone())
                    .insert(db)
                    .await
                    .map_err(|e| ServiceError::from_write(e, "The invoice_number has already been taken"))?
            }
            None => {
                let code_date = today();
                let command = self;
                with_retry(&RetryConfig::default(), WriteContentionPolicy, move || async move {
                    let txn = db.begin().await?;
                    let number = next_number::<invoice::Entity, _>(&txn, code_date).await?;
                    let created = command.active_model(number).insert(&txn).await?;
                    txn.commit().await?;
                    Ok::<_, DbErr>(created)
                })
                .await
                .map_err(|e| ServiceError::from_write(e, "Could not allocate a unique invoice number"))?
            }
        };

        info!(
            invoice_id = created.id,
            invoice_number = %created.invoice_number,
            "Invoice created"
        );
        event_sender
            .publish(Event::InvoiceCreated {
                invoice_id: created.id,
                invoice_number: created.invoice_number.clone(),
                purchase_order_id: created.purchase_order_id,
            })
            .await;

        Ok(created)
    }
}
