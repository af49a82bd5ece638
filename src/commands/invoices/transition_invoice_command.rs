use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::{sea_query::Expr, ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::{
    commands::{today, Command},
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{invoice, InvoiceAction, InvoiceStatus, PaymentMethod},
};

/// Settlement details recorded when an invoice is paid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub paid_date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
    pub reference_number: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TransitionInvoiceCommand {
    pub id: i32,
    pub action: InvoiceAction,
    pub payment: PaymentDetails,
}

#[async_trait]
impl Command for TransitionInvoiceCommand {
    type Result = invoice::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(invoice_id = self.id, action = %self.action))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let db = &*db_pool;
        let current = invoice::Entity::find_by_id(self.id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Invoice", self.id))?;

        let next = current.status.apply(self.action)?;

        let mut update = invoice::Entity::update_many()
            .col_expr(invoice::Column::Status, Expr::value(next))
            .col_expr(invoice::Column::UpdatedAt, Expr::value(Utc::now()));

        if next == InvoiceStatus::Paid {
            let paid_date = self.payment.paid_date.unwrap_or_else(today);
            update = update.col_expr(invoice::Column::PaidDate, Expr::value(paid_date));
            if let Some(method) = self.payment.payment_method {
                update = update.col_expr(invoice::Column::PaymentMethod, Expr::value(method));
            }
            if let Some(reference) = &self.payment.reference_number {
                update = update
                    .col_expr(invoice::Column::ReferenceNumber, Expr::value(reference.clone()));
            }
        }

        let result = update
            .filter(invoice::Column::Id.eq(self.id))
            .filter(invoice::Column::Status.eq(current.status))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::Conflict(format!(
                "Invoice {} was modified concurrently",
                self.id
            )));
        }

        let updated = invoice::Entity::find_by_id(self.id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Invoice", self.id))?;

        info!(
            old_status = %current.status,
            new_status = %updated.status,
            "Invoice status changed"
        );
        event_sender
            .publish(Event::InvoiceStatusChanged {
                invoice_id: self.id,
                old_status: current.status.to_string(),
                new_status: updated.status.to_string(),
            })
            .await;

        Ok(updated)
    }
}
