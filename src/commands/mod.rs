use crate::{db::DbPool, errors::ServiceError, events::EventSender};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

/// Command trait for implementing the Command Pattern
///
/// A command carries everything needed for one business operation, checks
/// its own preconditions, persists the change and publishes domain events.
#[async_trait]
pub trait Command: Send + Sync {
    /// The return type of the command when executed successfully
    type Result;

    /// Execute the command with the given dependencies
    ///
    /// # Arguments
    /// * `db_pool` - Database connection pool for persistence operations
    /// * `event_sender` - Channel to publish domain events
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError>;
}

pub mod goods_receipts;
pub mod invoices;
pub mod purchase_orders;
pub mod requisitions;

/// Current calendar date in UTC; drives code months and overdue checks.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
