//! Read models and CRUD operations over the procurement entities.
//!
//! Writes that carry business rules (numbered creation, status transitions)
//! are delegated to `crate::commands`.

pub mod dashboard;
pub mod goods_receipts;
pub mod invoices;
pub mod purchase_orders;
pub mod requisitions;
pub mod vendors;

use sea_orm::{EntityTrait, FromQueryResult, PaginatorTrait, Select};

use crate::{db::DbPool, errors::ServiceError, PaginatedResponse};

/// One-based page request, already clamped to configured limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }
}

/// Fetches one page of `query` along with the total row count.
pub(crate) async fn fetch_page<E>(
    db: &DbPool,
    query: Select<E>,
    page: PageRequest,
) -> Result<PaginatedResponse<E::Model>, ServiceError>
where
    E: EntityTrait,
    E::Model: FromQueryResult + Send + Sync + 'static,
{
    let paginator = query.paginate(db, page.limit);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page.page - 1).await?;
    Ok(PaginatedResponse::new(items, total, page.page, page.limit))
}
