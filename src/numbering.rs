//! Monthly sequence codes such as `PO2024060007`.
//!
//! A code is `<PREFIX><YYYY><MM>` followed by a zero-padded sequence that
//! restarts every calendar month. The next value is one past the largest
//! suffix already stored for that month.

use chrono::{Datelike, NaiveDate};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect};

use crate::models::{goods_receipt, invoice, purchase_order};

/// Minimum width of the sequence suffix
pub const SEQUENCE_WIDTH: usize = 4;

/// Entities whose rows carry a monthly sequence code.
pub trait SequencedEntity: EntityTrait {
    const PREFIX: &'static str;

    fn number_column() -> Self::Column;
}

impl SequencedEntity for purchase_order::Entity {
    const PREFIX: &'static str = "PO";

    fn number_column() -> Self::Column {
        purchase_order::Column::OrderNumber
    }
}

impl SequencedEntity for goods_receipt::Entity {
    const PREFIX: &'static str = "GR";

    fn number_column() -> Self::Column {
        goods_receipt::Column::ReceiptNumber
    }
}

impl SequencedEntity for invoice::Entity {
    const PREFIX: &'static str = "INV";

    fn number_column() -> Self::Column {
        invoice::Column::InvoiceNumber
    }
}

/// `PO` + `2024-06-15` gives `PO202406`.
pub fn month_prefix(prefix: &str, on: NaiveDate) -> String {
    format!("{}{:04}{:02}", prefix, on.year(), on.month())
}

pub fn format_code(month_prefix: &str, sequence: u32) -> String {
    format!(
        "{}{:0width$}",
        month_prefix,
        sequence,
        width = SEQUENCE_WIDTH
    )
}

/// Sequence suffix of `code`, if it belongs to `month_prefix` and ends in digits only.
pub fn parse_suffix(month_prefix: &str, code: &str) -> Option<u32> {
    let suffix = code.strip_prefix(month_prefix)?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

/// Next free code for `E` in the month containing `on`.
///
/// Callers insert inside the same transaction and rely on the unique index
/// on the code column to reject a concurrent duplicate.
pub async fn next_number<E, C>(db: &C, on: NaiveDate) -> Result<String, DbErr>
where
    E: SequencedEntity,
    C: ConnectionTrait,
{
    let prefix = month_prefix(E::PREFIX, on);
    let codes: Vec<String> = E::find()
        .select_only()
        .column(E::number_column())
        .filter(E::number_column().starts_with(prefix.as_str()))
        .into_tuple()
        .all(db)
        .await?;

    let last = codes
        .iter()
        .filter_map(|code| parse_suffix(&prefix, code))
        .max()
        .unwrap_or(0);

    Ok(format_code(&prefix, last + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    #[test]
    fn prefixes_include_year_and_month() {
        assert_eq!(month_prefix("PO", june(15)), "PO202406");
        assert_eq!(
            month_prefix("INV", NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()),
            "INV202512"
        );
    }

    #[test]
    fn codes_are_zero_padded_to_four_digits() {
        assert_eq!(format_code("GR202406", 1), "GR2024060001");
        assert_eq!(format_code("GR202406", 42), "GR2024060042");
        assert_eq!(format_code("GR202406", 12345), "GR20240612345");
    }

    #[test]
    fn suffix_parsing_ignores_other_months_and_free_text() {
        assert_eq!(parse_suffix("PO202406", "PO2024060009"), Some(9));
        assert_eq!(parse_suffix("PO202406", "PO2024050009"), None);
        assert_eq!(parse_suffix("INV202406", "INV202406-A1"), None);
        assert_eq!(parse_suffix("INV202406", "INV202406"), None);
    }
}
