//! Serialization for money columns.
//!
//! Amounts are `Decimal(12, 2)` in the schema, but SQLite keeps them as REAL
//! and reads lose the scale (`100.00` comes back as `100`). Responses rescale
//! every amount to cents so clients always see two decimal places.

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

pub const SCALE: u32 = 2;

/// `value` rounded or padded to exactly [`SCALE`] decimal places.
pub fn normalize(value: Decimal) -> Decimal {
    let mut value = value;
    value.rescale(SCALE);
    value
}

pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    Serialize::serialize(&normalize(*value), serializer)
}

pub mod option {
    use super::normalize;
    use rust_decimal::Decimal;
    use serde::{Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Decimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value.map(normalize).serialize(serializer)
    }
}
