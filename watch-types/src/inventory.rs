use crate::price::parse_price;
use derive_more::{Deref, Display, Error, From};
use std::collections::HashMap;

pub const CODE_COLUMN: &str = "Код";
pub const QUANTITY_COLUMN: &str = "Количество";
pub const PRICE_COLUMN: &str = "Цена";

pub const REQUIRED_COLUMNS: [&str; 3] = [CODE_COLUMN, QUANTITY_COLUMN, PRICE_COLUMN];

/// Quantity the supplier reports for "more than ten in stock".
pub const OVERSTOCK_SENTINEL: &str = ">10";
pub const OVERSTOCK_COUNT: u32 = 100;
/// A single remaining item is kept as a showcase sample and never offered.
pub const LAST_ITEM_QUANTITY: &str = "1";

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[display("Inventory row has no {column:?} column")]
    MissingColumn { column: &'static str },
    #[display("Unable to parse quantity {quantity:?}")]
    InvalidQuantity { quantity: String },
    #[display("Unable to parse price {price:?}")]
    InvalidPrice { price: String },
}

/// Spreadsheet row as header text mapped to cell text. Blank cells are empty strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deref, From)]
pub struct InventoryRow(HashMap<String, String>);

impl FromIterator<(String, String)> for InventoryRow {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InventoryRecord {
    pub code: String,
    pub quantity: String,
    pub price: String,
}

impl InventoryRecord {
    pub fn new<C: ToString, Q: ToString, P: ToString>(code: C, quantity: Q, price: P) -> Self {
        Self {
            code: code.to_string(),
            quantity: quantity.to_string(),
            price: price.to_string(),
        }
    }

    pub fn stock_count(&self) -> Result<u32, RecordError> {
        stock_count(&self.quantity)
    }

    pub fn price_value(&self) -> Result<u64, RecordError> {
        parse_price(&self.price)
    }
}

impl TryFrom<InventoryRow> for InventoryRecord {
    type Error = RecordError;

    fn try_from(mut row: InventoryRow) -> Result<Self, Self::Error> {
        let mut take = |column: &'static str| {
            row.0
                .remove(column)
                .ok_or(RecordError::MissingColumn { column })
        };
        Ok(Self {
            code: take(CODE_COLUMN)?,
            quantity: take(QUANTITY_COLUMN)?,
            price: take(PRICE_COLUMN)?,
        })
    }
}

pub fn stock_count(quantity: &str) -> Result<u32, RecordError> {
    match quantity.trim() {
        OVERSTOCK_SENTINEL => Ok(OVERSTOCK_COUNT),
        LAST_ITEM_QUANTITY => Ok(0),
        count => count.parse().map_err(|_| RecordError::InvalidQuantity {
            quantity: quantity.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_quantity_sentinels() {
        assert_eq!(Ok(100), stock_count(">10"));
        assert_eq!(Ok(0), stock_count("1"));
        assert_eq!(Ok(7), stock_count("7"));
        assert_eq!(Ok(0), stock_count("0"));
        assert_eq!(Ok(25), stock_count(" 25 "));
    }

    #[test]
    fn rejects_non_numeric_quantity() {
        assert_eq!(
            Err(RecordError::InvalidQuantity {
                quantity: "много".to_string()
            }),
            stock_count("много")
        );
        assert!(stock_count("").is_err());
        assert!(stock_count("-3").is_err());
    }

    #[test]
    fn converts_row_into_record() {
        let row = [
            (CODE_COLUMN, "75001"),
            (QUANTITY_COLUMN, ">10"),
            (PRICE_COLUMN, "5'990.00 руб."),
            ("Наименование", "G-SHOCK GA-2100"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect::<InventoryRow>();
        let record = InventoryRecord::try_from(row).unwrap();
        assert_eq!(InventoryRecord::new("75001", ">10", "5'990.00 руб."), record);
        assert_eq!(Ok(100), record.stock_count());
        assert_eq!(Ok(5990), record.price_value());
    }

    #[test]
    fn reports_missing_column() {
        let row = [(CODE_COLUMN, "75001"), (QUANTITY_COLUMN, "3")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<InventoryRow>();
        assert_eq!(
            Err(RecordError::MissingColumn {
                column: PRICE_COLUMN
            }),
            InventoryRecord::try_from(row)
        );
    }
}
