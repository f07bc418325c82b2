//! Stock records and restocking.

use chrono::NaiveDate;

use super::keys::{InventoryId, ProductId};
use super::validation::{FieldError, non_negative_count, positive_count};

/// Unvalidated inventory fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryDraft {
    pub product_id: String,
    pub stock_quantity: Option<i32>,
    pub last_restocked: Option<NaiveDate>,
}

/// Validated inventory fields.
///
/// The referenced product must exist; repositories check this inside the
/// write transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryDetails {
    product_id: ProductId,
    stock_quantity: Option<i32>,
    last_restocked: Option<NaiveDate>,
}

impl TryFrom<InventoryDraft> for InventoryDetails {
    type Error = FieldError;

    fn try_from(draft: InventoryDraft) -> Result<Self, Self::Error> {
        let product_id = ProductId::new(&draft.product_id)
            .map_err(|err| FieldError::from_key("productId", &err))?;
        Ok(Self {
            product_id,
            stock_quantity: non_negative_count("stockQuantity", draft.stock_quantity)?,
            last_restocked: draft.last_restocked,
        })
    }
}

impl InventoryDetails {
    /// Stocked product.
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// Units on hand; absent when never counted.
    pub fn stock_quantity(&self) -> Option<i32> {
        self.stock_quantity
    }

    /// Date of the most recent delivery.
    pub fn last_restocked(&self) -> Option<NaiveDate> {
        self.last_restocked
    }
}

/// Stored inventory record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRecord {
    id: InventoryId,
    details: InventoryDetails,
}

impl InventoryRecord {
    /// Assemble a record from stored values.
    pub fn new(id: InventoryId, details: InventoryDetails) -> Self {
        Self { id, details }
    }

    /// Record key.
    pub fn id(&self) -> InventoryId {
        self.id
    }

    /// Stored fields.
    pub fn details(&self) -> &InventoryDetails {
        &self.details
    }
}

/// A delivery of `quantity` units received on `received_on`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Restock {
    quantity: i32,
    received_on: NaiveDate,
}

impl Restock {
    /// Validate a delivery; the quantity must be positive.
    pub fn new(quantity: i32, received_on: NaiveDate) -> Result<Self, FieldError> {
        Ok(Self {
            quantity: positive_count("quantity", quantity)?,
            received_on,
        })
    }

    /// Units received.
    pub fn quantity(self) -> i32 {
        self.quantity
    }

    /// Delivery date recorded as `last_restocked`.
    pub fn received_on(self) -> NaiveDate {
        self.received_on
    }

    /// Stock level after applying this delivery to `current`.
    ///
    /// Absent stock counts as zero. Returns `None` on `i32` overflow.
    ///
    /// # Examples
    /// ```
    /// use backoffice::domain::Restock;
    /// use chrono::NaiveDate;
    ///
    /// let day = NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date");
    /// let restock = Restock::new(5, day).expect("positive");
    /// assert_eq!(restock.apply_to(None), Some(5));
    /// assert_eq!(restock.apply_to(Some(7)), Some(12));
    /// ```
    pub fn apply_to(self, current: Option<i32>) -> Option<i32> {
        current.unwrap_or(0).checked_add(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 4).expect("valid date")
    }

    #[rstest]
    #[case(0)]
    #[case(-3)]
    fn restock_requires_positive_quantity(#[case] quantity: i32) {
        assert!(Restock::new(quantity, day()).is_err());
    }

    #[rstest]
    fn restock_detects_overflow() {
        let restock = Restock::new(1, day()).expect("positive");
        assert_eq!(restock.apply_to(Some(i32::MAX)), None);
    }

    #[rstest]
    fn negative_stock_is_rejected() {
        let err = InventoryDetails::try_from(InventoryDraft {
            product_id: "SKU-1".to_owned(),
            stock_quantity: Some(-1),
            last_restocked: None,
        })
        .expect_err("negative stock");
        assert_eq!(err.field(), "stockQuantity");
    }

    #[rstest]
    fn blank_product_is_rejected() {
        let err = InventoryDetails::try_from(InventoryDraft::default()).expect_err("blank id");
        assert_eq!(err.field(), "productId");
        assert_eq!(err.code(), "empty_id");
    }
}
