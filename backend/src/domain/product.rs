//! Product catalogue records.

use super::keys::ProductId;
use super::validation::{FieldError, non_negative_amount, optional_text};

const NAME_MAX: usize = 255;
const CATEGORY_MAX: usize = 100;

/// Unvalidated product fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductDraft {
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit_price: Option<f64>,
    pub description: Option<String>,
}

/// Validated product fields.
///
/// `unit_price`, when present, is finite and non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetails {
    name: Option<String>,
    category: Option<String>,
    unit_price: Option<f64>,
    description: Option<String>,
}

impl TryFrom<ProductDraft> for ProductDetails {
    type Error = FieldError;

    fn try_from(draft: ProductDraft) -> Result<Self, Self::Error> {
        Ok(Self {
            name: optional_text("productName", draft.name, Some(NAME_MAX))?,
            category: optional_text("category", draft.category, Some(CATEGORY_MAX))?,
            unit_price: non_negative_amount("unitPrice", draft.unit_price)?,
            description: optional_text("productDescription", draft.description, None)?,
        })
    }
}

impl ProductDetails {
    /// Display name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Category used by the sales-by-category breakdown.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// List price.
    pub fn unit_price(&self) -> Option<f64> {
        self.unit_price
    }

    /// Free-text description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Stored product.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    id: ProductId,
    details: ProductDetails,
}

impl Product {
    /// Assemble a product from stored values.
    pub fn new(id: ProductId, details: ProductDetails) -> Self {
        Self { id, details }
    }

    /// Product key.
    pub fn id(&self) -> &ProductId {
        &self.id
    }

    /// Editable fields.
    pub fn details(&self) -> &ProductDetails {
        &self.details
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn negative_prices_are_rejected() {
        let err = ProductDetails::try_from(ProductDraft {
            unit_price: Some(-1.0),
            ..ProductDraft::default()
        })
        .expect_err("negative price");
        assert_eq!(err.field(), "unitPrice");
    }

    #[rstest]
    fn free_products_are_allowed() {
        let details = ProductDetails::try_from(ProductDraft {
            name: Some(" Sample sachet ".to_owned()),
            unit_price: Some(0.0),
            ..ProductDraft::default()
        })
        .expect("valid");
        assert_eq!(details.name(), Some("Sample sachet"));
        assert_eq!(details.unit_price(), Some(0.0));
    }
}
