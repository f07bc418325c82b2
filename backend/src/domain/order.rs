//! Orders and their line items.

use chrono::NaiveDate;

use super::keys::{CustomerId, OrderId, OrderLineId, ProductId};
use super::user::UserId;
use super::validation::{FieldError, non_negative_amount, optional_text, positive_count};

/// Unvalidated order header fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderDraft {
    pub customer_id: Option<String>,
    pub order_date: Option<NaiveDate>,
    pub total_amount: Option<f64>,
    pub shipping_address: Option<String>,
}

/// Validated order header.
///
/// Orders without a customer are walk-in sales; they never affect any
/// customer's last purchase date.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderHeader {
    customer_id: Option<CustomerId>,
    order_date: Option<NaiveDate>,
    total_amount: Option<f64>,
    shipping_address: Option<String>,
}

impl TryFrom<OrderDraft> for OrderHeader {
    type Error = FieldError;

    fn try_from(draft: OrderDraft) -> Result<Self, Self::Error> {
        let customer_id = draft
            .customer_id
            .filter(|raw| !raw.trim().is_empty())
            .map(CustomerId::new)
            .transpose()
            .map_err(|err| FieldError::from_key("customerId", &err))?;
        Ok(Self {
            customer_id,
            order_date: draft.order_date,
            total_amount: non_negative_amount("totalAmount", draft.total_amount)?,
            shipping_address: optional_text("shippingAddress", draft.shipping_address, None)?,
        })
    }
}

impl OrderHeader {
    /// Ordering customer, absent for walk-in sales.
    pub fn customer_id(&self) -> Option<&CustomerId> {
        self.customer_id.as_ref()
    }

    /// Order date; drives the customer's last purchase date.
    pub fn order_date(&self) -> Option<NaiveDate> {
        self.order_date
    }

    /// Order total as invoiced.
    pub fn total_amount(&self) -> Option<f64> {
        self.total_amount
    }

    /// Delivery address.
    pub fn shipping_address(&self) -> Option<&str> {
        self.shipping_address.as_deref()
    }
}

/// Stored order.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    id: OrderId,
    header: OrderHeader,
    recorded_by: Option<UserId>,
}

impl Order {
    /// Assemble an order from stored values.
    pub fn new(id: OrderId, header: OrderHeader, recorded_by: Option<UserId>) -> Self {
        Self {
            id,
            header,
            recorded_by,
        }
    }

    /// Order key.
    pub fn id(&self) -> &OrderId {
        &self.id
    }

    /// Header fields.
    pub fn header(&self) -> &OrderHeader {
        &self.header
    }

    /// Staff member who entered the order.
    pub fn recorded_by(&self) -> Option<UserId> {
        self.recorded_by
    }
}

/// Unvalidated order line fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderLineDraft {
    pub order_id: String,
    pub product_id: String,
    pub quantity: i32,
    pub unit_price: Option<f64>,
}

/// Validated order line: positive quantity, non-negative unit price.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLineDetails {
    order_id: OrderId,
    product_id: ProductId,
    quantity: i32,
    unit_price: Option<f64>,
}

impl TryFrom<OrderLineDraft> for OrderLineDetails {
    type Error = FieldError;

    fn try_from(draft: OrderLineDraft) -> Result<Self, Self::Error> {
        Ok(Self {
            order_id: OrderId::new(&draft.order_id)
                .map_err(|err| FieldError::from_key("orderId", &err))?,
            product_id: ProductId::new(&draft.product_id)
                .map_err(|err| FieldError::from_key("productId", &err))?,
            quantity: positive_count("quantity", draft.quantity)?,
            unit_price: non_negative_amount("unitPrice", draft.unit_price)?,
        })
    }
}

impl OrderLineDetails {
    /// Owning order.
    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    /// Ordered product.
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// Units ordered.
    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    /// Price per unit at the time of sale.
    pub fn unit_price(&self) -> Option<f64> {
        self.unit_price
    }

    /// `quantity × unit_price`, absent when the price is unknown.
    ///
    /// # Examples
    /// ```
    /// use backoffice::domain::{OrderLineDetails, OrderLineDraft};
    ///
    /// let line = OrderLineDetails::try_from(OrderLineDraft {
    ///     order_id: "INV-1".to_owned(),
    ///     product_id: "SKU-1".to_owned(),
    ///     quantity: 3,
    ///     unit_price: Some(2.5),
    /// })
    /// .expect("valid line");
    /// assert_eq!(line.line_total(), Some(7.5));
    /// ```
    pub fn line_total(&self) -> Option<f64> {
        self.unit_price.map(|price| f64::from(self.quantity) * price)
    }
}

/// Stored order line.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    id: OrderLineId,
    details: OrderLineDetails,
}

impl OrderLine {
    /// Assemble a line from stored values.
    pub fn new(id: OrderLineId, details: OrderLineDetails) -> Self {
        Self { id, details }
    }

    /// Line key.
    pub fn id(&self) -> OrderLineId {
        self.id
    }

    /// Line fields.
    pub fn details(&self) -> &OrderLineDetails {
        &self.details
    }
}
