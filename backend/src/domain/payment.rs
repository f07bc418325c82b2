//! Payment methods and payment transactions.
//!
//! Card numbers and security codes are never stored; a method is described
//! by its type, provider and expiry only.

use chrono::NaiveDate;

use super::keys::{CustomerId, OrderId, PaymentMethodId, TransactionId};
use super::validation::{FieldError, non_negative_amount, optional_text};

const LABEL_MAX: usize = 50;

/// Unvalidated payment method fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentMethodDraft {
    pub customer_id: String,
    pub method_type: Option<String>,
    pub provider: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

/// Validated payment method fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentMethodDetails {
    customer_id: CustomerId,
    method_type: Option<String>,
    provider: Option<String>,
    expiry_date: Option<NaiveDate>,
}

impl TryFrom<PaymentMethodDraft> for PaymentMethodDetails {
    type Error = FieldError;

    fn try_from(draft: PaymentMethodDraft) -> Result<Self, Self::Error> {
        Ok(Self {
            customer_id: CustomerId::new(&draft.customer_id)
                .map_err(|err| FieldError::from_key("customerId", &err))?,
            method_type: optional_text("methodType", draft.method_type, Some(LABEL_MAX))?,
            provider: optional_text("provider", draft.provider, Some(LABEL_MAX))?,
            expiry_date: draft.expiry_date,
        })
    }
}

impl PaymentMethodDetails {
    /// Owning customer.
    pub fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    /// Kind of method, e.g. `card` or `mobile money`.
    pub fn method_type(&self) -> Option<&str> {
        self.method_type.as_deref()
    }

    /// Issuer or network.
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    /// Expiry date, if the method expires.
    pub fn expiry_date(&self) -> Option<NaiveDate> {
        self.expiry_date
    }
}

/// Stored payment method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentMethod {
    id: PaymentMethodId,
    details: PaymentMethodDetails,
}

impl PaymentMethod {
    /// Assemble a payment method from stored values.
    pub fn new(id: PaymentMethodId, details: PaymentMethodDetails) -> Self {
        Self { id, details }
    }

    /// Method key.
    pub fn id(&self) -> PaymentMethodId {
        self.id
    }

    /// Stored fields.
    pub fn details(&self) -> &PaymentMethodDetails {
        &self.details
    }
}

/// Unvalidated transaction fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionDraft {
    pub order_id: String,
    pub payment_method_id: i32,
    pub payment_status: Option<String>,
    pub payment_date: Option<NaiveDate>,
    pub amount: Option<f64>,
}

/// Validated transaction fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDetails {
    order_id: OrderId,
    payment_method_id: PaymentMethodId,
    payment_status: Option<String>,
    payment_date: Option<NaiveDate>,
    amount: Option<f64>,
}

impl TryFrom<TransactionDraft> for TransactionDetails {
    type Error = FieldError;

    fn try_from(draft: TransactionDraft) -> Result<Self, Self::Error> {
        Ok(Self {
            order_id: OrderId::new(&draft.order_id)
                .map_err(|err| FieldError::from_key("orderId", &err))?,
            payment_method_id: PaymentMethodId::new(draft.payment_method_id),
            payment_status: optional_text("paymentStatus", draft.payment_status, Some(LABEL_MAX))?,
            payment_date: draft.payment_date,
            amount: non_negative_amount("amount", draft.amount)?,
        })
    }
}

impl TransactionDetails {
    /// Order being paid.
    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    /// Method charged.
    pub fn payment_method_id(&self) -> PaymentMethodId {
        self.payment_method_id
    }

    /// Free-form status such as `completed` or `refunded`.
    pub fn payment_status(&self) -> Option<&str> {
        self.payment_status.as_deref()
    }

    /// Settlement date.
    pub fn payment_date(&self) -> Option<NaiveDate> {
        self.payment_date
    }

    /// Amount charged.
    pub fn amount(&self) -> Option<f64> {
        self.amount
    }
}

/// Stored payment transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    id: TransactionId,
    details: TransactionDetails,
}

impl Transaction {
    /// Assemble a transaction from stored values.
    pub fn new(id: TransactionId, details: TransactionDetails) -> Self {
        Self { id, details }
    }

    /// Transaction key.
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Stored fields.
    pub fn details(&self) -> &TransactionDetails {
        &self.details
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn payment_methods_need_a_customer() {
        let err = PaymentMethodDetails::try_from(PaymentMethodDraft::default())
            .expect_err("missing customer");
        assert_eq!(err.field(), "customerId");
    }

    #[rstest]
    fn transactions_reject_negative_amounts() {
        let err = TransactionDetails::try_from(TransactionDraft {
            order_id: "INV-1".to_owned(),
            payment_method_id: 4,
            amount: Some(-10.0),
            ..TransactionDraft::default()
        })
        .expect_err("negative amount");
        assert_eq!(err.field(), "amount");
    }

    #[rstest]
    fn transaction_status_is_trimmed() {
        let details = TransactionDetails::try_from(TransactionDraft {
            order_id: "INV-1".to_owned(),
            payment_method_id: 4,
            payment_status: Some(" completed ".to_owned()),
            ..TransactionDraft::default()
        })
        .expect("valid");
        assert_eq!(details.payment_status(), Some("completed"));
        assert_eq!(details.payment_method_id(), PaymentMethodId::new(4));
    }
}
