//! Customer records.
//!
//! `last_purchase_date` is derived data: it always equals the latest
//! `order_date` among the customer's orders and is maintained by the order
//! repository inside the same transaction as each order write. Clients can
//! read it but never set it.

use chrono::NaiveDate;

use super::keys::CustomerId;
use super::validation::{FieldError, optional_text};

const NAME_MAX: usize = 255;
const EMAIL_MAX: usize = 255;
const CONTACT_MAX: usize = 50;
const COUNTRY_MAX: usize = 100;

/// Unvalidated customer fields as received from a client or a stored row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerDraft {
    pub name: Option<String>,
    pub email: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
}

/// Validated, client-editable customer fields.
///
/// ## Invariants
/// - Text fields are trimmed; blank values are stored as absent.
/// - `email`, when present, contains exactly one `@` with text on both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDetails {
    name: Option<String>,
    email: Option<String>,
    contact_number: Option<String>,
    address: Option<String>,
    country: Option<String>,
}

impl TryFrom<CustomerDraft> for CustomerDetails {
    type Error = FieldError;

    fn try_from(draft: CustomerDraft) -> Result<Self, Self::Error> {
        let email = optional_text("email", draft.email, Some(EMAIL_MAX))?;
        if let Some(address) = email.as_deref() {
            validate_email(address)?;
        }
        Ok(Self {
            name: optional_text("name", draft.name, Some(NAME_MAX))?,
            email,
            contact_number: optional_text("contactNumber", draft.contact_number, Some(CONTACT_MAX))?,
            address: optional_text("address", draft.address, None)?,
            country: optional_text("country", draft.country, Some(COUNTRY_MAX))?,
        })
    }
}

fn validate_email(address: &str) -> Result<(), FieldError> {
    let mut parts = address.split('@');
    let well_formed = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty()
    );
    if well_formed {
        Ok(())
    } else {
        Err(FieldError::new(
            "email",
            "invalid_email",
            "email must look like name@domain",
        ))
    }
}

impl CustomerDetails {
    /// Display name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Contact e-mail address.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Contact telephone number.
    pub fn contact_number(&self) -> Option<&str> {
        self.contact_number.as_deref()
    }

    /// Postal address.
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Country used by the sales-by-country breakdown.
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }
}

/// Stored customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    id: CustomerId,
    details: CustomerDetails,
    last_purchase_date: Option<NaiveDate>,
}

impl Customer {
    /// Assemble a customer from stored values.
    pub fn new(
        id: CustomerId,
        details: CustomerDetails,
        last_purchase_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id,
            details,
            last_purchase_date,
        }
    }

    /// Customer key.
    pub fn id(&self) -> &CustomerId {
        &self.id
    }

    /// Editable fields.
    pub fn details(&self) -> &CustomerDetails {
        &self.details
    }

    /// Latest order date across the customer's orders.
    pub fn last_purchase_date(&self) -> Option<NaiveDate> {
        self.last_purchase_date
    }
}
