//! Identifier newtypes for every stored entity.
//!
//! Customers, products and orders are keyed by caller-chosen strings; the
//! remaining tables use database-assigned serial keys.

use serde::{Deserialize, Serialize};

/// Longest accepted natural key, matching the `VARCHAR(512)` columns.
pub const NATURAL_KEY_MAX_LEN: usize = 512;

/// Reasons a natural key is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyValidationError {
    /// The key was blank once trimmed.
    #[error("{kind} id must not be empty")]
    Empty {
        /// Entity the key belongs to.
        kind: &'static str,
    },
    /// The key exceeds [`NATURAL_KEY_MAX_LEN`] characters.
    #[error("{kind} id must be at most 512 characters")]
    TooLong {
        /// Entity the key belongs to.
        kind: &'static str,
    },
}

fn normalise_key(raw: &str, kind: &'static str) -> Result<String, KeyValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(KeyValidationError::Empty { kind });
    }
    if trimmed.chars().count() > NATURAL_KEY_MAX_LEN {
        return Err(KeyValidationError::TooLong { kind });
    }
    Ok(trimmed.to_owned())
}

macro_rules! natural_key {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and wrap a raw key; surrounding whitespace is trimmed.
            pub fn new(raw: impl AsRef<str>) -> Result<Self, KeyValidationError> {
                normalise_key(raw.as_ref(), $kind).map(Self)
            }

            /// Borrow the key text.
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = KeyValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

macro_rules! surrogate_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Wrap a database-assigned key.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Raw key value.
            #[must_use]
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

natural_key!(
    /// Customer key, e.g. `C-00017`.
    CustomerId,
    "customer"
);
natural_key!(
    /// Product key (SKU).
    ProductId,
    "product"
);
natural_key!(
    /// Order key, e.g. an invoice number.
    OrderId,
    "order"
);

surrogate_key!(
    /// Inventory record key.
    InventoryId
);
surrogate_key!(
    /// Order line key.
    OrderLineId
);
surrogate_key!(
    /// Payment method key.
    PaymentMethodId
);
surrogate_key!(
    /// Payment transaction key.
    TransactionId
);
