//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Changesets use `treat_none_as_null` so an
//! absent optional field clears the column instead of leaving it untouched.

use chrono::NaiveDate;
use diesel::prelude::*;

use crate::domain::{
    CustomerDetails, InventoryDetails, OrderHeader, OrderLineDetails, PaymentMethodDetails,
    ProductDetails, TransactionDetails,
};

use super::schema::{
    customers, inventory, order_details, orders, payment_methods, products, transactions, users,
};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Public columns of a staff account.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i32,
    pub username: String,
}

/// Columns needed to verify a login.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CredentialsRow {
    pub id: i32,
    pub password_hash: String,
}

/// Insertable struct for creating staff accounts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = customers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CustomerRow {
    pub customer_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub last_purchase_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = customers)]
pub(crate) struct NewCustomerRow<'a> {
    pub customer_id: &'a str,
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub contact_number: Option<&'a str>,
    pub address: Option<&'a str>,
    pub country: Option<&'a str>,
}

/// Editable customer columns; `last_purchase_date` is deliberately absent.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = customers)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct CustomerUpdate<'a> {
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub contact_number: Option<&'a str>,
    pub address: Option<&'a str>,
    pub country: Option<&'a str>,
}

impl<'a> NewCustomerRow<'a> {
    pub fn new(customer_id: &'a str, details: &'a CustomerDetails) -> Self {
        Self {
            customer_id,
            name: details.name(),
            email: details.email(),
            contact_number: details.contact_number(),
            address: details.address(),
            country: details.country(),
        }
    }
}

impl<'a> From<&'a CustomerDetails> for CustomerUpdate<'a> {
    fn from(details: &'a CustomerDetails) -> Self {
        Self {
            name: details.name(),
            email: details.email(),
            contact_number: details.contact_number(),
            address: details.address(),
            country: details.country(),
        }
    }
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProductRow {
    pub product_id: String,
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub unit_price: Option<f64>,
    pub product_description: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = products)]
pub(crate) struct NewProductRow<'a> {
    pub product_id: &'a str,
    pub product_name: Option<&'a str>,
    pub category: Option<&'a str>,
    pub unit_price: Option<f64>,
    pub product_description: Option<&'a str>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = products)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ProductUpdate<'a> {
    pub product_name: Option<&'a str>,
    pub category: Option<&'a str>,
    pub unit_price: Option<f64>,
    pub product_description: Option<&'a str>,
}

impl<'a> NewProductRow<'a> {
    pub fn new(product_id: &'a str, details: &'a ProductDetails) -> Self {
        Self {
            product_id,
            product_name: details.name(),
            category: details.category(),
            unit_price: details.unit_price(),
            product_description: details.description(),
        }
    }
}

impl<'a> From<&'a ProductDetails> for ProductUpdate<'a> {
    fn from(details: &'a ProductDetails) -> Self {
        Self {
            product_name: details.name(),
            category: details.category(),
            unit_price: details.unit_price(),
            product_description: details.description(),
        }
    }
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = inventory)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct InventoryRow {
    pub id: i32,
    pub product_id: String,
    pub stock_quantity: Option<i32>,
    pub last_restocked: Option<NaiveDate>,
}

/// Insert and update values for an inventory record.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = inventory)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct InventoryValues<'a> {
    pub product_id: &'a str,
    pub stock_quantity: Option<i32>,
    pub last_restocked: Option<NaiveDate>,
}

impl<'a> From<&'a InventoryDetails> for InventoryValues<'a> {
    fn from(details: &'a InventoryDetails) -> Self {
        Self {
            product_id: details.product_id().as_str(),
            stock_quantity: details.stock_quantity(),
            last_restocked: details.last_restocked(),
        }
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderRow {
    pub order_id: String,
    pub customer_id: Option<String>,
    pub order_date: Option<NaiveDate>,
    pub total_amount: Option<f64>,
    pub shipping_address: Option<String>,
    pub user_id: Option<i32>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = orders)]
pub(crate) struct NewOrderRow<'a> {
    pub order_id: &'a str,
    pub customer_id: Option<&'a str>,
    pub order_date: Option<NaiveDate>,
    pub total_amount: Option<f64>,
    pub shipping_address: Option<&'a str>,
    pub user_id: Option<i32>,
}

/// Editable order columns; the recording user is fixed at creation.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = orders)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct OrderUpdate<'a> {
    pub customer_id: Option<&'a str>,
    pub order_date: Option<NaiveDate>,
    pub total_amount: Option<f64>,
    pub shipping_address: Option<&'a str>,
}

impl<'a> NewOrderRow<'a> {
    pub fn new(order_id: &'a str, header: &'a OrderHeader, user_id: i32) -> Self {
        Self {
            order_id,
            customer_id: header.customer_id().map(|id| id.as_str()),
            order_date: header.order_date(),
            total_amount: header.total_amount(),
            shipping_address: header.shipping_address(),
            user_id: Some(user_id),
        }
    }
}

impl<'a> From<&'a OrderHeader> for OrderUpdate<'a> {
    fn from(header: &'a OrderHeader) -> Self {
        Self {
            customer_id: header.customer_id().map(|id| id.as_str()),
            order_date: header.order_date(),
            total_amount: header.total_amount(),
            shipping_address: header.shipping_address(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = order_details)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderLineRow {
    pub order_detail_id: i32,
    pub order_id: String,
    pub product_id: String,
    pub quantity: i32,
    pub unit_price: Option<f64>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = order_details)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct OrderLineValues<'a> {
    pub order_id: &'a str,
    pub product_id: &'a str,
    pub quantity: i32,
    pub unit_price: Option<f64>,
}

impl<'a> From<&'a OrderLineDetails> for OrderLineValues<'a> {
    fn from(details: &'a OrderLineDetails) -> Self {
        Self {
            order_id: details.order_id().as_str(),
            product_id: details.product_id().as_str(),
            quantity: details.quantity(),
            unit_price: details.unit_price(),
        }
    }
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = payment_methods)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PaymentMethodRow {
    pub payment_method_id: i32,
    pub customer_id: String,
    pub method_type: Option<String>,
    pub provider: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = payment_methods)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct PaymentMethodValues<'a> {
    pub customer_id: &'a str,
    pub method_type: Option<&'a str>,
    pub provider: Option<&'a str>,
    pub expiry_date: Option<NaiveDate>,
}

impl<'a> From<&'a PaymentMethodDetails> for PaymentMethodValues<'a> {
    fn from(details: &'a PaymentMethodDetails) -> Self {
        Self {
            customer_id: details.customer_id().as_str(),
            method_type: details.method_type(),
            provider: details.provider(),
            expiry_date: details.expiry_date(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TransactionRow {
    pub transaction_id: i32,
    pub order_id: String,
    pub payment_method_id: i32,
    pub payment_status: Option<String>,
    pub payment_date: Option<NaiveDate>,
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = transactions)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct TransactionValues<'a> {
    pub order_id: &'a str,
    pub payment_method_id: i32,
    pub payment_status: Option<&'a str>,
    pub payment_date: Option<NaiveDate>,
    pub amount: Option<f64>,
}

impl<'a> From<&'a TransactionDetails> for TransactionValues<'a> {
    fn from(details: &'a TransactionDetails) -> Self {
        Self {
            order_id: details.order_id().as_str(),
            payment_method_id: details.payment_method_id().get(),
            payment_status: details.payment_status(),
            payment_date: details.payment_date(),
            amount: details.amount(),
        }
    }
}
