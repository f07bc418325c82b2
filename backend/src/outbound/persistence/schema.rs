//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Staff accounts.
    users (id) {
        id -> Int4,
        /// Lower-cased login name, unique.
        username -> Varchar,
        /// PHC-format Argon2id hash.
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    customers (customer_id) {
        customer_id -> Varchar,
        name -> Nullable<Varchar>,
        email -> Nullable<Varchar>,
        contact_number -> Nullable<Varchar>,
        address -> Nullable<Text>,
        country -> Nullable<Varchar>,
        /// Latest `orders.order_date` of this customer; maintained by the
        /// order repository.
        last_purchase_date -> Nullable<Date>,
    }
}

diesel::table! {
    products (product_id) {
        product_id -> Varchar,
        product_name -> Nullable<Varchar>,
        category -> Nullable<Varchar>,
        unit_price -> Nullable<Float8>,
        product_description -> Nullable<Text>,
    }
}

diesel::table! {
    inventory (id) {
        id -> Int4,
        product_id -> Varchar,
        stock_quantity -> Nullable<Int4>,
        last_restocked -> Nullable<Date>,
    }
}

diesel::table! {
    orders (order_id) {
        order_id -> Varchar,
        customer_id -> Nullable<Varchar>,
        order_date -> Nullable<Date>,
        total_amount -> Nullable<Float8>,
        shipping_address -> Nullable<Text>,
        /// Staff member who recorded the order.
        user_id -> Nullable<Int4>,
    }
}

diesel::table! {
    /// Order line items.
    order_details (order_detail_id) {
        order_detail_id -> Int4,
        order_id -> Varchar,
        product_id -> Varchar,
        quantity -> Int4,
        unit_price -> Nullable<Float8>,
    }
}

diesel::table! {
    payment_methods (payment_method_id) {
        payment_method_id -> Int4,
        customer_id -> Varchar,
        method_type -> Nullable<Varchar>,
        provider -> Nullable<Varchar>,
        expiry_date -> Nullable<Date>,
    }
}

diesel::table! {
    transactions (transaction_id) {
        transaction_id -> Int4,
        order_id -> Varchar,
        payment_method_id -> Int4,
        payment_status -> Nullable<Varchar>,
        payment_date -> Nullable<Date>,
        amount -> Nullable<Float8>,
    }
}

diesel::joinable!(inventory -> products (product_id));
diesel::joinable!(order_details -> orders (order_id));
diesel::joinable!(order_details -> products (product_id));
diesel::joinable!(orders -> customers (customer_id));
diesel::joinable!(orders -> users (user_id));
diesel::joinable!(payment_methods -> customers (customer_id));
diesel::joinable!(transactions -> orders (order_id));
diesel::joinable!(transactions -> payment_methods (payment_method_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    customers,
    products,
    inventory,
    orders,
    order_details,
    payment_methods,
    transactions,
);
