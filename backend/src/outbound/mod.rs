//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **security**: Argon2id password hashing
//!
//! Adapters are thin translators between domain types and
//! infrastructure-specific representations.

pub mod persistence;
pub mod security;
