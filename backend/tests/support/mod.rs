//! Shared helper utilities for backend integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`, which
//! makes it awkward to share small helpers without copy/paste. Each suite
//! declares `mod support;` and builds a [`TestDatabase`] per test.
//!
//! The Diesel suites need a reachable PostgreSQL server. Point
//! `TEST_DATABASE_URL` at a role allowed to `CREATE DATABASE`; when the
//! variable is unset the suites print a `SKIP-TEST-DATABASE` marker and
//! return early so `cargo test` stays green on machines without a server.

#![allow(dead_code)]

use backoffice::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use postgres::{Client, NoTls};
use tokio::runtime::Runtime;
use url::Url;
use uuid::Uuid;

/// Admin connection URL used to provision throw-away databases.
pub const TEST_DATABASE_URL: &str = "TEST_DATABASE_URL";

/// Render a `postgres` error with enough detail to be useful in CI logs.
///
/// The `postgres::Error` `Display` implementation often collapses database
/// errors to a generic `db error`, which hides the message and SQLSTATE.
/// Prefer using `as_db_error()` when available so failures are actionable.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut summary = format!(
        "postgres error {:?}: {}",
        db_error.code(),
        db_error.message()
    );

    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }

    if let Some(hint) = db_error.hint() {
        summary.push_str("; hint: ");
        summary.push_str(hint);
    }

    summary
}

/// Freshly created, fully migrated database dropped again on `Drop`.
///
/// Tests stay synchronous and drive the async repositories through the
/// owned [`Runtime`]; the blocking `postgres` client used for provisioning
/// must never run inside a Tokio runtime.
pub struct TestDatabase {
    admin_url: String,
    name: String,
    pool: DbPool,
    runtime: Runtime,
}

impl TestDatabase {
    /// Provision a database from `TEST_DATABASE_URL`.
    ///
    /// Returns `None` (after printing a skip marker) when the variable is
    /// unset. Provisioning failures panic because a configured server that
    /// cannot be reached is a broken environment, not a skipped test.
    pub fn provision(test_name: &str) -> Option<Self> {
        let Ok(admin_url) = std::env::var(TEST_DATABASE_URL) else {
            eprintln!("SKIP-TEST-DATABASE: {test_name}: {TEST_DATABASE_URL} is not set");
            return None;
        };

        let name = format!("backoffice_test_{}", Uuid::new_v4().simple());
        let mut admin = Client::connect(&admin_url, NoTls)
            .unwrap_or_else(|err| panic!("connect admin: {}", format_postgres_error(&err)));
        admin
            .batch_execute(&format!("CREATE DATABASE \"{name}\""))
            .unwrap_or_else(|err| panic!("create database: {}", format_postgres_error(&err)));

        let database_url = database_url_for(&admin_url, &name);
        run_pending_migrations(&database_url).expect("migrations apply to a fresh database");

        let runtime = Runtime::new().expect("tokio runtime");
        let pool = runtime
            .block_on(DbPool::new(
                PoolConfig::new(database_url)
                    .with_max_size(4)
                    .with_min_idle(Some(1)),
            ))
            .expect("pool connects to the test database");

        Some(Self {
            admin_url,
            name,
            pool,
            runtime,
        })
    }

    /// Connection pool bound to this database.
    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    /// Drive a future to completion on the owned runtime.
    pub fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        // Pool connections keep the database busy; FORCE terminates them.
        match Client::connect(&self.admin_url, NoTls) {
            Ok(mut admin) => {
                let sql = format!("DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)", self.name);
                if let Err(err) = admin.batch_execute(&sql) {
                    eprintln!("drop {}: {}", self.name, format_postgres_error(&err));
                }
            }
            Err(err) => eprintln!("drop {}: {}", self.name, format_postgres_error(&err)),
        }
    }
}

fn database_url_for(admin_url: &str, name: &str) -> String {
    let mut url = Url::parse(admin_url).expect("TEST_DATABASE_URL is a valid URL");
    url.set_path(name);
    url.to_string()
}
