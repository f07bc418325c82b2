//! Server settings loaded via OrthoConfig.
//!
//! Values come from `BACKOFFICE_*` environment variables, an optional
//! configuration file and command-line flags, in increasing precedence.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Settings controlling the listener and the database connection.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BACKOFFICE")]
pub struct ServerSettings {
    /// PostgreSQL connection URL, e.g. `postgres://backoffice@localhost/backoffice`.
    pub database_url: Option<String>,
    /// Interface to bind; defaults to all interfaces.
    pub address: Option<IpAddr>,
    /// TCP port to bind.
    pub port: Option<u16>,
    /// Upper bound on pooled database connections.
    pub max_connections: Option<u32>,
    /// Apply embedded migrations before serving requests.
    pub run_migrations: Option<bool>,
}

impl ServerSettings {
    /// Socket address the server binds to.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(
            self.address.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            self.port.unwrap_or(DEFAULT_PORT),
        )
    }

    /// Maximum pool size, falling back to the default.
    pub fn pool_max_size(&self) -> u32 {
        self.max_connections.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Whether to migrate on startup; on unless explicitly disabled.
    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for server settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 5] = [
        "BACKOFFICE_DATABASE_URL",
        "BACKOFFICE_ADDRESS",
        "BACKOFFICE_PORT",
        "BACKOFFICE_MAX_CONNECTIONS",
        "BACKOFFICE_RUN_MIGRATIONS",
    ];

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("backoffice")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert!(settings.database_url.is_none());
        assert!(settings.run_migrations());
        assert_eq!(settings.bind_addr(), SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)));
        assert_eq!(settings.pool_max_size(), DEFAULT_POOL_MAX_SIZE);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            (
                "BACKOFFICE_DATABASE_URL",
                Some("postgres://localhost/shop".to_owned()),
            ),
            ("BACKOFFICE_ADDRESS", Some("127.0.0.1".to_owned())),
            ("BACKOFFICE_PORT", Some("9090".to_owned())),
            ("BACKOFFICE_MAX_CONNECTIONS", Some("4".to_owned())),
            ("BACKOFFICE_RUN_MIGRATIONS", Some("false".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://localhost/shop")
        );
        assert!(!settings.run_migrations());
        assert_eq!(settings.bind_addr(), SocketAddr::from(([127, 0, 0, 1], 9090)));
        assert_eq!(settings.pool_max_size(), 4);
    }
}
