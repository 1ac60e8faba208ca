//! Server settings loaded via OrthoConfig and the derived server config.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use placement_backend::outbound::persistence::DbPool;
use serde::Deserialize;
use tracing::warn;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
/// `Key::derive_from` needs at least this much master key material.
const MIN_SESSION_KEY_BYTES: usize = 32;

/// Process settings read from `PLACEMENT_*` environment variables, the
/// command line or a config file.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PLACEMENT")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without one the in-memory store is used.
    pub database_url: Option<String>,
    /// Pool size cap.
    pub database_max_connections: Option<u32>,
    /// File holding the session signing key.
    pub session_key_file: Option<PathBuf>,
    /// Allow a generated session key when the key file is unreadable.
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
    /// Mark the session cookie `Secure`. Defaults to true.
    pub cookie_secure: Option<bool>,
    /// Email for the first super-administrator, provisioned when none exists.
    pub bootstrap_super_admin_email: Option<String>,
}

impl ServerSettings {
    /// Parsed bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> io::Result<SocketAddr> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid bind address {raw}: {err}"),
            )
        })
    }

    pub fn database_max_connections(&self) -> u32 {
        self.database_max_connections
            .unwrap_or(DEFAULT_MAX_CONNECTIONS)
    }

    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or(true)
    }

    /// Read the session key, or generate a temporary one in debug builds or
    /// when ephemeral keys are allowed.
    pub fn session_key(&self) -> io::Result<Key> {
        let path = self.session_key_file();
        let failure = match std::fs::read(&path) {
            Ok(bytes) if bytes.len() >= MIN_SESSION_KEY_BYTES => {
                return Ok(Key::derive_from(&bytes));
            }
            Ok(bytes) => format!(
                "session key at {} is {} bytes; need at least {MIN_SESSION_KEY_BYTES}",
                path.display(),
                bytes.len()
            ),
            Err(err) => format!("failed to read session key at {}: {err}", path.display()),
        };
        if cfg!(debug_assertions) || self.session_allow_ephemeral {
            warn!(path = %path.display(), reason = %failure, "using temporary session key (dev only)");
            Ok(Key::generate())
        } else {
            Err(io::Error::other(failure))
        }
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) bootstrap_email: Option<String>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            bootstrap_email: None,
        }
    }

    /// Use PostgreSQL adapters instead of the in-memory store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Provision a super-administrator under `email` at startup when the
    /// directory has none.
    #[must_use]
    pub fn with_bootstrap_email(mut self, email: Option<String>) -> Self {
        self.bootstrap_email = email;
        self
    }
}
