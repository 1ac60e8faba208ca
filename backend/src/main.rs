//! Backend entry-point: loads settings, prepares storage and serves the
//! admin API.

mod server;

use std::io;

use actix_web::cookie::SameSite;
use ortho_config::OrthoConfig as _;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use placement_backend::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use server::{ServerConfig, ServerSettings, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load_from_iter(std::env::args_os())
        .map_err(|err| io::Error::other(format!("failed to load settings: {err}")))?;

    let bind_addr = settings.bind_addr()?;
    let mut config = ServerConfig::new(
        settings.session_key()?,
        settings.cookie_secure(),
        SameSite::Lax,
        bind_addr,
    )
    .with_bootstrap_email(settings.bootstrap_super_admin_email.clone());

    match settings.database_url.as_deref() {
        Some(url) => {
            run_migrations(url).await.map_err(io::Error::other)?;
            let pool = DbPool::new(
                PoolConfig::new(url).with_max_size(settings.database_max_connections()),
            )
            .await
            .map_err(io::Error::other)?;
            config = config.with_db_pool(pool);
        }
        None => warn!("no database configured; state lives in memory and is lost on exit"),
    }

    let server = create_server(config).await?;
    info!(%bind_addr, "serving admin API");
    server.await
}
