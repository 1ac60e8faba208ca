//! Builders for the HTTP state over either storage backend.

use std::io;
use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::info;

use placement_backend::domain::ports::{AuditLogRepository, RegistrationRepository, UserDirectory};
use placement_backend::domain::{
    AuditTrailService, AuthorizationDomain, BatchCoordinator, BootstrapOutcome,
    RegistrationReviewService, RoleAdministrationService, SuperAdminBootstrap,
};
use placement_backend::inbound::http::state::HttpState;
use placement_backend::outbound::memory::InMemoryPlacementStore;
use placement_backend::outbound::persistence::{
    DieselAuditLogRepository, DieselRegistrationRepository, DieselUserDirectory,
};

use super::ServerConfig;

/// Storage adapters shared by every service.
pub(crate) struct Adapters<D, R, A> {
    pub(crate) directory: Arc<D>,
    pub(crate) registrations: Arc<R>,
    pub(crate) audit_log: Arc<A>,
}

/// Wire the domain services over `adapters` into the handler state.
pub(crate) fn assemble_http_state<D, R, A>(
    adapters: Adapters<D, R, A>,
    domain: AuthorizationDomain,
    clock: Arc<dyn Clock>,
) -> HttpState
where
    D: UserDirectory + 'static,
    R: RegistrationRepository + 'static,
    A: AuditLogRepository + 'static,
{
    let Adapters {
        directory,
        registrations,
        audit_log,
    } = adapters;
    HttpState::new(
        Arc::new(RoleAdministrationService::new(
            directory.clone(),
            domain,
            clock.clone(),
        )),
        Arc::new(BatchCoordinator::new(directory.clone(), domain, clock.clone())),
        Arc::new(RegistrationReviewService::new(
            registrations,
            directory.clone(),
            clock,
        )),
        Arc::new(AuditTrailService::new(audit_log, directory)),
    )
}

async fn bootstrap_super_admin<D>(
    directory: Arc<D>,
    clock: Arc<dyn Clock>,
    email: Option<&str>,
) -> io::Result<()>
where
    D: UserDirectory,
{
    let Some(email) = email else {
        return Ok(());
    };
    let outcome = SuperAdminBootstrap::new(directory, clock)
        .ensure(email)
        .await
        .map_err(|err| io::Error::other(format!("super-administrator bootstrap failed: {err}")))?;
    match outcome {
        BootstrapOutcome::Created(_) => info!("super-administrator provisioned"),
        BootstrapOutcome::AlreadySatisfied => info!("super-administrator already present"),
        BootstrapOutcome::EmailTaken(user) => info!(
            user = %user.id(),
            "bootstrap email belongs to an existing account; promote it manually"
        ),
    }
    Ok(())
}

/// Build handler state from `config`, provisioning the first
/// super-administrator when configured.
///
/// Uses the Diesel adapters when a pool is attached, otherwise a fresh
/// in-memory store.
///
/// # Errors
///
/// Propagates bootstrap failures as [`io::Error`].
pub(crate) async fn build_http_state(config: &ServerConfig) -> io::Result<web::Data<HttpState>> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let domain = AuthorizationDomain::default();
    let email = config.bootstrap_email.as_deref();

    let state = match &config.db_pool {
        Some(pool) => {
            let directory = Arc::new(DieselUserDirectory::new(pool.clone()));
            bootstrap_super_admin(directory.clone(), clock.clone(), email).await?;
            assemble_http_state(
                Adapters {
                    directory,
                    registrations: Arc::new(DieselRegistrationRepository::new(pool.clone())),
                    audit_log: Arc::new(DieselAuditLogRepository::new(pool.clone())),
                },
                domain,
                clock,
            )
        }
        None => {
            let store = Arc::new(InMemoryPlacementStore::new());
            bootstrap_super_admin(store.clone(), clock.clone(), email).await?;
            assemble_http_state(
                Adapters {
                    directory: store.clone(),
                    registrations: store.clone(),
                    audit_log: store,
                },
                domain,
                clock,
            )
        }
    };
    Ok(web::Data::new(state))
}
