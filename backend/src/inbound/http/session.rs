//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The cookie session carries the caller id plus the role and verification
//! status recorded at login. Only the id is trusted; the claims travel into
//! [`CallerSession`] so the authorization guard can log mismatches.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{CallerSession, Error, Role, User, UserId, VerificationStatus};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const ROLE_KEY: &str = "role";
pub(crate) const STATUS_KEY: &str = "status";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the signed-in user's id and current claims.
    pub fn persist_user(&self, user: &User) -> Result<(), Error> {
        let entries = [
            (USER_ID_KEY, user.id().to_string()),
            (ROLE_KEY, user.role().as_str().to_owned()),
            (STATUS_KEY, user.status().as_str().to_owned()),
        ];
        for (key, value) in entries {
            self.0
                .insert(key, value)
                .map_err(|error| Error::internal(format!("failed to persist session: {error}")))?;
        }
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<String>, Error> {
        self.0
            .get::<String>(key)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))
    }

    /// Fetch the current user id from the session, if present.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        match self.read(USER_ID_KEY)? {
            Some(raw) => match UserId::new(raw) {
                Ok(id) => Ok(Some(id)),
                Err(error) => {
                    warn!("invalid user id in session cookie: {error}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Require a signed-in caller or return `401 Unauthorized`.
    ///
    /// Unparseable claims are dropped rather than rejected; the guard
    /// decides from the stored record either way.
    pub fn require_caller(&self) -> Result<CallerSession, Error> {
        let user_id = self
            .user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))?;
        let mut caller = CallerSession::new(user_id);
        if let Some(role) = self.read(ROLE_KEY)?.and_then(|raw| raw.parse::<Role>().ok()) {
            caller = caller.with_claimed_role(role);
        }
        if let Some(status) = self
            .read(STATUS_KEY)?
            .and_then(|raw| raw.parse::<VerificationStatus>().ok())
        {
            caller = caller.with_claimed_status(status);
        }
        Ok(caller)
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
