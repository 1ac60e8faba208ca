//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{HttpResponse, Route, test, web};

use crate::domain::User;
use crate::domain::ports::{
    MockAuditTrailQuery, MockBatchPromotionCommand, MockRegistrationReviewCommand,
    MockRoleAdministrationCommand,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Path of the sign-in shortcut registered by [`sign_in_route`].
pub const TEST_SIGN_IN_PATH: &str = "/test/sign-in";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Route that writes `user` into the session, standing in for a login flow.
pub fn sign_in_route(user: User) -> Route {
    web::get().to(move |session: SessionContext| {
        let user = user.clone();
        async move {
            session.persist_user(&user)?;
            Ok::<_, crate::domain::Error>(HttpResponse::Ok().finish())
        }
    })
}

/// Hit [`TEST_SIGN_IN_PATH`] and return the issued session cookie.
pub async fn session_cookie(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
) -> Cookie<'static> {
    let res = test::call_service(app, test::TestRequest::get().uri(TEST_SIGN_IN_PATH).to_request())
        .await;
    assert!(res.status().is_success(), "sign-in shortcut failed");
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

/// Mocked driving ports. Unset expectations panic when called.
#[derive(Default)]
pub struct MockPorts {
    pub roles: MockRoleAdministrationCommand,
    pub batch: MockBatchPromotionCommand,
    pub registrations: MockRegistrationReviewCommand,
    pub audit: MockAuditTrailQuery,
}

impl MockPorts {
    /// Bundle the mocks into handler state.
    pub fn into_state(self) -> HttpState {
        HttpState::new(
            Arc::new(self.roles),
            Arc::new(self.batch),
            Arc::new(self.registrations),
            Arc::new(self.audit),
        )
    }
}
