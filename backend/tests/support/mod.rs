//! Shared helpers for the placement BDD suites.
//!
//! Integration tests compile as separate crates, so the world builders both
//! suites need live here and each suite pulls in `mod support;`.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use placement_backend::domain::ports::UserDirectory;
use placement_backend::domain::{
    CallerSession, DisplayName, EmailAddress, Role, User, UserId, UserIdentity, Username,
    VerificationStatus,
};
use placement_backend::outbound::memory::InMemoryPlacementStore;
use tokio::runtime::Runtime;

/// Wrapper for the runtime so it can live in a `Slot`.
#[derive(Clone)]
pub struct RuntimeHandle(pub Arc<Runtime>);

impl RuntimeHandle {
    pub fn new() -> Self {
        Self(Arc::new(Runtime::new().expect("create runtime")))
    }
}

/// Store handle shared between steps.
pub type SharedStore = Arc<InMemoryPlacementStore>;

/// Insert a user named `name` with `role` and `status`.
///
/// The name doubles as username and email local part.
pub fn insert_user(
    runtime: &Runtime,
    store: &SharedStore,
    name: &str,
    role: Role,
    status: VerificationStatus,
) -> User {
    let identity = UserIdentity {
        id: UserId::random(),
        email: EmailAddress::new(format!("{name}@example.org")).expect("valid email"),
        username: Username::new(name).expect("valid username"),
        display_name: DisplayName::new(name).expect("valid display name"),
    };
    let at = Utc
        .with_ymd_and_hms(2026, 4, 14, 9, 0, 0)
        .single()
        .expect("valid timestamp");
    let user = User::new(identity, role, status, at);
    runtime
        .block_on(store.insert(&user))
        .expect("insert user");
    user
}

/// Reload `id` from the store.
pub fn reload_user(runtime: &Runtime, store: &SharedStore, id: &UserId) -> User {
    runtime
        .block_on(store.find_by_id(id))
        .expect("lookup succeeds")
        .expect("user exists")
}

/// Session for `user` carrying its current claims.
pub fn session_for(user: &User) -> CallerSession {
    CallerSession::new(user.id().clone())
        .with_claimed_role(user.role())
        .with_claimed_status(user.status())
}
