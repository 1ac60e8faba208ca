//! Behaviour-driven tests for the registration review workflow.
//!
//! Decisions are final: once approved or rejected, a registration refuses
//! every further decision and keeps its stored state.

use std::sync::Arc;

use chrono::Utc;
use mockable::DefaultClock;
use placement_backend::domain::ports::{
    AuditLogRepository, RegistrationRepository, RegistrationReviewCommand,
};
use placement_backend::domain::{
    ApplicantDetails, AuditFilter, AuditTarget, EmailAddress, ErrorCode, EvidenceRef,
    Registration, RegistrationId, RegistrationKind, RegistrationReviewService,
    RegistrationStatus, Role, User, VerificationStatus,
};
use placement_backend::outbound::memory::InMemoryPlacementStore;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};

mod support;

use support::{RuntimeHandle, SharedStore, insert_user, session_for};

// -----------------------------------------------------------------------------
// Test World
// -----------------------------------------------------------------------------

#[derive(Default, ScenarioState)]
struct RegistrationReviewWorld {
    runtime: Slot<RuntimeHandle>,
    store: Slot<SharedStore>,
    reviewer: Slot<User>,
    registration: Slot<Registration>,
    last_result: Slot<Result<Registration, ErrorCode>>,
}

impl RegistrationReviewWorld {
    fn ensure_store(&self) -> (RuntimeHandle, SharedStore) {
        if self.store.get().is_none() {
            self.runtime.set(RuntimeHandle::new());
            self.store.set(Arc::new(InMemoryPlacementStore::new()));
        }
        (
            self.runtime.get().expect("runtime"),
            self.store.get().expect("store"),
        )
    }

    fn service(&self) -> RegistrationReviewService<InMemoryPlacementStore, InMemoryPlacementStore> {
        let (_, store) = self.ensure_store();
        RegistrationReviewService::new(store.clone(), store, Arc::new(DefaultClock))
    }

    fn submitted(&self) -> Registration {
        self.registration.get().expect("registration submitted")
    }

    fn stored(&self) -> Registration {
        let (runtime, store) = self.ensure_store();
        runtime
            .0
            .block_on(store.find_by_id(&self.submitted().id()))
            .expect("lookup succeeds")
            .expect("registration exists")
    }

    fn decide(&self, reason: Option<&str>) {
        let (runtime, _) = self.ensure_store();
        let session = session_for(&self.reviewer.get().expect("reviewer"));
        let registration = self.submitted();
        let service = self.service();
        let result = runtime.0.block_on(async {
            match reason {
                Some(reason) => {
                    service
                        .reject(&session, registration.kind(), registration.id(), reason)
                        .await
                }
                None => {
                    service
                        .approve(&session, registration.kind(), registration.id())
                        .await
                }
            }
        });
        self.last_result.set(
            result
                .map(|outcome| outcome.into_parts().1)
                .map_err(|err| err.code()),
        );
    }
}

#[fixture]
fn world() -> RegistrationReviewWorld {
    RegistrationReviewWorld::default()
}

fn applicant_details(kind: RegistrationKind) -> ApplicantDetails {
    match kind {
        RegistrationKind::Alumni => ApplicantDetails::Alumni {
            full_name: "Mei Tanaka".to_owned(),
            graduation_year: 2019,
            department: "Mechanical Engineering".to_owned(),
        },
        RegistrationKind::Company => ApplicantDetails::Company {
            company_name: "Northwind Logistics".to_owned(),
            tax_id: "NW-220931".to_owned(),
            contact_name: "Sam Okafor".to_owned(),
        },
    }
}

// -----------------------------------------------------------------------------
// Given Steps
// -----------------------------------------------------------------------------

#[given("a {status} admin reviewer")]
fn an_admin_reviewer(world: &RegistrationReviewWorld, status: String) {
    let (runtime, store) = world.ensure_store();
    let status: VerificationStatus = status.parse().expect("known status");
    let reviewer = insert_user(&runtime.0, &store, "reviewer", Role::Admin, status);
    world.reviewer.set(reviewer);
}

#[given("a pending {kind} registration")]
fn a_pending_registration(world: &RegistrationReviewWorld, kind: String) {
    let (runtime, store) = world.ensure_store();
    let kind: RegistrationKind = kind.parse().expect("known kind");
    let registration = Registration::submitted(
        RegistrationId::random(),
        EmailAddress::new(format!("{kind}-applicant@example.org")).expect("valid email"),
        applicant_details(kind),
        vec![EvidenceRef::new("evidence/proof.pdf").expect("valid evidence key")],
        Utc::now(),
    );
    runtime
        .0
        .block_on(store.insert(&registration))
        .expect("insert registration");
    world.registration.set(registration);
}

// -----------------------------------------------------------------------------
// When Steps
// -----------------------------------------------------------------------------

#[when("the reviewer rejects the registration because {reason}")]
fn the_reviewer_rejects(world: &RegistrationReviewWorld, reason: String) {
    world.decide(Some(&reason));
}

#[when("the reviewer approves the registration")]
fn the_reviewer_approves(world: &RegistrationReviewWorld) {
    world.decide(None);
}

// -----------------------------------------------------------------------------
// Then Steps
// -----------------------------------------------------------------------------

#[then("the registration is rejected with reason {reason}")]
fn rejected_with_reason(world: &RegistrationReviewWorld, reason: String) {
    let decided = world
        .last_result
        .get()
        .expect("review result")
        .expect("rejection succeeds");
    assert_eq!(decided.status(), RegistrationStatus::Rejected);

    let stored = world.stored();
    assert_eq!(stored.status(), RegistrationStatus::Rejected);
    assert_eq!(
        stored.reject_reason().map(AsRef::as_ref),
        Some(reason.as_str())
    );
}

#[then("the registration is approved")]
fn the_registration_is_approved(world: &RegistrationReviewWorld) {
    let decided = world
        .last_result
        .get()
        .expect("review result")
        .expect("approval succeeds");
    assert_eq!(decided.status(), RegistrationStatus::Approved);
    assert!(world.stored().approved_at().is_some());
}

#[then("the review fails with {code}")]
fn the_review_fails_with(world: &RegistrationReviewWorld, code: String) {
    match world.last_result.get().expect("review result") {
        Err(actual) => assert_eq!(actual.as_str(), code),
        Ok(registration) => panic!("expected {code}, got {}", registration.status()),
    }
}

#[then("the registration is still {status}")]
fn the_registration_is_still(world: &RegistrationReviewWorld, status: String) {
    let expected: RegistrationStatus = status.parse().expect("known status");
    assert_eq!(world.stored().status(), expected);
}

#[then("the audit trail holds {count} entries for the registration")]
fn audit_entries_for_registration(world: &RegistrationReviewWorld, count: usize) {
    let (runtime, store) = world.ensure_store();
    let filter = AuditFilter {
        target: Some(AuditTarget::Registration(world.submitted().id())),
        actor: None,
    };
    let entries = runtime
        .0
        .block_on(store.list(&filter))
        .expect("audit listing succeeds");
    assert_eq!(entries.len(), count);
}

// -----------------------------------------------------------------------------
// Scenario Bindings
// -----------------------------------------------------------------------------

#[scenario(
    path = "tests/features/registration_review.feature",
    name = "A rejected registration cannot be approved later"
)]
fn a_rejected_registration_cannot_be_approved_later(world: RegistrationReviewWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/registration_review.feature",
    name = "Approving a pending company registration"
)]
fn approving_a_pending_company_registration(world: RegistrationReviewWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/registration_review.feature",
    name = "Unverified reviewers are refused"
)]
fn unverified_reviewers_are_refused(world: RegistrationReviewWorld) {
    let _ = world;
}
