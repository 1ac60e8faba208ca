//! Tests for the in-memory store.

use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::ports::RoleAdministrationCommand;
use crate::domain::test_fixtures::{
    fixture_clock, fixture_timestamp, pending_registration, session_for, user,
};
use crate::domain::{
    AuditAction, AuthorizationDomain, ErrorCode, RegistrationKind, RoleAdministrationService,
    Role, SuperAdminFloor, VerificationStatus,
};

async fn seeded(users: &[User]) -> Arc<InMemoryPlacementStore> {
    let store = Arc::new(InMemoryPlacementStore::new());
    for user in users {
        UserDirectory::insert(store.as_ref(), user)
            .await
            .expect("seed user");
    }
    store
}

fn demotion_of(target: &User, actor: &User) -> RoleChange {
    RoleChange {
        target: target.id().clone(),
        expected_revision: target.revision(),
        new_role: Role::Alumni,
        require_verified: false,
        floor: Some(SuperAdminFloor::SINGLE),
        changed_at: fixture_timestamp(),
        actor_revision: actor.revision(),
        audit: NewAuditEntry {
            actor: actor.id().clone(),
            action: AuditAction::DemoteFromSuperAdmin,
            target: AuditTarget::User(target.id().clone()),
            details: "demoted".to_owned(),
            recorded_at: fixture_timestamp(),
        },
    }
}

#[tokio::test]
async fn duplicate_emails_are_rejected() {
    let first = user(Role::Alumni, VerificationStatus::Verified);
    let store = seeded(std::slice::from_ref(&first)).await;
    let twin = crate::domain::test_fixtures::user_with_email(
        UserId::random(),
        first.email().as_ref(),
        Role::Alumni,
        VerificationStatus::Verified,
    );

    let err = UserDirectory::insert(store.as_ref(), &twin)
        .await
        .expect_err("email is taken");

    assert!(matches!(err, UserDirectoryError::Duplicate { .. }));
}

#[tokio::test]
async fn stale_revisions_are_not_applied() {
    let actor = user(Role::SuperAdmin, VerificationStatus::Verified);
    let other = user(Role::SuperAdmin, VerificationStatus::Verified);
    let target = user(Role::SuperAdmin, VerificationStatus::Verified);
    let store = seeded(&[actor.clone(), other, target.clone()]).await;

    let mut change = demotion_of(&target, &actor);
    change.expected_revision += 1;
    let outcome = store.apply_role_change(change).await.expect("store call");

    assert_eq!(
        outcome,
        RoleChangeOutcome::Stale {
            current: Some(target)
        }
    );
    assert_eq!(store.audit_len().expect("lock"), 0);
}

#[tokio::test]
async fn changes_are_refused_when_the_actor_record_moved_on() {
    let actor = user(Role::SuperAdmin, VerificationStatus::Verified);
    let target = user(Role::SuperAdmin, VerificationStatus::Verified);
    let store = seeded(&[actor.clone(), target.clone()]).await;

    let mut change = demotion_of(&target, &actor);
    change.actor_revision += 1;
    let outcome = store.apply_role_change(change).await.expect("store call");

    assert_eq!(outcome, RoleChangeOutcome::ActorChanged);
    let stored = UserDirectory::find_by_id(store.as_ref(), target.id())
        .await
        .expect("lookup")
        .expect("target exists");
    assert_eq!(stored, target);
    assert_eq!(store.audit_len().expect("lock"), 0);
}

#[rstest]
#[case(Some(Role::Admin))]
#[case(None)]
#[tokio::test]
async fn changes_are_refused_when_the_actor_lost_privileges(#[case] actor_role: Option<Role>) {
    let target = user(Role::SuperAdmin, VerificationStatus::Verified);
    let other = user(Role::SuperAdmin, VerificationStatus::Verified);
    let actor = match actor_role {
        Some(role) => user(role, VerificationStatus::Verified),
        None => user(Role::SuperAdmin, VerificationStatus::Verified),
    };
    let mut seed = vec![target.clone(), other];
    if actor_role.is_some() {
        seed.push(actor.clone());
    }
    let store = seeded(&seed).await;

    let outcome = store
        .apply_role_change(demotion_of(&target, &actor))
        .await
        .expect("store call");

    assert_eq!(outcome, RoleChangeOutcome::ActorChanged);
    assert_eq!(store.audit_len().expect("lock"), 0);
}

#[tokio::test]
async fn floor_is_checked_against_other_super_admins() {
    let actor = user(Role::SuperAdmin, VerificationStatus::Verified);
    let unverified = user(Role::SuperAdmin, VerificationStatus::Unverified);
    let store = seeded(&[actor.clone(), unverified]).await;

    let outcome = store
        .apply_role_change(demotion_of(&actor, &actor))
        .await
        .expect("store call");

    assert_eq!(outcome, RoleChangeOutcome::FloorViolated { remaining: 0 });
}

#[tokio::test]
async fn applied_changes_bump_revision_and_append_audit() {
    let actor = user(Role::SuperAdmin, VerificationStatus::Verified);
    let target = user(Role::SuperAdmin, VerificationStatus::Verified);
    let store = seeded(&[actor.clone(), target.clone()]).await;

    let outcome = store
        .apply_role_change(demotion_of(&target, &actor))
        .await
        .expect("store call");

    let RoleChangeOutcome::Applied(updated) = outcome else {
        panic!("expected applied outcome, got {outcome:?}");
    };
    assert_eq!(updated.role(), Role::Alumni);
    assert_eq!(updated.revision(), target.revision() + 1);
    let entries = store.list(&AuditFilter::default()).await.expect("list");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].target, AuditTarget::User(target.id().clone()));
}

#[tokio::test]
async fn bulk_promotion_skips_ineligible_users() {
    let actor = user(Role::SuperAdmin, VerificationStatus::Verified);
    let eligible = user(Role::Alumni, VerificationStatus::Verified);
    let unverified = user(Role::Alumni, VerificationStatus::Unverified);
    let admin = user(Role::Admin, VerificationStatus::Verified);
    let store = seeded(&[actor.clone(), eligible.clone(), unverified.clone(), admin.clone()]).await;

    let promoted = store
        .bulk_promote(BulkPromotion {
            targets: vec![
                eligible.id().clone(),
                unverified.id().clone(),
                admin.id().clone(),
                UserId::random(),
            ],
            eligible_roles: vec![Role::Alumni, Role::Company],
            new_role: Role::Admin,
            actor: actor.id().clone(),
            action: AuditAction::PromoteToAdmin,
            details: "batch".to_owned(),
            changed_at: fixture_timestamp(),
        })
        .await
        .expect("store call");

    assert_eq!(promoted.len(), 1);
    assert_eq!(promoted[0].id(), eligible.id());
    assert_eq!(store.audit_len().expect("lock"), 1);
}

#[rstest]
#[case(RegistrationStatus::Approved)]
#[case(RegistrationStatus::Rejected)]
#[tokio::test]
async fn decided_registrations_cannot_be_decided_again(#[case] first: RegistrationStatus) {
    let reviewer = user(Role::Admin, VerificationStatus::Verified);
    let store = Arc::new(InMemoryPlacementStore::new());
    let pending = pending_registration(RegistrationKind::Company);
    RegistrationRepository::insert(store.as_ref(), &pending)
        .await
        .expect("seed registration");

    let decided = match first {
        RegistrationStatus::Approved => pending.approve(reviewer.id(), fixture_timestamp()),
        _ => pending.reject(
            reviewer.id(),
            crate::domain::RejectReason::new("duplicate application").expect("reason"),
            fixture_timestamp(),
        ),
    }
    .expect("pending registration");
    let audit = NewAuditEntry {
        actor: reviewer.id().clone(),
        action: AuditAction::ApproveRegistration,
        target: AuditTarget::Registration(pending.id()),
        details: "decided".to_owned(),
        recorded_at: fixture_timestamp(),
    };
    let decision = RegistrationDecision { decided, audit };

    let first_outcome = store.record_decision(decision.clone()).await.expect("store call");
    let second_outcome = store.record_decision(decision).await.expect("store call");

    assert!(matches!(first_outcome, DecisionOutcome::Applied(_)));
    assert!(matches!(
        second_outcome,
        DecisionOutcome::AlreadyDecided(current) if current.status() == first
    ));
    assert_eq!(store.audit_len().expect("lock"), 1);
}

#[tokio::test]
async fn audit_filters_select_by_target_and_list_newest_first() {
    let actor = user(Role::SuperAdmin, VerificationStatus::Verified);
    let first = user(Role::Alumni, VerificationStatus::Verified);
    let second = user(Role::Alumni, VerificationStatus::Verified);
    let store = seeded(&[actor.clone(), first.clone(), second.clone()]).await;
    for target in [&first, &second] {
        store
            .bulk_promote(BulkPromotion {
                targets: vec![target.id().clone()],
                eligible_roles: vec![Role::Alumni],
                new_role: Role::Admin,
                actor: actor.id().clone(),
                action: AuditAction::PromoteToAdmin,
                details: format!("promoted {}", target.id()),
                changed_at: fixture_timestamp(),
            })
            .await
            .expect("store call");
    }

    let all = store.list(&AuditFilter::default()).await.expect("list");
    let only_first = store
        .list(&AuditFilter {
            target: Some(AuditTarget::User(first.id().clone())),
            actor: None,
        })
        .await
        .expect("list");

    assert_eq!(all.len(), 2);
    assert_eq!(all[0].target, AuditTarget::User(second.id().clone()));
    assert_eq!(only_first.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_mutual_demotions_keep_one_super_admin() {
    let alice = user(Role::SuperAdmin, VerificationStatus::Verified);
    let bob = user(Role::SuperAdmin, VerificationStatus::Verified);
    let store = seeded(&[alice.clone(), bob.clone()]).await;
    let service = Arc::new(RoleAdministrationService::new(
        Arc::clone(&store),
        AuthorizationDomain::default(),
        fixture_clock(),
    ));

    let by_alice = {
        let service = Arc::clone(&service);
        let (caller, target) = (session_for(&alice), bob.id().clone());
        tokio::spawn(async move { service.demote_from_super_admin(&caller, &target).await })
    };
    let by_bob = {
        let service = Arc::clone(&service);
        let (caller, target) = (session_for(&bob), alice.id().clone());
        tokio::spawn(async move { service.demote_from_super_admin(&caller, &target).await })
    };
    let results = [
        by_alice.await.expect("task joins"),
        by_bob.await.expect("task joins"),
    ];

    let successes = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(successes, 1);
    // The loser either hits the floor or finds its own privileges revoked.
    let failure = results
        .iter()
        .find_map(|result| result.as_ref().err())
        .expect("one demotion fails");
    assert!(matches!(
        failure.code(),
        ErrorCode::InvariantViolation | ErrorCode::Unauthorized
    ));
    assert_eq!(
        store.count_qualifying_super_admins().await.expect("count"),
        1
    );
}
