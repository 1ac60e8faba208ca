//! Shared builders for domain unit tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::{
    ApplicantDetails, CallerSession, DisplayName, EmailAddress, EvidenceRef, Registration,
    RegistrationId, RegistrationKind, Role, User, UserId, UserIdentity, Username,
    VerificationStatus,
};

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 14, 10, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

/// User with a unique handle derived from its id.
pub(crate) fn user(role: Role, status: VerificationStatus) -> User {
    let id = UserId::random();
    let handle = format!("u{}", &id.as_uuid().simple().to_string()[..12]);
    user_with_email(id, &format!("{handle}@example.org"), role, status)
}

pub(crate) fn user_with_email(
    id: UserId,
    email: &str,
    role: Role,
    status: VerificationStatus,
) -> User {
    let local = email.split('@').next().unwrap_or("user");
    let identity = UserIdentity {
        id,
        email: EmailAddress::new(email).expect("valid email"),
        username: Username::new(local).expect("valid username"),
        display_name: DisplayName::new(local).expect("valid display name"),
    };
    User::new(identity, role, status, fixture_timestamp())
}

pub(crate) fn session_for(user: &User) -> CallerSession {
    CallerSession::new(user.id().clone())
        .with_claimed_role(user.role())
        .with_claimed_status(user.status())
}

pub(crate) fn pending_registration(kind: RegistrationKind) -> Registration {
    let details = match kind {
        RegistrationKind::Alumni => ApplicantDetails::Alumni {
            full_name: "Mei Tanaka".to_owned(),
            graduation_year: 2019,
            department: "Computer Science".to_owned(),
        },
        RegistrationKind::Company => ApplicantDetails::Company {
            company_name: "Acme Robotics".to_owned(),
            tax_id: "TX-448812".to_owned(),
            contact_name: "Sam Okafor".to_owned(),
        },
    };
    Registration::submitted(
        RegistrationId::random(),
        EmailAddress::new("applicant@example.org").expect("valid email"),
        details,
        vec![EvidenceRef::new("evidence/diploma.pdf").expect("valid evidence key")],
        fixture_timestamp(),
    )
}
