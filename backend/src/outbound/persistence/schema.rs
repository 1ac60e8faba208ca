//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate
//! with `diesel print-schema` after changing a migration.

diesel::table! {
    /// User accounts with their role, verification status and revision.
    users (id) {
        id -> Uuid,
        email -> Text,
        username -> Text,
        display_name -> Text,
        /// Lowercase role tag; parsed on read.
        role -> Text,
        /// Lowercase verification status; parsed on read.
        status -> Text,
        /// Optimistic concurrency token, bumped on every role change.
        revision -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Alumni and company registrations, sharing one decision schema.
    registrations (id) {
        id -> Uuid,
        kind -> Text,
        applicant_email -> Text,
        details -> Jsonb,
        evidence -> Array<Text>,
        status -> Text,
        submitted_at -> Timestamptz,
        approved_at -> Nullable<Timestamptz>,
        rejected_at -> Nullable<Timestamptz>,
        reject_reason -> Nullable<Text>,
        decided_by -> Nullable<Uuid>,
    }
}

diesel::table! {
    /// Append-only audit trail.
    audit_log (id) {
        id -> Uuid,
        actor_id -> Uuid,
        action -> Text,
        target_kind -> Text,
        target_id -> Uuid,
        details -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(audit_log -> users (actor_id));
diesel::joinable!(registrations -> users (decided_by));

diesel::allow_tables_to_appear_in_same_query!(audit_log, registrations, users);
