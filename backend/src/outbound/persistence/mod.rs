//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the driven ports backed by PostgreSQL via
//! `diesel-async` and `bb8` pooling.
//!
//! - **Thin adapters**: repositories translate between Diesel rows and
//!   domain types. Policy stays in the domain services.
//! - **Atomic units**: every mutation commits together with its audit row,
//!   and the super-administrator floor is checked under row locks in the
//!   same transaction.
//! - **Strongly typed errors**: database failures map to each port's
//!   connection, query or duplicate error.
//!
//! # Example
//!
//! ```ignore
//! use placement_backend::outbound::persistence::{DbPool, DieselUserDirectory, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/placement")).await?;
//! let directory = DieselUserDirectory::new(pool);
//! ```

mod diesel_audit_log_repository;
mod diesel_error_mapping;
mod diesel_registration_repository;
mod diesel_user_directory;
mod migrations;
mod models;
mod pool;
mod row_conversions;
mod schema;

pub use diesel_audit_log_repository::DieselAuditLogRepository;
pub use diesel_registration_repository::DieselRegistrationRepository;
pub use diesel_user_directory::DieselUserDirectory;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
