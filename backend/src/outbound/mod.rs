//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel.
//! - **memory**: a mutex-guarded store for database-less runs and tests.
//!
//! Adapters translate between domain types and storage representations and
//! evaluate the conditional writes the ports describe. Policy stays in the
//! domain services.

pub mod memory;
pub mod persistence;
