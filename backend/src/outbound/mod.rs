//! Outbound adapters implementing the domain ports.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel.
//! - **memory**: in-process store used when no database is configured,
//!   and by the handler test suites.
//! - **mail**: reset password mail delivery.
//!
//! Adapters translate between domain types and infrastructure
//! representations; they contain no business logic.

pub mod mail;
pub mod memory;
pub mod persistence;
