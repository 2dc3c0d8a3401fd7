//! Opsbook backend library modules.
//!
//! The crate follows a hexagonal layout: `domain` holds validated business
//! types, reporting computations, and repository ports; `inbound` adapts HTTP
//! requests onto the domain; `outbound` implements the ports against
//! PostgreSQL or in-memory stores.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use doc::ApiDoc;
pub use middleware::request_id::{RequestId, RequestTracking};
