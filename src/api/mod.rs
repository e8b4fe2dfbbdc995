//! HTTP API for the queue service.
//!
//! JSON endpoints nested under `/api/`, plus two server-sent event streams
//! for live queue positions and escalation alerts.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_api_server, ApiServer, ApiSession};
pub use types::ApiContext;
