//! API endpoint handlers. Each module is a thin adapter over `QueueService`.

pub mod allocation;
pub mod health;
pub mod hospitals;
pub mod predictions;
pub mod queue;
pub mod realtime;
pub mod triage;
