//! Queue arithmetic: wait-time prediction, doctor allocation and
//! waiting-room statistics.

pub mod allocation;
pub mod queue_stats;
pub mod wait_time;

pub use allocation::{optimize_allocation, shift_capacity, Allocation};
pub use queue_stats::{patient_position, queue_status, QueueStatusSummary};
pub use wait_time::predict_wait_time;
