pub mod doctor;
pub mod enums;
pub mod filters;
pub mod hospital;
pub mod patient;
pub mod prediction;
pub mod queue_entry;
pub mod vital_sign;

pub use doctor::*;
pub use enums::*;
pub use filters::*;
pub use hospital::*;
pub use patient::*;
pub use prediction::*;
pub use queue_entry::*;
pub use vital_sign::*;
