// pulse-common: domain types shared by the runner and the CLI

pub mod bounds;
pub mod log_entry;
pub mod payload;

pub use bounds::{Bounds, BoundsError};
pub use log_entry::LogEntry;
pub use payload::{Payload, PayloadError, PayloadMode, MAX_PAYLOAD_LEN};
