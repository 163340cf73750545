pub mod clock;
pub mod config;
pub mod duration;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::DaemonConfig;
pub use duration::{parse_ttl, DurationError};
pub use types::*;
