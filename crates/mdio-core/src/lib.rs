pub mod access_pattern;
pub mod backend;
pub mod backend_options;
pub mod config;
pub mod error;
pub mod groupcomm;
pub mod memory_ballast;
pub mod stats;
pub mod timer;

pub use backend::{Backend, BackendOptionSpec, BackendStatus};
pub use backend_options::{BackendOptions, OptionValue, extract_backend_options};
pub use config::Config;
pub use error::DriverError;
pub use groupcomm::GroupComm;
pub use stats::{OpCounter, PhaseStats};
pub use timer::{Clock, now};
