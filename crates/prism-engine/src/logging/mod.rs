//! Logging setup.
//!
//! Everything in the engine logs through the `log` facade; this module only
//! installs the `env_logger` backend for hosts that want one.

mod init;

pub use init::{LoggingConfig, init_logging};
