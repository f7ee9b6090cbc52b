//! Logger setup for binaries and tests.
//!
//! Library code only talks to the `log` facade; `env_logger` is wired up here
//! for whoever owns `main`.

mod init;

pub use init::{init_logging, LoggingConfig};
