//! Application layer: port trait definitions and use-case orchestration.
//!
//! This module depends only on `crate::domain`, never on `crate::infra`,
//! `crate::commands`, or `crate::output`.

pub mod ports;
pub mod services;

pub use ports::CommandRunner;
pub use services::lifecycle::{Lifecycle, TeardownReport, scoped};
pub use services::poll::{PollReport, poll_until};
pub use services::retry::{run_idempotent, run_with_retry};
