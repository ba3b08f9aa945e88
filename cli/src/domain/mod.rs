//! Domain layer: pure types, policies and classification.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod command;
pub mod context;
pub mod error;
pub mod gcloud;
pub mod outcome;
pub mod policy;

pub use command::{Command, CommandError, CommandResult};
pub use context::{HarnessContext, HarnessEnv, generate_run_suffix};
pub use error::{ContextError, HarnessError, PolicyError};
pub use outcome::{BenignPatterns, Outcome};
pub use policy::{PollPolicy, PollState, RetryPolicy};
