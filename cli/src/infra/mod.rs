//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution,
//! environment loading, config-file writing and logging setup.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod command_runner;
pub mod config_dir;
pub mod env;
pub mod logging;

pub use command_runner::TokioCommandRunner;
pub use config_dir::ConfigDir;
