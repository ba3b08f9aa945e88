//! Harness library for Terraform and gcloud integration tests: a command
//! runner, fixed-delay retry, marker polling and LIFO resource teardown.
//!
//! Test suites link this crate directly; the `tfh` binary exposes retry and
//! polling from the shell.

#![cfg_attr(test, allow(clippy::expect_used))]

pub mod application;
pub mod cli;
pub mod commands;
pub mod domain;
pub mod infra;
pub mod output;
