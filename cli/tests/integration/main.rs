//! Integration tests for the tfh CLI
//!
//! These tests spawn real processes: the `tfh` binary, and `sh` through
//! the production command runner. They are slower and should be run
//! separately from unit tests.

mod cli_tests;
