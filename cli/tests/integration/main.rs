//! Integration tests for the flotilla CLI
//!
//! These tests spawn the actual binary and test end-to-end behavior. No
//! test reaches a real remote: every invocation fails during argument
//! parsing or connection construction, before any ssh process could spawn.

mod cli_tests;
