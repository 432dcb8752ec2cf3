//! Flotilla CLI library: exposes modules for integration testing.

pub mod cli;
pub mod commands;
pub mod output;
