//! Sysdesc command-line driver
//!
//! Subcommand implementations, shared by the `sysdesc` binary and its tests.

pub mod commands;
