//! # dbchat-cli
//!
//! Configuration loading and command handlers for the `dbchat` binary, kept in a
//! library so they can be tested without spawning the process.

pub mod commands;
pub mod config;
