//! E-log submission collaborator.
//!
//! Implements the core's `LogSubmitter` trait by driving the external e-log
//! command-line client. This crate owns the client's argument conventions
//! and the bounded wait on the spawned process; the report content and the
//! decision to submit belong to `checklist-core`.

mod client;
mod config;

pub use client::ElogClient;
pub use config::ElogConfig;
