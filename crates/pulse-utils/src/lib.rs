//! Shared utilities for pulse-rs
//!
//! This crate provides the logging setup shared by the pipeline crates and the
//! `pulse` binary.

pub mod logging;

pub use logging::{LogFormat, init_tracing, init_tracing_with};
