//! Command-line front end for `cdnfs-storage`.
//!
//! The binary in `main.rs` only parses arguments and dispatches; commands live
//! here so they can be driven against a mock zone in tests.

pub mod cli;
pub mod commands;
pub mod context;
pub mod telemetry;
