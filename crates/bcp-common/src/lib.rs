//! BCP Common Library
//!
//! Shared infrastructure for the BCP workspace members.
//!
//! Currently this crate provides the logging subsystem: every binary in the
//! workspace initializes `tracing` through [`logging::init_logging`] so that
//! output format, level, and destination are configured in one place and
//! driven by the same environment variables everywhere.

pub mod logging;
