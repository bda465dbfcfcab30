//! API Module
//!
//! Structure:
//! - commands.rs: Current stable API implementation
//! - engine_status.rs: Status snapshot types
//!
//! Usage:
//! - `api::commands::assess()` - Direct access
//! - `api::assess()` - Same, re-exported

pub mod commands;
pub mod engine_status;

// Re-export current version as default
pub use commands::*;
