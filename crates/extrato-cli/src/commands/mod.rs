//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (importer construction, formatting)
//! - `parse` - Statement preview parsing
//! - `institutions` - Institution listing and identification

pub mod core;
pub mod institutions;
pub mod parse;

// Re-export command functions for main.rs
pub use core::*;
pub use institutions::*;
pub use parse::*;
