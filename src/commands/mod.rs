//! Command implementations

pub mod completions;
pub mod create;
pub mod version;
