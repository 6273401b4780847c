//! Command implementations

pub mod parse;
pub mod resolve;
pub mod version;
