//! Common test infrastructure for imgdigest-registry tests
//!
//! # Modules
//!
//! - `constants`: Repository names, tokens, digests
//! - `mock_server`: Wiremock registry and token endpoint helpers

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod constants;
pub mod mock_server;

pub use constants::*;
pub use mock_server::*;
