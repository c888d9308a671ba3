//! HTTP API module.
//!
//! This module provides the HTTP server and API types for tablepipe.

pub mod server;
pub mod types;

pub use server::{app, start_server};
pub use types::*;
