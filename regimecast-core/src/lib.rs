//! regimecast-core: crypto price and market regime tools served over MCP

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod analysis;
pub mod app;
pub mod config;
pub mod error;
pub mod feeds;
pub mod market;
pub mod mcp;
pub mod providers;

pub use error::{Error, Result};
