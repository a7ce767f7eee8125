//! MCP (Model Context Protocol) server implementation
//!
//! Exposes the market tools over JSON-RPC, either on an HTTP endpoint or
//! over stdio.

mod http;
mod protocol;
mod server;
pub mod tools;
mod transport;

pub use http::*;
pub use protocol::*;
pub use server::*;
pub use transport::*;
