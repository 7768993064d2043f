//! API layers

pub mod http;
pub mod mcp;
