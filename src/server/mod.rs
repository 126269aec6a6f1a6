//! HTTP API Module
//!
//! Exposes the locator engine, structure analysis and scenario synthesis
//! over JSON endpoints. The AI fallback agent is optional.

pub mod api;
pub mod server;

pub use server::{ApiServer, ServerConfig};
