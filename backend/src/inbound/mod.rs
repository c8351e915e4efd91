//! Inbound adapters (HTTP, WebSocket) that translate external requests into
//! domain service calls while keeping framework details at the edge.
//!
//! REST handlers live under [`http`]; the live-update socket lives under
//! [`ws`].

pub mod http;
pub mod ws;
