//! Backend library modules.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod live;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by tooling.
pub use doc::ApiDoc;
