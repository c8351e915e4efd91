//! Shared WebSocket adapter state.
//!
//! Sessions receive the subscriber registry and the driving service
//! explicitly; nothing here is ambient global state.

use std::sync::Arc;

use crate::domain::ListingService;
use crate::live::SubscriberRegistry;

/// Dependency bundle for WebSocket handlers.
#[derive(Clone)]
pub struct WsState {
    pub registry: Arc<SubscriberRegistry>,
    pub listings: Arc<ListingService>,
}

impl WsState {
    /// Construct state from explicit dependencies.
    pub fn new(registry: Arc<SubscriberRegistry>, listings: Arc<ListingService>) -> Self {
        Self { registry, listings }
    }
}
