//! Live update fan-out shared between the mutation flow and the WebSocket
//! adapter.

mod registry;

pub use registry::{SubscriberId, SubscriberRegistry, UpdateStream};
