//! Driving-side port for the live-update fan-out.

use crate::domain::events::LocationChanged;

/// Publishes a geometry change to every currently connected viewer.
///
/// Implementations must be non-blocking (no I/O wait on the publish path)
/// and best-effort: delivery failure to one subscriber never surfaces to the
/// caller or aborts delivery to the rest.
pub trait UpdatePublisher: Send + Sync {
    fn publish(&self, event: LocationChanged);
}
