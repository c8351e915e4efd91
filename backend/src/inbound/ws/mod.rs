//! WebSocket inbound adapter bridging location changes to connected viewers.
//!
//! Responsibilities:
//! - upgrade `/ws` requests and spawn the per-connection session
//! - keep WebSocket-specific concerns at the edge of the system

use actix_web::web::{self, Payload};
use actix_web::{HttpRequest, HttpResponse, get};
use tracing::error;

mod session;

pub mod messages;
pub mod state;

/// Handle WebSocket upgrade for the `/ws` endpoint.
#[get("/ws")]
pub async fn ws_entry(
    state: web::Data<state::WsState>,
    req: HttpRequest,
    body: Payload,
) -> actix_web::Result<HttpResponse> {
    let (response, session, stream) = actix_ws::handle(&req, body).inspect_err(|error| {
        error!(error = %error, "WebSocket upgrade failed");
    })?;

    actix_web::rt::spawn(session::handle_ws_session(
        state.get_ref().clone(),
        session,
        stream,
    ));
    Ok(response)
}
