//! Per-connection WebSocket handler.
//!
//! Keeps WebSocket framing and heartbeats at the edge while the domain
//! service answers nearest queries and the registry feeds location changes.
//! The public WebSocket contract pings every 5s and considers a connection
//! idle after 10s without client traffic. Tests shorten these intervals to
//! speed up feedback; adjust the constants below if SLAs change so clients
//! and intermediaries stay aligned.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::time;
use tracing::warn;

use super::messages::{ClientMessage, ServerMessage};
use super::state::WsState;
use crate::domain::{Coordinate, LocationChanged};

/// Time between heartbeats to the client (5s in production, shorter in tests).
#[cfg(not(test))]
pub(super) const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
pub(super) const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Max idle time before disconnecting the client (10s in production, shorter in tests).
#[cfg(not(test))]
pub(super) const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
pub(super) const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

pub(super) async fn handle_ws_session(state: WsState, session: Session, stream: MessageStream) {
    ViewerSession::new(state).run(session, stream).await;
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    UpdatesClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    InvalidPayload,
    Network(Closed),
}

enum CloseAction {
    None,
    Close(Option<CloseReason>),
}

/// One connected viewer: registry subscription plus the last position the
/// viewer shared, which drives nearest-result refreshes when geometry
/// changes. Created on connect, dropped on disconnect, never persisted.
struct ViewerSession {
    state: WsState,
    last_position: Option<Coordinate>,
}

impl ViewerSession {
    fn new(state: WsState) -> Self {
        Self {
            state,
            last_position: None,
        }
    }

    async fn run(&mut self, mut session: Session, mut stream: MessageStream) {
        let (subscriber_id, mut updates) = self.state.registry.subscribe();
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        let error = loop {
            let result = tokio::select! {
                _ = heartbeat.tick() => {
                    self.handle_heartbeat_tick(&mut session, &last_heartbeat).await
                }
                message = stream.recv() => {
                    self.handle_stream_message(&mut session, &mut last_heartbeat, message)
                        .await
                }
                event = updates.recv() => {
                    self.forward_update(&mut session, event).await
                }
            };

            if let Err(error) = result {
                break error;
            }
        };

        self.state.registry.unsubscribe(subscriber_id);
        drop(updates);

        self.log_shutdown_reason(&error);
        let close_action = self.close_action_for(&error);
        self.close_session_if_needed(session, close_action).await;
    }

    async fn handle_heartbeat_tick(
        &self,
        session: &mut Session,
        last_heartbeat: &Instant,
    ) -> Result<(), SessionError> {
        if Instant::now().duration_since(*last_heartbeat) > CLIENT_TIMEOUT {
            return Err(SessionError::HeartbeatTimeout);
        }

        session.ping(b"").await.map_err(SessionError::Network)
    }

    async fn forward_update(
        &self,
        session: &mut Session,
        event: Option<Arc<LocationChanged>>,
    ) -> Result<(), SessionError> {
        // The sender only drops when the registry itself is torn down.
        let Some(event) = event else {
            return Err(SessionError::UpdatesClosed);
        };
        self.send_json(session, &ServerMessage::from(event.as_ref()))
            .await
            .map_err(SessionError::Network)?;
        // The change may have altered which listing is nearest.
        self.refresh_nearest(session).await
    }

    /// Send the nearest result for the viewer's last shared position, if any.
    async fn refresh_nearest(&self, session: &mut Session) -> Result<(), SessionError> {
        let Some(origin) = self.last_position else {
            return Ok(());
        };
        let reply = match self.state.listings.find_nearest(origin).await {
            Ok(nearest) => ServerMessage::NearestResult {
                nearest: nearest.map(Into::into),
            },
            Err(error) => ServerMessage::Error {
                message: error.message().to_owned(),
            },
        };
        self.send_json(session, &reply)
            .await
            .map_err(SessionError::Network)
    }

    async fn handle_stream_message(
        &mut self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Option<Result<Message, ProtocolError>>,
    ) -> Result<(), SessionError> {
        let Some(message) = message else {
            return Err(SessionError::StreamClosed);
        };

        match message {
            Ok(message) => self.handle_message(session, last_heartbeat, message).await,
            Err(error) => Err(SessionError::Protocol(error)),
        }
    }

    async fn handle_message(
        &mut self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Message,
    ) -> Result<(), SessionError> {
        match message {
            Message::Ping(payload) => {
                *last_heartbeat = Instant::now();
                session
                    .pong(&payload)
                    .await
                    .map_err(SessionError::Network)?;
                Ok(())
            }
            Message::Text(text) => {
                *last_heartbeat = Instant::now();
                self.handle_text_message(session, text.as_ref()).await
            }
            Message::Pong(_) | Message::Binary(_) | Message::Continuation(_) | Message::Nop => {
                *last_heartbeat = Instant::now();
                Ok(())
            }
            Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
        }
    }

    async fn handle_text_message(
        &mut self,
        session: &mut Session,
        text: &str,
    ) -> Result<(), SessionError> {
        let message = match serde_json::from_str::<ClientMessage>(text) {
            Ok(message) => message,
            Err(error) => {
                warn!(error = %error, "Rejected malformed WebSocket payload");
                return Err(SessionError::InvalidPayload);
            }
        };

        match message {
            ClientMessage::Position {
                latitude,
                longitude,
            } => {
                self.handle_position(session, longitude, latitude).await
            }
        }
    }

    async fn handle_position(
        &mut self,
        session: &mut Session,
        longitude: f64,
        latitude: f64,
    ) -> Result<(), SessionError> {
        let origin = match Coordinate::new(longitude, latitude) {
            Ok(origin) => origin,
            Err(error) => {
                // Well-formed but unusable; report and keep the session.
                let reply = ServerMessage::Error {
                    message: format!("invalid position: {error}"),
                };
                return self
                    .send_json(session, &reply)
                    .await
                    .map_err(SessionError::Network);
            }
        };
        self.last_position = Some(origin);
        self.refresh_nearest(session).await
    }

    async fn send_json(&self, session: &mut Session, payload: &ServerMessage) -> Result<(), Closed> {
        match serde_json::to_string(payload) {
            Ok(body) => session.text(body).await,
            Err(error) => {
                // In debug builds fail fast so schema drift is fixed; in release we log and keep the connection alive.
                if cfg!(debug_assertions) {
                    panic!("server messages must serialize: {error}");
                } else {
                    warn!(error = %error, "Failed to serialize WebSocket payload");
                }
                Ok(())
            }
        }
    }

    fn log_shutdown_reason(&self, error: &SessionError) {
        match error {
            SessionError::HeartbeatTimeout => {
                warn!("WebSocket heartbeat timeout; closing connection");
            }
            SessionError::Protocol(error) => {
                warn!(error = %error, "WebSocket protocol error");
            }
            SessionError::Network(error) => {
                warn!(error = %error, "WebSocket send failed; closing connection");
            }
            SessionError::InvalidPayload
            | SessionError::ClientClosed(_)
            | SessionError::StreamClosed
            | SessionError::UpdatesClosed => {}
        }
    }

    fn close_action_for(&self, error: &SessionError) -> CloseAction {
        match error {
            SessionError::HeartbeatTimeout => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Normal,
                description: Some("heartbeat timeout".to_owned()),
            })),
            SessionError::Protocol(_) => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Protocol,
                description: Some("protocol error".to_owned()),
            })),
            SessionError::InvalidPayload => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Policy,
                description: Some("invalid payload".to_owned()),
            })),
            SessionError::UpdatesClosed => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Away,
                description: Some("server shutting down".to_owned()),
            })),
            SessionError::ClientClosed(reason) => CloseAction::Close(reason.clone()),
            SessionError::StreamClosed | SessionError::Network(_) => CloseAction::None,
        }
    }

    async fn close_session_if_needed(&self, session: Session, close_action: CloseAction) {
        if let CloseAction::Close(reason) = close_action {
            if let Err(error) = session.close(reason).await {
                warn!(error = %error, "Failed to close WebSocket session");
            }
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
