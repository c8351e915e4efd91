//! Wire-level message definitions for the WebSocket adapter.
//!
//! Domain events are transformed into these payloads before being serialized
//! to JSON and sent to connected viewers. Coordinates are always
//! `[longitude, latitude]`.

use serde::{Deserialize, Serialize};

use crate::domain::{LocationChanged, NearestListing};

/// Inbound payloads provided by the viewer's browser runtime.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Device position from the platform geolocation capability. A viewer
    /// that cannot or will not share a position simply never sends this.
    #[serde(rename_all = "camelCase")]
    Position { latitude: f64, longitude: f64 },
}

/// Nearest-search hit sent back over the socket.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearestPayload {
    pub id: String,
    pub title: String,
    pub location: String,
    pub distance_km: f64,
    pub coordinates: [f64; 2],
}

impl From<NearestListing> for NearestPayload {
    fn from(value: NearestListing) -> Self {
        let coordinates = value
            .listing
            .geometry
            .as_point()
            .map(|point| point.lon_lat())
            .unwrap_or_default();
        Self {
            id: value.listing.id.to_string(),
            title: value.listing.title,
            location: value.listing.address_text,
            distance_km: value.distance_km,
            coordinates,
        }
    }
}

/// Outbound payloads pushed to the viewer.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// A listing's geometry changed; viewers update the matching marker in
    /// place and assume nothing about other listings.
    #[serde(rename_all = "camelCase")]
    LocationChanged {
        id: String,
        title: String,
        location: String,
        coordinates: [f64; 2],
    },
    /// Reply to a `position` message; `nearest` is null when no listing
    /// qualifies.
    #[serde(rename_all = "camelCase")]
    NearestResult { nearest: Option<NearestPayload> },
    /// Recoverable problem with the viewer's last message; the session
    /// stays open.
    #[serde(rename_all = "camelCase")]
    Error { message: String },
}

impl From<&LocationChanged> for ServerMessage {
    fn from(value: &LocationChanged) -> Self {
        Self::LocationChanged {
            id: value.listing_id.to_string(),
            title: value.title.clone(),
            location: value.address_text.clone(),
            coordinates: value.coordinates.lon_lat(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinate, Geometry, Listing};
    use serde_json::{Value, json};

    #[test]
    fn location_changed_serialises_the_published_contract() {
        let coordinate = Coordinate::new(2.3514, 48.8575).expect("valid coordinate");
        let listing = Listing::new(
            "Canal flat".into(),
            "Paris, France".into(),
            Geometry::Point(coordinate),
        );
        let event = LocationChanged::for_listing(&listing, coordinate);

        let value = serde_json::to_value(ServerMessage::from(&event)).expect("serializable");
        assert_eq!(value["type"], "locationChanged");
        assert_eq!(value["id"], listing.id.to_string());
        assert_eq!(value["title"], "Canal flat");
        assert_eq!(value["location"], "Paris, France");
        assert_eq!(value["coordinates"], json!([2.3514, 48.8575]));
    }

    #[test]
    fn position_message_parses_from_camel_case() {
        let raw = r#"{ "type": "position", "latitude": 48.85, "longitude": 2.35 }"#;
        let message: ClientMessage = serde_json::from_str(raw).expect("well-formed");
        let ClientMessage::Position {
            latitude,
            longitude,
        } = message;
        assert_eq!(latitude, 48.85);
        assert_eq!(longitude, 2.35);
    }

    #[test]
    fn empty_nearest_result_serialises_null() {
        let value =
            serde_json::to_value(ServerMessage::NearestResult { nearest: None }).expect("json");
        assert_eq!(value["type"], "nearestResult");
        assert_eq!(value["nearest"], Value::Null);
    }
}
