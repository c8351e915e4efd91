//! DTOs for decoding Nominatim search responses.
//!
//! The adapter decodes into these transport DTOs first, then maps into the
//! domain [`ResolvedLocation`] in one pass. Nominatim serialises coordinates
//! as decimal strings.

use serde::Deserialize;

use crate::domain::ResolvedLocation;

#[derive(Debug, Deserialize)]
pub(super) struct NominatimPlaceDto {
    pub(super) lat: String,
    pub(super) lon: String,
    pub(super) display_name: String,
}

impl NominatimPlaceDto {
    pub(super) fn into_resolved_location(self) -> Result<ResolvedLocation, String> {
        let longitude = parse_component(&self.lon, "lon")?;
        let latitude = parse_component(&self.lat, "lat")?;
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(format!("longitude {longitude} outside [-180, 180]"));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(format!("latitude {latitude} outside [-90, 90]"));
        }

        Ok(ResolvedLocation {
            longitude,
            latitude,
            display_name: self.display_name,
        })
    }
}

fn parse_component(raw: &str, field: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("{field} {raw:?} is not a number"))?;
    if !value.is_finite() {
        return Err(format!("{field} {raw:?} is not finite"));
    }
    Ok(value)
}
