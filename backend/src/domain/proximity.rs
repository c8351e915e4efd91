//! Nearest-listing search by great-circle distance.
//!
//! A linear scan is deliberate at the expected scale (tens to low thousands
//! of candidates per query). Callers depend only on [`find_nearest`]'s
//! contract, so a spatial index can replace the scan later without touching
//! them.

use super::geo::Coordinate;
use super::listing::ListingId;

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// The winning candidate of a nearest search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestMatch {
    pub id: ListingId,
    pub distance_km: f64,
}

/// Great-circle (haversine) distance between two points, in kilometres.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Find the nearest valid candidate to `origin`.
///
/// Candidates at the exact legacy `(0, 0)` sentinel are filtered out before
/// the search; a listing that never resolved must not be treated as sitting
/// at the origin of the earth. Ties go to the first candidate in iteration
/// order. Returns `None` when nothing remains after filtering, which is the
/// normal "no nearby listings" outcome, not an error.
pub fn find_nearest(
    origin: Coordinate,
    candidates: impl IntoIterator<Item = (ListingId, Coordinate)>,
) -> Option<NearestMatch> {
    let mut nearest: Option<NearestMatch> = None;
    for (id, coordinate) in candidates {
        if coordinate.is_legacy_sentinel() {
            continue;
        }
        let distance_km = haversine_km(origin, coordinate);
        let closer = nearest.is_none_or(|best| distance_km < best.distance_km);
        if closer {
            nearest = Some(NearestMatch { id, distance_km });
        }
    }
    nearest
}
