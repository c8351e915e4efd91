//! Geographic primitives: validated coordinates and listing geometry.
//!
//! A coordinate is always `[longitude, latitude]` on the wire; every adapter
//! reading geometry relies on that order. Geometry is a tagged value: a
//! listing whose address never resolved carries `Unresolved`, never a magic
//! `(0, 0)` point.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A WGS84 point, constructor-validated to be finite and in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub longitude: f64,
    pub latitude: f64,
}

/// Validation errors returned when constructing [`Coordinate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinateError {
    /// One of the components is NaN or infinite.
    #[error("coordinates must be finite")]
    NotFinite,
    /// Longitude is outside `[-180, 180]`.
    #[error("longitude must be within [-180, 180]")]
    LongitudeOutOfRange,
    /// Latitude is outside `[-90, 90]`.
    #[error("latitude must be within [-90, 90]")]
    LatitudeOutOfRange,
}

impl Coordinate {
    /// Construct a coordinate, rejecting non-finite and out-of-range values.
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, CoordinateError> {
        if !longitude.is_finite() || !latitude.is_finite() {
            return Err(CoordinateError::NotFinite);
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange);
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    /// `[longitude, latitude]` pair for wire payloads.
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }

    /// True for the exact `(0, 0)` point the original store used as an
    /// "unresolved" sentinel. Legacy rows carrying it must never rank as a
    /// nearest listing.
    pub fn is_legacy_sentinel(&self) -> bool {
        self.longitude == 0.0 && self.latitude == 0.0
    }
}

/// A listing's resolved map position, or its explicit absence.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Geometry {
    /// The address has never been successfully resolved.
    #[default]
    Unresolved,
    /// The most recent successful resolution of the listing's address text.
    Point(Coordinate),
}

impl Geometry {
    /// Return the resolved point, if any.
    pub fn as_point(&self) -> Option<Coordinate> {
        match self {
            Self::Unresolved => None,
            Self::Point(coordinate) => Some(*coordinate),
        }
    }

    /// True when a resolution has been recorded.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Point(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(2.35, 48.85)]
    #[case(-180.0, -90.0)]
    #[case(180.0, 90.0)]
    #[case(0.0, 0.0)]
    fn accepts_in_range_coordinates(#[case] longitude: f64, #[case] latitude: f64) {
        let coordinate = Coordinate::new(longitude, latitude).expect("valid coordinate");
        assert_eq!(coordinate.lon_lat(), [longitude, latitude]);
    }

    #[rstest]
    #[case(f64::NAN, 0.0, CoordinateError::NotFinite)]
    #[case(0.0, f64::INFINITY, CoordinateError::NotFinite)]
    #[case(-180.1, 0.0, CoordinateError::LongitudeOutOfRange)]
    #[case(0.0, 90.5, CoordinateError::LatitudeOutOfRange)]
    fn rejects_invalid_coordinates(
        #[case] longitude: f64,
        #[case] latitude: f64,
        #[case] expected: CoordinateError,
    ) {
        let error = Coordinate::new(longitude, latitude).expect_err("must fail");
        assert_eq!(error, expected);
    }

    #[test]
    fn origin_is_flagged_as_legacy_sentinel() {
        let origin = Coordinate::new(0.0, 0.0).expect("valid coordinate");
        assert!(origin.is_legacy_sentinel());
        let paris = Coordinate::new(2.35, 48.85).expect("valid coordinate");
        assert!(!paris.is_legacy_sentinel());
    }

    #[test]
    fn geometry_defaults_to_unresolved() {
        assert_eq!(Geometry::default(), Geometry::Unresolved);
        assert!(Geometry::default().as_point().is_none());
    }
}
