//! Geographic point value and its well-known-text form.
//!
//! # Invariants
//! - Internal order is always `(latitude, longitude)`.
//! - `POINT(...)` text is always `(longitude latitude)`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const POINT_PREFIX: &str = "POINT(";
const POINT_SUFFIX: &str = ")";

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Serializes as `POINT(lon lat)`.
    pub fn to_wkt_point(self) -> String {
        format!("POINT({} {})", self.longitude, self.latitude)
    }

    /// Parses `POINT(lon lat)` text, flipping into `(lat, lon)` order.
    pub fn from_wkt_point(value: &str) -> Result<Self, PointParseError> {
        let trimmed = value.trim();
        let inner = trimmed
            .strip_prefix(POINT_PREFIX)
            .and_then(|rest| rest.strip_suffix(POINT_SUFFIX))
            .ok_or_else(|| PointParseError(trimmed.to_string()))?;

        let mut parts = inner.split_whitespace();
        let (Some(lon), Some(lat), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(PointParseError(trimmed.to_string()));
        };

        let finite = |text: &str| text.parse::<f64>().ok().filter(|value| value.is_finite());
        match (finite(lat), finite(lon)) {
            (Some(latitude), Some(longitude)) => Ok(Self::new(latitude, longitude)),
            _ => Err(PointParseError(trimmed.to_string())),
        }
    }
}

impl Display for Coordinates {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// Text did not match the `POINT(lon lat)` shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointParseError(pub String);

impl Display for PointParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid point text `{}`", self.0)
    }
}

impl Error for PointParseError {}

#[cfg(test)]
mod tests {
    use super::Coordinates;

    #[test]
    fn wkt_point_is_longitude_first() {
        let coords = Coordinates::new(52.23, 21.01);
        assert_eq!(coords.to_wkt_point(), "POINT(21.01 52.23)");
    }

    #[test]
    fn parsing_flips_into_latitude_first() {
        let coords = Coordinates::from_wkt_point("POINT(21.01 52.23)").unwrap();
        assert_eq!(coords.latitude, 52.23);
        assert_eq!(coords.longitude, 21.01);
    }

    #[test]
    fn parsing_tolerates_surrounding_whitespace() {
        let coords = Coordinates::from_wkt_point("  POINT(-0.1276   51.5072) ").unwrap();
        assert_eq!(coords, Coordinates::new(51.5072, -0.1276));
    }

    #[test]
    fn parsing_rejects_malformed_text() {
        assert!(Coordinates::from_wkt_point("POINT(21.01)").is_err());
        assert!(Coordinates::from_wkt_point("POINT(21.01 52.23 7)").is_err());
        assert!(Coordinates::from_wkt_point("LINESTRING(0 0, 1 1)").is_err());
        assert!(Coordinates::from_wkt_point("POINT(east north)").is_err());
        assert!(Coordinates::from_wkt_point("POINT(NaN 52.23)").is_err());
        assert!(Coordinates::from_wkt_point("POINT(21.01 inf)").is_err());
    }
}
