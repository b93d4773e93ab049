use super::Waypoint;

/// Fixed Earth radius used for every distance computation, in meters.
/// Wire-compatible with the deployed controller; not a WGS-84 value.
const EARTH_RADIUS_M: f64 = 6_372_795.0;

/// GPS fix snapshot. Replaced wholesale on every sensor update.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub num_satellites: i8,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    pub speed_knots: f64,
    pub speed_km: f64,
}

impl Position {
    /// Great-circle distance from this position to a waypoint, in meters,
    /// by the spherical law of cosines.
    pub fn distance_meters(&self, waypoint: &Waypoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let long1 = self.longitude.to_radians();
        let lat2 = waypoint.latitude.to_radians();
        let long2 = waypoint.longitude.to_radians();

        (lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * (long2 - long1).cos()).acos()
            * EARTH_RADIUS_M
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_between_known_points() {
        let pos = Position {
            latitude: 56.326773,
            longitude: 44.006053,
            ..Position::default()
        };
        let waypoint = Waypoint {
            latitude: 56.318266,
            longitude: 44.015766,
        };

        let distance = pos.distance_meters(&waypoint);
        assert!(
            (distance - 1120.0).abs() < 1.0,
            "expected ~1120 m, got {distance}"
        );
    }

    #[test]
    fn distance_to_same_point_is_zero() {
        let pos = Position {
            latitude: 56.326773,
            longitude: 44.006053,
            ..Position::default()
        };
        let waypoint = Waypoint {
            latitude: 56.326773,
            longitude: 44.006053,
        };

        assert_eq!(pos.distance_meters(&waypoint), 0.0);
    }
}
