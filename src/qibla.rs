// src/qibla.rs

use serde::Serialize;

use crate::util::{round, KM_TO_MILES};

/* ---------------- CONSTANTES ---------------- */

// Average radius of the Earth in kilometers (spherical model).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// The Kaaba, Mecca. Every Qibla calculation targets this point.
pub const KAABA: GeoPoint = GeoPoint {
    latitude: 21.4225,
    longitude: 39.8262,
};

// Width of one compass sector in degrees (360 / 16).
const COMPASS_SECTOR_DEG: f64 = 22.5;

// Compass points, clockwise from north.
const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE",
    "E", "ESE", "SE", "SSE",
    "S", "SSW", "SW", "WSW",
    "W", "WNW", "NW", "NNW",
];

// Decimal places kept in presented values.
const PRESENTATION_DECIMALS: u32 = 2;

/* ---------------- DOMAIN TYPES ---------------- */

// Indicates whether a coordinate is a latitude or a longitude.
// Used to apply correct bounds and valid directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateKind {
    Latitude,
    Longitude,
}

impl CoordinateKind {
    // Inclusive geographic bound (the range is symmetric around zero).
    pub fn limit(self) -> f64 {
        match self {
            CoordinateKind::Latitude => 90.0,
            CoordinateKind::Longitude => 180.0,
        }
    }
}

impl std::fmt::Display for CoordinateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CoordinateKind::Latitude => "latitude",
            CoordinateKind::Longitude => "longitude",
        };
        write!(f, "{s}")
    }
}

// A position on the Earth in decimal degrees.
// Only values returned by `validate_coordinates` (or the KAABA constant)
// are meant to reach the calculations below.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/* ---------------- VALIDATION ---------------- */

// Reasons a coordinate pair is rejected before any calculation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoordError {
    #[error("{kind} must be a valid number")]
    NotANumber { kind: CoordinateKind },
    #[error("{kind} must be between -{limit} and {limit} degrees (got {value})", limit = .kind.limit())]
    OutOfRange { kind: CoordinateKind, value: f64 },
}

impl CoordError {
    // Stable, machine-readable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            CoordError::NotANumber { .. } => "NOT_A_NUMBER",
            CoordError::OutOfRange { .. } => "OUT_OF_RANGE",
        }
    }
}

// Parses a raw decimal-degree string.
// The whole (trimmed) string must be a number; "12abc" is rejected.
pub fn parse_degrees(raw: &str, kind: CoordinateKind) -> Result<f64, CoordError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| CoordError::NotANumber { kind })
}

fn check_finite(value: f64, kind: CoordinateKind) -> Result<(), CoordError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CoordError::NotANumber { kind })
    }
}

fn check_range(value: f64, kind: CoordinateKind) -> Result<(), CoordError> {
    if value.abs() <= kind.limit() {
        Ok(())
    } else {
        Err(CoordError::OutOfRange { kind, value })
    }
}

// Validates a latitude / longitude pair.
// Non-finite values are reported before range violations.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<GeoPoint, CoordError> {
    check_finite(latitude, CoordinateKind::Latitude)?;
    check_finite(longitude, CoordinateKind::Longitude)?;
    check_range(latitude, CoordinateKind::Latitude)?;
    check_range(longitude, CoordinateKind::Longitude)?;

    Ok(GeoPoint { latitude, longitude })
}

/* ---------------- BEARING / DISTANCE ---------------- */

// Initial great-circle bearing (forward azimuth) from `origin` to `destination`.
// Clockwise from true north, normalized into [0, 360).
// Identical points have no defined direction; they yield 0.
pub fn compute_bearing(origin: GeoPoint, destination: GeoPoint) -> f64 {
    if origin == destination {
        return 0.0;
    }

    let phi1 = origin.latitude.to_radians();
    let phi2 = destination.latitude.to_radians();
    let dlon = (destination.longitude - origin.longitude).to_radians();

    let y = dlon.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlon.cos();

    let theta = y.atan2(x).to_degrees();

    // (-180, 180] -> [0, 360)
    (theta + 360.0) % 360.0
}

// Great-circle distance in kilometers (Haversine).
pub fn compute_distance(origin: GeoPoint, destination: GeoPoint) -> f64 {
    let phi1 = origin.latitude.to_radians();
    let phi2 = destination.latitude.to_radians();
    let dlat = (destination.latitude - origin.latitude).to_radians();
    let dlon = (destination.longitude - origin.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (dlon / 2.0).sin().powi(2);
    // Near-antipodal inputs can push `a` a hair above 1.
    let a = a.clamp(0.0, 1.0);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

// Nearest of the 16 compass points.
// Halfway bearings round away from zero: 11.25 is NNE, not N.
pub fn bearing_to_compass(bearing: f64) -> &'static str {
    let sector = (bearing / COMPASS_SECTOR_DEG).round().rem_euclid(16.0);
    COMPASS_POINTS[sector as usize % COMPASS_POINTS.len()]
}

/* ---------------- QIBLA ---------------- */

// Full Qibla answer for one origin.
// Raw values keep double precision; the others are rounded for display.
#[derive(Debug, Clone, Serialize)]
pub struct QiblaResult {
    pub qibla_direction: f64,
    pub compass_bearing: &'static str,
    pub distance_km: f64,
    pub distance_miles: f64,
    pub bearing_degrees_raw: f64,
    pub distance_km_raw: f64,
    pub location: GeoPoint,
    pub kaaba_coordinates: GeoPoint,
}

// Computes the Qibla from an already validated origin.
pub fn calculate_qibla(origin: GeoPoint) -> QiblaResult {
    let bearing = compute_bearing(origin, KAABA);
    let distance = compute_distance(origin, KAABA);

    QiblaResult {
        qibla_direction: round(bearing, PRESENTATION_DECIMALS),
        compass_bearing: bearing_to_compass(bearing),
        distance_km: round(distance, PRESENTATION_DECIMALS),
        distance_miles: round(distance * KM_TO_MILES, PRESENTATION_DECIMALS),
        bearing_degrees_raw: bearing,
        distance_km_raw: distance,
        location: origin,
        kaaba_coordinates: KAABA,
    }
}

/* ---------------- TEST ---------------- */

#[cfg(test)]
mod tests {
    use super::*;

    const NEW_YORK: GeoPoint = GeoPoint { latitude: 40.7128, longitude: -74.0060 };
    const LONDON: GeoPoint = GeoPoint { latitude: 51.5074, longitude: -0.1278 };

    fn sample_points() -> Vec<GeoPoint> {
        vec![
            NEW_YORK,
            LONDON,
            KAABA,
            GeoPoint { latitude: 90.0, longitude: 0.0 },
            GeoPoint { latitude: -90.0, longitude: 0.0 },
            GeoPoint { latitude: 0.0, longitude: 180.0 },
            GeoPoint { latitude: 0.0, longitude: -180.0 },
            GeoPoint { latitude: -21.4225, longitude: -140.1738 }, // antipode of the Kaaba
            GeoPoint { latitude: -33.8688, longitude: 151.2093 },
            GeoPoint { latitude: 21.4225, longitude: 39.8263 },
        ]
    }

    /* --- bearing --------------------*/

    #[test]
    fn test_same_point_bearing_is_zero() {
        for p in sample_points() {
            let b = compute_bearing(p, p);
            assert_eq!(b, 0.0);
            assert!(b.is_sign_positive());
        }
    }

    #[test]
    fn test_atan2_origin_is_zero() {
        // The same-point convention matches IEEE-754 atan2(+0, +0).
        assert_eq!(0.0_f64.atan2(0.0), 0.0);
    }

    #[test]
    fn test_bearing_in_range() {
        for p in sample_points() {
            for q in sample_points() {
                let b = compute_bearing(p, q);
                assert!(b.is_finite());
                assert!((0.0..360.0).contains(&b), "bearing {b} from {p:?} to {q:?}");
            }
        }
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = GeoPoint { latitude: 0.0, longitude: 0.0 };
        let north = GeoPoint { latitude: 10.0, longitude: 0.0 };
        let east = GeoPoint { latitude: 0.0, longitude: 10.0 };
        let south = GeoPoint { latitude: -10.0, longitude: 0.0 };
        let west = GeoPoint { latitude: 0.0, longitude: -10.0 };

        assert!((compute_bearing(origin, north) - 0.0).abs() < 1e-9);
        assert!((compute_bearing(origin, east) - 90.0).abs() < 1e-9);
        assert!((compute_bearing(origin, south) - 180.0).abs() < 1e-9);
        assert!((compute_bearing(origin, west) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_across_antimeridian() {
        let fiji = GeoPoint { latitude: 0.0, longitude: 179.0 };
        let samoa = GeoPoint { latitude: 0.0, longitude: -179.0 };
        assert!((compute_bearing(fiji, samoa) - 90.0).abs() < 1e-9);
        assert!((compute_bearing(samoa, fiji) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_from_north_pole_is_finite() {
        let pole = GeoPoint { latitude: 90.0, longitude: 0.0 };
        let b = compute_bearing(pole, KAABA);
        assert!(b.is_finite());
        assert!((0.0..360.0).contains(&b));
        // From the pole every direction is south; the azimuth follows the
        // destination's longitude: 180 - 39.8262.
        assert!((b - 140.1738).abs() < 1e-6);
    }

    /* --- distance --------------------*/

    #[test]
    fn test_same_point_distance_is_zero() {
        for p in sample_points() {
            assert_eq!(compute_distance(p, p), 0.0);
        }
    }

    #[test]
    fn test_distance_non_negative() {
        for p in sample_points() {
            for q in sample_points() {
                let d = compute_distance(p, q);
                assert!(d.is_finite());
                assert!(d >= 0.0);
            }
        }
    }

    #[test]
    fn test_distance_is_symmetric() {
        let d1 = compute_distance(NEW_YORK, LONDON);
        let d2 = compute_distance(LONDON, NEW_YORK);
        assert!((d1 - d2).abs() < 1e-9);
        assert!((d1 - 5570.0).abs() < 5.0);
    }

    #[test]
    fn test_distance_to_antipode_is_half_circumference() {
        let antipode = GeoPoint { latitude: -KAABA.latitude, longitude: KAABA.longitude - 180.0 };
        let d = compute_distance(KAABA, antipode);
        let half = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!((d - half).abs() < 0.01);
    }

    /* --- compass --------------------*/

    #[test]
    fn test_compass_cardinals() {
        assert_eq!(bearing_to_compass(0.0), "N");
        assert_eq!(bearing_to_compass(90.0), "E");
        assert_eq!(bearing_to_compass(180.0), "S");
        assert_eq!(bearing_to_compass(270.0), "W");
    }

    #[test]
    fn test_compass_wraps_to_north() {
        assert_eq!(bearing_to_compass(359.9), "N");
        assert_eq!(bearing_to_compass(360.0), "N");
        assert_eq!(bearing_to_compass(348.75), "N");
        assert_eq!(bearing_to_compass(348.74), "NNW");
    }

    #[test]
    fn test_compass_half_boundaries_round_up() {
        assert_eq!(bearing_to_compass(11.25), "NNE");
        assert_eq!(bearing_to_compass(11.24), "N");
        assert_eq!(bearing_to_compass(33.75), "NE");
        assert_eq!(bearing_to_compass(56.25), "ENE");
    }

    #[test]
    fn test_compass_every_sector() {
        for (i, label) in COMPASS_POINTS.iter().enumerate() {
            let center = i as f64 * COMPASS_SECTOR_DEG;
            assert_eq!(bearing_to_compass(center), *label);
            assert_eq!(bearing_to_compass(center + 5.0), *label);
        }
    }

    /* --- validation --------------------*/

    #[test]
    fn test_validate_accepts_bounds() {
        assert!(validate_coordinates(90.0, 180.0).is_ok());
        assert!(validate_coordinates(-90.0, -180.0).is_ok());
        assert!(validate_coordinates(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_validate_latitude_out_of_range() {
        let err = validate_coordinates(95.0, 0.0).unwrap_err();
        assert_eq!(err, CoordError::OutOfRange { kind: CoordinateKind::Latitude, value: 95.0 });
        assert_eq!(err.code(), "OUT_OF_RANGE");
        assert_eq!(err.to_string(), "latitude must be between -90 and 90 degrees (got 95)");
    }

    #[test]
    fn test_validate_longitude_out_of_range() {
        let err = validate_coordinates(0.0, -180.5).unwrap_err();
        assert_eq!(err, CoordError::OutOfRange { kind: CoordinateKind::Longitude, value: -180.5 });
        assert_eq!(err.to_string(), "longitude must be between -180 and 180 degrees (got -180.5)");
    }

    #[test]
    fn test_validate_non_finite() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(
                validate_coordinates(bad, 0.0),
                Err(CoordError::NotANumber { kind: CoordinateKind::Latitude })
            );
            assert_eq!(
                validate_coordinates(0.0, bad),
                Err(CoordError::NotANumber { kind: CoordinateKind::Longitude })
            );
        }
    }

    #[test]
    fn test_validate_not_a_number_wins_over_range() {
        let err = validate_coordinates(95.0, f64::NAN).unwrap_err();
        assert_eq!(err.code(), "NOT_A_NUMBER");
    }

    #[test]
    fn test_parse_degrees() {
        assert_eq!(parse_degrees(" 40.7128 ", CoordinateKind::Latitude), Ok(40.7128));
        assert_eq!(parse_degrees("-74.0060", CoordinateKind::Longitude), Ok(-74.006));
        assert_eq!(
            parse_degrees("abc", CoordinateKind::Latitude),
            Err(CoordError::NotANumber { kind: CoordinateKind::Latitude })
        );
        assert!(parse_degrees("12abc", CoordinateKind::Latitude).is_err());
        assert!(parse_degrees("", CoordinateKind::Longitude).is_err());
    }

    #[test]
    fn test_parsed_infinity_is_not_a_number() {
        let lat = parse_degrees("inf", CoordinateKind::Latitude).unwrap();
        let err = validate_coordinates(lat, 0.0).unwrap_err();
        assert_eq!(err.code(), "NOT_A_NUMBER");
    }

    /* --- qibla --------------------*/

    #[test]
    fn test_qibla_new_york() {
        let r = calculate_qibla(NEW_YORK);
        assert!((r.qibla_direction - 58.48).abs() < 0.05, "got {}", r.qibla_direction);
        assert_eq!(r.compass_bearing, "ENE");
        // Haversine with R = 6371 km.
        assert!((r.distance_km - 10306.31).abs() < 0.01, "got {}", r.distance_km);
        assert_eq!(r.location, NEW_YORK);
        assert_eq!(r.kaaba_coordinates, KAABA);
    }

    #[test]
    fn test_qibla_london() {
        let r = calculate_qibla(LONDON);
        assert!(r.qibla_direction > 0.0 && r.qibla_direction < 360.0);
        assert!(r.distance_km > 0.0);
    }

    #[test]
    fn test_qibla_at_kaaba() {
        let r = calculate_qibla(KAABA);
        assert_eq!(r.qibla_direction, 0.0);
        assert_eq!(r.bearing_degrees_raw, 0.0);
        assert_eq!(r.distance_km, 0.0);
        assert_eq!(r.distance_miles, 0.0);
        assert_eq!(r.compass_bearing, "N");
    }

    #[test]
    fn test_qibla_north_pole() {
        let origin = validate_coordinates(90.0, 0.0).unwrap();
        let r = calculate_qibla(origin);
        assert!(r.bearing_degrees_raw.is_finite());
        assert!((0.0..360.0).contains(&r.bearing_degrees_raw));
        assert!(r.distance_km_raw.is_finite());
        assert_eq!(r.compass_bearing, "SE");
    }

    #[test]
    fn test_qibla_rounding_only_at_presentation() {
        let r = calculate_qibla(NEW_YORK);
        assert_eq!(r.qibla_direction, round(r.bearing_degrees_raw, 2));
        assert_eq!(r.distance_km, round(r.distance_km_raw, 2));
        assert!(r.bearing_degrees_raw != r.qibla_direction);
    }

    #[test]
    fn test_invalid_latitude_never_reaches_calculation() {
        assert!(matches!(
            validate_coordinates(95.0, 0.0).map(calculate_qibla),
            Err(CoordError::OutOfRange { .. })
        ));
        assert!(matches!(
            parse_degrees("abc", CoordinateKind::Latitude),
            Err(CoordError::NotANumber { .. })
        ));
    }

    #[test]
    fn test_qibla_serializes_expected_fields() {
        let json = serde_json::to_value(calculate_qibla(NEW_YORK)).unwrap();
        assert_eq!(json["compass_bearing"], "ENE");
        assert_eq!(json["location"]["latitude"], 40.7128);
        assert_eq!(json["kaaba_coordinates"]["longitude"], 39.8262);
    }
}
