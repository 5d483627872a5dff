//! WGS84 ellipsoid and geocentric (GCC) conversions

use serde::{Deserialize, Serialize};

use super::Position;

/// Semi-major axis in meters
pub const SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
/// Flattening
pub const FLATTENING: f64 = 1.0 / 298.257_223_563;
/// Semi-minor axis in meters
pub const SEMI_MINOR_AXIS: f64 = SEMI_MAJOR_AXIS * (1.0 - FLATTENING);
/// First eccentricity squared
pub const E2: f64 = FLATTENING * (2.0 - FLATTENING);
/// Second eccentricity squared
pub const EP2: f64 = E2 / (1.0 - E2);

const MAX_ITERATIONS: usize = 16;
const LATITUDE_EPSILON: f64 = 1e-13;

/// Earth-centered, earth-fixed Cartesian coordinates in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gcc {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Prime vertical radius of curvature at a latitude (radians)
pub(super) fn prime_vertical_radius(phi: f64) -> f64 {
    SEMI_MAJOR_AXIS / (1.0 - E2 * phi.sin().powi(2)).sqrt()
}

/// Geodetic degrees and ellipsoidal height to geocentric XYZ
pub fn gdc_to_gcc(latitude: f64, longitude: f64, height: f64) -> Gcc {
    let phi = latitude.to_radians();
    let lambda = longitude.to_radians();
    let n = prime_vertical_radius(phi);
    Gcc {
        x: (n + height) * phi.cos() * lambda.cos(),
        y: (n + height) * phi.cos() * lambda.sin(),
        z: (n * (1.0 - E2) + height) * phi.sin(),
    }
}

/// Geocentric XYZ to geodetic degrees
///
/// Iterates on latitude until it stabilises. The returned position always
/// carries the ellipsoidal height as its elevation.
pub fn gcc_to_gdc(gcc: &Gcc) -> Position {
    let p = gcc.x.hypot(gcc.y);
    let longitude = gcc.y.atan2(gcc.x).to_degrees();

    // On the polar axis latitude is fixed and longitude is arbitrary.
    if p < 1e-9 {
        let latitude = if gcc.z < 0.0 { -90.0 } else { 90.0 };
        return Position::new(0.0, latitude, Some(gcc.z.abs() - SEMI_MINOR_AXIS));
    }

    let mut phi = gcc.z.atan2(p * (1.0 - E2));
    for _ in 0..MAX_ITERATIONS {
        let n = prime_vertical_radius(phi);
        let height = p / phi.cos() - n;
        let next = gcc.z.atan2(p * (1.0 - E2 * n / (n + height)));
        let converged = (next - phi).abs() < LATITUDE_EPSILON;
        phi = next;
        if converged {
            break;
        }
    }

    let height =
        p * phi.cos() + gcc.z * phi.sin() - SEMI_MAJOR_AXIS * (1.0 - E2 * phi.sin().powi(2)).sqrt();
    Position::new(longitude, phi.to_degrees(), Some(height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equator_prime_meridian_is_on_x_axis() {
        let gcc = gdc_to_gcc(0.0, 0.0, 0.0);
        assert!((gcc.x - SEMI_MAJOR_AXIS).abs() < 1e-6);
        assert!(gcc.y.abs() < 1e-6);
        assert!(gcc.z.abs() < 1e-6);
    }

    #[test]
    fn test_known_point_to_gcc() {
        let gcc = gdc_to_gcc(58.54383, 15.038887, 141.03737);
        assert!((gcc.x - 3_222_337.2416).abs() < 1e-3);
        assert!((gcc.y - 865_767.1296).abs() < 1e-3);
        assert!((gcc.z - 5_417_712.6187).abs() < 1e-3);
    }

    #[test]
    fn test_gcc_to_gdc_recovers_height() {
        let gcc = gdc_to_gcc(-33.8688, 151.2093, 58.0);
        let back = gcc_to_gdc(&gcc);
        assert!((back.latitude - -33.8688).abs() < 1e-9);
        assert!((back.longitude - 151.2093).abs() < 1e-9);
        assert!((back.elevation.unwrap() - 58.0).abs() < 1e-6);
    }

    #[test]
    fn test_pole_special_case() {
        let back = gcc_to_gdc(&Gcc {
            x: 0.0,
            y: 0.0,
            z: SEMI_MINOR_AXIS + 10.0,
        });
        assert_eq!(back.latitude, 90.0);
        assert!((back.elevation.unwrap() - 10.0).abs() < 1e-6);
    }
}
