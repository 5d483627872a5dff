//! Universal Transverse Mercator projection on WGS84

use serde::{Deserialize, Serialize};

use super::ellipsoid::{prime_vertical_radius, E2, EP2, SEMI_MAJOR_AXIS};
use super::{CoordError, Position};

/// Scale factor on the central meridian
pub const K0: f64 = 0.9996;
/// False easting in meters
pub const FALSE_EASTING: f64 = 500_000.0;
/// False northing applied in the southern hemisphere
pub const FALSE_NORTHING: f64 = 10_000_000.0;

pub(super) const BAND_LETTERS: &str = "CDEFGHJKLMNPQRSTUVWX";
const MIN_LATITUDE: f64 = -80.0;
const MAX_LATITUDE: f64 = 84.0;

/// A UTM grid position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Utm {
    pub zone: u8,
    /// Latitude band letter (`C`..=`X`)
    pub band: char,
    pub easting: f64,
    pub northing: f64,
}

impl Utm {
    pub fn is_northern(&self) -> bool {
        self.band >= 'N'
    }
}

/// Parse a grid zone designator such as `33V` or `4Q`
///
/// A designator without a band letter is taken to be in the northern
/// hemisphere (`N`).
pub(super) fn parse_grid_zone(designator: &str) -> Result<(u8, char), CoordError> {
    let trimmed = designator.trim();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let zone: u8 = trimmed[..digits_end]
        .parse()
        .map_err(|_| CoordError::InvalidGridZone(designator.to_string()))?;
    if !(1..=60).contains(&zone) {
        return Err(CoordError::InvalidGridZone(designator.to_string()));
    }
    let band = match trimmed[digits_end..].chars().next() {
        Some(c) => c.to_ascii_uppercase(),
        None => 'N',
    };
    if !BAND_LETTERS.contains(band) || trimmed[digits_end..].chars().count() > 1 {
        return Err(CoordError::InvalidGridZone(designator.to_string()));
    }
    Ok((zone, band))
}

/// Zone number for a position, honouring the Norway and Svalbard exceptions
pub fn zone_number(latitude: f64, longitude: f64) -> u8 {
    let mut zone = (((longitude + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u8;

    if (56.0..64.0).contains(&latitude) && (3.0..12.0).contains(&longitude) {
        zone = 32;
    }
    if (72.0..84.0).contains(&latitude) {
        zone = match longitude {
            l if (0.0..9.0).contains(&l) => 31,
            l if (9.0..21.0).contains(&l) => 33,
            l if (21.0..33.0).contains(&l) => 35,
            l if (33.0..42.0).contains(&l) => 37,
            _ => zone,
        };
    }
    zone
}

/// Latitude band letter
pub fn band_letter(latitude: f64) -> Option<char> {
    if !(MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude) {
        return None;
    }
    let index = (((latitude - MIN_LATITUDE) / 8.0).floor() as usize).min(BAND_LETTERS.len() - 1);
    BAND_LETTERS.chars().nth(index)
}

fn central_meridian(zone: u8) -> f64 {
    (f64::from(zone) - 1.0) * 6.0 - 180.0 + 3.0
}

fn meridional_arc(phi: f64) -> f64 {
    let e4 = E2 * E2;
    let e6 = e4 * E2;
    SEMI_MAJOR_AXIS
        * ((1.0 - E2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
            - (3.0 * E2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
}

/// Geodetic degrees to UTM
///
/// # Errors
///
/// Returns `CoordError::LatitudeOutOfRange` outside 80°S..84°N, where UTM
/// is not defined.
pub fn gdc_to_utm(latitude: f64, longitude: f64) -> Result<Utm, CoordError> {
    let band = band_letter(latitude).ok_or(CoordError::LatitudeOutOfRange(latitude))?;
    let zone = zone_number(latitude, longitude);

    let phi = latitude.to_radians();
    let lambda0 = central_meridian(zone).to_radians();
    let n = prime_vertical_radius(phi);
    let t = phi.tan().powi(2);
    let c = EP2 * phi.cos().powi(2);
    let a = phi.cos() * (longitude.to_radians() - lambda0);
    let m = meridional_arc(phi);

    let easting = K0
        * n
        * (a + (1.0 - t + c) * a.powi(3) / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * EP2) * a.powi(5) / 120.0)
        + FALSE_EASTING;
    let mut northing = K0
        * (m + n
            * phi.tan()
            * (a * a / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * EP2) * a.powi(6) / 720.0));
    if latitude < 0.0 {
        northing += FALSE_NORTHING;
    }

    Ok(Utm {
        zone,
        band,
        easting,
        northing,
    })
}

/// UTM to geodetic degrees (no elevation)
///
/// # Errors
///
/// Returns `CoordError::InvalidGridZone` for a zone outside 1..=60.
pub fn utm_to_gdc(utm: &Utm) -> Result<Position, CoordError> {
    if !(1..=60).contains(&utm.zone) {
        return Err(CoordError::InvalidGridZone(utm.zone.to_string()));
    }
    let x = utm.easting - FALSE_EASTING;
    let y = if utm.is_northern() {
        utm.northing
    } else {
        utm.northing - FALSE_NORTHING
    };

    let e4 = E2 * E2;
    let e6 = e4 * E2;
    let mu = y / K0 / (SEMI_MAJOR_AXIS * (1.0 - E2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));
    let e1 = (1.0 - (1.0 - E2).sqrt()) / (1.0 + (1.0 - E2).sqrt());

    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let n1 = prime_vertical_radius(phi1);
    let t1 = phi1.tan().powi(2);
    let c1 = EP2 * phi1.cos().powi(2);
    let r1 = SEMI_MAJOR_AXIS * (1.0 - E2) / (1.0 - E2 * phi1.sin().powi(2)).powf(1.5);
    let d = x / (n1 * K0);

    let latitude = phi1
        - (n1 * phi1.tan() / r1)
            * (d * d / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * EP2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * EP2 - 3.0 * c1 * c1)
                    * d.powi(6)
                    / 720.0);
    let longitude = central_meridian(utm.zone).to_radians()
        + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * EP2 + 24.0 * t1 * t1)
                * d.powi(5)
                / 120.0)
            / phi1.cos();

    Ok(Position::new(
        longitude.to_degrees(),
        latitude.to_degrees(),
        None,
    ))
}
