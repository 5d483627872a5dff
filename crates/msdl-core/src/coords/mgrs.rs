//! Military Grid Reference System on top of UTM
//!
//! Uses the AA lettering scheme: column letters cycle through three sets
//! by zone, row letters repeat every 2,000 km and are offset by five
//! letters in even zones.

use super::utm::{self, Utm};
use super::{CoordError, Position};

const COLUMN_SETS: [&str; 3] = ["ABCDEFGH", "JKLMNPQR", "STUVWXYZ"];
const ROW_LETTERS: &str = "ABCDEFGHJKLMNPQRSTUV";
const SQUARE_SIZE: f64 = 100_000.0;
const ROW_CYCLE: f64 = 2_000_000.0;

/// Digits per axis in a full-precision (1 m) grid reference
pub const FULL_PRECISION: usize = 5;

/// Lowest northing reachable inside each latitude band
fn band_min_northing(band: char) -> Option<f64> {
    let meters = match band {
        'C' => 1_100_000.0,
        'D' => 2_000_000.0,
        'E' => 2_800_000.0,
        'F' => 3_700_000.0,
        'G' => 4_600_000.0,
        'H' => 5_500_000.0,
        'J' => 6_400_000.0,
        'K' => 7_300_000.0,
        'L' => 8_200_000.0,
        'M' => 9_100_000.0,
        'N' => 0.0,
        'P' => 800_000.0,
        'Q' => 1_700_000.0,
        'R' => 2_600_000.0,
        'S' => 3_500_000.0,
        'T' => 4_400_000.0,
        'U' => 5_300_000.0,
        'V' => 6_200_000.0,
        'W' => 7_000_000.0,
        'X' => 7_900_000.0,
        _ => return None,
    };
    Some(meters)
}

fn column_set(zone: u8) -> &'static str {
    COLUMN_SETS[usize::from(zone - 1) % 3]
}

fn row_offset(zone: u8) -> usize {
    if zone % 2 == 0 {
        5
    } else {
        0
    }
}

/// Parse an MGRS reference (`18SUJ2337106519`) into UTM
///
/// Easting and northing digits must have equal length; shorter references
/// address the south-west corner of their cell.
///
/// # Errors
///
/// Returns `CoordError::InvalidMgrs` when the reference is malformed.
pub fn mgrs_to_utm(reference: &str) -> Result<Utm, CoordError> {
    let invalid = || CoordError::InvalidMgrs(reference.to_string());
    let compact: String = reference
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();
    if !compact.is_ascii() {
        return Err(invalid());
    }

    let digits_end = compact
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (zone, band) = utm::parse_grid_zone(&compact[..=digits_end]).map_err(|_| invalid())?;

    let rest = &compact[digits_end + 1..];
    let mut letters = rest.chars();
    let column = letters.next().ok_or_else(invalid)?;
    let row = letters.next().ok_or_else(invalid)?;
    let numbers = letters.as_str();
    if numbers.len() % 2 != 0
        || numbers.len() > 2 * FULL_PRECISION
        || !numbers.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }

    let column_index = column_set(zone).find(column).ok_or_else(invalid)?;
    let row_position = ROW_LETTERS.find(row).ok_or_else(invalid)?;
    let row_index = (row_position + ROW_LETTERS.len() - row_offset(zone)) % ROW_LETTERS.len();

    let half = numbers.len() / 2;
    let scale = 10f64.powi((FULL_PRECISION - half) as i32);
    let parse_axis = |digits: &str| -> Result<f64, CoordError> {
        if digits.is_empty() {
            return Ok(0.0);
        }
        digits
            .parse::<u32>()
            .map(|value| f64::from(value) * scale)
            .map_err(|_| invalid())
    };
    let easting = (column_index as f64 + 1.0) * SQUARE_SIZE + parse_axis(&numbers[..half])?;
    let mut northing = row_index as f64 * SQUARE_SIZE + parse_axis(&numbers[half..])?;

    let min_northing = band_min_northing(band).ok_or_else(invalid)?;
    while northing < min_northing {
        northing += ROW_CYCLE;
    }

    Ok(Utm {
        zone,
        band,
        easting,
        northing,
    })
}

/// Parse an MGRS reference into geodetic degrees (no elevation)
///
/// # Errors
///
/// Returns `CoordError::InvalidMgrs` when the reference is malformed.
pub fn mgrs_to_gdc(reference: &str) -> Result<Position, CoordError> {
    utm::utm_to_gdc(&mgrs_to_utm(reference)?)
}

/// Format geodetic degrees as an MGRS reference with `precision` digits per axis
///
/// # Errors
///
/// Returns `CoordError::LatitudeOutOfRange` in the polar regions and
/// `CoordError::InvalidPrecision` when `precision` exceeds five.
pub fn gdc_to_mgrs(latitude: f64, longitude: f64, precision: usize) -> Result<String, CoordError> {
    if precision > FULL_PRECISION {
        return Err(CoordError::InvalidPrecision(precision));
    }
    let utm = utm::gdc_to_utm(latitude, longitude)?;

    let column_index = ((utm.easting / SQUARE_SIZE).floor() as usize).saturating_sub(1);
    let column = column_set(utm.zone)
        .chars()
        .nth(column_index)
        .ok_or(CoordError::LatitudeOutOfRange(latitude))?;
    let row_index = ((utm.northing % ROW_CYCLE) / SQUARE_SIZE).floor() as usize;
    let row = ROW_LETTERS
        .chars()
        .nth((row_index + row_offset(utm.zone)) % ROW_LETTERS.len())
        .ok_or(CoordError::LatitudeOutOfRange(latitude))?;

    let mut reference = format!("{}{}{}{}", utm.zone, utm.band, column, row);
    if precision > 0 {
        let divisor = 10u32.pow((FULL_PRECISION - precision) as u32);
        let easting = (utm.easting % SQUARE_SIZE).floor() as u32 / divisor;
        let northing = (utm.northing % SQUARE_SIZE).floor() as u32 / divisor;
        reference.push_str(&format!("{easting:0precision$}{northing:0precision$}"));
    }
    Ok(reference)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_washington_reference() {
        let position = mgrs_to_gdc("18SUJ2337106519").unwrap();
        assert!((position.latitude - 38.8898).abs() < 1e-3);
        assert!((position.longitude - -77.0365).abs() < 1e-3);
        assert_eq!(position.elevation, None);
    }

    #[test]
    fn test_forward_known_point() {
        assert_eq!(
            gdc_to_mgrs(58.54383, 15.038887, 5).unwrap(),
            "33VWE0226389259"
        );
        assert_eq!(gdc_to_mgrs(-33.8688, 151.2093, 5).unwrap(), "56HLH3436850948");
    }

    #[test]
    fn test_reduced_precision() {
        assert_eq!(gdc_to_mgrs(58.54383, 15.038887, 2).unwrap(), "33VWE0289");
        let utm = mgrs_to_utm("33VWE0289").unwrap();
        assert_eq!(utm.easting, 502_000.0);
        assert_eq!(utm.northing, 6_489_000.0);
    }

    #[test]
    fn test_norway_exception_zone() {
        assert!(gdc_to_mgrs(60.0, 5.0, 5).unwrap().starts_with("32V"));
    }

    #[test]
    fn test_malformed_references_are_rejected() {
        for bad in ["", "33", "33VW", "33VWE123", "33VIE1234", "61VWE1234", "33VWE12a4"] {
            assert!(mgrs_to_utm(bad).is_err(), "expected {bad:?} to be rejected");
        }
    }
}
