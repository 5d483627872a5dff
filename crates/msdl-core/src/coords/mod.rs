//! Coordinate codec
//!
//! Normalises the four MSDL location encodings (MGRS, GDC, GCC, UTM) into a
//! canonical [`Position`]. Decoding is lenient: an unknown discriminator or
//! an unparseable number is logged and yields an absent value, never an
//! error. Only GDC is writable.

pub mod ellipsoid;
pub mod mgrs;
pub mod utm;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::xml::{NodeId, XmlTree};

pub use ellipsoid::{gcc_to_gdc, gdc_to_gcc, Gcc};
pub use mgrs::{gdc_to_mgrs, mgrs_to_gdc, mgrs_to_utm};
pub use utm::{gdc_to_utm, utm_to_gdc, Utm};

/// Failure of a pure coordinate conversion
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordError {
    #[error("invalid MGRS reference: {0:?}")]
    InvalidMgrs(String),

    #[error("invalid grid zone designator: {0:?}")]
    InvalidGridZone(String),

    #[error("latitude {0} is outside the UTM/MGRS coverage (80S..84N)")]
    LatitudeOutOfRange(f64),

    #[error("MGRS precision {0} exceeds 5 digits")]
    InvalidPrecision(usize),
}

/// Canonical position: degrees longitude, degrees latitude, optional meters
///
/// `elevation` is `None` when the source recorded none; that is distinct
/// from an elevation of zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub longitude: f64,
    pub latitude: f64,
    pub elevation: Option<f64>,
}

impl Position {
    pub fn new(longitude: f64, latitude: f64, elevation: Option<f64>) -> Self {
        Self {
            longitude,
            latitude,
            elevation,
        }
    }

    /// `[lon, lat]` or `[lon, lat, elevation]`
    pub fn to_vec(&self) -> Vec<f64> {
        let mut tuple = vec![self.longitude, self.latitude];
        if let Some(elevation) = self.elevation {
            tuple.push(elevation);
        }
        tuple
    }
}

/// Location encoding discriminator (`CoordinateChoice`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CoordinateChoice {
    Mgrs,
    Gdc,
    Gcc,
    Utm,
}

impl CoordinateChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinateChoice::Mgrs => "MGRS",
            CoordinateChoice::Gdc => "GDC",
            CoordinateChoice::Gcc => "GCC",
            CoordinateChoice::Utm => "UTM",
        }
    }
}

impl fmt::Display for CoordinateChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoordinateChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "MGRS" => Ok(CoordinateChoice::Mgrs),
            "GDC" => Ok(CoordinateChoice::Gdc),
            "GCC" => Ok(CoordinateChoice::Gcc),
            "UTM" => Ok(CoordinateChoice::Utm),
            other => Err(other.to_string()),
        }
    }
}

/// Read the encoding discriminator of a `Location` element
pub fn location_choice(tree: &XmlTree, location: NodeId) -> Option<CoordinateChoice> {
    tree.path_text(location, &["CoordinateChoice"])?.parse().ok()
}

/// Decode a `Location` element into a canonical position
///
/// Returns `None` (with a warning) when the discriminator is missing or
/// unknown, or when a required numeric field cannot be parsed. An
/// unparseable elevation only drops the elevation.
pub fn decode_location(tree: &XmlTree, location: NodeId) -> Option<Position> {
    let Some(raw_choice) = tree.path_text(location, &["CoordinateChoice"]) else {
        tracing::warn!(node = %location, "location has no CoordinateChoice");
        return None;
    };
    let choice = match raw_choice.parse::<CoordinateChoice>() {
        Ok(choice) => choice,
        Err(unknown) => {
            tracing::warn!(node = %location, choice = %unknown, "unknown coordinate encoding");
            return None;
        }
    };

    let data = tree.find_path(location, &["CoordinateData", choice.as_str()]);
    let Some(data) = data else {
        tracing::warn!(node = %location, choice = %choice, "location has no coordinate data");
        return None;
    };

    match choice {
        CoordinateChoice::Gdc => decode_gdc(tree, data),
        CoordinateChoice::Mgrs => decode_mgrs(tree, data),
        CoordinateChoice::Utm => decode_utm(tree, data),
        CoordinateChoice::Gcc => decode_gcc(tree, data),
    }
}

fn number(tree: &XmlTree, data: NodeId, field: &str) -> Option<f64> {
    let raw = tree.path_text(data, &[field])?;
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            tracing::warn!(field, value = raw, "unparseable coordinate field");
            None
        }
    }
}

fn required_number(tree: &XmlTree, data: NodeId, field: &str) -> Option<f64> {
    let value = number(tree, data, field);
    if value.is_none() {
        tracing::warn!(field, "coordinate field missing or invalid, location dropped");
    }
    value
}

fn elevation(tree: &XmlTree, data: NodeId) -> Option<f64> {
    number(tree, data, "ElevationAGL")
}

fn decode_gdc(tree: &XmlTree, data: NodeId) -> Option<Position> {
    let latitude = required_number(tree, data, "Latitude")?;
    let longitude = required_number(tree, data, "Longitude")?;
    Some(Position::new(longitude, latitude, elevation(tree, data)))
}

fn decode_mgrs(tree: &XmlTree, data: NodeId) -> Option<Position> {
    let zone = tree.path_text(data, &["MGRSGridZone"])?;
    let square = tree.path_text(data, &["MGRSGridSquare"])?;
    let easting = tree.path_text(data, &["MGRSEasting"])?;
    let northing = tree.path_text(data, &["MGRSNorthing"])?;
    let reference = format!(
        "{zone}{square}{easting:0>width$}{northing:0>width$}",
        width = mgrs::FULL_PRECISION
    );
    match mgrs_to_gdc(&reference) {
        Ok(position) => Some(Position {
            elevation: elevation(tree, data),
            ..position
        }),
        Err(err) => {
            tracing::warn!(error = %err, "MGRS location dropped");
            None
        }
    }
}

fn decode_utm(tree: &XmlTree, data: NodeId) -> Option<Position> {
    let zone = tree.path_text(data, &["UTMGridZone"])?;
    let easting = required_number(tree, data, "UTMEasting")?;
    let northing = required_number(tree, data, "UTMNorthing")?;
    let parsed = utm::parse_grid_zone(zone).and_then(|(zone, band)| {
        utm_to_gdc(&Utm {
            zone,
            band,
            easting,
            northing,
        })
    });
    match parsed {
        Ok(position) => Some(Position {
            elevation: elevation(tree, data),
            ..position
        }),
        Err(err) => {
            tracing::warn!(error = %err, "UTM location dropped");
            None
        }
    }
}

fn decode_gcc(tree: &XmlTree, data: NodeId) -> Option<Position> {
    let gcc = Gcc {
        x: required_number(tree, data, "X")?,
        y: required_number(tree, data, "Y")?,
        z: required_number(tree, data, "Z")?,
    };
    Some(gcc_to_gdc(&gcc))
}

/// Write a position into a `Location` element as GDC
///
/// Existing GDC fields are updated in place. `ElevationAGL` is removed when
/// the position has no elevation.
pub fn encode_gdc(tree: &mut XmlTree, location: NodeId, position: &Position) {
    tree.set_path_text(location, &["CoordinateChoice"], CoordinateChoice::Gdc.as_str());
    let data = tree.ensure_path(location, &["CoordinateData", "GDC"]);
    tree.set_path_text(data, &["Latitude"], &position.latitude.to_string());
    tree.set_path_text(data, &["Longitude"], &position.longitude.to_string());
    match position.elevation {
        Some(elevation) => {
            tree.set_path_text(data, &["ElevationAGL"], &elevation.to_string());
        }
        None => {
            tree.remove_path(data, &["ElevationAGL"]);
        }
    }
}
