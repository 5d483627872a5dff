use super::field::{parse_field, Cached, TextField};
use crate::coords::{self, CoordinateChoice, Position};
use crate::errors::{MsdlError, Result};
use crate::xml::{NodeId, XmlTree};

/// `Disposition` sub-record: location and motion
#[derive(Debug, Clone, PartialEq)]
pub struct Disposition {
    node: NodeId,
    location: Cached<Position>,
    direction_of_movement: TextField,
    speed: TextField,
}

impl Disposition {
    pub fn from_node(tree: &XmlTree, node: NodeId) -> Self {
        let location = tree
            .first_child(node, "Location")
            .and_then(|loc| coords::decode_location(tree, loc));
        Self {
            node,
            location: Cached::from_option(location),
            direction_of_movement: TextField::load(tree, node, &["DirectionOfMovement"]),
            speed: TextField::load(tree, node, &["Speed"]),
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Canonical position, if one is recorded and decodable
    pub fn location(&self, tree: &XmlTree) -> Option<Position> {
        self.location.get_or_read(|| {
            tree.first_child(self.node, "Location")
                .and_then(|loc| coords::decode_location(tree, loc))
        })
    }

    /// Encoding currently stored in the document
    pub fn location_choice(&self, tree: &XmlTree) -> Option<CoordinateChoice> {
        tree.first_child(self.node, "Location")
            .and_then(|loc| coords::location_choice(tree, loc))
    }

    /// Update the location in its current encoding
    ///
    /// # Errors
    ///
    /// Returns `CoordinateEncodingNotImplemented` when a stored location is
    /// in any encoding other than GDC, including one that is not recognized.
    /// Use
    /// [`Disposition::replace_location_gdc`] to switch to GDC explicitly.
    pub fn set_location(&mut self, tree: &mut XmlTree, position: Position) -> Result<()> {
        if let Some(existing) = tree.first_child(self.node, "Location") {
            match tree.path_text(existing, &["CoordinateChoice"]) {
                // empty Location: nothing to preserve
                None if tree.first_child(existing, "CoordinateData").is_none() => {}
                raw => {
                    let choice = raw.and_then(|r| r.parse::<CoordinateChoice>().ok());
                    if choice != Some(CoordinateChoice::Gdc) {
                        return Err(MsdlError::CoordinateEncodingNotImplemented {
                            encoding: raw.unwrap_or("unspecified").to_string(),
                        });
                    }
                }
            }
        }
        let location = tree.ensure_child(self.node, "Location");
        coords::encode_gdc(tree, location, &position);
        self.location.set(position);
        Ok(())
    }

    /// Replace whatever encoding is stored with a GDC location
    pub fn replace_location_gdc(&mut self, tree: &mut XmlTree, position: Position) {
        let location = tree.ensure_child(self.node, "Location");
        tree.remove_path(location, &["CoordinateData"]);
        coords::encode_gdc(tree, location, &position);
        self.location.set(position);
    }

    /// Drop the cached location so the next read decodes the node again
    pub fn refresh_location(&mut self) {
        self.location.invalidate();
    }

    pub fn direction_of_movement(&self, tree: &XmlTree) -> Option<f64> {
        parse_field(
            "DirectionOfMovement",
            self.direction_of_movement.get(tree, self.node),
        )
    }

    pub fn set_direction_of_movement(&mut self, tree: &mut XmlTree, degrees: f64) {
        self.direction_of_movement
            .set(tree, self.node, &degrees.to_string());
    }

    pub fn speed(&self, tree: &XmlTree) -> Option<f64> {
        parse_field("Speed", self.speed.get(tree, self.node))
    }

    pub fn set_speed(&mut self, tree: &mut XmlTree, speed: f64) {
        self.speed.set(tree, self.node, &speed.to_string());
    }
}
