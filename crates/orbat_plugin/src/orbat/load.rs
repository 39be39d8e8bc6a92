//! Input document types and load errors.
//!
//! The wire format is a single JSON tree rooted at the topmost unit. Field
//! presence rules are strict: every node carries a `children` array (empty
//! for individuals), and staff entries come in pairs or not at all.
//! Structural validation happens while the flat index is built, see
//! [`OrbatTree::from_doc`].
//!
//! [`OrbatTree::from_doc`]: super::tree::OrbatTree::from_doc

use serde::Deserialize;
use thiserror::Error;

use super::echelon::Echelon;
use super::geo::GeoPoint;

/// Reasons a unit document is rejected.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unit document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unit '{id}' is missing its children list")]
    MissingChildren { id: String },
    #[error("unit '{id}' declares {count} staff entries, expected exactly 2")]
    StaffCount { id: String, count: usize },
    #[error("duplicate unit id '{id}'")]
    DuplicateId { id: String },
    #[error("unit '{child}' ({child_echelon:?}) is not one echelon below its parent '{parent}' ({parent_echelon:?})")]
    EchelonStep {
        child: String,
        child_echelon: Echelon,
        parent: String,
        parent_echelon: Echelon,
    },
}

/// One node of the incoming unit tree.
#[derive(Debug, Deserialize)]
pub struct UnitDoc {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub echelon: Echelon,
    pub position: GeoPoint,
    /// Required by the format; `None` only when the field was absent, which
    /// the tree builder rejects.
    pub children: Option<Vec<UnitDoc>>,
    pub commander: Option<PersonDoc>,
    pub staff: Option<Vec<StaffDoc>>,
}

/// Commander entry of a unit.
#[derive(Debug, Deserialize)]
pub struct PersonDoc {
    pub id: String,
    pub name: String,
}

/// Staff entry of a unit, positioned independently of the unit marker.
#[derive(Debug, Deserialize)]
pub struct StaffDoc {
    pub id: String,
    pub name: String,
    pub position: GeoPoint,
}

impl UnitDoc {
    /// Parses a document from JSON without validating its structure.
    pub fn from_json(json: &str) -> Result<UnitDoc, LoadError> {
        Ok(serde_json::from_str(json)?)
    }
}
