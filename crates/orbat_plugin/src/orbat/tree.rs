//! Flat, immutable index of the unit hierarchy.
//!
//! The incoming document tree is walked once and flattened into a preorder
//! table with parent back-references and precomputed render-space home
//! positions. Everything downstream addresses units by [`UnitId`], a dense
//! index into that table. The tree never changes after load; all mutable
//! visibility state lives in the actor registry.

use std::collections::HashMap;

use glam::DVec3;

use super::echelon::{Echelon, Level};
use super::geo::{GeoPoint, GeoProjector};
use super::load::{LoadError, StaffDoc, UnitDoc};

/// Dense handle of one unit in the flat table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct UnitId(pub(crate) u32);

/// Commander entry resolved at load time.
#[derive(Clone, Debug)]
pub struct Commander {
    pub source_id: String,
    pub name: String,
}

/// Staff entry with its own home position.
#[derive(Clone, Debug)]
pub struct StaffMember {
    pub source_id: String,
    pub name: String,
    pub home: DVec3,
}

/// One flattened unit.
#[derive(Debug)]
pub struct Unit {
    pub id: UnitId,
    /// Stable id from the source document.
    pub source_id: String,
    pub name: String,
    pub echelon: Echelon,
    /// Render-space rest position of the primary marker. The commander, when
    /// present, stands here too once the unit is exploded.
    pub home: DVec3,
    pub parent: Option<UnitId>,
    /// Direct children in document order.
    pub children: Vec<UnitId>,
    pub commander: Option<Commander>,
    pub staff: Option<[StaffMember; 2]>,
}

impl Unit {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Ladder index, `None` for the top echelons outside the LOD system.
    pub fn level(&self) -> Option<Level> {
        self.echelon.level()
    }
}

/// The flattened hierarchy.
#[derive(Debug)]
pub struct OrbatTree {
    units: Vec<Unit>,
    by_source: HashMap<String, UnitId>,
    root: UnitId,
}

impl OrbatTree {
    /// Parses and indexes a JSON unit document.
    pub fn from_json(json: &str, height_bias: f64) -> Result<Self, LoadError> {
        Self::from_doc(UnitDoc::from_json(json)?, height_bias)
    }

    /// Flattens a parsed document, validating its structure.
    ///
    /// Rejects nodes without a `children` field, staff lists that are not
    /// exactly a pair, duplicate ids, and children whose echelon is not one
    /// step below their parent's.
    pub fn from_doc(root: UnitDoc, height_bias: f64) -> Result<Self, LoadError> {
        let projector = GeoProjector::new(root.position, height_bias);
        let mut tree = Self {
            units: Vec::new(),
            by_source: HashMap::new(),
            root: UnitId(0),
        };
        tree.root = tree.flatten(root, None, &projector)?;
        tracing::debug!(units = tree.units.len(), "unit tree indexed");
        Ok(tree)
    }

    fn flatten(
        &mut self,
        doc: UnitDoc,
        parent: Option<UnitId>,
        projector: &GeoProjector,
    ) -> Result<UnitId, LoadError> {
        if let Some(parent) = parent {
            let parent = self.unit(parent);
            if Some(doc.echelon) != parent.echelon.step_below() {
                return Err(LoadError::EchelonStep {
                    child: doc.id,
                    child_echelon: doc.echelon,
                    parent: parent.source_id.clone(),
                    parent_echelon: parent.echelon,
                });
            }
        }
        let children_docs = doc.children.ok_or(LoadError::MissingChildren {
            id: doc.id.clone(),
        })?;
        let staff = match doc.staff {
            None => None,
            Some(list) => {
                let pair: [StaffDoc; 2] =
                    list.try_into().map_err(|list: Vec<StaffDoc>| {
                        LoadError::StaffCount {
                            id: doc.id.clone(),
                            count: list.len(),
                        }
                    })?;
                Some(pair.map(|s| StaffMember {
                    source_id: s.id,
                    name: s.name,
                    home: projector.to_render(s.position),
                }))
            }
        };

        let id = UnitId(self.units.len() as u32);
        if self.by_source.insert(doc.id.clone(), id).is_some() {
            return Err(LoadError::DuplicateId { id: doc.id });
        }
        self.units.push(Unit {
            id,
            source_id: doc.id,
            name: doc.name,
            echelon: doc.echelon,
            home: projector.to_render(doc.position),
            parent,
            children: Vec::with_capacity(children_docs.len()),
            commander: doc.commander.map(|c| Commander {
                source_id: c.id,
                name: c.name,
            }),
            staff,
        });

        let mut children = Vec::with_capacity(children_docs.len());
        for child in children_docs {
            children.push(self.flatten(child, Some(id), projector)?);
        }
        self.units[id.0 as usize].children = children;
        Ok(id)
    }

    pub fn root(&self) -> UnitId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn unit(&self, id: UnitId) -> &Unit {
        &self.units[id.0 as usize]
    }

    /// Looks a unit up by its source-document id.
    pub fn get(&self, source_id: &str) -> Option<UnitId> {
        self.by_source.get(source_id).copied()
    }

    /// All units in preorder (deterministic).
    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    /// Units whose echelon sits at the given ladder level.
    pub fn units_at(&self, level: Level) -> impl Iterator<Item = &Unit> {
        self
            .units
            .iter()
            .filter(move |u| u.level() == Some(level))
    }

    /// Nearest ancestor-or-self whose echelon sits exactly at `level`.
    pub fn ancestor_at(&self, id: UnitId, level: Level) -> Option<UnitId> {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let unit = self.unit(current);
            if unit.level() == Some(level) {
                return Some(current);
            }
            cursor = unit.parent;
        }
        None
    }

    /// Preorder walk of the subtree below `id`, excluding `id` itself.
    pub fn descendants(&self, id: UnitId) -> Descendants<'_> {
        let mut stack = self.unit(id).children.clone();
        stack.reverse();
        Descendants { tree: self, stack }
    }
}

/// Iterator over a subtree, see [`OrbatTree::descendants`].
pub struct Descendants<'t> {
    tree: &'t OrbatTree,
    stack: Vec<UnitId>,
}

impl<'t> Iterator for Descendants<'t> {
    type Item = &'t Unit;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let unit = self.tree.unit(id);
        for child in unit.children.iter().rev() {
            self.stack.push(*child);
        }
        Some(unit)
    }
}

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;
