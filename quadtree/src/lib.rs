// Copyright 2016 The Cartographer Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Cell addressing for planar quad-trees.
//!
//! A cell is identified by its level (0 for the root) and an index that stores two bits per
//! level, most significant bits closest to the root. The two bits are the `Quadrant` of the
//! cell inside its parent.

use std::fmt::{self, Write};
use std::num::ParseIntError;
use std::str::FromStr;

/// One of the four children of a cell, numbered counter-clockwise starting with the
/// positive-x/positive-y quadrant.
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Quadrant {
    PxPy = 0,
    NxPy = 1,
    NxNy = 2,
    PxNy = 3,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::PxPy,
        Quadrant::NxPy,
        Quadrant::NxNy,
        Quadrant::PxNy,
    ];

    pub fn from_u8(index: u8) -> Self {
        assert!(index < 4);
        Self::ALL[index as usize]
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn as_index(self) -> usize {
        self as usize
    }

    /// True if both quadrants lie on the same side of the vertical split line.
    pub fn x_is_same(self, other: Quadrant) -> bool {
        self == other || self.as_u8() + other.as_u8() == 3
    }

    /// True if both quadrants lie on the same side of the horizontal split line.
    pub fn y_is_same(self, other: Quadrant) -> bool {
        let sum = self.as_u8() + other.as_u8();
        self == other || sum == 1 || sum == 5
    }
}

#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq)]
pub struct NodeId {
    // The root is level = 0, its children 1 and so on.
    level: u8,
    // Two bits per level. Multiple cells can share an index, but none share index and level.
    index: u64,
}

impl NodeId {
    pub fn new(level: u8, index: u64) -> Self {
        NodeId { level, index }
    }

    pub fn root() -> Self {
        NodeId { index: 0, level: 0 }
    }

    pub fn get_child_id(&self, quadrant: Quadrant) -> Self {
        NodeId {
            level: self.level + 1,
            index: (self.index << 2) + u64::from(quadrant.as_u8()),
        }
    }

    /// The quadrant of this cell in its parent.
    pub fn quadrant(&self) -> Option<Quadrant> {
        if self.level == 0 {
            return None;
        }
        Some(Quadrant::from_u8(self.index as u8 & 3))
    }

    /// Returns the parents id or None if this is the root.
    pub fn parent_id(&self) -> Option<NodeId> {
        if self.level == 0 {
            return None;
        }
        Some(NodeId {
            level: self.level - 1,
            index: (self.index >> 2),
        })
    }

    /// The quadrants to descend through, starting at the root, to reach this cell.
    pub fn path(&self) -> Vec<Quadrant> {
        (0..self.level)
            .rev()
            .map(|level| Quadrant::from_u8(((self.index >> (2 * level)) & 3) as u8))
            .collect()
    }

    /// True if `other` is this cell or lies below it.
    pub fn is_ancestor_of(&self, other: &NodeId) -> bool {
        other.level >= self.level
            && (other.index >> (2 * u32::from(other.level - self.level))) == self.index
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn index(&self) -> u64 {
        self.index
    }
}

impl FromStr for NodeId {
    type Err = ParseIntError;

    /// Construct a NodeId. No checking is done if this is a valid Id.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let level = (name.len() - 1) as u8;
        let index = if level > 0 {
            u64::from_str_radix(&name[1..], 4)?
        } else {
            0
        };
        Ok(NodeId { level, index })
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_char('r')?;
        for quadrant in self.path() {
            formatter.write_char((b'0' + quadrant.as_u8()) as char)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{NodeId, Quadrant};
    use std::str::FromStr;

    #[test]
    fn test_parent_node_name() {
        assert_eq!(
            Some(NodeId::from_str("r12321").unwrap()),
            NodeId::from_str("r123210").unwrap().parent_id()
        );
        assert_eq!(None, NodeId::root().parent_id());
    }

    #[test]
    fn test_quadrant() {
        assert_eq!(
            Some(Quadrant::NxPy),
            NodeId::from_str("r123321").unwrap().quadrant()
        );
        assert_eq!(
            Some(Quadrant::PxNy),
            NodeId::from_str("r123323").unwrap().quadrant()
        );
        assert_eq!(None, NodeId::from_str("r").unwrap().quadrant());
    }

    #[test]
    fn test_to_string() {
        for id in &["r", "r0", "r123323"] {
            assert_eq!(&NodeId::from_str(id).unwrap().to_string(), id);
        }
    }

    #[test]
    fn test_path_follows_children() {
        let id = NodeId::root()
            .get_child_id(Quadrant::NxNy)
            .get_child_id(Quadrant::PxPy)
            .get_child_id(Quadrant::PxNy);
        assert_eq!(
            id.path(),
            vec![Quadrant::NxNy, Quadrant::PxPy, Quadrant::PxNy]
        );
        assert_eq!(id.to_string(), "r203");
    }

    #[test]
    fn test_is_ancestor_of() {
        let parent = NodeId::from_str("r12").unwrap();
        assert!(parent.is_ancestor_of(&NodeId::from_str("r1230").unwrap()));
        assert!(parent.is_ancestor_of(&parent));
        assert!(!parent.is_ancestor_of(&NodeId::from_str("r13").unwrap()));
        assert!(!parent.is_ancestor_of(&NodeId::from_str("r1").unwrap()));
        assert!(NodeId::root().is_ancestor_of(&parent));
    }

    #[test]
    fn test_quadrant_sides() {
        assert!(Quadrant::PxPy.x_is_same(Quadrant::PxNy));
        assert!(Quadrant::NxPy.x_is_same(Quadrant::NxNy));
        assert!(!Quadrant::PxPy.x_is_same(Quadrant::NxPy));
        assert!(Quadrant::PxPy.y_is_same(Quadrant::NxPy));
        assert!(Quadrant::NxNy.y_is_same(Quadrant::PxNy));
        assert!(!Quadrant::PxPy.y_is_same(Quadrant::NxNy));
    }
}
