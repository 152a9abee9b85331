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

use crate::geometry::Triangle;
use serde_derive::{Deserialize, Serialize};

/// Identifies the GIS object (building or wall) a surface belongs to.
pub type VariantId = u32;
/// Identifies the simulation node that owns a moving obstruction.
pub type NodeIdType = u32;

pub const INVALID_VARIANT_ID: VariantId = std::u32::MAX;
pub const INVALID_NODE_ID: NodeIdType = std::u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstructionType {
    Floor,
    Roof,
    OuterWall,
    InnerWall,
    Invalid,
}

/// A triangle obstruction stored in the quad-tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LosPolygon {
    pub triangle: Triangle,
    pub variant_id: VariantId,
    pub node_id: NodeIdType,
    pub shielding_loss_db: f64,
    pub obstruction_type: ObstructionType,
}

impl LosPolygon {
    pub fn new(
        triangle: Triangle,
        variant_id: VariantId,
        shielding_loss_db: f64,
        obstruction_type: ObstructionType,
    ) -> Self {
        LosPolygon {
            triangle,
            variant_id,
            node_id: INVALID_NODE_ID,
            shielding_loss_db,
            obstruction_type,
        }
    }

    pub fn with_node_id(mut self, node_id: NodeIdType) -> Self {
        self.node_id = node_id;
        self
    }
}

/// What a ray hit at one collision parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallCollisionInfo {
    pub variant_id: VariantId,
    pub shielding_loss_db: f64,
    pub obstruction_type: ObstructionType,
}

impl WallCollisionInfo {
    pub fn new(variant_id: VariantId, shielding_loss_db: f64, obstruction_type: ObstructionType) -> Self {
        WallCollisionInfo {
            variant_id,
            shielding_loss_db,
            obstruction_type,
        }
    }
}
