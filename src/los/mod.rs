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

//! Line-of-sight obstruction index: triangles and moving boxes in a quad-tree that answers ray
//! queries.

use fnv::FnvHashSet;

mod intersection;
mod moving_object;
mod obb;
mod polygon;
mod quad_tree;
mod ray;

pub use intersection::{
    insert_collision_point, judge_line_oriented_bounding_box, judge_line_plane, Collisions,
    COLLISION_T_ROUNDING,
};
pub use moving_object::{LosMovingObject, MobilitySample};
pub use obb::LosOrientedBoundingBox;
pub use polygon::{
    LosPolygon, NodeIdType, ObstructionType, VariantId, WallCollisionInfo, INVALID_NODE_ID,
    INVALID_VARIANT_ID,
};
pub use quad_tree::{LosQuadTree, MAX_DEPTH};
pub use ray::LosRay;

/// Nodes whose obstructions a query skips, usually the two end points of the ray.
pub type IgnoredNodeIds = FnvHashSet<NodeIdType>;
