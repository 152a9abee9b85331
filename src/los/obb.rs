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

use super::polygon::NodeIdType;
use crate::errors::*;
use crate::geometry::{Rectangle, RotationMatrix, Vertex};

/// A rotated box standing in for a moving obstruction. The box is replaced, never mutated, when
/// its owner moves.
#[derive(Debug, Clone, PartialEq)]
pub struct LosOrientedBoundingBox {
    pub center: Vertex,
    pub rotation: RotationMatrix,
    /// Half extents along the rotated x (width), y (length) and z (height) axes.
    pub extent_per_axis: [f64; 3],
    pub node_id: NodeIdType,
    pub shielding_loss_db: f64,
    rect: Rectangle,
}

impl LosOrientedBoundingBox {
    /// `bottom_center` is the center of the box's ground face.
    pub fn new(
        bottom_center: Vertex,
        rotation: RotationMatrix,
        length: f64,
        width: f64,
        height: f64,
        node_id: NodeIdType,
        shielding_loss_db: f64,
    ) -> Result<Self> {
        if !(length > 0. && width > 0. && height > 0.) {
            return Err(ErrorKind::InvalidExtent(length, width, height).into());
        }

        let mut obb = LosOrientedBoundingBox {
            center: bottom_center + Vertex::new(0., 0., height * 0.5),
            rotation,
            extent_per_axis: [width * 0.5, length * 0.5, height * 0.5],
            node_id,
            shielding_loss_db,
            rect: Rectangle::default(),
        };
        obb.rect = Rectangle::points_rect(obb.corners().iter());
        Ok(obb)
    }

    pub fn corners(&self) -> [Vertex; 8] {
        let [ex, ey, ez] = self.extent_per_axis;
        let corner_from = |x, y, z| &self.rotation * Vertex::new(x, y, z) + self.center;
        [
            corner_from(-ex, -ey, -ez),
            corner_from(ex, -ey, -ez),
            corner_from(-ex, ey, -ez),
            corner_from(ex, ey, -ez),
            corner_from(-ex, -ey, ez),
            corner_from(ex, -ey, ez),
            corner_from(-ex, ey, ez),
            corner_from(ex, ey, ez),
        ]
    }

    /// The planar bounding rectangle used for quad-tree placement.
    pub fn rect(&self) -> &Rectangle {
        &self.rect
    }
}
