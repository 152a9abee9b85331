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

use super::obb::LosOrientedBoundingBox;
use super::polygon::NodeIdType;
use crate::errors::*;
use crate::geometry::{RotationMatrix, Vertex};
use quadtree::NodeId;
use serde_derive::{Deserialize, Serialize};
use std::sync::Arc;

/// Pose of a moving node at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MobilitySample {
    pub x: f64,
    pub y: f64,
    pub height_from_ground: f64,
    /// Clockwise from north.
    #[serde(default)]
    pub azimuth_degrees: f64,
    /// Up from the horizon.
    #[serde(default)]
    pub elevation_degrees: f64,
    /// True if `height_from_ground` already includes the ground elevation.
    #[serde(default)]
    pub height_contains_ground: bool,
}

impl MobilitySample {
    pub fn new(x: f64, y: f64, height_from_ground: f64) -> Self {
        MobilitySample {
            x,
            y,
            height_from_ground,
            azimuth_degrees: 0.,
            elevation_degrees: 0.,
            height_contains_ground: false,
        }
    }

    pub fn with_attitude(mut self, azimuth_degrees: f64, elevation_degrees: f64) -> Self {
        self.azimuth_degrees = azimuth_degrees;
        self.elevation_degrees = elevation_degrees;
        self
    }

    fn same_pose_as(&self, other: &MobilitySample) -> bool {
        self.x == other.x
            && self.y == other.y
            && self.height_from_ground == other.height_from_ground
            && self.azimuth_degrees == other.azimuth_degrees
            && self.elevation_degrees == other.elevation_degrees
    }

    fn unset() -> Self {
        let max = std::f64::MAX;
        MobilitySample::new(max, max, max).with_attitude(max, max)
    }
}

/// A node that obstructs rays with a box following its pose.
#[derive(Debug)]
pub struct LosMovingObject {
    pub node_id: NodeIdType,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub shielding_loss_db: f64,
    last_sample: MobilitySample,
    /// The quad-tree cell holding `obb`, if it was inserted.
    pub last_cell: Option<NodeId>,
    obb: Option<Arc<LosOrientedBoundingBox>>,
}

impl LosMovingObject {
    pub fn new(
        node_id: NodeIdType,
        length: f64,
        width: f64,
        height: f64,
        shielding_loss_db: f64,
    ) -> Result<Self> {
        if !(length > 0. && width > 0. && height > 0.) {
            return Err(ErrorKind::InvalidExtent(length, width, height).into());
        }
        Ok(LosMovingObject {
            node_id,
            length,
            width,
            height,
            shielding_loss_db,
            last_sample: MobilitySample::unset(),
            last_cell: None,
            obb: None,
        })
    }

    /// The current box, `None` before the first pose update.
    pub fn obb(&self) -> Option<&Arc<LosOrientedBoundingBox>> {
        self.obb.as_ref()
    }

    pub fn last_sample(&self) -> &MobilitySample {
        &self.last_sample
    }

    /// Rebuilds the box for a new pose. Returns false and keeps the box when the pose did not
    /// change.
    pub fn update_mobility_position(
        &mut self,
        sample: &MobilitySample,
        ground_elevation: f64,
    ) -> Result<bool> {
        if self.last_sample.same_pose_as(sample) {
            return Ok(false);
        }
        self.last_sample = *sample;
        self.reconstruct_obb(ground_elevation)?;
        Ok(true)
    }

    fn reconstruct_obb(&mut self, ground_elevation: f64) -> Result<()> {
        let sample = &self.last_sample;
        let mut base = Vertex::new(sample.x, sample.y, sample.height_from_ground);
        if !sample.height_contains_ground {
            base.z += ground_elevation;
        }
        let rotation = RotationMatrix::from_degrees(-sample.azimuth_degrees, 0., sample.elevation_degrees);

        self.obb = Some(Arc::new(LosOrientedBoundingBox::new(
            base,
            rotation,
            self.length,
            self.width,
            self.height,
            self.node_id,
            self.shielding_loss_db,
        )?));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_only_on_pose_change() {
        let mut object = LosMovingObject::new(4, 4.5, 1.8, 1.5, 5.).unwrap();
        assert!(object.obb().is_none());

        let sample = MobilitySample::new(10., 20., 0.);
        assert!(object.update_mobility_position(&sample, 2.).unwrap());
        let first = Arc::clone(object.obb().unwrap());
        assert_eq!(first.center, Vertex::new(10., 20., 2.75));
        assert_eq!(first.node_id, 4);

        assert!(!object.update_mobility_position(&sample, 2.).unwrap());
        assert!(Arc::ptr_eq(&first, object.obb().unwrap()));

        let turned = sample.with_attitude(90., 0.);
        assert!(object.update_mobility_position(&turned, 2.).unwrap());
        let rect = object.obb().unwrap().rect();
        // Heading east, the length lies along x.
        assert!((rect.width() - 4.5).abs() < 1e-9);
        assert!((rect.height() - 1.8).abs() < 1e-9);
    }

    #[test]
    fn test_height_with_ground_included() {
        let mut object = LosMovingObject::new(1, 2., 2., 2., 1.).unwrap();
        let mut sample = MobilitySample::new(0., 0., 30.);
        sample.height_contains_ground = true;
        object.update_mobility_position(&sample, 12.).unwrap();
        assert_eq!(object.obb().unwrap().center.z, 31.);
    }

    #[test]
    fn test_rejects_invalid_shape() {
        assert!(LosMovingObject::new(1, -2., 2., 2., 1.).is_err());
    }
}
