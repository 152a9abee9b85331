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

use super::{IntersectionId, RoadId, RoadLayer};
use crate::errors::*;
use serde_derive::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A diffraction path between two roads: roads alternating with the intersections joining them.
///
/// The chain starts and ends with an intersection, so there is always one intersection more than
/// there are roads. Paths are only built through the constructors, which hold at least two roads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NlosPathData {
    road_ids: Vec<RoadId>,
    intersection_ids: Vec<IntersectionId>,
    /// Cost of the path, lower is better.
    pub path_value: f64,
}

impl NlosPathData {
    /// road_id1 -> nlos intersection -> road_id2.
    pub fn new(
        road_id1: RoadId,
        road_id2: RoadId,
        intersection_id1: IntersectionId,
        intersection_id2: IntersectionId,
        nlos_intersection_id: IntersectionId,
    ) -> Self {
        NlosPathData {
            road_ids: vec![road_id1, road_id2],
            intersection_ids: vec![intersection_id1, nlos_intersection_id, intersection_id2],
            path_value: 0.,
        }
    }

    /// road_id1 -> nlos intersection 1 -> nlos road -> nlos intersection 2 -> road_id2.
    pub fn with_nlos_road(
        road_id1: RoadId,
        road_id2: RoadId,
        intersection_id1: IntersectionId,
        intersection_id2: IntersectionId,
        nlos_intersection_id1: IntersectionId,
        nlos_intersection_id2: IntersectionId,
        nlos_road_id: RoadId,
    ) -> Self {
        NlosPathData {
            road_ids: vec![road_id1, nlos_road_id, road_id2],
            intersection_ids: vec![
                intersection_id1,
                nlos_intersection_id1,
                nlos_intersection_id2,
                intersection_id2,
            ],
            path_value: 0.,
        }
    }

    pub fn road_ids(&self) -> &[RoadId] {
        &self.road_ids
    }

    pub fn intersection_ids(&self) -> &[IntersectionId] {
        &self.intersection_ids
    }

    pub fn push_back_road_id(&mut self, road_id: RoadId) {
        self.road_ids.push(road_id);
    }

    pub fn push_front_road_id(&mut self, road_id: RoadId) {
        self.road_ids.insert(0, road_id);
    }

    pub fn push_back_intersection_id(&mut self, intersection_id: IntersectionId) {
        self.intersection_ids.push(intersection_id);
    }

    pub fn push_front_intersection_id(&mut self, intersection_id: IntersectionId) {
        self.intersection_ids.insert(0, intersection_id);
    }

    pub fn front_road_id(&self) -> RoadId {
        self.road_ids[0]
    }

    pub fn back_road_id(&self) -> RoadId {
        self.road_ids[self.road_ids.len() - 1]
    }

    /// The second road, the first one reached around a corner.
    pub fn nlos_road_id(&self) -> RoadId {
        self.road_ids[1]
    }

    pub fn last_nlos_road_id(&self) -> RoadId {
        self.road_ids[self.road_ids.len() - 2]
    }

    pub fn front_intersection_id(&self) -> IntersectionId {
        self.intersection_ids[0]
    }

    pub fn back_intersection_id(&self) -> IntersectionId {
        self.intersection_ids[self.intersection_ids.len() - 1]
    }

    pub fn number_of_roads(&self) -> usize {
        self.road_ids.len()
    }

    pub fn number_of_intersections(&self) -> usize {
        self.intersection_ids.len()
    }

    pub fn contains_road(&self, road_id: RoadId) -> bool {
        self.road_ids.contains(&road_id)
    }

    pub fn road_relation(&self) -> (RoadId, RoadId) {
        (self.front_road_id(), self.back_road_id())
    }

    pub fn intersection_pair(&self) -> (IntersectionId, IntersectionId) {
        (self.front_intersection_id(), self.back_intersection_id())
    }

    /// Orients the path so that the front road has the lower id.
    pub fn normalize(&mut self) {
        if self.front_road_id() > self.back_road_id() {
            self.inverse();
        }
    }

    pub fn inverse(&mut self) {
        self.road_ids.reverse();
        self.intersection_ids.reverse();
    }

    /// Number of corners, one less than the number of roads.
    pub fn nlos_count(&self) -> usize {
        self.road_ids.len() - 1
    }

    pub fn is_multiple_nlos_path(&self) -> bool {
        self.nlos_count() > 0
    }

    // Some(true) if the path is read from its front for `start_road_id`.
    fn reads_from_front(&self, start_road_id: RoadId) -> Option<bool> {
        if self.front_road_id() == start_road_id {
            Some(true)
        } else if self.back_road_id() == start_road_id {
            Some(false)
        } else {
            None
        }
    }

    /// The `number`th intersection seen from `start_road_id`, which must be at one end.
    pub fn intersection_id(&self, start_road_id: RoadId, number: usize) -> Option<IntersectionId> {
        let last = self.intersection_ids.len().checked_sub(number + 1)?;
        let index = if self.reads_from_front(start_road_id)? { number } else { last };
        Some(self.intersection_ids[index])
    }

    pub fn road_id(&self, start_road_id: RoadId, number: usize) -> Option<RoadId> {
        let last = self.road_ids.len().checked_sub(number + 1)?;
        let index = if self.reads_from_front(start_road_id)? { number } else { last };
        Some(self.road_ids[index])
    }

    pub fn start_intersection_id(&self, start_road_id: RoadId) -> Option<IntersectionId> {
        self.intersection_id(start_road_id, 0)
    }

    pub fn end_intersection_id(&self, start_road_id: RoadId) -> Option<IntersectionId> {
        if self.reads_from_front(start_road_id)? {
            Some(self.back_intersection_id())
        } else {
            Some(self.front_intersection_id())
        }
    }

    pub fn end_road_id(&self, start_road_id: RoadId) -> Option<RoadId> {
        if self.reads_from_front(start_road_id)? {
            Some(self.back_road_id())
        } else {
            Some(self.front_road_id())
        }
    }

    /// Planar length of the intersection chain.
    pub fn nlos_path_distance(&self, road_layer: &RoadLayer) -> Result<f64> {
        let mut distance = 0.;
        for pair in self.intersection_ids.windows(2) {
            let p1 = road_layer.intersection_position(pair[0])?;
            let p2 = road_layer.intersection_position(pair[1])?;
            distance += p1.xy_distance_to(&p2);
        }
        Ok(distance)
    }

    /// Extends the path at the end away from `start_road_id`: the last intersection moves to
    /// `base_intersection_id`, then `expand_road_id` and `end_intersection_id` are appended.
    pub fn expand_road(
        &mut self,
        start_road_id: RoadId,
        base_intersection_id: IntersectionId,
        expand_road_id: RoadId,
        end_intersection_id: IntersectionId,
    ) {
        if start_road_id == self.front_road_id() {
            let last = self.intersection_ids.len() - 1;
            self.intersection_ids[last] = base_intersection_id;
            self.push_back_road_id(expand_road_id);
            self.push_back_intersection_id(end_intersection_id);
        } else {
            self.intersection_ids[0] = base_intersection_id;
            self.push_front_road_id(expand_road_id);
            self.push_front_intersection_id(end_intersection_id);
        }
    }
}

impl fmt::Display for NlosPathData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(Road")?;
        for road_id in &self.road_ids {
            write!(f, ",{}", road_id)?;
        }
        write!(f, ",Intersection")?;
        for intersection_id in &self.intersection_ids {
            write!(f, ",{}", intersection_id)?;
        }
        write!(f, ")")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoadLosRelationType {
    Los,
    Nlos,
    OutOfNlos,
}

impl Default for RoadLosRelationType {
    fn default() -> Self {
        RoadLosRelationType::OutOfNlos
    }
}

/// Relation of an ordered road pair with the cheapest path per pair of end intersections.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoadLosRelationData {
    pub relation_type: RoadLosRelationType,
    pub nlos_paths: BTreeMap<(IntersectionId, IntersectionId), NlosPathData>,
}

impl RoadLosRelationData {
    pub fn new(relation_type: RoadLosRelationType) -> Self {
        RoadLosRelationData {
            relation_type,
            nlos_paths: BTreeMap::new(),
        }
    }

    /// Keeps `path` unless a path with the same end intersections is at most as expensive.
    pub fn offer_nlos_path(&mut self, path: NlosPathData) {
        let key = path.intersection_pair();
        let is_better = self
            .nlos_paths
            .get(&key)
            .map_or(true, |existing| existing.path_value > path.path_value);
        if is_better {
            self.nlos_paths.insert(key, path);
        }
    }
}
