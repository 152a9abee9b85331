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

//! Road network and the precomputed line-of-sight relation between roads.

mod los_checker;
mod nlos_path;

pub use self::los_checker::{
    normalized_abs_radians, NlosAngleCalculator, NlosDistanceCalculator, NlosPathValueCalculator,
    RoadLosChecker,
};
pub use self::nlos_path::{NlosPathData, RoadLosRelationData, RoadLosRelationType};

use crate::config::SpatialMapConfig;
use crate::errors::*;
use crate::geometry::algorithms::{line_polygon, polygon_contains_point, rect_intersects_with_polygon};
use crate::geometry::{Rectangle, Vertex};
use crate::spatial_map::{SpatialObject, SpatialObjectMap};
use serde_derive::{Deserialize, Serialize};
use tracing::debug;

pub type RoadId = usize;
pub type IntersectionId = usize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intersection {
    pub id: IntersectionId,
    pub position: Vertex,
    /// Filled by `RoadLayer::new`.
    #[serde(skip)]
    pub connected_road_ids: Vec<RoadId>,
}

impl Intersection {
    pub fn new(id: IntersectionId, position: Vertex) -> Self {
        Intersection {
            id,
            position,
            connected_road_ids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Road {
    pub id: RoadId,
    pub vertices: Vec<Vertex>,
    pub width: f64,
    pub start_intersection_id: IntersectionId,
    pub end_intersection_id: IntersectionId,
    #[serde(default)]
    pub is_parking: bool,
    #[serde(skip)]
    polygon: Vec<Vertex>,
}

impl Road {
    pub fn new(
        id: RoadId,
        vertices: Vec<Vertex>,
        width: f64,
        start_intersection_id: IntersectionId,
        end_intersection_id: IntersectionId,
    ) -> Self {
        let mut road = Road {
            id,
            vertices,
            width,
            start_intersection_id,
            end_intersection_id,
            is_parking: false,
            polygon: Vec::new(),
        };
        road.make_polygon();
        road
    }

    fn make_polygon(&mut self) {
        self.polygon = line_polygon(&self.vertices, self.width);
    }

    /// The footprint, the center line widened by `width`.
    pub fn polygon(&self) -> &[Vertex] {
        &self.polygon
    }

    /// Direction of the chord from the first to the last vertex, folded into [-PI/2, PI/2].
    pub fn direction_radians(&self) -> f64 {
        match (self.vertices.first(), self.vertices.last()) {
            (Some(start), Some(end)) => ((end.y - start.y) / (end.x - start.x)).atan(),
            _ => 0.,
        }
    }

    /// The intersection at the other end. Ids that are not the start map to the start.
    pub fn other_side_intersection_id(&self, intersection_id: IntersectionId) -> IntersectionId {
        if intersection_id != self.start_intersection_id {
            self.start_intersection_id
        } else {
            self.end_intersection_id
        }
    }

    pub fn number_of_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn contains(&self, position: &Vertex) -> bool {
        polygon_contains_point(&self.polygon, position)
    }
}

impl SpatialObject for Road {
    fn min_rect(&self) -> Rectangle {
        Rectangle::points_rect(self.polygon.iter())
    }

    fn intersects_with(&self, rect: &Rectangle) -> bool {
        rect_intersects_with_polygon(rect, &self.polygon)
    }
}

pub struct RoadLayer {
    intersections: Vec<Intersection>,
    roads: Vec<Road>,
    road_map: SpatialObjectMap<RoadId>,
    max_road_width: f64,
}

impl RoadLayer {
    /// Ids must match positions in their vector and roads must end at known intersections.
    pub fn new(
        mut intersections: Vec<Intersection>,
        mut roads: Vec<Road>,
        spatial_map: &SpatialMapConfig,
    ) -> Result<Self> {
        spatial_map.validate()?;
        for (index, intersection) in intersections.iter_mut().enumerate() {
            if intersection.id != index {
                bail!(ErrorKind::UnknownIntersection(intersection.id));
            }
            intersection.connected_road_ids.clear();
        }

        let mut max_road_width = 0_f64;
        for (index, road) in roads.iter_mut().enumerate() {
            if road.id != index {
                bail!(ErrorKind::UnknownRoad(road.id));
            }
            for &intersection_id in &[road.start_intersection_id, road.end_intersection_id] {
                if intersection_id >= intersections.len() {
                    bail!(ErrorKind::UnknownIntersection(intersection_id));
                }
            }
            road.make_polygon();
            max_road_width = max_road_width.max(road.width);
        }

        for road in &roads {
            intersections[road.start_intersection_id]
                .connected_road_ids
                .push(road.id);
            if road.end_intersection_id != road.start_intersection_id {
                intersections[road.end_intersection_id]
                    .connected_road_ids
                    .push(road.id);
            }
        }

        let area = roads
            .iter()
            .map(|road| road.min_rect())
            .chain(intersections.iter().map(|i| Rectangle::from_points(&i.position, &i.position)))
            .fold(Rectangle::empty_accumulator(), |area, rect| area.union(&rect));
        let mut road_map = SpatialObjectMap::default();
        if area.is_valid() {
            road_map.set_mesh(area, spatial_map.mesh_unit_meters, spatial_map.max_mesh_number);
            for road in &roads {
                road_map.insert(road, road.id);
            }
        }

        debug!(
            intersections = intersections.len(),
            roads = roads.len(),
            max_road_width,
            "road layer built"
        );
        Ok(RoadLayer {
            intersections,
            roads,
            road_map,
            max_road_width,
        })
    }

    pub fn intersections(&self) -> &[Intersection] {
        &self.intersections
    }

    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    pub fn max_road_width(&self) -> f64 {
        self.max_road_width
    }

    pub fn intersection(&self, intersection_id: IntersectionId) -> Result<&Intersection> {
        self.intersections
            .get(intersection_id)
            .ok_or_else(|| ErrorKind::UnknownIntersection(intersection_id).into())
    }

    pub fn road(&self, road_id: RoadId) -> Result<&Road> {
        self.roads
            .get(road_id)
            .ok_or_else(|| ErrorKind::UnknownRoad(road_id).into())
    }

    pub fn intersection_position(&self, intersection_id: IntersectionId) -> Result<Vertex> {
        Ok(self.intersection(intersection_id)?.position)
    }

    /// Roads whose footprint contains `position`.
    pub fn road_ids_at(&self, position: &Vertex) -> Vec<RoadId> {
        let search_rect = Rectangle::from_center(position, self.max_road_width);
        self.road_map
            .query_rect(&search_rect)
            .into_iter()
            .filter(|&road_id| self.roads[road_id].contains(position))
            .collect()
    }
}

#[cfg(test)]
mod tests;
