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

use super::nlos_path::{NlosPathData, RoadLosRelationData, RoadLosRelationType};
use super::{IntersectionId, Road, RoadId, RoadLayer};
use crate::config::RoadLosConfig;
use crate::errors::*;
use crate::geometry::algorithms::{
    calculate_intersection_position, calculate_radians_between_vector, squared_xy_distance,
};
use crate::geometry::Vertex;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::f64::consts::PI;
use std::fmt::{self, Write};
use std::sync::Arc;
use tracing::{debug, warn};

/// Scores a diffraction path. Lower values are better.
pub trait NlosPathValueCalculator: Send + Sync {
    fn nlos_path_value(&self, road_layer: &RoadLayer, path: &NlosPathData) -> f64;
}

/// Sum of the turning angles between consecutive roads of the path.
#[derive(Debug, Clone, Copy, Default)]
pub struct NlosAngleCalculator;

impl NlosPathValueCalculator for NlosAngleCalculator {
    fn nlos_path_value(&self, road_layer: &RoadLayer, path: &NlosPathData) -> f64 {
        path.road_ids()
            .windows(2)
            .map(|pair| match (road_layer.road(pair[0]), road_layer.road(pair[1])) {
                (Ok(road1), Ok(road2)) => {
                    normalized_abs_radians(road1.direction_radians() - road2.direction_radians())
                }
                _ => std::f64::MAX,
            })
            .sum()
    }
}

/// Planar length of the path.
#[derive(Debug, Clone, Copy, Default)]
pub struct NlosDistanceCalculator;

impl NlosPathValueCalculator for NlosDistanceCalculator {
    fn nlos_path_value(&self, road_layer: &RoadLayer, path: &NlosPathData) -> f64 {
        path.nlos_path_distance(road_layer).unwrap_or(std::f64::MAX)
    }
}

/// Absolute angle difference in [0, PI/2]. Opposite directions count as aligned.
pub fn normalized_abs_radians(radians: f64) -> f64 {
    let abs_radians = radians.abs();
    abs_radians.min((abs_radians - PI).abs())
}

// Roads that see along each other through an intersection, per intersection.
type LosRoadIdsPerIntersection = BTreeMap<IntersectionId, BTreeSet<RoadId>>;

fn nearer_intersection_id(road_layer: &RoadLayer, road: &Road, position: &Vertex) -> Result<IntersectionId> {
    let start = road_layer.intersection_position(road.start_intersection_id)?;
    let end = road_layer.intersection_position(road.end_intersection_id)?;
    if squared_xy_distance(position, &start) < squared_xy_distance(position, &end) {
        Ok(road.start_intersection_id)
    } else {
        Ok(road.end_intersection_id)
    }
}

// Paths read from a road they do not start or end with are rejected with that road.
fn from_start_road<T>(value: Option<T>, start_road_id: RoadId) -> Result<T> {
    value.ok_or_else(|| ErrorKind::UnknownRoad(start_road_id).into())
}

/// Line-of-sight relation of every ordered pair of two-vertex roads.
///
/// Roads see each other when a chain of roads with nearly the same direction connects them.
/// Other pairs are linked by diffraction paths turning at up to `max_diffraction_count`
/// corners, as long as the path stays within `max_nlos_distance`.
pub struct RoadLosChecker {
    road_layer: Arc<RoadLayer>,
    calculator: Box<dyn NlosPathValueCalculator>,
    max_diffraction_count: usize,
    los_threshold_radians: f64,
    max_nlos_distance: f64,
    relations: BTreeMap<(RoadId, RoadId), RoadLosRelationData>,
    out_of_nlos_relation: RoadLosRelationData,
}

impl RoadLosChecker {
    pub fn new(
        road_layer: Arc<RoadLayer>,
        calculator: Box<dyn NlosPathValueCalculator>,
        config: &RoadLosConfig,
    ) -> Self {
        RoadLosChecker {
            road_layer,
            calculator,
            max_diffraction_count: config.max_diffraction_count,
            los_threshold_radians: config.los_threshold_radians(),
            max_nlos_distance: config.max_nlos_distance,
            relations: BTreeMap::new(),
            out_of_nlos_relation: RoadLosRelationData::default(),
        }
    }

    pub fn road_layer(&self) -> &RoadLayer {
        &self.road_layer
    }

    /// Recomputes the relation table.
    pub fn make_los_relation(&mut self) -> Result<()> {
        self.relations.clear();
        let mut los_road_ids = LosRoadIdsPerIntersection::new();

        self.make_direct_los_relation(&mut los_road_ids);
        self.make_nlos1_relation(&los_road_ids)?;
        if self.max_diffraction_count > 1 {
            self.make_nlos2_to_n_relation(&los_road_ids)?;
        }
        Ok(())
    }

    fn relation_type(&self, road_pair: &(RoadId, RoadId)) -> Option<RoadLosRelationType> {
        self.relations.get(road_pair).map(|relation| relation.relation_type)
    }

    fn log_relation_counts(&self, pass: &str) {
        let number_of = |relation_type: RoadLosRelationType| {
            self.relations
                .values()
                .filter(|relation| relation.relation_type == relation_type)
                .count()
        };
        debug!(
            pass,
            los = number_of(RoadLosRelationType::Los),
            nlos = number_of(RoadLosRelationType::Nlos),
            "road relation pass done"
        );
    }

    // Breadth first search from each road through intersections, following roads whose
    // direction stays within the threshold.
    fn make_direct_los_relation(&mut self, los_road_ids: &mut LosRoadIdsPerIntersection) {
        let road_layer = Arc::clone(&self.road_layer);
        let intersections = road_layer.intersections();

        for road in road_layer.roads() {
            if road.number_of_vertices() != 2 {
                warn!(
                    road_id = road.id,
                    vertices = road.number_of_vertices(),
                    "only roads with two vertices take part in the relation"
                );
                continue;
            }
            let start_id = road.start_intersection_id;
            let end_id = road.end_intersection_id;
            los_road_ids.entry(start_id).or_default().insert(road.id);
            los_road_ids.entry(end_id).or_default().insert(road.id);

            let base_radians = road.direction_radians();
            let mut checked_road_ids = BTreeSet::new();
            let mut los_intersection_ids: VecDeque<IntersectionId> = vec![start_id, end_id].into();

            while let Some(los_intersection_id) = los_intersection_ids.pop_front() {
                for &connected_road_id in &intersections[los_intersection_id].connected_road_ids {
                    if !checked_road_ids.insert(connected_road_id) {
                        continue;
                    }
                    let connected_road = &road_layer.roads()[connected_road_id];
                    let difference =
                        normalized_abs_radians(base_radians - connected_road.direction_radians());
                    if difference >= self.los_threshold_radians {
                        continue;
                    }

                    self.relations
                        .entry((road.id, connected_road_id))
                        .or_default()
                        .relation_type = RoadLosRelationType::Los;

                    let other_id = connected_road.other_side_intersection_id(los_intersection_id);
                    for &intersection_id in &[start_id, end_id, other_id] {
                        los_road_ids
                            .entry(intersection_id)
                            .or_default()
                            .insert(connected_road_id);
                    }
                    los_intersection_ids.push_back(other_id);
                }
            }
        }
        self.log_relation_counts("los");
    }

    // One corner: two roads seen from the same intersection, joined at their ends nearer to it.
    fn make_nlos1_relation(&mut self, los_road_ids: &LosRoadIdsPerIntersection) -> Result<()> {
        let road_layer = Arc::clone(&self.road_layer);

        for (&intersection_id, road_ids) in los_road_ids {
            let corner = road_layer.intersection_position(intersection_id)?;

            for &road_id1 in road_ids {
                for &road_id2 in road_ids {
                    let road_pair = (road_id1, road_id2);
                    if self.relation_type(&road_pair) == Some(RoadLosRelationType::Los) {
                        continue;
                    }
                    let road1 = road_layer.road(road_id1)?;
                    let road2 = road_layer.road(road_id2)?;
                    if road1.is_parking || road2.is_parking {
                        continue;
                    }

                    if road1.start_intersection_id == road2.start_intersection_id
                        && road1.end_intersection_id == road2.end_intersection_id
                    {
                        self.relations.entry(road_pair).or_default().relation_type =
                            RoadLosRelationType::Los;
                        continue;
                    }

                    let mut path = NlosPathData::new(
                        road_id1,
                        road_id2,
                        nearer_intersection_id(&road_layer, road1, &corner)?,
                        nearer_intersection_id(&road_layer, road2, &corner)?,
                        intersection_id,
                    );
                    if path.nlos_path_distance(&road_layer)? > self.max_nlos_distance {
                        continue;
                    }
                    path.path_value = self.calculator.nlos_path_value(&road_layer, &path);

                    let relation = self.relations.entry(road_pair).or_default();
                    relation.relation_type = RoadLosRelationType::Nlos;
                    relation.offer_nlos_path(path);
                }
            }
        }
        self.log_relation_counts("nlos1");
        Ok(())
    }

    // Extends the paths with the most corners by one more road per round. Each round reads the
    // table of the previous one.
    fn make_nlos2_to_n_relation(&mut self, los_road_ids: &LosRoadIdsPerIntersection) -> Result<()> {
        for nlos_count in 1..self.max_diffraction_count {
            let mut new_relations = self.relations.clone();

            for relation in self.relations.values() {
                let mut extended_paths = Vec::new();
                for path in relation.nlos_paths.values() {
                    if path.nlos_count() == nlos_count {
                        self.push_extended_nlos_paths(
                            los_road_ids,
                            path,
                            path.front_road_id(),
                            &mut extended_paths,
                        )?;
                    }
                }

                for path in extended_paths {
                    let new_relation = new_relations.entry(path.road_relation()).or_default();
                    if new_relation.relation_type != RoadLosRelationType::Los {
                        new_relation.relation_type = RoadLosRelationType::Nlos;
                        new_relation.offer_nlos_path(path);
                    }
                }
            }

            self.relations = new_relations;
            self.log_relation_counts(&format!("nlos{}", nlos_count + 1));
        }
        Ok(())
    }

    fn push_extended_nlos_paths(
        &self,
        los_road_ids: &LosRoadIdsPerIntersection,
        path: &NlosPathData,
        start_road_id: RoadId,
        extended_paths: &mut Vec<NlosPathData>,
    ) -> Result<()> {
        let road_layer = &*self.road_layer;
        let end_road = road_layer.road(from_start_road(path.end_road_id(start_road_id), start_road_id)?)?;
        let last_end_intersection_id = from_start_road(path.end_intersection_id(start_road_id), start_road_id)?;
        let end_intersection_id = end_road.other_side_intersection_id(last_end_intersection_id);
        let end_position = road_layer.intersection_position(end_intersection_id)?;

        let end_road_ids = match los_road_ids.get(&end_intersection_id) {
            Some(road_ids) => road_ids,
            None => return Ok(()),
        };
        let ignored_road_ids = los_road_ids.get(&last_end_intersection_id);

        for &candidate_road_id in end_road_ids {
            if self.relation_type(&(start_road_id, candidate_road_id)) == Some(RoadLosRelationType::Los) {
                continue;
            }
            if ignored_road_ids.map_or(false, |ids| ids.contains(&candidate_road_id))
                || path.contains_road(candidate_road_id)
            {
                continue;
            }

            let candidate_road = road_layer.road(candidate_road_id)?;
            let mut extended_path = path.clone();
            extended_path.expand_road(
                start_road_id,
                end_intersection_id,
                candidate_road_id,
                nearer_intersection_id(road_layer, candidate_road, &end_position)?,
            );

            if extended_path.nlos_path_distance(road_layer)? <= self.max_nlos_distance {
                extended_path.path_value = self.calculator.nlos_path_value(road_layer, &extended_path);
                extended_paths.push(extended_path);
            }
        }
        Ok(())
    }

    /// The relation of an ordered road pair. Pairs without a relation are out of NLOS reach.
    pub fn los_relation(&self, road_id1: RoadId, road_id2: RoadId) -> &RoadLosRelationData {
        self.relations
            .get(&(road_id1, road_id2))
            .unwrap_or(&self.out_of_nlos_relation)
    }

    pub fn relations(&self) -> &BTreeMap<(RoadId, RoadId), RoadLosRelationData> {
        &self.relations
    }

    /// True if any road at `position1` sees any road at `position2`.
    pub fn positions_are_line_of_sight(&self, position1: &Vertex, position2: &Vertex) -> bool {
        let road_ids2 = self.road_layer.road_ids_at(position2);
        self.road_layer.road_ids_at(position1).into_iter().any(|road_id1| {
            road_ids2.iter().any(|&road_id2| {
                self.los_relation(road_id1, road_id2).relation_type == RoadLosRelationType::Los
            })
        })
    }

    /// Angle at the first corner between the start road and the road after the corner.
    pub fn calculate_nlos_point_radians(&self, path: &NlosPathData, start_road_id: RoadId) -> Result<f64> {
        let road_layer = &*self.road_layer;
        let start_intersection_id = from_start_road(path.intersection_id(start_road_id, 0), start_road_id)?;
        let nlos_intersection_id = from_start_road(path.intersection_id(start_road_id, 1), start_road_id)?;
        let start_road = road_layer.road(start_road_id)?;
        let nlos_road = road_layer.road(from_start_road(path.road_id(start_road_id, 1), start_road_id)?)?;

        let start_position =
            road_layer.intersection_position(start_road.other_side_intersection_id(start_intersection_id))?;
        let nlos_position = road_layer.intersection_position(nlos_intersection_id)?;
        let end_position =
            road_layer.intersection_position(nlos_road.other_side_intersection_id(nlos_intersection_id))?;

        Ok(calculate_radians_between_vector(&start_position, &nlos_position, &end_position))
    }

    /// Positions of the path's intersections, read from `start_road_id`.
    pub fn calculate_nlos_points(&self, path: &NlosPathData, start_road_id: RoadId) -> Result<Vec<Vertex>> {
        (0..path.number_of_intersections())
            .map(|i| {
                let intersection_id = from_start_road(path.intersection_id(start_road_id, i), start_road_id)?;
                self.road_layer.intersection_position(intersection_id)
            })
            .collect()
    }

    /// Distance from `start_position`, projected onto the start road's center line, to the
    /// first corner.
    pub fn calculate_nlos_point_to_start_point_center_distance(
        &self,
        path: &NlosPathData,
        start_road_id: RoadId,
        start_position: &Vertex,
    ) -> Result<f64> {
        let road_layer = &*self.road_layer;
        let start_intersection_id = from_start_road(path.start_intersection_id(start_road_id), start_road_id)?;
        let nlos_intersection_id = from_start_road(path.intersection_id(start_road_id, 1), start_road_id)?;
        let road = road_layer.road(start_road_id)?;

        let v0 = road_layer.intersection_position(road.other_side_intersection_id(start_intersection_id))?;
        let v1 = road_layer.intersection_position(start_intersection_id)?;
        let v2 = road_layer.intersection_position(nlos_intersection_id)?;

        let on_center_line = calculate_intersection_position(start_position, &v0, &v1);
        Ok(on_center_line.xy_distance_to(&v1) + v1.xy_distance_to(&v2))
    }

    pub fn calculate_distance_to_last_nlos_point(
        &self,
        path: &NlosPathData,
        start_road_id: RoadId,
        start_position: &Vertex,
    ) -> Result<f64> {
        let mut total_distance =
            self.calculate_nlos_point_to_start_point_center_distance(path, start_road_id, start_position)?;
        let points = self.calculate_nlos_points(path, start_road_id)?;
        let last = points.len().saturating_sub(2);
        if last > 1 {
            total_distance += points[1..last]
                .iter()
                .zip(&points[2..=last])
                .map(|(p1, p2)| p1.xy_distance_to(p2))
                .sum::<f64>();
        }
        Ok(total_distance)
    }

    pub fn calculate_nlos_point_to_end_point_center_distance(
        &self,
        path: &NlosPathData,
        start_road_id: RoadId,
        end_position: &Vertex,
    ) -> Result<f64> {
        let end_road_id = from_start_road(path.end_road_id(start_road_id), start_road_id)?;
        self.calculate_distance_to_last_nlos_point(path, end_road_id, end_position)
    }

    pub fn calculate_start_point_to_end_point_center_distance(
        &self,
        path: &NlosPathData,
        start_road_id: RoadId,
        start_position: &Vertex,
        end_position: &Vertex,
    ) -> Result<f64> {
        Ok(
            self.calculate_nlos_point_to_start_point_center_distance(path, start_road_id, start_position)?
                + self.calculate_nlos_point_to_end_point_center_distance(path, start_road_id, end_position)?,
        )
    }

    /// False if either end position lies within half a road width of its first corner.
    pub fn is_complete_nlos_path(
        &self,
        path: &NlosPathData,
        start_road_id: RoadId,
        start_position: &Vertex,
        end_position: &Vertex,
    ) -> Result<bool> {
        let end_road_id = from_start_road(path.end_road_id(start_road_id), start_road_id)?;

        for &(road_id, position) in &[(start_road_id, start_position), (end_road_id, end_position)] {
            let nlos_road_id = from_start_road(path.road_id(road_id, 1), road_id)?;
            let half_width = self.road_layer.road(nlos_road_id)?.width / 2.;
            if self.calculate_nlos_point_to_start_point_center_distance(path, road_id, position)? < half_width {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Renders the relation table, one road pair per line.
    pub fn write_los_relation<W: Write>(&self, out: &mut W) -> fmt::Result {
        let road_layer = &*self.road_layer;
        let write_road = |out: &mut W, road: &Road| -> fmt::Result {
            write!(out, "{}", road.id)?;
            if let (Some(start), Some(end)) = (road.vertices.first(), road.vertices.last()) {
                write!(out, "({},{})({},{})", start.x, start.y, end.x, end.y)?;
            }
            Ok(())
        };

        for (&(road_id1, road_id2), relation) in &self.relations {
            let (road1, road2) = match (road_layer.road(road_id1), road_layer.road(road_id2)) {
                (Ok(road1), Ok(road2)) => (road1, road2),
                _ => continue,
            };
            write_road(out, road1)?;
            write!(out, ", ")?;
            write_road(out, road2)?;
            write!(out, ":")?;

            match relation.relation_type {
                RoadLosRelationType::Los => writeln!(out, "LoS")?,
                RoadLosRelationType::OutOfNlos => writeln!(out, "out of NLoS")?,
                RoadLosRelationType::Nlos => {
                    write!(out, "NLoS")?;
                    for (i, path) in relation.nlos_paths.values().enumerate() {
                        if relation.nlos_paths.len() > 1 {
                            writeln!(out)?;
                        }
                        write!(out, "  - Path{}(Road", i)?;
                        for road_id in path.road_ids() {
                            write!(out, ",{}", road_id)?;
                        }
                        write!(out, ",Intersection")?;
                        for &intersection_id in path.intersection_ids() {
                            write!(out, ",{}", intersection_id)?;
                            if let Ok(position) = road_layer.intersection_position(intersection_id) {
                                write!(out, "({},{})", position.x, position.y)?;
                            }
                        }
                        write!(out, ")")?;
                    }
                    writeln!(out)?;
                }
            }
        }
        Ok(())
    }

    /// Logs the relation table at debug level and returns it.
    pub fn output_los_relation(&self) -> Result<String> {
        let mut table = String::new();
        self.write_los_relation(&mut table)?;
        debug!(relations = self.relations.len(), "road los relation\n{}", table);
        Ok(table)
    }
}
