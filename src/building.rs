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

//! Buildings, walls and moving objects as obstructions of the line-of-sight quad-tree.

use crate::config::{MaterialConfig, MovingShapeConfig, SpatialMapConfig};
use crate::errors::*;
use crate::geometry::algorithms::{polygon_contains_point, rect_intersects_with_polygon};
use crate::geometry::{polygon_to_triangles, Rectangle, Triangle, Vertex};
use crate::los::{
    Collisions, IgnoredNodeIds, LosMovingObject, LosPolygon, LosQuadTree, LosRay, MobilitySample,
    NodeIdType, ObstructionType, VariantId, INVALID_VARIANT_ID,
};
use crate::spatial_map::{SpatialObject, SpatialObjectMap};
use fnv::FnvHashMap;
use serde_derive::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// The quad-tree area is at least this long in both directions.
const MIN_AREA_LENGTH: f64 = 1000.;

/// Moving objects are boxes with two faces on each ray, each face gets half the material loss.
const MOVING_OBJECT_LOSS_FACTOR: f64 = 0.5;

/// Transmission loss per material name.
#[derive(Debug, Clone, Default)]
pub struct MaterialSet {
    losses_db: FnvHashMap<String, f64>,
}

impl MaterialSet {
    pub fn new(materials: &[MaterialConfig]) -> Self {
        let mut set = MaterialSet::default();
        for material in materials {
            set.add_material(&material.name, material.transmission_loss_db);
        }
        set
    }

    pub fn add_material(&mut self, name: &str, transmission_loss_db: f64) {
        self.losses_db.insert(name.to_string(), transmission_loss_db);
    }

    pub fn transmission_loss_db(&self, name: &str) -> Result<f64> {
        self.losses_db
            .get(name)
            .cloned()
            .ok_or_else(|| ErrorKind::UnknownMaterial(name.to_string()).into())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    /// Closed ground polygon.
    pub polygon: Vec<Vertex>,
    pub height: f64,
    pub roof_loss_db: f64,
    pub floor_loss_db: f64,
    pub outer_wall_loss_db: f64,
}

impl Building {
    pub fn contains(&self, position: &Vertex) -> bool {
        polygon_contains_point(&self.polygon, position)
    }
}

impl SpatialObject for Building {
    fn min_rect(&self) -> Rectangle {
        Rectangle::points_rect(self.polygon.iter())
    }

    fn intersects_with(&self, rect: &Rectangle) -> bool {
        rect_intersects_with_polygon(rect, &self.polygon)
    }
}

/// A free standing wall along a polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub vertices: Vec<Vertex>,
    pub height: f64,
    #[serde(default)]
    pub width: f64,
    pub loss_db: f64,
}

impl Wall {
    pub fn rect(&self) -> Rectangle {
        Rectangle::points_rect(self.vertices.iter()).expanded(self.width * 0.5)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct MovingShape {
    length: f64,
    width: f64,
    height: f64,
    material: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeightStatistics {
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub variance: f64,
}

pub struct BuildingLayer {
    buildings: Vec<Building>,
    walls: Vec<Wall>,
    quad_tree: LosQuadTree,
    building_map: SpatialObjectMap<usize>,
    moving_shapes: FnvHashMap<String, MovingShape>,
    moving_objects: FnvHashMap<NodeIdType, LosMovingObject>,
    height_statistics: HeightStatistics,
}

impl BuildingLayer {
    pub fn new(buildings: Vec<Building>, walls: Vec<Wall>, spatial_map: &SpatialMapConfig) -> Result<Self> {
        spatial_map.validate()?;
        let area = Self::area_of(&buildings, &walls);
        let mut layer = BuildingLayer {
            buildings,
            walls,
            quad_tree: LosQuadTree::new(area),
            building_map: SpatialObjectMap::new(area, spatial_map.mesh_unit_meters, spatial_map.max_mesh_number),
            moving_shapes: FnvHashMap::default(),
            moving_objects: FnvHashMap::default(),
            height_statistics: HeightStatistics::default(),
        };
        for (building_id, building) in layer.buildings.iter().enumerate() {
            layer.building_map.insert(building, building_id);
        }
        layer.remake_los_topology()?;
        Ok(layer)
    }

    // Bounding rectangle of everything, centered and at least MIN_AREA_LENGTH away from the center.
    fn area_of(buildings: &[Building], walls: &[Wall]) -> Rectangle {
        let rect = buildings
            .iter()
            .map(|building| building.min_rect())
            .chain(walls.iter().map(Wall::rect))
            .fold(Rectangle::empty_accumulator(), |area, rect| area.union(&rect));
        if !rect.is_valid() {
            return Rectangle::from_center(&Vertex::zero(), MIN_AREA_LENGTH);
        }
        Rectangle::from_center_xy(
            &rect.center(),
            MIN_AREA_LENGTH.max(rect.width()),
            MIN_AREA_LENGTH.max(rect.height()),
        )
    }

    /// Rebuilds the quad-tree from buildings, walls and the current moving object boxes.
    pub fn remake_los_topology(&mut self) -> Result<()> {
        let mut quad_tree = LosQuadTree::new(Self::area_of(&self.buildings, &self.walls));
        let mut heights = Vec::with_capacity(self.buildings.len() + self.walls.len());

        for (building_id, building) in self.buildings.iter().enumerate() {
            let variant_id = building_id as VariantId;
            push_wall_triangles(
                &mut quad_tree,
                &building.polygon,
                building.height,
                variant_id,
                building.outer_wall_loss_db,
                ObstructionType::OuterWall,
            );

            let triangles = match polygon_to_triangles(&building.polygon) {
                Ok(triangulation) => triangulation.triangles,
                Err(e) => {
                    warn!(building_id, error = %e, "building footprint has no roof and floor");
                    Vec::new()
                }
            };
            let mut roof_top = building.height;
            let up = Vertex::new(0., 0., building.height);
            for triangle in triangles {
                quad_tree.push_los_polygon(LosPolygon::new(
                    Triangle::new(triangle.p1 + up, triangle.p2 + up, triangle.p3 + up),
                    variant_id,
                    building.roof_loss_db,
                    ObstructionType::Roof,
                ));
                quad_tree.push_los_polygon(LosPolygon::new(
                    triangle,
                    variant_id,
                    building.floor_loss_db,
                    ObstructionType::Floor,
                ));
                for corner in triangle.vertices().iter() {
                    roof_top = roof_top.max(corner.z + building.height);
                }
            }
            heights.push((building.height, roof_top));
        }

        for (wall_id, wall) in self.walls.iter().enumerate() {
            push_wall_triangles(
                &mut quad_tree,
                &wall.vertices,
                wall.height,
                (self.buildings.len() + wall_id) as VariantId,
                wall.loss_db,
                ObstructionType::InnerWall,
            );
            heights.push((wall.height, wall.height));
        }

        for object in self.moving_objects.values_mut() {
            object.last_cell = object
                .obb()
                .map(|obb| quad_tree.push_los_oriented_bounding_box(Arc::clone(obb)));
        }

        self.quad_tree = quad_tree;
        self.height_statistics = height_statistics(&heights);
        debug!(
            buildings = self.buildings.len(),
            walls = self.walls.len(),
            polygons = self.quad_tree.number_of_polygons(),
            cells = self.quad_tree.number_of_cells(),
            deepest_level = self.quad_tree.deepest_used_level(),
            "line of sight topology built"
        );
        Ok(())
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn quad_tree(&self) -> &LosQuadTree {
        &self.quad_tree
    }

    pub fn height_statistics(&self) -> &HeightStatistics {
        &self.height_statistics
    }

    /// The first building whose polygon contains `position`.
    pub fn building_id_at(&self, position: &Vertex) -> Option<usize> {
        self.building_map
            .query_point(position)
            .into_iter()
            .find(|&building_id| self.buildings[building_id].contains(position))
    }

    /// Registers shape definitions. Shape names are case insensitive and must be unique.
    pub fn load_moving_shapes(&mut self, shapes: &[MovingShapeConfig]) -> Result<()> {
        for shape in shapes {
            let shape_type = shape.shape_type.to_lowercase();
            if self.moving_shapes.contains_key(&shape_type) {
                bail!(ErrorKind::DuplicateShape(shape_type));
            }
            self.moving_shapes.insert(
                shape_type,
                MovingShape {
                    length: shape.length,
                    width: shape.width,
                    height: shape.height,
                    material: shape.material.clone(),
                },
            );
        }
        Ok(())
    }

    /// The object stays invisible to rays until its first pose update.
    pub fn add_moving_object(
        &mut self,
        node_id: NodeIdType,
        shape_type: &str,
        materials: &MaterialSet,
    ) -> Result<()> {
        if self.moving_objects.contains_key(&node_id) {
            bail!(ErrorKind::DuplicateMovingObject(node_id));
        }
        let shape = self
            .moving_shapes
            .get(&shape_type.to_lowercase())
            .ok_or_else(|| ErrorKind::UnknownShape(shape_type.to_string()))?;
        let loss_db = materials.transmission_loss_db(&shape.material)? * MOVING_OBJECT_LOSS_FACTOR;

        let object = LosMovingObject::new(node_id, shape.length, shape.width, shape.height, loss_db)?;
        self.moving_objects.insert(node_id, object);
        Ok(())
    }

    /// Moves the box of `node_id`. Returns whether the pose changed.
    pub fn update_moving_object(
        &mut self,
        node_id: NodeIdType,
        sample: &MobilitySample,
        ground_elevation: f64,
    ) -> Result<bool> {
        let object = self
            .moving_objects
            .get_mut(&node_id)
            .ok_or_else(|| ErrorKind::UnknownMovingObject(node_id))?;

        if !object.update_mobility_position(sample, ground_elevation)? {
            return Ok(false);
        }
        if let Some(obb) = object.obb() {
            let cell = self
                .quad_tree
                .reinsert_los_oriented_bounding_box(object.last_cell, Arc::clone(obb));
            trace!(node_id, cell = %cell, "moving object reinserted");
            object.last_cell = Some(cell);
        }
        Ok(true)
    }

    /// Applies one sample per node. Returns the number of objects that moved.
    pub fn sync_moving_objects<'a, I>(&mut self, samples: I, ground_elevation: f64) -> Result<usize>
    where
        I: IntoIterator<Item = &'a (NodeIdType, MobilitySample)>,
    {
        let mut number_moved = 0;
        for (node_id, sample) in samples {
            if self.update_moving_object(*node_id, sample, ground_elevation)? {
                number_moved += 1;
            }
        }
        Ok(number_moved)
    }

    /// Returns false if no object was registered for `node_id`.
    pub fn remove_moving_object(&mut self, node_id: NodeIdType) -> bool {
        match self.moving_objects.remove(&node_id) {
            Some(object) => {
                if let Some(cell) = object.last_cell {
                    self.quad_tree.remove_los_oriented_bounding_box(&cell, node_id);
                }
                true
            }
            None => false,
        }
    }

    pub fn moving_object(&self, node_id: NodeIdType) -> Option<&LosMovingObject> {
        self.moving_objects.get(&node_id)
    }

    pub fn has_collision(&self, p1: &Vertex, p2: &Vertex, ignored_node_ids: &IgnoredNodeIds) -> bool {
        self.quad_tree.has_collision(&LosRay::new(*p1, *p2), ignored_node_ids)
    }

    pub fn positions_are_line_of_sight(
        &self,
        p1: &Vertex,
        p2: &Vertex,
        ignored_node_ids: &IgnoredNodeIds,
    ) -> bool {
        !self.has_collision(p1, p2, ignored_node_ids)
    }

    /// Collision info keyed by the ray parameter, 0 at `p1` and 1 at `p2`.
    pub fn collisions_between(&self, p1: &Vertex, p2: &Vertex, ignored_node_ids: &IgnoredNodeIds) -> Collisions {
        self.collisions(&LosRay::new(*p1, *p2), ignored_node_ids)
    }

    fn collisions(&self, ray: &LosRay, ignored_node_ids: &IgnoredNodeIds) -> Collisions {
        let mut collisions = Collisions::new();
        self.quad_tree
            .check_collision(ray, ignored_node_ids, false, false, &mut collisions);
        collisions
    }

    /// Every surface crossed between the two points in ray order, and the summed loss.
    pub fn calculate_wall_collision_points(
        &self,
        p1: &Vertex,
        p2: &Vertex,
        ignored_node_ids: &IgnoredNodeIds,
    ) -> (Vec<(Vertex, VariantId)>, f64) {
        let ray = LosRay::new(*p1, *p2);
        let collisions = self.collisions(&ray, ignored_node_ids);
        let points = collisions
            .iter()
            .map(|(t, info)| (ray.position(t.into_inner()), info.variant_id))
            .collect();
        let total_loss_db = collisions.values().map(|info| info.shielding_loss_db).sum();
        (points, total_loss_db)
    }

    pub fn calculate_total_wall_and_floor_loss_db(&self, p1: &Vertex, p2: &Vertex) -> f64 {
        self.calculate_wall_collision_points(p1, p2, &IgnoredNodeIds::default()).1
    }

    /// Number of floors and walls crossed. Roofs and moving objects are not counted.
    pub fn calculate_number_of_floors_and_walls_traversed(
        &self,
        p1: &Vertex,
        p2: &Vertex,
        ignored_node_ids: &IgnoredNodeIds,
    ) -> (usize, usize) {
        let collisions = self.collisions(&LosRay::new(*p1, *p2), ignored_node_ids);
        collisions
            .values()
            .fold((0, 0), |(floors, walls), info| match info.obstruction_type {
                ObstructionType::Floor => (floors + 1, walls),
                ObstructionType::OuterWall | ObstructionType::InnerWall => (floors, walls + 1),
                ObstructionType::Roof | ObstructionType::Invalid => (floors, walls),
            })
    }

    pub fn calculate_number_of_wall_roof_floor_interactions(&self, p1: &Vertex, p2: &Vertex) -> usize {
        self.calculate_wall_collision_points(p1, p2, &IgnoredNodeIds::default())
            .0
            .len()
    }

    /// Height of the object hit at a collision point, 0 for moving objects. None for ids of no
    /// building or wall.
    pub fn collision_point_height(&self, collision_point: &(Vertex, VariantId)) -> Option<f64> {
        let variant_id = collision_point.1;
        if variant_id == INVALID_VARIANT_ID {
            return Some(0.);
        }
        let variant_id = variant_id as usize;
        if variant_id < self.buildings.len() {
            return Some(self.buildings[variant_id].height);
        }
        self.walls
            .get(variant_id - self.buildings.len())
            .map(|wall| wall.height)
    }

    /// Roof crossings of the ground projection of the segment, for a quick check whether it
    /// passes over buildings.
    pub fn roof_crossings(&self, p1: &Vertex, p2: &Vertex) -> Collisions {
        let ray = LosRay::new(p1.xy_point(), p2.xy_point());
        let mut collisions = Collisions::new();
        self.quad_tree
            .check_collision(&ray, &IgnoredNodeIds::default(), false, true, &mut collisions);
        collisions
    }
}

// Two triangles per segment spanning from the ground to `height`.
fn push_wall_triangles(
    quad_tree: &mut LosQuadTree,
    vertices: &[Vertex],
    height: f64,
    variant_id: VariantId,
    loss_db: f64,
    obstruction_type: ObstructionType,
) {
    let up = Vertex::new(0., 0., height);
    for edge in vertices.windows(2) {
        let (v1, v2) = (edge[0], edge[1]);
        quad_tree.push_los_polygon(LosPolygon::new(
            Triangle::new(v1, v1 + up, v2),
            variant_id,
            loss_db,
            obstruction_type,
        ));
        quad_tree.push_los_polygon(LosPolygon::new(
            Triangle::new(v2, v2 + up, v1 + up),
            variant_id,
            loss_db,
            obstruction_type,
        ));
    }
}

// Takes (height, roof top) per object.
fn height_statistics(heights: &[(f64, f64)]) -> HeightStatistics {
    if heights.is_empty() {
        return HeightStatistics::default();
    }
    let number = heights.len() as f64;
    let average = heights.iter().map(|&(_, roof_top)| roof_top).sum::<f64>() / number;
    let variance = heights
        .iter()
        .map(|&(height, _)| (height - average) * (height - average))
        .sum::<f64>()
        / number;
    HeightStatistics {
        average,
        min: heights.iter().map(|h| h.0).fold(std::f64::MAX, f64::min),
        max: heights.iter().map(|h| h.0).fold(0., f64::max),
        variance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LosConfig, MaterialConfig};
    use approx::assert_relative_eq;

    fn building(min: (f64, f64), max: (f64, f64), height: f64) -> Building {
        Building {
            polygon: vec![
                Vertex::new_xy(min.0, min.1),
                Vertex::new_xy(max.0, min.1),
                Vertex::new_xy(max.0, max.1),
                Vertex::new_xy(min.0, max.1),
                Vertex::new_xy(min.0, min.1),
            ],
            height,
            roof_loss_db: 20.,
            floor_loss_db: 15.,
            outer_wall_loss_db: 10.,
        }
    }

    fn layer() -> BuildingLayer {
        let walls = vec![Wall {
            vertices: vec![Vertex::new_xy(100., -50.), Vertex::new_xy(100., 50.)],
            height: 3.,
            width: 0.2,
            loss_db: 4.,
        }];
        BuildingLayer::new(
            vec![building((-5., -5.), (5., 5.), 10.)],
            walls,
            &SpatialMapConfig::default(),
        )
        .unwrap()
    }

    fn materials() -> MaterialSet {
        MaterialSet::new(&[MaterialConfig {
            name: "metal".to_string(),
            transmission_loss_db: 12.,
        }])
    }

    fn car_shapes() -> Vec<MovingShapeConfig> {
        vec![MovingShapeConfig {
            shape_type: "Car".to_string(),
            length: 4.,
            width: 2.,
            height: 1.5,
            material: "metal".to_string(),
        }]
    }

    #[test]
    fn test_ray_through_building_hits_two_walls() {
        let layer = layer();
        let none = IgnoredNodeIds::default();
        let (points, loss_db) = layer.calculate_wall_collision_points(
            &Vertex::new(-20., 0., 1.),
            &Vertex::new(20., 0., 1.),
            &none,
        );
        assert_eq!(points.len(), 2);
        assert_relative_eq!(points[0].0.x, -5., epsilon = 1e-6);
        assert_relative_eq!(points[1].0.x, 5., epsilon = 1e-6);
        assert!(points.iter().all(|&(_, variant_id)| variant_id == 0));
        assert_relative_eq!(loss_db, 20.);
        let collisions =
            layer.collisions_between(&Vertex::new(-20., 0., 1.), &Vertex::new(20., 0., 1.), &none);
        let ts: Vec<f64> = collisions.keys().map(|t| t.into_inner()).collect();
        assert_relative_eq!(ts[0], 0.375, epsilon = 1e-6);
        assert_relative_eq!(ts[1], 0.625, epsilon = 1e-6);
        assert_eq!(
            layer.calculate_number_of_floors_and_walls_traversed(
                &Vertex::new(-20., 0., 1.),
                &Vertex::new(20., 0., 1.),
                &none
            ),
            (0, 2)
        );

        assert!(layer.positions_are_line_of_sight(
            &Vertex::new(-20., 50., 1.),
            &Vertex::new(20., 50., 1.),
            &none
        ));
    }

    #[test]
    fn test_vertical_ray_crosses_roof_and_floor() {
        let layer = layer();
        let p1 = Vertex::new(1., 2., -1.);
        let p2 = Vertex::new(1., 2., 20.);
        assert_relative_eq!(layer.calculate_total_wall_and_floor_loss_db(&p1, &p2), 35.);
        assert_eq!(layer.calculate_number_of_wall_roof_floor_interactions(&p1, &p2), 2);
        assert_eq!(
            layer.calculate_number_of_floors_and_walls_traversed(&p1, &p2, &IgnoredNodeIds::default()),
            (1, 0)
        );
    }

    #[test]
    fn test_free_standing_wall_and_heights() {
        let layer = layer();
        let (points, loss_db) = layer.calculate_wall_collision_points(
            &Vertex::new(90., 0., 1.),
            &Vertex::new(110., 0., 1.),
            &IgnoredNodeIds::default(),
        );
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].1, 1);
        assert_relative_eq!(loss_db, 4.);
        assert_eq!(layer.collision_point_height(&points[0]), Some(3.));
        assert_eq!(layer.collision_point_height(&(Vertex::zero(), 0)), Some(10.));
        assert_eq!(layer.collision_point_height(&(Vertex::zero(), INVALID_VARIANT_ID)), Some(0.));
        assert_eq!(layer.collision_point_height(&(Vertex::zero(), 7)), None);

        let statistics = layer.height_statistics();
        assert_relative_eq!(statistics.average, 6.5);
        assert_eq!(statistics.min, 3.);
        assert_eq!(statistics.max, 10.);
    }

    #[test]
    fn test_building_lookup_and_roof_crossings() {
        let layer = layer();
        assert_eq!(layer.building_id_at(&Vertex::new_xy(1., 1.)), Some(0));
        assert_eq!(layer.building_id_at(&Vertex::new_xy(30., 1.)), None);

        let crossings = layer.roof_crossings(&Vertex::new(-20., 1., 7.), &Vertex::new(20., 1., 3.));
        assert!(!crossings.is_empty());
        assert!(crossings
            .values()
            .all(|info| info.obstruction_type == ObstructionType::Roof));
        assert!(layer
            .roof_crossings(&Vertex::new(-20., 30., 0.), &Vertex::new(20., 30., 0.))
            .is_empty());
    }

    #[test]
    fn test_moving_object_lifecycle() {
        let mut layer = layer();
        layer.load_moving_shapes(&car_shapes()).unwrap();
        layer.add_moving_object(5, "CAR", &materials()).unwrap();

        let p1 = Vertex::new(20., 30., 1.);
        let p2 = Vertex::new(60., 30., 1.);
        let none = IgnoredNodeIds::default();
        assert!(!layer.has_collision(&p1, &p2, &none));

        let sample = MobilitySample::new(40., 30., 0.);
        assert!(layer.update_moving_object(5, &sample, 0.).unwrap());
        assert!(!layer.update_moving_object(5, &sample, 0.).unwrap());
        let (points, loss_db) = layer.calculate_wall_collision_points(&p1, &p2, &none);
        assert_eq!(points.len(), 2);
        assert_relative_eq!(loss_db, 12.);

        let mut ignored = IgnoredNodeIds::default();
        ignored.insert(5);
        assert!(layer.positions_are_line_of_sight(&p1, &p2, &ignored));

        let samples = vec![(5, MobilitySample::new(40., 80., 0.))];
        assert_eq!(layer.sync_moving_objects(&samples, 0.).unwrap(), 1);
        assert!(!layer.has_collision(&p1, &p2, &none));
        assert_eq!(layer.quad_tree().number_of_obbs(), 1);

        layer.remake_los_topology().unwrap();
        assert_eq!(layer.quad_tree().number_of_obbs(), 1);

        assert!(layer.remove_moving_object(5));
        assert!(!layer.quad_tree().contains_obb_of(5));
        assert!(!layer.remove_moving_object(5));
        assert!(layer.update_moving_object(5, &sample, 0.).is_err());
    }

    #[test]
    fn test_moving_object_errors() {
        let mut layer = layer();
        let mut shapes = car_shapes();
        layer.load_moving_shapes(&shapes).unwrap();
        shapes[0].shape_type = "car".to_string();
        assert!(layer.load_moving_shapes(&shapes).is_err());

        assert!(layer.add_moving_object(1, "truck", &materials()).is_err());
        assert!(layer.add_moving_object(1, "car", &MaterialSet::default()).is_err());
        layer.add_moving_object(1, "car", &materials()).unwrap();
        assert!(layer.add_moving_object(1, "car", &materials()).is_err());
    }

    #[test]
    fn test_open_footprint_keeps_outer_walls_only() {
        let mut open = building((20., -5.), (30., 5.), 10.);
        open.polygon.pop();
        let layer = BuildingLayer::new(
            vec![building((-5., -5.), (5., 5.), 10.), open],
            Vec::new(),
            &SpatialMapConfig::default(),
        )
        .unwrap();
        let none = IgnoredNodeIds::default();

        // The closed building still has its roof and floor.
        let (points, loss_db) =
            layer.calculate_wall_collision_points(&Vertex::new(1., 2., -1.), &Vertex::new(1., 2., 20.), &none);
        assert_eq!(points.len(), 2);
        assert_relative_eq!(loss_db, 35.);

        assert!(layer
            .calculate_wall_collision_points(&Vertex::new(25., 0., -1.), &Vertex::new(25., 0., 20.), &none)
            .0
            .is_empty());
        // Three of the four edges remain as walls.
        let (points, _) =
            layer.calculate_wall_collision_points(&Vertex::new(25., -20., 1.), &Vertex::new(25., 20., 1.), &none);
        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|&(_, variant_id)| variant_id == 1));
    }

    #[test]
    fn test_invalid_mesh_unit_is_rejected() {
        let config = LosConfig::from_json_str(r#"{ "spatial_map": { "mesh_unit_meters": 0 } }"#).unwrap();
        match BuildingLayer::new(Vec::new(), Vec::new(), &config.spatial_map) {
            Err(Error(ErrorKind::InvalidMeshUnit(_), _)) => (),
            Err(e) => panic!("unexpected error {}", e),
            Ok(_) => panic!("a zero mesh unit was accepted"),
        }
    }

    #[test]
    fn test_empty_layer() {
        let layer = BuildingLayer::new(Vec::new(), Vec::new(), &LosConfig::default().spatial_map).unwrap();
        assert_eq!(layer.quad_tree().number_of_polygons(), 0);
        assert!(!layer.has_collision(
            &Vertex::zero(),
            &Vertex::new(10., 10., 10.),
            &IgnoredNodeIds::default()
        ));
    }
}
