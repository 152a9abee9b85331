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
//! A JSON description of a city and the rays to trace through it.

use crate::building::{Building, BuildingLayer, MaterialSet, Wall};
use crate::config::LosConfig;
use crate::errors::*;
use crate::geometry::Vertex;
use crate::los::{IgnoredNodeIds, MobilitySample, NodeIdType};
use crate::road::{Intersection, Road, RoadLayer};
use serde_derive::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// A building footprint. Surfaces without a material use the config defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingDefinition {
    pub polygon: Vec<Vertex>,
    pub height: f64,
    #[serde(default)]
    pub roof_material: Option<String>,
    #[serde(default)]
    pub floor_material: Option<String>,
    #[serde(default)]
    pub outer_wall_material: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallDefinition {
    pub vertices: Vec<Vertex>,
    pub height: f64,
    #[serde(default)]
    pub width: f64,
    pub material: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingObjectDefinition {
    pub node_id: NodeIdType,
    pub shape_type: String,
    pub sample: MobilitySample,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RayDefinition {
    pub from: Vertex,
    pub to: Vertex,
    /// Moving objects that never block this ray, typically the two end nodes.
    #[serde(default)]
    pub ignored_node_ids: Vec<NodeIdType>,
}

impl RayDefinition {
    pub fn ignored_node_ids(&self) -> IgnoredNodeIds {
        self.ignored_node_ids.iter().cloned().collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub ground_elevation: f64,
    pub buildings: Vec<BuildingDefinition>,
    pub walls: Vec<WallDefinition>,
    pub intersections: Vec<Intersection>,
    pub roads: Vec<Road>,
    pub moving_objects: Vec<MovingObjectDefinition>,
    pub rays: Vec<RayDefinition>,
}

impl Scenario {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).chain_err(|| format!("Could not open {}", path.display()))?;
        let scenario: Scenario = serde_json::from_reader(BufReader::new(file))
            .chain_err(|| format!("Could not parse {}", path.display()))?;
        info!(
            path = %path.display(),
            buildings = scenario.buildings.len(),
            roads = scenario.roads.len(),
            rays = scenario.rays.len(),
            "loaded scenario"
        );
        Ok(scenario)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resolves material names to losses.
    pub fn buildings(&self, config: &LosConfig, materials: &MaterialSet) -> Result<Vec<Building>> {
        let loss_of = |name: &Option<String>, default: &str| {
            materials.transmission_loss_db(name.as_ref().map_or(default, String::as_str))
        };
        self.buildings
            .iter()
            .map(|definition| {
                Ok(Building {
                    polygon: definition.polygon.clone(),
                    height: definition.height,
                    roof_loss_db: loss_of(&definition.roof_material, config.roof_material.as_str())?,
                    floor_loss_db: loss_of(&definition.floor_material, config.floor_material.as_str())?,
                    outer_wall_loss_db: loss_of(
                        &definition.outer_wall_material,
                        config.outer_wall_material.as_str(),
                    )?,
                })
            })
            .collect()
    }

    pub fn walls(&self, materials: &MaterialSet) -> Result<Vec<Wall>> {
        self.walls
            .iter()
            .map(|definition| {
                Ok(Wall {
                    vertices: definition.vertices.clone(),
                    height: definition.height,
                    width: definition.width,
                    loss_db: materials.transmission_loss_db(&definition.material)?,
                })
            })
            .collect()
    }

    /// Builds the triangulated layer and places every moving object at its sample.
    pub fn building_layer(&self, config: &LosConfig) -> Result<BuildingLayer> {
        let materials = MaterialSet::new(&config.materials);
        let mut layer = BuildingLayer::new(
            self.buildings(config, &materials)?,
            self.walls(&materials)?,
            &config.spatial_map,
        )?;
        layer.load_moving_shapes(&config.moving_shapes)?;
        for object in &self.moving_objects {
            layer.add_moving_object(object.node_id, &object.shape_type, &materials)?;
            layer.update_moving_object(object.node_id, &object.sample, self.ground_elevation)?;
        }
        Ok(layer)
    }

    pub fn road_layer(&self, config: &LosConfig) -> Result<RoadLayer> {
        RoadLayer::new(
            self.intersections.clone(),
            self.roads.clone(),
            &config.spatial_map,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempdir::TempDir;

    const CONFIG: &str = r#"{
        "materials": [
            { "name": "roof", "transmission_loss_db": 20 },
            { "name": "floor", "transmission_loss_db": 15 },
            { "name": "outer_wall", "transmission_loss_db": 10 },
            { "name": "glass", "transmission_loss_db": 3 },
            { "name": "metal", "transmission_loss_db": 12 }
        ],
        "moving_shapes": [
            { "shape_type": "Car", "length": 4, "width": 2, "height": 1.5, "material": "metal" }
        ]
    }"#;

    const SCENARIO: &str = r#"{
        "buildings": [
            {
                "polygon": [
                    { "x": 0, "y": 0 }, { "x": 10, "y": 0 }, { "x": 10, "y": 10 },
                    { "x": 0, "y": 10 }, { "x": 0, "y": 0 }
                ],
                "height": 10,
                "outer_wall_material": "glass"
            }
        ],
        "walls": [
            {
                "vertices": [{ "x": 100, "y": -5 }, { "x": 100, "y": 5 }],
                "height": 3,
                "material": "outer_wall"
            }
        ],
        "intersections": [
            { "id": 0, "position": { "x": -50, "y": -20 } },
            { "id": 1, "position": { "x": 150, "y": -20 } }
        ],
        "roads": [
            {
                "id": 0,
                "vertices": [{ "x": -50, "y": -20 }, { "x": 150, "y": -20 }],
                "width": 10,
                "start_intersection_id": 0,
                "end_intersection_id": 1
            }
        ],
        "moving_objects": [
            { "node_id": 7, "shape_type": "car", "sample": { "x": 50, "y": -20, "height_from_ground": 0 } }
        ],
        "rays": [
            { "from": { "x": -5, "y": 3, "z": 2 }, "to": { "x": 120, "y": 3, "z": 2 } },
            { "from": { "x": 40, "y": -20, "z": 1 }, "to": { "x": 60, "y": -20, "z": 1 }, "ignored_node_ids": [7] }
        ]
    }"#;

    #[test]
    fn test_default_materials_are_resolved() {
        let config = LosConfig::from_json_str(CONFIG).unwrap();
        let scenario = Scenario::from_json_str(SCENARIO).unwrap();
        let materials = MaterialSet::new(&config.materials);
        let buildings = scenario.buildings(&config, &materials).unwrap();
        assert_eq!(buildings[0].roof_loss_db, 20.);
        assert_eq!(buildings[0].floor_loss_db, 15.);
        assert_eq!(buildings[0].outer_wall_loss_db, 3.);
        assert_eq!(scenario.walls(&materials).unwrap()[0].loss_db, 10.);
    }

    #[test]
    fn test_rays_through_scenario() {
        let config = LosConfig::from_json_str(CONFIG).unwrap();
        let scenario = Scenario::from_json_str(SCENARIO).unwrap();
        let layer = scenario.building_layer(&config).unwrap();

        // Two glass walls of the building, then the free standing wall.
        let ray = &scenario.rays[0];
        let (points, loss_db) = layer.calculate_wall_collision_points(&ray.from, &ray.to, &ray.ignored_node_ids());
        assert_eq!(points.len(), 3);
        assert_eq!(loss_db, 16.);

        let ray = &scenario.rays[1];
        assert!(layer.positions_are_line_of_sight(&ray.from, &ray.to, &ray.ignored_node_ids()));
        assert!(!layer.positions_are_line_of_sight(&ray.from, &ray.to, &IgnoredNodeIds::default()));

        let roads = scenario.road_layer(&config).unwrap();
        assert_eq!(roads.road_ids_at(&Vertex::new_xy(50., -20.)), vec![0]);
    }

    #[test]
    fn test_unknown_material() {
        let config = LosConfig::from_json_str(r#"{ "materials": [] }"#).unwrap();
        let scenario = Scenario::from_json_str(SCENARIO).unwrap();
        match scenario.building_layer(&config) {
            Err(Error(ErrorKind::UnknownMaterial(name), _)) => assert_eq!(name, "roof"),
            other => panic!("unexpected result {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_from_file() {
        let dir = TempDir::new("scenario").unwrap();
        let path = dir.path().join("scenario.json");
        File::create(&path)
            .unwrap()
            .write_all(SCENARIO.as_bytes())
            .unwrap();
        let scenario = Scenario::from_file(&path).unwrap();
        assert_eq!(scenario.rays.len(), 2);
        assert_eq!(scenario.moving_objects[0].node_id, 7);
        assert!(Scenario::from_file(dir.path().join("missing.json")).is_err());
    }
}
