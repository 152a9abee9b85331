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

use super::*;
use crate::config::{RoadLosConfig, SpatialMapConfig};
use crate::errors::{Error, ErrorKind};
use crate::geometry::Vertex;
use approx::assert_relative_eq;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use std::sync::Arc;

const ROAD_WIDTH: f64 = 10.;

fn layer(positions: &[(f64, f64)], ends: &[(IntersectionId, IntersectionId)]) -> Arc<RoadLayer> {
    let intersections: Vec<Intersection> = positions
        .iter()
        .enumerate()
        .map(|(id, &(x, y))| Intersection::new(id, Vertex::new_xy(x, y)))
        .collect();
    let roads = ends
        .iter()
        .enumerate()
        .map(|(id, &(start, end))| {
            let vertices = vec![intersections[start].position, intersections[end].position];
            Road::new(id, vertices, ROAD_WIDTH, start, end)
        })
        .collect();
    Arc::new(RoadLayer::new(intersections, roads, &SpatialMapConfig::default()).unwrap())
}

// Two streets crossing at the origin. Roads 0 and 1 run along x, 2 and 3 along y.
fn cross_layer() -> Arc<RoadLayer> {
    layer(
        &[(0., 0.), (-100., 0.), (100., 0.), (0., 100.), (0., -100.)],
        &[(0, 1), (0, 2), (0, 3), (0, 4)],
    )
}

// Roads 0 and 1 continue each other along x, 2 and 3 turn up at (200, 0).
fn corner_layer() -> Arc<RoadLayer> {
    layer(
        &[(0., 0.), (100., 0.), (200., 0.), (200., 100.), (200., 200.)],
        &[(0, 1), (1, 2), (2, 3), (3, 4)],
    )
}

// A staircase: along x, up along y, along x again.
fn staircase_layer() -> Arc<RoadLayer> {
    layer(
        &[(0., 0.), (100., 0.), (100., 100.), (200., 100.)],
        &[(0, 1), (1, 2), (2, 3)],
    )
}

fn checker(road_layer: Arc<RoadLayer>, config: RoadLosConfig) -> RoadLosChecker {
    let mut checker = RoadLosChecker::new(road_layer, Box::new(NlosDistanceCalculator), &config);
    checker.make_los_relation().unwrap();
    checker
}

fn relation_type(checker: &RoadLosChecker, road_id1: RoadId, road_id2: RoadId) -> RoadLosRelationType {
    checker.los_relation(road_id1, road_id2).relation_type
}

#[test]
fn test_normalized_abs_radians_folds_opposite_directions() {
    assert_relative_eq!(normalized_abs_radians(0.1), 0.1);
    assert_relative_eq!(normalized_abs_radians(-0.1), 0.1);
    assert_relative_eq!(normalized_abs_radians(std::f64::consts::PI - 0.1), 0.1, epsilon = 1e-12);
    assert_relative_eq!(normalized_abs_radians(FRAC_PI_2), FRAC_PI_2);
}

#[test]
fn test_road_direction_and_other_side() {
    let road = Road::new(0, vec![Vertex::zero(), Vertex::new_xy(10., 10.)], 4., 3, 7);
    assert_relative_eq!(road.direction_radians(), FRAC_PI_4);
    let reversed = Road::new(1, vec![Vertex::new_xy(10., 10.), Vertex::zero()], 4., 7, 3);
    assert_relative_eq!(reversed.direction_radians(), FRAC_PI_4);
    assert_eq!(road.other_side_intersection_id(3), 7);
    assert_eq!(road.other_side_intersection_id(7), 3);
    assert!(road.contains(&Vertex::new_xy(5., 6.)));
    assert!(!road.contains(&Vertex::new_xy(5., 9.)));
}

#[test]
fn test_layer_wires_connections() {
    let layer = cross_layer();
    assert_eq!(layer.intersections()[0].connected_road_ids, vec![0, 1, 2, 3]);
    assert_eq!(layer.intersections()[3].connected_road_ids, vec![2]);
    assert_eq!(layer.max_road_width(), ROAD_WIDTH);
    assert!(layer.road(4).is_err());
    assert!(layer.intersection(5).is_err());
}

#[test]
fn test_road_ids_at() {
    let layer = cross_layer();
    assert_eq!(layer.road_ids_at(&Vertex::new_xy(-50., 1.)), vec![0]);
    assert_eq!(layer.road_ids_at(&Vertex::new_xy(2., 60.)), vec![2]);
    assert_eq!(layer.road_ids_at(&Vertex::new_xy(1., 1.)), vec![0, 1, 2, 3]);
    assert!(layer.road_ids_at(&Vertex::new_xy(50., 50.)).is_empty());
}

#[test]
fn test_invalid_ids_are_rejected() {
    let intersections = vec![
        Intersection::new(0, Vertex::zero()),
        Intersection::new(1, Vertex::new_xy(10., 0.)),
    ];
    let dangling = vec![Road::new(0, vec![Vertex::zero(), Vertex::new_xy(10., 0.)], 4., 0, 2)];
    match RoadLayer::new(intersections.clone(), dangling, &SpatialMapConfig::default()) {
        Err(Error(ErrorKind::UnknownIntersection(2), _)) => (),
        Err(e) => panic!("unexpected error {}", e),
        Ok(_) => panic!("dangling road was accepted"),
    }
    let misnumbered = vec![Road::new(3, vec![Vertex::zero(), Vertex::new_xy(10., 0.)], 4., 0, 1)];
    assert!(RoadLayer::new(intersections, misnumbered, &SpatialMapConfig::default()).is_err());
}

#[test]
fn test_collinear_roads_are_line_of_sight() {
    let checker = checker(cross_layer(), RoadLosConfig::default());
    assert_eq!(relation_type(&checker, 0, 1), RoadLosRelationType::Los);
    assert_eq!(relation_type(&checker, 1, 0), RoadLosRelationType::Los);
    assert_eq!(relation_type(&checker, 2, 3), RoadLosRelationType::Los);
    assert_eq!(relation_type(&checker, 0, 0), RoadLosRelationType::Los);
}

#[test]
fn test_crossing_roads_turn_one_corner() {
    let checker = checker(cross_layer(), RoadLosConfig::default());
    let relation = checker.los_relation(0, 2);
    assert_eq!(relation.relation_type, RoadLosRelationType::Nlos);
    assert_eq!(relation.nlos_paths.len(), 1);
    let path = &relation.nlos_paths[&(0, 0)];
    assert_eq!(path.road_ids(), &[0, 2]);
    assert_eq!(path.intersection_ids(), &[0, 0, 0]);
    assert_relative_eq!(path.path_value, 0.);
    assert_eq!(relation_type(&checker, 3, 1), RoadLosRelationType::Nlos);
}

#[test]
fn test_paths_longer_than_the_limit_are_out_of_nlos() {
    let near = checker(corner_layer(), RoadLosConfig::default());
    let path = &near.los_relation(0, 3).nlos_paths[&(1, 3)];
    assert_eq!(path.intersection_ids(), &[1, 2, 3]);
    assert_relative_eq!(path.path_value, 200.);
    assert_relative_eq!(near.los_relation(0, 2).nlos_paths[&(1, 2)].path_value, 100.);

    let config = RoadLosConfig {
        max_nlos_distance: 150.,
        ..RoadLosConfig::default()
    };
    let far = checker(corner_layer(), config);
    assert_eq!(relation_type(&far, 0, 2), RoadLosRelationType::Nlos);
    assert_eq!(relation_type(&far, 0, 3), RoadLosRelationType::OutOfNlos);
    assert!(far.los_relation(0, 3).nlos_paths.is_empty());
}

#[test]
fn test_second_corner_needs_diffraction_count_two() {
    let one_corner = checker(
        staircase_layer(),
        RoadLosConfig {
            max_diffraction_count: 1,
            ..RoadLosConfig::default()
        },
    );
    assert_eq!(relation_type(&one_corner, 0, 1), RoadLosRelationType::Nlos);
    assert_eq!(relation_type(&one_corner, 0, 2), RoadLosRelationType::OutOfNlos);

    let two_corners = checker(staircase_layer(), RoadLosConfig::default());
    let relation = two_corners.los_relation(0, 2);
    assert_eq!(relation.relation_type, RoadLosRelationType::Nlos);
    let path = &relation.nlos_paths[&(1, 2)];
    assert_eq!(path.road_ids(), &[0, 1, 2]);
    assert_eq!(path.intersection_ids(), &[1, 1, 2, 2]);
    assert_eq!(path.nlos_count(), 2);
    assert_relative_eq!(path.path_value, 100.);
    assert_eq!(
        two_corners.los_relation(2, 0).nlos_paths[&(2, 1)].road_ids(),
        &[2, 1, 0]
    );
}

#[test]
fn test_path_distance_helpers() {
    let checker = checker(staircase_layer(), RoadLosConfig::default());
    let path = checker.los_relation(0, 2).nlos_paths[&(1, 2)].clone();
    let start = Vertex::new_xy(50., 3.);
    let end = Vertex::new_xy(150., 104.);

    assert_relative_eq!(checker.calculate_nlos_point_radians(&path, 0).unwrap(), FRAC_PI_2);
    assert_eq!(
        checker.calculate_nlos_points(&path, 2).unwrap(),
        vec![
            Vertex::new_xy(100., 100.),
            Vertex::new_xy(100., 100.),
            Vertex::new_xy(100., 0.),
            Vertex::new_xy(100., 0.),
        ]
    );
    assert_relative_eq!(
        checker
            .calculate_nlos_point_to_start_point_center_distance(&path, 0, &start)
            .unwrap(),
        50.
    );
    assert_relative_eq!(
        checker.calculate_distance_to_last_nlos_point(&path, 0, &start).unwrap(),
        150.
    );
    assert_relative_eq!(
        checker
            .calculate_nlos_point_to_end_point_center_distance(&path, 0, &end)
            .unwrap(),
        150.
    );
    assert_relative_eq!(
        checker
            .calculate_start_point_to_end_point_center_distance(&path, 0, &start, &end)
            .unwrap(),
        200.
    );

    assert!(checker.is_complete_nlos_path(&path, 0, &start, &end).unwrap());
    let at_corner = Vertex::new_xy(98., 1.);
    assert!(!checker.is_complete_nlos_path(&path, 0, &at_corner, &end).unwrap());
    assert!(checker.calculate_nlos_points(&path, 1).is_err());
}

#[test]
fn test_angle_calculator_prefers_straighter_paths() {
    let road_layer = staircase_layer();
    let path = NlosPathData::with_nlos_road(0, 2, 1, 2, 1, 2, 1);
    assert_relative_eq!(NlosAngleCalculator.nlos_path_value(&road_layer, &path), 2. * FRAC_PI_2);
    let corner = NlosPathData::new(0, 1, 1, 1, 1);
    assert_relative_eq!(NlosAngleCalculator.nlos_path_value(&road_layer, &corner), FRAC_PI_2);
    assert_relative_eq!(NlosDistanceCalculator.nlos_path_value(&road_layer, &path), 100.);
}

#[test]
fn test_positions_are_line_of_sight() {
    let checker = checker(cross_layer(), RoadLosConfig::default());
    assert!(checker.positions_are_line_of_sight(&Vertex::new_xy(-50., 1.), &Vertex::new_xy(50., -1.)));
    assert!(!checker.positions_are_line_of_sight(&Vertex::new_xy(-50., 1.), &Vertex::new_xy(1., 60.)));
    assert!(!checker.positions_are_line_of_sight(&Vertex::new_xy(50., 50.), &Vertex::new_xy(50., -1.)));
}

#[test]
fn test_output_los_relation() {
    let checker = checker(cross_layer(), RoadLosConfig::default());
    let table = checker.output_los_relation().unwrap();
    assert!(table.contains("0(0,0)(-100,0), 1(0,0)(100,0):LoS\n"));
    assert!(table.contains("0(0,0)(-100,0), 2(0,0)(0,100):NLoS  - Path0(Road,0,2,Intersection,0(0,0),0(0,0),0(0,0))\n"));
    assert_eq!(table.lines().count(), checker.relations().len());
}

// Road 0 runs along x, road 1 continues it turned left by `radians`.
fn bend_layer(radians: f64) -> Arc<RoadLayer> {
    layer(
        &[(0., 0.), (100., 0.), (200., 100. * radians.tan())],
        &[(0, 1), (1, 2)],
    )
}

#[test]
fn test_los_threshold_boundary() {
    let config = RoadLosConfig::default();
    let threshold = config.los_threshold_radians();

    let just_under = checker(bend_layer(threshold * (1. - 1e-9)), config.clone());
    assert_eq!(relation_type(&just_under, 0, 1), RoadLosRelationType::Los);
    assert_eq!(relation_type(&just_under, 1, 0), RoadLosRelationType::Los);

    let road_layer = bend_layer(threshold);
    assert_eq!(road_layer.roads()[1].direction_radians(), threshold);
    let at_threshold = checker(road_layer, config);
    assert_eq!(relation_type(&at_threshold, 0, 1), RoadLosRelationType::Nlos);
    assert_eq!(relation_type(&at_threshold, 1, 0), RoadLosRelationType::Nlos);
}

#[test]
fn test_roads_without_two_vertices_are_skipped() {
    let road_layer = |middle: Option<Vertex>| {
        let intersections = vec![
            Intersection::new(0, Vertex::new_xy(0., 0.)),
            Intersection::new(1, Vertex::new_xy(100., 0.)),
            Intersection::new(2, Vertex::new_xy(100., 100.)),
        ];
        let mut vertices = vec![intersections[1].position, intersections[2].position];
        if let Some(middle) = middle {
            vertices.insert(1, middle);
        }
        let roads = vec![
            Road::new(0, vec![intersections[0].position, intersections[1].position], ROAD_WIDTH, 0, 1),
            Road::new(1, vertices, ROAD_WIDTH, 1, 2),
        ];
        Arc::new(RoadLayer::new(intersections, roads, &SpatialMapConfig::default()).unwrap())
    };

    let straight = checker(road_layer(None), RoadLosConfig::default());
    assert_eq!(relation_type(&straight, 0, 1), RoadLosRelationType::Nlos);

    let bent = checker(road_layer(Some(Vertex::new_xy(100., 50.))), RoadLosConfig::default());
    assert_eq!(bent.road_layer().roads()[1].number_of_vertices(), 3);
    assert_eq!(relation_type(&bent, 0, 1), RoadLosRelationType::OutOfNlos);
    assert_eq!(relation_type(&bent, 1, 0), RoadLosRelationType::OutOfNlos);
    assert!(bent.los_relation(0, 1).nlos_paths.is_empty());
    assert!(bent.relations().keys().all(|&(road_id1, road_id2)| road_id1 != 1 && road_id2 != 1));
    assert_eq!(relation_type(&bent, 0, 0), RoadLosRelationType::Los);
}
