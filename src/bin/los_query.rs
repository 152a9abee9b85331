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

use error_chain::quick_main;
use gis_los::config::LosConfig;
use gis_los::errors::*;
use gis_los::road::{NlosAngleCalculator, NlosDistanceCalculator, NlosPathValueCalculator, RoadLosChecker};
use gis_los::scenario::Scenario;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use structopt::StructOpt;
use tracing::info;

#[derive(StructOpt, Debug)]
#[structopt(
    name = "los_query",
    about = "Traces the rays of a scenario through its buildings, walls and moving objects."
)]
struct CommandlineArguments {
    /// Scenario JSON with buildings, walls, roads, moving objects and rays.
    #[structopt(parse(from_os_str))]
    scenario: PathBuf,

    /// Config JSON with materials, moving shapes and road parameters. Defaults are used if unset.
    #[structopt(long = "config", parse(from_os_str))]
    config: Option<PathBuf>,

    /// Score diffraction paths by their turning angles instead of their length.
    #[structopt(long = "angle_value")]
    angle_value: bool,

    /// Print the line-of-sight relation of every road pair.
    #[structopt(long = "dump_relations")]
    dump_relations: bool,
}

fn run() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    let args = CommandlineArguments::from_args();

    let config = match &args.config {
        Some(path) => LosConfig::from_file(path)?,
        None => LosConfig::default(),
    };
    let scenario = Scenario::from_file(&args.scenario)?;

    let start = Instant::now();
    let building_layer = scenario.building_layer(&config)?;
    info!(
        polygons = building_layer.quad_tree().number_of_polygons(),
        cells = building_layer.quad_tree().number_of_cells(),
        elapsed = ?start.elapsed(),
        "built building layer"
    );

    for (index, ray) in scenario.rays.iter().enumerate() {
        let collisions = building_layer.collisions_between(&ray.from, &ray.to, &ray.ignored_node_ids());
        println!(
            "Ray {}: ({}, {}, {}) -> ({}, {}, {})",
            index, ray.from.x, ray.from.y, ray.from.z, ray.to.x, ray.to.y, ray.to.z
        );
        let mut total_loss_db = 0.;
        for (t, info) in &collisions {
            let t = t.into_inner();
            let position = ray.from + (ray.to - ray.from) * t;
            println!(
                "  t = {:.6}  ({:.3}, {:.3}, {:.3})  variant {}  {:?}  {} dB",
                t,
                position.x,
                position.y,
                position.z,
                info.variant_id,
                info.obstruction_type,
                info.shielding_loss_db
            );
            total_loss_db += info.shielding_loss_db;
        }
        println!(
            "  {} collisions, total loss {} dB",
            collisions.len(),
            total_loss_db
        );
    }

    if scenario.roads.is_empty() {
        return Ok(());
    }

    let start = Instant::now();
    let road_layer = Arc::new(scenario.road_layer(&config)?);
    let calculator: Box<dyn NlosPathValueCalculator> = if args.angle_value {
        Box::new(NlosAngleCalculator)
    } else {
        Box::new(NlosDistanceCalculator)
    };
    let mut checker = RoadLosChecker::new(road_layer, calculator, &config.road_los);
    checker.make_los_relation()?;
    info!(
        roads = scenario.roads.len(),
        relations = checker.relations().len(),
        elapsed = ?start.elapsed(),
        "built road relations"
    );

    for (index, ray) in scenario.rays.iter().enumerate() {
        println!(
            "Ray {}: roads see each other: {}",
            index,
            checker.positions_are_line_of_sight(&ray.from, &ray.to)
        );
    }
    if args.dump_relations {
        print!("{}", checker.output_los_relation()?);
    }
    Ok(())
}

quick_main!(run);
