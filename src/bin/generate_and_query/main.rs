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

use error_chain::{bail, quick_main};
use gis_los::building::BuildingLayer;
use gis_los::config::{RoadLosConfig, SpatialMapConfig};
use gis_los::errors::*;
use gis_los::geometry::Vertex;
use gis_los::los::IgnoredNodeIds;
use gis_los::road::{NlosDistanceCalculator, RoadLayer, RoadLosChecker, RoadLosRelationType};
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use structopt::StructOpt;

mod random_city;
use crate::random_city::{RandomCity, RandomRays};

#[derive(StructOpt, Debug)]
#[structopt(
    name = "generate_and_query",
    about = "Generates a random city and measures line-of-sight query throughput."
)]
struct CommandlineArguments {
    /// The city is a square grid of this many blocks per side.
    #[structopt(long = "blocks_per_side", default_value = "20")]
    blocks_per_side: usize,

    /// Edge length of one block in meters.
    #[structopt(long = "block_size", default_value = "80.0")]
    block_size: f64,

    #[structopt(long = "street_width", default_value = "20.0")]
    street_width: f64,

    /// Building heights are drawn up to this value.
    #[structopt(long = "max_height", default_value = "60.0")]
    max_height: f64,

    /// The number of random rays to trace.
    #[structopt(long = "num_rays", default_value = "100000")]
    num_rays: usize,

    /// The number of threads used for tracing rays. 0 lets rayon decide.
    #[structopt(long = "num_threads", default_value = "0")]
    num_threads: usize,

    #[structopt(long = "seed", default_value = "80293751234")]
    seed: u64,

    /// Also build the road line-of-sight relation of the street grid.
    #[structopt(long = "with_roads")]
    with_roads: bool,
}

fn run() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    let args = CommandlineArguments::from_args();
    if args.blocks_per_side == 0 || args.block_size <= 0. || args.max_height <= 0. {
        bail!("blocks_per_side, block_size and max_height must be positive.");
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(args.num_threads)
        .build_global()
        .chain_err(|| "Could not build thread pool.")?;

    let mut city = RandomCity::new(
        args.seed,
        args.blocks_per_side,
        args.block_size,
        args.street_width,
        args.max_height,
    );
    let buildings = city.buildings();
    let num_buildings = buildings.len();

    let start_build = Instant::now();
    let layer = BuildingLayer::new(buildings, Vec::new(), &SpatialMapConfig::default())?;
    let elapsed_build = start_build.elapsed();

    let rays: Vec<(Vertex, Vertex)> =
        RandomRays::new(args.seed.wrapping_add(1), city.half_extent(), args.max_height)
            .take(args.num_rays)
            .collect();
    let none = IgnoredNodeIds::default();

    let start_query = Instant::now();
    let (num_blocked, total_loss_db) = rays
        .par_iter()
        .map(|(p1, p2)| {
            let (points, loss_db) = layer.calculate_wall_collision_points(p1, p2, &none);
            (if points.is_empty() { 0 } else { 1 }, loss_db)
        })
        .reduce(|| (0_usize, 0.), |a, b| (a.0 + b.0, a.1 + b.1));
    let elapsed_query = start_query.elapsed();

    println!("###################################################");
    println!(
        "Building layer ({} buildings, {} triangles, {} quad-tree cells) took {:?}",
        num_buildings,
        layer.quad_tree().number_of_polygons(),
        layer.quad_tree().number_of_cells(),
        elapsed_build
    );
    println!(
        "Tracing {} rays ({} threads) took {:?}, {} blocked, mean loss {:.2} dB",
        rays.len(),
        rayon::current_num_threads(),
        elapsed_query,
        num_blocked,
        total_loss_db / rays.len().max(1) as f64
    );

    if !args.with_roads {
        return Ok(());
    }

    let (intersections, roads) = city.street_grid();
    let num_roads = roads.len();
    let road_layer = Arc::new(RoadLayer::new(
        intersections,
        roads,
        &SpatialMapConfig::default(),
    )?);
    let start_relation = Instant::now();
    let mut checker = RoadLosChecker::new(
        road_layer,
        Box::new(NlosDistanceCalculator),
        &RoadLosConfig::default(),
    );
    checker.make_los_relation()?;
    let elapsed_relation = start_relation.elapsed();

    let count = |relation_type: RoadLosRelationType| {
        checker
            .relations()
            .values()
            .filter(|relation| relation.relation_type == relation_type)
            .count()
    };
    let start_road_query = Instant::now();
    let num_road_los = rays
        .par_iter()
        .filter(|(p1, p2)| checker.positions_are_line_of_sight(p1, p2))
        .count();
    let elapsed_road_query = start_road_query.elapsed();

    println!(
        "Road relations ({} roads, {} LoS, {} NLoS) took {:?}",
        num_roads,
        count(RoadLosRelationType::Los),
        count(RoadLosRelationType::Nlos),
        elapsed_relation
    );
    println!(
        "Road lookups for {} ray end points took {:?}, {} in line of sight",
        rays.len(),
        elapsed_road_query,
        num_road_los
    );
    Ok(())
}

quick_main!(run);
