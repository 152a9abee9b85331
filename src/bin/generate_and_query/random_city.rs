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

use gis_los::building::Building;
use gis_los::geometry::Vertex;
use gis_los::road::{Intersection, Road};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ROOF_LOSS_DB: f64 = 20.;
const FLOOR_LOSS_DB: f64 = 15.;
const OUTER_WALL_LOSS_DB: f64 = 10.;

/// A square grid of blocks centered on the origin, one building per block and a street around
/// every block.
pub struct RandomCity {
    rng: StdRng,
    blocks_per_side: usize,
    block_size: f64,
    street_width: f64,
    min_height: f64,
    max_height: f64,
}

impl RandomCity {
    pub fn new(
        seed: u64,
        blocks_per_side: usize,
        block_size: f64,
        street_width: f64,
        max_height: f64,
    ) -> Self {
        RandomCity {
            rng: StdRng::seed_from_u64(seed),
            blocks_per_side,
            block_size,
            street_width,
            min_height: (max_height * 0.1).min(5.),
            max_height,
        }
    }

    fn pitch(&self) -> f64 {
        self.block_size + self.street_width
    }

    pub fn half_extent(&self) -> f64 {
        (self.blocks_per_side as f64 * self.pitch() + self.street_width) * 0.5
    }

    // Center line of the k-th street along one axis.
    fn street_center(&self, k: usize) -> f64 {
        k as f64 * self.pitch() + self.street_width * 0.5 - self.half_extent()
    }

    /// Buildings are inset into their block by a random margin.
    pub fn buildings(&mut self) -> Vec<Building> {
        let mut buildings = Vec::with_capacity(self.blocks_per_side * self.blocks_per_side);
        for i in 0..self.blocks_per_side {
            for j in 0..self.blocks_per_side {
                let min_x = self.street_center(i) + self.street_width * 0.5;
                let min_y = self.street_center(j) + self.street_width * 0.5;
                let inset = self.rng.gen_range(0., self.block_size * 0.2);
                let (x0, y0) = (min_x + inset, min_y + inset);
                let (x1, y1) = (min_x + self.block_size - inset, min_y + self.block_size - inset);
                let polygon = vec![
                    Vertex::new_xy(x0, y0),
                    Vertex::new_xy(x1, y0),
                    Vertex::new_xy(x1, y1),
                    Vertex::new_xy(x0, y1),
                    Vertex::new_xy(x0, y0),
                ];
                buildings.push(Building {
                    polygon,
                    height: self.rng.gen_range(self.min_height, self.max_height),
                    roof_loss_db: ROOF_LOSS_DB,
                    floor_loss_db: FLOOR_LOSS_DB,
                    outer_wall_loss_db: OUTER_WALL_LOSS_DB,
                });
            }
        }
        buildings
    }

    /// One intersection per street crossing and one straight road per street segment.
    pub fn street_grid(&self) -> (Vec<Intersection>, Vec<Road>) {
        let n = self.blocks_per_side + 1;
        let intersection_id = |i: usize, j: usize| j * n + i;

        let mut intersections = Vec::with_capacity(n * n);
        for j in 0..n {
            for i in 0..n {
                let position = Vertex::new_xy(self.street_center(i), self.street_center(j));
                intersections.push(Intersection::new(intersection_id(i, j), position));
            }
        }

        let mut roads = Vec::with_capacity(2 * n * (n - 1));
        for j in 0..n {
            for i in 0..n {
                let from = intersection_id(i, j);
                let mut neighbors = Vec::with_capacity(2);
                if i + 1 < n {
                    neighbors.push(intersection_id(i + 1, j));
                }
                if j + 1 < n {
                    neighbors.push(intersection_id(i, j + 1));
                }
                for to in neighbors {
                    let vertices = vec![intersections[from].position, intersections[to].position];
                    roads.push(Road::new(roads.len(), vertices, self.street_width, from, to));
                }
            }
        }
        (intersections, roads)
    }
}

/// Endless random segments between points inside the city, from street level up to twice the
/// highest building.
pub struct RandomRays {
    rng: StdRng,
    half_extent: f64,
    max_z: f64,
}

impl RandomRays {
    pub fn new(seed: u64, half_extent: f64, max_height: f64) -> Self {
        RandomRays {
            rng: StdRng::seed_from_u64(seed),
            half_extent,
            max_z: 2. * max_height,
        }
    }

    fn next_position(&mut self) -> Vertex {
        Vertex::new(
            self.rng.gen_range(-self.half_extent, self.half_extent),
            self.rng.gen_range(-self.half_extent, self.half_extent),
            self.rng.gen_range(1.5, self.max_z),
        )
    }
}

impl Iterator for RandomRays {
    type Item = (Vertex, Vertex);

    fn next(&mut self) -> Option<Self::Item> {
        Some((self.next_position(), self.next_position()))
    }
}
