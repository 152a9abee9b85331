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

//! Ear-clipping triangulation of closed planar polygons.
//!
//! Ear candidates are tried starting from the vertex farthest away from the polygon's first
//! vertex. That vertex is always convex, so its winding is the winding of the whole polygon and
//! every ear must share it. All emitted triangles are counter-clockwise seen from +z.

use super::algorithms::{is_closed_polygon, squared_xy_distance};
use super::triangle::{cross_product_direction, is_inside_of_the_triangle, CrossProductDirection};
use super::{Triangle, Vertex};
use crate::errors::*;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use tracing::warn;

/// How a triangulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriangulationOutcome {
    Complete,
    /// Two non-consecutive vertices share a planar position. No triangles were emitted.
    Degenerate,
    /// No valid ear was found. The triangles emitted so far are kept.
    NoEarFound,
}

#[derive(Debug, Clone)]
pub struct Triangulation {
    pub triangles: Vec<Triangle>,
    pub outcome: TriangulationOutcome,
}

impl Triangulation {
    fn complete(triangles: Vec<Triangle>) -> Self {
        Triangulation {
            triangles,
            outcome: TriangulationOutcome::Complete,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.outcome == TriangulationOutcome::Complete
    }

    /// Turns both failure outcomes into errors.
    pub fn into_result(self) -> Result<Vec<Triangle>> {
        match self.outcome {
            TriangulationOutcome::Complete => Ok(self.triangles),
            TriangulationOutcome::Degenerate => Err(ErrorKind::TriangulationDegenerate.into()),
            TriangulationOutcome::NoEarFound => {
                Err(ErrorKind::TriangulationIncomplete(self.triangles.len()).into())
            }
        }
    }
}

// Node of the circular vertex list.
struct Corner {
    position: Vertex,
    prev: usize,
    next: usize,
}

struct Ring {
    corners: Vec<Corner>,
}

impl Ring {
    fn new(positions: &[Vertex]) -> Self {
        let n = positions.len();
        let corners = positions
            .iter()
            .enumerate()
            .map(|(i, &position)| Corner {
                position,
                prev: (i + n - 1) % n,
                next: (i + 1) % n,
            })
            .collect();
        Ring { corners }
    }

    fn position(&self, i: usize) -> &Vertex {
        &self.corners[i].position
    }

    fn prev(&self, i: usize) -> usize {
        self.corners[i].prev
    }

    fn next(&self, i: usize) -> usize {
        self.corners[i].next
    }

    fn direction_at(&self, i: usize) -> CrossProductDirection {
        cross_product_direction(
            self.position(i),
            self.position(self.prev(i)),
            self.position(self.next(i)),
        )
    }

    // True if any remaining corner other than the ear's own lies inside the ear at `i`.
    fn ear_contains_other_corner(&self, i: usize) -> bool {
        let prev = self.prev(i);
        let next = self.next(i);
        let mut other = self.next(next);
        while other != prev {
            if is_inside_of_the_triangle(
                self.position(other),
                self.position(i),
                self.position(next),
                self.position(prev),
            ) {
                return true;
            }
            other = self.next(other);
        }
        false
    }

    fn unlink(&mut self, i: usize) {
        let prev = self.prev(i);
        let next = self.next(i);
        self.corners[next].prev = prev;
        self.corners[prev].next = next;
    }
}

fn make_right_hand_rule_triangle(p1: &Vertex, p2: &Vertex, p3: &Vertex) -> Triangle {
    match cross_product_direction(p2, p1, p3) {
        CrossProductDirection::Positive => Triangle::new(*p3, *p2, *p1),
        CrossProductDirection::Negative => Triangle::new(*p1, *p2, *p3),
    }
}

/// Decomposes a closed polygon (first vertex repeated at the end, at least 4 vertices) into
/// counter-clockwise triangles.
pub fn polygon_to_triangles(polygon: &[Vertex]) -> Result<Triangulation> {
    if polygon.len() < 4 {
        return Err(ErrorKind::PolygonTooSmall(polygon.len()).into());
    }
    if !is_closed_polygon(polygon) {
        return Err(ErrorKind::PolygonNotClosed.into());
    }

    let mut minimal_polygon = vec![polygon[0]];
    for p in &polygon[..polygon.len() - 1] {
        if minimal_polygon.last() != Some(p) {
            minimal_polygon.push(*p);
        }
    }

    let number_vertices = minimal_polygon.len();
    if number_vertices < 3 {
        return Ok(Triangulation::complete(Vec::new()));
    }

    for i in 0..number_vertices {
        for j in (i + 1)..number_vertices {
            let (p1, p2) = (&minimal_polygon[i], &minimal_polygon[j]);
            if p1.x == p2.x && p1.y == p2.y {
                warn!(x = p1.x, y = p1.y, "polygon revisits a vertex, skipping triangulation");
                return Ok(Triangulation {
                    triangles: Vec::new(),
                    outcome: TriangulationOutcome::Degenerate,
                });
            }
        }
    }

    let anchor = minimal_polygon[0];
    let mut ring = Ring::new(&minimal_polygon);

    // Equal distances keep the reverse input order.
    let mut farthests: Vec<usize> = (0..number_vertices).rev().collect();
    farthests.sort_by_key(|&i| Reverse(OrderedFloat(squared_xy_distance(ring.position(i), &anchor))));

    let mut triangles = Vec::with_capacity(number_vertices - 2);

    while farthests.len() > 3 {
        let start = farthests[0];
        let polygon_direction = ring.direction_at(start);
        let mut current = start;

        loop {
            if ring.direction_at(current) == polygon_direction && !ring.ear_contains_other_corner(current) {
                triangles.push(make_right_hand_rule_triangle(
                    ring.position(current),
                    ring.position(ring.prev(current)),
                    ring.position(ring.next(current)),
                ));
                ring.unlink(current);
                farthests.retain(|&i| i != current);
                break;
            }

            current = ring.next(current);
            if current == start {
                warn!(
                    emitted = triangles.len(),
                    remaining = farthests.len(),
                    "no valid ear left, triangulation is partial"
                );
                return Ok(Triangulation {
                    triangles,
                    outcome: TriangulationOutcome::NoEarFound,
                });
            }
        }
    }

    let base = farthests[0];
    triangles.push(make_right_hand_rule_triangle(
        ring.position(base),
        ring.position(ring.next(base)),
        ring.position(ring.prev(base)),
    ));

    Ok(Triangulation::complete(triangles))
}
