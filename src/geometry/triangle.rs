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

use super::algorithms::{
    calculate_point_to_line_nearest_position, horizontal_lines_are_intersection,
    rect_intersects_with_polygon,
};
use super::{Rectangle, Vertex};
use serde_derive::{Deserialize, Serialize};

/// Sign of the planar cross product (p1 - p2) x (p1 - p3). Zero counts as positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossProductDirection {
    Positive,
    Negative,
}

pub fn cross_product_direction(p1: &Vertex, p2: &Vertex, p3: &Vertex) -> CrossProductDirection {
    let d21 = *p1 - *p2;
    let d31 = *p1 - *p3;
    if d21.x * d31.y - d21.y * d31.x >= 0. {
        CrossProductDirection::Positive
    } else {
        CrossProductDirection::Negative
    }
}

/// Planar containment test. Points on an edge are inside.
pub fn is_inside_of_the_triangle(point: &Vertex, p1: &Vertex, p2: &Vertex, p3: &Vertex) -> bool {
    let d12 = cross_product_direction(point, p1, p2);
    let d23 = cross_product_direction(point, p2, p3);
    let d31 = cross_product_direction(point, p3, p1);
    d12 == d23 && d12 == d31
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub p1: Vertex,
    pub p2: Vertex,
    pub p3: Vertex,
}

impl Triangle {
    pub fn new(p1: Vertex, p2: Vertex, p3: Vertex) -> Self {
        Triangle { p1, p2, p3 }
    }

    pub fn vertices(&self) -> [Vertex; 3] {
        [self.p1, self.p2, self.p3]
    }

    pub fn rect(&self) -> Rectangle {
        Rectangle::points_rect(self.vertices().iter())
    }

    /// Height of the triangle's plane at the planar position of `pos`. For a vertical plane the
    /// height of the nearest point on the edge p2-p3 is returned.
    pub fn surface_height_at(&self, pos: &Vertex) -> f64 {
        let normal = (self.p2 - self.p1).cross(&(self.p3 - self.p1));
        let d = -normal.dot(&self.p1);

        if normal.z == 0. {
            return calculate_point_to_line_nearest_position(pos, &self.p2, &self.p3).z;
        }
        -(d + normal.x * pos.x + normal.y * pos.y) / normal.z
    }

    pub fn contains(&self, pos: &Vertex) -> bool {
        is_inside_of_the_triangle(pos, &self.p1, &self.p2, &self.p3)
    }

    pub fn intersects_with(&self, rect: &Rectangle) -> bool {
        rect_intersects_with_polygon(rect, &[self.p1, self.p2, self.p3, self.p1])
    }

    pub fn intersects_with_line(&self, edge1: &Vertex, edge2: &Vertex) -> bool {
        if self.contains(edge1) || self.contains(edge2) {
            return true;
        }
        horizontal_lines_are_intersection(edge1, edge2, &self.p1, &self.p2)
            || horizontal_lines_are_intersection(edge1, edge2, &self.p2, &self.p3)
            || horizontal_lines_are_intersection(edge1, edge2, &self.p3, &self.p1)
    }

    /// Signed planar area, positive for counter-clockwise corners.
    pub fn signed_xy_area(&self) -> f64 {
        let a = self.p2 - self.p1;
        let b = self.p3 - self.p1;
        0.5 * (a.x * b.y - a.y * b.x)
    }

    pub fn area(&self) -> f64 {
        0.5 * (self.p2 - self.p1).cross(&(self.p3 - self.p1)).distance()
    }
}
