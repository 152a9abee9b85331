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

//! Axis-aligned planar box.

use super::algorithms::horizontal_lines_are_intersection;
use super::Vertex;
use quadtree::Quadrant;
use serde_derive::{Deserialize, Serialize};
use std::ops::AddAssign;

/// An axis-aligned rectangle on the ground plane. The default rectangle is all zeros.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rectangle {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Rectangle {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn from_center(center: &Vertex, half_length: f64) -> Self {
        Self::from_center_xy(center, half_length, half_length)
    }

    pub fn from_center_xy(center: &Vertex, half_x: f64, half_y: f64) -> Self {
        Rectangle::new(
            center.x - half_x,
            center.y - half_y,
            center.x + half_x,
            center.y + half_y,
        )
    }

    pub fn from_points(p1: &Vertex, p2: &Vertex) -> Self {
        Rectangle::new(
            p1.x.min(p2.x),
            p1.y.min(p2.y),
            p1.x.max(p2.x),
            p1.y.max(p2.y),
        )
    }

    /// An inverted rectangle that any point grows into a valid box.
    pub fn empty_accumulator() -> Self {
        Rectangle::new(std::f64::MAX, std::f64::MAX, -std::f64::MAX, -std::f64::MAX)
    }

    /// Bounding rectangle of all points. Returns the inverted accumulator for no points.
    pub fn points_rect<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Vertex>,
    {
        points
            .into_iter()
            .fold(Self::empty_accumulator(), |mut rect, p| {
                rect.grow(p);
                rect
            })
    }

    pub fn grow(&mut self, p: &Vertex) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    pub fn union(&self, other: &Rectangle) -> Rectangle {
        Rectangle::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    pub fn expanded(&self, margin: f64) -> Rectangle {
        Rectangle::new(
            self.min_x - margin,
            self.min_y - margin,
            self.max_x + margin,
            self.max_y + margin,
        )
    }

    pub fn center(&self) -> Vertex {
        Vertex::new_xy(
            (self.min_x + self.max_x) * 0.5,
            (self.min_y + self.max_y) * 0.5,
        )
    }

    pub fn bottom_left(&self) -> Vertex {
        Vertex::new_xy(self.min_x, self.min_y)
    }

    pub fn bottom_right(&self) -> Vertex {
        Vertex::new_xy(self.max_x, self.min_y)
    }

    pub fn top_left(&self) -> Vertex {
        Vertex::new_xy(self.min_x, self.max_y)
    }

    pub fn top_right(&self) -> Vertex {
        Vertex::new_xy(self.max_x, self.max_y)
    }

    pub fn corners(&self) -> [Vertex; 4] {
        [
            self.bottom_left(),
            self.bottom_right(),
            self.top_right(),
            self.top_left(),
        ]
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn diagonal_length(&self) -> f64 {
        self.width().hypot(self.height())
    }

    pub fn is_valid(&self) -> bool {
        self.width() > 0. || self.height() > 0.
    }

    /// Points on the center lines belong to the positive side.
    pub fn quadrant_of(&self, point: &Vertex) -> Quadrant {
        let center = self.center();
        match (point.x >= center.x, point.y >= center.y) {
            (true, true) => Quadrant::PxPy,
            (true, false) => Quadrant::PxNy,
            (false, true) => Quadrant::NxPy,
            (false, false) => Quadrant::NxNy,
        }
    }

    pub fn child_rect(&self, quadrant: Quadrant) -> Rectangle {
        let center = self.center();
        let corner = match quadrant {
            Quadrant::PxPy => self.top_right(),
            Quadrant::NxPy => self.top_left(),
            Quadrant::NxNy => self.bottom_left(),
            Quadrant::PxNy => self.bottom_right(),
        };
        Rectangle::from_points(&center, &corner)
    }

    /// Inclusive on all edges. A rectangle without area contains nothing.
    pub fn contains_point(&self, point: &Vertex) -> bool {
        if self.min_x >= self.max_x || self.min_y >= self.max_y {
            return false;
        }
        self.min_x <= point.x
            && point.x <= self.max_x
            && self.min_y <= point.y
            && point.y <= self.max_y
    }

    pub fn contains_rect(&self, rect: &Rectangle) -> bool {
        self.min_x <= rect.min_x
            && rect.max_x <= self.max_x
            && self.min_y <= rect.min_y
            && rect.max_y <= self.max_y
    }

    pub fn overlaps_with(&self, rect: &Rectangle) -> bool {
        !(rect.max_x < self.min_x
            || self.max_x < rect.min_x
            || rect.max_y < self.min_y
            || self.max_y < rect.min_y)
    }

    pub fn overlapped_rectangle(&self, rect: &Rectangle) -> Rectangle {
        Rectangle::new(
            self.min_x.max(rect.min_x),
            self.min_y.max(rect.min_y),
            self.max_x.min(rect.max_x),
            self.max_y.min(rect.max_y),
        )
    }

    pub fn intersects_with_line(&self, p1: &Vertex, p2: &Vertex) -> bool {
        if self.contains_point(p1) || self.contains_point(p2) {
            return true;
        }
        let corners = self.corners();
        (0..4).any(|i| {
            horizontal_lines_are_intersection(p1, p2, &corners[i], &corners[(i + 1) % 4])
        })
    }
}

impl AddAssign for Rectangle {
    fn add_assign(&mut self, other: Rectangle) {
        *self = self.union(&other);
    }
}
