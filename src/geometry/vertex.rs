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

//! A point or direction in world space, in meters.

use nalgebra::{Point3, Vector3};
use serde_derive::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Equality is exact floating point equality and ordering is lexicographic on (x, y, z).
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Vertex {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vertex { x, y, z }
    }

    pub fn new_xy(x: f64, y: f64) -> Self {
        Vertex { x, y, z: 0. }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn xy_point(&self) -> Vertex {
        Vertex::new(self.x, self.y, 0.)
    }

    /// Length of the projection onto the ground plane.
    pub fn xy_distance(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Length of the vector.
    pub fn distance(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction. The zero vector stays zero.
    pub fn normalized(&self) -> Vertex {
        let length = self.distance();
        if length == 0. {
            return *self;
        }
        *self / length
    }

    pub fn distance_to(&self, other: &Vertex) -> f64 {
        (*other - *self).distance()
    }

    pub fn xy_distance_to(&self, other: &Vertex) -> f64 {
        (*other - *self).xy_distance()
    }

    pub fn direction_radians(&self) -> f64 {
        self.y.atan2(self.x)
    }

    pub fn cross(&self, other: &Vertex) -> Vertex {
        Vertex::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn dot(&self, other: &Vertex) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Component-wise reciprocal. Zero components stay zero.
    pub fn inverted(&self) -> Vertex {
        let invert = |v: f64| if v == 0. { 0. } else { 1. / v };
        Vertex::new(invert(self.x), invert(self.y), invert(self.z))
    }

    /// The planar normal (-y, x).
    pub fn normal_vector(&self) -> Vertex {
        Vertex::new(-self.y, self.x, 0.)
    }

    pub fn component(&self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }
}

impl Add for Vertex {
    type Output = Vertex;

    fn add(self, other: Vertex) -> Vertex {
        Vertex::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vertex {
    type Output = Vertex;

    fn sub(self, other: Vertex) -> Vertex {
        Vertex::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f64> for Vertex {
    type Output = Vertex;

    fn mul(self, scale: f64) -> Vertex {
        Vertex::new(self.x * scale, self.y * scale, self.z * scale)
    }
}

impl Div<f64> for Vertex {
    type Output = Vertex;

    fn div(self, scale: f64) -> Vertex {
        Vertex::new(self.x / scale, self.y / scale, self.z / scale)
    }
}

impl Neg for Vertex {
    type Output = Vertex;

    fn neg(self) -> Vertex {
        Vertex::new(-self.x, -self.y, -self.z)
    }
}

impl AddAssign for Vertex {
    fn add_assign(&mut self, other: Vertex) {
        *self = *self + other;
    }
}

impl SubAssign for Vertex {
    fn sub_assign(&mut self, other: Vertex) {
        *self = *self - other;
    }
}

impl From<Point3<f64>> for Vertex {
    fn from(p: Point3<f64>) -> Self {
        Vertex::new(p.x, p.y, p.z)
    }
}

impl From<Vector3<f64>> for Vertex {
    fn from(v: Vector3<f64>) -> Self {
        Vertex::new(v.x, v.y, v.z)
    }
}

impl From<Vertex> for Point3<f64> {
    fn from(v: Vertex) -> Self {
        Point3::new(v.x, v.y, v.z)
    }
}

impl From<Vertex> for Vector3<f64> {
    fn from(v: Vertex) -> Self {
        Vector3::new(v.x, v.y, v.z)
    }
}
