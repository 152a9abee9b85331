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

use super::Vertex;
use nalgebra::{Matrix3, Vector3};
use serde_derive::{Deserialize, Serialize};
use std::ops::Mul;

/// A 3x3 rotation matrix. Rows and columns are exposed as `Vertex`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationMatrix {
    matrix: Matrix3<f64>,
}

impl Default for RotationMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl RotationMatrix {
    pub fn identity() -> Self {
        RotationMatrix {
            matrix: Matrix3::identity(),
        }
    }

    pub fn from_rows(row0: Vertex, row1: Vertex, row2: Vertex) -> Self {
        RotationMatrix {
            matrix: Matrix3::new(
                row0.x, row0.y, row0.z, row1.x, row1.y, row1.z, row2.x, row2.y, row2.z,
            ),
        }
    }

    /// Rotation from Euler angles in degrees, applied around x, then y, then z.
    pub fn from_degrees(x_degrees: f64, y_degrees: f64, z_degrees: f64) -> Self {
        let (sx, cx) = x_degrees.to_radians().sin_cos();
        let (sy, cy) = y_degrees.to_radians().sin_cos();
        let (sz, cz) = z_degrees.to_radians().sin_cos();

        Self::from_rows(
            Vertex::new(cy * cx, -(cy * sx), sy),
            Vertex::new(sz * sy * cx + cz * sx, -(sz * sy * sx) + cz * cx, -(sz * cy)),
            Vertex::new(-(cz * sy * cx) + sz * sx, cz * sy * sx + sz * cx, cz * cy),
        )
    }

    pub fn row(&self, index: usize) -> Vertex {
        let m = &self.matrix;
        Vertex::new(m[(index, 0)], m[(index, 1)], m[(index, 2)])
    }

    pub fn column(&self, index: usize) -> Vertex {
        let m = &self.matrix;
        Vertex::new(m[(0, index)], m[(1, index)], m[(2, index)])
    }

    pub fn as_matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }
}

impl Mul for RotationMatrix {
    type Output = RotationMatrix;

    fn mul(self, other: RotationMatrix) -> RotationMatrix {
        RotationMatrix {
            matrix: self.matrix * other.matrix,
        }
    }
}

impl Mul<Vertex> for RotationMatrix {
    type Output = Vertex;

    fn mul(self, v: Vertex) -> Vertex {
        Vertex::from(self.matrix * Vector3::from(v))
    }
}

impl Mul<Vertex> for &RotationMatrix {
    type Output = Vertex;

    fn mul(self, v: Vertex) -> Vertex {
        Vertex::from(self.matrix * Vector3::from(v))
    }
}
