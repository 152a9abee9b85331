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

use crate::geometry::Vertex;

/// A segment from `orig` to `dest` tested against obstructions.
///
/// Rays handed to the quad-tree are split at cell boundaries. Every split ray remembers which
/// parameter span of the query ray it covers, so collision parameters can always be reported on
/// the query ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LosRay {
    pub orig: Vertex,
    pub dest: Vertex,
    pub dir: Vertex,
    pub inv_dir: Vertex,
    pub sign: [bool; 3],
    root_offset: f64,
    root_scale: f64,
}

impl LosRay {
    pub fn new(orig: Vertex, dest: Vertex) -> Self {
        let dir = dest - orig;
        let inv_dir = dir.inverted();
        LosRay {
            orig,
            dest,
            dir,
            inv_dir,
            sign: [inv_dir.x < 0., inv_dir.y < 0., inv_dir.z < 0.],
            root_offset: 0.,
            root_scale: 1.,
        }
    }

    pub fn position(&self, t: f64) -> Vertex {
        self.dir * t + self.orig
    }

    /// Parameter where the ray crosses the vertical plane at `x`, 0 when the ray runs parallel.
    pub fn cross_parameter_x(&self, x: f64) -> f64 {
        if self.dir.x == 0. {
            return 0.;
        }
        (x - self.orig.x) / self.dir.x
    }

    pub fn cross_parameter_y(&self, y: f64) -> f64 {
        if self.dir.y == 0. {
            return 0.;
        }
        (y - self.orig.y) / self.dir.y
    }

    pub fn cross_point_x(&self, x: f64) -> Vertex {
        self.position(self.cross_parameter_x(x))
    }

    pub fn cross_point_y(&self, y: f64) -> Vertex {
        self.position(self.cross_parameter_y(y))
    }

    /// The part of this ray between the parameters `t_from` and `t_to`.
    pub fn sub_ray(&self, t_from: f64, t_to: f64) -> LosRay {
        // Keeps the exact end points of this ray.
        let end_point = |t: f64| {
            if t == 0. {
                self.orig
            } else if t == 1. {
                self.dest
            } else {
                self.position(t)
            }
        };
        let mut ray = LosRay::new(end_point(t_from), end_point(t_to));
        ray.root_offset = self.root_t(t_from);
        ray.root_scale = self.root_scale * (t_to - t_from);
        ray
    }

    /// Maps a parameter of this ray to the parameter of the query ray it was split from.
    pub fn root_t(&self, t: f64) -> f64 {
        self.root_offset + self.root_scale * t
    }
}
