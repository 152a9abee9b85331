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

//! Geometric primitives shared by the line-of-sight layers.

pub mod algorithms;
mod rectangle;
mod rotation;
mod triangle;
pub mod triangulation;
mod vertex;

pub use rectangle::Rectangle;
pub use rotation::RotationMatrix;
pub use triangle::{cross_product_direction, is_inside_of_the_triangle, CrossProductDirection, Triangle};
pub use triangulation::{polygon_to_triangles, Triangulation, TriangulationOutcome};
pub use vertex::Vertex;
