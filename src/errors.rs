//
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

use crate::los::NodeIdType;
use serde_json;
use std::fmt;
use std::io;

error_chain! {
    foreign_links {
        Json(serde_json::Error);
        Io(io::Error);
        Fmt(fmt::Error);
    }

    errors {
        PolygonNotClosed {
            description("polygon is not closed")
            display("Polygon must be closed, its first and last vertex differ.")
        }
        PolygonTooSmall(number_vertices: usize) {
            description("polygon has too few vertices")
            display("Polygon needs at least 4 vertices including the closing one, got {}.", number_vertices)
        }
        TriangulationDegenerate {
            description("degenerate polygon")
            display("Polygon has two non-consecutive vertices at the same position, no triangles were generated.")
        }
        TriangulationIncomplete(number_triangles: usize) {
            description("no valid ear found")
            display("Triangulation found no valid ear after emitting {} triangles.", number_triangles)
        }
        InvalidMeshUnit(mesh_unit: f64) {
            description("invalid spatial map mesh unit")
            display("Spatial map mesh unit must be a finite positive length, got {}.", mesh_unit)
        }
        InvalidMeshNumber(max_mesh_number: usize) {
            description("invalid spatial map mesh number")
            display("Spatial map needs at least one mesh per axis, got a maximum of {}.", max_mesh_number)
        }
        InvalidExtent(length: f64, width: f64, height: f64) {
            description("invalid bounding box extent")
            display("Bounding box extents must be positive, got length {}, width {}, height {}.", length, width, height)
        }
        UnknownIntersection(id: usize) {
            description("unknown intersection id")
            display("Intersection {} does not exist.", id)
        }
        UnknownRoad(id: usize) {
            description("unknown road id")
            display("Road {} does not exist.", id)
        }
        UnknownMaterial(name: String) {
            description("unknown material")
            display("Material '{}' is not defined.", name)
        }
        UnknownShape(name: String) {
            description("unknown moving object shape")
            display("Moving object shape '{}' is not defined.", name)
        }
        DuplicateShape(name: String) {
            description("duplicated moving object shape")
            display("Moving object shape '{}' is defined twice.", name)
        }
        UnknownMovingObject(node_id: NodeIdType) {
            description("unknown moving object")
            display("No moving object is registered for node {}.", node_id)
        }
        DuplicateMovingObject(node_id: NodeIdType) {
            description("duplicated moving object")
            display("A moving object is already registered for node {}.", node_id)
        }
    }
}
