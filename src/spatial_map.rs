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

//! A uniform grid over a rectangle for finding objects near a point or a rectangle.

use crate::geometry::{Rectangle, Vertex};
use std::collections::BTreeSet;

/// Default limit for the number of cells along one axis.
pub const MAX_MESH_NUMBER: usize = 1000;

/// Half side length of the search square used by point queries.
const POINT_QUERY_HALF_LENGTH: f64 = 0.01;

/// Anything the map can index.
pub trait SpatialObject {
    fn min_rect(&self) -> Rectangle;

    /// Exact overlap test against one grid cell.
    fn intersects_with(&self, rect: &Rectangle) -> bool;
}

#[derive(Debug, Clone)]
pub struct SpatialObjectMap<I> {
    min_rect: Rectangle,
    mesh_unit: f64,
    number_horizontal_meshes: usize,
    number_vertical_meshes: usize,
    ids: Vec<BTreeSet<I>>,
}

impl<I: Copy + Ord> Default for SpatialObjectMap<I> {
    fn default() -> Self {
        SpatialObjectMap {
            min_rect: Rectangle::default(),
            mesh_unit: 0.,
            number_horizontal_meshes: 0,
            number_vertical_meshes: 0,
            ids: Vec::new(),
        }
    }
}

impl<I: Copy + Ord> SpatialObjectMap<I> {
    pub fn new(min_rect: Rectangle, mesh_unit: f64, max_mesh_number: usize) -> Self {
        let mut map = Self::default();
        map.set_mesh(min_rect, mesh_unit, max_mesh_number);
        map
    }

    /// Replaces the grid and drops every object. With more than `max_mesh_number` squared
    /// cells the longer axis gets fewer, larger cells. A mesh unit that is not a finite positive
    /// length makes a single cell covering `min_rect`.
    pub fn set_mesh(&mut self, min_rect: Rectangle, mesh_unit: f64, max_mesh_number: usize) {
        let mesh_unit = if mesh_unit.is_finite() && mesh_unit > 0. {
            mesh_unit
        } else {
            min_rect.width().max(min_rect.height()).max(1.)
        };
        self.min_rect = min_rect;
        self.mesh_unit = mesh_unit;

        let cells_along = |length: f64| ((length / mesh_unit).ceil() as usize).max(1);
        self.number_horizontal_meshes = cells_along(min_rect.width());
        self.number_vertical_meshes = cells_along(min_rect.height());

        let max_mesh_number = max_mesh_number.max(1);
        let max_cells = max_mesh_number.saturating_mul(max_mesh_number);
        if self
            .number_horizontal_meshes
            .saturating_mul(self.number_vertical_meshes)
            > max_cells
        {
            if self.number_horizontal_meshes > self.number_vertical_meshes {
                self.number_horizontal_meshes =
                    (max_cells as f64 / self.number_vertical_meshes as f64).ceil() as usize;
                self.mesh_unit = (min_rect.width() / self.number_horizontal_meshes as f64).ceil();
            } else {
                self.number_vertical_meshes =
                    (max_cells as f64 / self.number_horizontal_meshes as f64).ceil() as usize;
                self.mesh_unit = (min_rect.height() / self.number_vertical_meshes as f64).ceil();
            }
        }

        let number_meshes = self
            .number_horizontal_meshes
            .saturating_mul(self.number_vertical_meshes);
        self.ids = vec![BTreeSet::new(); number_meshes];
    }

    pub fn mesh_unit(&self) -> f64 {
        self.mesh_unit
    }

    pub fn number_of_meshes(&self) -> (usize, usize) {
        (self.number_horizontal_meshes, self.number_vertical_meshes)
    }

    pub fn insert<O: SpatialObject>(&mut self, object: &O, id: I) {
        for mesh_id in self.meshes_touched_by(object) {
            self.ids[mesh_id].insert(id);
        }
    }

    pub fn remove<O: SpatialObject>(&mut self, object: &O, id: I) {
        for mesh_id in self.meshes_touched_by(object) {
            self.ids[mesh_id].remove(&id);
        }
    }

    pub fn insert_vertex(&mut self, vertex: &Vertex, id: I) {
        if self.ids.is_empty() {
            return;
        }
        let horizontal_id = self.horizontal_id(vertex.x, f64::floor);
        let vertical_id = self.vertical_id(vertex.y, f64::floor);
        let mesh_id = self.mesh_id(horizontal_id, vertical_id);
        self.ids[mesh_id].insert(id);
    }

    /// Sorted ids of every object registered in a cell touching `target`.
    pub fn query_rect(&self, target: &Rectangle) -> Vec<I> {
        if !self.is_available() || !target.overlaps_with(&self.min_rect) {
            return Vec::new();
        }
        let rect = target.overlapped_rectangle(&self.min_rect);

        let mut unique_ids = BTreeSet::new();
        for vertical_id in self.vertical_id(rect.min_y, f64::floor)..=self.vertical_id(rect.max_y, f64::ceil) {
            for horizontal_id in
                self.horizontal_id(rect.min_x, f64::floor)..=self.horizontal_id(rect.max_x, f64::ceil)
            {
                unique_ids.extend(self.ids[self.mesh_id(horizontal_id, vertical_id)].iter().cloned());
            }
        }
        unique_ids.into_iter().collect()
    }

    pub fn query_point(&self, position: &Vertex) -> Vec<I> {
        self.query_rect(&Rectangle::from_center(position, POINT_QUERY_HALF_LENGTH))
    }

    /// Drops every object and the grid.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_available(&self) -> bool {
        !self.ids.is_empty()
    }

    fn meshes_touched_by<O: SpatialObject>(&self, object: &O) -> Vec<usize> {
        if self.ids.is_empty() {
            return Vec::new();
        }
        let mut rect = object.min_rect();
        if rect.overlaps_with(&self.min_rect) {
            rect = rect.overlapped_rectangle(&self.min_rect);
        }

        let mut mesh_ids = Vec::new();
        for vertical_id in self.vertical_id(rect.min_y, f64::floor)..=self.vertical_id(rect.max_y, f64::ceil) {
            for horizontal_id in
                self.horizontal_id(rect.min_x, f64::floor)..=self.horizontal_id(rect.max_x, f64::ceil)
            {
                if object.intersects_with(&self.mesh_rect(horizontal_id, vertical_id)) {
                    mesh_ids.push(self.mesh_id(horizontal_id, vertical_id));
                }
            }
        }
        mesh_ids
    }

    fn mesh_rect(&self, horizontal_id: usize, vertical_id: usize) -> Rectangle {
        let unit = self.mesh_unit;
        Rectangle::new(
            self.min_rect.min_x + unit * horizontal_id as f64,
            self.min_rect.min_y + unit * vertical_id as f64,
            self.min_rect.min_x + unit * (horizontal_id + 1) as f64,
            self.min_rect.min_y + unit * (vertical_id + 1) as f64,
        )
    }

    fn mesh_id(&self, horizontal_id: usize, vertical_id: usize) -> usize {
        self.number_horizontal_meshes * vertical_id + horizontal_id
    }

    fn horizontal_id(&self, x: f64, round: fn(f64) -> f64) -> usize {
        clamped_index(round((x - self.min_rect.min_x) / self.mesh_unit), self.number_horizontal_meshes)
    }

    fn vertical_id(&self, y: f64, round: fn(f64) -> f64) -> usize {
        clamped_index(round((y - self.min_rect.min_y) / self.mesh_unit), self.number_vertical_meshes)
    }
}

fn clamped_index(index: f64, number_meshes: usize) -> usize {
    (index.max(0.) as usize).min(number_meshes - 1)
}
