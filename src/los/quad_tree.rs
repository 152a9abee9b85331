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

use super::intersection::{
    insert_collision_point, judge_line_oriented_bounding_box, judge_line_plane, Collisions,
};
use super::obb::LosOrientedBoundingBox;
use super::polygon::{LosPolygon, NodeIdType, ObstructionType, WallCollisionInfo, INVALID_VARIANT_ID};
use super::ray::LosRay;
use super::IgnoredNodeIds;
use crate::geometry::algorithms::calculate_intersection_position_between_line;
use crate::geometry::{Rectangle, Vertex};
use arrayvec::ArrayVec;
use quadtree::{NodeId, Quadrant};
use std::sync::Arc;

/// Cells below this depth are never split further.
pub const MAX_DEPTH: u8 = 6;

/// A planar quad-tree over triangle obstructions and moving boxes.
///
/// Every object lives in the deepest cell whose quadrant contains all of it. Children are
/// created on first insertion into them.
#[derive(Debug)]
pub struct LosQuadTree {
    id: NodeId,
    place: Rectangle,
    depth: u8,
    children: [Option<Box<LosQuadTree>>; 4],
    polygons: Vec<LosPolygon>,
    obbs: Vec<Arc<LosOrientedBoundingBox>>,
}

impl LosQuadTree {
    pub fn new(place: Rectangle) -> Self {
        Self::with_cell(NodeId::root(), place, 0)
    }

    fn with_cell(id: NodeId, place: Rectangle, depth: u8) -> Self {
        LosQuadTree {
            id,
            place,
            depth,
            children: [None, None, None, None],
            polygons: Vec::new(),
            obbs: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn place(&self) -> &Rectangle {
        &self.place
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn polygons(&self) -> &[LosPolygon] {
        &self.polygons
    }

    pub fn obbs(&self) -> &[Arc<LosOrientedBoundingBox>] {
        &self.obbs
    }

    pub fn child(&self, quadrant: Quadrant) -> Option<&LosQuadTree> {
        self.children[quadrant.as_index()].as_ref().map(|child| &**child)
    }

    fn child_mut_or_create(&mut self, quadrant: Quadrant) -> &mut LosQuadTree {
        let id = self.id.get_child_id(quadrant);
        let place = self.place.child_rect(quadrant);
        let depth = self.depth + 1;
        self.children[quadrant.as_index()]
            .get_or_insert_with(|| Box::new(LosQuadTree::with_cell(id, place, depth)))
    }

    pub fn push_los_polygon(&mut self, polygon: LosPolygon) {
        if self.depth < MAX_DEPTH {
            let triangle = &polygon.triangle;
            let p1_quadrant = self.place.quadrant_of(&triangle.p1);
            let p2_quadrant = self.place.quadrant_of(&triangle.p2);
            let p3_quadrant = self.place.quadrant_of(&triangle.p3);

            if p1_quadrant == p2_quadrant && p2_quadrant == p3_quadrant {
                self.child_mut_or_create(p1_quadrant).push_los_polygon(polygon);
                return;
            }
        }
        self.polygons.push(polygon);
    }

    /// Returns the id of the cell that stores the box.
    pub fn push_los_oriented_bounding_box(&mut self, obb: Arc<LosOrientedBoundingBox>) -> NodeId {
        if self.depth < MAX_DEPTH {
            let rect = obb.rect();
            let bottom_left_quadrant = self.place.quadrant_of(&rect.bottom_left());
            let top_right_quadrant = self.place.quadrant_of(&rect.top_right());

            if bottom_left_quadrant == top_right_quadrant {
                return self
                    .child_mut_or_create(bottom_left_quadrant)
                    .push_los_oriented_bounding_box(obb);
            }
        }
        self.obbs.push(obb);
        self.id
    }

    /// The cell `id` if it exists in this subtree.
    pub fn cell(&self, id: &NodeId) -> Option<&LosQuadTree> {
        if !self.id.is_ancestor_of(id) {
            return None;
        }
        let mut cell = self;
        for quadrant in id.path().into_iter().skip(self.depth as usize) {
            cell = cell.child(quadrant)?;
        }
        Some(cell)
    }

    fn cell_mut(&mut self, id: &NodeId) -> Option<&mut LosQuadTree> {
        if !self.id.is_ancestor_of(id) {
            return None;
        }
        let depth = self.depth as usize;
        let mut cell = self;
        for quadrant in id.path().into_iter().skip(depth) {
            cell = &mut **cell.children[quadrant.as_index()].as_mut()?;
        }
        Some(cell)
    }

    /// Removes the first box of `node_id` stored directly in `cell`. Returns false if there was
    /// none.
    pub fn remove_los_oriented_bounding_box(&mut self, cell: &NodeId, node_id: NodeIdType) -> bool {
        let cell = match self.cell_mut(cell) {
            Some(cell) => cell,
            None => return false,
        };
        match cell.obbs.iter().position(|obb| obb.node_id == node_id) {
            Some(index) => {
                cell.obbs.remove(index);
                true
            }
            None => false,
        }
    }

    /// Moves the box of `obb.node_id` from `last_cell` to its new place. Insertion restarts at
    /// the last cell when that cell still contains the box, otherwise at this cell.
    pub fn reinsert_los_oriented_bounding_box(
        &mut self,
        last_cell: Option<NodeId>,
        obb: Arc<LosOrientedBoundingBox>,
    ) -> NodeId {
        if let Some(last_cell) = last_cell {
            self.remove_los_oriented_bounding_box(&last_cell, obb.node_id);

            if let Some(cell) = self.cell_mut(&last_cell) {
                if cell.place.contains_rect(obb.rect()) {
                    return cell.push_los_oriented_bounding_box(obb);
                }
            }
        }
        self.push_los_oriented_bounding_box(obb)
    }

    /// Collects collisions of `ray` with every obstruction not owned by an ignored node.
    /// Parameters in `collisions` are fractions of `ray`. With `check_just_a_collision` the
    /// search stops after the first hit. The horizontal check only tests roofs on the ground
    /// plane and expects a ray with z = 0.
    pub fn check_collision(
        &self,
        ray: &LosRay,
        ignored_node_ids: &IgnoredNodeIds,
        check_just_a_collision: bool,
        is_just_horizontal_check: bool,
        collisions: &mut Collisions,
    ) {
        if check_just_a_collision && !collisions.is_empty() {
            return;
        }

        if self.depth < MAX_DEPTH {
            let mut check_child = |quadrant: Quadrant, sub_ray: LosRay| {
                if let Some(child) = self.child(quadrant) {
                    child.check_collision(
                        &sub_ray,
                        ignored_node_ids,
                        check_just_a_collision,
                        is_just_horizontal_check,
                        collisions,
                    );
                }
            };

            let orig_quadrant = self.place.quadrant_of(&ray.orig);
            let dest_quadrant = self.place.quadrant_of(&ray.dest);

            if orig_quadrant == dest_quadrant {
                check_child(orig_quadrant, *ray);
            } else {
                let center = self.place.center();
                let t_x = ray.cross_parameter_x(center.x);
                let t_y = ray.cross_parameter_y(center.y);

                if orig_quadrant.x_is_same(dest_quadrant) {
                    check_child(orig_quadrant, ray.sub_ray(0., t_y));
                    check_child(dest_quadrant, ray.sub_ray(t_y, 1.));
                } else if orig_quadrant.y_is_same(dest_quadrant) {
                    check_child(orig_quadrant, ray.sub_ray(0., t_x));
                    check_child(dest_quadrant, ray.sub_ray(t_x, 1.));
                } else {
                    // Diagonal crossing, up to three quadrants are passed.
                    let edge_x = ray.position(t_x);
                    let edge_y = ray.position(t_y);
                    let (t_orig_edge, t_dest_edge) =
                        if ray.orig.distance_to(&edge_x) <= ray.orig.distance_to(&edge_y) {
                            (t_x, t_y)
                        } else {
                            (t_y, t_x)
                        };

                    check_child(orig_quadrant, ray.sub_ray(0., t_orig_edge));
                    check_child(dest_quadrant, ray.sub_ray(t_dest_edge, 1.));

                    let orig_edge = ray.position(t_orig_edge);
                    let dest_edge = ray.position(t_dest_edge);
                    if orig_edge != dest_edge {
                        let middle_quadrant = self.place.quadrant_of(&((orig_edge + dest_edge) * 0.5));
                        if middle_quadrant != orig_quadrant && middle_quadrant != dest_quadrant {
                            check_child(middle_quadrant, ray.sub_ray(t_orig_edge, t_dest_edge));
                        }
                    }
                }
            }
        }

        self.check_los_polygon_collision(
            ray,
            ignored_node_ids,
            check_just_a_collision,
            is_just_horizontal_check,
            collisions,
        );
        self.check_los_oriented_bounding_box_collision(
            ray,
            ignored_node_ids,
            check_just_a_collision,
            collisions,
        );
    }

    fn check_los_polygon_collision(
        &self,
        ray: &LosRay,
        ignored_node_ids: &IgnoredNodeIds,
        check_just_a_collision: bool,
        is_just_horizontal_check: bool,
        collisions: &mut Collisions,
    ) {
        if check_just_a_collision && !collisions.is_empty() {
            return;
        }

        for polygon in &self.polygons {
            if ignored_node_ids.contains(&polygon.node_id) {
                continue;
            }
            let info = WallCollisionInfo::new(
                polygon.variant_id,
                polygon.shielding_loss_db,
                polygon.obstruction_type,
            );

            if is_just_horizontal_check {
                let triangle = &polygon.triangle;
                if polygon.obstruction_type != ObstructionType::Roof
                    || !triangle.intersects_with_line(&ray.orig, &ray.dest)
                {
                    continue;
                }

                let distance = ray.dir.distance();
                let corners = [
                    triangle.p1.xy_point(),
                    triangle.p2.xy_point(),
                    triangle.p3.xy_point(),
                ];
                let intersection_points: ArrayVec<[Vertex; 3]> = (0..3)
                    .map(|i| {
                        calculate_intersection_position_between_line(
                            &ray.orig,
                            &ray.dest,
                            &corners[i],
                            &corners[(i + 1) % 3],
                        )
                    })
                    .collect();

                for point in intersection_points {
                    let t = (point - ray.orig).distance() / distance;
                    insert_ray_collision_point(ray, t, info, collisions);
                }
            } else {
                let t = judge_line_plane(ray, &polygon.triangle);
                insert_ray_collision_point(ray, t, info, collisions);
            }
        }
    }

    // Boxes count as two surfaces, the entry and the exit face.
    fn check_los_oriented_bounding_box_collision(
        &self,
        ray: &LosRay,
        ignored_node_ids: &IgnoredNodeIds,
        check_just_a_collision: bool,
        collisions: &mut Collisions,
    ) {
        if check_just_a_collision && !collisions.is_empty() {
            return;
        }

        for obb in &self.obbs {
            if ignored_node_ids.contains(&obb.node_id) {
                continue;
            }
            let info = WallCollisionInfo::new(
                INVALID_VARIANT_ID,
                obb.shielding_loss_db,
                ObstructionType::Invalid,
            );
            let (t_min, t_max) = judge_line_oriented_bounding_box(ray, obb);
            insert_ray_collision_point(ray, t_min, info, collisions);
            insert_ray_collision_point(ray, t_max, info, collisions);
        }
    }

    pub fn has_collision(&self, ray: &LosRay, ignored_node_ids: &IgnoredNodeIds) -> bool {
        let mut collisions = Collisions::new();
        self.check_collision(ray, ignored_node_ids, true, false, &mut collisions);
        !collisions.is_empty()
    }

    fn for_each_cell<F: FnMut(&LosQuadTree)>(&self, f: &mut F) {
        f(self);
        for child in self.children.iter().flatten() {
            child.for_each_cell(f);
        }
    }

    /// Polygons whose bounding rectangle overlaps `rect`.
    pub fn query_rect(&self, rect: &Rectangle) -> Vec<&LosPolygon> {
        let mut result = Vec::new();
        let prune = self.place.contains_rect(rect);
        self.collect_overlapping(rect, prune, &mut result, &mut Vec::new());
        result
    }

    /// Boxes whose bounding rectangle overlaps `rect`.
    pub fn obbs_in(&self, rect: &Rectangle) -> Vec<&Arc<LosOrientedBoundingBox>> {
        let mut result = Vec::new();
        let prune = self.place.contains_rect(rect);
        self.collect_overlapping(rect, prune, &mut Vec::new(), &mut result);
        result
    }

    // Objects reaching outside the root place are stored in cells that do not contain them, so
    // cells may only be skipped for rectangles inside the root place.
    fn collect_overlapping<'a>(
        &'a self,
        rect: &Rectangle,
        prune: bool,
        polygons: &mut Vec<&'a LosPolygon>,
        obbs: &mut Vec<&'a Arc<LosOrientedBoundingBox>>,
    ) {
        polygons.extend(
            self.polygons
                .iter()
                .filter(|polygon| polygon.triangle.rect().overlaps_with(rect)),
        );
        obbs.extend(self.obbs.iter().filter(|obb| obb.rect().overlaps_with(rect)));

        for child in self.children.iter().flatten() {
            if !prune || child.place.overlaps_with(rect) {
                child.collect_overlapping(rect, prune, polygons, obbs);
            }
        }
    }

    pub fn number_of_polygons(&self) -> usize {
        let mut count = 0;
        self.for_each_cell(&mut |cell| count += cell.polygons.len());
        count
    }

    pub fn number_of_obbs(&self) -> usize {
        let mut count = 0;
        self.for_each_cell(&mut |cell| count += cell.obbs.len());
        count
    }

    pub fn number_of_cells(&self) -> usize {
        let mut count = 0;
        self.for_each_cell(&mut |_| count += 1);
        count
    }

    pub fn deepest_used_level(&self) -> u8 {
        let mut deepest = 0;
        self.for_each_cell(&mut |cell| {
            if !cell.polygons.is_empty() || !cell.obbs.is_empty() {
                deepest = deepest.max(cell.depth);
            }
        });
        deepest
    }

    /// Every cell holding a box of `node_id`.
    pub fn cells_with_obb_of(&self, node_id: NodeIdType) -> Vec<NodeId> {
        let mut cells = Vec::new();
        self.for_each_cell(&mut |cell| {
            if cell.obbs.iter().any(|obb| obb.node_id == node_id) {
                cells.push(cell.id);
            }
        });
        cells
    }

    pub fn contains_obb_of(&self, node_id: NodeIdType) -> bool {
        !self.cells_with_obb_of(node_id).is_empty()
    }
}

// Only parameters inside the given ray are hits. They are stored relative to the query ray.
fn insert_ray_collision_point(ray: &LosRay, t: f64, info: WallCollisionInfo, collisions: &mut Collisions) {
    if 0. < t && t < 1. {
        insert_collision_point(ray.root_t(t), info, collisions);
    }
}
