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

//! Ray intersection kernels and the ordered collision map they fill.

use super::obb::LosOrientedBoundingBox;
use super::polygon::WallCollisionInfo;
use super::ray::LosRay;
use crate::geometry::Triangle;
use ordered_float::OrderedFloat;
use std::collections::BTreeMap;
use std::f64::EPSILON;

/// Collision parameters are truncated to this many steps per unit before they become map keys.
pub const COLLISION_T_ROUNDING: f64 = 100_000_000.;

/// Collisions keyed by their rounded parameter on the query ray.
pub type Collisions = BTreeMap<OrderedFloat<f64>, WallCollisionInfo>;

/// Parameter of the ray/triangle intersection as a fraction of the ray length, or -1 when the
/// ray misses the triangle or runs parallel to its plane.
pub fn judge_line_plane(ray: &LosRay, triangle: &Triangle) -> f64 {
    let normal_dir = ray.dir.normalized();
    let e1 = triangle.p2 - triangle.p1;
    let e2 = triangle.p3 - triangle.p1;
    let pvec = normal_dir.cross(&e2);
    let det = e1.dot(&pvec);

    if det > -EPSILON && det < EPSILON {
        return -1.;
    }

    let inv_det = 1. / det;
    let tvec = ray.orig - triangle.p1;
    let u = tvec.dot(&pvec) * inv_det;
    if u < 0. || u > 1. {
        return -1.;
    }

    let qvec = tvec.cross(&e1);
    let v = normal_dir.dot(&qvec) * inv_det;
    if v < 0. || u + v > 1. {
        return -1.;
    }

    (e2.dot(&qvec) * inv_det) / ray.dir.distance()
}

/// Entry and exit parameters of the ray through the box (slab method). A miss yields
/// `(-f64::MAX, f64::MAX)`.
pub fn judge_line_oriented_bounding_box(ray: &LosRay, obb: &LosOrientedBoundingBox) -> (f64, f64) {
    let miss = (-std::f64::MAX, std::f64::MAX);
    let mut min_t = -std::f64::MAX;
    let mut max_t = std::f64::MAX;

    let dir_to_center = obb.center - ray.orig;

    for i in 0..3 {
        let axis = obb.rotation.column(i);
        let e = axis.dot(&dir_to_center);
        let f = ray.dir.dot(&axis);
        let extent = obb.extent_per_axis[i];

        if f > -EPSILON && f < EPSILON {
            if extent.abs() < e.abs() {
                return miss;
            }
            continue;
        }

        let mut t1 = (e - extent) / f;
        let mut t2 = (e + extent) / f;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        min_t = min_t.max(t1);
        max_t = max_t.min(t2);

        if max_t <= 0. || min_t > max_t {
            return miss;
        }
    }

    (min_t, max_t)
}

/// Keeps `t` only inside the open interval (0, 1). Equal rounded keys keep the lower variant id.
pub fn insert_collision_point(t: f64, info: WallCollisionInfo, collisions: &mut Collisions) {
    if !(0. < t && t < 1.) {
        return;
    }
    let rounded_t = (t * COLLISION_T_ROUNDING).floor() / COLLISION_T_ROUNDING;

    collisions
        .entry(OrderedFloat(rounded_t))
        .and_modify(|existing| {
            if info.variant_id < existing.variant_id {
                *existing = info;
            }
        })
        .or_insert(info);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{RotationMatrix, Vertex};
    use crate::los::polygon::{ObstructionType, INVALID_VARIANT_ID};
    use approx::assert_relative_eq;

    fn wall() -> Triangle {
        Triangle::new(
            Vertex::new(5., -10., 0.),
            Vertex::new(5., 10., 0.),
            Vertex::new(5., 0., 20.),
        )
    }

    #[test]
    fn test_line_plane_hits_known_point() {
        let ray = LosRay::new(Vertex::new(0., 1., 2.), Vertex::new(20., 1., 2.));
        let t = judge_line_plane(&ray, &wall());
        assert!(0. < t && t < 1.);
        let hit = ray.position(t);
        assert_relative_eq!(hit.x, 5., epsilon = 1e-6);
        assert_relative_eq!(hit.y, 1., epsilon = 1e-6);
        assert_relative_eq!(hit.z, 2., epsilon = 1e-6);
    }

    #[test]
    fn test_line_plane_misses() {
        let parallel = LosRay::new(Vertex::new(0., 0., 0.), Vertex::new(0., 10., 0.));
        assert_eq!(judge_line_plane(&parallel, &wall()), -1.);
        let above = LosRay::new(Vertex::new(0., 0., 30.), Vertex::new(20., 0., 30.));
        assert_eq!(judge_line_plane(&above, &wall()), -1.);
    }

    #[test]
    fn test_line_plane_behind_origin_is_negative() {
        let ray = LosRay::new(Vertex::new(10., 0., 1.), Vertex::new(20., 0., 1.));
        assert!(judge_line_plane(&ray, &wall()) < 0.);
    }

    #[test]
    fn test_obb_slab_symmetry() {
        let obb = LosOrientedBoundingBox::new(
            Vertex::new(0., 0., 0.),
            RotationMatrix::identity(),
            4.,
            2.,
            2.,
            3,
            6.,
        )
        .unwrap();
        let ray = LosRay::new(Vertex::new(-10., 0., 1.), Vertex::new(10., 0., 1.));
        let (t_min, t_max) = judge_line_oriented_bounding_box(&ray, &obb);
        assert_relative_eq!(t_min, 0.45, epsilon = 1e-12);
        assert_relative_eq!(t_max, 0.55, epsilon = 1e-12);
        assert_relative_eq!(t_min + t_max, 1., epsilon = 1e-12);
    }

    #[test]
    fn test_obb_parallel_outside_is_a_miss() {
        let obb = LosOrientedBoundingBox::new(
            Vertex::zero(),
            RotationMatrix::identity(),
            4.,
            2.,
            2.,
            3,
            6.,
        )
        .unwrap();
        let ray = LosRay::new(Vertex::new(-10., 5., 1.), Vertex::new(10., 5., 1.));
        assert_eq!(
            judge_line_oriented_bounding_box(&ray, &obb),
            (-std::f64::MAX, std::f64::MAX)
        );
    }

    #[test]
    fn test_insert_rounds_and_keeps_lower_variant() {
        let mut collisions = Collisions::new();
        let info = |variant_id| WallCollisionInfo::new(variant_id, 1., ObstructionType::OuterWall);

        insert_collision_point(0.123_456_789_9, info(5), &mut collisions);
        insert_collision_point(0.123_456_781, info(2), &mut collisions);
        insert_collision_point(0.123_456_785, info(9), &mut collisions);
        assert_eq!(collisions.len(), 1);
        let (t, kept) = collisions.iter().next().unwrap();
        assert_relative_eq!(t.into_inner(), 0.123_456_78, epsilon = 1e-15);
        assert_eq!(kept.variant_id, 2);

        insert_collision_point(0.5, info(INVALID_VARIANT_ID), &mut collisions);
        assert_eq!(collisions.len(), 2);
    }

    #[test]
    fn test_insert_keeps_open_interval_only() {
        let mut collisions = Collisions::new();
        let info = WallCollisionInfo::new(0, 1., ObstructionType::Roof);
        for &t in &[0., 1., -0.5, 1.5, -1.] {
            insert_collision_point(t, info, &mut collisions);
        }
        assert!(collisions.is_empty());
    }
}
