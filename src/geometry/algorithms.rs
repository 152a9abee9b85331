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

//! Planar and spatial helper functions shared by the layers.

use super::{Rectangle, Vertex};
use std::f64::consts::PI;

pub fn squared_xy_distance(v1: &Vertex, v2: &Vertex) -> f64 {
    let dx = v1.x - v2.x;
    let dy = v1.y - v2.y;
    dx * dx + dy * dy
}

pub fn xy_distance(v1: &Vertex, v2: &Vertex) -> f64 {
    squared_xy_distance(v1, v2).sqrt()
}

pub fn squared_xyz_distance(v1: &Vertex, v2: &Vertex) -> f64 {
    let dz = v1.z - v2.z;
    squared_xy_distance(v1, v2) + dz * dz
}

pub fn xyz_distance(v1: &Vertex, v2: &Vertex) -> f64 {
    squared_xyz_distance(v1, v2).sqrt()
}

/// Whether the segments (a1, a2) and (b1, b2) intersect on the ground plane. Touching segments
/// count as intersecting.
pub fn horizontal_lines_are_intersection(a1: &Vertex, a2: &Vertex, b1: &Vertex, b2: &Vertex) -> bool {
    let (a_low_x, a_high_x) = if a1.x >= a2.x { (a2.x, a1.x) } else { (a1.x, a2.x) };
    if (a_high_x < b1.x && a_high_x < b2.x) || (a_low_x > b1.x && a_low_x > b2.x) {
        return false;
    }
    let (a_low_y, a_high_y) = if a1.y >= a2.y { (a2.y, a1.y) } else { (a1.y, a2.y) };
    if (a_high_y < b1.y && a_high_y < b2.y) || (a_low_y > b1.y && a_low_y > b2.y) {
        return false;
    }

    let side_of_a = |p: &Vertex| (a1.x - a2.x) * (p.y - a1.y) + (a1.y - a2.y) * (a1.x - p.x);
    if side_of_a(b1) * side_of_a(b2) > 0. {
        return false;
    }
    let side_of_b = |p: &Vertex| (b1.x - b2.x) * (p.y - b1.y) + (b1.y - b2.y) * (b1.x - p.x);
    if side_of_b(a1) * side_of_b(a2) > 0. {
        return false;
    }
    true
}

pub fn is_closed_polygon(polygon: &[Vertex]) -> bool {
    polygon.len() >= 4 && polygon.first() == polygon.last()
}

/// Crossing count of a vertical ray going up from `point`. The polygon must be closed.
/// Points on a vertical edge or exactly on a crossing are inside.
pub fn polygon_contains_point(polygon: &[Vertex], point: &Vertex) -> bool {
    if !is_closed_polygon(polygon) {
        return false;
    }

    let mut crossing_count = 0usize;

    for edge in polygon.windows(2) {
        let (p1, p2) = (&edge[0], &edge[1]);

        if (point.x < p1.x && point.x < p2.x) || (point.x > p1.x && point.x > p2.x) {
            continue;
        }

        if p1.x == p2.x {
            if (p1.y <= point.y && point.y <= p2.y) || (p2.y <= point.y && point.y <= p1.y) {
                return true;
            }
            continue;
        }

        if point.x == p1.x.min(p2.x) {
            continue;
        }

        let crossing_y = p1.y + (p2.y - p1.y) / (p2.x - p1.x) * (point.x - p1.x);

        if crossing_y > point.y {
            crossing_count += 1;
        } else if crossing_y == point.y {
            return true;
        }
    }

    crossing_count % 2 == 1
}

pub fn rect_intersects_with_polygon(rect: &Rectangle, polygon: &[Vertex]) -> bool {
    if polygon.is_empty() {
        return false;
    }
    let open = &polygon[..polygon.len() - 1];
    if open.iter().any(|p| rect.contains_point(p)) {
        return true;
    }

    let corners = rect.corners();
    if corners.iter().any(|c| polygon_contains_point(polygon, c)) {
        return true;
    }

    polygon.windows(2).any(|edge| {
        (0..4).any(|i| {
            horizontal_lines_are_intersection(&edge[0], &edge[1], &corners[i], &corners[(i + 1) % 4])
        })
    })
}

/// Intersection of the infinite lines (a1, a2) and (b1, b2), evaluated on line a. Parallel lines
/// yield the average of the four points.
pub fn calculate_intersection_position_between_line(
    a1: &Vertex,
    a2: &Vertex,
    b1: &Vertex,
    b2: &Vertex,
) -> Vertex {
    let v1 = *a2 - *a1;
    let v2 = *b2 - *b1;
    let v3 = *b1 - *a1;

    let denom = v1.x * v2.y - v1.y * v2.x;
    if denom == 0. {
        return (*a1 + *a2 + *b1 + *b2) / 4.;
    }

    let t = (v2.y * v3.x - v2.x * v3.y) / denom;
    v1 * t + *a1
}

fn point_to_line_cross_parameter(point: &Vertex, edge1: &Vertex, edge2: &Vertex) -> f64 {
    let d = *edge2 - *edge1;
    let inner_product = d.dot(&(*edge1 - *point));

    if inner_product >= 0. {
        return 0.;
    }
    (-inner_product / d.dot(&d)).min(1.)
}

/// Nearest point on the segment (edge1, edge2).
pub fn calculate_point_to_line_nearest_position(point: &Vertex, edge1: &Vertex, edge2: &Vertex) -> Vertex {
    let t = point_to_line_cross_parameter(point, edge1, edge2);
    (*edge2 - *edge1) * t + *edge1
}

/// Nearest point on the segment measured on the ground plane; the result keeps the segment's z.
pub fn calculate_point_to_horizontal_line_nearest_position(
    point: &Vertex,
    edge1: &Vertex,
    edge2: &Vertex,
) -> Vertex {
    let t = point_to_line_cross_parameter(&point.xy_point(), &edge1.xy_point(), &edge2.xy_point());
    (*edge2 - *edge1) * t + *edge1
}

pub fn calculate_point_to_line_distance(point: &Vertex, edge1: &Vertex, edge2: &Vertex) -> f64 {
    calculate_point_to_line_nearest_position(point, edge1, edge2).distance_to(point)
}

/// Projection of `point` onto the infinite line through edge1 and edge2.
pub fn calculate_intersection_position(point: &Vertex, edge1: &Vertex, edge2: &Vertex) -> Vertex {
    let d = *edge2 - *edge1;
    let t = -d.dot(&(*edge1 - *point)) / d.dot(&d);
    d * t + *edge1
}

pub fn calculate_point_to_plane_nearest_point(
    point: &Vertex,
    plane1: &Vertex,
    plane2: &Vertex,
    plane3: &Vertex,
) -> Vertex {
    let normal = (*plane2 - *plane1).cross(&(*plane3 - *plane1)).normalized();
    let d = -normal.dot(plane1);
    let distance = normal.dot(point) + d;
    *point - normal * distance
}

/// Nearest position on a polyline and the index of the segment it lies on.
/// Returns None for fewer than two points.
pub fn calculate_point_to_arc_nearest_position(points: &[Vertex], position: &Vertex) -> Option<(Vertex, usize)> {
    let mut best: Option<(Vertex, usize, f64)> = None;
    for (i, edge) in points.windows(2).enumerate() {
        let candidate = calculate_point_to_line_nearest_position(position, &edge[0], &edge[1]);
        let distance = candidate.distance_to(position);
        if best.map_or(true, |(_, _, d)| distance < d) {
            best = Some((candidate, i, distance));
        }
    }
    best.map(|(p, i, _)| (p, i))
}

pub fn calculate_arc_distance(points: &[Vertex]) -> f64 {
    points.windows(2).map(|e| e[0].distance_to(&e[1])).sum()
}

/// Planar angle at `middle` between the legs to v1 and v2, in [0, PI]. Zero-length legs give 0.
pub fn calculate_radians_between_vector(v1: &Vertex, middle: &Vertex, v2: &Vertex) -> f64 {
    let vector1 = *v1 - *middle;
    let vector2 = *v2 - *middle;
    let distance1 = vector1.xy_distance();
    let distance2 = vector2.xy_distance();

    if distance1 == 0. || distance2 == 0. {
        return 0.;
    }

    let cos_alpha = (vector1.x * vector2.x + vector1.y * vector2.y) / (distance1 * distance2);
    cos_alpha.max(-1.).min(1.).acos()
}

/// Counter-clockwise planar angle from the leg to v1 to the leg to v2, in [0, 2 PI).
pub fn calculate_full_radians_between_vector(v1: &Vertex, middle: &Vertex, v2: &Vertex) -> f64 {
    let rad1 = (v1.y - middle.y).atan2(v1.x - middle.x);
    let rad2 = (v2.y - middle.y).atan2(v2.x - middle.x);
    let total = rad2 - rad1;
    if total < 0. {
        total + 2. * PI
    } else if total >= 2. * PI {
        total - 2. * PI
    } else {
        total
    }
}

/// Azimuth (clockwise from north) in [0, 360) and elevation in [-90, 90], both in degrees.
pub fn calculate_azimuth_and_elevation_degrees(from: &Vertex, to: &Vertex) -> (f64, f64) {
    let delta = *to - *from;
    let mut azimuth = 90. - delta.y.atan2(delta.x).to_degrees();
    let elevation = delta.z.atan2(delta.xy_distance()).to_degrees();
    azimuth %= 360.;
    if azimuth < 0. {
        azimuth += 360.;
    }
    (azimuth, elevation)
}

/// Offsets a polyline by half `width` on both sides into a closed polygon. Both ends are extended
/// by half the width. Returns an empty polygon for fewer than two vertices.
pub fn line_polygon(vertices: &[Vertex], width: f64) -> Vec<Vertex> {
    let number_points = vertices.len();
    if number_points < 2 {
        return Vec::new();
    }
    let half_width = width * 0.5;
    let number_lines = number_points - 1;

    let mut top_lines = Vec::with_capacity(number_lines);
    let mut bottom_lines = Vec::with_capacity(number_lines);

    for i in 0..number_lines {
        let mut p1 = vertices[i];
        let mut p2 = vertices[i + 1];
        let distance = p1.distance_to(&p2);

        if distance == 0. {
            top_lines.push((p1, p1));
            bottom_lines.push((p1, p1));
            continue;
        }
        if i == 0 {
            p1 = p1 + (p1 - p2) * (half_width / distance);
        }
        if i + 1 == number_lines {
            p2 = p2 + (p2 - p1) * (half_width / distance);
        }

        let normal = Vertex::new_xy(p2.y - p1.y, p1.x - p2.x);
        let offset = if normal.xy_distance() != 0. {
            normal * (half_width / normal.xy_distance())
        } else {
            Vertex::zero()
        };

        top_lines.push((p1 + offset, p2 + offset));
        bottom_lines.push((p1 - offset, p2 - offset));
    }

    let mut top = Vec::with_capacity(number_points);
    let mut bottom = Vec::with_capacity(number_points);
    top.push(top_lines[0].0);
    bottom.push(bottom_lines[number_lines - 1].1);
    for i in 0..number_lines - 1 {
        let (t1, t2) = (&top_lines[i], &top_lines[i + 1]);
        top.push(calculate_intersection_position_between_line(&t1.0, &t1.1, &t2.0, &t2.1));
        let (b1, b2) = (&bottom_lines[number_lines - i - 2], &bottom_lines[number_lines - i - 1]);
        bottom.push(calculate_intersection_position_between_line(&b1.0, &b1.1, &b2.0, &b2.1));
    }
    top.push(top_lines[number_lines - 1].1);
    bottom.push(bottom_lines[0].0);

    let mut polygon = top;
    polygon.extend(bottom);
    polygon.push(polygon[0]);
    polygon
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square() -> Vec<Vertex> {
        vec![
            Vertex::new_xy(0., 0.),
            Vertex::new_xy(10., 0.),
            Vertex::new_xy(10., 10.),
            Vertex::new_xy(0., 10.),
            Vertex::new_xy(0., 0.),
        ]
    }

    #[test]
    fn test_horizontal_lines_are_intersection() {
        let a1 = Vertex::new_xy(0., 0.);
        let a2 = Vertex::new_xy(10., 10.);
        assert!(horizontal_lines_are_intersection(&a1, &a2, &Vertex::new_xy(0., 10.), &Vertex::new_xy(10., 0.)));
        assert!(!horizontal_lines_are_intersection(&a1, &a2, &Vertex::new_xy(0., 1.), &Vertex::new_xy(9., 10.)));
        // Touching at an end point.
        assert!(horizontal_lines_are_intersection(&a1, &a2, &Vertex::new_xy(10., 10.), &Vertex::new_xy(20., 0.)));
    }

    #[test]
    fn test_polygon_contains_point() {
        let polygon = square();
        assert!(polygon_contains_point(&polygon, &Vertex::new_xy(5., 5.)));
        assert!(polygon_contains_point(&polygon, &Vertex::new_xy(0., 5.)));
        assert!(!polygon_contains_point(&polygon, &Vertex::new_xy(15., 5.)));
        assert!(!polygon_contains_point(&polygon[..4], &Vertex::new_xy(5., 5.)));
    }

    #[test]
    fn test_rect_intersects_with_polygon() {
        let polygon = square();
        assert!(rect_intersects_with_polygon(&Rectangle::new(2., 2., 3., 3.), &polygon));
        assert!(rect_intersects_with_polygon(&Rectangle::new(-5., 4., 15., 6.), &polygon));
        assert!(!rect_intersects_with_polygon(&Rectangle::new(11., 11., 13., 13.), &polygon));
    }

    #[test]
    fn test_line_intersection_and_parallel_fallback() {
        let p = calculate_intersection_position_between_line(
            &Vertex::new_xy(0., 0.),
            &Vertex::new_xy(10., 0.),
            &Vertex::new_xy(3., -5.),
            &Vertex::new_xy(3., 5.),
        );
        assert_eq!(p, Vertex::new_xy(3., 0.));
        let parallel = calculate_intersection_position_between_line(
            &Vertex::new_xy(0., 0.),
            &Vertex::new_xy(4., 0.),
            &Vertex::new_xy(0., 4.),
            &Vertex::new_xy(4., 4.),
        );
        assert_eq!(parallel, Vertex::new_xy(2., 2.));
    }

    #[test]
    fn test_nearest_positions() {
        let e1 = Vertex::new_xy(0., 0.);
        let e2 = Vertex::new_xy(10., 0.);
        assert_eq!(calculate_point_to_line_nearest_position(&Vertex::new_xy(-3., 4.), &e1, &e2), e1);
        assert_eq!(calculate_point_to_line_nearest_position(&Vertex::new_xy(13., 4.), &e1, &e2), e2);
        assert_eq!(calculate_intersection_position(&Vertex::new_xy(13., 4.), &e1, &e2), Vertex::new_xy(13., 0.));
        assert_relative_eq!(calculate_point_to_line_distance(&Vertex::new_xy(5., 4.), &e1, &e2), 4.);

        let arc = [e1, e2, Vertex::new_xy(10., 10.)];
        let (nearest, segment) = calculate_point_to_arc_nearest_position(&arc, &Vertex::new_xy(12., 7.)).unwrap();
        assert_eq!(nearest, Vertex::new_xy(10., 7.));
        assert_eq!(segment, 1);
        assert_relative_eq!(calculate_arc_distance(&arc), 20.);
        assert!(calculate_point_to_arc_nearest_position(&arc[..1], &e1).is_none());
    }

    #[test]
    fn test_radians_between_vector() {
        let middle = Vertex::zero();
        let east = Vertex::new_xy(1., 0.);
        let north = Vertex::new_xy(0., 2.);
        assert_relative_eq!(calculate_radians_between_vector(&east, &middle, &north), PI / 2.);
        assert_relative_eq!(calculate_full_radians_between_vector(&north, &middle, &east), 1.5 * PI);
        assert_eq!(calculate_radians_between_vector(&middle, &middle, &north), 0.);
    }

    #[test]
    fn test_azimuth_and_elevation() {
        let (azimuth, elevation) =
            calculate_azimuth_and_elevation_degrees(&Vertex::zero(), &Vertex::new(1., 0., 1.));
        assert_relative_eq!(azimuth, 90.);
        assert_relative_eq!(elevation, 45.);
    }

    #[test]
    fn test_line_polygon_of_segment() {
        let polygon = line_polygon(&[Vertex::new_xy(0., 0.), Vertex::new_xy(10., 0.)], 4.);
        assert_eq!(polygon.len(), 5);
        assert!(is_closed_polygon(&polygon));
        assert!(polygon_contains_point(&polygon, &Vertex::new_xy(5., 1.9)));
        assert!(polygon_contains_point(&polygon, &Vertex::new_xy(-1.9, 0.)));
        assert!(!polygon_contains_point(&polygon, &Vertex::new_xy(5., 2.1)));
    }
}
