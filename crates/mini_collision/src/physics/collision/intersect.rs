//! Precise intersection tests
//!
//! Narrow-phase checks run on the candidates returned by the AABB tree:
//! ray/plane, ray/triangle, triangle/triangle and sphere/triangle.
//!
//! The point-in-triangle test sums the angles subtended by the triangle's
//! edges as seen from the point. Unlike an edge-sign test it needs no
//! consistent winding and keeps working on nearly degenerate triangles.

use crate::foundation::math::{utils, Plane, Vec3, EPSILON, INSIDE_ANGLE_SUM};
use super::primitives::{Polygon, Ray, RayHit, Sphere};

/// Where a ray's line crosses a plane
///
/// Returns `None` only when the direction is exactly perpendicular to the
/// plane normal. The crossing may lie behind the ray origin; callers that
/// care check the returned parameter via [`ray_plane_parameter`].
pub fn ray_plane_intersection(ray: &Ray, plane: &Plane) -> Option<Vec3> {
    ray_plane_parameter(ray, plane).map(|t| ray.point_at(t))
}

/// Ray parameter `t` where `position + t * direction` lies on the plane
pub fn ray_plane_parameter(ray: &Ray, plane: &Plane) -> Option<f32> {
    let denominator = plane.normal().dot(&ray.direction);
    if denominator == 0.0 {
        return None;
    }
    Some(-plane.evaluate(&ray.position) / denominator)
}

/// Check whether a point in the triangle's plane lies inside the triangle
///
/// Edge and vertex points count as inside.
pub fn point_in_polygon(point: &Vec3, polygon: &Polygon) -> bool {
    point_in_polygon_with(point, polygon, INSIDE_ANGLE_SUM)
}

/// [`point_in_polygon`] with an explicit angle-sum threshold
pub fn point_in_polygon_with(point: &Vec3, polygon: &Polygon, angle_sum_threshold: f32) -> bool {
    let mut directions = [Vec3::zeros(); 3];
    for (direction, vertex) in directions.iter_mut().zip(&polygon.vertices) {
        let to_vertex = vertex - point;
        if to_vertex.norm() <= EPSILON {
            // Sitting on a vertex
            return true;
        }
        *direction = to_vertex / to_vertex.norm();
    }

    let angle_sum = utils::angle_between_unit(&directions[0], &directions[1])
        + utils::angle_between_unit(&directions[1], &directions[2])
        + utils::angle_between_unit(&directions[2], &directions[0]);

    angle_sum >= angle_sum_threshold
}

/// Where a ray hits a triangle, if it does
///
/// Like [`ray_plane_intersection`], the hit may be behind the ray origin.
pub fn ray_polygon_intersection(ray: &Ray, polygon: &Polygon) -> Option<Vec3> {
    let plane = polygon.plane();
    if plane.is_degenerate() {
        return None;
    }
    ray_plane_intersection(ray, &plane).filter(|point| point_in_polygon(point, polygon))
}

/// Precise ray/triangle hit at or in front of the ray origin
pub fn ray_polygon_hit(ray: &Ray, polygon: &Polygon, angle_sum_threshold: f32) -> Option<RayHit> {
    let plane = polygon.plane();
    if plane.is_degenerate() {
        return None;
    }

    let distance = ray_plane_parameter(ray, &plane)?;
    if distance < 0.0 {
        return None;
    }

    let point = ray.point_at(distance);
    point_in_polygon_with(&point, polygon, angle_sum_threshold).then(|| RayHit {
        distance,
        point,
        normal: plane.normal(),
        polygon: *polygon,
    })
}

/// Check whether two triangles touch or cross
pub fn polygon_polygon_intersect(a: &Polygon, b: &Polygon) -> bool {
    polygon_polygon_intersect_with(a, b, EPSILON, INSIDE_ANGLE_SUM)
}

/// [`polygon_polygon_intersect`] with explicit tolerances
///
/// `epsilon` governs plane coincidence, edge distances and the overlap
/// along the intersection line; `angle_sum_threshold` is handed to the
/// point-in-triangle test of the coplanar case.
pub fn polygon_polygon_intersect_with(
    a: &Polygon,
    b: &Polygon,
    epsilon: f32,
    angle_sum_threshold: f32,
) -> bool {
    let plane_a = a.plane();
    let plane_b = b.plane();

    if plane_a.is_degenerate() || plane_b.is_degenerate() {
        return false;
    }

    if plane_a.coincides_with(&plane_b, epsilon) {
        return coplanar_polygons_intersect(a, b, epsilon, angle_sum_threshold);
    }

    // Only exactly parallel planes are skipped; shallow angles still cross
    let Some(line_direction) = utils::try_normalize(&plane_a.normal().cross(&plane_b.normal())) else {
        return false;
    };

    // Both crossing segments lie on the line where the planes meet
    let Some(segment_a) = plane_crossing_points(a, &plane_b, epsilon) else {
        return false;
    };
    let Some(segment_b) = plane_crossing_points(b, &plane_a, epsilon) else {
        return false;
    };

    let (a_min, a_max) = project_extent(&segment_a, &line_direction);
    let (b_min, b_max) = project_extent(&segment_b, &line_direction);

    utils::value_is_between(a_min, b_min, b_max, epsilon)
        || utils::value_is_between(a_max, b_min, b_max, epsilon)
        || utils::value_is_between(b_min, a_min, a_max, epsilon)
        || utils::value_is_between(b_max, a_min, a_max, epsilon)
}

fn coplanar_polygons_intersect(a: &Polygon, b: &Polygon, epsilon: f32, angle_sum_threshold: f32) -> bool {
    let vertex_inside = a.vertices.iter().any(|v| point_in_polygon_with(v, b, angle_sum_threshold))
        || b.vertices.iter().any(|v| point_in_polygon_with(v, a, angle_sum_threshold));
    if vertex_inside {
        return true;
    }

    a.edges().iter().any(|&(p1, q1)| {
        b.edges()
            .iter()
            .any(|&(p2, q2)| segment_segment_distance(p1, q1, p2, q2) < epsilon)
    })
}

/// Points where the triangle's edges meet `plane`
///
/// Returns `None` when the whole triangle is strictly on one side. A single
/// touching vertex gives a one-point segment.
fn plane_crossing_points(polygon: &Polygon, plane: &Plane, epsilon: f32) -> Option<Vec<Vec3>> {
    let distances = polygon.vertices.map(|v| plane.distance_to_point(&v));
    let mut points: Vec<Vec3> = Vec::with_capacity(3);

    let mut push_unique = |point: Vec3| {
        if !points.iter().any(|p| utils::approx_eq(p, &point, epsilon)) {
            points.push(point);
        }
    };

    for i in 0..3 {
        let j = (i + 1) % 3;
        let (p, q) = (polygon.vertices[i], polygon.vertices[j]);
        let (dp, dq) = (distances[i], distances[j]);

        if dp.abs() <= f32::EPSILON {
            push_unique(p);
        }
        if dq.abs() <= f32::EPSILON {
            push_unique(q);
        }
        if (dp > f32::EPSILON && dq < -f32::EPSILON) || (dp < -f32::EPSILON && dq > f32::EPSILON) {
            let t = dp / (dp - dq);
            push_unique(p + (q - p) * t);
        }
    }

    (!points.is_empty()).then_some(points)
}

fn project_extent(points: &[Vec3], axis: &Vec3) -> (f32, f32) {
    points.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(low, high), p| {
        let s = axis.dot(p);
        (low.min(s), high.max(s))
    })
}

/// Shortest distance between segments `p1q1` and `p2q2`
///
/// Degenerate (zero-length) segments are handled as points.
pub fn segment_segment_distance(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> f32 {
    let (c1, c2) = closest_points_between_segments(p1, q1, p2, q2);
    (c1 - c2).norm()
}

/// Closest pair of points between two segments
pub fn closest_points_between_segments(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> (Vec3, Vec3) {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.norm_squared();
    let e = d2.norm_squared();
    let f = d2.dot(&r);

    if a <= f32::EPSILON && e <= f32::EPSILON {
        return (p1, p2);
    }

    let (s, t) = if a <= f32::EPSILON {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(&r);
        if e <= f32::EPSILON {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(&d2);
            let denominator = a * e - b * b;

            // Parallel segments: any s works, start from p1
            let mut s = if denominator > f32::EPSILON {
                ((b * f - c * e) / denominator).clamp(0.0, 1.0)
            } else {
                0.0
            };

            let mut t = (b * s + f) / e;
            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
            (s, t)
        }
    };

    (p1 + d1 * s, p2 + d2 * t)
}

/// Closest point on segment `pq` to `point`
pub fn closest_point_on_segment(point: &Vec3, p: Vec3, q: Vec3) -> Vec3 {
    let d = q - p;
    let length_squared = d.norm_squared();
    if length_squared <= f32::EPSILON {
        return p;
    }
    let t = ((point - p).dot(&d) / length_squared).clamp(0.0, 1.0);
    p + d * t
}

/// Check whether a sphere overlaps a triangle
pub fn sphere_polygon_intersect(sphere: &Sphere, polygon: &Polygon) -> bool {
    sphere_polygon_intersect_with(sphere, polygon, INSIDE_ANGLE_SUM)
}

/// [`sphere_polygon_intersect`] with an explicit point-in-triangle threshold
pub fn sphere_polygon_intersect_with(sphere: &Sphere, polygon: &Polygon, angle_sum_threshold: f32) -> bool {
    let Some(plane) = polygon.plane().normalized() else {
        return false;
    };

    let distance = plane.evaluate(&sphere.position);
    if distance.abs() > sphere.radius {
        return false;
    }

    let projected = sphere.position - plane.normal() * distance;
    if point_in_polygon_with(&projected, polygon, angle_sum_threshold) {
        return true;
    }

    // Center projects outside; the sphere can still clip an edge
    let radius_squared = sphere.radius * sphere.radius;
    polygon.edges().iter().any(|&(p, q)| {
        let closest = closest_point_on_segment(&sphere.position, p, q);
        (closest - sphere.position).norm_squared() <= radius_squared
    })
}
