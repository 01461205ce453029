//! Primitive collision shapes
//!
//! Rays, spheres and triangles. The intersection algorithms that combine
//! them live in [`super::intersect`].

use crate::foundation::math::{Plane, Vec3};

/// A ray for picking, shooting and line-of-sight checks
///
/// The inverse direction is computed once on construction because every
/// box the ray is tested against needs it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub position: Vec3,
    /// The direction of the ray (expected to be normalized)
    pub direction: Vec3,
    /// Per-axis `1 / direction`; a zero component maps to signed infinity
    pub inv_direction: Vec3,
}

impl Ray {
    /// Creates a ray from an origin and an already normalized direction
    pub fn new(position: Vec3, direction: Vec3) -> Self {
        Self {
            position,
            direction,
            inv_direction: direction.map(inverse_component),
        }
    }

    /// Creates a ray from `position` pointing at `target`
    ///
    /// If the two points coincide the direction is zero, and the ray only
    /// intersects boxes that contain its origin.
    pub fn towards(position: Vec3, target: Vec3) -> Self {
        let direction = (target - position)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vec3::zeros);
        Self::new(position, direction)
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.position + self.direction * t
    }
}

/// `1/x` with zero mapped to an infinity carrying the sign of the zero
fn inverse_component(x: f32) -> f32 {
    if x == 0.0 {
        if x.is_sign_negative() { f32::NEG_INFINITY } else { f32::INFINITY }
    } else {
        1.0 / x
    }
}

/// Result of a precise ray query against a mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// The distance from the ray origin to the hit point
    pub distance: f32,
    /// The point of intersection in world space
    pub point: Vec3,
    /// Unit normal of the polygon that was hit
    pub normal: Vec3,
    /// The polygon that was hit
    pub polygon: Polygon,
}

/// A sphere, used both as a static collider and as a moving body proxy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// The center position of the sphere in world space
    pub position: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl Sphere {
    /// Creates a new sphere with the given center and radius
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self { position, radius }
    }

    /// Same sphere moved to a new center
    pub fn at(&self, position: Vec3) -> Self {
        Self { position, radius: self.radius }
    }

    /// Check if this sphere intersects with another
    pub fn intersects(&self, other: &Sphere) -> bool {
        let distance_squared = (self.position - other.position).norm_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }
}

/// A triangle from a static mesh
///
/// Winding is whatever the source buffer used; the plane and normal are
/// derived from the vertex order on demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Polygon {
    /// Triangle vertices in world space
    pub vertices: [Vec3; 3],
}

impl Polygon {
    /// Creates a new triangle
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { vertices: [v0, v1, v2] }
    }

    /// The plane through the three vertices (unit normal, right-hand rule)
    pub fn plane(&self) -> Plane {
        let [v0, v1, v2] = self.vertices;
        Plane::from_points(v0, v1, v2)
    }

    /// Unit normal, or zero for a degenerate triangle
    pub fn normal(&self) -> Vec3 {
        self.plane().normal()
    }

    /// Calculates the centroid (center point) of the triangle
    pub fn centroid(&self) -> Vec3 {
        let [v0, v1, v2] = self.vertices;
        (v0 + v1 + v2) / 3.0
    }

    /// The three edges as `(start, end)` pairs, in winding order
    pub fn edges(&self) -> [(Vec3, Vec3); 3] {
        let [v0, v1, v2] = self.vertices;
        [(v0, v1), (v1, v2), (v2, v0)]
    }

    /// Whether the vertices are collinear or coincident
    pub fn is_degenerate(&self) -> bool {
        self.plane().is_degenerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_inverse_direction_zero_is_signed_infinity() {
        let ray = Ray::new(Vec3::zeros(), Vec3::new(0.0, -0.0, 1.0));
        assert_eq!(ray.inv_direction.x, f32::INFINITY);
        assert_eq!(ray.inv_direction.y, f32::NEG_INFINITY);
        assert_relative_eq!(ray.inv_direction.z, 1.0);
    }

    #[test]
    fn test_towards_normalizes() {
        let ray = Ray::towards(Vec3::new(1.0, 1.0, 1.0), Vec3::new(1.0, 1.0, 5.0));
        assert_relative_eq!(ray.direction, Vec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(ray.point_at(2.0), Vec3::new(1.0, 1.0, 3.0));
    }

    #[test]
    fn test_towards_same_point_has_no_direction() {
        let ray = Ray::towards(Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(ray.direction, Vec3::zeros());
        assert!(ray.inv_direction.iter().all(|c| c.is_infinite()));
    }

    #[test]
    fn test_polygon_normal_and_centroid() {
        let polygon = Polygon::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        assert_relative_eq!(polygon.normal(), Vec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(polygon.centroid(), Vec3::new(1.0 / 3.0, 1.0 / 3.0, 0.0));
        assert!(!polygon.is_degenerate());
    }

    #[test]
    fn test_sphere_touching_counts() {
        let a = Sphere::new(Vec3::zeros(), 1.0);
        let b = Sphere::new(Vec3::new(2.0, 0.0, 0.0), 1.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&b.at(Vec3::new(2.1, 0.0, 0.0))));
    }
}
