//! Axis-aligned bounding boxes
//!
//! Incremental box building over triangles, the longest-edge cut used by the
//! tree builder, and the slab test used by ray queries.

use crate::foundation::math::Vec3;
use super::primitives::{Polygon, Ray, Sphere};

/// Axis-aligned bounding box for spatial queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

/// Extend `bounds` so it covers every vertex of `polygon`
///
/// `None` means the box is still empty: the first vertex seeds both corners
/// instead of being min/max-ed against an uninitialized box.
pub fn add_polygon_to_box(polygon: &Polygon, bounds: &mut Option<Aabb>) {
    for vertex in &polygon.vertices {
        match bounds {
            Some(aabb) => aabb.extend(vertex),
            None => *bounds = Some(Aabb::from_point(*vertex)),
        }
    }
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Zero-volume box around a single point
    pub fn from_point(point: Vec3) -> Self {
        Self { min: point, max: point }
    }

    /// Tight box around a set of triangles, or `None` for an empty set
    pub fn enclosing<'a, I>(polygons: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Polygon>,
    {
        let mut bounds = None;
        for polygon in polygons {
            add_polygon_to_box(polygon, &mut bounds);
        }
        bounds
    }

    /// Grow the box to include a point
    pub fn extend(&mut self, point: &Vec3) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Edge lengths along each axis
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Index (0 = X, 1 = Y, 2 = Z) of the longest edge; ties prefer the earlier axis
    pub fn longest_axis(&self) -> usize {
        let size = self.size();
        if size.x >= size.y && size.x >= size.z {
            0
        } else if size.y >= size.z {
            1
        } else {
            2
        }
    }

    /// Split the box in half across its longest edge
    ///
    /// Both halves share the midpoint plane; the other two axes are copied
    /// unchanged. A box with no extent yields two copies of itself.
    pub fn cut(&self) -> (Self, Self) {
        let axis = self.longest_axis();
        let middle = (self.min[axis] + self.max[axis]) * 0.5;

        let mut left = *self;
        let mut right = *self;
        left.max[axis] = middle;
        right.min[axis] = middle;
        (left, right)
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: &Vec3) -> bool {
        self.contains_point_within(point, 0.0)
    }

    /// Containment with an absolute tolerance on every face
    pub fn contains_point_within(&self, point: &Vec3, tolerance: f32) -> bool {
        (0..3).all(|axis| {
            point[axis] >= self.min[axis] - tolerance && point[axis] <= self.max[axis] + tolerance
        })
    }

    /// Check if this AABB intersects another AABB
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Closest point of the box to `point`
    pub fn closest_point(&self, point: &Vec3) -> Vec3 {
        Vec3::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
            point.z.clamp(self.min.z, self.max.z),
        )
    }

    /// Check if a sphere overlaps the box
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        let closest = self.closest_point(&sphere.position);
        (closest - sphere.position).norm_squared() <= sphere.radius * sphere.radius
    }

    /// Slab test against a ray
    ///
    /// Returns the `(near, far)` parameter interval where the ray's line is
    /// inside the box. An axis with a zero direction component never divides:
    /// the interval is unbounded when the origin lies within that slab and
    /// empty otherwise. The interval may lie entirely behind the origin; this
    /// is a broad-phase test and stays conservative.
    pub fn ray_interval(&self, ray: &Ray) -> Option<(f32, f32)> {
        let mut near = f32::NEG_INFINITY;
        let mut far = f32::INFINITY;

        for axis in 0..3 {
            let origin = ray.position[axis];
            let (min, max) = (self.min[axis], self.max[axis]);

            if ray.direction[axis] == 0.0 {
                // Parallel to this slab
                if origin < min || origin > max {
                    return None;
                }
                continue;
            }

            let inv = ray.inv_direction[axis];
            let t1 = (min - origin) * inv;
            let t2 = (max - origin) * inv;
            near = near.max(t1.min(t2));
            far = far.min(t1.max(t2));
        }

        (far >= near).then_some((near, far))
    }

    /// Whether the ray's slab interval is non-empty
    pub fn intersects_ray(&self, ray: &Ray) -> bool {
        self.ray_interval(ray).is_some()
    }
}
