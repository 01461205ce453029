//! Math utilities and types
//!
//! Vector arithmetic comes straight from nalgebra; this module adds the
//! implicit-form [`Plane`] and the tolerances shared by every collision test.

use serde::{Deserialize, Serialize};

pub use nalgebra::Vector3;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Absolute tolerance used for containment and distance comparisons
pub const EPSILON: f32 = 1.0e-3;

/// Minimum angle sum (radians) for a point to count as inside a triangle
///
/// A point in the triangle sees the three vertices over a full turn, so the
/// sum is 2π; anything short of 6.28 is outside.
pub const INSIDE_ANGLE_SUM: f32 = 6.28;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;
}

/// Math utility functions
pub mod utils {
    use super::Vec3;

    /// Clamp a value between min and max
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        if value < min { min } else if value > max { max } else { value }
    }

    /// Check whether `value` lies between `a` and `b` (in either order) within `tolerance`
    pub fn value_is_between(value: f32, a: f32, b: f32, tolerance: f32) -> bool {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        value >= low - tolerance && value <= high + tolerance
    }

    /// Angle between two unit vectors, with the cosine clamped into the `acos` domain
    pub fn angle_between_unit(a: &Vec3, b: &Vec3) -> f32 {
        clamp(a.dot(b), -1.0, 1.0).acos()
    }

    /// Normalize a vector, returning `None` when it is too short to have a direction
    pub fn try_normalize(v: &Vec3) -> Option<Vec3> {
        v.try_normalize(f32::EPSILON)
    }

    /// Componentwise approximate equality
    pub fn approx_eq(a: &Vec3, b: &Vec3, tolerance: f32) -> bool {
        (a - b).amax() <= tolerance
    }
}

/// A plane in implicit form: `a*x + b*y + c*z + d = 0`
///
/// `(a, b, c)` is the plane normal. It is not necessarily unit length;
/// call [`Plane::normalized`] when a true signed distance is needed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Normal X component
    pub a: f32,
    /// Normal Y component
    pub b: f32,
    /// Normal Z component
    pub c: f32,
    /// Offset
    pub d: f32,
}

impl Plane {
    /// Create a plane from its implicit coefficients
    pub const fn new(a: f32, b: f32, c: f32, d: f32) -> Self {
        Self { a, b, c, d }
    }

    /// Create a plane from a normal and any point on it
    pub fn from_normal_and_point(normal: Vec3, point: Vec3) -> Self {
        Self {
            a: normal.x,
            b: normal.y,
            c: normal.z,
            d: -normal.dot(&point),
        }
    }

    /// Create the plane through three points
    ///
    /// The normal follows the right-hand rule on `p0 -> p1 -> p2` and is
    /// normalized when the points are not collinear. Collinear points give a
    /// zero normal, which every consumer treats as "no plane".
    pub fn from_points(p0: Vec3, p1: Vec3, p2: Vec3) -> Self {
        let cross = (p1 - p0).cross(&(p2 - p0));
        let normal = utils::try_normalize(&cross).unwrap_or_else(Vec3::zeros);
        Self::from_normal_and_point(normal, p0)
    }

    /// The (possibly non-unit) normal `(a, b, c)`
    pub fn normal(&self) -> Vec3 {
        Vec3::new(self.a, self.b, self.c)
    }

    /// Whether the normal has no usable direction
    pub fn is_degenerate(&self) -> bool {
        self.normal().norm_squared() <= f32::EPSILON
    }

    /// Rescale so the normal has unit length, or `None` for a degenerate plane
    pub fn normalized(&self) -> Option<Self> {
        let length = self.normal().norm();
        if length <= f32::EPSILON {
            return None;
        }
        let inv = 1.0 / length;
        Some(Self::new(self.a * inv, self.b * inv, self.c * inv, self.d * inv))
    }

    /// Same plane with the normal pointing the other way
    pub fn flipped(&self) -> Self {
        Self::new(-self.a, -self.b, -self.c, -self.d)
    }

    /// Evaluate the implicit form at a point
    ///
    /// Equals the signed distance when the plane is normalized.
    pub fn evaluate(&self, point: &Vec3) -> f32 {
        self.normal().dot(point) + self.d
    }

    /// Signed distance from a point to the plane (positive on the normal side)
    pub fn distance_to_point(&self, point: &Vec3) -> f32 {
        let length = self.normal().norm();
        if length <= f32::EPSILON {
            return 0.0;
        }
        self.evaluate(point) / length
    }

    /// Check whether two planes describe the same surface, ignoring orientation
    pub fn coincides_with(&self, other: &Self, tolerance: f32) -> bool {
        let (Some(p), Some(q)) = (self.normalized(), other.normalized()) else {
            return false;
        };
        let same = (p.a - q.a).abs() <= tolerance
            && (p.b - q.b).abs() <= tolerance
            && (p.c - q.c).abs() <= tolerance
            && (p.d - q.d).abs() <= tolerance;
        let opposite = (p.a + q.a).abs() <= tolerance
            && (p.b + q.b).abs() <= tolerance
            && (p.c + q.c).abs() <= tolerance
            && (p.d + q.d).abs() <= tolerance;
        same || opposite
    }
}
