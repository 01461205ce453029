//! Sliding collision response
//!
//! When a moving sphere touches a surface it should keep its tangential
//! motion and only lose the component pushing into the surface. Placing the
//! center exactly `radius` away from the contact plane, on the side it came
//! from, achieves that.

use crate::foundation::math::{Plane, Vec3, INSIDE_ANGLE_SUM};
use super::intersect::sphere_polygon_intersect_with;
use super::primitives::{Polygon, Sphere};

/// Position at distance `radius` from `plane`, on the side `position` is on
///
/// The center is projected onto the plane and pushed back out along the
/// normal, so movement parallel to the plane is untouched. A degenerate plane
/// has no normal to push along and leaves the position unchanged.
pub fn slide(plane: &Plane, position: Vec3, radius: f32) -> Vec3 {
    let Some(plane) = plane.normalized() else {
        return position;
    };

    let normal = plane.normal();
    let distance = plane.evaluate(&position);
    let side = if distance < 0.0 { -1.0 } else { 1.0 };

    let on_plane = position - normal * distance;
    on_plane + normal * (radius * side)
}

/// Test a sphere against a triangle and, on contact, return the plane to slide along
///
/// The returned plane is normalized and oriented so the sphere center is on
/// its positive side; feed it to [`slide`] with the sphere's radius.
pub fn sphere_polygon_intersect_and_slide(sphere: &Sphere, polygon: &Polygon) -> Option<Plane> {
    sphere_polygon_intersect_and_slide_with(sphere, polygon, INSIDE_ANGLE_SUM)
}

/// [`sphere_polygon_intersect_and_slide`] with an explicit point-in-triangle threshold
pub fn sphere_polygon_intersect_and_slide_with(
    sphere: &Sphere,
    polygon: &Polygon,
    angle_sum_threshold: f32,
) -> Option<Plane> {
    if !sphere_polygon_intersect_with(sphere, polygon, angle_sum_threshold) {
        return None;
    }

    let plane = polygon.plane().normalized()?;
    if plane.evaluate(&sphere.position) < 0.0 {
        Some(plane.flipped())
    } else {
        Some(plane)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn floor() -> Polygon {
        Polygon::new(
            Vec3::new(-10.0, 0.0, -10.0),
            Vec3::new(10.0, 0.0, -10.0),
            Vec3::new(0.0, 0.0, 10.0),
        )
    }

    #[test]
    fn test_slide_from_above() {
        let plane = Plane::new(0.0, 1.0, 0.0, 0.0);
        let result = slide(&plane, Vec3::new(0.0, 2.0, 0.0), 0.5);
        assert_relative_eq!(result.y, 0.5, epsilon = 1.0e-3);
        assert_relative_eq!(result.x, 0.0);
        assert_relative_eq!(result.z, 0.0);
    }

    #[test]
    fn test_slide_keeps_tangential_components() {
        let plane = Plane::new(0.0, 1.0, 0.0, 0.0);
        let result = slide(&plane, Vec3::new(3.0, 0.2, -7.0), 0.5);
        assert_relative_eq!(result, Vec3::new(3.0, 0.5, -7.0), epsilon = 1.0e-6);
    }

    #[test]
    fn test_slide_from_behind_stays_behind() {
        let plane = Plane::new(0.0, 1.0, 0.0, 0.0);
        let result = slide(&plane, Vec3::new(1.0, -0.1, 0.0), 0.5);
        assert_relative_eq!(result, Vec3::new(1.0, -0.5, 0.0), epsilon = 1.0e-6);
    }

    #[test]
    fn test_slide_non_unit_tilted_plane() {
        // x + y = 0, scaled by 3
        let plane = Plane::new(3.0, 3.0, 0.0, 0.0);
        let result = slide(&plane, Vec3::new(2.0, 2.0, 1.0), 1.0);
        let unit = Plane::new(1.0, 1.0, 0.0, 0.0).normalized().unwrap();
        assert_relative_eq!(unit.evaluate(&result), 1.0, epsilon = 1.0e-5);
        assert_relative_eq!(result.z, 1.0);
    }

    #[test]
    fn test_slide_degenerate_plane_is_noop() {
        let position = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(slide(&Plane::new(0.0, 0.0, 0.0, 5.0), position, 1.0), position);
    }

    #[test]
    fn test_intersect_and_slide_orients_plane_toward_sphere() {
        // Floor winding gives a downward normal; the returned plane must face up
        assert!(floor().normal().y < 0.0);

        let sphere = Sphere::new(Vec3::new(1.0, 0.3, 1.0), 0.5);
        let plane = sphere_polygon_intersect_and_slide(&sphere, &floor()).expect("touching floor");
        assert!(plane.b > 0.0);

        let resolved = slide(&plane, sphere.position, sphere.radius);
        assert_relative_eq!(resolved, Vec3::new(1.0, 0.5, 1.0), epsilon = 1.0e-5);
    }

    #[test]
    fn test_intersect_and_slide_miss() {
        let sphere = Sphere::new(Vec3::new(1.0, 3.0, 1.0), 0.5);
        assert!(sphere_polygon_intersect_and_slide(&sphere, &floor()).is_none());
    }
}
