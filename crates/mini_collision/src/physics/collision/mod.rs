//! Collision detection against static triangle meshes
//!
//! Narrow-phase geometry for the AABB tree in [`crate::spatial`].
//!
//! # Module Organization
//!
//! - [`primitives`] - Basic geometric primitives (rays, spheres, triangles)
//! - [`bounds`] - Axis-aligned boxes, longest-edge cut and slab test
//! - [`extract`] - Triangle extraction from interleaved vertex buffers
//! - [`intersect`] - Precise ray, triangle and sphere tests
//! - [`response`] - Sliding response along a contact plane

pub mod primitives;
pub mod bounds;
pub mod extract;
pub mod intersect;
pub mod response;

// Re-export commonly used types
pub use primitives::{Polygon, Ray, RayHit, Sphere};
pub use bounds::{add_polygon_to_box, Aabb};
pub use extract::{extract_polygons, extract_polygons_from_bytes, extract_polygons_tagged, Topology};
pub use intersect::{
    point_in_polygon, point_in_polygon_with, polygon_polygon_intersect, polygon_polygon_intersect_with,
    ray_plane_intersection, ray_polygon_intersection, segment_segment_distance, sphere_polygon_intersect,
    sphere_polygon_intersect_with,
};
pub use response::{slide, sphere_polygon_intersect_and_slide, sphere_polygon_intersect_and_slide_with};
