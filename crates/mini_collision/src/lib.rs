//! # Mini Collision
//!
//! Collision detection for static triangle meshes: an AABB tree broad-phase,
//! precise ray/triangle and triangle/triangle tests, and a sliding response
//! that lets a moving sphere glide along the surface it touches.
//!
//! ## Features
//!
//! - **Polygon Extraction**: Triangles, strips, fans, quads and quad strips
//! - **AABB Tree**: Longest-axis binary partition with guaranteed termination
//! - **Ray Queries**: Slab-test broad-phase plus angle-sum point-in-triangle
//! - **Sliding Response**: Sphere movement constrained to the contact plane
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mini_collision::prelude::*;
//!
//! fn main() -> Result<(), CollisionError> {
//!     // Two triangles forming a 10x10 floor at y = 0
//!     let floor = [
//!         -5.0, 0.0, -5.0,   5.0, 0.0, -5.0,   5.0, 0.0, 5.0,
//!         -5.0, 0.0, -5.0,   5.0, 0.0,  5.0,  -5.0, 0.0, 5.0,
//!     ];
//!     let collider = MeshCollider::from_vertex_buffer(&floor, 3, Topology::Triangles)?;
//!
//!     let ray = Ray::towards(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, 0.0, 0.0));
//!     if let Some(hit) = collider.raycast(&ray) {
//!         println!("hit floor at {:?}", hit.point);
//!     }
//!
//!     let player = Sphere::new(Vec3::new(0.0, 0.5, 0.0), 0.5);
//!     let next = collider.move_sphere(&player, Vec3::new(1.0, -0.2, 0.0));
//!     println!("player slides to {:?}", next);
//!     Ok(())
//! }
//! ```

pub mod foundation;
pub mod config;
pub mod physics;
pub mod spatial;

pub use config::{CollisionConfig, TreeConfig};
pub use physics::{CollisionError, MeshCollider};
pub use spatial::{build_tree, AabbTree};

/// Common imports for collision users
pub mod prelude {
    pub use crate::{
        config::{CollisionConfig, Config, ConfigError, TreeConfig},
        foundation::math::{Plane, Vec3},
        physics::{
            collision::{
                extract_polygons, polygon_polygon_intersect, ray_plane_intersection,
                ray_polygon_intersection, slide, sphere_polygon_intersect_and_slide, Aabb,
                Polygon, Ray, RayHit, Sphere, Topology,
            },
            CollisionError, MeshCollider,
        },
        spatial::{build_tree, AabbNode, AabbTree, NodeId},
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_lints_come_from_workspace() {
        let manifest = include_str!("../Cargo.toml");
        assert!(manifest.contains("[lints]\nworkspace = true"));

        let root = include_str!("lib.rs");
        let crate_attr = concat!("#", "![warn(");
        assert!(!root.contains(crate_attr));
    }
}
