//! Static mesh collider
//!
//! Bundles an [`AabbTree`] with the [`CollisionConfig`] it was built from and
//! answers the per-frame questions a game asks of level geometry: what does
//! this ray hit, what is this sphere touching, and where does a moving
//! sphere end up once it slides along whatever it touched.

use crate::config::CollisionConfig;
use crate::foundation::math::{Plane, Vec3};
use crate::spatial::AabbTree;
use super::collision::{
    extract_polygons, polygon_polygon_intersect_with, slide, sphere_polygon_intersect_and_slide_with,
    Aabb, Polygon, Ray, RayHit, Sphere, Topology,
};
use super::CollisionError;

/// Collision geometry for one static mesh
#[derive(Debug, Clone)]
pub struct MeshCollider {
    tree: AabbTree,
    config: CollisionConfig,
}

impl MeshCollider {
    /// Build a collider over `polygons` with default settings
    pub fn new(polygons: Vec<Polygon>) -> Result<Self, CollisionError> {
        Self::with_config(polygons, CollisionConfig::default())
    }

    /// Build a collider over `polygons`
    pub fn with_config(polygons: Vec<Polygon>, config: CollisionConfig) -> Result<Self, CollisionError> {
        config.validate()?;
        let tree = AabbTree::build_with_config(polygons, config.tree)?;
        Ok(Self { tree, config })
    }

    /// Extract triangles from a vertex buffer and build a collider over them
    pub fn from_vertex_buffer(buffer: &[f32], stride: usize, topology: Topology) -> Result<Self, CollisionError> {
        Self::from_vertex_buffer_with_config(buffer, stride, topology, CollisionConfig::default())
    }

    /// [`MeshCollider::from_vertex_buffer`] with explicit settings
    pub fn from_vertex_buffer_with_config(
        buffer: &[f32],
        stride: usize,
        topology: Topology,
        config: CollisionConfig,
    ) -> Result<Self, CollisionError> {
        let polygons = extract_polygons(buffer, stride, topology)?;
        Self::with_config(polygons, config)
    }

    /// The underlying broad-phase tree
    pub fn tree(&self) -> &AabbTree {
        &self.tree
    }

    /// Settings this collider was built with
    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// Closest hit in front of the ray origin
    pub fn raycast(&self, ray: &Ray) -> Option<RayHit> {
        self.tree.raycast_with(ray, self.config.inside_angle_sum)
    }

    /// Sliding planes of every triangle the sphere touches
    ///
    /// Each plane is normalized and faces the sphere center.
    pub fn contacts(&self, sphere: &Sphere) -> Vec<Plane> {
        self.tree
            .query_sphere(sphere)
            .into_iter()
            .filter_map(|polygon| {
                sphere_polygon_intersect_and_slide_with(sphere, polygon, self.config.inside_angle_sum)
            })
            .collect()
    }

    /// Check whether a triangle touches any triangle of the mesh
    pub fn intersects_polygon(&self, polygon: &Polygon) -> bool {
        let Some(bounds) = Aabb::enclosing([polygon]) else {
            return false;
        };
        self.tree
            .query_aabb(&bounds)
            .into_iter()
            .any(|candidate| {
                polygon_polygon_intersect_with(polygon, candidate, self.config.epsilon, self.config.inside_angle_sum)
            })
    }

    /// Move a sphere toward `target`, sliding along any surface it touches
    ///
    /// Contacts are resolved against the planes as seen from the sphere's
    /// starting side, for at most `max_slide_iterations` passes. Moves are
    /// expected to be short relative to the radius; a sphere that passes
    /// completely through a triangle in one step never touches it.
    pub fn move_sphere(&self, sphere: &Sphere, target: Vec3) -> Vec3 {
        let start = sphere.position;
        let radius = sphere.radius;
        let mut position = target;

        for pass in 0..self.config.max_slide_iterations {
            let planes = self.contacts(&sphere.at(position));
            let mut adjusted = false;

            for plane in planes {
                // Face the side the body approached from
                let plane = if plane.evaluate(&start) < 0.0 { plane.flipped() } else { plane };

                let distance = plane.evaluate(&position);
                if distance >= radius - self.config.epsilon {
                    continue;
                }

                // Crossed over: bring the center back to the plane before sliding
                let base = if distance < 0.0 {
                    position - plane.normal() * distance
                } else {
                    position
                };
                position = slide(&plane, base, radius);
                adjusted = true;
            }

            if !adjusted {
                log::trace!("Sphere move settled after {} slide passes", pass);
                break;
            }
        }

        position
    }
}
