//! Physics module for collision detection and response
//!
//! Provides the narrow-phase collision tests, the sliding response, and
//! [`MeshCollider`], which ties them to an AABB tree over a static mesh.

pub mod collision;
mod collider;

use thiserror::Error;

pub use collision::{Polygon, Ray, RayHit, Sphere, Topology};
pub use collider::MeshCollider;

/// Collision core errors
#[derive(Error, Debug)]
pub enum CollisionError {
    /// Vertex buffer topology tag not recognized
    #[error("Unknown topology tag: {0:#06x}")]
    UnknownTopology(u32),

    /// Vertex stride too small to hold a position
    #[error("Invalid vertex stride {0}: each vertex needs at least 3 floats")]
    InvalidStride(usize),

    /// Raw byte buffer that cannot be viewed as `f32`s
    #[error("Misaligned vertex buffer: {0}")]
    MisalignedBuffer(String),

    /// Tree build requested over zero triangles
    #[error("Cannot build a collision tree from an empty mesh")]
    EmptyMesh,

    /// Invalid collision configuration
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}
