//! Polygon extraction from interleaved vertex buffers
//!
//! Model loaders hand over a flat `f32` buffer where each vertex occupies
//! `stride` floats and the first three are its position. This module turns
//! that buffer into a list of discrete triangles for the tree builder.

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;
use crate::physics::CollisionError;
use super::primitives::Polygon;

/// Primitive topology of a vertex buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topology {
    /// Independent triangles, 3 vertices each
    Triangles,
    /// Each vertex after the second adds a triangle with the previous two
    TriangleStrip,
    /// Each vertex after the second adds a triangle with the first and the previous one
    TriangleFan,
    /// Independent quads, 4 vertices each
    Quads,
    /// Each pair of vertices after the first pair adds a quad
    QuadStrip,
}

impl Topology {
    /// GL enum value for this topology
    pub const fn gl_tag(self) -> u32 {
        match self {
            Self::Triangles => 0x0004,
            Self::TriangleStrip => 0x0005,
            Self::TriangleFan => 0x0006,
            Self::Quads => 0x0007,
            Self::QuadStrip => 0x0008,
        }
    }

    /// Number of triangles produced by `vertex_count` vertices
    pub const fn triangle_count(self, vertex_count: usize) -> usize {
        match self {
            Self::Triangles => vertex_count / 3,
            Self::TriangleStrip | Self::TriangleFan => vertex_count.saturating_sub(2),
            Self::Quads => (vertex_count / 4) * 2,
            Self::QuadStrip => (vertex_count.saturating_sub(2) / 2) * 2,
        }
    }
}

impl TryFrom<u32> for Topology {
    type Error = CollisionError;

    fn try_from(tag: u32) -> Result<Self, Self::Error> {
        match tag {
            0x0004 => Ok(Self::Triangles),
            0x0005 => Ok(Self::TriangleStrip),
            0x0006 => Ok(Self::TriangleFan),
            0x0007 => Ok(Self::Quads),
            0x0008 => Ok(Self::QuadStrip),
            other => Err(CollisionError::UnknownTopology(other)),
        }
    }
}

/// Extract triangles from a flat vertex buffer
///
/// Trailing vertices that cannot complete a primitive are ignored, and an
/// empty buffer yields an empty list. Strips alternate the order of the first
/// two vertices on odd triangles so every triangle keeps the strip's winding;
/// quads are split along the diagonal from their first vertex.
pub fn extract_polygons(
    buffer: &[f32],
    stride: usize,
    topology: Topology,
) -> Result<Vec<Polygon>, CollisionError> {
    if stride < 3 {
        return Err(CollisionError::InvalidStride(stride));
    }

    let positions: Vec<Vec3> = buffer
        .chunks_exact(stride)
        .map(|vertex| Vec3::new(vertex[0], vertex[1], vertex[2]))
        .collect();

    if buffer.len() % stride != 0 {
        log::warn!(
            "Vertex buffer length {} is not a multiple of stride {}; ignoring {} trailing floats",
            buffer.len(),
            stride,
            buffer.len() % stride
        );
    }

    let mut polygons = Vec::with_capacity(topology.triangle_count(positions.len()));
    let p = &positions;

    match topology {
        Topology::Triangles => {
            for tri in p.chunks_exact(3) {
                polygons.push(Polygon::new(tri[0], tri[1], tri[2]));
            }
        }
        Topology::TriangleStrip => {
            for i in 0..p.len().saturating_sub(2) {
                if i % 2 == 0 {
                    polygons.push(Polygon::new(p[i], p[i + 1], p[i + 2]));
                } else {
                    polygons.push(Polygon::new(p[i + 1], p[i], p[i + 2]));
                }
            }
        }
        Topology::TriangleFan => {
            for i in 1..p.len().saturating_sub(1) {
                polygons.push(Polygon::new(p[0], p[i], p[i + 1]));
            }
        }
        Topology::Quads => {
            for quad in p.chunks_exact(4) {
                polygons.push(Polygon::new(quad[0], quad[1], quad[2]));
                polygons.push(Polygon::new(quad[0], quad[2], quad[3]));
            }
        }
        Topology::QuadStrip => {
            // Quad i is v[2i], v[2i+1], v[2i+3], v[2i+2] in perimeter order
            let mut i = 0;
            while i + 3 < p.len() {
                polygons.push(Polygon::new(p[i], p[i + 1], p[i + 3]));
                polygons.push(Polygon::new(p[i], p[i + 3], p[i + 2]));
                i += 2;
            }
        }
    }

    log::debug!(
        "Extracted {} triangles from {} vertices ({:?})",
        polygons.len(),
        positions.len(),
        topology
    );

    Ok(polygons)
}

/// Extract triangles using a raw GL topology tag
pub fn extract_polygons_tagged(
    buffer: &[f32],
    stride: usize,
    topology_tag: u32,
) -> Result<Vec<Polygon>, CollisionError> {
    let topology = Topology::try_from(topology_tag).map_err(|e| {
        log::warn!("Rejecting vertex buffer: {}", e);
        e
    })?;
    extract_polygons(buffer, stride, topology)
}

/// Extract triangles from a raw byte buffer of native-endian `f32`s
///
/// The bytes are viewed in place; the buffer must be 4-byte aligned and a
/// whole number of floats long.
pub fn extract_polygons_from_bytes(
    bytes: &[u8],
    stride: usize,
    topology: Topology,
) -> Result<Vec<Polygon>, CollisionError> {
    let floats: &[f32] = bytemuck::try_cast_slice(bytes)
        .map_err(|e| CollisionError::MisalignedBuffer(format!("{:?}", e)))?;
    extract_polygons(floats, stride, topology)
}
