//! Spatial partitioning data structures
//!
//! Provides the AABB tree used as the broad-phase for ray and sphere
//! queries against static meshes.

mod aabb_tree;

#[cfg(test)]
mod tests;

pub use aabb_tree::{build_tree, AabbNode, AabbTree, NodeId};
