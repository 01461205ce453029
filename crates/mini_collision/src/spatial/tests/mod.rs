//! Property tests for the AABB tree over randomized meshes
