//! Sliding sphere demo
//!
//! Builds a small walled arena with a pyramid in the middle, fires random
//! rays at it, then rolls a sphere across the floor and logs how it
//! slides along the walls.
//!
//! Run with an optional scene file:
//!
//! ```text
//! RUST_LOG=debug cargo run -p slide_demo -- slide_demo/scenes/arena.toml
//! ```

use mini_collision::foundation::logging;
use mini_collision::prelude::*;
use mini_collision::physics::collision::{extract_polygons_from_bytes, extract_polygons_tagged};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Floats per vertex in the demo buffers: position followed by a normal
const STRIDE: usize = 6;

/// Scene description loaded from TOML or RON
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct SceneConfig {
    /// Half the width of the square arena
    arena_half_size: f32,
    wall_height: f32,
    pyramid_half_size: f32,
    pyramid_height: f32,
    /// Number of random rays fired at the arena
    ray_count: usize,
    /// Fixed seed for reproducible runs; random when absent
    seed: Option<u64>,
    sphere_radius: f32,
    sphere_start: Vec3,
    /// Displacement per step before collision
    sphere_velocity: Vec3,
    /// Downward pull added to the velocity each step
    gravity: f32,
    steps: usize,
    collision: CollisionConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            arena_half_size: 10.0,
            wall_height: 3.0,
            pyramid_half_size: 2.0,
            pyramid_height: 2.5,
            ray_count: 32,
            seed: None,
            sphere_radius: 0.5,
            sphere_start: Vec3::new(-6.0, 2.0, -4.0),
            sphere_velocity: Vec3::new(0.35, 0.0, 0.2),
            gravity: 0.05,
            steps: 120,
            collision: CollisionConfig::default(),
        }
    }
}

impl Config for SceneConfig {}

/// Append a vertex with a placeholder normal
fn push_vertex(buffer: &mut Vec<f32>, position: Vec3) {
    buffer.extend_from_slice(&[position.x, position.y, position.z, 0.0, 1.0, 0.0]);
}

/// Floor as a single quad, handed over as raw bytes like a GPU upload
fn floor_polygons(scene: &SceneConfig) -> Result<Vec<Polygon>, CollisionError> {
    let s = scene.arena_half_size;
    let mut buffer = Vec::with_capacity(4 * STRIDE);
    for corner in [(-s, -s), (-s, s), (s, s), (s, -s)] {
        push_vertex(&mut buffer, Vec3::new(corner.0, 0.0, corner.1));
    }
    extract_polygons_from_bytes(bytemuck::cast_slice(&buffer), STRIDE, Topology::Quads)
}

/// Four walls as one closed quad strip of bottom/top pairs
fn wall_polygons(scene: &SceneConfig) -> Result<Vec<Polygon>, CollisionError> {
    let s = scene.arena_half_size;
    let h = scene.wall_height;
    let mut buffer = Vec::with_capacity(10 * STRIDE);
    for corner in [(-s, -s), (-s, s), (s, s), (s, -s), (-s, -s)] {
        push_vertex(&mut buffer, Vec3::new(corner.0, 0.0, corner.1));
        push_vertex(&mut buffer, Vec3::new(corner.0, h, corner.1));
    }
    extract_polygons(&buffer, STRIDE, Topology::QuadStrip)
}

/// Four-sided pyramid around the origin as a fan from its apex
fn pyramid_polygons(scene: &SceneConfig) -> Result<Vec<Polygon>, CollisionError> {
    let s = scene.pyramid_half_size;
    let mut buffer = Vec::with_capacity(6 * STRIDE);
    push_vertex(&mut buffer, Vec3::new(0.0, scene.pyramid_height, 0.0));
    for corner in [(-s, -s), (-s, s), (s, s), (s, -s), (-s, -s)] {
        push_vertex(&mut buffer, Vec3::new(corner.0, 0.0, corner.1));
    }
    extract_polygons_tagged(&buffer, STRIDE, Topology::TriangleFan.gl_tag())
}

fn build_arena(scene: &SceneConfig) -> Result<MeshCollider, CollisionError> {
    let mut polygons = floor_polygons(scene)?;
    polygons.extend(wall_polygons(scene)?);
    polygons.extend(pyramid_polygons(scene)?);
    log::info!("Arena mesh: {} triangles", polygons.len());

    let collider = MeshCollider::with_config(polygons, scene.collision)?;
    let tree = collider.tree();
    log::info!(
        "Collision tree: {} nodes, {} leaves, depth {}",
        tree.node_count(),
        tree.leaf_count(),
        tree.depth()
    );
    Ok(collider)
}

/// Fire random rays from above the arena toward random floor points
fn cast_rays(collider: &MeshCollider, scene: &SceneConfig, rng: &mut StdRng) {
    let s = scene.arena_half_size;
    let mut hits = 0;
    let mut pyramid_hits = 0;

    for _ in 0..scene.ray_count {
        let origin = Vec3::new(rng.gen_range(-s..s), scene.wall_height * 4.0, rng.gen_range(-s..s));
        let target = Vec3::new(rng.gen_range(-s..s), 0.0, rng.gen_range(-s..s));
        let ray = Ray::towards(origin, target);

        let candidates = collider.tree().query_ray(&ray).len();
        match collider.raycast(&ray) {
            Some(hit) => {
                hits += 1;
                if hit.point.y > 1.0e-3 {
                    pyramid_hits += 1;
                }
                log::debug!(
                    "Ray {:?} -> hit at {:?} after {:.2} ({} candidates)",
                    origin,
                    hit.point,
                    hit.distance,
                    candidates
                );
            }
            None => log::debug!("Ray {:?} -> miss ({} candidates)", origin, candidates),
        }
    }

    log::info!(
        "Rays: {}/{} hit, {} on walls or pyramid",
        hits,
        scene.ray_count,
        pyramid_hits
    );
}

/// Roll the sphere around the arena, bouncing off anything that blocks it sideways
fn roll(collider: &MeshCollider, scene: &SceneConfig) {
    let mut sphere = Sphere::new(scene.sphere_start, scene.sphere_radius);
    let mut velocity = scene.sphere_velocity;
    let epsilon = scene.collision.epsilon;

    for step in 0..scene.steps {
        velocity.y -= scene.gravity;
        let target = sphere.position + velocity;
        let resolved = collider.move_sphere(&sphere, target);
        let blocked = target - resolved;

        if blocked.y.abs() > epsilon {
            velocity.y = 0.0;
        }
        if blocked.x.abs() > epsilon {
            log::info!("Step {}: bounced off x at {:?}", step, resolved);
            velocity.x = -velocity.x;
        }
        if blocked.z.abs() > epsilon {
            log::info!("Step {}: bounced off z at {:?}", step, resolved);
            velocity.z = -velocity.z;
        }

        log::debug!(
            "Step {}: {:?} -> {:?} ({} contacts)",
            step,
            sphere.position,
            resolved,
            collider.contacts(&sphere.at(resolved)).len()
        );
        sphere = sphere.at(resolved);
    }

    log::info!("Sphere finished at {:?}", sphere.position);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_default("info");

    let scene = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading scene from {}", path);
            SceneConfig::load_from_file(&path)?
        }
        None => SceneConfig::default(),
    };
    scene.collision.validate()?;

    let seed = scene.seed.unwrap_or_else(|| rand::thread_rng().gen());
    log::info!("Using seed {}", seed);
    let mut rng = StdRng::seed_from_u64(seed);

    let collider = build_arena(&scene)?;
    cast_rays(&collider, &scene, &mut rng);
    roll(&collider, &scene);

    Ok(())
}
