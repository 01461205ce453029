//! AABB tree spatial partitioning structure
//!
//! A binary tree of axis-aligned boxes over a static triangle soup. Each node
//! cuts its box in half across the longest edge and hands every triangle to
//! one of the halves, until a split stops reducing the triangle count.
//!
//! Nodes live in a [`SlotMap`] arena owned by the tree. Children are owned
//! through their keys; the `parent` key is a plain back-reference and never
//! keeps anything alive.
//!
//! Triangles that straddle a cut are not clipped. They go whole to the side
//! that contains their first matching vertex, so a triangle can poke out of
//! the half-box it was assigned to. Node boxes are recomputed from the
//! triangles they actually hold, which keeps every box tight and the ray
//! query a correct broad-phase filter.

use slotmap::{new_key_type, SlotMap};

use crate::config::TreeConfig;
use crate::foundation::math::INSIDE_ANGLE_SUM;
use crate::physics::collision::{intersect, Aabb, Polygon, Ray, RayHit, Sphere};
use crate::physics::CollisionError;

new_key_type! {
    /// Handle to a node inside an [`AabbTree`]
    pub struct NodeId;
}

/// Single node in the AABB tree
#[derive(Debug, Clone)]
pub struct AabbNode {
    parent: Option<NodeId>,
    children: Option<[NodeId; 2]>,
    bounds: Aabb,
    polygons: Vec<Polygon>,
    depth: u32,
}

impl AabbNode {
    fn new(parent: Option<NodeId>, bounds: Aabb, depth: u32) -> Self {
        Self {
            parent,
            children: None,
            bounds,
            polygons: Vec::new(),
            depth,
        }
    }

    /// Parent node, `None` for the root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Left child, present on internal nodes only
    pub fn left(&self) -> Option<NodeId> {
        self.children.map(|[left, _]| left)
    }

    /// Right child, present on internal nodes only
    pub fn right(&self) -> Option<NodeId> {
        self.children.map(|[_, right]| right)
    }

    /// Both children, or `None` for a leaf
    pub fn children(&self) -> Option<[NodeId; 2]> {
        self.children
    }

    /// Tight box around every triangle under this node
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Triangles stored here; empty on internal nodes
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Depth in the tree (0 = root)
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Check if this node is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Which half-box a triangle is assigned to during a split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Pick the half-box for a triangle
///
/// Vertices are checked in order, each against the left box and then the
/// right box; the first containment wins. A triangle matching neither (only
/// possible through rounding) goes left so nothing is dropped.
fn assign_side(polygon: &Polygon, left: &Aabb, right: &Aabb, epsilon: f32) -> Side {
    for vertex in &polygon.vertices {
        if left.contains_point_within(vertex, epsilon) {
            return Side::Left;
        }
        if right.contains_point_within(vertex, epsilon) {
            return Side::Right;
        }
    }
    Side::Left
}

fn partition(polygons: Vec<Polygon>, bounds: &Aabb, epsilon: f32) -> (Vec<Polygon>, Vec<Polygon>) {
    let (left_box, right_box) = bounds.cut();
    let mut left = Vec::with_capacity(polygons.len() / 2);
    let mut right = Vec::with_capacity(polygons.len() / 2);

    for polygon in polygons {
        match assign_side(&polygon, &left_box, &right_box, epsilon) {
            Side::Left => left.push(polygon),
            Side::Right => right.push(polygon),
        }
    }

    (left, right)
}

/// AABB tree over a static triangle mesh
#[derive(Debug, Clone, Default)]
pub struct AabbTree {
    nodes: SlotMap<NodeId, AabbNode>,
    root: Option<NodeId>,
    config: TreeConfig,
}

impl AabbTree {
    /// Create an empty tree; every query on it returns nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree over `polygons` with the default configuration
    pub fn build(polygons: Vec<Polygon>) -> Result<Self, CollisionError> {
        Self::build_with_config(polygons, TreeConfig::default())
    }

    /// Build a tree over `polygons`
    ///
    /// Fails with [`CollisionError::EmptyMesh`] when there is nothing to
    /// partition.
    pub fn build_with_config(polygons: Vec<Polygon>, config: TreeConfig) -> Result<Self, CollisionError> {
        config.validate()?;

        let Some(bounds) = Aabb::enclosing(&polygons) else {
            log::warn!("Refusing to build an AABB tree over an empty mesh");
            return Err(CollisionError::EmptyMesh);
        };

        let polygon_count = polygons.len();
        let mut tree = Self {
            nodes: SlotMap::with_capacity_and_key(polygon_count.max(1) * 2),
            root: None,
            config,
        };

        let root = tree.nodes.insert(AabbNode::new(None, bounds, 0));
        tree.root = Some(root);

        let mut pending = vec![(root, polygons)];
        while let Some((id, polygons)) = pending.pop() {
            tree.populate(id, polygons, &mut pending);
        }

        log::debug!(
            "Built AABB tree: {} triangles, {} nodes, {} leaves, depth {}",
            polygon_count,
            tree.node_count(),
            tree.leaf_count(),
            tree.depth()
        );

        Ok(tree)
    }

    /// Split one node, or turn it into a leaf when splitting stops helping
    fn populate(&mut self, id: NodeId, polygons: Vec<Polygon>, pending: &mut Vec<(NodeId, Vec<Polygon>)>) {
        let node = &self.nodes[id];
        let (bounds, depth) = (node.bounds, node.depth);

        let depth_reached = self.config.max_depth.is_some_and(|max| depth >= max);
        let (mut left_set, right_set) = partition(polygons, &bounds, self.config.epsilon);

        let split = if depth_reached {
            None
        } else {
            Aabb::enclosing(&left_set).zip(Aabb::enclosing(&right_set))
        };

        let Some((left_bounds, right_bounds)) = split else {
            // No reduction: one side got everything
            left_set.extend(right_set);
            self.nodes[id].polygons = left_set;
            return;
        };

        let left = self.nodes.insert(AabbNode::new(Some(id), left_bounds, depth + 1));
        let right = self.nodes.insert(AabbNode::new(Some(id), right_bounds, depth + 1));
        self.nodes[id].children = Some([left, right]);

        pending.push((right, right_set));
        pending.push((left, left_set));
    }

    /// Root node, `None` for an empty tree
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Look up a node
    pub fn node(&self, id: NodeId) -> Option<&AabbNode> {
        self.nodes.get(id)
    }

    /// Box around the whole mesh
    pub fn bounds(&self) -> Option<Aabb> {
        self.root.map(|root| self.nodes[root].bounds)
    }

    /// The configuration the tree was built with
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Check if the tree holds no triangles
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Total number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaf nodes
    pub fn leaf_count(&self) -> usize {
        self.nodes.values().filter(|node| node.is_leaf()).count()
    }

    /// Depth of the deepest node (0 for a single leaf)
    pub fn depth(&self) -> u32 {
        self.nodes.values().map(AabbNode::depth).max().unwrap_or(0)
    }

    /// Number of triangles stored across all leaves
    pub fn polygon_count(&self) -> usize {
        self.nodes.values().map(|node| node.polygons.len()).sum()
    }

    /// Get all leaf nodes
    pub fn leaves(&self) -> Vec<&AabbNode> {
        self.nodes.values().filter(|node| node.is_leaf()).collect()
    }

    /// Every stored triangle, leaf by leaf
    pub fn iter_polygons(&self) -> impl Iterator<Item = &Polygon> {
        self.nodes.values().flat_map(|node| node.polygons.iter())
    }

    /// Walk the tree, descending only into nodes whose box passes `accept`,
    /// and gather the triangles of every accepted leaf
    fn collect_leaves<F>(&self, accept: F) -> Vec<&Polygon>
    where
        F: Fn(&Aabb) -> bool,
    {
        let mut results = Vec::new();
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        let mut visited = 0usize;

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            visited += 1;

            if !accept(&node.bounds) {
                continue;
            }

            match node.children {
                None => results.extend(node.polygons.iter()),
                Some([left, right]) => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }

        log::trace!("AABB query visited {} nodes, {} candidates", visited, results.len());
        results
    }

    /// Candidate triangles for a ray
    ///
    /// Returns every triangle in every leaf whose box the ray's slab test
    /// accepts. This is a broad-phase filter: candidates still need a precise
    /// test, and the order is unspecified.
    pub fn query_ray(&self, ray: &Ray) -> Vec<&Polygon> {
        self.collect_leaves(|bounds| bounds.intersects_ray(ray))
    }

    /// Candidate triangles for a sphere
    pub fn query_sphere(&self, sphere: &Sphere) -> Vec<&Polygon> {
        self.collect_leaves(|bounds| bounds.intersects_sphere(sphere))
    }

    /// Candidate triangles whose leaf box overlaps `bounds`
    pub fn query_aabb(&self, bounds: &Aabb) -> Vec<&Polygon> {
        self.collect_leaves(|node_bounds| node_bounds.intersects(bounds))
    }

    /// Closest triangle hit in front of the ray origin
    pub fn raycast(&self, ray: &Ray) -> Option<RayHit> {
        self.raycast_with(ray, INSIDE_ANGLE_SUM)
    }

    /// [`AabbTree::raycast`] with an explicit point-in-triangle threshold
    pub fn raycast_with(&self, ray: &Ray, angle_sum_threshold: f32) -> Option<RayHit> {
        self.query_ray(ray)
            .into_iter()
            .filter_map(|polygon| intersect::ray_polygon_hit(ray, polygon, angle_sum_threshold))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Release every node, children before their parents
    ///
    /// Returns the number of nodes released. The tree is empty afterwards.
    pub fn clear(&mut self) -> usize {
        let Some(root) = self.root.take() else {
            return 0;
        };

        // Pre-order walk; reversed, every node comes after all its descendants
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some([left, right]) = self.nodes[id].children {
                stack.push(right);
                stack.push(left);
            }
        }

        let released = order
            .into_iter()
            .rev()
            .filter(|id| self.nodes.remove(*id).is_some())
            .count();

        log::debug!("Released {} AABB tree nodes", released);
        released
    }
}

/// Build an AABB tree over a triangle list
pub fn build_tree(polygons: Vec<Polygon>) -> Result<AabbTree, CollisionError> {
    AabbTree::build(polygons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Vec3, EPSILON};
    use approx::assert_relative_eq;

    /// Small triangle centered at `(x, y, z)`
    fn tri_at(x: f32, y: f32, z: f32) -> Polygon {
        Polygon::new(
            Vec3::new(x - 0.25, y, z - 0.25),
            Vec3::new(x + 0.25, y, z - 0.25),
            Vec3::new(x, y + 0.1, z + 0.25),
        )
    }

    fn row_of_triangles(count: usize) -> Vec<Polygon> {
        (0..count).map(|i| tri_at(i as f32 * 2.0, 0.0, 0.0)).collect()
    }

    #[test]
    fn test_empty_mesh_rejected() {
        assert!(matches!(AabbTree::build(Vec::new()), Err(CollisionError::EmptyMesh)));
        assert!(matches!(build_tree(Vec::new()), Err(CollisionError::EmptyMesh)));
    }

    #[test]
    fn test_default_tree_answers_nothing() {
        let tree = AabbTree::new();
        let ray = Ray::new(Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0));
        assert!(tree.is_empty());
        assert!(tree.query_ray(&ray).is_empty());
        assert!(tree.raycast(&ray).is_none());
        assert!(tree.bounds().is_none());
    }

    #[test]
    fn test_single_triangle_is_one_leaf() {
        let tree = AabbTree::build(vec![tri_at(0.0, 0.0, 0.0)]).unwrap();
        assert_eq!(tree.node_count(), 1);
        let root = tree.node(tree.root().unwrap()).unwrap();
        assert!(root.is_leaf());
        assert_eq!(root.polygons().len(), 1);
        assert!(root.parent().is_none());
    }

    #[test]
    fn test_row_splits_and_links_parents() {
        let tree = AabbTree::build(row_of_triangles(8)).unwrap();
        assert!(tree.node_count() > 1);
        assert_eq!(tree.polygon_count(), 8);

        let root_id = tree.root().unwrap();
        let root = tree.node(root_id).unwrap();
        assert!(root.polygons().is_empty());

        let [left, right] = root.children().expect("root splits");
        assert_eq!(tree.node(left).unwrap().parent(), Some(root_id));
        assert_eq!(tree.node(right).unwrap().parent(), Some(root_id));
        assert_eq!(root.left(), Some(left));
        assert_eq!(root.right(), Some(right));

        // Cut along X at the midpoint: left half keeps the low-x triangles
        assert!(tree.node(left).unwrap().bounds().max.x < tree.node(right).unwrap().bounds().min.x);
    }

    #[test]
    fn test_child_bounds_are_tight() {
        let tree = AabbTree::build(row_of_triangles(4)).unwrap();
        let root = tree.node(tree.root().unwrap()).unwrap();
        let left = tree.node(root.left().unwrap()).unwrap();

        // Halving the root box would put the left max at x = 3.0
        assert_relative_eq!(left.bounds().min.x, -0.25);
        assert_relative_eq!(left.bounds().max.x, 2.25);
        assert_relative_eq!(left.bounds().min.z, -0.25);
        assert_relative_eq!(left.bounds().max.y, 0.1);
    }

    #[test]
    fn test_max_depth_caps_tree() {
        let config = TreeConfig::default().with_max_depth(1);
        let tree = AabbTree::build_with_config(row_of_triangles(16), config).unwrap();
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.polygon_count(), 16);
        assert_eq!(tree.leaf_count(), 2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TreeConfig::default().with_epsilon(-1.0);
        let result = AabbTree::build_with_config(row_of_triangles(2), config);
        assert!(matches!(result, Err(CollisionError::Config(_))));
    }

    #[test]
    fn test_query_ray_prunes_far_leaves() {
        let tree = AabbTree::build(row_of_triangles(8)).unwrap();
        // Straight down onto the third triangle
        let ray = Ray::new(Vec3::new(4.0, 5.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let candidates = tree.query_ray(&ray);

        assert!(!candidates.is_empty());
        assert!(candidates.len() < 8);
        assert!(candidates.iter().any(|p| **p == tri_at(4.0, 0.0, 0.0)));
    }

    #[test]
    fn test_raycast_picks_closest() {
        let polygons = vec![tri_at(0.0, 0.0, 0.0), tri_at(0.0, 3.0, 0.0), tri_at(0.0, -3.0, 0.0)];
        let tree = AabbTree::build(polygons).unwrap();

        let ray = Ray::new(Vec3::new(0.0, 10.0, -0.1), Vec3::new(0.0, -1.0, 0.0));
        let hit = tree.raycast(&ray).expect("hits the top triangle");
        assert_eq!(hit.polygon, tri_at(0.0, 3.0, 0.0));
        assert!(hit.distance > 6.9 && hit.distance < 7.1);

        // Pointing away: everything is behind the origin
        let away = Ray::new(Vec3::new(0.0, 10.0, -0.1), Vec3::new(0.0, 1.0, 0.0));
        assert!(tree.raycast(&away).is_none());
    }

    #[test]
    fn test_query_sphere() {
        let tree = AabbTree::build(row_of_triangles(8)).unwrap();
        let near = tree.query_sphere(&Sphere::new(Vec3::new(6.0, 0.5, 0.0), 0.6));
        assert!(near.iter().any(|p| **p == tri_at(6.0, 0.0, 0.0)));
        assert!(tree.query_sphere(&Sphere::new(Vec3::new(6.0, 50.0, 0.0), 1.0)).is_empty());
    }

    #[test]
    fn test_query_aabb() {
        let tree = AabbTree::build(row_of_triangles(8)).unwrap();
        let region = Aabb::new(Vec3::new(9.5, -1.0, -1.0), Vec3::new(10.5, 1.0, 1.0));
        let hits = tree.query_aabb(&region);
        assert!(hits.iter().any(|p| **p == tri_at(10.0, 0.0, 0.0)));
        assert!(!hits.iter().any(|p| **p == tri_at(0.0, 0.0, 0.0)));
    }

    #[test]
    fn test_clear_releases_every_node() {
        let mut tree = AabbTree::build(row_of_triangles(8)).unwrap();
        let count = tree.node_count();
        assert_eq!(tree.clear(), count);
        assert!(tree.is_empty());
        assert_eq!(tree.node_count(), 0);
        assert_eq!(tree.clear(), 0);
    }

    /// Unit halves of the box (0,0,0)-(2,1,1), cut at x = 1
    fn halves() -> (Aabb, Aabb) {
        Aabb::new(Vec3::zeros(), Vec3::new(2.0, 1.0, 1.0)).cut()
    }

    #[test]
    fn test_assign_side_first_vertex_decides() {
        let (left, right) = halves();
        let polygon = Polygon::new(
            Vec3::new(1.5, 0.5, 0.5),
            Vec3::new(0.5, 0.5, 0.5),
            Vec3::new(0.5, 0.8, 0.5),
        );
        assert_eq!(assign_side(&polygon, &left, &right, EPSILON), Side::Right);
    }

    #[test]
    fn test_assign_side_tolerance_past_cut() {
        let (left, right) = halves();
        let near = Polygon::new(
            Vec3::new(1.0005, 0.5, 0.5),
            Vec3::new(1.8, 0.5, 0.5),
            Vec3::new(1.8, 0.8, 0.5),
        );
        assert_eq!(assign_side(&near, &left, &right, EPSILON), Side::Left);

        let beyond = Polygon::new(
            Vec3::new(1.002, 0.5, 0.5),
            Vec3::new(0.5, 0.5, 0.5),
            Vec3::new(0.5, 0.8, 0.5),
        );
        assert_eq!(assign_side(&beyond, &left, &right, EPSILON), Side::Right);
    }

    #[test]
    fn test_assign_side_outside_both_goes_left() {
        let (left, right) = halves();
        let polygon = Polygon::new(
            Vec3::new(0.5, 5.0, 0.5),
            Vec3::new(1.5, 5.0, 0.5),
            Vec3::new(1.5, 6.0, 0.5),
        );
        assert_eq!(assign_side(&polygon, &left, &right, EPSILON), Side::Left);
    }

    #[test]
    fn test_partition_keeps_every_triangle() {
        let bounds = Aabb::new(Vec3::zeros(), Vec3::new(2.0, 1.0, 1.0));
        let polygons = vec![
            Polygon::new(Vec3::new(0.2, 0.0, 0.0), Vec3::new(0.4, 0.0, 0.0), Vec3::new(0.2, 0.5, 0.0)),
            Polygon::new(Vec3::new(1.6, 0.0, 0.0), Vec3::new(1.8, 0.0, 0.0), Vec3::new(1.6, 0.5, 0.0)),
            Polygon::new(Vec3::new(1.5, 0.0, 0.0), Vec3::new(0.5, 0.0, 0.0), Vec3::new(1.0, 0.5, 0.0)),
        ];
        let (left, right) = partition(polygons.clone(), &bounds, EPSILON);

        assert_eq!(left, vec![polygons[0]]);
        assert_eq!(right, vec![polygons[1], polygons[2]]);
    }
}
