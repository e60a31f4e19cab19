// extensions/transform.rs
//
// Scene-graph for the orrery: star and bodies are roots, moons hang off their
// body so they inherit its position and spin.
//
// Usage:
//   let mut graph = TransformGraph::new();
//   graph.register_with(body, LocalTransform::new().with_offset(pos).with_yaw(spin));
//   graph.register_with(moon, LocalTransform::new().with_offset(moon_pos));
//   graph.set_parent(moon, Some(body));
//   graph.propagate();
//   let world = graph.world(moon);

use std::collections::HashMap;

use glam::DVec3;

/// Handle of a node in the transform graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Rotate `v` about +Y by `yaw` radians, matching the `x = d·cos φ`,
/// `z = d·sin φ` orbit convention (positive yaw advances phase).
pub fn rotate_yaw(v: DVec3, yaw: f64) -> DVec3 {
    let (sin, cos) = yaw.sin_cos();
    DVec3::new(v.x * cos - v.z * sin, v.y, v.x * sin + v.z * cos)
}

/// Transform relative to the parent node (or the world, for roots).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalTransform {
    pub offset: DVec3,
    /// Rotation about +Y.
    pub yaw: f64,
    /// Uniform scale.
    pub scale: f64,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            offset: DVec3::ZERO,
            yaw: 0.0,
            scale: 1.0,
        }
    }
}

impl LocalTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offset(mut self, offset: DVec3) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_yaw(mut self, yaw: f64) -> Self {
        self.yaw = yaw;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

/// Resolved world-space transform of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTransform {
    pub position: DVec3,
    pub yaw: f64,
    pub scale: f64,
}

impl WorldTransform {
    pub const IDENTITY: Self = Self {
        position: DVec3::ZERO,
        yaw: 0.0,
        scale: 1.0,
    };

    /// World transform of a child whose local transform is `local`.
    /// The child's offset is rotated by this node's yaw, then scaled.
    pub fn compose(&self, local: &LocalTransform) -> WorldTransform {
        WorldTransform {
            position: self.position + rotate_yaw(local.offset, self.yaw) * self.scale,
            yaw: self.yaw + local.yaw,
            scale: self.scale * local.scale,
        }
    }
}

impl Default for WorldTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, Default)]
struct TransformNode {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    local: LocalTransform,
    world: WorldTransform,
}

/// Parent/child hierarchy with cached world transforms.
///
/// Locals may be edited freely; `propagate` recomputes the cache. Reading
/// `world` while the graph is dirty composes the chain on the fly, so a
/// query is never stale.
#[derive(Debug, Default, Clone)]
pub struct TransformGraph {
    nodes: HashMap<NodeId, TransformNode>,
    /// Nodes without a parent, in registration order.
    roots: Vec<NodeId>,
    dirty: bool,
}

impl TransformGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node with an identity local transform.
    pub fn register(&mut self, id: NodeId) {
        self.register_with(id, LocalTransform::default());
    }

    /// Register a node with a specific local transform.
    pub fn register_with(&mut self, id: NodeId, local: LocalTransform) {
        let node = self.nodes.entry(id).or_default();
        node.local = local;
        if node.parent.is_none() && !self.roots.contains(&id) {
            self.roots.push(id);
        }
        self.dirty = true;
    }

    /// Reparent `child`. `None` makes it a root.
    pub fn set_parent(&mut self, child: NodeId, parent: Option<NodeId>) {
        self.nodes.entry(child).or_default();
        if let Some(p) = parent {
            if !self.nodes.contains_key(&p) {
                self.register(p);
            }
        }

        if let Some(old_parent) = self.nodes.get(&child).and_then(|n| n.parent) {
            if let Some(old_node) = self.nodes.get_mut(&old_parent) {
                old_node.children.retain(|&c| c != child);
            }
        }

        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = parent;
        }

        match parent {
            Some(p) => {
                if let Some(parent_node) = self.nodes.get_mut(&p) {
                    if !parent_node.children.contains(&child) {
                        parent_node.children.push(child);
                    }
                }
                self.roots.retain(|&r| r != child);
            }
            None => {
                if !self.roots.contains(&child) {
                    self.roots.push(child);
                }
            }
        }

        self.dirty = true;
    }

    pub fn set_local(&mut self, id: NodeId, local: LocalTransform) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.local = local;
            self.dirty = true;
        }
    }

    pub fn local(&self, id: NodeId) -> Option<&LocalTransform> {
        self.nodes.get(&id).map(|n| &n.local)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> Option<&[NodeId]> {
        self.nodes.get(&id).map(|n| n.children.as_slice())
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Remove a node. Its children become roots.
    pub fn remove(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.remove(&id) {
            if let Some(parent) = node.parent {
                if let Some(parent_node) = self.nodes.get_mut(&parent) {
                    parent_node.children.retain(|&c| c != id);
                }
            }
            for child in node.children {
                if let Some(child_node) = self.nodes.get_mut(&child) {
                    child_node.parent = None;
                }
                if !self.roots.contains(&child) {
                    self.roots.push(child);
                }
            }
            self.roots.retain(|&r| r != id);
        }
        self.dirty = true;
    }

    /// Recompute cached world transforms from the roots down.
    pub fn propagate(&mut self) {
        if !self.dirty {
            return;
        }

        let mut resolved = Vec::with_capacity(self.nodes.len());
        for &root in &self.roots {
            self.collect(root, WorldTransform::IDENTITY, &mut resolved);
        }
        for (id, world) in resolved {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.world = world;
            }
        }

        self.dirty = false;
    }

    fn collect(&self, id: NodeId, parent: WorldTransform, out: &mut Vec<(NodeId, WorldTransform)>) {
        let Some(node) = self.nodes.get(&id) else { return };
        let world = parent.compose(&node.local);
        out.push((id, world));
        for &child in &node.children {
            self.collect(child, world, out);
        }
    }

    /// World transform of a node, or `None` if it is not registered.
    pub fn world(&self, id: NodeId) -> Option<WorldTransform> {
        let node = self.nodes.get(&id)?;
        if !self.dirty {
            return Some(node.world);
        }
        let parent = match node.parent {
            Some(p) => self.world(p)?,
            None => WorldTransform::IDENTITY,
        };
        Some(parent.compose(&node.local))
    }

    pub fn world_position(&self, id: NodeId) -> Option<DVec3> {
        self.world(id).map(|w| w.position)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const EPS: f64 = 1e-9;

    fn close(a: DVec3, b: DVec3) -> bool {
        (a - b).length() < EPS
    }

    #[test]
    fn parent_child_relationship() {
        let mut graph = TransformGraph::new();
        let parent = NodeId(1);
        let child = NodeId(2);

        graph.register(parent);
        graph.register(child);
        graph.set_parent(child, Some(parent));

        assert_eq!(graph.parent(child), Some(parent));
        assert_eq!(graph.children(parent), Some([child].as_slice()));
        assert_eq!(graph.roots(), &[parent]);
    }

    #[test]
    fn child_inherits_parent_yaw() {
        let mut graph = TransformGraph::new();
        let body = NodeId(1);
        let moon = NodeId(2);

        graph.register_with(
            body,
            LocalTransform::new()
                .with_offset(DVec3::new(10.0, 0.0, 0.0))
                .with_yaw(FRAC_PI_2),
        );
        graph.register_with(moon, LocalTransform::new().with_offset(DVec3::new(2.0, 0.0, 0.0)));
        graph.set_parent(moon, Some(body));
        graph.propagate();

        // +X rotated a quarter turn about +Y lands on +Z.
        let world = graph.world(moon).unwrap();
        assert!(close(world.position, DVec3::new(10.0, 0.0, 2.0)), "{:?}", world.position);
        assert!((world.yaw - FRAC_PI_2).abs() < EPS);
    }

    #[test]
    fn world_is_fresh_while_dirty() {
        let mut graph = TransformGraph::new();
        let a = NodeId(1);
        graph.register_with(a, LocalTransform::new().with_offset(DVec3::X));
        graph.propagate();
        graph.set_local(a, LocalTransform::new().with_offset(DVec3::Z));
        assert!(graph.is_dirty());
        assert!(close(graph.world_position(a).unwrap(), DVec3::Z));
    }

    #[test]
    fn scale_applies_to_child_offsets() {
        let mut graph = TransformGraph::new();
        let parent = NodeId(1);
        let child = NodeId(2);
        graph.register_with(parent, LocalTransform::new().with_scale(2.0));
        graph.register_with(child, LocalTransform::new().with_offset(DVec3::new(0.0, 3.0, 0.0)));
        graph.set_parent(child, Some(parent));
        graph.propagate();
        assert!(close(graph.world_position(child).unwrap(), DVec3::new(0.0, 6.0, 0.0)));
    }

    #[test]
    fn remove_orphans_children() {
        let mut graph = TransformGraph::new();
        let parent = NodeId(1);
        let child = NodeId(2);

        graph.register(parent);
        graph.register(child);
        graph.set_parent(child, Some(parent));

        graph.remove(parent);

        assert_eq!(graph.parent(child), None);
        assert!(graph.roots().contains(&child));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn unknown_node_has_no_world() {
        let graph = TransformGraph::new();
        assert!(graph.world(NodeId(9)).is_none());
    }
}
