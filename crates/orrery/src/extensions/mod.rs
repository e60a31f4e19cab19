// extensions/mod.rs
//
// Optional extension modules for the orrery.
// Decoupled from the scene: the Orrery builds its own graph, hosts may build more.

pub mod transform;

pub use transform::{rotate_yaw, LocalTransform, NodeId, TransformGraph, WorldTransform};
