pub mod api;
pub mod core;
pub mod systems;
pub mod renderer;
pub mod bridge;
pub mod input;
pub mod assets;
pub mod extensions;
pub mod i18n;

// Re-export key types at crate root for convenience
pub use api::config::{OrreryConfig, STAR_NAME, STAR_NAME_KEY};
pub use api::error::{OrreryError, OrreryResult};
pub use api::types::{BodyCategory, BodyId, FollowTarget};
pub use assets::catalog::catalog;
pub use crate::core::belt::{BeltFamily, BeltKind, BeltMember, BeltsConfig, RingBeltConfig, TrojanConfig};
pub use crate::core::body::{Appearance, CelestialBody, Moon, Orbit};
pub use crate::core::clock::{FixedClock, SimulationClock, SimulationState, SystemClock, WallClock};
pub use crate::core::follow::{CameraUpdate, FollowController, FollowState};
pub use crate::core::scene::{FrameSnapshot, Orrery};
pub use crate::core::stepper::OrbitalStepper;
pub use crate::core::time::FramePacer;
pub use renderer::camera::{CameraPose, OrbitCamera};
pub use input::command::{apply_command, Command, ControlState, Layer, Visibility};
pub use input::queue::CommandQueue;
pub use bridge::protocol::{FrameBuffer, ProtocolLayout, RingInstance, TransformInstance};
pub use systems::pulse::{OrbitRing, Pulse, RingLook};
pub use i18n::{Locale, Translator};

// Extensions: decoupled scene-graph
pub use extensions::{LocalTransform, NodeId, TransformGraph, WorldTransform};
