pub mod camera;

pub use camera::{CameraConfig, CameraPose, CameraUniform, OrbitCamera};
