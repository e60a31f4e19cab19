use bytemuck::{Pod, Zeroable};
use glam::{DMat4, DVec3, Mat4};
use serde::{Deserialize, Serialize};

use crate::api::error::{OrreryError, OrreryResult};
use crate::core::follow::CameraUpdate;

/// Where the camera sits and what it looks at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: DVec3,
    pub target: DVec3,
}

impl CameraPose {
    pub const fn new(position: DVec3, target: DVec3) -> Self {
        Self { position, target }
    }

    /// Camera position relative to its target.
    pub fn offset(&self) -> DVec3 {
        self.position - self.target
    }
}

/// Projection and orbit-control limits for the perspective camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Pose after start and after a reset.
    pub home: CameraPose,
    pub fov_y_degrees: f64,
    pub near: f64,
    pub far: f64,
    /// Closest a user move may bring the camera to its target.
    pub min_distance: f64,
    /// Farthest a user move may pull the camera from its target.
    pub max_distance: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            home: CameraPose::new(DVec3::new(0.0, 20.0, 60.0), DVec3::ZERO),
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            min_distance: 8.0,
            max_distance: 150.0,
        }
    }
}

impl CameraConfig {
    pub fn validate(&self) -> OrreryResult<()> {
        if !(self.home.position.is_finite() && self.home.target.is_finite()) {
            return Err(OrreryError::InvalidConfig("camera.home is not finite".to_string()));
        }
        if self.home.offset().length_squared() == 0.0 {
            return Err(OrreryError::InvalidConfig(
                "camera.home position equals its target".to_string(),
            ));
        }
        if !(self.fov_y_degrees > 0.0 && self.fov_y_degrees < 180.0) {
            return Err(OrreryError::InvalidConfig(format!(
                "camera.fov_y_degrees out of range: {}",
                self.fov_y_degrees
            )));
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(OrreryError::InvalidConfig("camera near/far planes invalid".to_string()));
        }
        if !(self.min_distance > 0.0 && self.max_distance >= self.min_distance) {
            return Err(OrreryError::InvalidConfig("camera distance limits invalid".to_string()));
        }
        Ok(())
    }
}

/// GPU-side uniform data for the camera.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_projection: [[f32; 4]; 4],
}

/// Perspective camera orbiting a target point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrbitCamera {
    pub position: DVec3,
    pub target: DVec3,
}

impl OrbitCamera {
    pub fn new(pose: CameraPose) -> Self {
        Self {
            position: pose.position,
            target: pose.target,
        }
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose::new(self.position, self.target)
    }

    /// Place the camera exactly.
    pub fn look_at(&mut self, position: DVec3, target: DVec3) {
        self.position = position;
        self.target = target;
    }

    /// Shift camera and target together, preserving the viewing offset.
    pub fn translate(&mut self, delta: DVec3) {
        self.position += delta;
        self.target += delta;
    }

    pub fn apply(&mut self, update: CameraUpdate) {
        match update {
            CameraUpdate::Snap { position, target } => self.look_at(position, target),
            CameraUpdate::Translate(delta) => self.translate(delta),
        }
    }

    /// Apply a user-driven pose, keeping the camera within the zoom limits
    /// around the new target. A pose with no offset keeps the current
    /// viewing direction.
    pub fn move_to(&mut self, pose: CameraPose, config: &CameraConfig) {
        let offset = pose.offset();
        let direction = if offset.length_squared() > 0.0 {
            offset.normalize()
        } else {
            self.offset().normalize_or(DVec3::Z)
        };
        let distance = offset.length().clamp(config.min_distance, config.max_distance);
        self.target = pose.target;
        self.position = pose.target + direction * distance;
    }

    pub fn offset(&self) -> DVec3 {
        self.position - self.target
    }

    pub fn distance(&self) -> f64 {
        self.offset().length()
    }

    pub fn view_matrix(&self) -> Mat4 {
        DMat4::look_at_rh(self.position, self.target, DVec3::Y).as_mat4()
    }

    pub fn projection_matrix(&self, aspect: f64, config: &CameraConfig) -> Mat4 {
        DMat4::perspective_rh(config.fov_y_degrees.to_radians(), aspect, config.near, config.far).as_mat4()
    }

    pub fn uniform(&self, aspect: f64, config: &CameraConfig) -> CameraUniform {
        CameraUniform {
            view_projection: (self.projection_matrix(aspect, config) * self.view_matrix()).to_cols_array_2d(),
        }
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(CameraConfig::default().home)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn default_pose_matches_home() {
        let cam = OrbitCamera::default();
        assert_eq!(cam.position, DVec3::new(0.0, 20.0, 60.0));
        assert_eq!(cam.target, DVec3::ZERO);
    }

    #[test]
    fn translate_preserves_offset() {
        let mut cam = OrbitCamera::default();
        let before = cam.offset();
        cam.apply(CameraUpdate::Translate(DVec3::new(3.0, -1.0, 7.5)));
        assert_eq!(cam.offset(), before);
        assert_eq!(cam.target, DVec3::new(3.0, -1.0, 7.5));
    }

    #[test]
    fn snap_sets_pose() {
        let mut cam = OrbitCamera::default();
        cam.apply(CameraUpdate::Snap {
            position: DVec3::new(1.0, 2.0, 3.0),
            target: DVec3::new(4.0, 5.0, 6.0),
        });
        assert_eq!(cam.pose(), CameraPose::new(DVec3::new(1.0, 2.0, 3.0), DVec3::new(4.0, 5.0, 6.0)));
    }

    #[test]
    fn user_moves_respect_zoom_limits() {
        let config = CameraConfig::default();
        let mut cam = OrbitCamera::default();
        cam.move_to(CameraPose::new(DVec3::new(0.0, 0.0, 500.0), DVec3::ZERO), &config);
        assert!((cam.distance() - config.max_distance).abs() < 1e-9);
        cam.move_to(CameraPose::new(DVec3::new(1.0, 0.0, 0.0), DVec3::ZERO), &config);
        assert!((cam.distance() - config.min_distance).abs() < 1e-9);
        assert!(cam.position.x > 0.0);
    }

    #[test]
    fn target_lands_at_screen_centre() {
        let config = CameraConfig::default();
        let cam = OrbitCamera::default();
        let u = cam.uniform(16.0 / 9.0, &config);
        let m = Mat4::from_cols_array_2d(&u.view_projection);
        let clip = m * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!((clip.x / clip.w).abs() < 1e-5);
        assert!((clip.y / clip.w).abs() < 1e-5);
    }

    #[test]
    fn degenerate_home_is_rejected() {
        let config = CameraConfig {
            home: CameraPose::new(DVec3::ONE, DVec3::ONE),
            ..CameraConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
