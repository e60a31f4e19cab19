use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::api::error::{OrreryError, OrreryResult};
use crate::api::types::FollowTarget;

/// Follow distance in multiples of the target's render radius.
pub const FOLLOW_SIZE_FACTOR: f64 = 8.0;
/// Follow distance floor, so small bodies are not viewed from inside.
pub const FOLLOW_MIN_DISTANCE: f64 = 15.0;
/// Height of the follow offset relative to its horizontal legs.
pub const FOLLOW_HEIGHT_RATIO: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowConfig {
    pub size_factor: f64,
    pub min_distance: f64,
    pub height_ratio: f64,
}

impl Default for FollowConfig {
    fn default() -> Self {
        Self {
            size_factor: FOLLOW_SIZE_FACTOR,
            min_distance: FOLLOW_MIN_DISTANCE,
            height_ratio: FOLLOW_HEIGHT_RATIO,
        }
    }
}

impl FollowConfig {
    pub fn validate(&self) -> OrreryResult<()> {
        for (name, v) in [
            ("size_factor", self.size_factor),
            ("min_distance", self.min_distance),
            ("height_ratio", self.height_ratio),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(OrreryError::InvalidConfig(format!("follow.{name} must be >= 0, got {v}")));
            }
        }
        Ok(())
    }

    /// Initial camera offset for a target of the given render radius:
    /// `d = max(size·factor, min)` → `(d, d·ratio, d)`.
    pub fn offset_for(&self, size: f64) -> DVec3 {
        let d = (size * self.size_factor).max(self.min_distance);
        DVec3::new(d, d * self.height_ratio, d)
    }
}

/// Camera change produced by one follow update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraUpdate {
    /// Place the camera outright.
    Snap { position: DVec3, target: DVec3 },
    /// Move camera and target by the same delta.
    Translate(DVec3),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FollowState {
    #[default]
    Idle,
    Following {
        target: FollowTarget,
        offset: DVec3,
        /// Target position seen on the previous update; `None` until the
        /// first update after selection.
        last_position: Option<DVec3>,
    },
}

/// Keeps the camera locked to a moving body.
///
/// The first update after a selection snaps the camera to the target plus
/// the selection offset. Every later update translates camera and target by
/// the target's movement, so orbit-control changes the user made in between
/// survive.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FollowController {
    state: FollowState,
}

impl FollowController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start following `target`, whose render radius is `size`.
    pub fn follow(&mut self, target: FollowTarget, size: f64, config: &FollowConfig) {
        self.state = FollowState::Following {
            target,
            offset: config.offset_for(size),
            last_position: None,
        };
    }

    pub fn stop(&mut self) {
        self.state = FollowState::Idle;
    }

    pub fn state(&self) -> &FollowState {
        &self.state
    }

    pub fn target(&self) -> Option<FollowTarget> {
        match self.state {
            FollowState::Idle => None,
            FollowState::Following { target, .. } => Some(target),
        }
    }

    pub fn is_following(&self) -> bool {
        !matches!(self.state, FollowState::Idle)
    }

    /// Feed the target's current world position.
    pub fn update(&mut self, world_position: DVec3) -> Option<CameraUpdate> {
        let FollowState::Following {
            offset,
            last_position,
            ..
        } = &mut self.state
        else {
            return None;
        };

        let update = match last_position {
            None => CameraUpdate::Snap {
                position: world_position + *offset,
                target: world_position,
            },
            Some(last) => CameraUpdate::Translate(world_position - *last),
        };
        *last_position = Some(world_position);
        Some(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::BodyId;
    use crate::renderer::camera::OrbitCamera;

    #[test]
    fn offset_has_floor() {
        let config = FollowConfig::default();
        assert_eq!(config.offset_for(1.0), DVec3::new(15.0, 7.5, 15.0));
        assert_eq!(config.offset_for(2.0), DVec3::new(16.0, 8.0, 16.0));
        assert_eq!(config.offset_for(5.0), DVec3::new(40.0, 20.0, 40.0));
    }

    #[test]
    fn idle_produces_nothing() {
        let mut follow = FollowController::new();
        assert_eq!(follow.update(DVec3::ONE), None);
        assert!(!follow.is_following());
    }

    #[test]
    fn first_update_snaps_then_translates() {
        let config = FollowConfig::default();
        let mut follow = FollowController::new();
        follow.follow(FollowTarget::Body(BodyId(2)), 1.0, &config);

        let p0 = DVec3::new(15.0, 0.0, 0.0);
        assert_eq!(
            follow.update(p0),
            Some(CameraUpdate::Snap {
                position: p0 + DVec3::new(15.0, 7.5, 15.0),
                target: p0,
            })
        );

        let p1 = DVec3::new(14.0, 0.0, 2.0);
        assert_eq!(follow.update(p1), Some(CameraUpdate::Translate(p1 - p0)));
    }

    #[test]
    fn camera_keeps_relative_offset_while_following() {
        let mut follow = FollowController::new();
        follow.follow(FollowTarget::Body(BodyId(0)), 0.5, &FollowConfig::default());
        let mut cam = OrbitCamera::default();

        let path = [
            DVec3::new(8.0, 0.0, 0.0),
            DVec3::new(7.0, 0.0, 3.0),
            DVec3::new(5.0, 0.0, 6.0),
        ];
        for (i, p) in path.iter().enumerate() {
            if let Some(update) = follow.update(*p) {
                cam.apply(update);
            }
            if i == 0 {
                // User orbits the view between frames.
                cam.position += DVec3::new(0.0, 4.0, 0.0);
            }
        }
        let expected = DVec3::new(15.0, 7.5 + 4.0, 15.0);
        assert!((cam.offset() - expected).length() < 1e-9);
        assert!((cam.target - path[2]).length() < 1e-9);
    }

    #[test]
    fn target_at_origin_is_still_tracked() {
        let mut follow = FollowController::new();
        follow.follow(FollowTarget::Star, 5.0, &FollowConfig::default());
        assert!(matches!(follow.update(DVec3::ZERO), Some(CameraUpdate::Snap { .. })));
        assert_eq!(follow.update(DVec3::ZERO), Some(CameraUpdate::Translate(DVec3::ZERO)));
    }

    #[test]
    fn reselect_snaps_again() {
        let config = FollowConfig::default();
        let mut follow = FollowController::new();
        follow.follow(FollowTarget::Body(BodyId(1)), 1.0, &config);
        follow.update(DVec3::X);
        follow.follow(FollowTarget::Body(BodyId(3)), 1.0, &config);
        assert!(matches!(follow.update(DVec3::Z), Some(CameraUpdate::Snap { .. })));
        assert_eq!(follow.target(), Some(FollowTarget::Body(BodyId(3))));
    }

    #[test]
    fn stop_returns_to_idle() {
        let mut follow = FollowController::new();
        follow.follow(FollowTarget::Star, 5.0, &FollowConfig::default());
        follow.stop();
        assert_eq!(follow.state(), &FollowState::Idle);
        assert_eq!(follow.target(), None);
    }
}
