use serde::{Deserialize, Serialize};

use crate::api::error::{OrreryError, OrreryResult};
use crate::core::belt::BeltsConfig;
use crate::core::clock::ClockConfig;
use crate::core::follow::FollowConfig;
use crate::core::stepper::StepperConfig;
use crate::renderer::camera::CameraConfig;

/// Render radius of the central star.
pub const STAR_SIZE: f64 = 5.0;
/// English name of the central star.
pub const STAR_NAME: &str = "Sun";
/// Translation key of the star's display name.
pub const STAR_NAME_KEY: &str = "planets.sun.name";

/// Configuration for the orrery, provided by the host.
///
/// Every section defaults to the constants of the reference scene, so a
/// host can override a single field from JSON:
///
/// ```
/// let config = orrery::OrreryConfig::from_json(r#"{ "seed": 7, "clock": { "initial_speed": 2.0 } }"#).unwrap();
/// assert_eq!(config.seed, Some(7));
/// assert_eq!(config.clock.initial_speed, 2.0);
/// assert_eq!(config.belts.main.count, 300);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrreryConfig {
    pub clock: ClockConfig,
    pub stepper: StepperConfig,
    pub follow: FollowConfig,
    pub camera: CameraConfig,
    pub belts: BeltsConfig,
    /// Render radius of the central star (also drives its follow offset).
    pub star_size: f64,
    /// Seed for belt generation and ring pulses. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for OrreryConfig {
    fn default() -> Self {
        Self {
            clock: ClockConfig::default(),
            stepper: StepperConfig::default(),
            follow: FollowConfig::default(),
            camera: CameraConfig::default(),
            belts: BeltsConfig::default(),
            star_size: STAR_SIZE,
            seed: None,
        }
    }
}

impl OrreryConfig {
    /// Parse a config from a JSON string. Missing fields take their defaults.
    /// The result is validated before it is returned.
    pub fn from_json(json: &str) -> OrreryResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the simulation cannot honour.
    pub fn validate(&self) -> OrreryResult<()> {
        self.clock.validate()?;
        self.stepper.validate()?;
        self.follow.validate()?;
        self.camera.validate()?;
        self.belts.validate()?;
        if !(self.star_size.is_finite() && self.star_size > 0.0) {
            return Err(OrreryError::InvalidConfig(format!(
                "star_size must be positive, got {}",
                self.star_size
            )));
        }
        Ok(())
    }
}
