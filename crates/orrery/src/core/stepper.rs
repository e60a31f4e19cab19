use serde::{Deserialize, Serialize};

use crate::api::error::{OrreryError, OrreryResult};
use crate::core::belt::BeltMember;
use crate::core::body::{wrap_phase, CelestialBody};

/// Moons orbit at a tenth of their nominal angular speed.
pub const MOON_SPEED_DAMPING: f64 = 0.1;
pub const BODY_SPIN_RATE: f64 = 0.01;
pub const MOON_SPIN_RATE: f64 = 0.02;
pub const STAR_SPIN_RATE: f64 = 0.002;
pub const STARFIELD_SPIN_RATE: f64 = 0.0001;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepperConfig {
    pub moon_speed_damping: f64,
    pub body_spin_rate: f64,
    pub moon_spin_rate: f64,
    pub star_spin_rate: f64,
    pub starfield_spin_rate: f64,
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            moon_speed_damping: MOON_SPEED_DAMPING,
            body_spin_rate: BODY_SPIN_RATE,
            moon_spin_rate: MOON_SPIN_RATE,
            star_spin_rate: STAR_SPIN_RATE,
            starfield_spin_rate: STARFIELD_SPIN_RATE,
        }
    }
}

impl StepperConfig {
    pub fn validate(&self) -> OrreryResult<()> {
        let rates = [
            ("moon_speed_damping", self.moon_speed_damping),
            ("body_spin_rate", self.body_spin_rate),
            ("moon_spin_rate", self.moon_spin_rate),
            ("star_spin_rate", self.star_spin_rate),
            ("starfield_spin_rate", self.starfield_spin_rate),
        ];
        for (name, rate) in rates {
            if !rate.is_finite() {
                return Err(OrreryError::InvalidConfig(format!("stepper.{name} is not finite")));
            }
        }
        Ok(())
    }
}

/// Slow rotations of the star and the sky sphere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Backdrop {
    pub star_spin: f64,
    pub starfield_spin: f64,
}

/// Advances phases and spins by an elapsed amount.
///
/// All motion is linear in `elapsed`, so one step of `a + b` lands where a
/// step of `a` followed by a step of `b` does (up to rounding).
#[derive(Debug, Clone, Default)]
pub struct OrbitalStepper {
    config: StepperConfig,
}

impl OrbitalStepper {
    pub fn new(config: StepperConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StepperConfig {
        &self.config
    }

    pub fn step(&self, bodies: &mut [CelestialBody], elapsed: f64) {
        if elapsed == 0.0 {
            return;
        }
        let moon_factor = self.config.moon_speed_damping * elapsed;
        for body in bodies {
            body.orbit.advance(body.orbit.angular_speed * elapsed);
            body.spin = wrap_phase(body.spin + self.config.body_spin_rate * elapsed);
            for moon in &mut body.moons {
                moon.orbit.advance(moon.orbit.angular_speed * moon_factor);
                moon.spin = wrap_phase(moon.spin + self.config.moon_spin_rate * elapsed);
            }
        }
    }

    pub fn step_belts(&self, members: &mut [BeltMember], elapsed: f64) {
        if elapsed == 0.0 {
            return;
        }
        for member in members {
            member.orbit.advance(member.orbit.angular_speed * elapsed);
            let spin = member.spin + member.spin_velocity * elapsed;
            member.spin = glam::DVec3::new(wrap_phase(spin.x), wrap_phase(spin.y), wrap_phase(spin.z));
        }
    }

    pub fn step_backdrop(&self, backdrop: &mut Backdrop, elapsed: f64) {
        if elapsed == 0.0 {
            return;
        }
        backdrop.star_spin = wrap_phase(backdrop.star_spin + self.config.star_spin_rate * elapsed);
        backdrop.starfield_spin =
            wrap_phase(backdrop.starfield_spin + self.config.starfield_spin_rate * elapsed);
    }
}
