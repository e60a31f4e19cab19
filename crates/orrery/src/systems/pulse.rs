use std::f64::consts::TAU;

use rand::Rng;
use serde::Serialize;

use crate::api::types::{BodyCategory, BodyId};
use crate::core::body::CelestialBody;

/// Rings of bodies farther out than this breathe.
pub const PULSE_DISTANCE: f64 = 40.0;
/// Rings farther out than this are drawn brighter.
pub const FAR_RING_DISTANCE: f64 = 45.0;
pub const FAR_GLOW_BOOST: f64 = 1.2;
pub const FAR_OPACITY_BOOST: f64 = 1.3;

/// Slow sinusoidal brightness modulation, driven by wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pulse {
    /// Radians per wall-clock second.
    pub speed: f64,
    pub phase: f64,
}

impl Pulse {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            speed: rng.gen_range(0.002..0.005),
            phase: rng.gen_range(0.0..TAU),
        }
    }

    /// Brightness factor in [0.4, 1.0].
    pub fn sample(&self, wall_seconds: f64) -> f64 {
        (wall_seconds * self.speed + self.phase).sin() * 0.3 + 0.7
    }
}

/// Ring colour and brightness as rendered this frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RingLook {
    pub emissive: f64,
    pub opacity: f64,
}

/// Orbit line of one body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrbitRing {
    pub body: BodyId,
    pub radius: f64,
    pub color: [f32; 3],
    pub glow: f64,
    pub base_opacity: f64,
    pub pulse: Option<Pulse>,
}

impl OrbitRing {
    /// Style the ring of `body`; distant bodies get a random pulse.
    pub fn for_body<R: Rng + ?Sized>(body: &CelestialBody, rng: &mut R) -> Self {
        let distance = body.orbit.distance;
        let (color, mut glow, mut base_opacity) = match body.category {
            BodyCategory::Dwarf => ([0.8, 0.6, 0.0], 0.08, 0.04),
            BodyCategory::Asteroid => ([0.6, 0.3, 0.15], 0.06, 0.03),
            BodyCategory::Tno => ([0.4, 0.15, 0.5], 0.1, 0.05),
            BodyCategory::Planet if distance < 20.0 => ([0.3, 0.5, 0.7], 0.03, 0.02),
            BodyCategory::Planet if distance < 35.0 => ([0.5, 0.4, 0.7], 0.05, 0.03),
            BodyCategory::Planet => ([0.7, 0.3, 0.4], 0.07, 0.04),
        };
        if distance > FAR_RING_DISTANCE {
            glow *= FAR_GLOW_BOOST;
            base_opacity *= FAR_OPACITY_BOOST;
        }
        let pulse = (distance > PULSE_DISTANCE).then(|| Pulse::random(rng));

        Self {
            body: body.id,
            radius: distance,
            color,
            glow,
            base_opacity,
            pulse,
        }
    }

    pub fn look(&self, wall_seconds: f64) -> RingLook {
        match self.pulse {
            Some(pulse) => {
                let p = pulse.sample(wall_seconds);
                RingLook {
                    emissive: self.glow * p,
                    opacity: self.base_opacity * (0.8 + p * 0.2),
                }
            }
            None => RingLook {
                emissive: self.glow,
                opacity: self.base_opacity,
            },
        }
    }
}

/// One ring per body, in catalog order.
pub fn build_rings<R: Rng + ?Sized>(bodies: &[CelestialBody], rng: &mut R) -> Vec<OrbitRing> {
    bodies.iter().map(|b| OrbitRing::for_body(b, rng)).collect()
}
