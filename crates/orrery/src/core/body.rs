use std::f64::consts::TAU;

use glam::DVec3;
use serde::Serialize;

use crate::api::error::{OrreryError, OrreryResult};
use crate::api::types::{BodyCategory, BodyId};

/// Phases are folded back into [0, 2π) once they exceed this magnitude.
pub const PHASE_WRAP_THRESHOLD: f64 = 64.0 * TAU;

/// Fold an angle back into [0, 2π) when it has grown large.
pub fn wrap_phase(angle: f64) -> f64 {
    if angle.abs() > PHASE_WRAP_THRESHOLD {
        angle.rem_euclid(TAU)
    } else {
        angle
    }
}

// ── Orbit ───────────────────────────────────────────────────────────

/// A circular orbit in the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Orbit {
    /// Orbital radius.
    pub distance: f64,
    /// Radians per stepper unit. Negative means retrograde.
    pub angular_speed: f64,
    /// Current angle φ.
    pub phase: f64,
}

impl Orbit {
    pub fn new(distance: f64, angular_speed: f64, phase: f64) -> Self {
        Self {
            distance,
            angular_speed,
            phase,
        }
    }

    /// Rotate the phase by an absolute angle.
    pub fn advance(&mut self, delta: f64) {
        self.phase = wrap_phase(self.phase + delta);
    }

    /// Position relative to the orbit centre: `(d·cos φ, y, d·sin φ)`.
    pub fn local_position(&self, y: f64) -> DVec3 {
        let (sin, cos) = self.phase.sin_cos();
        DVec3::new(self.distance * cos, y, self.distance * sin)
    }
}

// ── Appearance ──────────────────────────────────────────────────────

/// How the renderer should paint a body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    /// Texture file name under the host's texture directory.
    Texture(String),
    /// Flat RGB colour in [0, 1].
    Color([f32; 3]),
}

impl Appearance {
    /// Colour to use when textures are unavailable.
    pub fn fallback_color(&self) -> [f32; 3] {
        match self {
            Appearance::Texture(_) => [1.0, 1.0, 1.0],
            Appearance::Color(c) => *c,
        }
    }
}

// ── Moon ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Moon {
    pub name: String,
    pub size: f64,
    /// Orbit around the parent, expressed in the parent's spinning frame.
    pub orbit: Orbit,
    /// Accumulated self-rotation.
    pub spin: f64,
    pub color: [f32; 3],
}

impl Moon {
    pub fn new(
        name: impl Into<String>,
        size: f64,
        distance: f64,
        angular_speed: f64,
        phase: f64,
        color: [f32; 3],
    ) -> Self {
        Self {
            name: name.into(),
            size,
            orbit: Orbit::new(distance, angular_speed, phase),
            spin: 0.0,
            color,
        }
    }

    /// Offset from the parent's centre, before the parent's spin is applied.
    pub fn local_position(&self) -> DVec3 {
        self.orbit.local_position(0.0)
    }
}

// ── Celestial body ──────────────────────────────────────────────────

/// A body orbiting the star, with its current phase and spin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CelestialBody {
    pub id: BodyId,
    pub name: String,
    pub category: BodyCategory,
    /// Render radius.
    pub size: f64,
    pub orbit: Orbit,
    pub spin: f64,
    pub appearance: Appearance,
    /// Discovery year, or "Ancient" / "N/A".
    pub discovery: String,
    pub has_rings: bool,
    pub moons: Vec<Moon>,
}

impl CelestialBody {
    pub fn new(
        id: BodyId,
        name: impl Into<String>,
        category: BodyCategory,
        size: f64,
        orbit: Orbit,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            category,
            size,
            orbit,
            spin: 0.0,
            appearance: Appearance::Color([1.0, 1.0, 1.0]),
            discovery: String::new(),
            has_rings: false,
            moons: Vec::new(),
        }
    }

    pub fn with_texture(mut self, file: impl Into<String>) -> Self {
        self.appearance = Appearance::Texture(file.into());
        self
    }

    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.appearance = Appearance::Color(color);
        self
    }

    pub fn with_discovery(mut self, discovery: impl Into<String>) -> Self {
        self.discovery = discovery.into();
        self
    }

    pub fn with_rings(mut self) -> Self {
        self.has_rings = true;
        self
    }

    pub fn with_moons(mut self, moons: Vec<Moon>) -> Self {
        self.moons = moons;
        self
    }

    /// Position relative to the star.
    pub fn local_position(&self) -> DVec3 {
        self.orbit.local_position(0.0)
    }

    /// Translation key of the display name: the last word of the name,
    /// lowercased (`"2007 OR10"` -> `planets.or10.name`).
    pub fn name_key(&self) -> String {
        let word = self.name.split_whitespace().last().unwrap_or_default();
        let slug: String = word
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        format!("planets.{}.name", slug)
    }

    /// Reject non-finite values, negative distances and non-positive sizes,
    /// for the body and each of its moons.
    pub fn validate(&self) -> OrreryResult<()> {
        check_orbit(&self.name, self.size, &self.orbit)?;
        for moon in &self.moons {
            check_orbit(&format!("{}/{}", self.name, moon.name), moon.size, &moon.orbit)?;
        }
        Ok(())
    }
}

fn check_orbit(name: &str, size: f64, orbit: &Orbit) -> OrreryResult<()> {
    let invalid = |reason: String| OrreryError::InvalidBody {
        name: name.to_string(),
        reason,
    };
    if !(size.is_finite() && size > 0.0) {
        return Err(invalid(format!("size must be positive, got {size}")));
    }
    if !(orbit.distance.is_finite() && orbit.distance >= 0.0) {
        return Err(invalid(format!("distance must be >= 0, got {}", orbit.distance)));
    }
    if !orbit.angular_speed.is_finite() {
        return Err(invalid("angular speed is not finite".to_string()));
    }
    if !orbit.phase.is_finite() {
        return Err(invalid("initial phase is not finite".to_string()));
    }
    Ok(())
}

/// Case-insensitive lookup by name.
pub fn find_by_name<'a>(bodies: &'a [CelestialBody], name: &str) -> Option<&'a CelestialBody> {
    let needle = name.trim();
    bodies.iter().find(|b| b.name.eq_ignore_ascii_case(needle))
}

pub fn find_by_id(bodies: &[CelestialBody], id: BodyId) -> Option<&CelestialBody> {
    bodies.get(id.index()).filter(|b| b.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn local_position_follows_phase() {
        let orbit = Orbit::new(10.0, 0.0, FRAC_PI_2);
        let p = orbit.local_position(0.0);
        assert!(p.x.abs() < 1e-12);
        assert!((p.z - 10.0).abs() < 1e-12);
    }

    #[test]
    fn wrap_only_beyond_threshold() {
        assert_eq!(wrap_phase(5.0), 5.0);
        assert_eq!(wrap_phase(-5.0), -5.0);
        let big = PHASE_WRAP_THRESHOLD + 1.0;
        let wrapped = wrap_phase(big);
        assert!((0.0..TAU).contains(&wrapped));
        assert!((big.sin() - wrapped.sin()).abs() < 1e-9);
        assert!((big.cos() - wrapped.cos()).abs() < 1e-9);
    }

    #[test]
    fn negative_phase_wraps_into_range() {
        let wrapped = wrap_phase(-PHASE_WRAP_THRESHOLD - 0.25);
        assert!((0.0..TAU).contains(&wrapped));
        assert!(((-0.25f64).rem_euclid(TAU) - wrapped).abs() < 1e-6);
    }

    #[test]
    fn validation_catches_bad_moon() {
        let body = CelestialBody::new(BodyId(0), "Test", BodyCategory::Planet, 1.0, Orbit::new(5.0, 0.1, 0.0))
            .with_moons(vec![Moon::new("Broken", -1.0, 1.0, 0.1, 0.0, [1.0; 3])]);
        match body.validate() {
            Err(OrreryError::InvalidBody { name, .. }) => assert_eq!(name, "Test/Broken"),
            other => panic!("expected InvalidBody, got {:?}", other),
        }
    }

    #[test]
    fn zero_distance_and_speed_are_valid() {
        let body = CelestialBody::new(BodyId(0), "Still", BodyCategory::Dwarf, 0.5, Orbit::new(0.0, 0.0, 0.0));
        assert!(body.validate().is_ok());
        assert_eq!(body.local_position(), DVec3::ZERO);
    }

    #[test]
    fn name_lookup_ignores_case() {
        let bodies = vec![
            CelestialBody::new(BodyId(0), "Mars", BodyCategory::Planet, 0.8, Orbit::new(19.0, 0.1, 0.0)),
            CelestialBody::new(BodyId(1), "2007 OR10", BodyCategory::Dwarf, 0.16, Orbit::new(55.2, 0.1, 0.0)),
        ];
        assert_eq!(find_by_name(&bodies, "mARS").map(|b| b.id), Some(BodyId(0)));
        assert_eq!(find_by_name(&bodies, " 2007 or10 ").map(|b| b.id), Some(BodyId(1)));
        assert!(find_by_name(&bodies, "Vulcan").is_none());
        assert!(find_by_id(&bodies, BodyId(2)).is_none());
    }
}
