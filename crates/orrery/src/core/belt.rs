use std::f64::consts::{FRAC_PI_3, PI, TAU};

use glam::DVec3;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::api::error::{OrreryError, OrreryResult};
use crate::core::body::Orbit;

/// Which population a belt member was generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BeltKind {
    Main,
    TrojanL4,
    TrojanL5,
    Kuiper,
    Scattered,
}

impl BeltKind {
    pub fn family(self) -> BeltFamily {
        match self {
            BeltKind::Main => BeltFamily::Main,
            BeltKind::TrojanL4 | BeltKind::TrojanL5 => BeltFamily::Trojans,
            BeltKind::Kuiper => BeltFamily::Kuiper,
            BeltKind::Scattered => BeltFamily::Scattered,
        }
    }
}

/// Belt groups as the UI toggles them (both trojan camps are one toggle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BeltFamily {
    Main,
    Trojans,
    Kuiper,
    Scattered,
}

impl BeltFamily {
    /// Cycle order of the `a` key.
    pub const ALL: [BeltFamily; 4] = [
        BeltFamily::Main,
        BeltFamily::Trojans,
        BeltFamily::Kuiper,
        BeltFamily::Scattered,
    ];

    pub fn index(self) -> usize {
        match self {
            BeltFamily::Main => 0,
            BeltFamily::Trojans => 1,
            BeltFamily::Kuiper => 2,
            BeltFamily::Scattered => 3,
        }
    }

    fn label(self) -> &'static str {
        match self {
            BeltFamily::Main => "main",
            BeltFamily::Trojans => "trojan",
            BeltFamily::Kuiper => "kuiper",
            BeltFamily::Scattered => "scattered",
        }
    }
}

// ── Config ──────────────────────────────────────────────────────────

/// Closed interval `[min, max]` sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.min == self.max {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }

    fn validate(&self, family: BeltFamily, what: &str) -> OrreryResult<()> {
        if !(self.min.is_finite() && self.max.is_finite()) {
            return Err(invalid(family, format!("{what} band is not finite")));
        }
        if self.min < 0.0 {
            return Err(invalid(family, format!("{what} band must be non-negative, got min {}", self.min)));
        }
        if self.min > self.max {
            return Err(invalid(family, format!("{what} band min {} exceeds max {}", self.min, self.max)));
        }
        Ok(())
    }
}

/// A composition class with its draw weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorClass {
    pub name: String,
    pub color: [f32; 3],
    pub weight: f64,
}

impl ColorClass {
    pub fn new(name: &str, color: [f32; 3], weight: f64) -> Self {
        Self {
            name: name.to_string(),
            color,
            weight,
        }
    }
}

/// How members are spread around the ring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Spacing {
    /// Member `i` sits at `i/count · 2π` plus up to `jitter` radians.
    Even { jitter: f64 },
    /// Uniform over the full circle.
    Random,
}

/// Shared rule for the main belt, the Kuiper belt and the scattered disc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingBeltConfig {
    pub count: usize,
    pub radius: Band,
    pub spacing: Spacing,
    pub size: Band,
    /// Full height of the slab members are scattered in.
    pub vertical_spread: f64,
    /// Each spin-rate component is drawn from ±spin_spread/2.
    pub spin_spread: f64,
    /// Orbital angular speed band.
    pub speed: Band,
    pub palette: Vec<ColorClass>,
    /// Start members at random orientations.
    pub tumble: bool,
}

impl RingBeltConfig {
    pub fn main_belt() -> Self {
        Self {
            count: 300,
            radius: Band::new(21.0, 24.0),
            spacing: Spacing::Even { jitter: 0.5 },
            size: Band::new(0.01, 0.09),
            vertical_spread: 1.0,
            spin_spread: 0.02,
            speed: Band::new(0.004, 0.007),
            palette: vec![
                ColorClass::new("carbonaceous", [0.4, 0.26, 0.13], 0.6),
                ColorClass::new("silicaceous", [0.6, 0.6, 0.6], 0.25),
                ColorClass::new("metallic", [0.5, 0.4, 0.3], 0.15),
            ],
            tumble: true,
        }
    }

    pub fn kuiper_belt() -> Self {
        Self {
            count: 150,
            radius: Band::new(44.0, 58.0),
            spacing: Spacing::Even { jitter: 1.0 },
            size: Band::new(0.02, 0.08),
            vertical_spread: 2.0,
            spin_spread: 0.01,
            speed: Band::new(0.000002, 0.000005),
            palette: vec![
                ColorClass::new("icy", [0.6, 0.7, 0.8], 0.4),
                ColorClass::new("rocky", [0.5, 0.4, 0.3], 0.3),
                ColorClass::new("reddish", [0.7, 0.5, 0.4], 0.3),
            ],
            tumble: true,
        }
    }

    pub fn scattered_disc() -> Self {
        Self {
            count: 50,
            radius: Band::new(58.0, 80.0),
            spacing: Spacing::Random,
            size: Band::new(0.03, 0.11),
            vertical_spread: 8.0,
            spin_spread: 0.008,
            speed: Band::new(0.000001, 0.000002),
            palette: vec![ColorClass::new("reddish", [0.6, 0.3, 0.2], 1.0)],
            tumble: true,
        }
    }

    fn validate(&self, family: BeltFamily) -> OrreryResult<()> {
        self.radius.validate(family, "radius")?;
        self.size.validate(family, "size")?;
        self.speed.validate(family, "speed")?;
        non_negative(family, "vertical_spread", self.vertical_spread)?;
        non_negative(family, "spin_spread", self.spin_spread)?;
        if let Spacing::Even { jitter } = self.spacing {
            non_negative(family, "jitter", jitter)?;
        }
        if self.palette.is_empty() {
            return Err(invalid(family, "palette is empty".to_string()));
        }
        if self.palette.iter().any(|c| !(c.weight.is_finite() && c.weight >= 0.0)) {
            return Err(invalid(family, "palette weights must be finite and >= 0".to_string()));
        }
        if self.palette.iter().map(|c| c.weight).sum::<f64>() <= 0.0 {
            return Err(invalid(family, "palette weights sum to zero".to_string()));
        }
        Ok(())
    }
}

/// Trojan swarms leading (L4) and trailing (L5) a reference body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrojanConfig {
    /// Total members, split between L4 and L5 (L4 takes the odd one).
    pub count: usize,
    pub reference_distance: f64,
    /// Every trojan moves at exactly this angular speed.
    pub reference_speed: f64,
    /// Longitude the camps are centred around.
    pub reference_longitude: f64,
    /// Angular offset of each camp from the reference longitude.
    pub lead_angle: f64,
    pub angle_spread: f64,
    pub radial_spread: f64,
    pub vertical_spread: f64,
    pub size: Band,
    pub spin_spread: f64,
    pub color: [f32; 3],
}

impl Default for TrojanConfig {
    fn default() -> Self {
        Self {
            count: 80,
            reference_distance: 25.0,
            reference_speed: 0.000084,
            reference_longitude: 0.0,
            lead_angle: FRAC_PI_3,
            angle_spread: 0.8,
            radial_spread: 3.0,
            vertical_spread: 0.8,
            size: Band::new(0.015, 0.055),
            spin_spread: 0.015,
            color: [0.35, 0.25, 0.15],
        }
    }
}

impl TrojanConfig {
    fn validate(&self) -> OrreryResult<()> {
        let family = BeltFamily::Trojans;
        self.size.validate(family, "size")?;
        non_negative(family, "reference_distance", self.reference_distance)?;
        non_negative(family, "angle_spread", self.angle_spread)?;
        non_negative(family, "radial_spread", self.radial_spread)?;
        non_negative(family, "vertical_spread", self.vertical_spread)?;
        non_negative(family, "spin_spread", self.spin_spread)?;
        if !(self.reference_speed.is_finite()
            && self.reference_longitude.is_finite()
            && self.lead_angle.is_finite())
        {
            return Err(invalid(family, "reference orbit is not finite".to_string()));
        }
        if self.radial_spread / 2.0 > self.reference_distance {
            return Err(invalid(family, "radial spread reaches past the star".to_string()));
        }
        Ok(())
    }
}

/// All belt populations generated at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeltsConfig {
    pub main: RingBeltConfig,
    pub trojans: TrojanConfig,
    pub kuiper: RingBeltConfig,
    pub scattered: RingBeltConfig,
}

impl Default for BeltsConfig {
    fn default() -> Self {
        Self {
            main: RingBeltConfig::main_belt(),
            trojans: TrojanConfig::default(),
            kuiper: RingBeltConfig::kuiper_belt(),
            scattered: RingBeltConfig::scattered_disc(),
        }
    }
}

impl BeltsConfig {
    pub fn validate(&self) -> OrreryResult<()> {
        self.main.validate(BeltFamily::Main)?;
        self.trojans.validate()?;
        self.kuiper.validate(BeltFamily::Kuiper)?;
        self.scattered.validate(BeltFamily::Scattered)?;
        Ok(())
    }

    pub fn total(&self) -> usize {
        self.main.count + self.trojans.count + self.kuiper.count + self.scattered.count
    }
}

fn invalid(family: BeltFamily, reason: String) -> OrreryError {
    OrreryError::InvalidBelt {
        belt: family.label(),
        reason,
    }
}

fn non_negative(family: BeltFamily, what: &str, v: f64) -> OrreryResult<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(invalid(family, format!("{what} must be finite and >= 0, got {v}")))
    }
}

// ── Members ─────────────────────────────────────────────────────────

/// One small body of a belt. Membership never changes after generation;
/// only phase and spin advance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeltMember {
    pub kind: BeltKind,
    /// `distance` is the orbital radius.
    pub orbit: Orbit,
    /// Fixed vertical offset from the ecliptic.
    pub height: f64,
    pub size: f64,
    pub color: [f32; 3],
    /// Orientation angles about x, y, z.
    pub spin: DVec3,
    /// Per-unit change of `spin`.
    pub spin_velocity: DVec3,
}

impl BeltMember {
    pub fn position(&self) -> DVec3 {
        self.orbit.local_position(self.height)
    }

    pub fn radius(&self) -> f64 {
        self.orbit.distance
    }
}

// ── Generation ──────────────────────────────────────────────────────

fn centered<R: Rng + ?Sized>(rng: &mut R, spread: f64) -> f64 {
    (rng.gen::<f64>() - 0.5) * spread
}

fn spin_velocity<R: Rng + ?Sized>(rng: &mut R, spread: f64) -> DVec3 {
    DVec3::new(centered(rng, spread), centered(rng, spread), centered(rng, spread))
}

/// Generate one ring-shaped population.
pub fn generate_ring<R: Rng + ?Sized>(
    kind: BeltKind,
    config: &RingBeltConfig,
    rng: &mut R,
) -> OrreryResult<Vec<BeltMember>> {
    let family = kind.family();
    config.validate(family)?;
    let palette = WeightedIndex::new(config.palette.iter().map(|c| c.weight))
        .map_err(|e| invalid(family, e.to_string()))?;

    let mut members = Vec::with_capacity(config.count);
    for i in 0..config.count {
        let phase = match config.spacing {
            Spacing::Even { jitter } => {
                i as f64 / config.count as f64 * TAU + Band::new(0.0, jitter).sample(rng)
            }
            Spacing::Random => rng.gen_range(0.0..TAU),
        };
        let radius = config.radius.sample(rng);
        let size = config.size.sample(rng);
        let color = config.palette[palette.sample(rng)].color;
        let height = centered(rng, config.vertical_spread);
        let spin = if config.tumble {
            DVec3::new(rng.gen_range(0.0..PI), rng.gen_range(0.0..PI), rng.gen_range(0.0..PI))
        } else {
            DVec3::ZERO
        };
        let spin_velocity = spin_velocity(rng, config.spin_spread);
        let speed = config.speed.sample(rng);

        members.push(BeltMember {
            kind,
            orbit: Orbit::new(radius, speed, phase),
            height,
            size,
            color,
            spin,
            spin_velocity,
        });
    }
    Ok(members)
}

/// Generate both trojan camps, L4 first.
pub fn generate_trojans<R: Rng + ?Sized>(config: &TrojanConfig, rng: &mut R) -> OrreryResult<Vec<BeltMember>> {
    config.validate()?;

    let l5 = config.count / 2;
    let l4 = config.count - l5;
    let camps = [
        (BeltKind::TrojanL4, l4, config.reference_longitude + config.lead_angle),
        (BeltKind::TrojanL5, l5, config.reference_longitude - config.lead_angle),
    ];

    let mut members = Vec::with_capacity(config.count);
    for (kind, count, centre) in camps {
        for _ in 0..count {
            let phase = centre + centered(rng, config.angle_spread);
            let radius = config.reference_distance + centered(rng, config.radial_spread);
            let size = config.size.sample(rng);
            let height = centered(rng, config.vertical_spread);
            let spin_velocity = spin_velocity(rng, config.spin_spread);

            members.push(BeltMember {
                kind,
                orbit: Orbit::new(radius, config.reference_speed, phase),
                height,
                size,
                color: config.color,
                spin: DVec3::ZERO,
                spin_velocity,
            });
        }
    }
    Ok(members)
}

/// Generate every belt: main, trojans, Kuiper, scattered, in that order.
/// The whole config is validated before any member is drawn.
pub fn generate<R: Rng + ?Sized>(config: &BeltsConfig, rng: &mut R) -> OrreryResult<Vec<BeltMember>> {
    config.validate()?;
    let mut members = Vec::with_capacity(config.total());
    members.extend(generate_ring(BeltKind::Main, &config.main, rng)?);
    members.extend(generate_trojans(&config.trojans, rng)?);
    members.extend(generate_ring(BeltKind::Kuiper, &config.kuiper, rng)?);
    members.extend(generate_ring(BeltKind::Scattered, &config.scattered, rng)?);
    log::info!(
        "belts generated: {} main, {} trojans, {} kuiper, {} scattered",
        config.main.count,
        config.trojans.count,
        config.kuiper.count,
        config.scattered.count
    );
    Ok(members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn of_kind(members: &[BeltMember], kind: BeltKind) -> Vec<&BeltMember> {
        members.iter().filter(|m| m.kind == kind).collect()
    }

    #[test]
    fn default_counts() {
        let members = generate(&BeltsConfig::default(), &mut rng()).unwrap();
        assert_eq!(members.len(), 580);
        assert_eq!(of_kind(&members, BeltKind::Main).len(), 300);
        assert_eq!(of_kind(&members, BeltKind::TrojanL4).len(), 40);
        assert_eq!(of_kind(&members, BeltKind::TrojanL5).len(), 40);
        assert_eq!(of_kind(&members, BeltKind::Kuiper).len(), 150);
        assert_eq!(of_kind(&members, BeltKind::Scattered).len(), 50);
    }

    #[test]
    fn ring_members_respect_bands() {
        let config = BeltsConfig::default();
        let members = generate(&config, &mut rng()).unwrap();
        for (kind, ring) in [
            (BeltKind::Main, &config.main),
            (BeltKind::Kuiper, &config.kuiper),
            (BeltKind::Scattered, &config.scattered),
        ] {
            for m in of_kind(&members, kind) {
                assert!(ring.radius.contains(m.radius()), "{:?} radius {}", kind, m.radius());
                assert!(ring.speed.contains(m.orbit.angular_speed));
                assert!(ring.size.contains(m.size));
                assert!(m.height.abs() <= ring.vertical_spread / 2.0);
                assert!(ring.palette.iter().any(|c| c.color == m.color));
            }
        }
    }

    #[test]
    fn trojans_share_reference_speed_and_stay_near_camps() {
        let config = TrojanConfig::default();
        let members = generate_trojans(&config, &mut rng()).unwrap();
        for m in &members {
            assert_eq!(m.orbit.angular_speed, config.reference_speed);
            assert!((m.radius() - config.reference_distance).abs() <= config.radial_spread / 2.0);
            let centre = match m.kind {
                BeltKind::TrojanL4 => config.lead_angle,
                BeltKind::TrojanL5 => -config.lead_angle,
                other => panic!("unexpected kind {:?}", other),
            };
            assert!((m.orbit.phase - centre).abs() <= config.angle_spread / 2.0);
            assert_eq!(m.spin, DVec3::ZERO);
        }
    }

    #[test]
    fn odd_trojan_count_favours_l4() {
        let config = TrojanConfig { count: 7, ..TrojanConfig::default() };
        let members = generate_trojans(&config, &mut rng()).unwrap();
        assert_eq!(of_kind(&members, BeltKind::TrojanL4).len(), 4);
        assert_eq!(of_kind(&members, BeltKind::TrojanL5).len(), 3);
    }

    #[test]
    fn same_seed_same_belts() {
        let config = BeltsConfig::default();
        let a = generate(&config, &mut rng()).unwrap();
        let b = generate(&config, &mut rng()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn even_spacing_without_jitter_is_exact() {
        let config = RingBeltConfig {
            count: 4,
            spacing: Spacing::Even { jitter: 0.0 },
            ..RingBeltConfig::main_belt()
        };
        let members = generate_ring(BeltKind::Main, &config, &mut rng()).unwrap();
        let phases: Vec<f64> = members.iter().map(|m| m.orbit.phase).collect();
        assert_eq!(phases, vec![0.0, TAU / 4.0, TAU / 2.0, 3.0 * TAU / 4.0]);
    }

    #[test]
    fn tumbling_members_start_rotated() {
        let belts = [
            (BeltKind::Main, RingBeltConfig::main_belt()),
            (BeltKind::Kuiper, RingBeltConfig::kuiper_belt()),
            (BeltKind::Scattered, RingBeltConfig::scattered_disc()),
        ];
        for (kind, config) in belts {
            assert!(config.tumble, "{:?}", kind);
            let members = generate_ring(kind, &config, &mut rng()).unwrap();
            for m in &members {
                for angle in [m.spin.x, m.spin.y, m.spin.z] {
                    assert!((0.0..PI).contains(&angle), "{:?} angle {}", kind, angle);
                }
            }
            let still = members.iter().filter(|m| m.spin == DVec3::ZERO).count();
            assert_eq!(still, 0, "{:?}: {} members start unrotated", kind, still);
        }
    }

    #[test]
    fn inverted_radius_band_is_rejected() {
        let mut config = BeltsConfig::default();
        config.kuiper.radius = Band::new(58.0, 44.0);
        match generate(&config, &mut rng()) {
            Err(OrreryError::InvalidBelt { belt, .. }) => assert_eq!(belt, "kuiper"),
            other => panic!("expected InvalidBelt, got {:?}", other.map(|m| m.len())),
        }
    }

    #[test]
    fn empty_or_weightless_palette_is_rejected() {
        let mut config = RingBeltConfig::main_belt();
        config.palette.clear();
        assert!(generate_ring(BeltKind::Main, &config, &mut rng()).is_err());

        let mut config = RingBeltConfig::main_belt();
        for class in &mut config.palette {
            class.weight = 0.0;
        }
        assert!(generate_ring(BeltKind::Main, &config, &mut rng()).is_err());
    }

    #[test]
    fn negative_band_is_rejected() {
        let config = RingBeltConfig {
            speed: Band::new(-0.1, 0.1),
            ..RingBeltConfig::scattered_disc()
        };
        assert!(generate_ring(BeltKind::Scattered, &config, &mut rng()).is_err());
    }

    #[test]
    fn empty_belt_is_fine() {
        let config = RingBeltConfig { count: 0, ..RingBeltConfig::kuiper_belt() };
        assert!(generate_ring(BeltKind::Kuiper, &config, &mut rng()).unwrap().is_empty());
    }

    #[test]
    fn families_group_trojans() {
        assert_eq!(BeltKind::TrojanL4.family(), BeltFamily::Trojans);
        assert_eq!(BeltKind::TrojanL5.family(), BeltFamily::Trojans);
        for (i, family) in BeltFamily::ALL.iter().enumerate() {
            assert_eq!(family.index(), i);
        }
    }
}
