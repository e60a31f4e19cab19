//! The reference scene: every body orbiting the star, with its moons.
//!
//! Distances and sizes are scene units, not astronomical ones. Speeds are
//! radians per stepper unit; at speed 1 the stepper receives one unit per
//! nominal frame. Bodies are listed in declaration order; that order defines
//! their `BodyId`.

use crate::api::error::{OrreryError, OrreryResult};
use crate::api::types::{BodyCategory, BodyId};
use crate::core::body::{CelestialBody, Moon, Orbit};

pub const BODY_COUNT: usize = 23;
pub const MOON_COUNT: usize = 40;

// ── Builders ─────────────────────────────────────────────────────────

/// A body with a placeholder id; `catalog` numbers them afterwards.
fn body(name: &str, category: BodyCategory, size: f64, distance: f64, speed: f64, phase: f64) -> CelestialBody {
    CelestialBody::new(BodyId(0), name, category, size, Orbit::new(distance, speed, phase))
}

fn moon(name: &str, size: f64, distance: f64, speed: f64, phase: f64, color: [f32; 3]) -> Moon {
    Moon::new(name, size, distance, speed, phase, color)
}

fn grey(v: f32) -> [f32; 3] {
    [v, v, v]
}

// ── Catalog ──────────────────────────────────────────────────────────

/// Build the reference catalog, ids assigned in declaration order.
pub fn catalog() -> Vec<CelestialBody> {
    use BodyCategory::*;

    let mut bodies = vec![
        body("Mercury", Planet, 0.5, 8.0, 0.0041, 2.1)
            .with_texture("mercury.jpg")
            .with_discovery("Ancient"),
        body("Venus", Planet, 0.9, 11.0, 0.0016, 4.8)
            .with_texture("venus.jpg")
            .with_discovery("Ancient"),
        body("Earth", Planet, 1.0, 15.0, 0.001, 3.45)
            .with_texture("earth.jpg")
            .with_discovery("N/A")
            .with_moons(vec![moon("Moon", 0.27, 2.5, 0.037, 1.2, grey(0.53))]),
        body("Mars", Planet, 0.8, 19.0, 0.00053, 0.9)
            .with_texture("mars.jpg")
            .with_discovery("Ancient")
            .with_moons(vec![
                moon("Phobos", 0.05, 1.5, 0.32, 0.5, [0.4, 0.26, 0.13]),
                moon("Deimos", 0.03, 2.2, 0.08, 2.1, [0.4, 0.26, 0.13]),
            ]),
        body("Vesta", Asteroid, 0.15, 20.5, 0.00029, 5.2)
            .with_color(grey(0.8))
            .with_discovery("1807"),
        body("Pallas", Asteroid, 0.12, 21.2, 0.00022, 1.8)
            .with_color(grey(0.67))
            .with_discovery("1802"),
        body("Jupiter", Planet, 2.0, 25.0, 0.000084, 2.7)
            .with_texture("jupiter.jpg")
            .with_discovery("Ancient")
            .with_moons(vec![
                moon("Io", 0.15, 3.5, 0.56, 0.8, [1.0, 1.0, 0.6]),
                moon("Europa", 0.13, 4.2, 0.28, 1.5, [0.53, 0.81, 0.92]),
                moon("Ganymede", 0.22, 5.1, 0.14, 3.2, [0.55, 0.49, 0.42]),
                moon("Callisto", 0.2, 6.0, 0.06, 4.9, grey(0.41)),
                moon("Amalthea", 0.08, 2.8, 2.0, 5.2, [0.6, 0.4, 0.2]),
                moon("Himalia", 0.05, 7.5, 0.013, 2.1, grey(0.5)),
                moon("Lysithea", 0.02, 8.2, 0.01, 4.7, grey(0.4)),
                moon("Elara", 0.03, 8.0, 0.011, 1.8, grey(0.45)),
            ]),
        body("Saturn", Planet, 1.7, 31.0, 0.000034, 5.8)
            .with_texture("saturn.jpg")
            .with_discovery("Ancient")
            .with_rings()
            .with_moons(vec![
                moon("Mimas", 0.06, 2.8, 1.05, 0.9, grey(0.7)),
                moon("Enceladus", 0.08, 3.2, 0.73, 4.1, [0.94, 0.97, 1.0]),
                moon("Tethys", 0.09, 3.7, 0.52, 2.7, [0.8, 0.8, 0.85]),
                moon("Dione", 0.09, 4.1, 0.37, 5.5, [0.75, 0.75, 0.8]),
                moon("Rhea", 0.12, 4.8, 0.22, 1.3, [0.7, 0.7, 0.75]),
                moon("Titan", 0.21, 5.5, 0.063, 2.3, [1.0, 0.65, 0.0]),
                moon("Hyperion", 0.04, 6.2, 0.048, 3.8, [0.6, 0.5, 0.4]),
                moon("Iapetus", 0.11, 7.0, 0.014, 0.5, grey(0.3)),
                moon("Phoebe", 0.03, 8.5, 0.006, 4.9, grey(0.25)),
            ]),
        body("Uranus", Planet, 1.2, 37.0, 0.000012, 1.2)
            .with_texture("uranus.jpg")
            .with_discovery("1781")
            .with_moons(vec![
                moon("Ariel", 0.08, 2.2, 0.39, 2.1, [0.6, 0.6, 0.65]),
                moon("Umbriel", 0.08, 2.5, 0.23, 4.8, [0.4, 0.4, 0.45]),
                moon("Titania", 0.11, 3.0, 0.12, 1.7, [0.55, 0.55, 0.6]),
                moon("Oberon", 0.1, 3.4, 0.075, 5.3, [0.5, 0.5, 0.55]),
                moon("Miranda", 0.06, 1.8, 0.67, 3.7, grey(0.53)),
                moon("Puck", 0.03, 1.5, 1.18, 0.8, [0.45, 0.45, 0.5]),
            ]),
        body("Neptune", Planet, 1.1, 42.0, 0.0000061, 6.1)
            .with_texture("neptune.jpg")
            .with_discovery("1846")
            .with_moons(vec![
                moon("Triton", 0.11, 3.0, 0.17, 0.9, [0.53, 0.81, 0.92]),
                moon("Nereid", 0.02, 4.8, 0.003, 3.2, grey(0.5)),
                moon("Proteus", 0.03, 2.2, 0.89, 5.7, grey(0.4)),
                moon("Larissa", 0.015, 1.8, 1.81, 2.4, grey(0.35)),
            ]),
        // No recorded starting angle for Ceres.
        body("Ceres", Dwarf, 0.3, 22.0, 0.00022, 0.0)
            .with_color(grey(0.6))
            .with_discovery("1801"),
        body("Pluto", Dwarf, 0.4, 48.0, 0.000004, 5.3)
            .with_color([0.82, 0.71, 0.55])
            .with_discovery("1930")
            .with_moons(vec![moon("Charon", 0.2, 1.8, 0.16, 1.8, grey(0.5))]),
        body("Eris", Dwarf, 0.35, 52.0, 0.0000018, 2.7)
            .with_color([0.9, 0.9, 0.98])
            .with_discovery("2005")
            .with_moons(vec![moon("Dysnomia", 0.04, 2.0, 0.067, 4.5, grey(0.6))]),
        body("Makemake", Dwarf, 0.25, 50.0, 0.0000032, 1.9)
            .with_color([0.55, 0.27, 0.07])
            .with_discovery("2005")
            .with_moons(vec![moon("MK 2", 0.02, 1.5, 0.083, 0.7, grey(0.4))]),
        body("Haumea", Dwarf, 0.28, 51.0, 0.0000035, 4.2)
            .with_color(grey(1.0))
            .with_discovery("2004")
            .with_moons(vec![
                moon("Hi'iaka", 0.05, 2.2, 0.02, 2.9, grey(0.87)),
                moon("Namaka", 0.03, 1.8, 0.056, 5.1, grey(0.8)),
            ]),
        body("Sedna", Dwarf, 0.2, 65.0, 0.00000009, 0.1)
            .with_color([0.55, 0.0, 0.0])
            .with_discovery("2003"),
        body("Quaoar", Dwarf, 0.18, 54.0, 0.0000035, 3.1)
            .with_color([0.4, 0.26, 0.13])
            .with_discovery("2002")
            .with_moons(vec![moon("Weywot", 0.02, 1.6, 0.083, 1.3, grey(0.33))]),
        body("Orcus", Dwarf, 0.16, 49.0, 0.000004, 5.7)
            .with_color([0.18, 0.31, 0.31])
            .with_discovery("2004")
            .with_moons(vec![moon("Vanth", 0.06, 1.9, 0.1, 4.8, grey(0.27))]),
        body("Gonggong", Dwarf, 0.19, 56.0, 0.0000018, 2.4)
            .with_color([0.5, 0.0, 0.13])
            .with_discovery("2007")
            .with_moons(vec![moon("Xiangliu", 0.03, 1.7, 0.1, 3.8, grey(0.4))]),
        body("Varuna", Tno, 0.12, 53.0, 0.0000027, 4.7)
            .with_color(grey(0.41))
            .with_discovery("2000"),
        body("Ixion", Tno, 0.11, 49.5, 0.000004, 0.8)
            .with_color([0.55, 0.27, 0.07])
            .with_discovery("2001"),
        body("Salacia", Tno, 0.13, 50.3, 0.0000035, 2.9)
            .with_color([0.6, 0.6, 0.65])
            .with_discovery("2004")
            .with_moons(vec![moon("Actaea", 0.04, 1.4, 0.09, 1.9, [0.5, 0.5, 0.55])]),
        body("2007 OR10", Dwarf, 0.16, 55.2, 0.0000019, 3.7)
            .with_color([0.45, 0.15, 0.1])
            .with_discovery("2007")
            .with_moons(vec![moon("S/2016 (225088) 1", 0.025, 1.6, 0.08, 5.1, grey(0.4))]),
    ];

    for (i, b) in bodies.iter_mut().enumerate() {
        b.id = BodyId(i as u32);
    }
    bodies
}

/// Check every body and moon, and that ids match positions.
pub fn validate(bodies: &[CelestialBody]) -> OrreryResult<()> {
    for (i, body) in bodies.iter().enumerate() {
        if body.id.index() != i {
            return Err(OrreryError::InvalidBody {
                name: body.name.clone(),
                reason: format!("id {} does not match position {}", body.id.0, i),
            });
        }
        body.validate()?;
    }
    Ok(())
}
