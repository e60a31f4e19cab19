use serde::Serialize;

use crate::api::config::OrreryConfig;
use crate::api::error::{OrreryError, OrreryResult};
use crate::api::types::{BodyId, FollowTarget};
use crate::core::belt::BeltFamily;
use crate::core::body::{find_by_id, find_by_name, CelestialBody};
use crate::core::clock::SimulationState;
use crate::core::follow::FollowController;
use crate::i18n::Locale;
use crate::renderer::camera::{CameraPose, OrbitCamera};

/// A display layer the user can toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Layer {
    Orbits,
    Moons,
    PlanetLabels,
    MoonLabels,
    Belt(BeltFamily),
}

impl Layer {
    /// Stable numeric code for hosts that cannot pass enums
    /// (0 orbits, 1 moons, 2 planet labels, 3 moon labels, 4..=7 belts).
    pub fn from_code(code: u32) -> Option<Layer> {
        Some(match code {
            0 => Layer::Orbits,
            1 => Layer::Moons,
            2 => Layer::PlanetLabels,
            3 => Layer::MoonLabels,
            4..=7 => Layer::Belt(BeltFamily::ALL[(code - 4) as usize]),
            _ => return None,
        })
    }
}

/// Visibility flags. Purely presentational: nothing here feeds back into
/// the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Visibility {
    pub orbits: bool,
    pub moons: bool,
    pub planet_labels: bool,
    pub moon_labels: bool,
    /// Indexed by `BeltFamily::index`.
    pub belts: [bool; 4],
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            orbits: true,
            moons: true,
            planet_labels: false,
            moon_labels: false,
            belts: [true; 4],
        }
    }
}

impl Visibility {
    pub fn get(&self, layer: Layer) -> bool {
        match layer {
            Layer::Orbits => self.orbits,
            Layer::Moons => self.moons,
            Layer::PlanetLabels => self.planet_labels,
            Layer::MoonLabels => self.moon_labels,
            Layer::Belt(family) => self.belts[family.index()],
        }
    }

    pub fn set(&mut self, layer: Layer, visible: bool) {
        let flag = match layer {
            Layer::Orbits => &mut self.orbits,
            Layer::Moons => &mut self.moons,
            Layer::PlanetLabels => &mut self.planet_labels,
            Layer::MoonLabels => &mut self.moon_labels,
            Layer::Belt(family) => &mut self.belts[family.index()],
        };
        *flag = visible;
    }

    pub fn toggle(&mut self, layer: Layer) {
        self.set(layer, !self.get(layer));
    }

    pub fn belt(&self, family: BeltFamily) -> bool {
        self.belts[family.index()]
    }

    /// Hide the first visible belt and show the next one. With none visible,
    /// show the first.
    pub fn cycle_belts(&mut self) {
        match self.belts.iter().position(|&v| v) {
            Some(i) => {
                self.belts[i] = false;
                let next = (i + 1) % self.belts.len();
                self.belts[next] = true;
            }
            None => self.belts[0] = true,
        }
    }
}

/// User intents accepted between ticks.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetSpeed(f64),
    SpeedUp,
    SpeedDown,
    TogglePause,
    SetPaused(bool),
    /// Follow a body.
    Select(BodyId),
    SelectByName(String),
    FollowStar,
    StopFollow,
    /// Stop following and return the camera home.
    Reset,
    MoveCamera(CameraPose),
    SetVisibility(Layer, bool),
    ToggleVisibility(Layer),
    CycleBelts,
    SetLocale(Locale),
}

/// Everything the user controls.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlState {
    pub sim: SimulationState,
    pub follow: FollowController,
    pub camera: OrbitCamera,
    pub visibility: Visibility,
    pub locale: Locale,
}

impl ControlState {
    pub fn new(sim: SimulationState, camera: OrbitCamera) -> Self {
        Self {
            sim,
            follow: FollowController::new(),
            camera,
            visibility: Visibility::default(),
            locale: Locale::default(),
        }
    }
}

/// Apply one command to a copy of the control state.
///
/// On error the input state is dropped unchanged from the caller's point of
/// view: callers keep their own copy and only swap in the returned state.
pub fn apply_command(
    mut state: ControlState,
    command: Command,
    bodies: &[CelestialBody],
    config: &OrreryConfig,
) -> OrreryResult<ControlState> {
    match command {
        Command::SetSpeed(speed) => state.sim.set_speed(speed)?,
        Command::SpeedUp => state.sim.speed_up(),
        Command::SpeedDown => state.sim.speed_down(),
        Command::TogglePause => state.sim.paused = !state.sim.paused,
        Command::SetPaused(paused) => state.sim.paused = paused,
        Command::Select(id) => {
            let body = find_by_id(bodies, id).ok_or(OrreryError::UnknownBody(id.0))?;
            state.follow.follow(FollowTarget::Body(body.id), body.size, &config.follow);
        }
        Command::SelectByName(name) => {
            let body = find_by_name(bodies, &name).ok_or(OrreryError::UnknownBodyName(name))?;
            state.follow.follow(FollowTarget::Body(body.id), body.size, &config.follow);
        }
        Command::FollowStar => {
            state.follow.follow(FollowTarget::Star, config.star_size, &config.follow);
        }
        Command::StopFollow => state.follow.stop(),
        Command::Reset => {
            state.follow.stop();
            state.camera = OrbitCamera::new(config.camera.home);
        }
        Command::MoveCamera(pose) => {
            if !(pose.position.is_finite() && pose.target.is_finite()) {
                return Err(OrreryError::InvalidConfig("camera pose is not finite".to_string()));
            }
            state.camera.move_to(pose, &config.camera);
        }
        Command::SetVisibility(layer, visible) => state.visibility.set(layer, visible),
        Command::ToggleVisibility(layer) => state.visibility.toggle(layer),
        Command::CycleBelts => state.visibility.cycle_belts(),
        Command::SetLocale(locale) => state.locale = locale,
    }
    Ok(state)
}
