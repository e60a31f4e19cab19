use chrono::{DateTime, Utc};
use glam::DVec3;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::api::config::{OrreryConfig, STAR_NAME};
use crate::api::error::OrreryResult;
use crate::api::types::{BodyId, FollowTarget};
use crate::assets::catalog;
use crate::core::belt::{self, BeltMember};
use crate::core::body::{find_by_id, CelestialBody};
use crate::core::clock::{SimulationClock, SimulationState, SystemClock, WallClock};
use crate::core::stepper::{Backdrop, OrbitalStepper};
use crate::extensions::transform::{LocalTransform, NodeId, TransformGraph};
use crate::input::command::{apply_command, Command, ControlState, Visibility};
use crate::renderer::camera::{CameraPose, OrbitCamera};
use crate::systems::pulse::{build_rings, OrbitRing, RingLook};

/// A periodic debug line is logged every this many ticks.
pub const DEBUG_LOG_INTERVAL: u64 = 60;

const STAR_NODE: NodeId = NodeId(0);

fn body_node(id: BodyId) -> NodeId {
    NodeId(1 + id.0)
}

/// Serializable per-frame summary for UI panels.
#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot {
    pub date: DateTime<Utc>,
    pub frame: u64,
    pub speed: f64,
    pub paused: bool,
    pub following: Option<String>,
    pub camera: CameraPose,
    pub bodies: Vec<BodySnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BodySnapshot {
    pub id: BodyId,
    pub name: String,
    pub position: DVec3,
    pub spin: f64,
}

/// The whole simulation: scene contents, time warp, camera and UI controls.
///
/// Hosts call `tick` once per nominal frame and `apply` between ticks.
pub struct Orrery {
    config: OrreryConfig,
    bodies: Vec<CelestialBody>,
    belts: Vec<BeltMember>,
    rings: Vec<OrbitRing>,
    backdrop: Backdrop,
    controls: ControlState,
    clock: SimulationClock,
    stepper: OrbitalStepper,
    graph: TransformGraph,
    /// Node ids of each body's moons, indexed like `bodies`.
    moon_nodes: Vec<Vec<NodeId>>,
    wall: Box<dyn WallClock>,
}

impl Orrery {
    /// Reference scene on the system clock. Uses `config.seed` when set.
    pub fn new(config: OrreryConfig) -> OrreryResult<Self> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::from_parts(config, catalog::catalog(), Box::new(SystemClock), &mut rng)
    }

    /// Build from explicit parts. The virtual date starts at `wall.now()`.
    pub fn from_parts<R: Rng + ?Sized>(
        config: OrreryConfig,
        bodies: Vec<CelestialBody>,
        wall: Box<dyn WallClock>,
        rng: &mut R,
    ) -> OrreryResult<Self> {
        config.validate()?;
        catalog::validate(&bodies)?;

        let belts = belt::generate(&config.belts, rng)?;
        let rings = build_rings(&bodies, rng);
        let sim = SimulationState::new(wall.now(), config.clock.initial_speed)?;
        let controls = ControlState::new(sim, OrbitCamera::new(config.camera.home));

        let mut graph = TransformGraph::new();
        graph.register(STAR_NODE);
        let mut next = 1 + bodies.len() as u32;
        let mut moon_nodes = Vec::with_capacity(bodies.len());
        for body in &bodies {
            let parent = body_node(body.id);
            graph.register(parent);
            let mut nodes = Vec::with_capacity(body.moons.len());
            for _ in &body.moons {
                let node = NodeId(next);
                next += 1;
                graph.register(node);
                graph.set_parent(node, Some(parent));
                nodes.push(node);
            }
            moon_nodes.push(nodes);
        }

        let mut orrery = Self {
            clock: SimulationClock::new(config.clock.clone()),
            stepper: OrbitalStepper::new(config.stepper.clone()),
            config,
            bodies,
            belts,
            rings,
            backdrop: Backdrop::default(),
            controls,
            graph,
            moon_nodes,
            wall,
        };
        orrery.sync_graph();
        orrery.graph.propagate();

        info!(
            "orrery ready: {} bodies, {} moons, {} belt members, speed {}",
            orrery.bodies.len(),
            orrery.moon_count(),
            orrery.belts.len(),
            orrery.controls.sim.speed
        );
        Ok(orrery)
    }

    /// Swap the wall clock used in real Earth time mode.
    pub fn set_wall_clock(&mut self, wall: Box<dyn WallClock>) {
        self.wall = wall;
    }

    // ── Tick ────────────────────────────────────────────────────────

    /// Advance one tick covering `real_ms` of host time. Returns the elapsed
    /// stepper units.
    pub fn tick(&mut self, real_ms: f64) -> f64 {
        let elapsed = self
            .clock
            .advance(&mut self.controls.sim, real_ms, self.wall.as_ref());

        let sim = &self.controls.sim;
        if sim.frame % DEBUG_LOG_INTERVAL == 0 {
            debug!(
                "frame {}: paused={} speed={} date={}",
                sim.frame, sim.paused, sim.speed, sim.date
            );
        }
        self.controls.sim.frame += 1;

        if elapsed != 0.0 {
            self.stepper.step(&mut self.bodies, elapsed);
            self.stepper.step_belts(&mut self.belts, elapsed);
            self.stepper.step_backdrop(&mut self.backdrop, elapsed);
            self.sync_graph();
        }
        self.graph.propagate();
        self.update_follow();

        elapsed
    }

    /// Apply a command atomically: either the whole change lands or nothing.
    pub fn apply(&mut self, command: Command) -> OrreryResult<()> {
        let previous = self.controls.follow.target();
        match apply_command(self.controls.clone(), command.clone(), &self.bodies, &self.config) {
            Ok(next) => {
                self.controls = next;
                let current = self.controls.follow.target();
                if current != previous {
                    match current {
                        Some(target) => info!("following {}", self.target_name(target)),
                        None => info!("follow stopped"),
                    }
                }
                Ok(())
            }
            Err(err) => {
                warn!("command {:?} rejected: {}", command, err);
                Err(err)
            }
        }
    }

    fn sync_graph(&mut self) {
        self.graph
            .set_local(STAR_NODE, LocalTransform::new().with_yaw(self.backdrop.star_spin));
        for (body, moons) in self.bodies.iter().zip(&self.moon_nodes) {
            self.graph.set_local(
                body_node(body.id),
                LocalTransform::new()
                    .with_offset(body.local_position())
                    .with_yaw(body.spin),
            );
            for (moon, &node) in body.moons.iter().zip(moons) {
                self.graph.set_local(
                    node,
                    LocalTransform::new()
                        .with_offset(moon.local_position())
                        .with_yaw(moon.spin),
                );
            }
        }
    }

    fn update_follow(&mut self) {
        let Some(target) = self.controls.follow.target() else {
            return;
        };
        let Some(position) = self.target_position(target) else {
            warn!("follow target {:?} vanished, stopping", target);
            self.controls.follow.stop();
            return;
        };
        if let Some(update) = self.controls.follow.update(position) {
            self.controls.camera.apply(update);
        }
    }

    fn target_position(&self, target: FollowTarget) -> Option<DVec3> {
        match target {
            FollowTarget::Star => self.graph.world_position(STAR_NODE),
            FollowTarget::Body(id) => self.body_position(id),
        }
    }

    fn target_name(&self, target: FollowTarget) -> &str {
        match target {
            FollowTarget::Star => STAR_NAME,
            FollowTarget::Body(id) => find_by_id(&self.bodies, id).map_or("?", |b| b.name.as_str()),
        }
    }

    // ── Queries ─────────────────────────────────────────────────────

    pub fn config(&self) -> &OrreryConfig {
        &self.config
    }

    pub fn bodies(&self) -> &[CelestialBody] {
        &self.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&CelestialBody> {
        find_by_id(&self.bodies, id)
    }

    pub fn belts(&self) -> &[BeltMember] {
        &self.belts
    }

    pub fn rings(&self) -> &[OrbitRing] {
        &self.rings
    }

    /// Ring brightness at a wall-clock instant (seconds). Independent of the
    /// virtual clock, so rings keep breathing while paused.
    pub fn ring_looks(&self, wall_seconds: f64) -> Vec<RingLook> {
        self.rings.iter().map(|r| r.look(wall_seconds)).collect()
    }

    pub fn backdrop(&self) -> &Backdrop {
        &self.backdrop
    }

    pub fn controls(&self) -> &ControlState {
        &self.controls
    }

    pub fn sim(&self) -> &SimulationState {
        &self.controls.sim
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.controls.sim.date
    }

    pub fn frame(&self) -> u64 {
        self.controls.sim.frame
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.controls.camera
    }

    pub fn visibility(&self) -> &Visibility {
        &self.controls.visibility
    }

    pub fn graph(&self) -> &TransformGraph {
        &self.graph
    }

    pub fn moon_count(&self) -> usize {
        self.moon_nodes.iter().map(Vec::len).sum()
    }

    pub fn body_position(&self, id: BodyId) -> Option<DVec3> {
        self.body(id)?;
        self.graph.world_position(body_node(id))
    }

    /// World position of the `index`-th moon of `id`.
    pub fn moon_position(&self, id: BodyId, index: usize) -> Option<DVec3> {
        let node = *self.moon_nodes.get(id.index())?.get(index)?;
        self.graph.world_position(node)
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        let sim = &self.controls.sim;
        FrameSnapshot {
            date: sim.date,
            frame: sim.frame,
            speed: sim.speed,
            paused: sim.paused,
            following: self
                .controls
                .follow
                .target()
                .map(|t| self.target_name(t).to_string()),
            camera: self.controls.camera.pose(),
            bodies: self
                .bodies
                .iter()
                .map(|b| BodySnapshot {
                    id: b.id,
                    name: b.name.clone(),
                    position: self.body_position(b.id).unwrap_or_default(),
                    spin: b.spin,
                })
                .collect(),
        }
    }
}
