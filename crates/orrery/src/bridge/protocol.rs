/// Flat frame buffer shared with the browser renderer.
/// Must stay in sync with the host's `protocol.ts`.
///
/// Layout (all values f32 / 4 bytes):
/// ```text
/// [Header: 8 floats]
/// [Instances: (1 star + bodies + moons + belt members) × 10 floats]
/// [Rings: bodies × 8 floats]
/// ```
///
/// Counts never change after start, so the host reads them from the header
/// once and computes section offsets from there.

use bytemuck::{Pod, Zeroable};

use crate::api::types::FollowTarget;
use crate::core::scene::Orrery;

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 8;

/// Header field indices.
pub const HEADER_PROTOCOL_VERSION: usize = 0;
pub const HEADER_FRAME_COUNTER: usize = 1;
pub const HEADER_INSTANCE_COUNT: usize = 2;
pub const HEADER_BODY_COUNT: usize = 3;
pub const HEADER_MOON_COUNT: usize = 4;
pub const HEADER_BELT_COUNT: usize = 5;
pub const HEADER_RING_COUNT: usize = 6;
pub const HEADER_PAUSED: usize = 7;

pub const PROTOCOL_VERSION: f32 = 1.0;

/// Floats per transform instance: x, y, z, spin_x, spin_y, spin_z, size, kind,
/// visible, highlight.
pub const INSTANCE_FLOATS: usize = 10;

/// Floats per ring instance: radius, r, g, b, emissive, opacity, visible, body.
pub const RING_FLOATS: usize = 8;

/// Instance kinds.
pub const KIND_STAR: f32 = 0.0;
pub const KIND_BODY: f32 = 1.0;
pub const KIND_MOON: f32 = 2.0;
pub const KIND_BELT: f32 = 3.0;

/// World placement of one renderable.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TransformInstance {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Self-rotation angles. Only belt members tumble; everything else
    /// spins about +Y.
    pub spin_x: f32,
    pub spin_y: f32,
    pub spin_z: f32,
    pub size: f32,
    pub kind: f32,
    /// 1.0 when the layer is shown.
    pub visible: f32,
    /// 1.0 on the follow target.
    pub highlight: f32,
}

/// Orbit ring appearance for one body.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct RingInstance {
    pub radius: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub emissive: f32,
    pub opacity: f32,
    pub visible: f32,
    pub body: f32,
}

/// Section sizes and offsets of the frame buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLayout {
    pub body_count: usize,
    pub moon_count: usize,
    pub belt_count: usize,
    pub ring_count: usize,

    /// Index of the first body instance (the star is instance 0).
    pub body_offset: usize,
    /// Index of the first moon instance.
    pub moon_offset: usize,
    /// Index of the first belt instance.
    pub belt_offset: usize,
    pub instance_count: usize,

    /// Offset (in floats) where instance data begins.
    pub instance_data_offset: usize,
    /// Offset (in floats) where ring data begins.
    pub ring_data_offset: usize,

    pub buffer_total_floats: usize,
    pub buffer_total_bytes: usize,
}

impl ProtocolLayout {
    pub fn new(body_count: usize, moon_count: usize, belt_count: usize) -> Self {
        let body_offset = 1;
        let moon_offset = body_offset + body_count;
        let belt_offset = moon_offset + moon_count;
        let instance_count = belt_offset + belt_count;
        let ring_count = body_count;

        let instance_data_offset = HEADER_FLOATS;
        let ring_data_offset = instance_data_offset + instance_count * INSTANCE_FLOATS;
        let buffer_total_floats = ring_data_offset + ring_count * RING_FLOATS;

        Self {
            body_count,
            moon_count,
            belt_count,
            ring_count,
            body_offset,
            moon_offset,
            belt_offset,
            instance_count,
            instance_data_offset,
            ring_data_offset,
            buffer_total_floats,
            buffer_total_bytes: buffer_total_floats * 4,
        }
    }

    pub fn for_scene(orrery: &Orrery) -> Self {
        Self::new(orrery.bodies().len(), orrery.moon_count(), orrery.belts().len())
    }
}

fn flag(on: bool) -> f32 {
    if on {
        1.0
    } else {
        0.0
    }
}

/// Reusable frame buffer. Allocated once; `write` overwrites it in place.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    layout: ProtocolLayout,
    /// Wall time the ring pulse was last sampled at; held while paused.
    pulse_seconds: Option<f64>,
    instances: Vec<TransformInstance>,
    rings: Vec<RingInstance>,
    data: Vec<f32>,
}

impl FrameBuffer {
    pub fn new(layout: ProtocolLayout) -> Self {
        Self {
            pulse_seconds: None,
            instances: Vec::with_capacity(layout.instance_count),
            rings: Vec::with_capacity(layout.ring_count),
            data: vec![0.0; layout.buffer_total_floats],
            layout,
        }
    }

    pub fn for_scene(orrery: &Orrery) -> Self {
        Self::new(ProtocolLayout::for_scene(orrery))
    }

    pub fn layout(&self) -> &ProtocolLayout {
        &self.layout
    }

    pub fn instances(&self) -> &[TransformInstance] {
        &self.instances
    }

    pub fn rings(&self) -> &[RingInstance] {
        &self.rings
    }

    /// The whole buffer, header first.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_ptr(&self) -> *const f32 {
        self.data.as_ptr()
    }

    /// Serialize the current scene. `wall_seconds` drives ring pulses, which
    /// hold their last look while the simulation is paused.
    pub fn write(&mut self, orrery: &Orrery, wall_seconds: f64) {
        let visibility = orrery.visibility();
        let followed = orrery.controls().follow.target();

        self.instances.clear();
        self.instances.push(TransformInstance {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            spin_x: 0.0,
            spin_y: orrery.backdrop().star_spin as f32,
            spin_z: 0.0,
            size: orrery.config().star_size as f32,
            kind: KIND_STAR,
            visible: 1.0,
            highlight: flag(followed == Some(FollowTarget::Star)),
        });

        for body in orrery.bodies() {
            let p = orrery.body_position(body.id).unwrap_or_default();
            self.instances.push(TransformInstance {
                x: p.x as f32,
                y: p.y as f32,
                z: p.z as f32,
                spin_x: 0.0,
                spin_y: body.spin as f32,
                spin_z: 0.0,
                size: body.size as f32,
                kind: KIND_BODY,
                visible: 1.0,
                highlight: flag(followed == Some(FollowTarget::Body(body.id))),
            });
        }

        for body in orrery.bodies() {
            for (i, moon) in body.moons.iter().enumerate() {
                let p = orrery.moon_position(body.id, i).unwrap_or_default();
                self.instances.push(TransformInstance {
                    x: p.x as f32,
                    y: p.y as f32,
                    z: p.z as f32,
                    spin_x: 0.0,
                    spin_y: moon.spin as f32,
                    spin_z: 0.0,
                    size: moon.size as f32,
                    kind: KIND_MOON,
                    visible: flag(visibility.moons),
                    highlight: 0.0,
                });
            }
        }

        for member in orrery.belts() {
            let p = member.position();
            self.instances.push(TransformInstance {
                x: p.x as f32,
                y: p.y as f32,
                z: p.z as f32,
                spin_x: member.spin.x as f32,
                spin_y: member.spin.y as f32,
                spin_z: member.spin.z as f32,
                size: member.size as f32,
                kind: KIND_BELT,
                visible: flag(visibility.belt(member.kind.family())),
                highlight: 0.0,
            });
        }

        let pulse_seconds = match self.pulse_seconds {
            Some(held) if orrery.sim().paused => held,
            _ => wall_seconds,
        };
        self.pulse_seconds = Some(pulse_seconds);

        self.rings.clear();
        for ring in orrery.rings() {
            let look = ring.look(pulse_seconds);
            self.rings.push(RingInstance {
                radius: ring.radius as f32,
                r: ring.color[0],
                g: ring.color[1],
                b: ring.color[2],
                emissive: look.emissive as f32,
                opacity: look.opacity as f32,
                visible: flag(visibility.orbits),
                body: ring.body.0 as f32,
            });
        }

        self.flush(orrery);
    }

    fn flush(&mut self, orrery: &Orrery) {
        let layout = &self.layout;
        let header = [
            PROTOCOL_VERSION,
            orrery.frame() as f32,
            self.instances.len() as f32,
            layout.body_count as f32,
            layout.moon_count as f32,
            layout.belt_count as f32,
            self.rings.len() as f32,
            flag(orrery.sim().paused),
        ];
        self.data[..HEADER_FLOATS].copy_from_slice(&header);

        let instance_floats: &[f32] = bytemuck::cast_slice(&self.instances);
        let start = layout.instance_data_offset;
        let end = (start + instance_floats.len()).min(layout.ring_data_offset);
        self.data[start..end].copy_from_slice(&instance_floats[..end - start]);

        let ring_floats: &[f32] = bytemuck::cast_slice(&self.rings);
        let start = layout.ring_data_offset;
        let end = (start + ring_floats.len()).min(layout.buffer_total_floats);
        self.data[start..end].copy_from_slice(&ring_floats[..end - start]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::OrreryConfig;
    use crate::assets::catalog::{catalog, BODY_COUNT, MOON_COUNT};
    use crate::core::belt::BeltFamily;
    use crate::core::clock::FixedClock;
    use crate::input::command::{Command, Layer};
    use crate::api::types::BodyId;
    use chrono::{TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn orrery() -> Orrery {
        let clock = FixedClock(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
        Orrery::from_parts(OrreryConfig::default(), catalog(), Box::new(clock), &mut StdRng::seed_from_u64(5))
            .unwrap()
    }

    #[test]
    fn layout_offsets() {
        let layout = ProtocolLayout::new(23, 40, 580);
        assert_eq!(layout.moon_offset, 24);
        assert_eq!(layout.belt_offset, 64);
        assert_eq!(layout.instance_count, 644);
        assert_eq!(layout.ring_data_offset, HEADER_FLOATS + 644 * INSTANCE_FLOATS);
        assert_eq!(layout.buffer_total_bytes, layout.buffer_total_floats * 4);
    }

    #[test]
    fn instance_structs_match_wire_size() {
        assert_eq!(std::mem::size_of::<TransformInstance>(), INSTANCE_FLOATS * 4);
        assert_eq!(std::mem::size_of::<RingInstance>(), RING_FLOATS * 4);
    }

    #[test]
    fn write_fills_every_section() {
        let mut o = orrery();
        o.apply(Command::Select(BodyId(2))).unwrap();
        o.apply(Command::SetVisibility(Layer::Belt(BeltFamily::Kuiper), false)).unwrap();
        o.tick(1000.0 / 60.0);

        let mut buffer = FrameBuffer::for_scene(&o);
        buffer.write(&o, 12.0);
        let layout = buffer.layout().clone();

        assert_eq!(buffer.instances().len(), 1 + BODY_COUNT + MOON_COUNT + o.belts().len());
        assert_eq!(buffer.rings().len(), BODY_COUNT);

        let data = buffer.as_slice();
        assert_eq!(data.len(), layout.buffer_total_floats);
        assert_eq!(data[HEADER_PROTOCOL_VERSION], PROTOCOL_VERSION);
        assert_eq!(data[HEADER_FRAME_COUNTER], 1.0);
        assert_eq!(data[HEADER_INSTANCE_COUNT] as usize, layout.instance_count);

        let earth = buffer.instances()[layout.body_offset + 2];
        assert_eq!(earth.kind, KIND_BODY);
        assert_eq!(earth.highlight, 1.0);
        let p = o.body_position(BodyId(2)).unwrap();
        assert!((earth.x - p.x as f32).abs() < 1e-4);

        let first_body_floats = layout.instance_data_offset + layout.body_offset * INSTANCE_FLOATS;
        assert_eq!(data[first_body_floats + 7], KIND_BODY);

        for (inst, member) in buffer.instances()[layout.belt_offset..].iter().zip(o.belts()) {
            let expected = if member.kind.family() == BeltFamily::Kuiper { 0.0 } else { 1.0 };
            assert_eq!(inst.visible, expected);
        }
    }

    #[test]
    fn belt_instances_carry_all_spin_angles() {
        let mut o = orrery();
        o.apply(Command::SetSpeed(5.0)).unwrap();
        for _ in 0..10 {
            o.tick(1000.0 / 60.0);
        }
        let mut buffer = FrameBuffer::for_scene(&o);
        buffer.write(&o, 0.0);
        let layout = buffer.layout().clone();

        for (i, member) in o.belts().iter().enumerate() {
            let inst = buffer.instances()[layout.belt_offset + i];
            assert_eq!(inst.kind, KIND_BELT);
            assert_eq!(inst.spin_x, member.spin.x as f32);
            assert_eq!(inst.spin_y, member.spin.y as f32);
            assert_eq!(inst.spin_z, member.spin.z as f32);
        }

        let main = o.belts().iter().position(|m| m.spin.x != 0.0 && m.spin.z != 0.0).unwrap();
        let floats = layout.instance_data_offset + (layout.belt_offset + main) * INSTANCE_FLOATS;
        let data = buffer.as_slice();
        assert_eq!(data[floats + 3], o.belts()[main].spin.x as f32);
        assert_eq!(data[floats + 5], o.belts()[main].spin.z as f32);
    }

    #[test]
    fn ring_pulse_holds_while_paused() {
        let mut o = orrery();
        let mut buffer = FrameBuffer::for_scene(&o);
        buffer.write(&o, 0.0);
        let running = buffer.rings().to_vec();

        o.apply(Command::SetPaused(true)).unwrap();
        buffer.write(&o, 300.0);
        assert_eq!(buffer.rings(), &running[..]);

        o.apply(Command::SetPaused(false)).unwrap();
        buffer.write(&o, 300.0);
        let resumed = buffer.rings();
        let pulsing = o.rings().iter().filter(|r| r.pulse.is_some()).count();
        assert!(pulsing > 0);
        let changed = resumed.iter().zip(&running).filter(|(a, b)| a != b).count();
        assert_eq!(changed, pulsing);
    }

    #[test]
    fn rings_follow_orbit_visibility() {
        let mut o = orrery();
        o.apply(Command::ToggleVisibility(Layer::Orbits)).unwrap();
        let mut buffer = FrameBuffer::for_scene(&o);
        buffer.write(&o, 0.0);
        assert!(buffer.rings().iter().all(|r| r.visible == 0.0));
        let offset = buffer.layout().ring_data_offset;
        assert_eq!(buffer.as_slice()[offset], buffer.rings()[0].radius);
    }
}
