use orrery::{
    Command, CommandQueue, FollowTarget, FrameBuffer, FramePacer, Locale, Orrery, Translator,
    STAR_NAME_KEY,
};

/// Drives one `Orrery` from the browser's animation frames.
///
/// Commands queued between frames are applied before the clock advances;
/// the frame buffer is rewritten once per browser frame, however many
/// fixed ticks ran.
pub struct SimulationRunner {
    orrery: Orrery,
    commands: CommandQueue,
    pacer: FramePacer,
    translator: Translator,
    buffer: FrameBuffer,
    rejected: u32,
}

impl SimulationRunner {
    pub fn new(orrery: Orrery, translator: Translator) -> Self {
        let buffer = FrameBuffer::for_scene(&orrery);
        let pacer = FramePacer::from_frame_rate(orrery.config().clock.target_frame_rate);
        Self {
            orrery,
            commands: CommandQueue::new(),
            pacer,
            translator,
            buffer,
            rejected: 0,
        }
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Run one browser frame of `dt_ms` real milliseconds.
    pub fn tick(&mut self, dt_ms: f64, wall_seconds: f64) {
        for command in self.commands.drain() {
            // The scene logs the rejection itself.
            if self.orrery.apply(command).is_err() {
                self.rejected += 1;
            }
        }

        let locale = self.orrery.controls().locale;
        if self.translator.locale() != locale {
            self.translator.set_locale(locale);
        }

        let steps = self.pacer.accumulate(dt_ms);
        for _ in 0..steps {
            self.orrery.tick(self.pacer.step_ms());
        }

        self.buffer.write(&self.orrery, wall_seconds);
    }

    /// Switch language now and record it in the control state on the next
    /// tick. Unknown codes are refused.
    pub fn set_language(&mut self, code: &str) -> bool {
        match code.parse::<Locale>() {
            Ok(locale) => {
                self.translator.set_locale(locale);
                self.commands.push(Command::SetLocale(locale));
                true
            }
            Err(err) => {
                log::warn!("{}", err);
                false
            }
        }
    }

    // ---- Accessors ----

    pub fn orrery(&self) -> &Orrery {
        &self.orrery
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }

    /// Commands refused since start-up.
    pub fn rejected_commands(&self) -> u32 {
        self.rejected
    }

    pub fn speed_label(&self) -> String {
        self.translator.speed_label(self.orrery.sim().speed)
    }

    /// Display name of a follow target in the current language. Bodies
    /// without a translation keep their catalog name.
    pub fn target_name(&self, target: FollowTarget) -> Option<String> {
        match target {
            FollowTarget::Star => Some(self.translator.t(STAR_NAME_KEY, &[])),
            FollowTarget::Body(id) => {
                let body = self.orrery.body(id)?;
                let key = body.name_key();
                let name = self.translator.t(&key, &[]);
                Some(if name == key { body.name.clone() } else { name })
            }
        }
    }

    /// "Now following ..." in the current language, if anything is followed.
    pub fn following_message(&self) -> Option<String> {
        let name = self.target_name(self.orrery.controls().follow.target()?)?;
        Some(self.translator.t("messages.nowFollowing", &[("planet", name.as_str())]))
    }

    // ---- Pointer accessors for the JS side ----

    pub fn buffer_ptr(&self) -> *const f32 {
        self.buffer.as_ptr()
    }

    pub fn buffer_total_floats(&self) -> u32 {
        self.buffer.layout().buffer_total_floats as u32
    }

    pub fn instance_count(&self) -> u32 {
        self.buffer.layout().instance_count as u32
    }

    pub fn ring_count(&self) -> u32 {
        self.buffer.layout().ring_count as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use orrery::bridge::protocol::{HEADER_FRAME_COUNTER, HEADER_PAUSED};
    use orrery::{catalog, FixedClock, OrreryConfig};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn runner() -> SimulationRunner {
        let wall = FixedClock(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap());
        let orrery = Orrery::from_parts(
            OrreryConfig::default(),
            catalog(),
            Box::new(wall),
            &mut StdRng::seed_from_u64(3),
        )
        .unwrap();
        SimulationRunner::new(orrery, Translator::embedded().unwrap())
    }

    #[test]
    fn tick_applies_queue_then_writes() {
        let mut r = runner();
        r.push(Command::SetPaused(true));
        r.push(Command::SelectByName("Vulcan".into()));
        assert_eq!(r.pending_commands(), 2);

        r.tick(1000.0 / 60.0, 0.0);
        assert_eq!(r.pending_commands(), 0);
        assert_eq!(r.rejected_commands(), 1);
        assert!(r.orrery().sim().paused);

        let data = r.buffer().as_slice();
        assert_eq!(data[HEADER_PAUSED], 1.0);
        assert_eq!(data[HEADER_FRAME_COUNTER], r.orrery().frame() as f32);
    }

    #[test]
    fn short_frames_accumulate() {
        let mut r = runner();
        r.tick(5.0, 0.0);
        assert_eq!(r.orrery().frame(), 0);
        r.tick(12.0, 0.0);
        assert_eq!(r.orrery().frame(), 1);
    }

    #[test]
    fn language_switch_reaches_controls() {
        let mut r = runner();
        assert!(!r.set_language("xx"));
        assert!(r.set_language("fr"));
        assert_eq!(r.translator().locale(), Locale::Fr);
        r.tick(0.0, 0.0);
        assert_eq!(r.orrery().controls().locale, Locale::Fr);
        assert_eq!(r.speed_label(), "0.4x Lent");
    }

    #[test]
    fn following_message_names_the_body() {
        let mut r = runner();
        assert!(r.following_message().is_none());
        r.push(Command::SelectByName("Mars".into()));
        r.tick(1000.0 / 60.0, 0.0);
        assert_eq!(r.following_message().unwrap(), "Now following Mars");
    }

    #[test]
    fn followed_names_are_translated() {
        let mut r = runner();
        r.push(Command::FollowStar);
        r.tick(1000.0 / 60.0, 0.0);
        assert_eq!(r.following_message().unwrap(), "Now following Sun");

        assert!(r.set_language("fr"));
        assert_eq!(r.following_message().unwrap(), "Maintenant en train de suivre Soleil");

        r.push(Command::SelectByName("earth".into()));
        r.tick(1000.0 / 60.0, 0.0);
        assert_eq!(r.following_message().unwrap(), "Maintenant en train de suivre Terre");
    }
}
