use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::api::error::{OrreryError, OrreryResult};

/// Virtual milliseconds per nominal frame at speed 1 (one day).
pub const BASE_VIRTUAL_MS_PER_FRAME: f64 = 86_400_000.0;
/// Nominal host frame rate the per-frame constants are calibrated against.
pub const TARGET_FRAME_RATE: f64 = 60.0;
/// Elapsed units handed to the stepper per frame in real Earth time mode.
pub const REAL_TIME_MULTIPLIER: f64 = 1e-4;
pub const DEFAULT_SPEED: f64 = 0.4;
/// Upper end of the UI speed slider.
pub const MAX_UI_SPEED: f64 = 10.0;
/// Increment applied by the +/- keys.
pub const SPEED_STEP: f64 = 0.5;

// ── Wall clock ──────────────────────────────────────────────────────

/// Source of "now" for real Earth time mode.
pub trait WallClock {
    fn now(&self) -> DateTime<Utc>;
}

/// Operating-system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl WallClock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<F> WallClock for F
where
    F: Fn() -> DateTime<Utc>,
{
    fn now(&self) -> DateTime<Utc> {
        self()
    }
}

// ── Config ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    pub base_virtual_ms_per_frame: f64,
    pub target_frame_rate: f64,
    pub real_time_multiplier: f64,
    pub initial_speed: f64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            base_virtual_ms_per_frame: BASE_VIRTUAL_MS_PER_FRAME,
            target_frame_rate: TARGET_FRAME_RATE,
            real_time_multiplier: REAL_TIME_MULTIPLIER,
            initial_speed: DEFAULT_SPEED,
        }
    }
}

impl ClockConfig {
    pub fn validate(&self) -> OrreryResult<()> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(OrreryError::InvalidConfig(format!("clock.{name} must be positive, got {v}")))
            }
        };
        positive("base_virtual_ms_per_frame", self.base_virtual_ms_per_frame)?;
        positive("target_frame_rate", self.target_frame_rate)?;
        positive("real_time_multiplier", self.real_time_multiplier)?;
        validate_speed(self.initial_speed)?;
        Ok(())
    }

    /// Length of one nominal frame in real milliseconds.
    pub fn frame_ms(&self) -> f64 {
        1000.0 / self.target_frame_rate
    }
}

/// Accept any finite, non-negative multiplier.
pub fn validate_speed(speed: f64) -> OrreryResult<f64> {
    if speed.is_finite() && speed >= 0.0 {
        Ok(speed)
    } else {
        Err(OrreryError::InvalidSpeed(speed))
    }
}

// ── State ───────────────────────────────────────────────────────────

/// Time-warp state shared by the clock and the control surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationState {
    /// Virtual calendar date shown in the UI.
    pub date: DateTime<Utc>,
    pub paused: bool,
    /// Time-warp multiplier. 0 means real Earth time.
    pub speed: f64,
    /// Ticks since start. Counts paused ticks too.
    pub frame: u64,
}

impl SimulationState {
    pub fn new(date: DateTime<Utc>, speed: f64) -> OrreryResult<Self> {
        Ok(Self {
            date,
            paused: false,
            speed: validate_speed(speed)?,
            frame: 0,
        })
    }

    pub fn set_speed(&mut self, speed: f64) -> OrreryResult<()> {
        self.speed = validate_speed(speed)?;
        Ok(())
    }

    /// One step up the UI slider, capped at `MAX_UI_SPEED`.
    pub fn speed_up(&mut self) {
        self.speed = (self.speed + SPEED_STEP).min(MAX_UI_SPEED);
    }

    /// One step down the UI slider, floored at real Earth time.
    pub fn speed_down(&mut self) {
        self.speed = (self.speed - SPEED_STEP).max(0.0);
    }

    pub fn is_real_time(&self) -> bool {
        self.speed == 0.0
    }
}

// ── Clock ───────────────────────────────────────────────────────────

/// Converts real frame time into virtual elapsed units and calendar time.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    config: ClockConfig,
}

impl SimulationClock {
    pub fn new(config: ClockConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    /// Share of a nominal frame covered by `real_ms`.
    pub fn frame_fraction(&self, real_ms: f64) -> f64 {
        if real_ms.is_finite() && real_ms > 0.0 {
            real_ms / self.config.frame_ms()
        } else {
            0.0
        }
    }

    /// Advance the virtual date for one tick of `real_ms` and return the
    /// elapsed units the stepper should apply.
    ///
    /// Paused: nothing changes and 0 is returned. Speed 0: the date snaps to
    /// the wall clock and only the tiny real-time multiplier is returned so
    /// that rotations keep creeping.
    pub fn advance(&self, state: &mut SimulationState, real_ms: f64, wall: &dyn WallClock) -> f64 {
        if state.paused {
            return 0.0;
        }

        let fraction = self.frame_fraction(real_ms);

        if state.speed == 0.0 {
            state.date = wall.now();
            return self.config.real_time_multiplier * fraction;
        }

        let virtual_ms = self.config.base_virtual_ms_per_frame * state.speed * fraction
            / self.config.target_frame_rate;
        let delta = Duration::microseconds((virtual_ms * 1000.0).round() as i64);
        match state.date.checked_add_signed(delta) {
            Some(date) => state.date = date,
            None => log::warn!("virtual date overflow at {}, holding", state.date),
        }

        state.speed * fraction
    }
}
