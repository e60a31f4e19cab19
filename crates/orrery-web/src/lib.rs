pub mod runner;

use std::cell::RefCell;

use chrono::{DateTime, TimeZone, Utc};
use glam::DVec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;

use orrery::{
    catalog, BodyId, CameraPose, Command, Layer, Orrery, OrreryConfig, OrreryResult, Translator,
    WallClock,
};

pub use runner::SimulationRunner;

thread_local! {
    static RUNNER: RefCell<Option<SimulationRunner>> = RefCell::new(None);
}

/// Run `f` against the live runner. Before `orrery_init` it logs and
/// returns the default value.
fn with_runner<F, R>(f: F) -> R
where
    F: FnOnce(&mut SimulationRunner) -> R,
    R: Default,
{
    RUNNER.with(|r| match r.borrow_mut().as_mut() {
        Some(runner) => f(runner),
        None => {
            log::warn!("orrery is not initialized");
            R::default()
        }
    })
}

fn push(command: Command) {
    with_runner(|r| r.push(command));
}

/// Wall clock backed by `Date.now()`; `Utc::now` is unavailable in the browser.
struct BrowserClock;

impl WallClock for BrowserClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(js_sys::Date::now() as i64)
            .single()
            .unwrap_or_default()
    }
}

fn wall_seconds() -> f64 {
    js_sys::Date::now() / 1000.0
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn build(config: OrreryConfig) -> OrreryResult<SimulationRunner> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let orrery = Orrery::from_parts(config, catalog(), Box::new(BrowserClock), &mut rng)?;
    Ok(SimulationRunner::new(orrery, Translator::embedded()?))
}

fn install(config: OrreryConfig) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let runner = build(config).map_err(to_js)?;
    log::info!(
        "orrery initialized: {} bodies, {} floats per frame",
        runner.orrery().bodies().len(),
        runner.buffer_total_floats()
    );
    RUNNER.with(|r| *r.borrow_mut() = Some(runner));
    Ok(())
}

// ---- Lifecycle ----

#[wasm_bindgen]
pub fn orrery_init() -> Result<(), JsValue> {
    install(OrreryConfig::default())
}

/// Initialize from a JSON config; missing fields take their defaults.
#[wasm_bindgen]
pub fn orrery_init_with_config(json: &str) -> Result<(), JsValue> {
    install(OrreryConfig::from_json(json).map_err(to_js)?)
}

/// Advance by one browser frame of `dt_ms` milliseconds.
#[wasm_bindgen]
pub fn orrery_tick(dt_ms: f64) {
    let now = wall_seconds();
    with_runner(|r| r.tick(dt_ms, now));
}

// ---- Commands (applied on the next tick) ----

#[wasm_bindgen]
pub fn set_speed(speed: f64) {
    push(Command::SetSpeed(speed));
}

#[wasm_bindgen]
pub fn speed_up() {
    push(Command::SpeedUp);
}

#[wasm_bindgen]
pub fn speed_down() {
    push(Command::SpeedDown);
}

#[wasm_bindgen]
pub fn toggle_pause() {
    push(Command::TogglePause);
}

#[wasm_bindgen]
pub fn set_paused(paused: bool) {
    push(Command::SetPaused(paused));
}

#[wasm_bindgen]
pub fn select_body(id: u32) {
    push(Command::Select(BodyId(id)));
}

#[wasm_bindgen]
pub fn select_body_by_name(name: &str) {
    push(Command::SelectByName(name.to_string()));
}

#[wasm_bindgen]
pub fn follow_sun() {
    push(Command::FollowStar);
}

#[wasm_bindgen]
pub fn stop_follow() {
    push(Command::StopFollow);
}

#[wasm_bindgen]
pub fn reset_view() {
    push(Command::Reset);
}

/// Report a camera moved by the user's orbit controls.
#[wasm_bindgen]
pub fn move_camera(px: f64, py: f64, pz: f64, tx: f64, ty: f64, tz: f64) {
    push(Command::MoveCamera(CameraPose::new(
        DVec3::new(px, py, pz),
        DVec3::new(tx, ty, tz),
    )));
}

/// Layer codes: 0 orbits, 1 moons, 2 planet labels, 3 moon labels,
/// 4-7 main belt, trojans, kuiper, scattered disc.
#[wasm_bindgen]
pub fn set_visibility(layer: u32, visible: bool) {
    match Layer::from_code(layer) {
        Some(layer) => push(Command::SetVisibility(layer, visible)),
        None => log::warn!("unknown layer code {}", layer),
    }
}

#[wasm_bindgen]
pub fn toggle_visibility(layer: u32) {
    match Layer::from_code(layer) {
        Some(layer) => push(Command::ToggleVisibility(layer)),
        None => log::warn!("unknown layer code {}", layer),
    }
}

#[wasm_bindgen]
pub fn cycle_belts() {
    push(Command::CycleBelts);
}

// ---- Frame buffer ----

#[wasm_bindgen]
pub fn get_buffer_ptr() -> *const f32 {
    RUNNER.with(|r| r.borrow().as_ref().map_or(std::ptr::null(), |runner| runner.buffer_ptr()))
}

#[wasm_bindgen]
pub fn get_buffer_total_floats() -> u32 {
    with_runner(|r| r.buffer_total_floats())
}

#[wasm_bindgen]
pub fn get_instance_count() -> u32 {
    with_runner(|r| r.instance_count())
}

#[wasm_bindgen]
pub fn get_ring_count() -> u32 {
    with_runner(|r| r.ring_count())
}

// ---- State queries ----

/// `[px, py, pz, tx, ty, tz]`
#[wasm_bindgen]
pub fn get_camera_pose() -> Vec<f64> {
    with_runner(|r| {
        let pose = r.orrery().camera().pose();
        vec![
            pose.position.x,
            pose.position.y,
            pose.position.z,
            pose.target.x,
            pose.target.y,
            pose.target.z,
        ]
    })
}

/// Simulated date as milliseconds since the Unix epoch.
#[wasm_bindgen]
pub fn get_date_ms() -> f64 {
    with_runner(|r| r.orrery().date().timestamp_millis() as f64)
}

#[wasm_bindgen]
pub fn get_frame() -> f64 {
    with_runner(|r| r.orrery().frame() as f64)
}

#[wasm_bindgen]
pub fn get_speed() -> f64 {
    with_runner(|r| r.orrery().sim().speed)
}

#[wasm_bindgen]
pub fn is_paused() -> bool {
    with_runner(|r| r.orrery().sim().paused)
}

#[wasm_bindgen]
pub fn get_speed_label() -> String {
    with_runner(|r| r.speed_label())
}

#[wasm_bindgen]
pub fn get_following_message() -> Option<String> {
    with_runner(|r| r.following_message())
}

#[wasm_bindgen]
pub fn get_body_count() -> u32 {
    with_runner(|r| r.orrery().bodies().len() as u32)
}

#[wasm_bindgen]
pub fn get_body_name(id: u32) -> Option<String> {
    with_runner(|r| r.orrery().body(BodyId(id)).map(|b| b.name.clone()))
}

/// Date, camera and body positions as JSON for the info panels.
#[wasm_bindgen]
pub fn get_snapshot_json() -> Result<String, JsValue> {
    RUNNER.with(|r| match r.borrow().as_ref() {
        Some(runner) => serde_json::to_string(&runner.orrery().snapshot()).map_err(to_js),
        None => Err(JsValue::from_str("orrery is not initialized")),
    })
}

// ---- Translations ----

/// Translate `key`; `params_json` is an optional object of placeholder values.
#[wasm_bindgen]
pub fn translate(key: &str, params_json: Option<String>) -> Result<String, JsValue> {
    let params: Vec<(String, String)> = match params_json {
        Some(json) => serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&json)
            .map_err(to_js)?
            .into_iter()
            .map(|(k, v)| {
                let v = match v {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (k, v)
            })
            .collect(),
        None => Vec::new(),
    };
    let borrowed: Vec<(&str, &str)> = params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    Ok(with_runner(|r| r.translator().t(key, &borrowed)))
}

#[wasm_bindgen]
pub fn set_language(code: &str) -> bool {
    with_runner(|r| r.set_language(code))
}

#[wasm_bindgen]
pub fn get_language() -> String {
    with_runner(|r| r.translator().locale().code().to_string())
}

#[wasm_bindgen]
pub fn format_number(value: f64, decimals: u32) -> String {
    with_runner(|r| r.translator().format_number(value, decimals as usize))
}

#[wasm_bindgen]
pub fn format_time_period(value: f64, unit: &str) -> String {
    with_runner(|r| r.translator().format_time_period(value, unit))
}
