use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use foundation::Color;
use foundation::math::{Direction, GeoCoordinate, Vec3};
use foundation::time::Time;
use runtime::Clock;
use scene::{GlobeConfig, GlobeScene};
use serde::Serialize;
use wasm_bindgen::prelude::*;

// Guard to prevent double-initialization of global state (relevant during hot reload).
static INITIALIZED: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK_SET: OnceLock<()> = OnceLock::new();

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }
    init_panic_hook();
    Ok(())
}

fn init_panic_hook() {
    PANIC_HOOK_SET.get_or_init(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = info.to_string();
            web_sys::console::error_1(&JsValue::from_str(&msg));
        }));
    });
}

fn console_log(msg: &str) {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::console::log_1(&JsValue::from_str(msg));
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        tracing::debug!("{msg}");
    }
}

/// Wall-clock seconds, for pointer events that arrive without a timestamp.
fn now_seconds() -> f64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now() / 1000.0
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    match serde_json::to_string(value) {
        Ok(s) => s,
        Err(err) => {
            console_log(&format!("serialize error: {err}"));
            "null".to_string()
        }
    }
}

fn vec3_array(v: Vec3) -> Vec<f64> {
    v.as_array().to_vec()
}

/// Browser handle to one globe scene.
///
/// Timestamps are host seconds (`performance.now() / 1000`); pointer handlers
/// fall back to the wall clock when given none, so a press and its release
/// must use the same source. Pixel positions are CSS pixels relative to the
/// canvas.
#[wasm_bindgen]
pub struct GlobeApp {
    scene: GlobeScene,
    clock: Clock,
}

#[wasm_bindgen]
impl GlobeApp {
    /// `config_json` is a partial [`GlobeConfig`]; missing fields take defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<GlobeApp, JsValue> {
        init_panic_hook();
        Self::from_config_json(config_json.as_deref()).map_err(|e| JsValue::from_str(&e))
    }

    pub fn resize(&mut self, width: f64, height: f64, device_pixel_ratio: f64) {
        self.scene.resize(width, height, device_pixel_ratio);
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.scene.viewport().pixel_ratio
    }

    pub fn pointer_down(&mut self, now_s: Option<f64>) {
        self.scene.pointer_down(Time(now_s.unwrap_or_else(now_seconds)));
    }

    /// Pick result as JSON when the release was a click that hit the globe.
    pub fn pointer_up(&mut self, now_s: Option<f64>, x_px: f64, y_px: f64) -> Option<String> {
        let at = Time(now_s.unwrap_or_else(now_seconds));
        let hit = self.scene.pointer_up_px(at, x_px, y_px)?;
        Some(to_json(&hit))
    }

    pub fn is_pointer_down(&self) -> bool {
        self.scene.is_pointer_down()
    }

    pub fn pointer_cancel(&mut self) {
        self.scene.pointer_cancel();
    }

    pub fn set_sun(&mut self, phi: f64, theta: f64) {
        self.scene.set_sun_angles(phi, theta);
    }

    pub fn set_day_color(&mut self, hex: &str) -> Result<(), JsValue> {
        let color = parse_color(hex).map_err(|e| JsValue::from_str(&e))?;
        self.scene.set_atmosphere_day_color(color);
        Ok(())
    }

    pub fn set_twilight_color(&mut self, hex: &str) -> Result<(), JsValue> {
        let color = parse_color(hex).map_err(|e| JsValue::from_str(&e))?;
        self.scene.set_atmosphere_twilight_color(color);
        Ok(())
    }

    pub fn place_marker(&mut self, lat: f64, lon: f64) {
        self.scene.place_marker(GeoCoordinate::new(lat, lon));
    }

    /// Advances one animation frame and returns the events raised since the
    /// previous tick as a JSON array.
    pub fn tick(&mut self, now_s: f64) -> String {
        let frame = self.clock.advance(now_s);
        self.scene.tick(frame);
        to_json(&self.scene.drain_events())
    }

    /// Seconds since the first tick.
    pub fn elapsed_s(&self) -> f64 {
        self.clock.elapsed().seconds()
    }

    /// Writes back a camera moved by host orbit controls; it keeps looking at
    /// the globe center.
    pub fn set_camera_position(&mut self, x: f64, y: f64, z: f64) {
        let position = Vec3::new(x, y, z);
        if !position.is_finite() {
            console_log("ignoring non-finite camera position");
            return;
        }
        let center = self.scene.bodies().earth.center;
        let camera = self.scene.camera_mut();
        camera.position = position;
        camera.target = center;
    }

    pub fn camera_position(&self) -> Vec<f64> {
        vec3_array(self.scene.camera().position)
    }

    pub fn camera_target(&self) -> Vec<f64> {
        vec3_array(self.scene.camera().target)
    }

    pub fn marker_position(&self) -> Vec<f64> {
        vec3_array(self.scene.marker().position)
    }

    /// `[lat, lon]` in degrees.
    pub fn marker_coordinate(&self) -> Vec<f64> {
        let c = self.scene.marker().coordinate;
        vec![c.lat, c.lon]
    }

    pub fn earth_rotation_y(&self) -> f64 {
        self.scene.bodies().earth.rotation_y
    }

    pub fn sun_direction(&self) -> Vec<f64> {
        vec3_array(self.scene.sun().direction())
    }

    pub fn sun_marker_position(&self) -> Vec<f64> {
        vec3_array(self.scene.sun_marker_position())
    }

    /// Earth and atmosphere material uniforms.
    pub fn uniforms_json(&self) -> String {
        to_json(self.scene.materials())
    }

    pub fn config_json(&self) -> String {
        to_json(self.scene.config())
    }
}

impl GlobeApp {
    fn from_config_json(config_json: Option<&str>) -> Result<Self, String> {
        let config = match config_json {
            Some(json) if !json.trim().is_empty() => {
                GlobeConfig::from_json_str(json).map_err(|e| e.to_string())?
            }
            _ => GlobeConfig::default(),
        };
        let scene = GlobeScene::new(config).map_err(|e| e.to_string())?;
        console_log("globe scene ready");
        Ok(Self {
            scene,
            clock: Clock::new(),
        })
    }
}

fn parse_color(hex: &str) -> Result<Color, String> {
    Color::from_hex(hex).map_err(|e| format!("bad color {hex:?}: {e}"))
}

/// `[lat, lon]` for a sphere-local direction, or nothing for a zero vector.
#[wasm_bindgen(js_name = toGeoCoordinate)]
pub fn to_geo_coordinate(x: f64, y: f64, z: f64) -> Option<Vec<f64>> {
    let dir = Direction::new(Vec3::new(x, y, z))?;
    let c = foundation::math::to_geo_coordinate(dir);
    Some(vec![c.lat, c.lon])
}

/// Unit `[x, y, z]` for a latitude/longitude in degrees.
#[wasm_bindgen(js_name = toDirection)]
pub fn to_direction(lat: f64, lon: f64) -> Vec<f64> {
    vec3_array(foundation::math::to_direction(GeoCoordinate::new(lat, lon)).as_vec3())
}
