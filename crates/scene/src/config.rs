use std::f64::consts::FRAC_PI_2;
use std::path::Path;

use foundation::Color;
use foundation::math::{GeoCoordinate, LongitudeConvention, Vec3};
use runtime::DEFAULT_TAP_THRESHOLD_S;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Environment variable naming a JSON config file.
pub const CONFIG_PATH_ENV: &str = "GLOBE_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Env { var: &'static str, value: String },
    Invalid { field: &'static str, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "config read failed: {msg}"),
            ConfigError::Parse(msg) => write!(f, "config parse failed: {msg}"),
            ConfigError::Env { var, value } => write!(f, "invalid {var}={value:?}"),
            ConfigError::Invalid { field, reason } => write!(f, "invalid {field}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub fov_y_deg: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(12.0, 5.0, 4.0),
            fov_y_deg: 25.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// Canvas size assumed until the host's first resize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f64,
    pub height: f64,
    pub device_pixel_ratio: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            device_pixel_ratio: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SunConfig {
    /// Polar angle from +Y, radians, [0, pi].
    pub phi: f64,
    /// Azimuth from +Z toward +X, radians, [-pi, pi].
    pub theta: f64,
    /// How far out the debug sun marker is drawn.
    pub marker_distance: f64,
}

impl Default for SunConfig {
    fn default() -> Self {
        Self {
            phi: FRAC_PI_2,
            theta: 0.5,
            marker_distance: 5.0,
        }
    }
}

/// Everything the demo used to hard-code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    pub earth_radius: f64,
    /// Atmosphere shell radius as a multiple of `earth_radius`.
    pub atmosphere_scale: f64,
    /// Marker distance from the center as a multiple of `earth_radius`.
    pub marker_altitude: f64,
    pub initial_marker: GeoCoordinate,
    pub longitude_convention: LongitudeConvention,
    pub tap_threshold_s: f64,
    pub recenter_camera_on_pick: bool,
    /// Earth spin about +Y; 0 keeps it still.
    pub spin_rate_rad_per_s: f64,
    pub max_pixel_ratio: f64,
    pub atmosphere_day_color: Color,
    pub atmosphere_twilight_color: Color,
    pub camera: CameraConfig,
    pub viewport: ViewportConfig,
    pub sun: SunConfig,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            earth_radius: 2.0,
            atmosphere_scale: 1.04,
            marker_altitude: 1.025,
            initial_marker: GeoCoordinate::new(14.098084306193016, -9.193757667977248),
            longitude_convention: LongitudeConvention::default(),
            tap_threshold_s: DEFAULT_TAP_THRESHOLD_S,
            recenter_camera_on_pick: true,
            spin_rate_rad_per_s: 0.0,
            max_pixel_ratio: 2.0,
            atmosphere_day_color: Color::from_rgb8(0x00, 0xaa, 0xff),
            atmosphere_twilight_color: Color::from_rgb8(0x9e, 0x3a, 0xc5),
            camera: CameraConfig::default(),
            viewport: ViewportConfig::default(),
            sun: SunConfig::default(),
        }
    }
}

impl GlobeConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        let cfg = Self::from_json_str(&text)?;
        info!(
            path = %path.display(),
            convention = cfg.longitude_convention.as_str(),
            "loaded globe config"
        );
        Ok(cfg)
    }

    /// File at `path` (or `$GLOBE_CONFIG`) if any, defaults otherwise, then
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var(CONFIG_PATH_ENV).ok();
        let mut cfg = match path.or(env_path.as_deref().map(Path::new)) {
            Some(p) => Self::from_path(p)?,
            None => Self::default(),
        };
        cfg.apply_overrides(|var| std::env::var(var).ok())?;
        Ok(cfg)
    }

    /// Applies `GLOBE_*` overrides looked up through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read_f64 = |var: &'static str| -> Result<Option<f64>, ConfigError> {
            match lookup(var) {
                None => Ok(None),
                Some(raw) => raw.trim().parse::<f64>().map(Some).map_err(|_| ConfigError::Env {
                    var,
                    value: raw.clone(),
                }),
            }
        };

        if let Some(v) = read_f64("GLOBE_RADIUS")? {
            self.earth_radius = v;
        }
        if let Some(v) = read_f64("GLOBE_MARKER_ALTITUDE")? {
            self.marker_altitude = v;
        }
        if let Some(v) = read_f64("GLOBE_TAP_THRESHOLD_S")? {
            self.tap_threshold_s = v;
        }
        if let Some(v) = read_f64("GLOBE_SPIN_RATE")? {
            self.spin_rate_rad_per_s = v;
        }
        if let Some(raw) = lookup("GLOBE_LONGITUDE_CONVENTION") {
            self.longitude_convention = raw.parse().map_err(|_| ConfigError::Env {
                var: "GLOBE_LONGITUDE_CONVENTION",
                value: raw.clone(),
            })?;
        }

        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> Result<(), ConfigError> {
            Err(ConfigError::Invalid {
                field,
                reason: reason.into(),
            })
        }

        if !(self.earth_radius.is_finite() && self.earth_radius > 0.0) {
            return invalid("earth_radius", "must be a positive number");
        }
        if !(self.atmosphere_scale.is_finite() && self.atmosphere_scale >= 1.0) {
            return invalid("atmosphere_scale", "must be at least 1");
        }
        if !(self.marker_altitude.is_finite() && self.marker_altitude > 0.0) {
            return invalid("marker_altitude", "must be a positive number");
        }
        if !(self.tap_threshold_s.is_finite() && self.tap_threshold_s >= 0.0) {
            return invalid("tap_threshold_s", "must be non-negative");
        }
        if !self.spin_rate_rad_per_s.is_finite() {
            return invalid("spin_rate_rad_per_s", "must be finite");
        }
        if !(self.max_pixel_ratio.is_finite() && self.max_pixel_ratio >= 1.0) {
            return invalid("max_pixel_ratio", "must be at least 1");
        }
        let cam = &self.camera;
        if !(cam.fov_y_deg > 0.0 && cam.fov_y_deg < 180.0) {
            return invalid("camera.fov_y_deg", "must be in (0, 180)");
        }
        if !(cam.near > 0.0 && cam.far > cam.near) {
            return invalid("camera.near/far", "need 0 < near < far");
        }
        if !cam.position.is_finite() {
            return invalid("camera.position", "must be finite");
        }
        let vp = &self.viewport;
        if !(vp.width.is_finite() && vp.width > 0.0 && vp.height.is_finite() && vp.height > 0.0) {
            return invalid("viewport", "width and height must be positive");
        }
        if cam.position.length() <= self.earth_radius {
            warn!(
                distance = cam.position.length(),
                radius = self.earth_radius,
                "camera starts inside the globe"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use foundation::math::LongitudeConvention;
    use pretty_assertions::assert_eq;

    use super::{ConfigError, GlobeConfig};

    #[test]
    fn empty_json_gives_defaults() {
        let cfg = GlobeConfig::from_json_str("{}").expect("config");
        assert_eq!(cfg, GlobeConfig::default());
        assert_eq!(cfg.atmosphere_day_color.to_hex(), "#00aaff");
        assert_eq!(cfg.atmosphere_twilight_color.to_hex(), "#9e3ac5");
    }

    #[test]
    fn partial_json_overrides_fields() {
        let cfg = GlobeConfig::from_json_str(
            r##"{
                "earth_radius": 1.0,
                "longitude_convention": "east_toward_positive_z",
                "atmosphere_day_color": "#112233",
                "camera": { "fov_y_deg": 40.0 }
            }"##,
        )
        .expect("config");

        assert_eq!(cfg.earth_radius, 1.0);
        assert_eq!(cfg.longitude_convention, LongitudeConvention::EastTowardPositiveZ);
        assert_eq!(cfg.atmosphere_day_color.to_hex(), "#112233");
        assert_eq!(cfg.camera.fov_y_deg, 40.0);
        assert_eq!(cfg.camera.near, 0.1);
        assert_eq!(cfg.tap_threshold_s, 0.2);
    }

    #[test]
    fn rejects_bad_values() {
        let err = GlobeConfig::from_json_str(r#"{ "earth_radius": -1.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "earth_radius", .. }));

        let err = GlobeConfig::from_json_str(r#"{ "atmosphere_day_color": "nope" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = GlobeConfig::from_json_str(r#"{ "viewport": { "width": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "viewport", .. }));

        let err = GlobeConfig::from_json_str("{").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn env_overrides_apply_and_validate() {
        let vars: HashMap<&str, &str> = [
            ("GLOBE_TAP_THRESHOLD_S", "0.35"),
            ("GLOBE_RADIUS", " 3 "),
            ("GLOBE_LONGITUDE_CONVENTION", "positive_z"),
        ]
        .into_iter()
        .collect();

        let mut cfg = GlobeConfig::default();
        cfg.apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .expect("overrides");
        assert_eq!(cfg.tap_threshold_s, 0.35);
        assert_eq!(cfg.earth_radius, 3.0);
        assert_eq!(cfg.longitude_convention, LongitudeConvention::EastTowardPositiveZ);

        let mut cfg = GlobeConfig::default();
        let err = cfg
            .apply_overrides(|k| (k == "GLOBE_MARKER_ALTITUDE").then(|| "high".to_string()))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Env {
                var: "GLOBE_MARKER_ALTITUDE",
                value: "high".to_string()
            }
        );
    }
}
