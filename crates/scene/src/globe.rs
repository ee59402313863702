//! Globe scene state.
//!
//! One explicit struct owns everything the renderer reads each frame: globe
//! geometry, the marker, the sun, material uniforms, the camera and viewport.
//! Input callbacks take `&mut GlobeScene`; nothing here is global.

use std::f64::consts::PI;

use foundation::Color;
use foundation::math::{Direction, GeoCoordinate, GeoProjector, Spherical, Vec2, Vec3};
use foundation::time::Time;
use runtime::{Event, EventBus, Frame, GlobeEvent, TapDetector};
use serde::Serialize;
use tracing::{debug, warn};

use crate::camera::{PerspectiveCamera, ndc_from_pixels};
use crate::config::{ConfigError, GlobeConfig};
use crate::picking::{PickOptions, PickResult, pick};
use crate::prefabs::GlobeBodies;

/// Small cube floating above the last picked (or placed) coordinate.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub coordinate: GeoCoordinate,
    /// Sphere-local direction of `coordinate`.
    pub direction: Direction,
    /// World-space position.
    pub position: Vec3,
}

/// Directional light parameterized by debug-panel angles.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct SunLight {
    spherical: Spherical,
}

impl SunLight {
    /// Clamps to the slider ranges: phi in [0, pi], theta in [-pi, pi].
    pub fn new(phi: f64, theta: f64) -> Self {
        let mut sun = Self {
            spherical: Spherical::new(1.0, 0.0, 0.0),
        };
        sun.set_angles(phi, theta);
        sun
    }

    pub fn set_angles(&mut self, phi: f64, theta: f64) {
        let clamp = |v: f64, lo: f64, hi: f64, fallback: f64| {
            if v.is_nan() { fallback } else { v.clamp(lo, hi) }
        };
        self.spherical.phi = clamp(phi, 0.0, PI, self.spherical.phi);
        self.spherical.theta = clamp(theta, -PI, PI, self.spherical.theta);
    }

    pub fn phi(&self) -> f64 {
        self.spherical.phi
    }

    pub fn theta(&self) -> f64 {
        self.spherical.theta
    }

    /// Unit vector toward the sun.
    pub fn direction(&self) -> Vec3 {
        self.spherical.to_vec3()
    }
}

/// Values uploaded to one shader material.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Uniforms {
    pub sun_direction: Vec3,
    pub atmosphere_day_color: Color,
    pub atmosphere_twilight_color: Color,
}

/// The earth and atmosphere materials read the same sun and colors; every
/// setter writes both.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Materials {
    pub earth: Uniforms,
    pub atmosphere: Uniforms,
}

impl Materials {
    fn new(uniforms: Uniforms) -> Self {
        Self {
            earth: uniforms,
            atmosphere: uniforms,
        }
    }

    fn set_sun_direction(&mut self, dir: Vec3) {
        self.earth.sun_direction = dir;
        self.atmosphere.sun_direction = dir;
    }

    fn set_colors(&mut self, day: Color, twilight: Color) {
        for u in [&mut self.earth, &mut self.atmosphere] {
            u.atmosphere_day_color = day;
            u.atmosphere_twilight_color = twilight;
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// Device pixel ratio, capped.
    pub pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64, max_pixel_ratio: f64) -> Self {
        let ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
            pixel_ratio: ratio.min(max_pixel_ratio),
        }
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    pub fn to_ndc(&self, x_px: f64, y_px: f64) -> Vec2 {
        ndc_from_pixels(x_px, y_px, self.width, self.height)
    }
}

pub struct GlobeScene {
    config: GlobeConfig,
    projector: GeoProjector,
    bodies: GlobeBodies,
    camera: PerspectiveCamera,
    marker: Marker,
    sun: SunLight,
    materials: Materials,
    viewport: Viewport,
    tap: TapDetector,
    bus: EventBus,
}

impl GlobeScene {
    pub fn new(config: GlobeConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let projector = GeoProjector::new(config.longitude_convention);
        let bodies = GlobeBodies::new(config.earth_radius, config.atmosphere_scale);
        let viewport = Viewport::new(
            config.viewport.width,
            config.viewport.height,
            config.viewport.device_pixel_ratio,
            config.max_pixel_ratio,
        );
        let camera = PerspectiveCamera {
            position: config.camera.position,
            target: bodies.earth.center,
            up: Vec3::Y,
            fov_y_deg: config.camera.fov_y_deg,
            aspect: viewport.aspect(),
            near: config.camera.near,
            far: config.camera.far,
        };

        let sun = SunLight::new(config.sun.phi, config.sun.theta);
        let materials = Materials::new(Uniforms {
            sun_direction: sun.direction(),
            atmosphere_day_color: config.atmosphere_day_color,
            atmosphere_twilight_color: config.atmosphere_twilight_color,
        });

        let marker_dir = projector.to_direction(config.initial_marker);
        let marker = Marker {
            coordinate: config.initial_marker,
            direction: marker_dir,
            position: bodies.earth.surface_point(marker_dir, config.marker_altitude),
        };

        Ok(Self {
            tap: TapDetector::new(config.tap_threshold_s),
            config,
            projector,
            bodies,
            camera,
            marker,
            sun,
            materials,
            viewport,
            bus: EventBus::new(),
        })
    }

    pub fn config(&self) -> &GlobeConfig {
        &self.config
    }

    pub fn projector(&self) -> &GeoProjector {
        &self.projector
    }

    pub fn bodies(&self) -> &GlobeBodies {
        &self.bodies
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    /// For orbit controls owned by the host.
    pub fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }

    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    pub fn sun(&self) -> &SunLight {
        &self.sun
    }

    /// Where the debug sun sphere is drawn.
    pub fn sun_marker_position(&self) -> Vec3 {
        self.bodies.earth.center + self.sun.direction() * self.config.sun.marker_distance
    }

    pub fn materials(&self) -> &Materials {
        &self.materials
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn events(&self) -> &[Event] {
        self.bus.events()
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.bus.drain()
    }

    pub fn resize(&mut self, width: f64, height: f64, device_pixel_ratio: f64) {
        self.viewport = Viewport::new(width, height, device_pixel_ratio, self.config.max_pixel_ratio);
        self.camera.set_aspect(self.viewport.aspect());
        self.bus.emit(GlobeEvent::Resized {
            width: self.viewport.width,
            height: self.viewport.height,
            pixel_ratio: self.viewport.pixel_ratio,
        });
    }

    pub fn set_sun_angles(&mut self, phi: f64, theta: f64) {
        self.sun.set_angles(phi, theta);
        let direction = self.sun.direction();
        self.materials.set_sun_direction(direction);
        self.bus.emit(GlobeEvent::SunMoved { direction });
    }

    pub fn set_atmosphere_day_color(&mut self, color: Color) {
        let twilight = self.materials.earth.atmosphere_twilight_color;
        self.set_colors(color, twilight);
    }

    pub fn set_atmosphere_twilight_color(&mut self, color: Color) {
        let day = self.materials.earth.atmosphere_day_color;
        self.set_colors(day, color);
    }

    fn set_colors(&mut self, day: Color, twilight: Color) {
        self.materials.set_colors(day, twilight);
        self.bus.emit(GlobeEvent::ColorsChanged { day, twilight });
    }

    /// Moves the marker to `coord` (normalized first).
    pub fn place_marker(&mut self, coord: GeoCoordinate) {
        let coordinate = coord.normalized();
        if !coordinate.lat.is_finite() || !coordinate.lon.is_finite() {
            warn!(?coord, "ignoring non-finite marker coordinate");
            return;
        }
        let direction = self.projector.to_direction(coordinate);
        self.move_marker(coordinate, direction);
    }

    fn move_marker(&mut self, coordinate: GeoCoordinate, direction: Direction) {
        let position = self
            .bodies
            .earth
            .surface_point(direction, self.config.marker_altitude);
        self.marker = Marker {
            coordinate,
            direction,
            position,
        };
        self.bus.emit(GlobeEvent::MarkerMoved {
            coordinate,
            position,
        });
    }

    /// Pure pick against the earth; the scene is left untouched.
    pub fn pick(&self, ndc: Vec2) -> Option<PickResult> {
        pick(
            &self.bodies.earth,
            &self.projector,
            ndc,
            &self.camera,
            PickOptions {
                max_distance: self.camera.far,
            },
        )
    }

    /// Click handling: pick, move the marker there, and swing the camera
    /// round to face it from the same distance.
    pub fn handle_click(&mut self, ndc: Vec2) -> Option<PickResult> {
        let Some(hit) = self.pick(ndc) else {
            self.bus.emit(GlobeEvent::Missed);
            return None;
        };

        self.bus.emit(GlobeEvent::Picked {
            coordinate: hit.coordinate,
            point: hit.point,
        });
        self.move_marker(hit.coordinate, hit.direction);

        if self.config.recenter_camera_on_pick {
            let center = self.bodies.earth.center;
            if let Some(world_dir) = Direction::new(self.marker.position - center) {
                self.camera.orbit_to(center, world_dir);
                self.bus.emit(GlobeEvent::CameraMoved {
                    position: self.camera.position,
                });
            }
        }

        Some(hit)
    }

    pub fn pointer_down(&mut self, at: Time) {
        self.tap.press(at);
    }

    /// Treats the release as a click only if the press was short; longer
    /// presses were camera drags.
    pub fn pointer_up(&mut self, at: Time, ndc: Vec2) -> Option<PickResult> {
        let outcome = self.tap.release(at);
        if !outcome.is_tap() {
            debug!(?outcome, "pointer release is not a click");
            return None;
        }
        self.handle_click(ndc)
    }

    /// [`GlobeScene::pointer_up`] with a pixel position in the current viewport.
    pub fn pointer_up_px(&mut self, at: Time, x_px: f64, y_px: f64) -> Option<PickResult> {
        let ndc = self.viewport.to_ndc(x_px, y_px);
        self.pointer_up(at, ndc)
    }

    pub fn is_pointer_down(&self) -> bool {
        self.tap.is_pressed()
    }

    pub fn pointer_cancel(&mut self) {
        self.tap.cancel();
    }

    /// Per-frame update.
    pub fn tick(&mut self, frame: Frame) {
        self.bus.begin_frame(frame);

        let rate = self.config.spin_rate_rad_per_s;
        if rate != 0.0 {
            let angle = (rate * frame.time.seconds()).rem_euclid(2.0 * PI);
            self.bodies.set_rotation_y(angle);
            // Keep the marker glued to its coordinate as the earth turns.
            self.marker.position = self
                .bodies
                .earth
                .surface_point(self.marker.direction, self.config.marker_altitude);
        }
    }
}
