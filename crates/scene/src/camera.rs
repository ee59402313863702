use foundation::math::{Direction, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::picking::{Ray, RayCaster};

/// Pinhole camera looking at `target`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view, degrees.
    pub fov_y_deg: f64,
    /// Width / height.
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(12.0, 5.0, 4.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_deg: 25.0,
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl PerspectiveCamera {
    pub fn set_aspect(&mut self, aspect: f64) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn distance_to(&self, point: Vec3) -> f64 {
        self.position.distance(point)
    }

    /// Orthonormal (right, up, forward) basis, or `None` if the camera sits on its target.
    pub fn basis(&self) -> Option<(Vec3, Vec3, Vec3)> {
        let forward = (self.target - self.position).normalize()?;
        // Looking straight along `up` leaves the roll undefined; borrow +Z.
        let right = forward
            .cross(self.up)
            .normalize()
            .or_else(|| forward.cross(Vec3::Z).normalize())?;
        let up = right.cross(forward);
        Some((right, up, forward))
    }

    /// Moves the camera onto the ray from `center` through `direction`, keeping
    /// its current distance from `center`, and looks back at `center`.
    ///
    /// `direction` is in world orientation.
    pub fn orbit_to(&mut self, center: Vec3, direction: Direction) {
        let distance = self.distance_to(center);
        if distance > 0.0 {
            self.position = center + direction.scaled(distance);
        }
        self.target = center;
    }
}

impl RayCaster for PerspectiveCamera {
    fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray> {
        let (right, up, forward) = self.basis()?;
        let tan_half = (self.fov_y_deg.to_radians() * 0.5).tan();
        let dir = forward + right * (ndc.x * tan_half * self.aspect) + up * (ndc.y * tan_half);
        Ray::new(self.position, dir)
    }
}

/// Pixel position (origin top-left, +y down) to NDC (+y up).
pub fn ndc_from_pixels(x_px: f64, y_px: f64, width: f64, height: f64) -> Vec2 {
    let w = width.max(1.0);
    let h = height.max(1.0);
    Vec2::new(x_px / w * 2.0 - 1.0, -(y_px / h) * 2.0 + 1.0)
}

#[cfg(test)]
mod tests {
    use foundation::math::{Direction, Vec2, Vec3};

    use super::{PerspectiveCamera, ndc_from_pixels};
    use crate::picking::RayCaster;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn center_ray_points_at_target() {
        let cam = PerspectiveCamera::default();
        let ray = cam.ray_from_ndc(Vec2::new(0.0, 0.0)).expect("ray");
        assert_eq!(ray.origin(), cam.position);
        let expected = (cam.target - cam.position).normalize().expect("dir");
        assert!(ray.dir().distance(expected) < 1e-12);
    }

    #[test]
    fn edge_rays_span_the_field_of_view() {
        let cam = PerspectiveCamera {
            position: Vec3::new(0.0, 0.0, 10.0),
            fov_y_deg: 90.0,
            aspect: 2.0,
            ..PerspectiveCamera::default()
        };
        let top = cam.ray_from_ndc(Vec2::new(0.0, 1.0)).expect("ray");
        // 45 degrees up from -Z.
        assert_close(top.dir().y, top.dir().z.abs(), 1e-12);
        assert!(top.dir().y > 0.0);

        let right = cam.ray_from_ndc(Vec2::new(1.0, 0.0)).expect("ray");
        assert_close(right.dir().x / right.dir().z.abs(), 2.0, 1e-12);
    }

    #[test]
    fn looking_straight_down_still_casts() {
        let cam = PerspectiveCamera {
            position: Vec3::new(0.0, 10.0, 0.0),
            ..PerspectiveCamera::default()
        };
        let ray = cam.ray_from_ndc(Vec2::new(0.3, -0.2)).expect("ray");
        assert!(ray.dir().y < 0.0);

        let degenerate = PerspectiveCamera {
            position: Vec3::ZERO,
            ..PerspectiveCamera::default()
        };
        assert!(degenerate.ray_from_ndc(Vec2::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn orbit_preserves_distance() {
        let mut cam = PerspectiveCamera::default();
        let before = cam.distance_to(Vec3::ZERO);
        let dir = Direction::new(Vec3::new(0.0, 0.0, 1.0)).expect("dir");
        cam.orbit_to(Vec3::ZERO, dir);
        assert_close(cam.distance_to(Vec3::ZERO), before, 1e-12);
        assert!(cam.position.distance(Vec3::new(0.0, 0.0, before)) < 1e-12);
        assert_eq!(cam.target, Vec3::ZERO);
    }

    #[test]
    fn pixels_map_to_ndc() {
        assert_eq!(ndc_from_pixels(0.0, 0.0, 800.0, 600.0), Vec2::new(-1.0, 1.0));
        assert_eq!(ndc_from_pixels(800.0, 600.0, 800.0, 600.0), Vec2::new(1.0, -1.0));
        assert_eq!(ndc_from_pixels(400.0, 300.0, 800.0, 600.0), Vec2::new(0.0, 0.0));
    }
}
