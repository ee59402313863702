use foundation::math::{Direction, Vec3};
use serde::Serialize;

use crate::picking::Ray;

/// A sphere that may spin about its own +Y axis.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f64,
    /// Spin about +Y, radians. Sphere-local directions rotate with it.
    pub rotation_y: f64,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f64) -> Self {
        Self {
            center,
            radius,
            rotation_y: 0.0,
        }
    }

    /// Nearest non-negative ray parameter where `ray` meets the surface.
    ///
    /// Rays always carry a unit direction, so the reduced quadratic applies.
    pub fn intersect(&self, ray: &Ray) -> Option<f64> {
        let oc = ray.origin() - self.center;
        let b = oc.dot(ray.dir());
        let c = oc.dot(oc) - self.radius * self.radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }

        let sq = disc.sqrt();
        let near = -b - sq;
        if near >= 0.0 {
            return Some(near);
        }
        let far = -b + sq;
        (far >= 0.0).then_some(far)
    }

    /// Sphere-local direction of a world-space point.
    pub fn local_direction(&self, world: Vec3) -> Option<Direction> {
        Direction::new((world - self.center).rotate_y(-self.rotation_y))
    }

    /// World-space point `radius_scale * radius` out along a sphere-local direction.
    pub fn surface_point(&self, direction: Direction, radius_scale: f64) -> Vec3 {
        self.center + direction.scaled(self.radius * radius_scale).rotate_y(self.rotation_y)
    }

    /// Same center and spin, radius multiplied by `scale`.
    pub fn scaled(&self, scale: f64) -> Self {
        Self {
            radius: self.radius * scale,
            ..*self
        }
    }
}

/// The earth sphere and the slightly larger atmosphere shell rendered
/// back-faced around it.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct GlobeBodies {
    pub earth: Sphere,
    pub atmosphere: Sphere,
    pub atmosphere_scale: f64,
}

impl GlobeBodies {
    pub fn new(radius: f64, atmosphere_scale: f64) -> Self {
        let earth = Sphere::new(Vec3::ZERO, radius);
        Self {
            earth,
            atmosphere: earth.scaled(atmosphere_scale),
            atmosphere_scale,
        }
    }

    pub fn set_rotation_y(&mut self, angle_rad: f64) {
        self.earth.rotation_y = angle_rad;
        self.atmosphere.rotation_y = angle_rad;
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use foundation::math::{Direction, Vec3};

    use super::{GlobeBodies, Sphere};
    use crate::picking::Ray;

    #[test]
    fn atmosphere_wraps_earth() {
        let bodies = GlobeBodies::new(2.0, 1.04);
        assert_eq!(bodies.earth.radius, 2.0);
        assert!((bodies.atmosphere.radius - 2.08).abs() < 1e-12);
        assert_eq!(bodies.atmosphere.center, bodies.earth.center);
    }

    #[test]
    fn tangent_ray_touches_once() {
        let s = Sphere::new(Vec3::ZERO, 1.0);
        let ray = Ray::new(Vec3::new(1.0, 0.0, 5.0), -Vec3::Z).expect("ray");
        let t = s.intersect(&ray).expect("tangent hit");
        assert!((t - 5.0).abs() < 1e-9);
    }

    #[test]
    fn sphere_behind_origin_is_not_hit() {
        let s = Sphere::new(Vec3::ZERO, 1.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z).expect("ray");
        assert_eq!(s.intersect(&ray), None);
    }

    #[test]
    fn spin_moves_surface_points_and_local_directions_together() {
        let mut bodies = GlobeBodies::new(2.0, 1.04);
        bodies.set_rotation_y(FRAC_PI_2);
        let earth = bodies.earth;

        let local = Direction::new(Vec3::Z).expect("dir");
        let world = earth.surface_point(local, 1.0);
        assert!(world.distance(Vec3::new(2.0, 0.0, 0.0)) < 1e-12);

        let back = earth.local_direction(world).expect("dir");
        assert!(back.as_vec3().distance(Vec3::Z) < 1e-12);
    }
}
