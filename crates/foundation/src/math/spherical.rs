use serde::{Deserialize, Serialize};

use super::Vec3;

/// Spherical coordinates in a Y-up frame.
///
/// `phi` is the polar angle from +Y, `theta` the azimuth from +Z toward +X.
/// Used for light directions driven by angle sliders.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spherical {
    pub radius: f64,
    pub phi: f64,
    pub theta: f64,
}

impl Default for Spherical {
    fn default() -> Self {
        Self {
            radius: 1.0,
            phi: 0.0,
            theta: 0.0,
        }
    }
}

impl Spherical {
    pub fn new(radius: f64, phi: f64, theta: f64) -> Self {
        Self { radius, phi, theta }
    }

    pub fn to_vec3(self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        let r = self.radius;
        Vec3::new(r * sin_phi * sin_theta, r * cos_phi, r * sin_phi * cos_theta)
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use super::Spherical;
    use crate::math::Vec3;

    fn assert_vec_close(a: Vec3, b: Vec3, eps: f64) {
        let d = a.distance(b);
        assert!(d <= eps, "expected {a:?} ~= {b:?} (dist {d})");
    }

    #[test]
    fn equatorial_azimuth_zero_points_at_positive_z() {
        let v = Spherical::new(1.0, FRAC_PI_2, 0.0).to_vec3();
        assert_vec_close(v, Vec3::Z, 1e-12);

        let v = Spherical::new(2.0, FRAC_PI_2, FRAC_PI_2).to_vec3();
        assert_vec_close(v, Vec3::new(2.0, 0.0, 0.0), 1e-12);
    }

    #[test]
    fn polar_angle_zero_is_up() {
        let v = Spherical::new(3.0, 0.0, 1.234).to_vec3();
        assert_vec_close(v, Vec3::new(0.0, 3.0, 0.0), 1e-12);
        let v = Spherical::new(1.0, PI, 0.0).to_vec3();
        assert_vec_close(v, Vec3::new(0.0, -1.0, 0.0), 1e-12);
    }
}
