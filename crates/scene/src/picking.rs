use foundation::math::{Direction, GeoCoordinate, GeoProjector, Vec2, Vec3};
use serde::Serialize;
use tracing::debug;

use crate::prefabs::Sphere;

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Ray {
    origin: Vec3,
    /// Unit length; only [`Ray::new`] builds rays.
    dir: Vec3,
}

impl Ray {
    /// Returns `None` if `dir` has no usable direction.
    pub fn new(origin: Vec3, dir: Vec3) -> Option<Self> {
        Some(Self {
            origin,
            dir: dir.normalize()?,
        })
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn dir(&self) -> Vec3 {
        self.dir
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// Produces a world-space ray for a pointer position in normalized device
/// coordinates (each axis in [-1, 1], +y up).
pub trait RayCaster {
    fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray>;
}

/// Adapts a closure into a [`RayCaster`].
pub struct FnRayCaster<F>(pub F);

impl<F> RayCaster for FnRayCaster<F>
where
    F: Fn(Vec2) -> Option<Ray>,
{
    fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray> {
        (self.0)(ndc)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct PickResult {
    /// Sphere-local surface direction of the hit.
    pub direction: Direction,
    pub coordinate: GeoCoordinate,
    /// World-space intersection point.
    pub point: Vec3,
    /// Distance along the ray.
    pub distance: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickOptions {
    pub max_distance: f64,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            max_distance: 1.0e30,
        }
    }
}

/// Intersects `ray` with `globe` and converts the hit to a geographic coordinate.
///
/// Contract:
/// - A miss is `None`, never an error.
/// - The nearest intersection at or in front of the ray origin wins; a ray
///   starting inside the globe reports where it exits.
/// - Pure: nothing in the scene is touched.
pub fn pick_ray(
    globe: &Sphere,
    projector: &GeoProjector,
    ray: Ray,
    opts: PickOptions,
) -> Option<PickResult> {
    let Some(t) = globe.intersect(&ray).filter(|t| *t <= opts.max_distance) else {
        debug!(origin = ?ray.origin, dir = ?ray.dir, "pick missed globe");
        return None;
    };

    let point = ray.at(t);
    let direction = globe.local_direction(point)?;
    let coordinate = projector.to_geo_coordinate(direction);
    debug!(lat = coordinate.lat, lon = coordinate.lon, distance = t, "pick hit globe");

    Some(PickResult {
        direction,
        coordinate,
        point,
        distance: t,
    })
}

/// Pointer picking: the caller's ray caster maps NDC to a world ray.
pub fn pick<C>(
    globe: &Sphere,
    projector: &GeoProjector,
    pointer_ndc: Vec2,
    caster: &C,
    opts: PickOptions,
) -> Option<PickResult>
where
    C: RayCaster + ?Sized,
{
    let ray = caster.ray_from_ndc(pointer_ndc)?;
    pick_ray(globe, projector, ray, opts)
}
