use foundation::math::{Vec2, Vec3, WGS84_A, WGS84_B};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// Axis-aligned ellipsoid centered at the origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ellipsoid {
    pub radii: Vec3,
}

impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid {
        radii: Vec3 {
            x: WGS84_A,
            y: WGS84_A,
            z: WGS84_B,
        },
    };

    /// First intersection at or in front of the ray origin.
    pub fn intersect(&self, ray: &Ray) -> Option<Vec3> {
        let r = self.radii;
        if r.x <= 0.0 || r.y <= 0.0 || r.z <= 0.0 {
            return None;
        }
        // Scale into unit-sphere space.
        let o = Vec3::new(ray.origin.x / r.x, ray.origin.y / r.y, ray.origin.z / r.z);
        let d = Vec3::new(ray.dir.x / r.x, ray.dir.y / r.y, ray.dir.z / r.z);

        let a = d.dot(d);
        if a == 0.0 {
            return None;
        }
        let b = 2.0 * o.dot(d);
        let c = o.dot(o) - 1.0;
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }
        let sq = disc.sqrt();
        let t0 = (-b - sq) / (2.0 * a);
        let t1 = (-b + sq) / (2.0 * a);
        let t = if t0 >= 0.0 {
            t0
        } else if t1 >= 0.0 {
            t1
        } else {
            return None;
        };
        let hit = ray.at(t);
        hit.is_finite().then_some(hit)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PickSource {
    Object,
    Terrain,
    Ellipsoid,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickedPosition {
    pub position: Vec3,
    pub source: PickSource,
}

/// Screen-to-world queries of a globe renderer.
pub trait Picker {
    /// Surface position of a rendered object under `screen`.
    fn pick_object_position(&mut self, screen: Vec2) -> Option<Vec3>;

    fn pick_ray(&self, screen: Vec2) -> Option<Ray>;

    fn pick_terrain(&mut self, ray: &Ray) -> Option<Vec3>;

    fn pick_ellipsoid(&mut self, screen: Vec2) -> Option<Vec3> {
        let ray = self.pick_ray(screen)?;
        Ellipsoid::WGS84.intersect(&ray)
    }
}

/// Object hit, then terrain ray cast, then the bare ellipsoid.
///
/// A screen position that produces no ray yields `None` without trying the
/// ellipsoid.
pub fn resolve_pick<P: Picker + ?Sized>(picker: &mut P, screen: Vec2) -> Option<PickedPosition> {
    if let Some(position) = picker.pick_object_position(screen) {
        return Some(PickedPosition {
            position,
            source: PickSource::Object,
        });
    }
    let ray = picker.pick_ray(screen)?;
    if let Some(position) = picker.pick_terrain(&ray) {
        return Some(PickedPosition {
            position,
            source: PickSource::Terrain,
        });
    }
    picker.pick_ellipsoid(screen).map(|position| PickedPosition {
        position,
        source: PickSource::Ellipsoid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "expected {a} ~= {b}");
    }

    #[test]
    fn ray_from_space_hits_equator() {
        let ray = Ray::new(Vec3::new(WGS84_A * 2.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
        let hit = Ellipsoid::WGS84.intersect(&ray).unwrap();
        assert_close(hit.x, WGS84_A, 1e-6);
        assert_close(hit.y, 0.0, 1e-9);
    }

    #[test]
    fn ray_from_space_hits_pole_at_minor_axis() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, WGS84_A * 3.0), Vec3::new(0.0, 0.0, -2.0));
        let hit = Ellipsoid::WGS84.intersect(&ray).unwrap();
        assert_close(hit.z, WGS84_B, 1e-6);
    }

    #[test]
    fn ray_pointing_away_misses() {
        let ray = Ray::new(Vec3::new(WGS84_A * 2.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(Ellipsoid::WGS84.intersect(&ray), None);
        let grazing = Ray::new(Vec3::new(WGS84_A * 2.0, WGS84_A * 2.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(Ellipsoid::WGS84.intersect(&grazing), None);
    }

    struct Scripted {
        object: Option<Vec3>,
        ray: Option<Ray>,
        terrain: Option<Vec3>,
        ellipsoid_calls: usize,
    }

    impl Picker for Scripted {
        fn pick_object_position(&mut self, _screen: Vec2) -> Option<Vec3> {
            self.object
        }

        fn pick_ray(&self, _screen: Vec2) -> Option<Ray> {
            self.ray
        }

        fn pick_terrain(&mut self, _ray: &Ray) -> Option<Vec3> {
            self.terrain
        }

        fn pick_ellipsoid(&mut self, _screen: Vec2) -> Option<Vec3> {
            self.ellipsoid_calls += 1;
            Some(Vec3::new(9.0, 9.0, 9.0))
        }
    }

    #[test]
    fn resolution_order_is_object_terrain_ellipsoid() {
        let ray = Some(Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)));
        let mut p = Scripted {
            object: Some(Vec3::new(1.0, 0.0, 0.0)),
            ray,
            terrain: Some(Vec3::new(2.0, 0.0, 0.0)),
            ellipsoid_calls: 0,
        };
        let screen = Vec2::new(5.0, 5.0);
        assert_eq!(resolve_pick(&mut p, screen).map(|h| h.source), Some(PickSource::Object));

        p.object = None;
        let hit = resolve_pick(&mut p, screen).unwrap();
        assert_eq!(hit.source, PickSource::Terrain);
        assert_eq!(hit.position, Vec3::new(2.0, 0.0, 0.0));

        p.terrain = None;
        assert_eq!(resolve_pick(&mut p, screen).map(|h| h.source), Some(PickSource::Ellipsoid));
    }

    #[test]
    fn missing_ray_aborts_before_ellipsoid() {
        let mut p = Scripted {
            object: None,
            ray: None,
            terrain: None,
            ellipsoid_calls: 0,
        };
        assert_eq!(resolve_pick(&mut p, Vec2::new(0.0, 0.0)), None);
        assert_eq!(p.ellipsoid_calls, 0);
    }
}
