//! In-memory renderers for driving controllers without a browser.

use foundation::math::{Mat4, Vec2, Vec3};
use foundation::time::Time;

use crate::camera::{GlobeCamera, PointCloudCamera, PointCloudView};
use crate::descriptor::EntityDescriptor;
use crate::entity::EntityId;
use crate::input::{DefaultInputActions, KeyPress, KeyboardSink};
use crate::picking::{Picker, Ray};
use crate::point_cloud::{ControlsMode, InsertionParams, NativeMeasuringTool, NavigationControls};
use crate::viewer::{FrameUpdate, Render};
use crate::world::{EntityStore, World};

const SCREEN_EPS: f64 = 1e-9;

#[derive(Debug)]
pub struct HeadlessGlobe {
    pub position: Vec3,
    pub direction: Vec3,
    pub up: Vec3,
    pub fov_rad: f64,
    pub viewport: Vec2,
    pub world: World,
    pub object_hits: Vec<(Vec2, Vec3)>,
    pub terrain_hits: Vec<(Vec2, Vec3)>,
    pub double_click_enabled: bool,
    saved_double_click: Option<bool>,
    pub render_count: usize,
}

impl Default for HeadlessGlobe {
    fn default() -> Self {
        Self {
            position: Vec3::new(20_000_000.0, 0.0, 0.0),
            direction: Vec3::new(-1.0, 0.0, 0.0),
            up: Vec3::new(0.0, 0.0, 1.0),
            fov_rad: 60f64.to_radians(),
            viewport: Vec2::new(800.0, 600.0),
            world: World::new(),
            object_hits: Vec::new(),
            terrain_hits: Vec::new(),
            double_click_enabled: true,
            saved_double_click: None,
            render_count: 0,
        }
    }
}

impl HeadlessGlobe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes a click at `screen` land on a rendered object at `position`.
    pub fn place_object(&mut self, screen: Vec2, position: Vec3) {
        self.object_hits.push((screen, position));
    }

    pub fn place_terrain(&mut self, screen: Vec2, position: Vec3) {
        self.terrain_hits.push((screen, position));
    }

    fn aspect(&self) -> f64 {
        if self.viewport.y > 0.0 {
            self.viewport.x / self.viewport.y
        } else {
            1.0
        }
    }
}

fn same_screen(a: Vec2, b: Vec2) -> bool {
    (a.x - b.x).abs() <= SCREEN_EPS && (a.y - b.y).abs() <= SCREEN_EPS
}

impl GlobeCamera for HeadlessGlobe {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn direction(&self) -> Vec3 {
        self.direction
    }

    fn up(&self) -> Vec3 {
        self.up
    }

    fn set_view(&mut self, position: Vec3, direction: Vec3, up: Vec3) {
        self.position = position;
        self.direction = direction;
        self.up = up;
    }

    fn fov(&self) -> f64 {
        self.fov_rad
    }

    fn set_fov(&mut self, fov_rad: f64) {
        self.fov_rad = fov_rad;
    }
}

impl EntityStore for HeadlessGlobe {
    fn add(&mut self, descriptor: EntityDescriptor) -> EntityId {
        self.world.add(descriptor)
    }

    fn remove(&mut self, id: EntityId) -> bool {
        self.world.remove(id)
    }

    fn contains(&self, id: EntityId) -> bool {
        self.world.contains(id)
    }
}

impl Picker for HeadlessGlobe {
    fn pick_object_position(&mut self, screen: Vec2) -> Option<Vec3> {
        self.object_hits
            .iter()
            .find(|(s, _)| same_screen(*s, screen))
            .map(|(_, p)| *p)
    }

    /// Pinhole ray; the field of view spans the larger viewport dimension.
    fn pick_ray(&self, screen: Vec2) -> Option<Ray> {
        if self.viewport.x <= 0.0 || self.viewport.y <= 0.0 {
            return None;
        }
        let aspect = self.aspect();
        let fovy = if aspect <= 1.0 {
            self.fov_rad
        } else {
            ((self.fov_rad * 0.5).tan() / aspect).atan() * 2.0
        };
        let tan_y = (fovy * 0.5).tan();
        let tan_x = tan_y * aspect;

        let ndc_x = 2.0 * screen.x / self.viewport.x - 1.0;
        let ndc_y = 1.0 - 2.0 * screen.y / self.viewport.y;
        let dir = self.direction + self.right() * (ndc_x * tan_x) + self.up * (ndc_y * tan_y);
        Some(Ray::new(self.position, dir.normalize()?))
    }

    fn pick_terrain(&mut self, ray: &Ray) -> Option<Vec3> {
        self.terrain_hits.iter().find_map(|(screen, position)| {
            let expected = self.pick_ray(*screen)?;
            (expected.dir.distance(ray.dir) <= SCREEN_EPS && expected.origin == ray.origin)
                .then_some(*position)
        })
    }
}

impl DefaultInputActions for HeadlessGlobe {
    fn suppress_default_double_click(&mut self) {
        if self.saved_double_click.is_none() {
            self.saved_double_click = Some(self.double_click_enabled);
        }
        self.double_click_enabled = false;
    }

    fn restore_default_double_click(&mut self) {
        if let Some(saved) = self.saved_double_click.take() {
            self.double_click_enabled = saved;
        }
    }
}

impl Render for HeadlessGlobe {
    fn render(&mut self) {
        self.render_count += 1;
    }
}

/// Orbit-style point-cloud viewer in a z-up local frame.
#[derive(Debug)]
pub struct HeadlessPointCloud {
    pub position: Vec3,
    pub direction: Vec3,
    pub radius: f64,
    pub fov_deg: f64,
    pub aspect: f64,
    pub controls: ControlsMode,
    pub update_count: usize,
    pub render_count: usize,
    pub last_update: Option<(f64, Time)>,
    pub insertions: Vec<InsertionParams>,
    pub remove_all_count: usize,
    pub dispatched_keys: Vec<KeyPress>,
    /// Cleared to simulate an engine that reports no camera matrix.
    pub matrix_available: bool,
}

impl Default for HeadlessPointCloud {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, -100.0, 50.0),
            direction: Vec3::new(0.0, 1.0, 0.0),
            radius: 100.0,
            fov_deg: 60.0,
            aspect: 16.0 / 9.0,
            controls: ControlsMode::Earth,
            update_count: 0,
            render_count: 0,
            last_update: None,
            insertions: Vec::new(),
            remove_all_count: 0,
            dispatched_keys: Vec::new(),
            matrix_available: true,
        }
    }
}

impl HeadlessPointCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        let offset = target - position;
        Self {
            position,
            direction: offset.normalize().unwrap_or(Vec3::new(0.0, 1.0, 0.0)),
            radius: offset.length(),
            ..Self::default()
        }
    }
}

impl PointCloudCamera for HeadlessPointCloud {
    fn world_matrix(&self) -> Option<Mat4> {
        if !self.matrix_available {
            return None;
        }
        let world_up = Vec3::new(0.0, 0.0, 1.0);
        let back = -self.direction;
        let right = world_up
            .cross(back)
            .normalize()
            .unwrap_or(Vec3::new(1.0, 0.0, 0.0));
        let up = back.cross(right);
        Some(Mat4::from_basis(right, up, back, self.position))
    }

    fn fov_deg(&self) -> f64 {
        self.fov_deg
    }

    fn aspect(&self) -> f64 {
        self.aspect
    }
}

impl PointCloudView for HeadlessPointCloud {
    fn view_position(&self) -> Vec3 {
        self.position
    }

    fn set_view_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn set_view_direction(&mut self, direction: Vec3) {
        if let Some(d) = direction.normalize() {
            self.direction = d;
        }
    }

    fn pivot(&self) -> Vec3 {
        self.position + self.direction * self.radius
    }
}

impl NavigationControls for HeadlessPointCloud {
    fn controls(&self) -> ControlsMode {
        self.controls
    }

    fn set_controls(&mut self, mode: ControlsMode) {
        self.controls = mode;
    }
}

impl FrameUpdate for HeadlessPointCloud {
    fn update(&mut self, dt_s: f64, timestamp: Time) {
        self.update_count += 1;
        self.last_update = Some((dt_s, timestamp));
    }
}

impl Render for HeadlessPointCloud {
    fn render(&mut self) {
        self.render_count += 1;
    }
}

impl NativeMeasuringTool for HeadlessPointCloud {
    fn start_insertion(&mut self, params: &InsertionParams) {
        self.insertions.push(params.clone());
    }

    fn remove_all_measurements(&mut self) {
        self.remove_all_count += 1;
    }
}

impl KeyboardSink for HeadlessPointCloud {
    fn dispatch_key_down(&mut self, key: KeyPress) {
        self.dispatched_keys.push(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picking::{PickSource, resolve_pick};
    use foundation::math::WGS84_A;

    fn assert_close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "expected {a} ~= {b}");
    }

    #[test]
    fn center_ray_hits_ellipsoid_below_camera() {
        let mut globe = HeadlessGlobe::new();
        let hit = resolve_pick(&mut globe, Vec2::new(400.0, 300.0)).unwrap();
        assert_eq!(hit.source, PickSource::Ellipsoid);
        assert_close(hit.position.x, WGS84_A, 1e-3);
    }

    #[test]
    fn terrain_hit_is_matched_by_ray() {
        let mut globe = HeadlessGlobe::new();
        let screen = Vec2::new(410.0, 290.0);
        globe.place_terrain(screen, Vec3::new(1.0, 2.0, 3.0));
        let hit = resolve_pick(&mut globe, screen).unwrap();
        assert_eq!(hit.source, PickSource::Terrain);
        assert_eq!(hit.position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn double_click_restores_what_was_saved() {
        let mut globe = HeadlessGlobe::new();
        globe.suppress_default_double_click();
        globe.suppress_default_double_click();
        assert!(!globe.double_click_enabled);
        globe.restore_default_double_click();
        assert!(globe.double_click_enabled);
        globe.double_click_enabled = false;
        globe.restore_default_double_click();
        assert!(!globe.double_click_enabled);
    }

    #[test]
    fn point_cloud_matrix_columns_follow_view() {
        let pc = HeadlessPointCloud::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 50.0, 10.0));
        let m = pc.world_matrix().unwrap();
        assert_eq!(m.translation(), Vec3::new(0.0, 0.0, 10.0));
        // Back axis opposes the view direction.
        assert_close(m.column3(2).y, -1.0, 1e-12);
        assert_close(m.column3(1).z, 1.0, 1e-12);
        assert_close(m.column3(0).x, 1.0, 1e-12);
        assert_eq!(pc.pivot(), Vec3::new(0.0, 50.0, 10.0));
    }
}
