//! Page-side engine adapters.
//!
//! The page wraps each renderer in a small JS object exposing the methods
//! declared below. Vectors cross the boundary as number arrays, entity
//! descriptors as JSON.

use foundation::math::{Mat4, Vec2, Vec3};
use foundation::time::Time;
use js_sys::Float64Array;
use scene::{
    ControlsMode, DefaultInputActions, EntityDescriptor, EntityId, EntityStore, FrameUpdate, GlobeCamera,
    InsertionParams, KeyPress, KeyboardSink, NativeMeasuringTool, NavigationControls, Picker,
    PointCloudCamera, PointCloudView, Ray, Render, World,
};
use serde_json::json;
use tracing::warn;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// Globe engine adapter.
    pub type GlobeHost;

    #[wasm_bindgen(method, js_name = cameraPosition)]
    fn camera_position(this: &GlobeHost) -> JsValue;
    #[wasm_bindgen(method, js_name = cameraDirection)]
    fn camera_direction(this: &GlobeHost) -> JsValue;
    #[wasm_bindgen(method, js_name = cameraUp)]
    fn camera_up(this: &GlobeHost) -> JsValue;
    #[wasm_bindgen(method, js_name = setView)]
    fn set_view(this: &GlobeHost, position: &[f64], direction: &[f64], up: &[f64]);
    #[wasm_bindgen(method)]
    fn fov(this: &GlobeHost) -> f64;
    #[wasm_bindgen(method, js_name = setFov)]
    fn set_fov(this: &GlobeHost, fov_rad: f64);

    #[wasm_bindgen(method, js_name = addEntity)]
    fn add_entity(this: &GlobeHost, key: &str, descriptor_json: &str);
    #[wasm_bindgen(method, js_name = removeEntity)]
    fn remove_entity(this: &GlobeHost, key: &str);

    #[wasm_bindgen(method, js_name = pickPosition)]
    fn pick_position(this: &GlobeHost, x: f64, y: f64) -> JsValue;
    #[wasm_bindgen(method, js_name = pickRay)]
    fn pick_ray(this: &GlobeHost, x: f64, y: f64) -> JsValue;
    #[wasm_bindgen(method, js_name = pickTerrain)]
    fn pick_terrain(this: &GlobeHost, ray: &[f64]) -> JsValue;
    #[wasm_bindgen(method, js_name = pickEllipsoid)]
    fn pick_ellipsoid(this: &GlobeHost, x: f64, y: f64) -> JsValue;

    #[wasm_bindgen(method, js_name = suppressDoubleClick)]
    fn suppress_double_click(this: &GlobeHost);
    #[wasm_bindgen(method, js_name = restoreDoubleClick)]
    fn restore_double_click(this: &GlobeHost);

    #[wasm_bindgen(method)]
    fn render(this: &GlobeHost);
}

#[wasm_bindgen]
extern "C" {
    /// Point-cloud engine adapter.
    pub type PointCloudHost;

    /// Column-major camera-to-world matrix, 16 numbers.
    #[wasm_bindgen(method, js_name = cameraMatrix)]
    fn camera_matrix(this: &PointCloudHost) -> JsValue;
    #[wasm_bindgen(method)]
    fn fov(this: &PointCloudHost) -> f64;
    #[wasm_bindgen(method)]
    fn aspect(this: &PointCloudHost) -> f64;

    #[wasm_bindgen(method, js_name = viewPosition)]
    fn view_position(this: &PointCloudHost) -> JsValue;
    #[wasm_bindgen(method, js_name = setViewPosition)]
    fn set_view_position(this: &PointCloudHost, position: &[f64]);
    #[wasm_bindgen(method, js_name = setViewDirection)]
    fn set_view_direction(this: &PointCloudHost, direction: &[f64]);
    #[wasm_bindgen(method)]
    fn pivot(this: &PointCloudHost) -> JsValue;

    #[wasm_bindgen(method)]
    fn controls(this: &PointCloudHost) -> String;
    #[wasm_bindgen(method, js_name = setControls)]
    fn set_controls(this: &PointCloudHost, mode: &str);

    #[wasm_bindgen(method)]
    fn update(this: &PointCloudHost, dt_s: f64, timestamp_ms: f64);
    #[wasm_bindgen(method)]
    fn render(this: &PointCloudHost);

    #[wasm_bindgen(method, js_name = startInsertion)]
    fn start_insertion(this: &PointCloudHost, params_json: &str);
    #[wasm_bindgen(method, js_name = removeAllMeasurements)]
    fn remove_all_measurements(this: &PointCloudHost);
    #[wasm_bindgen(method, js_name = dispatchKeyDown)]
    fn dispatch_key_down(this: &PointCloudHost, key: &str, code: &str, key_code: u32);
}

/// Numbers of an array-like value; `None` for null/undefined.
pub(crate) fn numbers(value: &JsValue) -> Option<Vec<f64>> {
    if value.is_null() || value.is_undefined() {
        return None;
    }
    Some(Float64Array::new(value).to_vec())
}

fn vec3_from_js(value: &JsValue) -> Option<Vec3> {
    Vec3::from_slice(&numbers(value)?).filter(|v| v.is_finite())
}

fn camera_vector(value: &JsValue, what: &str) -> Vec3 {
    vec3_from_js(value).unwrap_or_else(|| {
        warn!(what, "engine returned a malformed vector");
        Vec3::ZERO
    })
}

fn entity_key(id: EntityId) -> String {
    format!("measure-{}-{}", id.index(), id.generation())
}

pub struct JsGlobe {
    host: GlobeHost,
    entities: World,
}

impl JsGlobe {
    pub fn new(host: GlobeHost) -> Self {
        Self {
            host,
            entities: World::new(),
        }
    }
}

impl GlobeCamera for JsGlobe {
    fn position(&self) -> Vec3 {
        camera_vector(&self.host.camera_position(), "position")
    }

    fn direction(&self) -> Vec3 {
        camera_vector(&self.host.camera_direction(), "direction")
    }

    fn up(&self) -> Vec3 {
        camera_vector(&self.host.camera_up(), "up")
    }

    fn set_view(&mut self, position: Vec3, direction: Vec3, up: Vec3) {
        self.host
            .set_view(&position.as_array(), &direction.as_array(), &up.as_array());
    }

    fn fov(&self) -> f64 {
        self.host.fov()
    }

    fn set_fov(&mut self, fov_rad: f64) {
        self.host.set_fov(fov_rad);
    }
}

impl EntityStore for JsGlobe {
    fn add(&mut self, descriptor: EntityDescriptor) -> EntityId {
        let json = serde_json::to_string(&descriptor);
        let id = self.entities.add(descriptor);
        match json {
            Ok(json) => self.host.add_entity(&entity_key(id), &json),
            Err(err) => warn!(%err, "entity descriptor not serializable"),
        }
        id
    }

    fn remove(&mut self, id: EntityId) -> bool {
        if !self.entities.remove(id) {
            return false;
        }
        self.host.remove_entity(&entity_key(id));
        true
    }

    fn contains(&self, id: EntityId) -> bool {
        self.entities.contains(id)
    }
}

impl Picker for JsGlobe {
    fn pick_object_position(&mut self, screen: Vec2) -> Option<Vec3> {
        vec3_from_js(&self.host.pick_position(screen.x, screen.y))
    }

    fn pick_ray(&self, screen: Vec2) -> Option<Ray> {
        match numbers(&self.host.pick_ray(screen.x, screen.y))?.as_slice() {
            [ox, oy, oz, dx, dy, dz] => Some(Ray::new(Vec3::new(*ox, *oy, *oz), Vec3::new(*dx, *dy, *dz))),
            _ => None,
        }
    }

    fn pick_terrain(&mut self, ray: &Ray) -> Option<Vec3> {
        let [ox, oy, oz] = ray.origin.as_array();
        let [dx, dy, dz] = ray.dir.as_array();
        vec3_from_js(&self.host.pick_terrain(&[ox, oy, oz, dx, dy, dz]))
    }

    fn pick_ellipsoid(&mut self, screen: Vec2) -> Option<Vec3> {
        vec3_from_js(&self.host.pick_ellipsoid(screen.x, screen.y))
    }
}

impl DefaultInputActions for JsGlobe {
    fn suppress_default_double_click(&mut self) {
        self.host.suppress_double_click();
    }

    fn restore_default_double_click(&mut self) {
        self.host.restore_double_click();
    }
}

impl Render for JsGlobe {
    fn render(&mut self) {
        self.host.render();
    }
}

pub struct JsPointCloud {
    host: PointCloudHost,
}

impl JsPointCloud {
    pub fn new(host: PointCloudHost) -> Self {
        Self { host }
    }
}

impl PointCloudCamera for JsPointCloud {
    fn world_matrix(&self) -> Option<Mat4> {
        let matrix = numbers(&self.host.camera_matrix()).and_then(|m| Mat4::from_slice(&m));
        if matrix.is_none() {
            warn!("malformed point cloud camera matrix");
        }
        matrix
    }

    fn fov_deg(&self) -> f64 {
        self.host.fov()
    }

    fn aspect(&self) -> f64 {
        self.host.aspect()
    }
}

impl PointCloudView for JsPointCloud {
    fn view_position(&self) -> Vec3 {
        camera_vector(&self.host.view_position(), "view position")
    }

    fn set_view_position(&mut self, position: Vec3) {
        self.host.set_view_position(&position.as_array());
    }

    fn set_view_direction(&mut self, direction: Vec3) {
        self.host.set_view_direction(&direction.as_array());
    }

    fn pivot(&self) -> Vec3 {
        camera_vector(&self.host.pivot(), "pivot")
    }
}

impl NavigationControls for JsPointCloud {
    fn controls(&self) -> ControlsMode {
        match self.host.controls().as_str() {
            "first_person" => ControlsMode::FirstPerson,
            _ => ControlsMode::Earth,
        }
    }

    fn set_controls(&mut self, mode: ControlsMode) {
        let name = match mode {
            ControlsMode::Earth => "earth",
            ControlsMode::FirstPerson => "first_person",
        };
        self.host.set_controls(name);
    }
}

impl FrameUpdate for JsPointCloud {
    fn update(&mut self, dt_s: f64, timestamp: Time) {
        self.host.update(dt_s, timestamp.as_millis());
    }
}

impl Render for JsPointCloud {
    fn render(&mut self) {
        self.host.render();
    }
}

impl NativeMeasuringTool for JsPointCloud {
    fn start_insertion(&mut self, params: &InsertionParams) {
        let params = json!({
            "name": params.name,
            "showDistances": params.show_distances,
            "showArea": params.show_area,
            "showCoordinates": params.show_coordinates,
            "showAngles": params.show_angles,
            "closed": params.closed,
            "maxMarkers": params.max_markers,
        });
        self.host.start_insertion(&params.to_string());
    }

    fn remove_all_measurements(&mut self) {
        self.host.remove_all_measurements();
    }
}

impl KeyboardSink for JsPointCloud {
    fn dispatch_key_down(&mut self, key: KeyPress) {
        self.host.dispatch_key_down(key.key, key.code, key.key_code);
    }
}
