use gloo_net::http::Request;
use serde_json::json;
use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use formats::{DatasetError, DatasetFrame, DatasetUrls};
use foundation::math::Vec3;
use foundation::time::Time;
use measure::{MeasureMode, PointCloudMeasureEvent};
use scene::{MeasurementReport, ScreenEvent};

pub mod app;
pub mod config;
pub mod host;

use app::{ButtonAction, DualViewer};
use config::ViewerConfig;
use host::{GlobeHost, JsGlobe, JsPointCloud, PointCloudHost, numbers};

type WebViewer = DualViewer<JsGlobe, JsPointCloud>;

static INITIALIZED: AtomicBool = AtomicBool::new(false);

thread_local! {
    static STATE: RefCell<Option<WebViewer>> = const { RefCell::new(None) };
}

fn with_viewer<T>(f: impl FnOnce(&mut WebViewer) -> T) -> Result<T, JsValue> {
    STATE.with(|state| {
        let mut state = state.borrow_mut();
        let viewer = state
            .as_mut()
            .ok_or_else(|| JsValue::from_str("viewer not initialized; call init() first"))?;
        Ok(f(viewer))
    })
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
    Ok(())
}

/// Wires both engines. `config_json` may be partial or omitted.
#[wasm_bindgen]
pub fn init(globe: GlobeHost, point_cloud: PointCloudHost, config_json: Option<String>) -> Result<(), JsValue> {
    let config = ViewerConfig::from_json(config_json.as_deref().unwrap_or_default()).map_err(js_error)?;
    let mut viewer = WebViewer::new(config);
    viewer.attach_globe(JsGlobe::new(globe));
    viewer.attach_point_cloud(JsPointCloud::new(point_cloud));

    STATE.with(|state| {
        if let Some(mut previous) = state.borrow_mut().replace(viewer) {
            previous.shutdown();
        }
    });
    info!("dual viewer initialized");
    Ok(())
}

/// Called from the page's `requestAnimationFrame` callback.
#[wasm_bindgen]
pub fn advance_frame(timestamp_ms: f64) -> Result<u32, JsValue> {
    with_viewer(|v| v.advance_frame(Time::from_millis(timestamp_ms)) as u32)
}

/// Frame-task trace lines since the last call, as a JSON array.
#[wasm_bindgen]
pub fn take_trace() -> Result<String, JsValue> {
    let events = with_viewer(|v| v.drain_trace())?;
    let lines: Vec<_> = events
        .iter()
        .map(|e| json!({ "frame": e.frame_index, "kind": e.kind, "message": e.message }))
        .collect();
    serde_json::to_string(&lines).map_err(js_error)
}

// --- dataset and sync ----------------------------------------------------

/// Fetches `<base>/tileset.json` and `<base>/metadata.xml`; the sync loop
/// starts once both resolve.
#[wasm_bindgen]
pub fn load_dataset(base_url: String) {
    spawn_local(async move {
        let urls = DatasetUrls::from_base(&base_url);
        let tileset = fetch_text(&urls.tileset).await;
        let metadata = fetch_text(&urls.metadata).await;

        let frame = DatasetFrame::from_documents(
            document(&tileset, &urls.tileset),
            document(&metadata, &urls.metadata),
        );
        match with_viewer(|v| v.set_dataset_frame(frame)) {
            Ok(syncing) => info!(syncing, "dataset frame applied"),
            Err(_) => warn!("dataset loaded before init(); frame dropped"),
        }
    });
}

async fn fetch_text(url: &str) -> Result<String, String> {
    let resp = Request::get(url).send().await.map_err(|e| e.to_string())?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    resp.text().await.map_err(|e| e.to_string())
}

fn document<'a>(fetched: &'a Result<String, String>, url: &str) -> Result<&'a str, DatasetError> {
    fetched.as_deref().map_err(|reason| DatasetError::Fetch {
        url: url.to_string(),
        reason: reason.clone(),
    })
}

/// Installs the dataset's planar-to-geographic projection.
///
/// `forward(x, y)` must return `[lon, lat]` in degrees.
#[wasm_bindgen]
pub fn set_projection(forward: js_sys::Function) -> Result<(), JsValue> {
    let projection = move |x: f64, y: f64| -> Option<(f64, f64)> {
        let out = forward
            .call2(&JsValue::NULL, &JsValue::from_f64(x), &JsValue::from_f64(y))
            .ok()?;
        match numbers(&out)?.as_slice() {
            [lon, lat, ..] => Some((*lon, *lat)),
            _ => None,
        }
    };
    with_viewer(|v| v.set_projection(projection))
}

#[wasm_bindgen]
pub fn clear_projection() -> Result<(), JsValue> {
    with_viewer(|v| v.clear_projection())
}

/// `{ syncing, datasetFrame, projection }` as JSON.
#[wasm_bindgen]
pub fn sync_status() -> Result<String, JsValue> {
    let status = with_viewer(|v| v.sync_status())?;
    serde_json::to_string(&status).map_err(js_error)
}

#[wasm_bindgen]
pub fn start_sync() -> Result<(), JsValue> {
    with_viewer(|v| v.start_sync())
}

#[wasm_bindgen]
pub fn stop_sync() -> Result<(), JsValue> {
    with_viewer(|v| v.stop_sync())
}

// --- fly-through ---------------------------------------------------------

#[wasm_bindgen]
pub fn start_globe_roaming() -> Result<(), JsValue> {
    with_viewer(|v| v.start_globe_roaming())
}

#[wasm_bindgen]
pub fn stop_globe_roaming() -> Result<(), JsValue> {
    with_viewer(|v| v.stop_globe_roaming())
}

#[wasm_bindgen]
pub fn set_globe_move_speed(meters_per_frame: f64) -> Result<(), JsValue> {
    with_viewer(|v| v.globe_roaming_mut().set_move_speed(meters_per_frame))
}

#[wasm_bindgen]
pub fn set_globe_rotate_speed(degrees_per_frame: f64) -> Result<(), JsValue> {
    with_viewer(|v| v.globe_roaming_mut().set_rotate_speed(degrees_per_frame.to_radians()))
}

/// Key bindings of the globe fly-through as `[{ keyCode, description }]`.
#[wasm_bindgen]
pub fn globe_key_mappings() -> Result<String, JsValue> {
    let bindings = with_viewer(|v| v.globe_roaming().key_mappings())?;
    let table: Vec<_> = bindings
        .iter()
        .map(|b| json!({ "keyCode": b.key_code, "description": b.description }))
        .collect();
    serde_json::to_string(&table).map_err(js_error)
}

#[wasm_bindgen]
pub fn start_point_cloud_roaming() -> Result<bool, JsValue> {
    with_viewer(|v| v.start_point_cloud_roaming())
}

#[wasm_bindgen]
pub fn stop_point_cloud_roaming() -> Result<(), JsValue> {
    with_viewer(|v| v.stop_point_cloud_roaming())
}

#[wasm_bindgen]
pub fn key_down(key_code: u32) -> Result<bool, JsValue> {
    with_viewer(|v| v.key_down(key_code))
}

#[wasm_bindgen]
pub fn key_up(key_code: u32) -> Result<bool, JsValue> {
    with_viewer(|v| v.key_up(key_code))
}

// --- globe measurement ---------------------------------------------------

/// Starts `point`, `line`/`distance` or `area`; returns the operator hint.
#[wasm_bindgen]
pub fn measure_start(mode: &str) -> Result<String, JsValue> {
    let parsed =
        MeasureMode::parse(mode).ok_or_else(|| JsValue::from_str(&format!("unknown measurement mode {mode:?}")))?;
    with_viewer(|v| v.start_measure(parsed))?
        .map(str::to_string)
        .ok_or_else(|| JsValue::from_str("no globe attached"))
}

#[wasm_bindgen]
pub fn measure_click(x: f64, y: f64) -> Result<bool, JsValue> {
    with_viewer(|v| v.left_click(x, y))
}

#[wasm_bindgen]
pub fn measure_double_click(x: f64, y: f64) -> Result<bool, JsValue> {
    with_viewer(|v| v.screen_event(ScreenEvent::LeftDoubleClick(foundation::math::Vec2::new(x, y))))
}

#[wasm_bindgen]
pub fn measure_right_click(x: f64, y: f64) -> Result<bool, JsValue> {
    with_viewer(|v| v.screen_event(ScreenEvent::RightClick(foundation::math::Vec2::new(x, y))))
}

#[wasm_bindgen]
pub fn measure_move(x: f64, y: f64) -> Result<bool, JsValue> {
    with_viewer(|v| v.mouse_move(x, y))
}

#[wasm_bindgen]
pub fn measure_finish() -> Result<bool, JsValue> {
    with_viewer(|v| v.finish_measure())
}

#[wasm_bindgen]
pub fn measure_stop() -> Result<(), JsValue> {
    with_viewer(|v| v.stop_measure())
}

#[wasm_bindgen]
pub fn measure_clear() -> Result<(), JsValue> {
    with_viewer(|v| v.clear_measurements())
}

#[wasm_bindgen]
pub fn measure_set_continuous(enabled: bool) -> Result<(), JsValue> {
    with_viewer(|v| v.measurement_mut().set_continuous(enabled))
}

/// Globe measurement events since the last call, as a JSON array.
#[wasm_bindgen]
pub fn take_measure_events() -> Result<String, JsValue> {
    let events = with_viewer(|v| v.drain_measure_events())?;
    serde_json::to_string(&events).map_err(js_error)
}

// --- point-cloud measurement ---------------------------------------------

/// Returns `started`, `stopped`, `cleared` or `unknown`.
#[wasm_bindgen]
pub fn press_measure_button(id: &str) -> Result<String, JsValue> {
    let action = with_viewer(|v| v.press_measure_button(id))?;
    let name = match action {
        ButtonAction::Started => "started",
        ButtonAction::Stopped => "stopped",
        ButtonAction::Cleared => "cleared",
        ButtonAction::Unknown => "unknown",
    };
    Ok(name.to_string())
}

#[wasm_bindgen]
pub fn active_measure_button() -> Result<Option<String>, JsValue> {
    with_viewer(|v| v.point_cloud_measurement().active_button().map(str::to_string))
}

#[wasm_bindgen]
pub fn set_point_cloud_continuous(enabled: bool) -> Result<(), JsValue> {
    with_viewer(|v| v.point_cloud_measurement_mut().set_continuous(enabled))
}

/// Completion callback of the native measuring tool; `points` is flat xyz.
#[wasm_bindgen]
pub fn point_cloud_measurement_finished(name: String, points: Vec<f64>) -> Result<(), JsValue> {
    let points = points
        .chunks_exact(3)
        .map(|c| Vec3::new(c[0], c[1], c[2]))
        .collect();
    with_viewer(|v| v.point_cloud_measurement_finished(MeasurementReport { name, points }))
}

/// Point-cloud measurement events since the last call, as a JSON array.
#[wasm_bindgen]
pub fn take_point_cloud_events() -> Result<String, JsValue> {
    let events = with_viewer(|v| v.drain_point_cloud_events())?;
    let events: Vec<_> = events.iter().map(point_cloud_event_json).collect();
    serde_json::to_string(&events).map_err(js_error)
}

fn point_cloud_event_json(event: &PointCloudMeasureEvent) -> serde_json::Value {
    match event {
        PointCloudMeasureEvent::Started(mode) => json!({ "event": "started", "mode": format!("{mode:?}") }),
        PointCloudMeasureEvent::Restarted(mode) => {
            json!({ "event": "restarted", "mode": format!("{mode:?}") })
        }
        PointCloudMeasureEvent::Completed { mode, report } => json!({
            "event": "completed",
            "mode": mode.map(|m| format!("{m:?}")),
            "name": report.name,
            "points": report.points.iter().map(|p| p.as_array()).collect::<Vec<_>>(),
        }),
    }
}

/// Stops every task and removes measurement entities from both engines.
#[wasm_bindgen]
pub fn shutdown() -> Result<(), JsValue> {
    with_viewer(|v| v.shutdown())
}
