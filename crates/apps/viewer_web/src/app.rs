//! Globe + point-cloud composition driven by the page's animation frame.

use camera_sync::{CameraSync, CoordinateBridge, FrameReference, GeodeticProjection, SyncOutcome};
use formats::DatasetFrame;
use foundation::math::Vec2;
use foundation::time::Time;
use measure::{
    GlobeMeasurement, MeasureMode, MeasurementEvent, PointCloudMeasureEvent, PointCloudMeasurement,
};
use navigation::{GlobeRoaming, PointCloudRoaming};
use runtime::{Event, EventBus, Frame, RepeatingTask, Scheduler, TaskControl};
use scene::{
    GlobeViewer, KeyboardSink, MeasurementReport, NativeMeasuringTool, PointCloudViewer, ScreenEvent,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ViewerConfig;

/// Frame tasks owned by the viewer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TaskKind {
    GlobeRoaming,
    PointCloudRoaming,
    CameraSync,
}

impl TaskKind {
    /// Camera motion lands before the sync samples the point-cloud pose.
    fn priority(self) -> i32 {
        match self {
            TaskKind::GlobeRoaming | TaskKind::PointCloudRoaming => -10,
            TaskKind::CameraSync => 0,
        }
    }

    fn task(self) -> RepeatingTask<TaskKind> {
        RepeatingTask::with_priority(self, self.priority())
    }
}

/// What a measurement-panel button did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ButtonAction {
    Started,
    Stopped,
    Cleared,
    Unknown,
}

/// Which conversions the camera sync has available.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub syncing: bool,
    pub dataset_frame: bool,
    pub projection: bool,
}

pub struct DualViewer<G, P> {
    globe: Option<G>,
    point_cloud: Option<P>,
    scheduler: Scheduler<TaskKind>,
    bus: EventBus,
    frame: Option<Frame>,
    sync: CameraSync,
    sync_task: RepeatingTask<TaskKind>,
    auto_sync: bool,
    globe_roaming: GlobeRoaming<TaskKind>,
    point_cloud_roaming: PointCloudRoaming<TaskKind>,
    measure: GlobeMeasurement,
    point_cloud_measure: PointCloudMeasurement,
}

impl<G, P> DualViewer<G, P>
where
    G: GlobeViewer,
    P: PointCloudViewer + NativeMeasuringTool + KeyboardSink,
{
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            globe: None,
            point_cloud: None,
            scheduler: Scheduler::new(),
            bus: EventBus::new(),
            frame: None,
            sync: CameraSync::new(CoordinateBridge::new()),
            sync_task: TaskKind::CameraSync.task(),
            auto_sync: config.sync.auto_start,
            globe_roaming: GlobeRoaming::new(config.globe_roaming, TaskKind::GlobeRoaming.task()),
            point_cloud_roaming: PointCloudRoaming::new(
                config.point_cloud_roaming,
                TaskKind::PointCloudRoaming.task(),
            ),
            measure: GlobeMeasurement::new(config.measure),
            point_cloud_measure: PointCloudMeasurement::new(config.point_cloud_measure),
        }
    }

    pub fn attach_globe(&mut self, globe: G) {
        self.globe = Some(globe);
    }

    pub fn attach_point_cloud(&mut self, point_cloud: P) {
        self.point_cloud = Some(point_cloud);
    }

    pub fn globe(&self) -> Option<&G> {
        self.globe.as_ref()
    }

    pub fn globe_mut(&mut self) -> Option<&mut G> {
        self.globe.as_mut()
    }

    pub fn point_cloud(&self) -> Option<&P> {
        self.point_cloud.as_ref()
    }

    pub fn point_cloud_mut(&mut self) -> Option<&mut P> {
        self.point_cloud.as_mut()
    }

    pub fn scheduler(&self) -> &Scheduler<TaskKind> {
        &self.scheduler
    }

    /// Host time of the last advanced frame.
    pub fn now(&self) -> Time {
        self.frame.map(|f| f.time).unwrap_or_default()
    }

    // --- camera sync -------------------------------------------------------

    /// Installs the dataset's local-to-geocentric frame. Returns whether the
    /// sync loop is running afterwards.
    pub fn set_dataset_frame(&mut self, frame: DatasetFrame) -> bool {
        let reference = frame
            .parts()
            .map(|(transform, origin)| FrameReference::new(transform, origin));
        let complete = reference.is_some();
        self.sync.bridge_mut().set_reference(reference);
        if complete && self.auto_sync {
            self.start_sync();
        } else if !complete {
            warn!(
                projection = self.sync.bridge().has_projection(),
                "dataset frame incomplete; sync not started"
            );
        }
        self.is_syncing()
    }

    pub fn set_projection(&mut self, projection: impl GeodeticProjection + 'static) {
        self.sync.bridge_mut().set_projection(projection);
        info!("point cloud projection installed");
    }

    pub fn clear_projection(&mut self) {
        self.sync.bridge_mut().clear_projection();
    }

    pub fn sync_status(&self) -> SyncStatus {
        let bridge = self.sync.bridge();
        SyncStatus {
            syncing: self.is_syncing(),
            dataset_frame: bridge.reference().is_some(),
            projection: bridge.has_projection(),
        }
    }

    pub fn start_sync(&mut self) {
        self.sync_task.start(&mut self.scheduler);
    }

    pub fn stop_sync(&mut self) {
        self.sync_task.cancel(&mut self.scheduler);
    }

    pub fn is_syncing(&self) -> bool {
        self.sync_task.is_running(&self.scheduler)
    }

    // --- frame loop --------------------------------------------------------

    /// Runs every scheduled task for the animation frame at `time`, then fires
    /// a due continuous point-cloud restart. Returns the number of tasks run.
    pub fn advance_frame(&mut self, time: Time) -> usize {
        let frame = match self.frame {
            Some(prev) => prev.next_at(time),
            None => Frame::first_at(time),
        };
        self.frame = Some(frame);

        let Self {
            globe,
            point_cloud,
            scheduler,
            bus,
            sync,
            globe_roaming,
            point_cloud_roaming,
            ..
        } = self;

        let ran = scheduler.run_frame(frame, bus, |kind, frame, bus| match kind {
            TaskKind::CameraSync => {
                if let SyncOutcome::Updated(pose) = sync.tick(frame, point_cloud.as_mut(), globe.as_mut(), bus)
                {
                    debug!(position = ?pose.position, "globe camera synced");
                }
                TaskControl::Continue
            }
            TaskKind::GlobeRoaming => match globe.as_mut() {
                Some(globe) => globe_roaming.tick(globe),
                None => TaskControl::Continue,
            },
            TaskKind::PointCloudRoaming => match point_cloud.as_mut() {
                Some(point_cloud) => point_cloud_roaming.tick(point_cloud),
                None => TaskControl::Continue,
            },
        });

        if let Some(point_cloud) = self.point_cloud.as_mut() {
            self.point_cloud_measure.poll(point_cloud, frame.time);
        }
        ran
    }

    /// Trace lines recorded by frame tasks since the last call.
    pub fn drain_trace(&mut self) -> Vec<Event> {
        self.bus.drain()
    }

    // --- fly-through -------------------------------------------------------

    pub fn start_globe_roaming(&mut self) {
        self.globe_roaming.start(&mut self.scheduler);
    }

    pub fn stop_globe_roaming(&mut self) {
        self.globe_roaming.stop(&mut self.scheduler);
    }

    pub fn globe_roaming(&self) -> &GlobeRoaming<TaskKind> {
        &self.globe_roaming
    }

    pub fn globe_roaming_mut(&mut self) -> &mut GlobeRoaming<TaskKind> {
        &mut self.globe_roaming
    }

    /// Needs an attached point-cloud viewer.
    pub fn start_point_cloud_roaming(&mut self) -> bool {
        match self.point_cloud.as_mut() {
            Some(point_cloud) => {
                self.point_cloud_roaming.start(point_cloud, &mut self.scheduler);
                true
            }
            None => false,
        }
    }

    pub fn stop_point_cloud_roaming(&mut self) {
        if let Some(point_cloud) = self.point_cloud.as_mut() {
            self.point_cloud_roaming.stop(point_cloud, &mut self.scheduler);
        }
    }

    pub fn point_cloud_roaming(&self) -> &PointCloudRoaming<TaskKind> {
        &self.point_cloud_roaming
    }

    /// Routes a key to whichever controllers are running. Returns whether any
    /// of them consumed it.
    pub fn key_down(&mut self, key_code: u32) -> bool {
        let globe = self.globe_roaming.key_down(&self.scheduler, key_code);
        let point_cloud = self.point_cloud_roaming.key_down(&self.scheduler, key_code);
        globe || point_cloud
    }

    pub fn key_up(&mut self, key_code: u32) -> bool {
        let globe = self.globe_roaming.key_up(&self.scheduler, key_code);
        let point_cloud = self.point_cloud_roaming.key_up(&self.scheduler, key_code);
        globe || point_cloud
    }

    // --- globe measurement -------------------------------------------------

    /// Returns the operator hint, or `None` without a globe.
    pub fn start_measure(&mut self, mode: MeasureMode) -> Option<&'static str> {
        let globe = self.globe.as_mut()?;
        Some(self.measure.start(globe, mode))
    }

    pub fn screen_event(&mut self, event: ScreenEvent) -> bool {
        match self.globe.as_mut() {
            Some(globe) => self.measure.handle_event(globe, event),
            None => false,
        }
    }

    pub fn left_click(&mut self, x: f64, y: f64) -> bool {
        self.screen_event(ScreenEvent::LeftClick(Vec2::new(x, y)))
    }

    pub fn mouse_move(&mut self, x: f64, y: f64) -> bool {
        self.screen_event(ScreenEvent::MouseMove { end: Vec2::new(x, y) })
    }

    pub fn finish_measure(&mut self) -> bool {
        match self.globe.as_mut() {
            Some(globe) => self.measure.try_finish(globe),
            None => false,
        }
    }

    pub fn stop_measure(&mut self) {
        if let Some(globe) = self.globe.as_mut() {
            self.measure.stop(globe);
        }
    }

    pub fn clear_measurements(&mut self) {
        if let Some(globe) = self.globe.as_mut() {
            self.measure.clear_all(globe);
        }
    }

    pub fn measurement(&self) -> &GlobeMeasurement {
        &self.measure
    }

    pub fn measurement_mut(&mut self) -> &mut GlobeMeasurement {
        &mut self.measure
    }

    pub fn drain_measure_events(&mut self) -> Vec<MeasurementEvent> {
        self.measure.drain_events()
    }

    // --- point-cloud measurement -------------------------------------------

    /// Handles a click on one of the configured measurement-panel buttons.
    pub fn press_measure_button(&mut self, id: &str) -> ButtonAction {
        let Some(point_cloud) = self.point_cloud.as_mut() else {
            return ButtonAction::Unknown;
        };
        let tool = &mut self.point_cloud_measure;
        if let Some(mode) = tool.mode_for_button(id) {
            tool.press(point_cloud, mode);
            return ButtonAction::Started;
        }
        let buttons = &tool.config().buttons;
        if id == buttons.stop {
            tool.stop(point_cloud);
            ButtonAction::Stopped
        } else if id == buttons.clear {
            tool.clear_all(point_cloud);
            ButtonAction::Cleared
        } else {
            ButtonAction::Unknown
        }
    }

    /// Completion reported by the native measuring tool.
    pub fn point_cloud_measurement_finished(&mut self, report: MeasurementReport) {
        let now = self.now();
        self.point_cloud_measure.on_measurement_finished(report, now);
    }

    pub fn point_cloud_measurement(&self) -> &PointCloudMeasurement {
        &self.point_cloud_measure
    }

    pub fn point_cloud_measurement_mut(&mut self) -> &mut PointCloudMeasurement {
        &mut self.point_cloud_measure
    }

    pub fn drain_point_cloud_events(&mut self) -> Vec<PointCloudMeasureEvent> {
        self.point_cloud_measure.drain_events()
    }

    /// Stops every task and tears down both measurement tools.
    pub fn shutdown(&mut self) {
        self.stop_sync();
        self.stop_globe_roaming();
        self.stop_point_cloud_roaming();
        if let Some(globe) = self.globe.as_mut() {
            self.measure.destroy(globe);
        }
        if let Some(point_cloud) = self.point_cloud.as_mut() {
            self.point_cloud_measure.destroy(point_cloud);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camera_sync::SYNC_EVENT_KIND;
    use foundation::math::{Geodetic, Mat4, Vec3, geodetic_to_ecef};
    use pretty_assertions::assert_eq;
    use scene::headless::{HeadlessGlobe, HeadlessPointCloud};
    use scene::{ControlsMode, GlobeCamera, KeyPress};

    type Viewer = DualViewer<HeadlessGlobe, HeadlessPointCloud>;

    fn assert_close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "expected {a} ~= {b}");
    }

    fn viewer() -> Viewer {
        let mut v = Viewer::new(ViewerConfig::default());
        v.attach_globe(HeadlessGlobe::new());
        v.attach_point_cloud(HeadlessPointCloud::looking_at(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::new(0.0, 100.0, 10.0),
        ));
        v
    }

    fn dataset_frame() -> DatasetFrame {
        let anchor = geodetic_to_ecef(Geodetic::from_degrees(116.0, 40.0, 0.0)).as_vec3();
        DatasetFrame {
            transform: Some(Mat4::from_translation(anchor)),
            origin: Some(Vec3::ZERO),
        }
    }

    #[test]
    fn sync_starts_only_with_complete_frame() {
        let mut v = viewer();
        let partial = DatasetFrame {
            transform: dataset_frame().transform,
            origin: None,
        };
        assert!(!v.set_dataset_frame(partial));
        assert!(v.set_dataset_frame(dataset_frame()));
        assert_eq!(v.scheduler().kinds(), vec![TaskKind::CameraSync]);
    }

    #[test]
    fn status_reports_installed_conversions() {
        let mut v = viewer();
        assert_eq!(
            v.sync_status(),
            SyncStatus {
                syncing: false,
                dataset_frame: false,
                projection: false,
            }
        );

        v.set_projection(|x: f64, y: f64| Some((x, y)));
        v.set_dataset_frame(dataset_frame());
        assert_eq!(
            v.sync_status(),
            SyncStatus {
                syncing: true,
                dataset_frame: true,
                projection: true,
            }
        );

        v.clear_projection();
        v.stop_sync();
        let status = v.sync_status();
        assert!(!status.projection);
        assert!(!status.syncing);
        assert!(status.dataset_frame);
        let json = serde_json::to_value(status).unwrap();
        assert_eq!(json["datasetFrame"], true);
    }

    #[test]
    fn projection_alone_keeps_globe_moving() {
        let mut v = viewer();
        v.set_projection(|x: f64, y: f64| Some((x / 1000.0, y / 1000.0)));
        v.start_sync();
        v.advance_frame(Time(1.0));
        assert_eq!(v.globe().unwrap().render_count, 1);

        v.clear_projection();
        v.advance_frame(Time(2.0));
        assert_eq!(v.globe().unwrap().render_count, 1);
    }

    #[test]
    fn auto_start_can_be_disabled() {
        let mut config = ViewerConfig::default();
        config.sync.auto_start = false;
        let mut v = Viewer::new(config);
        assert!(!v.set_dataset_frame(dataset_frame()));
        v.start_sync();
        assert!(v.is_syncing());
    }

    #[test]
    fn advance_frame_syncs_globe_to_point_cloud() {
        let mut v = viewer();
        v.set_dataset_frame(dataset_frame());
        let anchor = dataset_frame().transform.map(|m| m.translation()).unwrap_or_default();

        assert_eq!(v.advance_frame(Time(1.0)), 1);
        let globe = v.globe().unwrap();
        let expected = anchor + Vec3::new(0.0, 0.0, 10.0);
        assert_close(globe.position().distance(expected), 0.0, 1e-6);
        assert_close(globe.direction().y, 1.0, 1e-9);
        assert_eq!(globe.render_count, 1);
        assert_eq!(v.point_cloud().unwrap().render_count, 1);

        let trace = v.drain_trace();
        assert_eq!(trace.len(), 1);
        assert_eq!(trace[0].kind, SYNC_EVENT_KIND);
        assert_eq!(trace[0].message, "active");
    }

    #[test]
    fn frames_carry_host_time() {
        let mut v = viewer();
        v.set_dataset_frame(dataset_frame());
        v.advance_frame(Time(2.0));
        v.advance_frame(Time(2.5));
        assert_eq!(v.now(), Time(2.5));
        let (dt, t) = v.point_cloud().unwrap().last_update.unwrap();
        assert_close(dt, 0.5, 1e-12);
        assert_eq!(t, Time(2.5));
    }

    #[test]
    fn stopped_sync_leaves_globe_alone() {
        let mut v = viewer();
        v.set_dataset_frame(dataset_frame());
        v.stop_sync();
        let before = v.globe().unwrap().position();
        assert_eq!(v.advance_frame(Time(1.0)), 0);
        assert_eq!(v.globe().unwrap().position(), before);
    }

    #[test]
    fn roaming_runs_before_sync() {
        let mut v = viewer();
        v.set_dataset_frame(dataset_frame());
        assert!(v.start_point_cloud_roaming());
        assert_eq!(v.point_cloud().unwrap().controls, ControlsMode::FirstPerson);
        assert_eq!(
            v.scheduler().kinds(),
            vec![TaskKind::PointCloudRoaming, TaskKind::CameraSync]
        );

        assert!(v.key_down(87));
        v.advance_frame(Time(0.0));
        let moved = v.point_cloud().unwrap().position;
        assert_close(moved.y, 0.01, 1e-12);

        let anchor = dataset_frame().transform.map(|m| m.translation()).unwrap_or_default();
        let expected = anchor + moved;
        assert_close(v.globe().unwrap().position().distance(expected), 0.0, 1e-6);

        v.stop_point_cloud_roaming();
        assert_eq!(v.point_cloud().unwrap().controls, ControlsMode::Earth);
        assert!(!v.key_down(87));
    }

    #[test]
    fn globe_roaming_moves_globe_camera() {
        let mut v = viewer();
        v.start_globe_roaming();
        let before = v.globe().unwrap().position();
        assert!(v.key_down(87));
        v.advance_frame(Time(0.0));
        assert_close(v.globe().unwrap().position().distance(before), 0.1, 1e-6);
        assert!(v.key_up(87));
    }

    #[test]
    fn globe_measurement_round_trip() {
        let mut v = viewer();
        let a = geodetic_to_ecef(Geodetic::from_degrees(116.0, 40.0, 0.0)).as_vec3();
        let b = geodetic_to_ecef(Geodetic::from_degrees(116.001, 40.0, 0.0)).as_vec3();
        {
            let globe = v.globe_mut().unwrap();
            globe.place_object(Vec2::new(10.0, 10.0), a);
            globe.place_object(Vec2::new(20.0, 10.0), b);
        }

        assert_eq!(v.start_measure(MeasureMode::Line), Some(MeasureMode::Line.hint()));
        assert!(v.left_click(10.0, 10.0));
        assert!(v.left_click(20.0, 10.0));
        assert!(v.finish_measure());
        assert!(!v.measurement().is_measuring());

        let completed = v
            .drain_measure_events()
            .into_iter()
            .find_map(|e| match e {
                MeasurementEvent::Completed(c) => Some(c),
                _ => None,
            })
            .unwrap();
        assert_eq!(completed.mode, MeasureMode::Line);
        assert_eq!(completed.positions, vec![a, b]);

        v.clear_measurements();
        assert!(v.measurement().finished().is_empty());
        assert!(v.globe().unwrap().world.is_empty());
    }

    #[test]
    fn measure_buttons_drive_point_cloud_tool() {
        let mut v = viewer();
        assert_eq!(v.press_measure_button("btn-measure-distance"), ButtonAction::Started);
        assert_eq!(v.point_cloud_measurement().active_button(), Some("btn-measure-distance"));
        assert_eq!(v.point_cloud().unwrap().insertions.len(), 1);

        assert_eq!(v.press_measure_button("btn-measure-stop"), ButtonAction::Stopped);
        assert_eq!(v.point_cloud().unwrap().dispatched_keys, vec![KeyPress::ESCAPE]);
        assert_eq!(v.point_cloud_measurement().active_mode(), None);

        assert_eq!(v.press_measure_button("btn-measure-clear"), ButtonAction::Cleared);
        assert_eq!(v.point_cloud().unwrap().remove_all_count, 1);
        assert_eq!(v.press_measure_button("nope"), ButtonAction::Unknown);
    }

    #[test]
    fn continuous_point_cloud_measurement_restarts_after_delay() {
        let mut v = viewer();
        v.point_cloud_measurement_mut().set_continuous(true);
        v.advance_frame(Time(1.0));
        v.press_measure_button("btn-measure-area");
        v.point_cloud_measurement_finished(MeasurementReport {
            name: "Area".to_string(),
            points: vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)],
        });
        assert!(v.point_cloud_measurement().restart_pending());

        v.advance_frame(Time(1.1));
        assert_eq!(v.point_cloud().unwrap().insertions.len(), 1);
        v.advance_frame(Time(1.25));
        assert_eq!(v.point_cloud().unwrap().insertions.len(), 2);
        assert!(!v.point_cloud_measurement().restart_pending());
    }

    #[test]
    fn shutdown_cancels_all_tasks() {
        let mut v = viewer();
        v.set_dataset_frame(dataset_frame());
        v.start_globe_roaming();
        v.start_point_cloud_roaming();
        v.shutdown();
        assert_eq!(v.scheduler().task_count(), 0);
        assert_eq!(v.point_cloud().unwrap().controls, ControlsMode::Earth);
    }
}
