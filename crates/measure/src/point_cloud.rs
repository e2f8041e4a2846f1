//! Adapter over a point-cloud renderer's own measuring tool.

use foundation::time::Time;
use scene::{InsertionParams, KeyPress, KeyboardSink, MeasurementReport, NativeMeasuringTool};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PointCloudMeasureConfig;
use crate::session::Notifier;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointCloudMode {
    Point,
    Distance,
    Area,
}

impl PointCloudMode {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "point" => Some(PointCloudMode::Point),
            "distance" | "line" => Some(PointCloudMode::Distance),
            "area" => Some(PointCloudMode::Area),
            _ => None,
        }
    }

    pub fn insertion_params(self) -> InsertionParams {
        match self {
            PointCloudMode::Point => InsertionParams {
                name: "Point",
                show_coordinates: true,
                max_markers: Some(1),
                ..InsertionParams::default()
            },
            PointCloudMode::Distance => InsertionParams {
                name: "Distance",
                show_distances: true,
                ..InsertionParams::default()
            },
            PointCloudMode::Area => InsertionParams {
                name: "Area",
                show_distances: true,
                show_area: true,
                closed: true,
                ..InsertionParams::default()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PointCloudMeasureEvent {
    Started(PointCloudMode),
    Completed {
        mode: Option<PointCloudMode>,
        report: MeasurementReport,
    },
    Restarted(PointCloudMode),
}

#[derive(Debug)]
pub struct PointCloudMeasurement {
    config: PointCloudMeasureConfig,
    continuous: bool,
    active: Option<PointCloudMode>,
    active_button: Option<String>,
    restart_at: Option<Time>,
    events: Notifier<PointCloudMeasureEvent>,
}

impl Default for PointCloudMeasurement {
    fn default() -> Self {
        Self::new(PointCloudMeasureConfig::default())
    }
}

impl PointCloudMeasurement {
    pub fn new(config: PointCloudMeasureConfig) -> Self {
        Self {
            continuous: config.continuous,
            config,
            active: None,
            active_button: None,
            restart_at: None,
            events: Notifier::default(),
        }
    }

    pub fn config(&self) -> &PointCloudMeasureConfig {
        &self.config
    }

    pub fn active_mode(&self) -> Option<PointCloudMode> {
        self.active
    }

    /// Id of the highlighted button, if any.
    pub fn active_button(&self) -> Option<&str> {
        self.active_button.as_deref()
    }

    pub fn restart_pending(&self) -> bool {
        self.restart_at.is_some()
    }

    pub fn set_continuous(&mut self, enabled: bool) {
        self.continuous = enabled;
    }

    pub fn is_continuous(&self) -> bool {
        self.continuous
    }

    pub fn set_listener(&mut self, listener: impl FnMut(&PointCloudMeasureEvent) + 'static) {
        self.events.set_listener(listener);
    }

    pub fn drain_events(&mut self) -> Vec<PointCloudMeasureEvent> {
        self.events.drain()
    }

    pub fn button_id(&self, mode: PointCloudMode) -> &str {
        let buttons = &self.config.buttons;
        match mode {
            PointCloudMode::Point => &buttons.point,
            PointCloudMode::Distance => &buttons.distance,
            PointCloudMode::Area => &buttons.area,
        }
    }

    /// Which mode a button id starts, if it is one of the mode buttons.
    pub fn mode_for_button(&self, id: &str) -> Option<PointCloudMode> {
        [PointCloudMode::Point, PointCloudMode::Distance, PointCloudMode::Area]
            .into_iter()
            .find(|mode| self.button_id(*mode) == id)
    }

    pub fn start<T: NativeMeasuringTool + ?Sized>(&mut self, tool: &mut T, mode: PointCloudMode) {
        self.active = Some(mode);
        self.restart_at = None;
        tool.start_insertion(&mode.insertion_params());
        debug!(?mode, "point cloud insertion started");
    }

    /// Mode button pressed: highlight it, announce and start.
    pub fn press<T: NativeMeasuringTool + ?Sized>(&mut self, tool: &mut T, mode: PointCloudMode) {
        self.active_button = Some(self.button_id(mode).to_string());
        self.events.emit(PointCloudMeasureEvent::Started(mode));
        self.start(tool, mode);
    }

    /// Completion reported by the native tool at host time `now`.
    pub fn on_measurement_finished(&mut self, report: MeasurementReport, now: Time) {
        debug!(name = %report.name, points = report.points.len(), "point cloud measurement finished");
        self.events.emit(PointCloudMeasureEvent::Completed {
            mode: self.active,
            report,
        });
        if self.continuous && self.active.is_some() {
            self.restart_at = Some(Time(now.0 + self.config.restart_delay_ms / 1000.0));
        } else {
            self.active_button = None;
            self.active = None;
        }
    }

    /// Fires a due continuous restart. Returns whether one was started.
    pub fn poll<T: NativeMeasuringTool + ?Sized>(&mut self, tool: &mut T, now: Time) -> bool {
        let (Some(at), Some(mode)) = (self.restart_at, self.active) else {
            return false;
        };
        if now < at {
            return false;
        }
        self.start(tool, mode);
        self.events.emit(PointCloudMeasureEvent::Restarted(mode));
        true
    }

    /// Cancels insertion the way a user would, with an Escape key press.
    pub fn stop<K: KeyboardSink + ?Sized>(&mut self, keyboard: &mut K) {
        keyboard.dispatch_key_down(KeyPress::ESCAPE);
        self.reset();
    }

    pub fn clear_all<T: NativeMeasuringTool + ?Sized>(&mut self, tool: &mut T) {
        tool.remove_all_measurements();
        self.reset();
    }

    pub fn destroy<T: NativeMeasuringTool + ?Sized>(&mut self, tool: &mut T) {
        self.clear_all(tool);
        self.events.clear_listener();
    }

    fn reset(&mut self) {
        self.active_button = None;
        self.active = None;
        self.restart_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::math::Vec3;
    use pretty_assertions::assert_eq;
    use scene::headless::HeadlessPointCloud;

    fn report() -> MeasurementReport {
        MeasurementReport {
            name: "Distance".to_string(),
            points: vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)],
        }
    }

    #[test]
    fn modes_map_to_insertion_flags() {
        let point = PointCloudMode::Point.insertion_params();
        assert_eq!(point.max_markers, Some(1));
        assert!(point.show_coordinates && !point.show_distances && !point.closed);

        let distance = PointCloudMode::Distance.insertion_params();
        assert!(distance.show_distances && !distance.show_area && !distance.closed);

        let area = PointCloudMode::Area.insertion_params();
        assert!(area.show_distances && area.show_area && area.closed);
        assert!(!area.show_angles);
    }

    #[test]
    fn press_highlights_and_starts() {
        let mut pc = HeadlessPointCloud::new();
        let mut m = PointCloudMeasurement::default();
        m.press(&mut pc, PointCloudMode::Area);
        assert_eq!(m.active_button(), Some("btn-measure-area"));
        assert_eq!(pc.insertions.len(), 1);
        assert_eq!(pc.insertions[0].name, "Area");
        assert_eq!(m.drain_events(), vec![PointCloudMeasureEvent::Started(PointCloudMode::Area)]);
    }

    #[test]
    fn single_shot_completion_clears_state() {
        let mut pc = HeadlessPointCloud::new();
        let mut m = PointCloudMeasurement::default();
        m.press(&mut pc, PointCloudMode::Distance);
        m.on_measurement_finished(report(), Time(1.0));
        assert_eq!(m.active_mode(), None);
        assert_eq!(m.active_button(), None);
        assert!(!m.poll(&mut pc, Time(5.0)));
        assert_eq!(pc.insertions.len(), 1);
    }

    #[test]
    fn continuous_restarts_after_delay() {
        let mut pc = HeadlessPointCloud::new();
        let mut m = PointCloudMeasurement::default();
        m.set_continuous(true);
        m.press(&mut pc, PointCloudMode::Distance);
        m.on_measurement_finished(report(), Time(1.0));

        assert!(m.restart_pending());
        assert!(!m.poll(&mut pc, Time(1.1)));
        assert!(m.poll(&mut pc, Time(1.25)));
        assert!(!m.restart_pending());
        assert_eq!(pc.insertions.len(), 2);
        assert_eq!(pc.insertions[1], PointCloudMode::Distance.insertion_params());
        assert_eq!(m.active_button(), Some("btn-measure-distance"));
    }

    #[test]
    fn stop_sends_escape_and_cancels_restart() {
        let mut pc = HeadlessPointCloud::new();
        let mut m = PointCloudMeasurement::default();
        m.set_continuous(true);
        m.press(&mut pc, PointCloudMode::Point);
        m.on_measurement_finished(report(), Time(0.0));
        m.stop(&mut pc);

        assert_eq!(pc.dispatched_keys, vec![KeyPress::ESCAPE]);
        assert_eq!(pc.dispatched_keys[0].key_code, 27);
        assert!(!m.poll(&mut pc, Time(10.0)));
        assert_eq!(m.active_button(), None);
    }

    #[test]
    fn clear_all_removes_native_measurements() {
        let mut pc = HeadlessPointCloud::new();
        let mut m = PointCloudMeasurement::default();
        m.press(&mut pc, PointCloudMode::Point);
        m.clear_all(&mut pc);
        assert_eq!(pc.remove_all_count, 1);
        assert_eq!(m.active_mode(), None);
    }

    #[test]
    fn buttons_resolve_to_modes() {
        let m = PointCloudMeasurement::default();
        assert_eq!(m.mode_for_button("btn-measure-distance"), Some(PointCloudMode::Distance));
        assert_eq!(m.mode_for_button("btn-measure-stop"), None);
    }
}
