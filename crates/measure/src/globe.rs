//! Click-driven point / line / area measurement on a globe renderer.
//!
//! States are `idle` and `capturing(mode)`. Clicks capture picked positions,
//! pointer moves redraw a preview through the cursor, double- or right-click
//! finishes line and area measurements once they have enough vertices.

use foundation::geometry::{close_ring, midpoint, polygon_area, polygon_centroid, polyline_length};
use foundation::math::{Vec2, Vec3};
use scene::{
    DefaultInputActions, EntityCategory, EntityDescriptor, EntityId, EntityStore, Picker,
    ScreenEvent, resolve_pick,
};
use tracing::debug;

use crate::config::{GlobeMeasureConfig, MeasureStyles};
use crate::labels::{area_text, format_distance, position_text, total_distance_text};
use crate::session::{CompletedMeasurement, MeasureMode, MeasuredValue, MeasurementEvent, Notifier};

/// Globe capabilities measurement needs.
pub trait MeasureHost: EntityStore + Picker + DefaultInputActions {}

impl<T> MeasureHost for T where T: EntityStore + Picker + DefaultInputActions + ?Sized {}

/// Entities of finished measurements, by what they draw.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FinishedEntities {
    pub points: Vec<EntityId>,
    pub lines: Vec<EntityId>,
    pub areas: Vec<EntityId>,
    pub labels: Vec<EntityId>,
}

impl FinishedEntities {
    fn bucket_mut(&mut self, category: EntityCategory) -> &mut Vec<EntityId> {
        match category {
            EntityCategory::Point => &mut self.points,
            EntityCategory::Line => &mut self.lines,
            EntityCategory::Area => &mut self.areas,
            EntityCategory::Label => &mut self.labels,
        }
    }

    pub fn get(&self, category: EntityCategory) -> &[EntityId] {
        match category {
            EntityCategory::Point => &self.points,
            EntityCategory::Line => &self.lines,
            EntityCategory::Area => &self.areas,
            EntityCategory::Label => &self.labels,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len() + self.lines.len() + self.areas.len() + self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn take_all(&mut self) -> Vec<EntityId> {
        let mut all = std::mem::take(&mut self.points);
        all.append(&mut self.lines);
        all.append(&mut self.areas);
        all.append(&mut self.labels);
        all
    }
}

#[derive(Debug)]
struct Capture {
    mode: MeasureMode,
    positions: Vec<Vec3>,
    previews: Vec<EntityId>,
}

impl Capture {
    fn new(mode: MeasureMode) -> Self {
        Self {
            mode,
            positions: Vec::new(),
            previews: Vec::new(),
        }
    }

    fn clear_previews<H: EntityStore + ?Sized>(&mut self, host: &mut H) {
        host.remove_all(&self.previews);
        self.previews.clear();
    }
}

fn label(styles: &MeasureStyles, position: Vec3, text: String) -> EntityDescriptor {
    EntityDescriptor::Label {
        position,
        text,
        style: styles.label.clone(),
    }
}

/// Polyline along `path`, a label on its last segment and, past two vertices,
/// the running total at the end of the path.
fn line_entities(styles: &MeasureStyles, path: &[Vec3]) -> Vec<EntityDescriptor> {
    let [.., a, b] = path else {
        return Vec::new();
    };
    let mut out = vec![
        EntityDescriptor::Polyline {
            positions: path.to_vec(),
            style: styles.line.clone(),
        },
        label(styles, midpoint(*a, *b), format_distance(a.distance(*b))),
    ];
    if path.len() > 2 {
        out.push(EntityDescriptor::Label {
            position: *b,
            text: total_distance_text(polyline_length(path)),
            style: styles.label.with_offset(styles.total_label_offset),
        });
    }
    out
}

/// Filled polygon with a closed outline and the area label at the vertex mean.
fn area_entities(styles: &MeasureStyles, path: &[Vec3]) -> Vec<EntityDescriptor> {
    if path.len() < 3 {
        return Vec::new();
    }
    let mut out = vec![EntityDescriptor::Polygon {
        positions: path.to_vec(),
        outline: close_ring(path),
        fill: styles.area.clone(),
        line: styles.line.clone(),
    }];
    if let Some(centroid) = polygon_centroid(path) {
        out.push(label(styles, centroid, area_text(polygon_area(path))));
    }
    out
}

fn shape_entities(styles: &MeasureStyles, mode: MeasureMode, path: &[Vec3]) -> Vec<EntityDescriptor> {
    match mode {
        MeasureMode::Point => Vec::new(),
        MeasureMode::Line => line_entities(styles, path),
        MeasureMode::Area => area_entities(styles, path),
    }
}

#[derive(Debug)]
pub struct GlobeMeasurement {
    styles: MeasureStyles,
    continuous: bool,
    capture: Option<Capture>,
    finished: FinishedEntities,
    events: Notifier<MeasurementEvent>,
}

impl Default for GlobeMeasurement {
    fn default() -> Self {
        Self::new(GlobeMeasureConfig::default())
    }
}

impl GlobeMeasurement {
    pub fn new(config: GlobeMeasureConfig) -> Self {
        Self {
            styles: config.styles,
            continuous: config.continuous,
            capture: None,
            finished: FinishedEntities::default(),
            events: Notifier::default(),
        }
    }

    pub fn mode(&self) -> Option<MeasureMode> {
        self.capture.as_ref().map(|c| c.mode)
    }

    pub fn is_measuring(&self) -> bool {
        self.capture.is_some()
    }

    pub fn captured_positions(&self) -> &[Vec3] {
        self.capture.as_ref().map_or(&[], |c| &c.positions)
    }

    pub fn preview_entities(&self) -> &[EntityId] {
        self.capture.as_ref().map_or(&[], |c| &c.previews)
    }

    pub fn finished(&self) -> &FinishedEntities {
        &self.finished
    }

    pub fn set_continuous(&mut self, enabled: bool) {
        self.continuous = enabled;
    }

    pub fn is_continuous(&self) -> bool {
        self.continuous
    }

    pub fn set_listener(&mut self, listener: impl FnMut(&MeasurementEvent) + 'static) {
        self.events.set_listener(listener);
    }

    pub fn drain_events(&mut self) -> Vec<MeasurementEvent> {
        self.events.drain()
    }

    /// Stops any running session and starts capturing `mode`. Returns an operator hint.
    pub fn start<H: MeasureHost + ?Sized>(&mut self, host: &mut H, mode: MeasureMode) -> &'static str {
        self.stop(host);
        host.suppress_default_double_click();
        self.capture = Some(Capture::new(mode));
        debug!(mode = mode.as_str(), "measurement started");
        self.events.emit(MeasurementEvent::Started { mode });
        mode.hint()
    }

    /// Routes a pointer event; returns whether it changed the measurement.
    pub fn handle_event<H: MeasureHost + ?Sized>(&mut self, host: &mut H, event: ScreenEvent) -> bool {
        match event {
            ScreenEvent::LeftClick(screen) => self.on_click(host, screen),
            ScreenEvent::MouseMove { end } => self.on_move(host, end),
            ScreenEvent::LeftDoubleClick(_) | ScreenEvent::RightClick(_) => self.try_finish(host),
        }
    }

    pub fn on_click<H: MeasureHost + ?Sized>(&mut self, host: &mut H, screen: Vec2) -> bool {
        if self.capture.is_none() {
            return false;
        }
        let Some(hit) = resolve_pick(host, screen) else {
            debug!(x = screen.x, y = screen.y, "nothing picked; click ignored");
            return false;
        };
        let Some(capture) = self.capture.as_mut() else {
            return false;
        };
        capture.positions.push(hit.position);
        let mode = capture.mode;
        self.events.emit(MeasurementEvent::PointCaptured {
            mode,
            position: hit.position,
            count: capture.positions.len(),
        });

        match mode {
            MeasureMode::Point => {
                let id = host.add(EntityDescriptor::Point {
                    position: hit.position,
                    style: self.styles.point.clone(),
                    label: Some((position_text(hit.position), self.styles.label.clone())),
                });
                self.finished.points.push(id);
                // Continuous point capture keeps collecting until stopped.
                if !self.continuous {
                    self.finalize(host);
                }
            }
            MeasureMode::Line | MeasureMode::Area => {
                if capture.positions.len() >= mode.min_points() {
                    capture.clear_previews(host);
                    for d in shape_entities(&self.styles, mode, &capture.positions) {
                        capture.previews.push(host.add(d));
                    }
                }
            }
        }
        true
    }

    /// Redraws the preview through the cursor.
    pub fn on_move<H: MeasureHost + ?Sized>(&mut self, host: &mut H, screen: Vec2) -> bool {
        let Some(capture) = self.capture.as_ref() else {
            return false;
        };
        let needed = match capture.mode {
            MeasureMode::Point => return false,
            MeasureMode::Line => 1,
            MeasureMode::Area => 2,
        };
        if capture.positions.len() < needed {
            return false;
        }
        let Some(hit) = resolve_pick(host, screen) else {
            return false;
        };
        let Some(capture) = self.capture.as_mut() else {
            return false;
        };

        capture.clear_previews(host);
        let mut path = capture.positions.clone();
        path.push(hit.position);
        for d in shape_entities(&self.styles, capture.mode, &path) {
            capture.previews.push(host.add(d));
        }
        true
    }

    /// Double-click / right-click: finishes line and area measurements that
    /// have enough vertices.
    pub fn try_finish<H: MeasureHost + ?Sized>(&mut self, host: &mut H) -> bool {
        let ready = self.capture.as_ref().is_some_and(|c| {
            c.mode != MeasureMode::Point && c.positions.len() >= c.mode.min_points()
        });
        if ready {
            self.finalize(host);
        }
        ready
    }

    /// Commits the captured geometry, reports it and re-arms or goes idle.
    fn finalize<H: MeasureHost + ?Sized>(&mut self, host: &mut H) {
        let Some(mut capture) = self.capture.take() else {
            return;
        };
        let mode = capture.mode;
        capture.clear_previews(host);

        for d in shape_entities(&self.styles, mode, &capture.positions) {
            let category = d.category();
            let id = host.add(d);
            self.finished.bucket_mut(category).push(id);
        }

        let value = match mode {
            MeasureMode::Point => MeasuredValue::None,
            MeasureMode::Line => MeasuredValue::Distance(polyline_length(&capture.positions)),
            MeasureMode::Area => MeasuredValue::Area(polygon_area(&capture.positions)),
        };
        debug!(mode = mode.as_str(), ?value, "measurement finished");

        if self.continuous {
            self.capture = Some(Capture::new(mode));
        } else {
            host.restore_default_double_click();
        }
        self.events.emit(MeasurementEvent::Completed(CompletedMeasurement {
            mode,
            positions: capture.positions,
            value,
        }));
    }

    /// Drops the in-progress measurement; finished ones stay.
    pub fn stop<H: MeasureHost + ?Sized>(&mut self, host: &mut H) {
        if let Some(mut capture) = self.capture.take() {
            capture.clear_previews(host);
            debug!(mode = capture.mode.as_str(), "measurement stopped");
            self.events.emit(MeasurementEvent::Stopped { mode: capture.mode });
        }
        host.restore_default_double_click();
    }

    /// Stops and removes every finished measurement entity.
    pub fn clear_all<H: MeasureHost + ?Sized>(&mut self, host: &mut H) {
        self.stop(host);
        let ids = self.finished.take_all();
        host.remove_all(&ids);
    }

    pub fn destroy<H: MeasureHost + ?Sized>(&mut self, host: &mut H) {
        self.clear_all(host);
        self.events.clear_listener();
    }
}
