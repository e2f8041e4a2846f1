use foundation::math::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureMode {
    Point,
    Line,
    Area,
}

impl MeasureMode {
    /// Accepts `"distance"` as an alias of `"line"`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "point" => Some(MeasureMode::Point),
            "line" | "distance" => Some(MeasureMode::Line),
            "area" => Some(MeasureMode::Area),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MeasureMode::Point => "point",
            MeasureMode::Line => "line",
            MeasureMode::Area => "area",
        }
    }

    /// Captured positions a finished measurement needs.
    pub fn min_points(self) -> usize {
        match self {
            MeasureMode::Point => 1,
            MeasureMode::Line => 2,
            MeasureMode::Area => 3,
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            MeasureMode::Point => "Click to measure a position and height",
            MeasureMode::Line => "Click to add line vertices; double-click or right-click to finish",
            MeasureMode::Area => "Click to add polygon vertices; double-click or right-click to finish",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MeasuredValue {
    None,
    Distance(f64),
    Area(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedMeasurement {
    pub mode: MeasureMode,
    pub positions: Vec<Vec3>,
    pub value: MeasuredValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MeasurementEvent {
    Started { mode: MeasureMode },
    PointCaptured { mode: MeasureMode, position: Vec3, count: usize },
    Completed(CompletedMeasurement),
    Stopped { mode: MeasureMode },
}

/// Queue of emitted events plus an optional synchronous observer.
///
/// The observer sees every event as it is emitted; the queue keeps them until
/// drained.
pub struct Notifier<E> {
    queue: Vec<E>,
    listener: Option<Box<dyn FnMut(&E)>>,
}

impl<E> Default for Notifier<E> {
    fn default() -> Self {
        Self {
            queue: Vec::new(),
            listener: None,
        }
    }
}

impl<E: std::fmt::Debug> std::fmt::Debug for Notifier<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("queue", &self.queue)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl<E> Notifier<E> {
    pub fn emit(&mut self, event: E) {
        if let Some(listener) = self.listener.as_mut() {
            listener(&event);
        }
        self.queue.push(event);
    }

    pub fn set_listener(&mut self, listener: impl FnMut(&E) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    pub fn drain(&mut self) -> Vec<E> {
        std::mem::take(&mut self.queue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn parse_accepts_distance_alias() {
        assert_eq!(MeasureMode::parse("distance"), Some(MeasureMode::Line));
        assert_eq!(MeasureMode::parse("line"), Some(MeasureMode::Line));
        assert_eq!(MeasureMode::parse("volume"), None);
        assert_eq!(MeasureMode::Area.min_points(), 3);
    }

    #[test]
    fn listener_sees_events_and_queue_keeps_them() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut n = Notifier::default();
        n.set_listener(move |e: &MeasurementEvent| sink.borrow_mut().push(e.clone()));
        n.emit(MeasurementEvent::Started {
            mode: MeasureMode::Point,
        });
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(n.drain().len(), 1);
        assert!(n.drain().is_empty());
    }

    #[test]
    fn completion_serializes_mode_and_value() {
        let event = MeasurementEvent::Completed(CompletedMeasurement {
            mode: MeasureMode::Line,
            positions: vec![],
            value: MeasuredValue::Distance(12.5),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "completed");
        assert_eq!(json["mode"], "line");
        assert_eq!(json["value"]["kind"], "distance");
        assert_eq!(json["value"]["value"], 12.5);
    }
}
