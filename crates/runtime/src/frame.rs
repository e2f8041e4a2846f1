use foundation::time::Time;

/// Frame metadata handed to every frame task.
///
/// Frames are either produced on a fixed step (`new`/`next`, replayable) or
/// from host animation-frame timestamps (`first_at`/`next_at`).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Seconds since the previous frame.
    pub dt_s: f64,
    /// Time at the start of the frame (seconds).
    pub time: Time,
}

impl Frame {
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            time: Time(index as f64 * dt_s),
        }
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1, self.dt_s)
    }

    /// First frame observed at a host timestamp.
    pub fn first_at(time: Time) -> Self {
        Self {
            index: 0,
            dt_s: 0.0,
            time,
        }
    }

    /// Frame following `self` at a host timestamp; `dt_s` never goes negative.
    pub fn next_at(self, time: Time) -> Self {
        Self {
            index: self.index + 1,
            dt_s: time.since(self.time),
            time,
        }
    }
}
