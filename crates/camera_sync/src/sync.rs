//! Per-frame point-cloud → globe camera synchronization.

use foundation::math::Vec3;
use runtime::{EventBus, Frame};
use scene::{GlobeCamera, GlobeViewer, PointCloudCamera, PointCloudView, PointCloudViewer};
use tracing::debug;

use crate::bridge::{CameraSample, CoordinateBridge};
use crate::fov::globe_fov_from_vertical;

pub const SYNC_EVENT_KIND: &str = "camera_sync";

/// Camera-local offset of the up reference point.
pub const UP_SAMPLE_OFFSET: Vec3 = Vec3 {
    x: 0.0,
    y: 600.0,
    z: 0.0,
};

/// Destination camera pose in the geocentric frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlobePose {
    pub position: Vec3,
    pub direction: Vec3,
    pub up: Vec3,
}

impl GlobePose {
    /// `None` when target or up point coincides with the position.
    pub fn from_sample(sample: &CameraSample) -> Option<Self> {
        let direction = (sample.target - sample.position).normalize()?;
        let up = (sample.up_point - sample.position).normalize()?;
        Some(Self {
            position: sample.position,
            direction,
            up,
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SyncOutcome {
    /// A viewer or the bridge is missing.
    Inactive,
    /// Zero-length direction/up or a failed transform; destination untouched.
    Degenerate,
    Updated(GlobePose),
}

impl SyncOutcome {
    fn label(&self) -> &'static str {
        match self {
            SyncOutcome::Inactive => "inactive",
            SyncOutcome::Degenerate => "degenerate",
            SyncOutcome::Updated(_) => "active",
        }
    }
}

/// Camera position, up point and orbit pivot of a point-cloud view.
pub fn sample_point_cloud<P>(source: &P) -> Option<CameraSample>
where
    P: PointCloudCamera + PointCloudView + ?Sized,
{
    let m = source.world_matrix()?;
    Some(CameraSample {
        position: m.transform_point(Vec3::ZERO)?,
        target: source.pivot(),
        up_point: m.transform_point(UP_SAMPLE_OFFSET)?,
    })
}

#[derive(Debug)]
pub struct CameraSync {
    bridge: CoordinateBridge,
    last: Option<&'static str>,
}

impl CameraSync {
    pub fn new(bridge: CoordinateBridge) -> Self {
        Self { bridge, last: None }
    }

    pub fn bridge(&self) -> &CoordinateBridge {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut CoordinateBridge {
        &mut self.bridge
    }

    /// Pushes the source pose into `dest` without rendering either side.
    pub fn sync<P, G>(&self, source: &P, dest: &mut G) -> SyncOutcome
    where
        P: PointCloudCamera + PointCloudView + ?Sized,
        G: GlobeCamera + ?Sized,
    {
        if !self.bridge.is_available() {
            return SyncOutcome::Inactive;
        }
        let Some(pose) = sample_point_cloud(source)
            .and_then(|s| self.bridge.transform_sample(s))
            .and_then(|s| GlobePose::from_sample(&s))
        else {
            return SyncOutcome::Degenerate;
        };

        dest.set_view(pose.position, pose.direction, pose.up);
        dest.set_fov(globe_fov_from_vertical(source.fov_deg(), source.aspect()));
        SyncOutcome::Updated(pose)
    }

    /// One animation frame: source update and render, sync, destination render.
    ///
    /// Missing viewers make the tick a no-op; the caller keeps it scheduled.
    pub fn tick<P, G>(
        &mut self,
        frame: Frame,
        source: Option<&mut P>,
        dest: Option<&mut G>,
        bus: &mut EventBus,
    ) -> SyncOutcome
    where
        P: PointCloudViewer + ?Sized,
        G: GlobeViewer + ?Sized,
    {
        let outcome = match (source, dest) {
            (Some(source), Some(dest)) => {
                source.update(frame.dt_s, frame.time);
                source.render();
                let outcome = self.sync(&*source, &mut *dest);
                if matches!(outcome, SyncOutcome::Updated(_)) {
                    dest.render();
                }
                outcome
            }
            _ => SyncOutcome::Inactive,
        };

        let label = outcome.label();
        if self.last != Some(label) {
            debug!(frame = frame.index, state = label, "camera sync state changed");
            bus.emit(frame, SYNC_EVENT_KIND, label);
            self.last = Some(label);
        }
        outcome
    }
}
