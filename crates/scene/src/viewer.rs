use foundation::time::Time;

use crate::camera::{GlobeCamera, PointCloudCamera, PointCloudView};
use crate::input::DefaultInputActions;
use crate::picking::Picker;
use crate::point_cloud::NavigationControls;
use crate::world::EntityStore;

pub trait Render {
    fn render(&mut self);
}

/// Per-frame engine update ahead of rendering.
pub trait FrameUpdate {
    fn update(&mut self, dt_s: f64, timestamp: Time);
}

/// Everything the sync loop, measurement and roaming need from a globe renderer.
pub trait GlobeViewer: GlobeCamera + EntityStore + Picker + DefaultInputActions + Render {}

impl<T> GlobeViewer for T where T: GlobeCamera + EntityStore + Picker + DefaultInputActions + Render {}

/// Everything the sync loop and roaming need from a point-cloud renderer.
pub trait PointCloudViewer:
    PointCloudCamera + PointCloudView + NavigationControls + FrameUpdate + Render
{
}

impl<T> PointCloudViewer for T where
    T: PointCloudCamera + PointCloudView + NavigationControls + FrameUpdate + Render
{
}
