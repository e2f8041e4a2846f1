//! Point-cloud renderer capabilities beyond the camera.

use foundation::math::Vec3;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ControlsMode {
    /// Orbit around the pivot.
    #[default]
    Earth,
    FirstPerson,
}

pub trait NavigationControls {
    fn controls(&self) -> ControlsMode;
    fn set_controls(&mut self, mode: ControlsMode);
}

/// Flags passed to the native measuring tool when insertion starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertionParams {
    pub name: &'static str,
    pub show_distances: bool,
    pub show_area: bool,
    pub show_coordinates: bool,
    pub show_angles: bool,
    pub closed: bool,
    pub max_markers: Option<u32>,
}

impl Default for InsertionParams {
    fn default() -> Self {
        Self {
            name: "",
            show_distances: false,
            show_area: false,
            show_coordinates: false,
            show_angles: false,
            closed: false,
            max_markers: None,
        }
    }
}

/// What the native tool reports when an insertion completes.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementReport {
    pub name: String,
    pub points: Vec<Vec3>,
}

pub trait NativeMeasuringTool {
    fn start_insertion(&mut self, params: &InsertionParams);
    fn remove_all_measurements(&mut self);
}
