use measure::{GlobeMeasureConfig, PointCloudMeasureConfig};
use navigation::{FlightParams, GlobeRoamingConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Start the sync loop as soon as a dataset frame resolves.
    pub auto_start: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { auto_start: true }
    }
}

/// Page-supplied settings. Every field is optional in the JSON document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub measure: GlobeMeasureConfig,
    pub point_cloud_measure: PointCloudMeasureConfig,
    pub globe_roaming: GlobeRoamingConfig,
    pub point_cloud_roaming: FlightParams,
    pub sync: SyncConfig,
}

impl ViewerConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(ViewerConfig::from_json("").ok(), Some(ViewerConfig::default()));
        assert_eq!(ViewerConfig::from_json("{}").ok(), Some(ViewerConfig::default()));
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = ViewerConfig::from_json(
            r#"{
                "globe_roaming": { "move_speed": 2.5 },
                "point_cloud_measure": { "continuous": true },
                "sync": { "auto_start": false }
            }"#,
        )
        .unwrap();
        assert_eq!(config.globe_roaming.move_speed, 2.5);
        assert_eq!(config.globe_roaming.rotate_speed_deg, 1.0);
        assert!(config.point_cloud_measure.continuous);
        assert_eq!(config.point_cloud_measure.restart_delay_ms, 200.0);
        assert_eq!(config.point_cloud_measure.buttons.point, "btn-measure-point");
        assert_eq!(config.point_cloud_roaming, FlightParams::default());
        assert!(!config.sync.auto_start);
    }

    #[test]
    fn measurement_styles_are_overridable() {
        let config =
            ViewerConfig::from_json(r#"{ "measure": { "styles": { "line": { "width": 5.0 } } } }"#).unwrap();
        assert_eq!(config.measure.styles.line.width, 5.0);
        assert_eq!(config.measure.styles.point.pixel_size, 10.0);
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(ViewerConfig::from_json("{ not json").is_err());
    }
}
