use foundation::math::Vec2;
use scene::{AreaStyle, LabelStyle, LineStyle, PointStyle};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasureStyles {
    pub point: PointStyle,
    pub line: LineStyle,
    pub area: AreaStyle,
    pub label: LabelStyle,
    /// Offset of running-total labels, above the regular label offset.
    pub total_label_offset: Vec2,
}

impl Default for MeasureStyles {
    fn default() -> Self {
        Self {
            point: PointStyle::default(),
            line: LineStyle::default(),
            area: AreaStyle::default(),
            label: LabelStyle::default(),
            total_label_offset: Vec2::new(0.0, -30.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeMeasureConfig {
    pub continuous: bool,
    pub styles: MeasureStyles,
}

/// DOM ids of the point-cloud measurement controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasureButtons {
    pub point: String,
    pub distance: String,
    pub area: String,
    pub clear: String,
    pub stop: String,
    pub continuous_checkbox: String,
}

impl Default for MeasureButtons {
    fn default() -> Self {
        Self {
            point: "btn-measure-point".to_string(),
            distance: "btn-measure-distance".to_string(),
            area: "btn-measure-area".to_string(),
            clear: "btn-measure-clear".to_string(),
            stop: "btn-measure-stop".to_string(),
            continuous_checkbox: "chk-continuous-measure".to_string(),
        }
    }
}

impl MeasureButtons {
    /// Buttons that carry the active highlight.
    pub fn highlightable(&self) -> [&str; 4] {
        [&self.point, &self.distance, &self.area, &self.stop]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointCloudMeasureConfig {
    pub continuous: bool,
    /// Delay before a continuous measurement re-arms.
    pub restart_delay_ms: f64,
    pub buttons: MeasureButtons,
}

impl Default for PointCloudMeasureConfig {
    fn default() -> Self {
        Self {
            continuous: false,
            restart_delay_ms: 200.0,
            buttons: MeasureButtons::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg: PointCloudMeasureConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, PointCloudMeasureConfig::default());
        assert_eq!(cfg.buttons.highlightable()[3], "btn-measure-stop");
    }

    #[test]
    fn nested_overrides_keep_sibling_defaults() {
        let cfg: GlobeMeasureConfig = serde_json::from_str(
            r#"{ "continuous": true, "styles": { "line": { "width": 5.0 } } }"#,
        )
        .unwrap();
        assert!(cfg.continuous);
        assert_eq!(cfg.styles.line.width, 5.0);
        assert_eq!(cfg.styles.point, PointStyle::default());
        assert_eq!(cfg.styles.total_label_offset, Vec2::new(0.0, -30.0));
    }
}
