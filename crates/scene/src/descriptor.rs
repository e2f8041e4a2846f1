//! Renderable descriptions handed to a globe's entity collection.
//!
//! Colors are straight RGBA in `0..=1`. Positions are geocentric meters.

use foundation::math::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::entity::EntityCategory;

pub type Rgba = [f32; 4];

pub const RED: Rgba = [1.0, 0.0, 0.0, 1.0];
pub const WHITE: Rgba = [1.0, 1.0, 1.0, 1.0];
pub const BLACK: Rgba = [0.0, 0.0, 0.0, 1.0];
pub const YELLOW: Rgba = [1.0, 1.0, 0.0, 1.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointStyle {
    pub pixel_size: f32,
    pub color: Rgba,
    pub outline_color: Rgba,
    pub outline_width: f32,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            pixel_size: 10.0,
            color: RED,
            outline_color: WHITE,
            outline_width: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineStyle {
    pub width: f32,
    pub color: Rgba,
    pub clamp_to_ground: bool,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            width: 3.0,
            color: YELLOW,
            clamp_to_ground: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaStyle {
    pub fill_color: Rgba,
    pub outline: bool,
    pub outline_color: Rgba,
    pub outline_width: f32,
}

impl Default for AreaStyle {
    fn default() -> Self {
        Self {
            fill_color: [1.0, 1.0, 0.0, 0.4],
            outline: true,
            outline_color: YELLOW,
            outline_width: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelStyle {
    pub font: String,
    pub fill_color: Rgba,
    pub outline_color: Rgba,
    pub outline_width: f32,
    pub pixel_offset: Vec2,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font: "14px sans-serif".to_string(),
            fill_color: WHITE,
            outline_color: BLACK,
            outline_width: 2.0,
            pixel_offset: Vec2::new(0.0, -10.0),
        }
    }
}

impl LabelStyle {
    pub fn with_offset(&self, pixel_offset: Vec2) -> Self {
        Self {
            pixel_offset,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntityDescriptor {
    Point {
        position: Vec3,
        style: PointStyle,
        label: Option<(String, LabelStyle)>,
    },
    Label {
        position: Vec3,
        text: String,
        style: LabelStyle,
    },
    Polyline {
        positions: Vec<Vec3>,
        style: LineStyle,
    },
    /// Filled polygon; `outline` is the closed ring drawn around it.
    Polygon {
        positions: Vec<Vec3>,
        outline: Vec<Vec3>,
        fill: AreaStyle,
        line: LineStyle,
    },
}

impl EntityDescriptor {
    pub fn category(&self) -> EntityCategory {
        match self {
            EntityDescriptor::Point { .. } => EntityCategory::Point,
            EntityDescriptor::Label { .. } => EntityCategory::Label,
            EntityDescriptor::Polyline { .. } => EntityCategory::Line,
            EntityDescriptor::Polygon { .. } => EntityCategory::Area,
        }
    }

    /// Text carried by a label or labeled point.
    pub fn text(&self) -> Option<&str> {
        match self {
            EntityDescriptor::Point {
                label: Some((text, _)),
                ..
            } => Some(text),
            EntityDescriptor::Label { text, .. } => Some(text),
            _ => None,
        }
    }
}
