use foundation::math::Mat4;
use serde::Deserialize;

use crate::error::DatasetError;

pub const TILESET_FILE_NAME: &str = "tileset.json";

#[derive(Debug, Clone, Deserialize, PartialEq)]
struct Tileset {
    #[serde(default)]
    root: Option<TileRoot>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
struct TileRoot {
    #[serde(default)]
    transform: Option<Vec<f64>>,
}

/// Reads the column-major `root.transform` of a 3D Tiles tileset.
pub fn parse_root_transform(json: &str) -> Result<Mat4, DatasetError> {
    let tileset: Tileset = serde_json::from_str(json).map_err(DatasetError::Parse)?;
    let values = tileset
        .root
        .and_then(|root| root.transform)
        .ok_or(DatasetError::MissingTransform)?;
    Mat4::from_slice(&values).ok_or(DatasetError::InvalidTransform { len: values.len() })
}
