use foundation::math::{Mat4, Vec3};
use tracing::{info, warn};

use crate::error::DatasetError;
use crate::metadata::{METADATA_FILE_NAME, parse_srs_origin};
use crate::tileset::{TILESET_FILE_NAME, parse_root_transform};

/// Locations of the two documents describing a tiled dataset's frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetUrls {
    pub tileset: String,
    pub metadata: String,
}

impl DatasetUrls {
    pub fn from_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            tileset: format!("{base}/{TILESET_FILE_NAME}"),
            metadata: format!("{base}/{METADATA_FILE_NAME}"),
        }
    }
}

/// Local-to-geocentric frame of a dataset, as far as it could be resolved.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct DatasetFrame {
    pub transform: Option<Mat4>,
    pub origin: Option<Vec3>,
}

impl DatasetFrame {
    /// Resolves whatever the fetched documents provide.
    ///
    /// Each missing or malformed piece is logged and left as `None`.
    pub fn from_documents(
        tileset: Result<&str, DatasetError>,
        metadata: Result<&str, DatasetError>,
    ) -> Self {
        let transform = match tileset.and_then(parse_root_transform) {
            Ok(m) => {
                info!(translation = ?m.translation(), "transform matrix loaded");
                Some(m)
            }
            Err(err) => {
                warn!(%err, "transform matrix unavailable");
                None
            }
        };
        let origin = match metadata.and_then(parse_srs_origin) {
            Ok(o) => {
                info!(origin = ?o, "SRS origin loaded");
                Some(o)
            }
            Err(err) => {
                warn!(%err, "SRS origin unavailable");
                None
            }
        };
        let frame = Self { transform, origin };
        if !frame.is_complete() {
            warn!("dataset frame incomplete; camera sync stays off");
        }
        frame
    }

    /// Both halves present.
    pub fn is_complete(&self) -> bool {
        self.transform.is_some() && self.origin.is_some()
    }

    pub fn parts(&self) -> Option<(Mat4, Vec3)> {
        Some((self.transform?, self.origin?))
    }
}
