use std::fmt;

#[derive(Debug)]
pub enum DatasetError {
    Parse(serde_json::Error),
    MissingTransform,
    InvalidTransform { len: usize },
    MissingSrsOrigin,
    InvalidSrsOrigin { text: String },
    Fetch { url: String, reason: String },
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetError::Parse(err) => write!(f, "Tileset parse error: {err}"),
            DatasetError::MissingTransform => write!(f, "No root.transform in tileset.json"),
            DatasetError::InvalidTransform { len } => {
                write!(f, "root.transform needs 16 finite numbers, found {len}")
            }
            DatasetError::MissingSrsOrigin => write!(f, "No SRSOrigin in metadata.xml"),
            DatasetError::InvalidSrsOrigin { text } => {
                write!(f, "Invalid SRSOrigin format: {text:?}")
            }
            DatasetError::Fetch { url, reason } => write!(f, "Failed to fetch {url}: {reason}"),
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatasetError::Parse(err) => Some(err),
            _ => None,
        }
    }
}
