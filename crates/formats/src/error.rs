#[derive(Debug)]
pub enum FormatError {
    Json(serde_json::Error),
    MissingBoundingVolume,
    TileSize { expected: usize, actual: usize },
    InvalidTileset(String),
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatError::Json(e) => write!(f, "invalid json: {e}"),
            FormatError::MissingBoundingVolume => {
                write!(f, "tileset root has no usable bounding volume")
            }
            FormatError::TileSize { expected, actual } => {
                write!(f, "terrain tile has {actual} bytes, expected {expected}")
            }
            FormatError::InvalidTileset(reason) => write!(f, "invalid terrain tileset: {reason}"),
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormatError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for FormatError {
    fn from(e: serde_json::Error) -> Self {
        FormatError::Json(e)
    }
}
