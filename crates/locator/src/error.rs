use thiserror::Error;

/// Startup-fatal failures. Everything else degrades to a log line.
#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("config.json could not be loaded: {0}")]
    ConfigUnavailable(String),
    #[error("config.json is invalid: {0}")]
    ConfigInvalid(#[from] serde_json::Error),
}

/// Failure to fetch a remote asset (tileset manifest, terrain metadata or tile).
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("{url} answered HTTP {status}")]
    Http { url: String, status: u16 },
    #[error("request failed: {0}")]
    Transport(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure inside the globe collaborator.
#[derive(Debug, Error)]
pub enum GlobeError {
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Format(#[from] formats::FormatError),
    #[error("{0}")]
    Unavailable(String),
}

/// Failure reported by the device location capability.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct GeolocationError {
    pub code: crate::geolocation::GeolocationErrorCode,
    pub message: String,
}

impl GeolocationError {
    pub fn new(code: crate::geolocation::GeolocationErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
