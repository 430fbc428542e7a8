use thiserror::Error;

/// Errors that can occur while loading the compatibility snapshot
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Snapshot file could not be read
    #[error("I/O error: {0}")]
    Io(String),

    /// Snapshot content is not a valid layer compatibility document
    #[error("Malformed snapshot: {0}")]
    Malformed(String),
}

/// Reasons a layer cannot be requested from the tile service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnsupportedLayer {
    /// Layer has no entry in the compatibility store
    #[error("layer is not present in the compatibility store")]
    NotInStore,

    /// Layer does not advertise the required image format
    #[error("layer does not support '{required}' format")]
    MissingFormat { required: &'static str },

    /// Layer advertises no tile matrix set
    #[error("layer has no valid tile matrix set")]
    NoTileMatrixSet,

    /// The render deadline passed before the layer was processed
    #[error("render deadline exceeded before the layer was processed")]
    DeadlineExceeded,
}

/// Errors that can occur while fetching and decoding a single tile
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The tile endpoint answered with a non-success status code
    #[error("remote rejected tile request with status {0}")]
    RemoteRejected(u16),

    /// The response body is not a decodable image
    #[error("failed to decode tile image: {0}")]
    DecodeFailed(String),

    /// Network-level failure (connection, malformed URL, body read)
    #[error("transport error: {0}")]
    Transport(String),

    /// The per-tile timeout elapsed
    #[error("tile request timed out")]
    Timeout,
}

impl FetchError {
    /// Whether this error belongs to the transport family.
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_) | FetchError::Timeout)
    }

    /// Whether a retry has any chance of succeeding.
    ///
    /// Transport failures and server-side (5xx) rejections are transient;
    /// client rejections and undecodable bodies are not.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::RemoteRejected(status) => *status >= 500,
            FetchError::DecodeFailed(_) => false,
            FetchError::Transport(_) | FetchError::Timeout => true,
        }
    }
}

/// Why a layer was left out of the rendered map
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// Layer could not be resolved against the compatibility store
    #[error("unsupported layer: {0}")]
    Unsupported(#[from] UnsupportedLayer),

    /// Tile could not be fetched or decoded
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
}

/// Errors surfaced by a render call
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    /// Coordinate is missing, non-finite or out of range
    #[error("invalid {field}: {value}")]
    InvalidCoordinate { field: &'static str, value: String },

    /// The finalized artifact could not be written
    #[error("failed to persist map artifact: {0}")]
    Persist(String),
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError::Persist(err.to_string())
    }
}
