use url::Url;

use crate::error::FetchError;
use crate::resolve::ResolvedTileRequest;

/// NASA GIBS WMTS endpoint (EPSG:4326, "best" imagery).
pub const DEFAULT_WMTS_URL: &str = "https://gibs.earthdata.nasa.gov/wmts/epsg4326/best/wmts.cgi";

/// WMTS style requested for every layer.
const DEFAULT_STYLE: &str = "default";

/// A WMTS service reachable through the KVP binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WmtsEndpoint {
    base_url: String,
}

impl WmtsEndpoint {
    /// Create an endpoint for the given service URL.
    ///
    /// The URL is not validated here; a malformed URL surfaces as a
    /// [`FetchError::Transport`] when a tile address is built.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// The service URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the GetTile address for a resolved request.
    ///
    /// Existing query parameters on the base URL are kept; all values are
    /// percent-encoded.
    pub fn tile_url(&self, request: &ResolvedTileRequest) -> Result<String, FetchError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| FetchError::Transport(format!("invalid WMTS URL '{}': {}", self.base_url, e)))?;

        if url.cannot_be_a_base() {
            return Err(FetchError::Transport(format!(
                "invalid WMTS URL '{}': not a hierarchical URL",
                self.base_url
            )));
        }

        url.query_pairs_mut()
            .append_pair("SERVICE", "WMTS")
            .append_pair("REQUEST", "GetTile")
            .append_pair("VERSION", "1.0.0")
            .append_pair("LAYER", &request.layer_id)
            .append_pair("STYLE", DEFAULT_STYLE)
            .append_pair("TILEMATRIXSET", &request.tile_matrix_set)
            .append_pair("TILEMATRIX", &request.tile_matrix)
            .append_pair("TILEROW", &request.row)
            .append_pair("TILECOL", &request.col)
            .append_pair("FORMAT", &request.format);

        Ok(url.into())
    }
}

impl Default for WmtsEndpoint {
    fn default() -> Self {
        Self::new(DEFAULT_WMTS_URL)
    }
}
