//! Configuration management for the overlay renderer.
//!
//! Two subcommands share one set of render settings:
//! - `serve` runs the HTTP API
//! - `render` produces a single map and exits
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use wmts_overlay::config::{Cli, Command};
//!
//! match Cli::parse().command {
//!     Command::Serve(config) => println!("Listening on {}", config.bind_address()),
//!     Command::Render(cmd) => println!("Rendering {}, {}", cmd.latitude, cmd.longitude),
//! }
//! ```
//!
//! # Environment Variables
//!
//! Every option can be set via an environment variable with the `WMTS_` prefix:
//!
//! - `WMTS_HOST` - Server bind address (default: 0.0.0.0)
//! - `WMTS_PORT` - Server port (default: 5001)
//! - `WMTS_COMPAT_PATH` - Capability snapshot (default: layer_compatibility_data.json)
//! - `WMTS_URL` - WMTS endpoint base URL
//! - `WMTS_OUTPUT_DIR` - Where the map is written (default: .)
//! - `WMTS_LAYERS` - Comma-separated layer list
//! - `WMTS_FETCH_TIMEOUT` - Per-tile timeout in seconds (default: 30)
//! - `WMTS_CONCURRENCY` - Concurrent tile fetches (default: 8)
//! - `WMTS_RETRIES` - Retries for transient fetch failures (default: 0)
//! - `WMTS_RENDER_DEADLINE` - Overall render deadline in seconds
//! - `WMTS_CACHE_TILES` - Tiles kept in memory, 0 disables (default: 0)

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::compat::DEFAULT_SNAPSHOT_PATH;
use crate::composite::DEFAULT_ZOOM;
use crate::fetch::{RetryPolicy, DEFAULT_WMTS_URL};
use crate::render::{RenderConfig, DEFAULT_CONCURRENCY, DEFAULT_LAYERS};
use crate::resolve::{
    TileCoordinates, DEFAULT_TILE_COL, DEFAULT_TILE_MATRIX, DEFAULT_TILE_ROW,
};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 5001;

/// Default per-tile fetch timeout in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Delay between retries of a transient fetch failure.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(250);

// =============================================================================
// CLI Arguments
// =============================================================================

/// WMTS overlay renderer - composites GIBS layers into an interactive map.
#[derive(Parser, Debug, Clone)]
#[command(name = "wmts-overlay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP API
    Serve(ServeConfig),

    /// Render one map and write it to the output directory
    Render(RenderCommand),
}

/// Settings shared by every command that renders maps.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct RenderArgs {
    // =========================================================================
    // Sources
    // =========================================================================
    /// Capability snapshot describing which layers can be requested.
    #[arg(long, default_value = DEFAULT_SNAPSHOT_PATH, env = "WMTS_COMPAT_PATH")]
    pub compat_path: PathBuf,

    /// WMTS endpoint base URL.
    #[arg(long, default_value = DEFAULT_WMTS_URL, env = "WMTS_URL")]
    pub wmts_url: String,

    /// Directory the map and its overlay images are written to.
    #[arg(long, default_value = ".", env = "WMTS_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    // =========================================================================
    // Map Content
    // =========================================================================
    /// Layers to overlay, in stacking order (comma-separated).
    #[arg(
        long,
        env = "WMTS_LAYERS",
        value_delimiter = ',',
        default_values_t = DEFAULT_LAYERS.map(String::from)
    )]
    pub layers: Vec<String>,

    /// Tile matrix requested for every layer.
    #[arg(long, default_value = DEFAULT_TILE_MATRIX, env = "WMTS_TILE_MATRIX")]
    pub tile_matrix: String,

    /// Tile row requested for every layer.
    #[arg(long, default_value = DEFAULT_TILE_ROW, env = "WMTS_TILE_ROW")]
    pub tile_row: String,

    /// Tile column requested for every layer.
    #[arg(long, default_value = DEFAULT_TILE_COL, env = "WMTS_TILE_COL")]
    pub tile_col: String,

    /// Base map zoom level.
    #[arg(long, default_value_t = DEFAULT_ZOOM, env = "WMTS_ZOOM")]
    pub zoom: u8,

    // =========================================================================
    // Fetching
    // =========================================================================
    /// Per-tile fetch timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT_SECS, env = "WMTS_FETCH_TIMEOUT")]
    pub fetch_timeout: u64,

    /// Maximum number of tiles fetched at once.
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY, env = "WMTS_CONCURRENCY")]
    pub concurrency: usize,

    /// Retries for transient fetch failures (timeouts, connection errors, 5xx).
    #[arg(long, default_value_t = 0, env = "WMTS_RETRIES")]
    pub retries: u32,

    /// Overall render deadline in seconds; layers not fetched in time are skipped.
    #[arg(long, env = "WMTS_RENDER_DEADLINE")]
    pub render_deadline: Option<u64>,

    /// Number of fetched tiles to keep in memory (0 disables the cache).
    #[arg(long, default_value_t = 0, env = "WMTS_CACHE_TILES")]
    pub cache_tiles: usize,

    // =========================================================================
    // Logging
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Validate the render settings and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.layers.iter().any(|l| l.trim().is_empty()) {
            return Err("layer identifiers must not be empty".to_string());
        }

        let mut seen = HashSet::new();
        if let Some(dup) = self.layers.iter().map(|l| l.trim()).find(|l| !seen.insert(*l)) {
            return Err(format!("layer '{}' is listed more than once", dup));
        }

        if let Err(e) = url::Url::parse(&self.wmts_url) {
            return Err(format!("invalid WMTS URL '{}': {}", self.wmts_url, e));
        }

        if self.fetch_timeout == 0 {
            return Err("fetch_timeout must be greater than 0".to_string());
        }

        if self.concurrency == 0 {
            return Err("concurrency must be greater than 0".to_string());
        }

        if self.render_deadline == Some(0) {
            return Err("render_deadline must be greater than 0".to_string());
        }

        for (name, value) in [
            ("tile_matrix", &self.tile_matrix),
            ("tile_row", &self.tile_row),
            ("tile_col", &self.tile_col),
        ] {
            if value.is_empty() {
                return Err(format!("{} must not be empty", name));
            }
        }

        Ok(())
    }

    /// Build the render configuration.
    pub fn render_config(&self) -> RenderConfig {
        let config = RenderConfig::default()
            .with_layers(self.layers.iter().map(|l| l.trim().to_string()))
            .with_tile(TileCoordinates::new(
                self.tile_matrix.as_str(),
                self.tile_row.as_str(),
                self.tile_col.as_str(),
            ))
            .with_zoom(self.zoom)
            .with_concurrency(self.concurrency);

        match self.render_deadline {
            Some(secs) => config.with_deadline(Duration::from_secs(secs)),
            None => config,
        }
    }

    /// Retry policy for transient fetch failures.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::with_retries(self.retries, DEFAULT_RETRY_DELAY)
    }

    /// Per-tile fetch timeout.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout)
    }
}

/// Configuration for the `serve` command.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct ServeConfig {
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "WMTS_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "WMTS_PORT")]
    pub port: u16,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "WMTS_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,

    #[command(flatten)]
    pub render: RenderArgs,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("host must not be empty".to_string());
        }
        self.render.validate()
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration for the `render` command.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct RenderCommand {
    /// Latitude of the map center.
    #[arg(long, allow_negative_numbers = true)]
    pub latitude: f64,

    /// Longitude of the map center.
    #[arg(long, allow_negative_numbers = true)]
    pub longitude: f64,

    #[command(flatten)]
    pub render: RenderArgs,
}

impl RenderCommand {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        crate::render::validate_coordinate(self.latitude, self.longitude)
            .map_err(|e| e.to_string())?;
        self.render.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================
