//! WMTS Overlay - interactive map renderer for WMTS layers.
//!
//! This binary runs the HTTP API or renders a single map.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wmts_overlay::{
    config::{Cli, Command, RenderArgs, RenderCommand, ServeConfig},
    server::{create_router, RouterConfig},
    CompatibilityStore, MapRenderer, ReqwestTileClient, TileFetcher, WmtsEndpoint,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(config) => run_serve(config).await,
        Command::Render(command) => run_render(command).await,
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "wmts_overlay=debug,tower_http=debug"
    } else {
        "wmts_overlay=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build a renderer from the shared render settings.
fn build_renderer(args: &RenderArgs) -> Result<MapRenderer<ReqwestTileClient>, String> {
    let store = CompatibilityStore::load(&args.compat_path);

    let client = ReqwestTileClient::with_timeout(args.fetch_timeout())
        .map_err(|e| format!("failed to build HTTP client: {}", e))?;

    let fetcher = TileFetcher::new(client, WmtsEndpoint::new(args.wmts_url.as_str()))
        .with_retry(args.retry_policy())
        .with_cache_capacity(args.cache_tiles);

    let renderer = MapRenderer::new(store, fetcher, args.render_config());

    info!(
        "  Compatibility snapshot: {} ({} layers)",
        args.compat_path.display(),
        renderer.store().len()
    );
    log_renderer(&renderer);

    Ok(renderer)
}

/// Log the effective fetch and render settings.
fn log_renderer(renderer: &MapRenderer<ReqwestTileClient>) {
    let fetcher = renderer.fetcher();
    let config = renderer.config();

    info!("  WMTS endpoint: {}", fetcher.endpoint().base_url());
    info!(
        "  Fetch: up to {} attempt(s), cache {}",
        fetcher.retry_policy().max_attempts(),
        fetcher
            .cache()
            .map_or_else(|| "disabled".to_string(), |c| format!("{} tiles", c.capacity()))
    );
    info!(
        "  Layers: {} (concurrency {}), tile {}/{}/{}",
        config.layers.len(),
        config.effective_concurrency(),
        config.tile.tile_matrix,
        config.tile.row,
        config.tile.col
    );
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.render.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("WMTS Overlay v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");

    let renderer = match build_renderer(&config.render) {
        Ok(renderer) => renderer,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("  Output directory: {}", config.render.output_dir.display());

    let router = create_router(
        renderer,
        config.render.output_dir.clone(),
        build_router_config(&config),
    );

    let addr = config.bind_address();

    info!("");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!(
        "    curl -X POST -H 'Content-Type: application/json' \\\n      -d '{{\"latitude\": 10, \"longitude\": -70}}' http://{}/generate-map",
        addr
    );
    info!("    open http://{}/interactive_map.html", addr);
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Build RouterConfig from the application ServeConfig.
fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config = RouterConfig::new().with_tracing(!config.no_tracing);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}

// =============================================================================
// Render Command
// =============================================================================

async fn run_render(command: RenderCommand) -> ExitCode {
    init_logging(command.render.verbose);

    if let Err(e) = command.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let renderer = match build_renderer(&command.render) {
        Ok(renderer) => renderer,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let outcome = match renderer
        .render_map(command.latitude, command.longitude)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Render failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let path = match outcome.map.persist(&command.render.output_dir).await {
        Ok(path) => path,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    for report in &outcome.layers {
        match report.reason {
            Some(ref reason) => println!("  - {}: skipped ({})", report.layer_id, reason),
            None => println!("  + {}", report.layer_id),
        }
    }
    println!(
        "Wrote {} ({} of {} layers)",
        path.display(),
        outcome.composited(),
        outcome.layers.len()
    );

    ExitCode::SUCCESS
}
