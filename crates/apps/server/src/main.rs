use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::extract::{Path as AxumPath, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Development server for the locator page.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Directory holding index.html, pkg/, config.json, terrain/ and tilesets/
    #[arg(long, env = "LOCATOR_ROOT", default_value = "crates/apps/web/www")]
    root: PathBuf,

    /// Listen address
    #[arg(long, env = "LOCATOR_ADDR", default_value = "127.0.0.1:8080")]
    addr: SocketAddr,
}

#[derive(Clone)]
struct AppState {
    root: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    check_assets(&args.root).await;

    let state = AppState {
        root: args.root.clone(),
    };
    let app = router(state);

    info!("locator server listening on http://{}", args.addr);
    let listener = tokio::net::TcpListener::bind(args.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::OPTIONS]);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/config.json", get(get_config))
        .route("/terrain/tileset.json", get(get_terrain_tileset))
        .route("/terrain/tiles/:z/:x/:file", get(get_terrain_tile))
        .route("/tilesets/:id/tileset.json", get(get_tileset))
        .fallback_service(ServeDir::new(&state.root))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Warns about files the page will fail on; serving starts regardless.
async fn check_assets(root: &Path) {
    match tokio::fs::read_to_string(root.join("config.json")).await {
        Ok(payload) => match locator::LocatorConfig::from_json_str(&payload) {
            Ok(config) => info!(
                asset_id = config.ion_asset_id,
                world_terrain = config.use_world_terrain,
                "config.json ok"
            ),
            Err(err) => warn!("config.json will not load in the page: {err}"),
        },
        Err(err) => warn!("config.json missing under {root:?}: {err}"),
    }

    if let Ok(payload) = tokio::fs::read_to_string(root.join("terrain").join("tileset.json")).await {
        if let Err(err) = formats::TerrainTileset::from_json_str(&payload) {
            warn!("terrain/tileset.json is invalid: {err}");
        }
    }
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn get_config(State(state): State<AppState>) -> Response {
    serve_file(&state.root.join("config.json"), "application/json").await
}

async fn get_terrain_tileset(State(state): State<AppState>) -> Response {
    let path = state.root.join("terrain").join("tileset.json");
    serve_file(&path, "application/json").await
}

async fn get_terrain_tile(
    State(state): State<AppState>,
    AxumPath((z, x, file)): AxumPath<(u32, u32, String)>,
) -> Response {
    match tile_path(&state.root, z, x, &file) {
        Some(path) => serve_file(&path, "application/octet-stream").await,
        None => (StatusCode::BAD_REQUEST, "expected <y>.bin").into_response(),
    }
}

async fn get_tileset(State(state): State<AppState>, AxumPath(id): AxumPath<u64>) -> Response {
    let path = state
        .root
        .join("tilesets")
        .join(id.to_string())
        .join("tileset.json");
    serve_file(&path, "application/json").await
}

/// `terrain/tiles/<z>/<x>/<y>.bin`; `file` must be a numeric row plus `.bin`.
fn tile_path(root: &Path, z: u32, x: u32, file: &str) -> Option<PathBuf> {
    let y: u32 = file.strip_suffix(".bin")?.parse().ok()?;
    Some(
        root.join("terrain")
            .join("tiles")
            .join(z.to_string())
            .join(x.to_string())
            .join(format!("{y}.bin")),
    )
}

async fn serve_file(path: &Path, content_type: &str) -> Response {
    match tokio::fs::read(path).await {
        Ok(data) => {
            let mut headers = HeaderMap::new();
            headers.insert(
                http::header::CONTENT_TYPE,
                HeaderValue::from_str(content_type)
                    .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
            );
            (StatusCode::OK, headers, Body::from(data)).into_response()
        }
        Err(err) => {
            error!("file read failed: {path:?} -> {err}");
            (StatusCode::NOT_FOUND, "not found").into_response()
        }
    }
}
