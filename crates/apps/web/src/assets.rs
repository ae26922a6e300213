//! HTTP transport for configuration and terrain/tileset assets.

use futures::future::{FutureExt, LocalBoxFuture};
use gloo_net::http::Request;

use formats::TileKey;
use locator::engine::AssetSource;
use locator::{AssetError, ConfigSource, LocatorConfig, LocatorError};

/// Assets served relative to the page: `tilesets/<id>/tileset.json`,
/// `terrain/tileset.json` and the terrain tiles beside it.
#[derive(Debug, Clone)]
pub struct HttpAssetSource {
    base: String,
}

impl HttpAssetSource {
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        if !base.is_empty() && !base.ends_with('/') {
            base.push('/');
        }
        Self { base }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path.trim_start_matches('/'))
    }
}

impl AssetSource for HttpAssetSource {
    fn fetch_tileset(&self, asset_id: u64) -> LocalBoxFuture<'static, Result<String, AssetError>> {
        fetch_text(self.url(&format!("tilesets/{asset_id}/tileset.json"))).boxed_local()
    }

    fn fetch_terrain_tileset(&self) -> LocalBoxFuture<'static, Result<String, AssetError>> {
        fetch_text(self.url("terrain/tileset.json")).boxed_local()
    }

    fn fetch_terrain_tile(
        &self,
        _key: TileKey,
        path: &str,
    ) -> LocalBoxFuture<'static, Result<Vec<u8>, AssetError>> {
        fetch_binary(self.url(&format!("terrain/{path}"))).boxed_local()
    }
}

/// `config.json` next to the page.
#[derive(Debug, Clone)]
pub struct HttpConfigSource {
    url: String,
}

impl HttpConfigSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl ConfigSource for HttpConfigSource {
    fn load(&self) -> LocalBoxFuture<'_, Result<LocatorConfig, LocatorError>> {
        async move {
            let payload = fetch_text(self.url.clone()).await.map_err(|err| match err {
                AssetError::Http { status, .. } => {
                    LocatorError::ConfigUnavailable(format!("HTTP {status}"))
                }
                other => LocatorError::ConfigUnavailable(other.to_string()),
            })?;
            LocatorConfig::from_json_str(&payload)
        }
        .boxed_local()
    }
}

async fn fetch_text(url: String) -> Result<String, AssetError> {
    let resp = Request::get(&url)
        .send()
        .await
        .map_err(|e| AssetError::Transport(e.to_string()))?;
    if !resp.ok() {
        return Err(AssetError::Http {
            url,
            status: resp.status(),
        });
    }
    resp.text()
        .await
        .map_err(|e| AssetError::Transport(e.to_string()))
}

async fn fetch_binary(url: String) -> Result<Vec<u8>, AssetError> {
    let resp = Request::get(&url)
        .send()
        .await
        .map_err(|e| AssetError::Transport(e.to_string()))?;
    if !resp.ok() {
        return Err(AssetError::Http {
            url,
            status: resp.status(),
        });
    }
    resp.binary()
        .await
        .map_err(|e| AssetError::Transport(e.to_string()))
}
