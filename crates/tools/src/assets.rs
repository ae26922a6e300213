use std::fs;
use std::path::{Path, PathBuf};

use futures::future::{FutureExt, LocalBoxFuture};

use formats::TileKey;
use locator::engine::AssetSource;
use locator::{AssetError, ConfigSource, LocatorConfig, LocatorError};

/// Serves the page's asset layout from a directory:
/// `tilesets/<id>/tileset.json`, `terrain/tileset.json`, `terrain/<tile path>`.
#[derive(Debug, Clone)]
pub struct FileAssetSource {
    root: PathBuf,
}

impl FileAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for FileAssetSource {
    fn fetch_tileset(&self, asset_id: u64) -> LocalBoxFuture<'static, Result<String, AssetError>> {
        let path = self
            .root
            .join("tilesets")
            .join(asset_id.to_string())
            .join("tileset.json");
        futures::future::ready(read_text(&path)).boxed_local()
    }

    fn fetch_terrain_tileset(&self) -> LocalBoxFuture<'static, Result<String, AssetError>> {
        let path = self.root.join("terrain").join("tileset.json");
        futures::future::ready(read_text(&path)).boxed_local()
    }

    fn fetch_terrain_tile(
        &self,
        _key: TileKey,
        path: &str,
    ) -> LocalBoxFuture<'static, Result<Vec<u8>, AssetError>> {
        let path = self.root.join("terrain").join(path);
        let result = fs::read(&path).map_err(AssetError::from);
        futures::future::ready(result).boxed_local()
    }
}

fn read_text(path: &Path) -> Result<String, AssetError> {
    Ok(fs::read_to_string(path)?)
}

/// `config.json` on disk.
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigSource for FileConfigSource {
    fn load(&self) -> LocalBoxFuture<'_, Result<LocatorConfig, LocatorError>> {
        let result = fs::read_to_string(&self.path)
            .map_err(|e| LocatorError::ConfigUnavailable(format!("{}: {e}", self.path.display())))
            .and_then(|payload| LocatorConfig::from_json_str(&payload));
        futures::future::ready(result).boxed_local()
    }
}
