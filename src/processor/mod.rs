//! The functional core: key file + grid file in, compiled `Map` out.
pub mod grid;
pub mod key_parser;
pub mod lexer;
pub mod map_compiler;
pub mod source;
pub mod tileset;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::model::{Map, MapKey};
use tileset::TilesetInfo;

/// Parse `key_path`, read `grid_path` (at most `limit` bytes) and compile
/// the two into a map.
pub fn compile_map(key_path: &Path, grid_path: &Path, limit: u64) -> Result<Map> {
    let key = key_parser::parse_key_file(key_path)
        .with_context(|| format!("Loading map key {}", key_path.display()))?;
    compile_with_key(&key, grid_path, limit)
}

pub fn compile_with_key(key: &MapKey, grid_path: &Path, limit: u64) -> Result<Map> {
    let grid = grid::read_grid(grid_path, limit)
        .with_context(|| format!("Loading grid {}", grid_path.display()))?;
    let map = map_compiler::compile(&grid, key)
        .with_context(|| format!("Compiling {}", grid_path.display()))?;

    log::info!(
        "compiled {} ({}x{} tiles, {} placements)",
        map.name.as_deref().unwrap_or("<unnamed>"),
        map.width,
        map.height,
        key.objects.len()
    );
    Ok(map)
}

/// A key's `tileset` path is relative to the directory holding the key.
pub fn resolve_tileset(key_path: &Path, tileset: &Path) -> PathBuf {
    match key_path.parent() {
        Some(dir) if tileset.is_relative() => dir.join(tileset),
        _ => tileset.to_path_buf(),
    }
}

/// Tileset metadata for a compiled map, or `None` when the key named no tileset.
pub fn load_tileset(key_path: &Path, map: &Map) -> Result<Option<TilesetInfo>> {
    let Some(base) = map.tileset_path.as_deref() else {
        return Ok(None);
    };
    let base = resolve_tileset(key_path, base);
    let info = tileset::read_tileset_info(&base)
        .with_context(|| format!("Loading tileset {}", base.display()))?;
    log::debug!(
        "tileset {}: {}x{} tiles, {} per row",
        base.display(),
        info.tile_width,
        info.tile_height,
        info.columns
    );
    Ok(Some(info))
}
