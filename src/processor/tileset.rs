//! Tileset metadata (`<tileset>.nfo`).
//!
//! The image half of a tileset belongs to the renderer; this side only needs
//! the tile size and how many tiles one row of the sheet holds.
//
//      SPRITES <tile_width>x<tile_height> <columns>

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::source::{self, LoadError};

const NFO_LIMIT: u64 = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TilesetInfo {
    pub tile_width: u32,
    pub tile_height: u32,
    pub columns: u32,
}

/// Source rectangle of one tile on its sheet, in sheet pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl TilesetInfo {
    pub fn source_rect(&self, index: u16) -> Rect {
        let i = u32::from(index);
        Rect {
            x: (self.tile_width * (i % self.columns)) as i32,
            y: (self.tile_height * (i / self.columns)) as i32,
            w: self.tile_width,
            h: self.tile_height,
        }
    }

    pub fn parse(text: &str) -> Result<Self, String> {
        let line = text.lines().next().ok_or("file is empty")?;
        let mut words = line.split_whitespace();

        if words.next() != Some("SPRITES") {
            return Err("expected `SPRITES <w>x<h> <columns>`".into());
        }
        let size = words.next().ok_or("missing tile size")?;
        let (w, h) = size
            .split_once('x')
            .ok_or_else(|| format!("tile size {size:?} is not <w>x<h>"))?;
        let columns = words.next().ok_or("missing column count")?;

        let number = |s: &str, what: &str| -> Result<u32, String> {
            match s.parse::<u32>() {
                Ok(0) | Err(_) => Err(format!("invalid {what} {s:?}")),
                Ok(n) => Ok(n),
            }
        };

        Ok(Self {
            tile_width: number(w, "tile width")?,
            tile_height: number(h, "tile height")?,
            columns: number(columns, "column count")?,
        })
    }
}

/// `base` is the tileset path without extension, as written in a key's
/// `tileset` directive.
pub fn read_tileset_info(base: &Path) -> Result<TilesetInfo, LoadError> {
    let path = nfo_path(base);
    let text = source::read_text(&path, NFO_LIMIT)?;
    TilesetInfo::parse(&text).map_err(|reason| LoadError::BadTileset { path, reason })
}

fn nfo_path(base: &Path) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(".nfo");
    PathBuf::from(name)
}
