use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

// numeric constants shared by the loader, compiler and runtime

/// Largest grid file accepted by the grid reader (8 MiB).
pub const MAX_GRID_BYTES: u64 = 1024 * 1024 * 8;

/// Upper bound on `place` directives in a single key.
pub const MAX_PLACEMENTS: usize = 1 << 16;

/// Tile drawn wherever the map has nothing to show.
pub const VOID_TILE: u16 = 22;

/// A tile position (in tiles, not pixels).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Coords {
    pub x: u32,
    pub y: u32,
}

impl Coords {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: u16, dy: u16) -> Self {
        Self {
            x: self.x.saturating_add(u32::from(dx)),
            y: self.y.saturating_add(u32::from(dy)),
        }
    }
}

/// One visual/physical tile: an image index into the tileset plus a
/// solidity flag. A tile is *present* iff it has an index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct TileCode {
    pub index: Option<u16>,
    pub solid: bool,
}

impl TileCode {
    pub const EMPTY: TileCode = TileCode {
        index: None,
        solid: false,
    };

    pub const fn tile(index: u16, solid: bool) -> Self {
        Self {
            index: Some(index),
            solid,
        }
    }

    pub fn is_present(self) -> bool {
        self.index.is_some()
    }

    /// Legacy on-disk form: `((index + 1) << 24) | solid`. The index only
    /// has eight bits there, so indices above 254 cannot be packed.
    pub fn to_packed(self) -> Option<u32> {
        let index = self.index.map_or(0, |i| u32::from(i) + 1);
        (index <= 0xff).then(|| (index << 24) | u32::from(self.solid))
    }

    pub fn from_packed(raw: u32) -> Self {
        let index = raw >> 24;
        Self {
            index: (index != 0).then(|| (index - 1) as u16),
            solid: raw & 0x01 != 0,
        }
    }
}

/// A single `place` directive, already shifted by the active `from` offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub symbol: u8,
    pub at: Coords,
}

/// Parsed form of a `.mf` file: a template describing how to read a grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapKey {
    pub name: Option<String>,
    pub tileset_path: Option<PathBuf>,
    pub default_tile: TileCode,
    pub void_symbol: Option<u8>,
    pub tile_table: HashMap<u8, TileCode>,
    pub entry_point: Coords,
    pub objects: Vec<Placement>,
}

impl MapKey {
    /// What a grid byte decodes to on the background layer.
    pub fn decode(&self, c: u8) -> TileCode {
        if self.void_symbol == Some(c) {
            return TileCode::EMPTY;
        }
        self.tile_table.get(&c).copied().unwrap_or(self.default_tile)
    }

    /// What a placed symbol decodes to on the object layer.
    pub fn object(&self, symbol: u8) -> TileCode {
        self.tile_table.get(&symbol).copied().unwrap_or(TileCode::EMPTY)
    }
}

/// Dense `width × height` grid of tile codes, stored column-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layer {
    width: usize,
    height: usize,
    cells: Vec<TileCode>,
}

impl Layer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![TileCode::EMPTY; width * height],
        }
    }

    #[inline]
    fn slot(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| self.height * x + y)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<TileCode> {
        self.slot(x, y).map(|i| self.cells[i])
    }

    /// Returns `false` (and writes nothing) when `(x, y)` is outside the layer.
    pub fn set(&mut self, x: usize, y: usize, code: TileCode) -> bool {
        match self.slot(x, y) {
            Some(i) => {
                self.cells[i] = code;
                true
            }
            None => false,
        }
    }

    pub fn cells(&self) -> &[TileCode] {
        &self.cells
    }
}

/// Compiled level. Immutable once built by the map compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Map {
    pub name: Option<String>,
    pub tileset_path: Option<PathBuf>,
    pub width: usize,
    pub height: usize,
    pub background: Layer,
    pub objects: Layer,
    pub entry_point: Coords,
}

impl Map {
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }
}
