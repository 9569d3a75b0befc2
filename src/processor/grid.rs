//! Raw ASCII grid files: one byte per cell, newline-separated rows.

use std::path::Path;

use super::source::{self, LoadError};

/// A grid file held in memory together with its dimensions in cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub raw: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl Grid {
    pub fn from_bytes(raw: Vec<u8>) -> Self {
        let (width, height) = measure(&raw);
        Self { raw, width, height }
    }

    /// Iterate over `(x, y, byte)` for every non-newline byte.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, u8)> + '_ {
        self.raw
            .split(|&b| b == b'\n')
            .enumerate()
            .flat_map(|(y, row)| row.iter().enumerate().map(move |(x, &c)| (x, y, c)))
    }
}

/// Width is the longest row, height the number of rows. A newline at the
/// very end of the file does not open another row.
pub fn measure(raw: &[u8]) -> (usize, usize) {
    let mut rows: Vec<&[u8]> = raw.split(|&b| b == b'\n').collect();
    if rows.len() > 1 && rows.last().is_some_and(|r| r.is_empty()) {
        rows.pop();
    }
    let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    (width, rows.len())
}

/// Read the grid at `path`, refusing files over `limit` bytes.
pub fn read_grid(path: &Path, limit: u64) -> Result<Grid, LoadError> {
    let grid = Grid::from_bytes(source::read_bounded(path, limit)?);
    log::debug!(
        "grid {} is {}x{} cells",
        path.display(),
        grid.width,
        grid.height
    );
    Ok(grid)
}
