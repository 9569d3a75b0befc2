//! Applies a parsed `MapKey` to a raw grid, producing the two-layer `Map`.

use std::collections::HashSet;

use thiserror::Error;

use super::grid::Grid;
use crate::model::{Layer, Map, MapKey};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("placement of {symbol:?} at ({x}, {y}) lies outside the {width}x{height} map")]
    PlacementOutOfBounds {
        symbol: char,
        x: u32,
        y: u32,
        width: usize,
        height: usize,
    },

    #[error("entry point ({x}, {y}) lies outside the {width}x{height} map")]
    EntryOutOfBounds {
        x: u32,
        y: u32,
        width: usize,
        height: usize,
    },
}

/// Decode every grid byte into the background layer, then stamp the key's
/// placements onto the object layer in declaration order.
///
/// Cells past the end of a short row stay empty. A later placement on the
/// same cell overwrites an earlier one.
pub fn compile(grid: &Grid, key: &MapKey) -> Result<Map, CompileError> {
    let (width, height) = (grid.width, grid.height);

    let mut background = Layer::new(width, height);
    for (x, y, c) in grid.cells() {
        background.set(x, y, key.decode(c));
    }

    let mut objects = Layer::new(width, height);
    let mut occupied = HashSet::new();
    for placement in &key.objects {
        let (x, y) = (placement.at.x as usize, placement.at.y as usize);
        if !objects.set(x, y, key.object(placement.symbol)) {
            return Err(CompileError::PlacementOutOfBounds {
                symbol: char::from(placement.symbol),
                x: placement.at.x,
                y: placement.at.y,
                width,
                height,
            });
        }
        if !occupied.insert(placement.at) {
            log::warn!(
                "placement of {:?} at ({}, {}) replaces an earlier one",
                char::from(placement.symbol),
                x,
                y
            );
        }
    }

    let entry = key.entry_point;
    if entry.x as usize >= width || entry.y as usize >= height {
        return Err(CompileError::EntryOutOfBounds {
            x: entry.x,
            y: entry.y,
            width,
            height,
        });
    }

    log::debug!(
        "compiled {}x{} map with {} placements",
        width,
        height,
        key.objects.len()
    );

    Ok(Map {
        name: key.name.clone(),
        tileset_path: key.tileset_path.clone(),
        width,
        height,
        background,
        objects,
        entry_point: entry,
    })
}
