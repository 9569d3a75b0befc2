//! Runtime for a compiled map: actor collision, camera and layer compositing.
//!
//! ## Coordinate spaces
//!
//! Tiles are `(tile_width * scale) × (tile_height * scale)` world pixels.
//! Pixel → tile is floor division, so every pixel inside a tile (including
//! negative ones) maps to the tile containing it. The viewport is a window
//! of world pixels whose top-left corner is `viewport.at`; screen pixels are
//! world pixels minus that corner.
//!
//! ## Solidity
//!
//! A point is solid when it lies outside the map, when its background tile
//! has the solid flag, or when anything at all sits on the object layer.

pub mod input;
pub mod render;
pub mod sprite;

use serde::Serialize;
use thiserror::Error;

use crate::config::WorldConfig;
use crate::model::{Map, VOID_TILE};
use crate::processor::tileset::{Rect, TilesetInfo};
use render::{Renderer, Sheet};
use sprite::Sprite;

use input::Direction;

/// A position in world (or screen) pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

/// Camera: the visible window of world pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Viewport {
    pub at: Point,
    pub width: i32,
    pub height: i32,
}

/// Largest map, viewport or step size in pixels. Sums of a position, a step
/// and a tile extent must stay inside `i32`.
pub const MAX_WORLD_PIXELS: i64 = (i32::MAX / 4) as i64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("tileset tiles must be at least 1x1 pixels")]
    EmptyTile,

    #[error("{what} of {value} pixels is outside 0..={MAX_WORLD_PIXELS}")]
    TooLarge { what: &'static str, value: i64 },
}

fn bounded(what: &'static str, value: i64) -> Result<i32, WorldError> {
    if (0..=MAX_WORLD_PIXELS).contains(&value) {
        Ok(value as i32)
    } else {
        Err(WorldError::TooLarge { what, value })
    }
}

/// Keep a camera offset inside `[0, max]`; a negative `max` (map smaller
/// than the view) pins it to 0.
#[inline]
fn clamp_axis(v: i32, max: i32) -> i32 {
    v.clamp(0, max.max(0))
}

pub struct World {
    map: Map,
    /// Size of one tile in world pixels.
    extent: (i32, i32),
    /// Size of the whole map in world pixels.
    map_px: (i32, i32),
    move_delta: i32,
    hero: Sprite,
    viewport: Viewport,
}

// ── Construction ──

impl World {
    /// Spawn the actor on the map's entry point and focus the camera on it.
    /// Fails when the map, view or step size would not fit pixel arithmetic.
    pub fn new(map: Map, tiles: TilesetInfo, config: &WorldConfig) -> Result<Self, WorldError> {
        if tiles.tile_width == 0 || tiles.tile_height == 0 {
            return Err(WorldError::EmptyTile);
        }
        let scale = i64::from(config.scale.max(1));
        let tile_w = bounded("tile width", i64::from(tiles.tile_width) * scale)?;
        let tile_h = bounded("tile height", i64::from(tiles.tile_height) * scale)?;
        let map_w = bounded(
            "map width",
            (map.width as i64).saturating_mul(i64::from(tile_w)),
        )?;
        let map_h = bounded(
            "map height",
            (map.height as i64).saturating_mul(i64::from(tile_h)),
        )?;
        let move_delta = bounded("step size", i64::from(config.move_delta))?;
        let view_w = bounded("viewport width", i64::from(config.viewport_width))?;
        let view_h = bounded("viewport height", i64::from(config.viewport_height))?;

        let mut world = World {
            map,
            extent: (tile_w, tile_h),
            map_px: (map_w, map_h),
            move_delta,
            hero: Sprite::default(),
            viewport: Viewport {
                at: Point::default(),
                width: view_w,
                height: view_h,
            },
        };

        let entry = world.map.entry_point;
        world.hero = Sprite::new(world.to_pixel(entry.x as i32, entry.y as i32));
        world.focus();

        log::debug!(
            "world ready: {}x{} tiles, actor at {:?}, camera at {:?}",
            world.map.width,
            world.map.height,
            world.hero.at,
            world.viewport.at
        );
        Ok(world)
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn hero(&self) -> &Sprite {
        &self.hero
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }
}

// ── Coordinate conversion ──

impl World {
    /// Size of one tile in world pixels.
    #[inline]
    pub fn tile_extent(&self) -> (i32, i32) {
        self.extent
    }

    #[inline]
    pub fn to_tile(&self, p: Point) -> (i32, i32) {
        let (w, h) = self.tile_extent();
        (p.x.div_euclid(w), p.y.div_euclid(h))
    }

    #[inline]
    pub fn to_pixel(&self, tx: i32, ty: i32) -> Point {
        let (w, h) = self.tile_extent();
        Point::new(tx * w, ty * h)
    }

    /// Map size in world pixels.
    pub fn map_extent(&self) -> (i32, i32) {
        self.map_px
    }
}

// ── Collision ──

impl World {
    /// Does the pixel `p` block movement?
    pub fn is_solid(&self, p: Point) -> bool {
        let (tx, ty) = self.to_tile(p);
        if tx < 0 || ty < 0 {
            return true;
        }
        let (x, y) = (tx as usize, ty as usize);
        match (self.map.background.get(x, y), self.map.objects.get(x, y)) {
            (Some(bg), Some(obj)) => bg.solid || obj.is_present(),
            // past the last column/row there is nothing to stand on
            _ => true,
        }
    }

    /// Would the actor's one-tile footprint at top-left `at` touch anything
    /// solid? Tests the four corner pixels.
    pub fn collides(&self, at: Point) -> bool {
        let (w, h) = self.tile_extent();
        let right = at.x.saturating_add(w - 1);
        let bottom = at.y.saturating_add(h - 1);

        self.is_solid(at)
            || self.is_solid(Point::new(right, at.y))
            || self.is_solid(Point::new(at.x, bottom))
            || self.is_solid(Point::new(right, bottom))
    }

    /// Apply the pending delta one axis at a time, X first. Each axis moves
    /// its whole delta or not at all, so a blocked axis never stops the other.
    fn resolve_collision(&mut self) {
        let delta = self.hero.delta;

        if delta.x != 0 {
            let candidate = Point::new(self.hero.at.x.saturating_add(delta.x), self.hero.at.y);
            if !self.collides(candidate) {
                self.hero.at = candidate;
            }
        }

        if delta.y != 0 {
            let candidate = Point::new(self.hero.at.x, self.hero.at.y.saturating_add(delta.y));
            if !self.collides(candidate) {
                self.hero.at = candidate;
            }
        }
    }
}

// ── Camera ──

impl World {
    /// Centre the viewport on the actor as far as the map edges allow.
    fn focus(&mut self) {
        let (map_w, map_h) = self.map_extent();
        let v = &mut self.viewport;
        let target = self.hero.at;

        v.at.x = clamp_axis(target.x - v.width / 2, map_w - v.width);
        v.at.y = clamp_axis(target.y - v.height / 2, map_h - v.height);
    }
}

// ── Tick ──

impl World {
    pub fn set_actor_delta(&mut self, dx: i32, dy: i32) {
        self.hero.delta = Point::new(dx, dy);
    }

    pub fn steer(&mut self, dir: Direction) {
        self.set_actor_delta(dir.dx * self.move_delta, dir.dy * self.move_delta);
    }

    pub fn update(&mut self) {
        self.resolve_collision();
        self.hero.animate();
        self.focus();
    }

    /// Background first (or the void tile where there is none), objects on
    /// top, the actor last.
    pub fn render<R: Renderer>(&self, renderer: &mut R) {
        let (dx, dy) = self.tile_extent();
        let (w, h) = (dx as u32, dy as u32);
        let at = self.viewport.at;

        renderer.clear();

        // start one partial tile up/left so scrolled edges are covered
        let mut x = -at.x.rem_euclid(dx);
        while x <= self.viewport.width {
            let mut y = -at.y.rem_euclid(dy);
            while y <= self.viewport.height {
                let dst = Rect { x, y, w, h };
                let (tx, ty) = self.to_tile(Point::new(x + at.x, y + at.y));
                let cell = (tx >= 0 && ty >= 0)
                    .then(|| (tx as usize, ty as usize))
                    .filter(|&(cx, cy)| self.map.in_bounds(cx, cy));

                let background = cell
                    .and_then(|(cx, cy)| self.map.background.get(cx, cy))
                    .and_then(|t| t.index)
                    .unwrap_or(VOID_TILE);
                renderer.draw_tile(Sheet::Map, background, dst);

                if let Some(object) = cell
                    .and_then(|(cx, cy)| self.map.objects.get(cx, cy))
                    .and_then(|t| t.index)
                {
                    renderer.draw_tile(Sheet::Map, object, dst);
                }

                y += dy;
            }
            x += dx;
        }

        let hero = Rect {
            x: self.hero.at.x - at.x,
            y: self.hero.at.y - at.y,
            w,
            h,
        };
        renderer.draw_tile(Sheet::Actor, self.hero.tile(), hero);
        renderer.present();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Coords, MapKey, Placement, TileCode};
    use crate::processor::grid::Grid;
    use crate::processor::map_compiler::compile;
    use render::Recorder;

    const TILES: TilesetInfo = TilesetInfo {
        tile_width: 16,
        tile_height: 16,
        columns: 8,
    };

    /// scale 1: one tile is 16x16 pixels
    fn config(viewport: (i32, i32)) -> WorldConfig {
        WorldConfig {
            scale: 1,
            move_delta: 8,
            viewport_width: viewport.0,
            viewport_height: viewport.1,
        }
    }

    fn world(rows: &str, entry: (u32, u32), viewport: (i32, i32)) -> World {
        let mut key = MapKey {
            default_tile: TileCode::tile(8, false),
            void_symbol: Some(b'x'),
            entry_point: Coords::new(entry.0, entry.1),
            ..MapKey::default()
        };
        key.tile_table.insert(b'#', TileCode::tile(1, true));
        key.tile_table.insert(b'c', TileCode::tile(55, false));
        for (y, row) in rows.lines().enumerate() {
            for (x, c) in row.bytes().enumerate() {
                if c == b'o' {
                    key.objects.push(Placement {
                        symbol: b'c',
                        at: Coords::new(x as u32, y as u32),
                    });
                }
            }
        }

        let map = compile(&Grid::from_bytes(rows.as_bytes().to_vec()), &key).unwrap();
        World::new(map, TILES, &config(viewport)).unwrap()
    }

    #[test]
    fn test_oversized_worlds_are_refused() {
        let key = MapKey::default();
        let narrow = compile(&Grid::from_bytes(b"  \n".to_vec()), &key).unwrap();
        let wide = compile(&Grid::from_bytes(vec![b' '; 400]), &key).unwrap();

        let scaled = |scale: u32| WorldConfig {
            scale,
            ..config((32, 32))
        };
        let backwards = WorldConfig {
            move_delta: -8,
            ..config((32, 32))
        };
        let flat = TilesetInfo {
            tile_height: 0,
            ..TILES
        };

        let test_cases = vec![
            (narrow.clone(), TILES, scaled(300_000_000), "tile width"),
            (wide.clone(), TILES, scaled(100_000), "map width"),
            (narrow.clone(), TILES, backwards, "step size"),
        ];
        for (map, tiles, cfg, expected) in test_cases {
            match World::new(map, tiles, &cfg) {
                Err(WorldError::TooLarge { what, .. }) => assert_eq!(what, expected),
                other => panic!("expected {expected} to be refused, got {:?}", other.err()),
            }
        }

        assert_eq!(
            World::new(narrow, flat, &config((32, 32))).err(),
            Some(WorldError::EmptyTile)
        );
        // a smaller scale still fits
        assert!(World::new(wide, TILES, &scaled(80_000)).is_ok());
    }

    #[test]
    fn test_conversions() {
        let w = world("   \n   \n", (0, 0), (32, 32));
        let test_cases = vec![
            ((0, 0), (0, 0)),
            ((15, 15), (0, 0)),
            ((16, 31), (1, 1)),
            ((-1, 0), (-1, 0)),
            ((-16, -17), (-1, -2)),
        ];

        for ((px, py), expected) in test_cases {
            assert_eq!(w.to_tile(Point::new(px, py)), expected, "pixel ({px}, {py})");
        }
        assert_eq!(w.to_pixel(2, 1), Point::new(32, 16));
    }

    #[test]
    fn test_out_of_bounds_is_solid() {
        let w = world("   \n   \n", (0, 0), (32, 32));
        let test_cases = vec![
            (Point::new(-1, 0), true),
            (Point::new(0, -1), true),
            (Point::new(3 * 16, 0), true),
            (Point::new(0, 2 * 16), true),
            (Point::new(1000, 1000), true),
            (Point::new(0, 0), false),
            (Point::new(47, 31), false),
        ];

        for (p, expected) in test_cases {
            assert_eq!(w.is_solid(p), expected, "point {p:?}");
        }
    }

    #[test]
    fn test_solidity_sources() {
        // '#' solid background, 'x' void, 'o' object on a walkable cell
        let w = world("# xo\n", (1, 0), (64, 16));
        let test_cases = vec![
            (0, true),
            (1, false),
            // void cells are empty, and empty tiles are not solid
            (2, false),
            // objects block regardless of their own flag
            (3, true),
        ];

        for (tx, expected) in test_cases {
            assert_eq!(w.is_solid(Point::new(tx * 16 + 4, 4)), expected, "tile {tx}");
        }
    }

    #[test]
    fn test_blocked_axis_still_slides() {
        // actor at (1, 1); wall directly to the right, open below
        let mut w = world("#####\n# ###\n#   #\n#####\n", (1, 1), (320, 240));
        w.set_actor_delta(16, 16);
        w.update();

        // x is blocked at the wall's edge, y moved a full delta
        assert_eq!(w.hero().at, Point::new(16, 32));
    }

    #[test]
    fn test_move_is_all_or_nothing() {
        let mut w = world("#####\n#   #\n#####\n", (1, 1), (320, 240));
        w.set_actor_delta(8, 0);
        w.update();
        assert_eq!(w.hero().at, Point::new(24, 16));
        w.update();
        assert_eq!(w.hero().at, Point::new(32, 16));
        w.update();
        assert_eq!(w.hero().at, Point::new(40, 16));
        w.update();
        assert_eq!(w.hero().at, Point::new(48, 16));
        // the next step would put the right edge at x=71, inside the wall
        w.update();
        assert_eq!(w.hero().at, Point::new(48, 16));
        // a step ending inside the left wall is refused as a whole
        w.set_actor_delta(-40, 0);
        w.update();
        assert_eq!(w.hero().at, Point::new(48, 16));
    }

    #[test]
    fn test_only_the_destination_is_tested() {
        // walls at tiles 0, 3 and 6
        let mut w = world("#  #  #\n", (1, 0), (320, 240));
        w.set_actor_delta(32, 0);
        w.update();
        // (48, 0) is inside the middle wall
        assert_eq!(w.hero().at, Point::new(16, 0));

        w.set_actor_delta(48, 0);
        w.update();
        // (64, 0) is clear, so the step lands past the wall
        assert_eq!(w.hero().at, Point::new(64, 0));
    }

    #[test]
    fn test_camera_clamping() {
        // 20x10 map of 16px tiles = 320x160 pixels, viewport 100x60
        let row = " ".repeat(20);
        let rows = std::iter::repeat(row.as_str()).take(10).collect::<Vec<_>>().join("\n");
        let mut w = world(&rows, (0, 0), (100, 60));

        let test_cases = vec![
            (Point::new(0, 0), Point::new(0, 0)),
            (Point::new(160, 80), Point::new(110, 50)),
            (Point::new(1000, 1000), Point::new(220, 100)),
            (Point::new(-500, -500), Point::new(0, 0)),
        ];

        for (hero, expected) in test_cases {
            w.hero.at = hero;
            w.focus();
            assert_eq!(w.viewport().at, expected, "actor at {hero:?}");
        }
    }

    #[test]
    fn test_camera_pinned_when_map_is_small() {
        let mut w = world("   \n   \n", (2, 1), (640, 480));
        w.update();
        assert_eq!(w.viewport().at, Point::new(0, 0));
    }

    #[test]
    fn test_render_composition() {
        // 2x1 map, viewport exactly one tile wide and tall at scale 1
        let w = world(" o\n", (0, 0), (16, 16));
        let mut r = Recorder::default();
        w.render(&mut r);

        let map_draws: Vec<(u16, i32, i32)> = r
            .frame
            .iter()
            .filter(|c| c.sheet == Sheet::Map)
            .map(|c| (c.index, c.dst.x, c.dst.y))
            .collect();
        // cells at x=0 and x=16 (inclusive edge), rows y=0 and y=16
        assert_eq!(
            map_draws,
            vec![
                (8, 0, 0),
                (VOID_TILE, 0, 16),
                (8, 16, 0),
                (55, 16, 0),
                (VOID_TILE, 16, 16),
            ]
        );

        let actor = r.frame.last().unwrap();
        assert_eq!(actor.sheet, Sheet::Actor);
        assert_eq!(actor.index, sprite::IDLE_TILE);
        assert_eq!((actor.dst.x, actor.dst.y), (0, 0));
        assert_eq!(r.frames_presented, 1);
    }

    #[test]
    fn test_scrolled_render_offsets() {
        let row = " ".repeat(10);
        let rows = std::iter::repeat(row.as_str()).take(3).collect::<Vec<_>>().join("\n");
        let mut w = world(&rows, (5, 1), (40, 16));
        w.update();
        // actor at (80, 16): camera x is 80 - 20 = 60, 12px into tile 3
        assert_eq!(w.viewport().at, Point::new(60, 8));

        let mut r = Recorder::default();
        w.render(&mut r);
        let first = r.frame.first().unwrap();
        assert_eq!((first.dst.x, first.dst.y), (-12, -8));
        let actor = r.frame.last().unwrap();
        assert_eq!((actor.dst.x, actor.dst.y), (20, 8));
    }
}
