use std::path::Path;

use prisma::config::WorldConfig;
use prisma::model::MAX_GRID_BYTES;
use prisma::processor::{compile_map, load_tileset};
use prisma::world::input::{Direction, replay};
use prisma::world::render::{Recorder, Sheet};
use prisma::world::{Point, World};
use prisma::parse_moves;

const KEY: &str = "tests/fixtures/base.mf";
const GRID: &str = "tests/fixtures/base.map";

/// The fixture yard at scale 1: 16px tiles, a 64x48 view.
fn base_camp() -> World {
    let key = Path::new(KEY);
    let map = compile_map(key, Path::new(GRID), MAX_GRID_BYTES).unwrap();
    let tiles = load_tileset(key, &map).unwrap().expect("fixture names a tileset");
    let config = WorldConfig {
        scale: 1,
        move_delta: 8,
        viewport_width: 64,
        viewport_height: 48,
    };
    World::new(map, tiles, &config).unwrap()
}

fn positions(world: &mut World, moves: &str) -> Vec<Point> {
    let steps = parse_moves(moves).unwrap();
    replay(world, &mut Recorder::default(), &steps)
        .unwrap()
        .iter()
        .map(|t| t.actor)
        .collect()
}

#[test]
fn spawns_on_entry_point() {
    let world = base_camp();
    assert_eq!(world.tile_extent(), (16, 16));
    assert_eq!(world.hero().at, Point::new(48, 32));
    // centred: (48 - 32, 32 - 24)
    assert_eq!(world.viewport().at, Point::new(16, 8));
}

#[test]
fn void_cells_are_walkable_and_walls_stop() {
    let mut world = base_camp();
    // (3, 3) is void, (3, 5) is the bottom wall
    assert_eq!(
        positions(&mut world, "DDDDD"),
        vec![
            Point::new(48, 40),
            Point::new(48, 48),
            Point::new(48, 56),
            Point::new(48, 64),
            Point::new(48, 64),
        ]
    );
}

#[test]
fn crate_blocks_the_actor() {
    let mut world = base_camp();
    let trace = positions(&mut world, "DDRRR");
    // the crate sits at tile (5, 3): a right edge at x=87 would touch it
    assert_eq!(trace[3], Point::new(64, 48));
    assert_eq!(trace[4], Point::new(64, 48));
}

#[test]
fn camera_stays_inside_the_map() {
    let mut world = base_camp();
    let steps = vec![Direction::LEFT; 10]
        .into_iter()
        .chain(vec![Direction::RIGHT; 30])
        .chain(vec![Direction::UP; 10])
        .collect::<Vec<_>>();
    let reports = replay(&mut world, &mut Recorder::default(), &steps).unwrap();

    // map is 160x96 pixels, view 64x48
    for r in &reports {
        assert!((0..=96).contains(&r.camera.x), "tick {}: {:?}", r.tick, r.camera);
        assert!((0..=48).contains(&r.camera.y), "tick {}: {:?}", r.tick, r.camera);
    }
    let last = reports.last().unwrap();
    assert_eq!(last.actor, Point::new(128, 16));
    assert_eq!(last.camera, Point::new(96, 0));
}

#[test]
fn last_frame_draws_actor_on_top() {
    let mut world = base_camp();
    let mut renderer = Recorder::default();
    replay(&mut world, &mut renderer, &[Direction::RIGHT]).unwrap();

    assert_eq!(renderer.frames_presented, 1);
    let actor = renderer.frame.last().unwrap();
    assert_eq!(actor.sheet, Sheet::Actor);
    // walking right, first frame of the strip
    assert_eq!(actor.index, 4);
    assert!(
        renderer.frame[..renderer.frame.len() - 1]
            .iter()
            .all(|d| d.sheet == Sheet::Map)
    );
}
