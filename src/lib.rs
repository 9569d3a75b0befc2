pub mod cli;
pub mod config;
pub mod model;
pub mod processor;
pub mod world;
pub mod writer;

use std::path::Path;

use anyhow::{Context, bail};

use cli::{Cli, Command};
use config::Config;
use processor::key_parser::{self, KeyError};
use processor::source::LoadError;
use processor::tileset;
use world::World;
use world::input::{self, Direction};
use world::render::Recorder;

/// Exit status for syntax, compile and configuration errors.
pub const EXIT_INIT_FAILED: u8 = 1;
/// Exit status when an input file is missing, unreadable or too large.
pub const EXIT_ENV_FAILURE: u8 = 2;

pub fn run(args: Cli) -> anyhow::Result<()> {
    let config = Config::load(args.config.as_deref()).with_context(|| "Loading configuration")?;

    match args.command {
        Command::Check { key } => check(&key),
        Command::Compile { key, grid, output } => compile(&key, &grid, &output, &config),
        Command::Walk {
            key,
            grid,
            moves,
            tileset,
            json,
        } => walk(&key, &grid, &moves, tileset.as_deref(), json, &config),
    }
}

/// Map an error coming out of `run` to the process exit status.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    let environment = err.chain().any(|e| {
        e.is::<LoadError>() || matches!(e.downcast_ref::<KeyError>(), Some(KeyError::Load(_)))
    });
    if environment {
        EXIT_ENV_FAILURE
    } else {
        EXIT_INIT_FAILED
    }
}

fn check(key_path: &Path) -> anyhow::Result<()> {
    let key = key_parser::parse_key_file(key_path)
        .with_context(|| format!("Loading map key {}", key_path.display()))?;

    println!("{}: ok", key_path.display());
    println!("  name:       {}", key.name.as_deref().unwrap_or("-"));
    println!(
        "  tileset:    {}",
        key.tileset_path
            .as_deref()
            .map_or("-".into(), |p| p.display().to_string())
    );
    println!("  default:    {:?}", key.default_tile.index);
    println!(
        "  void:       {}",
        key.void_symbol.map_or("-".into(), |c| format!("{:?}", char::from(c)))
    );
    println!("  tiles:      {}", key.tile_table.len());
    println!("  placements: {}", key.objects.len());
    println!("  entry:      ({}, {})", key.entry_point.x, key.entry_point.y);
    Ok(())
}

fn compile(key: &Path, grid: &Path, output: &Path, config: &Config) -> anyhow::Result<()> {
    // 1. ── Compile ────────────────────────────────────────────────────
    let map = processor::compile_map(key, grid, config.limits.max_grid_bytes)?;

    // 2. ── Write outputs ──────────────────────────────────────────────
    std::fs::create_dir_all(output).with_context(|| format!("Creating {}", output.display()))?;

    writer::json::emit(&map, output).with_context(|| "Writing JSON map")?;
    writer::bin::emit(&map, output).with_context(|| "Writing binary map")?;

    println!(
        "wrote {} and {} ({}x{}) to {}",
        writer::json::FILE_NAME,
        writer::bin::FILE_NAME,
        map.width,
        map.height,
        output.display()
    );
    Ok(())
}

fn walk(
    key_path: &Path,
    grid: &Path,
    moves: &str,
    tileset_override: Option<&Path>,
    json: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let steps = parse_moves(moves)?;

    // 1. ── Load ───────────────────────────────────────────────────────
    let map = processor::compile_map(key_path, grid, config.limits.max_grid_bytes)?;
    let tiles = match tileset_override {
        Some(base) => tileset::read_tileset_info(base)
            .with_context(|| format!("Loading tileset {}", base.display()))?,
        None => match processor::load_tileset(key_path, &map)? {
            Some(info) => info,
            None => bail!(
                "{} names no tileset; add a `tileset` directive or pass --tileset",
                key_path.display()
            ),
        },
    };

    // 2. ── Run ────────────────────────────────────────────────────────
    let mut world =
        World::new(map, tiles, &config.world).with_context(|| "Setting up the world")?;
    let mut renderer = Recorder::default();
    let reports = input::replay(&mut world, &mut renderer, &steps)?;

    // 3. ── Report ─────────────────────────────────────────────────────
    for r in &reports {
        if json {
            println!("{}", serde_json::to_string(r)?);
        } else {
            println!(
                "{:>4}  actor ({:>5}, {:>5})  tile ({:>3}, {:>3})  \
                 camera ({:>5}, {:>5})  sprite {:>2}",
                r.tick,
                r.actor.x,
                r.actor.y,
                r.tile.0,
                r.tile.1,
                r.camera.x,
                r.camera.y,
                r.sprite
            );
        }
    }
    log::info!(
        "{} ticks, {} draw calls in the last frame",
        reports.len(),
        renderer.frame.len()
    );
    Ok(())
}

/// `L`, `R`, `U`, `D` or `.` per tick; whitespace is ignored.
pub fn parse_moves(moves: &str) -> anyhow::Result<Vec<Direction>> {
    moves
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| {
            Direction::from_move(c)
                .with_context(|| format!("Unknown move {c:?} (expected L, R, U, D or .)"))
        })
        .collect()
}
