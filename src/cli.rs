use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Configuration file (defaults to ./prisma.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Log pipeline progress at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a .mf map key and print a summary
    Check {
        key: PathBuf,
    },
    /// Compile a key + grid pair into map.json and map.bin
    Compile {
        key: PathBuf,
        grid: PathBuf,
        /// Output directory
        output: PathBuf,
    },
    /// Run the world headlessly, one move per tick
    Walk {
        key: PathBuf,
        grid: PathBuf,
        /// Moves as a string of L, R, U, D and `.` (stand still)
        #[arg(long, default_value = "")]
        moves: String,
        /// Tileset base path, overriding the key's `tileset` directive
        #[arg(long)]
        tileset: Option<PathBuf>,
        /// Print one JSON object per tick instead of a table
        #[arg(long)]
        json: bool,
    },
}
