use std::process::ExitCode;

use clap::Parser;
use prisma::cli::Cli;

fn main() -> ExitCode {
    let args = Cli::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match prisma::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(prisma::exit_code(&err))
        }
    }
}
