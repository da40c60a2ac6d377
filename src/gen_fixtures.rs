use anyhow::{Context, Result};
use clap::Parser;
use maco::fixtures::{generate, FixturePaths};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// Renders the reference images used by the conversion tests.
///
/// Reads `wikipe-tan.png` from the directory and writes
/// `wikipe-tan-grayscale.png` and `wikipe-tan-want.png` beside it.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the source image
    #[arg(long, default_value = "tests/images")]
    dir: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    maco::logging::init(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let paths = FixturePaths::in_dir(&args.dir);
    let fixtures = generate(&paths)
        .with_context(|| format!("Failed to generate fixtures in {}", args.dir.display()))?;

    info!(
        "Rendered {}x{} fixtures",
        fixtures.want.width(),
        fixtures.want.height()
    );
    Ok(())
}
