use anyhow::{Context, Result};
use clap::Parser;
use maco::fixtures::{quad_image, sample_image, SOURCE_NAME};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Write synthetic source images for the fixture tests", long_about = None)]
struct Args {
    /// Directory to write the images into
    #[arg(long, default_value = "tests/images")]
    dir: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    fs::create_dir_all(&args.dir)
        .with_context(|| format!("Failed to create {}", args.dir.display()))?;

    let quad = args.dir.join("quad.png");
    quad_image()
        .save(&quad)
        .with_context(|| format!("Failed to write {}", quad.display()))?;

    let sample = args.dir.join(SOURCE_NAME);
    sample_image(64, 48)
        .save(&sample)
        .with_context(|| format!("Failed to write {}", sample.display()))?;

    eprintln!("Created {} and {}", quad.display(), sample.display());
    Ok(())
}
