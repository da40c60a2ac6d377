use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use maco::{
    process_existing_files, process_file, run_file_watcher_with_timeout, ConvertConfig,
    ConvertParams, ConvertSettings, Outcome,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert images to contrast-stretched grayscale PNGs", long_about = None)]
struct Args {
    /// Image file or directory of originals to convert
    #[arg(env = "MACO_INPUT", default_value = "originals")]
    input: PathBuf,

    /// Directory to save converted images to
    #[arg(long, env = "MACO_OUTPUT_DIR", default_value = "images")]
    output_dir: PathBuf,

    /// Maximum output width (0 keeps the original width)
    #[arg(long, env = "MACO_WIDTH")]
    width: Option<u32>,

    /// Maximum output height (0 keeps the original height)
    #[arg(long, env = "MACO_HEIGHT")]
    height: Option<u32>,

    /// Enlarge images smaller than the bounding box
    #[arg(long)]
    upscale: bool,

    /// Percent of darkest and lightest pixels ignored by the contrast stretch
    #[arg(long, env = "MACO_CUTOFF")]
    cutoff: Option<f64>,

    /// Gamma modifier; values < 1 darken, values > 1 brighten
    #[arg(long, env = "MACO_GAMMA")]
    gamma: Option<f64>,

    /// Resampling filter: nearest, triangle, catmullrom, gaussian, lanczos3
    #[arg(long, env = "MACO_FILTER")]
    filter: Option<String>,

    /// Stretch colour channels independently
    #[arg(long)]
    no_preserve_tone: bool,

    /// JSON file with conversion parameters; flags override it
    #[arg(long, env = "MACO_PARAMS_FILE")]
    params_file: Option<PathBuf>,

    /// Convert even if the output already exists
    #[arg(long)]
    overwrite: bool,

    /// Keep watching the input directory for changes
    #[arg(long)]
    watch: bool,

    /// Stop watching after this many milliseconds
    #[arg(long, requires = "watch")]
    watch_timeout_ms: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn settings(&self) -> Result<ConvertSettings> {
        let mut settings = match self.params_file {
            Some(ref path) => ConvertSettings::load(path)?,
            None => ConvertSettings::default(),
        };
        settings.merge(ConvertSettings {
            width: self.width,
            height: self.height,
            upscale: self.upscale.then_some(true),
            cutoff: self.cutoff,
            preserve_tone: self.no_preserve_tone.then_some(false),
            filter: self.filter.clone(),
            gamma: self.gamma,
        });
        Ok(settings)
    }
}

struct Job {
    originals_dir: PathBuf,
    output_dir: PathBuf,
    params: ConvertParams,
    overwrite: bool,
}

impl ConvertConfig for Job {
    fn originals_dir(&self) -> &Path {
        &self.originals_dir
    }

    fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn params(&self) -> &ConvertParams {
        &self.params
    }

    fn overwrite(&self) -> bool {
        self.overwrite
    }
}

fn main() -> ExitCode {
    // Load environment variables from .env file if present
    dotenv().ok();

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
    let params = args.settings()?.to_params()?;

    if !args.output_dir.exists() {
        fs::create_dir_all(&args.output_dir).with_context(|| {
            format!(
                "Failed to create output directory {}",
                args.output_dir.display()
            )
        })?;
    }

    if args.input.is_file() {
        let job = Job {
            originals_dir: args
                .input
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
            output_dir: args.output_dir.clone(),
            params,
            overwrite: args.overwrite,
        };
        return match process_file(&args.input, &job)? {
            Outcome::Converted(_) | Outcome::AlreadyExists(_) => Ok(()),
            Outcome::Unsupported => {
                anyhow::bail!("Unsupported image type: {}", args.input.display())
            }
        };
    }

    if !args.input.is_dir() {
        if !args.watch {
            anyhow::bail!("Input does not exist: {}", args.input.display());
        }
        fs::create_dir_all(&args.input).with_context(|| {
            format!("Failed to create originals directory {}", args.input.display())
        })?;
    }

    let job = Job {
        originals_dir: args.input.clone(),
        output_dir: args.output_dir.clone(),
        params,
        overwrite: args.overwrite,
    };

    info!("Converting images from {}", job.originals_dir.display());
    info!("Saving converted images to {}", job.output_dir.display());

    process_existing_files(&job)?;

    if args.watch {
        run_file_watcher_with_timeout(&job, args.watch_timeout_ms)?;
    }

    Ok(())
}
