use anyhow::Context;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::cmp::min;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::convert::{convert_dynamic, ConvertParams};
use crate::io::{is_supported_image, load_image, save_gray_png};

pub trait ConvertConfig {
    fn originals_dir(&self) -> &Path;
    fn output_dir(&self) -> &Path;
    fn params(&self) -> &ConvertParams;
    /// Re-convert even if the output file already exists.
    fn overwrite(&self) -> bool {
        false
    }
}

/// What [`process_file`] did with one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Converted(PathBuf),
    AlreadyExists(PathBuf),
    Unsupported,
}

pub fn process_existing_files<T: ConvertConfig>(args: &T) -> anyhow::Result<usize> {
    let entries = fs::read_dir(args.originals_dir()).with_context(|| {
        format!(
            "Failed to read originals directory {}",
            args.originals_dir().display()
        )
    })?;

    let mut files = entries
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let path = entry.path();
            if path.is_file() {
                Some(path)
            } else {
                None
            }
        })
        .collect::<Vec<PathBuf>>();
    files.sort();

    info!("Found {} existing files to process", files.len());

    let mut converted = 0;
    for file_path in &files {
        if let Outcome::Converted(_) = process_file(file_path, args)? {
            converted += 1;
        }
    }

    info!("Converted {} of {} existing files", converted, files.len());

    Ok(converted)
}

fn handle_file_system_events<T: ConvertConfig>(
    rx: Receiver<notify::Result<Event>>,
    args: &T,
    timeout_ms: Option<u64>,
) -> anyhow::Result<()> {
    let start_time = std::time::Instant::now();

    loop {
        let wait_time_remaining = if let Some(timeout_ms) = timeout_ms {
            let elapsed = start_time.elapsed().as_millis() as u64;
            if timeout_ms <= elapsed {
                info!("Timeout reached, exiting watcher");
                break;
            }
            min(1000, timeout_ms - elapsed)
        } else {
            1000
        };

        // Short recv timeout so the overall timeout is checked regularly.
        match rx.recv_timeout(Duration::from_millis(wait_time_remaining)) {
            Ok(Ok(event)) => match event.kind {
                EventKind::Create(_) | EventKind::Modify(_) => {
                    for path in event.paths {
                        if path.is_file() {
                            debug!("File changed: {}", path.display());
                            if let Err(e) = process_file(&path, args) {
                                error!("Error processing {}: {:#}", path.display(), e);
                            }
                        }
                    }
                }
                EventKind::Remove(_) => {
                    for path in event.paths {
                        debug!("File removed: {}", path.display());
                        if let Err(e) = handle_removed_file(&path, args) {
                            error!("Error handling removed file {}: {:#}", path.display(), e);
                        }
                    }
                }
                _ => {}
            },
            Ok(Err(e)) => warn!("Watch error: {:?}", e),
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => continue,
            Err(e) => {
                error!("Channel error: {:?}", e);
                return Err(e.into());
            }
        }
    }
    Ok(())
}

/// Get the output path for a given input file path: same stem, `.png`.
pub fn output_path(file_path: &Path, output_dir: &Path) -> anyhow::Result<PathBuf> {
    let file_stem = file_path
        .file_stem()
        .with_context(|| format!("Invalid file path {}", file_path.display()))?;

    let mut output_filename = file_stem.to_os_string();
    output_filename.push(".png");
    Ok(output_dir.join(output_filename))
}

/// Converts one original into the output directory.
pub fn process_file<T: ConvertConfig>(file_path: &Path, args: &T) -> anyhow::Result<Outcome> {
    if !is_supported_image(file_path) {
        debug!("Skipping unsupported file: {}", file_path.display());
        return Ok(Outcome::Unsupported);
    }

    let output_path = output_path(file_path, args.output_dir())?;

    if output_path.exists() && !args.overwrite() {
        debug!("Output file already exists, skipping: {}", output_path.display());
        return Ok(Outcome::AlreadyExists(output_path));
    }

    let image = load_image(file_path)?;
    let converted = convert_dynamic(&image, args.params());
    save_gray_png(&converted, &output_path)
        .with_context(|| format!("Failed to convert {}", file_path.display()))?;

    info!(
        "Converted {} -> {} ({}x{})",
        file_path.display(),
        output_path.display(),
        converted.width(),
        converted.height()
    );

    Ok(Outcome::Converted(output_path))
}

/// Handle a file that has been removed from the originals directory.
/// Returns whether an output file was deleted.
pub fn handle_removed_file<T: ConvertConfig>(file_path: &Path, args: &T) -> anyhow::Result<bool> {
    if !is_supported_image(file_path) {
        return Ok(false);
    }
    let output_path = output_path(file_path, args.output_dir())?;

    if output_path.exists() {
        info!("Removing corresponding output file: {}", output_path.display());
        fs::remove_file(&output_path)
            .with_context(|| format!("Failed to remove output file: {}", output_path.display()))?;
        Ok(true)
    } else {
        debug!("No corresponding output file found for: {}", file_path.display());
        Ok(false)
    }
}

/// Watches the originals directory, converting new files and deleting the
/// outputs of removed ones. Runs until `timeout_ms` elapses, or forever.
pub fn run_file_watcher_with_timeout<T: ConvertConfig>(
    args: &T,
    timeout_ms: Option<u64>,
) -> anyhow::Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();
    let mut watcher =
        RecommendedWatcher::new(tx, Config::default()).context("Failed to create file watcher")?;

    watcher
        .watch(args.originals_dir(), RecursiveMode::NonRecursive)
        .context("Failed to watch directory")?;

    match timeout_ms {
        Some(tout) => info!("Watching for new files with timeout of {}ms...", tout),
        None => info!("Watching for new files..."),
    }

    handle_file_system_events(rx, args, timeout_ms)
}
