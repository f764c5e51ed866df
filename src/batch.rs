use crate::codec::{Codec, ImageCodec};
use crate::config::Config;
use crate::constants::{PROGRESS_BAR_TEMPLATE, SUCCESS_PREFIX, TEMP_FILE_PREFIX, TEMP_FILE_SUFFIX};
use crate::discovery::{discover, Task};
use crate::error::{Result, ShrinkError};
use crate::output::OutputResolver;
use crate::pool::{BatchOutcome, WorkerPool};
use crate::utils::{calculate_compression_ratio, format_file_size};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// What a successfully recompressed image turned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressStats {
    pub destination: PathBuf,
    pub original_size: u64,
    pub compressed_size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub discovered: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub original_bytes: u64,
    pub compressed_bytes: u64,
    pub elapsed: Duration,
}

impl BatchSummary {
    fn from_outcome(outcome: &BatchOutcome<Task, CompressStats, ShrinkError>, elapsed: Duration) -> Self {
        let (original_bytes, compressed_bytes) = outcome
            .successes()
            .filter_map(|o| o.result.as_ref().ok())
            .fold((0, 0), |(before, after), stats| {
                (before + stats.original_size, after + stats.compressed_size)
            });
        Self {
            discovered: outcome.total_submitted,
            succeeded: outcome.completed - outcome.failed_count(),
            failed: outcome.failed_count(),
            original_bytes,
            compressed_bytes,
            elapsed,
        }
    }

    pub fn compression_ratio(&self) -> f64 {
        calculate_compression_ratio(self.original_bytes, self.compressed_bytes)
    }
}

pub fn run_batch(config: &Config) -> Result<BatchSummary> {
    run_batch_with(config, &ImageCodec)
}

/// Discovers every image under the configured root and recompresses them
/// through the worker pool. Individual failures are printed and counted;
/// only configuration and discovery problems return an error.
pub fn run_batch_with<C: Codec>(config: &Config, codec: &C) -> Result<BatchSummary> {
    let pool = WorkerPool::new(config.worker_count)?;
    let start_time = Instant::now();

    crate::verbose!("Scanning {}", config.root_dir.display());
    let tasks = discover(&config.root_dir, &config.extensions)?;

    if let Some(output_dir) = &config.output_dir {
        fs::create_dir_all(output_dir).map_err(|source| ShrinkError::DirectoryCreationFailed {
            path: output_dir.clone(),
            source,
        })?;
    }

    if tasks.is_empty() {
        crate::info!("No image files found under {}", config.root_dir.display());
        return Ok(BatchSummary::from_outcome(&BatchOutcome::default(), start_time.elapsed()));
    }

    let resolver = OutputResolver::new(config);
    if !config.preserve_hierarchy {
        for (destination, count) in resolver.collisions(&tasks) {
            crate::warn!(
                "{} images share the destination {}; only the last one written is kept",
                count,
                destination.display()
            );
        }
    }

    crate::verbose!(
        "Found {} images, running {} workers",
        tasks.len(),
        pool.capacity().min(tasks.len())
    );

    let progress = progress_bar(tasks.len() as u64);
    let outcome = pool.run(tasks, |task| {
        let result = compress_task(task, config, &resolver, codec);
        report(&progress, task, &result);
        result
    })?;
    progress.finish_and_clear();

    let summary = BatchSummary::from_outcome(&outcome, start_time.elapsed());
    print_summary(&summary);
    Ok(summary)
}

/// Recompresses one image: read, decode, resolve the destination, encode
/// into a temporary file next to it and move that into place.
pub fn compress_task<C: Codec>(
    task: &Task,
    config: &Config,
    resolver: &OutputResolver,
    codec: &C,
) -> Result<CompressStats> {
    let bytes = fs::read(&task.source).map_err(|source| ShrinkError::Open {
        path: task.source.clone(),
        source,
    })?;
    let (image, kind) = codec.decode(&bytes)?;

    let destination = resolver.resolve(task)?;
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = tempfile::Builder::new()
        .prefix(TEMP_FILE_PREFIX)
        .suffix(TEMP_FILE_SUFFIX)
        .tempfile_in(dir)
        .map_err(|source| ShrinkError::Destination {
            path: dir.to_path_buf(),
            source,
        })?;

    {
        let mut writer = BufWriter::new(staged.as_file_mut());
        codec.encode(&image, kind, config.quality, &mut writer)?;
        writer.flush().map_err(|source| ShrinkError::Close {
            path: destination.clone(),
            source,
        })?;
    }
    let close_error = |source| ShrinkError::Close {
        path: destination.clone(),
        source,
    };
    staged.as_file().sync_all().map_err(close_error)?;
    let compressed_size = staged.as_file().metadata().map_err(close_error)?.len();

    // temp files are created owner-only; keep the source's mode instead
    if let Ok(metadata) = fs::metadata(&task.source) {
        fs::set_permissions(staged.path(), metadata.permissions()).map_err(|source| {
            ShrinkError::Destination {
                path: staged.path().to_path_buf(),
                source,
            }
        })?;
    }

    resolver.clear_existing(task, &destination)?;
    staged
        .persist(&destination)
        .map_err(|err| close_error(err.error))?;

    crate::verbose!(
        "{} ({}) -> {}: {} -> {}",
        task.source.display(),
        kind.mime_type(),
        destination.display(),
        format_file_size(bytes.len() as u64),
        format_file_size(compressed_size)
    );

    Ok(CompressStats {
        destination,
        original_size: bytes.len() as u64,
        compressed_size,
    })
}

fn progress_bar(len: u64) -> ProgressBar {
    let progress = if crate::logger::is_quiet() {
        ProgressBar::with_draw_target(Some(len), ProgressDrawTarget::hidden())
    } else {
        ProgressBar::new(len)
    };
    if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_BAR_TEMPLATE) {
        progress.set_style(style.progress_chars("#>-"));
    }
    progress
}

/// One stdout line per finished image. Failures are printed even in quiet
/// mode.
fn report(progress: &ProgressBar, task: &Task, result: &Result<CompressStats>) {
    progress.suspend(|| match result {
        Ok(_) => crate::info!("{} {}", SUCCESS_PREFIX, task.source.display()),
        Err(err) => println!("{}: {}", task.source.display(), err),
    });
    progress.inc(1);
}

fn print_summary(summary: &BatchSummary) {
    crate::info!("\n📊 Batch Compression Summary:");
    crate::info!("  📁 Total files processed: {}", summary.succeeded);
    crate::info!(
        "  📊 Total original size: {}",
        format_file_size(summary.original_bytes)
    );
    crate::info!(
        "  📊 Total compressed size: {}",
        format_file_size(summary.compressed_bytes)
    );
    crate::info!("  🎯 Overall compression ratio: {:.1}%", summary.compression_ratio());
    crate::info!("  ⏱️  Total time: {:?}", summary.elapsed);
    let seconds = summary.elapsed.as_secs_f64();
    if seconds > 0.0 {
        crate::info!(
            "  ⚡ Average speed: {:.2} files/second",
            (summary.succeeded + summary.failed) as f64 / seconds
        );
    }
    if summary.failed > 0 {
        crate::info!("  ⚠️  Failed files: {}", summary.failed);
    }
}
