use crate::cli::Args;
use crate::constants::{
    DEFAULT_EXTENSIONS, DEFAULT_QUALITY, DEFAULT_ROOT_DIR, DEFAULT_WORKERS, MAX_QUALITY,
    MIN_QUALITY,
};
use crate::error::{Result, ShrinkError};
use std::path::PathBuf;

/// Settings for one run, fixed at startup and shared read-only by every
/// component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub root_dir: PathBuf,
    /// `None` means images are replaced in place.
    pub output_dir: Option<PathBuf>,
    pub quality: u8,
    pub worker_count: usize,
    pub overwrite_existing: bool,
    pub preserve_hierarchy: bool,
    /// Lowercase, without the leading dot.
    pub extensions: Vec<String>,
}

impl Config {
    pub fn new(
        root_dir: PathBuf,
        output_dir: Option<PathBuf>,
        quality: i64,
        workers: i64,
    ) -> Result<Self> {
        Ok(Self {
            root_dir,
            output_dir,
            quality: validate_quality(quality)?,
            worker_count: validate_workers(workers)?,
            overwrite_existing: false,
            preserve_hierarchy: false,
            extensions: default_extensions(),
        })
    }

    pub fn from_args(args: &Args) -> Result<Self> {
        let mut config = Self::new(
            args.dir.clone(),
            args.output.clone(),
            args.quality,
            args.workers,
        )?;
        config.overwrite_existing = args.overwrite;
        config.preserve_hierarchy = args.hierarchy;
        if !args.extensions.is_empty() {
            config.extensions = normalize_extensions(&args.extensions);
        }
        Ok(config)
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite_existing = overwrite;
        self
    }

    pub fn with_hierarchy(mut self, preserve: bool) -> Self {
        self.preserve_hierarchy = preserve;
        self
    }

    pub fn in_place(&self) -> bool {
        self.output_dir.is_none()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from(DEFAULT_ROOT_DIR),
            output_dir: None,
            quality: DEFAULT_QUALITY as u8,
            worker_count: DEFAULT_WORKERS as usize,
            overwrite_existing: false,
            preserve_hierarchy: false,
            extensions: default_extensions(),
        }
    }
}

fn validate_quality(quality: i64) -> Result<u8> {
    if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
        return Err(ShrinkError::InvalidQuality(quality));
    }
    Ok(quality as u8)
}

fn validate_workers(workers: i64) -> Result<usize> {
    if workers <= 0 {
        return Err(ShrinkError::InvalidWorkerCount(workers));
    }
    usize::try_from(workers).map_err(|_| ShrinkError::InvalidWorkerCount(workers))
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
}

fn normalize_extensions(raw: &[String]) -> Vec<String> {
    let mut extensions: Vec<String> = raw
        .iter()
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect();
    extensions.sort();
    extensions.dedup();
    extensions
}
