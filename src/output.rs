//! Destination path policy.
//!
//! | output dir | hierarchy | destination                         |
//! |------------|-----------|-------------------------------------|
//! | unset      | any       | the source file itself              |
//! | set        | yes       | `output/<relative subdir>/<name>`   |
//! | set        | no        | `output/<name>`                     |
//!
//! Flattened mode lets two sources with the same file name target the same
//! destination; the later write replaces the earlier one.

use crate::config::Config;
use crate::discovery::Task;
use crate::error::{Result, ShrinkError};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct OutputResolver {
    output_dir: Option<PathBuf>,
    preserve_hierarchy: bool,
    overwrite_existing: bool,
}

impl OutputResolver {
    pub fn new(config: &Config) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            preserve_hierarchy: config.preserve_hierarchy,
            overwrite_existing: config.overwrite_existing,
        }
    }

    pub fn destination_for(&self, task: &Task) -> PathBuf {
        let Some(output_dir) = &self.output_dir else {
            return task.source.clone();
        };
        let file_name = task.source.file_name().unwrap_or(task.source.as_os_str());
        if self.preserve_hierarchy {
            output_dir.join(&task.relative_subdir).join(file_name)
        } else {
            output_dir.join(file_name)
        }
    }

    /// Computes the destination and makes sure its directory exists.
    pub fn resolve(&self, task: &Task) -> Result<PathBuf> {
        let destination = self.destination_for(task);
        if self.output_dir.is_some() {
            if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|source| ShrinkError::Destination {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        Ok(destination)
    }

    /// Removes a file already sitting at `destination` when overwriting was
    /// requested. Missing files are fine. The task's own source is never
    /// removed; the rename replaces it.
    pub fn clear_existing(&self, task: &Task, destination: &Path) -> Result<()> {
        if !self.overwrite_existing || destination == task.source {
            return Ok(());
        }
        match fs::remove_file(destination) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ShrinkError::Destination {
                path: destination.to_path_buf(),
                source,
            }),
        }
    }

    /// Destinations targeted by more than one task, with the number of tasks
    /// writing there. Sorted by path.
    pub fn collisions(&self, tasks: &[Task]) -> Vec<(PathBuf, usize)> {
        let mut counts: HashMap<PathBuf, usize> = HashMap::new();
        for task in tasks {
            *counts.entry(self.destination_for(task)).or_insert(0) += 1;
        }
        let mut collisions: Vec<(PathBuf, usize)> =
            counts.into_iter().filter(|(_, count)| *count > 1).collect();
        collisions.sort();
        collisions
    }
}
