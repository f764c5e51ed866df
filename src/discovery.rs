use crate::error::{Result, ShrinkError};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One image to recompress.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Task {
    pub source: PathBuf,
    /// Parent directory of `source` relative to the scanned root; empty for
    /// files sitting directly in the root.
    pub relative_subdir: PathBuf,
}

impl Task {
    pub fn new(source: impl Into<PathBuf>, relative_subdir: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            relative_subdir: relative_subdir.into(),
        }
    }
}

/// Case-insensitive match of the file name against `.ext` suffixes.
pub fn is_candidate(path: &Path, extensions: &[String]) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let name = name.to_string_lossy().to_lowercase();
    extensions.iter().any(|ext| {
        name.len() > ext.len()
            && name.ends_with(ext.as_str())
            && name.as_bytes()[name.len() - ext.len() - 1] == b'.'
    })
}

pub fn discover(root: &Path, extensions: &[String]) -> Result<Vec<Task>> {
    discover_with(root, extensions, |err| {
        crate::warn!("Skipping unreadable entry: {}", err);
    })
}

/// Walks `root` and collects every matching regular file.
///
/// Entries below the root that cannot be read are handed to `on_skip` and
/// the walk continues. A root that cannot be read is fatal.
pub fn discover_with<F>(root: &Path, extensions: &[String], mut on_skip: F) -> Result<Vec<Task>>
where
    F: FnMut(&walkdir::Error),
{
    if !root.is_dir() {
        return Err(ShrinkError::RootNotFound(root.to_path_buf()));
    }

    let mut tasks = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return Err(ShrinkError::Discovery {
                    root: root.to_path_buf(),
                    source: err,
                })
            }
            Err(err) => {
                on_skip(&err);
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_candidate(entry.path(), extensions) {
            continue;
        }

        let relative_subdir = entry
            .path()
            .parent()
            .and_then(|parent| parent.strip_prefix(root).ok())
            .map(Path::to_path_buf)
            .unwrap_or_default();
        tasks.push(Task::new(entry.path(), relative_subdir));
    }

    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_EXTENSIONS;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn exts() -> Vec<String> {
        DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
    }

    fn sorted_names(tasks: &[Task]) -> Vec<String> {
        let mut names: Vec<String> = tasks
            .iter()
            .map(|t| t.source.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_is_candidate() {
        let exts = exts();
        assert!(is_candidate(Path::new("a.jpg"), &exts));
        assert!(is_candidate(Path::new("a.JPEG"), &exts));
        assert!(is_candidate(Path::new("dir/a.PnG"), &exts));
        assert!(is_candidate(Path::new("a.gif"), &exts));
        assert!(is_candidate(Path::new(".jpg"), &exts));

        assert!(!is_candidate(Path::new("a.txt"), &exts));
        assert!(!is_candidate(Path::new("ajpg"), &exts));
        assert!(!is_candidate(Path::new("a.jpg.bak"), &exts));
        assert!(!is_candidate(Path::new("jpg"), &exts));
    }

    #[test]
    fn test_is_candidate_custom_extensions() {
        let only_png = vec!["png".to_string()];
        assert!(is_candidate(Path::new("a.png"), &only_png));
        assert!(!is_candidate(Path::new("a.gif"), &only_png));
    }

    #[test]
    fn test_discover_filters_by_extension() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("a.jpg")).unwrap();
        File::create(temp_dir.path().join("b.png")).unwrap();
        File::create(temp_dir.path().join("c.txt")).unwrap();

        let tasks = discover(temp_dir.path(), &exts()).unwrap();
        assert_eq!(sorted_names(&tasks), vec!["a.jpg", "b.png"]);
        for task in &tasks {
            assert_eq!(task.relative_subdir, PathBuf::new());
        }
    }

    #[test]
    fn test_discover_records_relative_subdir() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        File::create(nested.join("img.png")).unwrap();

        let tasks = discover(temp_dir.path(), &exts()).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].source, nested.join("img.png"));
        assert_eq!(tasks[0].relative_subdir, Path::new("a").join("b"));
    }

    #[test]
    fn test_discover_ignores_directories_named_like_images() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("album.jpg")).unwrap();
        File::create(temp_dir.path().join("album.jpg").join("x.png")).unwrap();

        let tasks = discover(temp_dir.path(), &exts()).unwrap();
        assert_eq!(sorted_names(&tasks), vec!["x.png"]);
    }

    #[test]
    fn test_discover_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let result = discover(&temp_dir.path().join("missing"), &exts());
        assert!(matches!(result, Err(ShrinkError::RootNotFound(_))));
    }

    #[test]
    fn test_discover_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let tasks = discover(temp_dir.path(), &exts()).unwrap();
        assert!(tasks.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_skips_unreadable_subdirectory() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("top.jpg")).unwrap();
        let locked = temp_dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        File::create(locked.join("hidden.jpg")).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            eprintln!("skipped: permission bits are not enforced for this user");
            return;
        }

        let mut skipped = Vec::new();
        let tasks = discover_with(temp_dir.path(), &exts(), |err| {
            skipped.push(err.path().map(Path::to_path_buf))
        })
        .unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(sorted_names(&tasks), vec!["top.jpg"]);
        assert_eq!(skipped, vec![Some(locked)]);
    }
}
