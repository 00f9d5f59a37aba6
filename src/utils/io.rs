//! File I/O primitives with consistent error handling.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Read file contents with standardized error handling.
pub fn read_file(path: &Path, operation: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::missing_file(path.display().to_string(), operation)
        } else {
            Error::internal_io(e.to_string(), Some(operation.to_string()))
        }
    })
}

/// Write content to file, creating parent directories as needed.
pub fn write_file(path: &Path, content: &str, operation: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| Error::internal_io(e.to_string(), Some(format!("{} (create dir)", operation))))?;
    }
    fs::write(path, content)
        .map_err(|e| Error::internal_io(e.to_string(), Some(operation.to_string())))
}

/// Load a YAML file into a typed structure.
pub fn load_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = read_file(path, "read yaml")?;
    serde_yml::from_str(&content).map_err(|e| {
        Error::internal_yaml(e.to_string(), Some(format!("parse {}", path.display())))
    })
}

/// Serialize a structure as YAML and write it to `path`.
pub fn write_yaml<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let content = serde_yml::to_string(value).map_err(|e| {
        Error::internal_yaml(e.to_string(), Some(format!("serialize {}", path.display())))
    })?;
    write_file(path, &content, "write yaml")
}

/// Recursively copy every file under `source` into `destination`, keeping relative layout.
///
/// Nothing is rolled back on failure; files copied before the error stay in place.
pub fn copy_directory(source: &Path, destination: &Path) -> Result<usize> {
    let copy_err = |e: String| {
        Error::copy_failed(
            source.display().to_string(),
            destination.display().to_string(),
            e,
        )
    };

    if !source.is_dir() {
        return Err(copy_err("source directory does not exist".to_string()));
    }

    let pattern = format!(
        "{}/**/*",
        glob::Pattern::escape(&source.to_string_lossy())
    );
    let entries = glob::glob(&pattern).map_err(|e| copy_err(e.to_string()))?;

    fs::create_dir_all(destination).map_err(|e| copy_err(e.to_string()))?;

    let mut copied = 0;
    for entry in entries {
        let path = entry.map_err(|e| copy_err(e.to_string()))?;
        let relative = path
            .strip_prefix(source)
            .map_err(|e| copy_err(e.to_string()))?;
        let target = destination.join(relative);

        if path.is_dir() {
            fs::create_dir_all(&target).map_err(|e| copy_err(e.to_string()))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| copy_err(e.to_string()))?;
            }
            fs::copy(&path, &target).map_err(|e| copy_err(e.to_string()))?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// List regular files in `dir`, sorted by file name (byte-wise string order).
pub fn list_files_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::missing_file(dir.display().to_string(), "list directory")
        } else {
            Error::internal_io(e.to_string(), Some(format!("list {}", dir.display())))
        }
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|e| Error::internal_io(e.to_string(), Some(format!("list {}", dir.display()))))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn read_file_returns_missing_file_error() {
        let result = read_file(Path::new("/nonexistent/path.txt"), "test read");
        let err = result.unwrap_err();
        assert_eq!(err.code.as_str(), "transform.missing_file");
    }

    #[test]
    fn write_file_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/c.txt");
        write_file(&path, "content", "test write").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "content");
    }

    #[test]
    fn copy_directory_preserves_relative_structure() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("manifests")).unwrap();
        fs::write(src.path().join("bundle.Dockerfile"), "FROM scratch").unwrap();
        fs::write(src.path().join("manifests/foo.yaml"), "kind: Foo").unwrap();
        fs::write(src.path().join(".hidden"), "x").unwrap();

        let target = dst.path().join("out");
        let copied = copy_directory(src.path(), &target).unwrap();

        assert_eq!(copied, 3);
        assert!(target.join("bundle.Dockerfile").is_file());
        assert_eq!(
            fs::read_to_string(target.join("manifests/foo.yaml")).unwrap(),
            "kind: Foo"
        );
        assert!(target.join(".hidden").is_file());
    }

    #[test]
    fn copy_directory_fails_for_missing_source() {
        let dst = TempDir::new().unwrap();
        let err = copy_directory(Path::new("/nonexistent/bundle"), dst.path()).unwrap_err();
        assert_eq!(err.code.as_str(), "transform.copy_failed");
    }

    #[test]
    fn list_files_sorted_orders_by_name() {
        let dir = TempDir::new().unwrap();
        for name in ["b.yaml", "a.yaml", "c.yaml"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("z-dir")).unwrap();

        let names: Vec<String> = list_files_sorted(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.yaml", "b.yaml", "c.yaml"]);
    }

    #[test]
    fn yaml_round_trips_through_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.yaml");
        let mut doc = BTreeMap::new();
        doc.insert("key".to_string(), "value".to_string());

        write_yaml(&doc, &path).unwrap();
        let loaded: BTreeMap<String, String> = load_yaml(&path).unwrap();
        assert_eq!(loaded, doc);
    }
}
