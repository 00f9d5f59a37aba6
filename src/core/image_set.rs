//! Addon image sets: the release descriptor promoted to the stable channel.

use serde::{Deserialize, Serialize};
use serde_yml::Mapping;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::utils::io;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddonImageSet {
    #[serde(rename = "indexImage", default)]
    pub index_image: String,
    pub name: String,
    #[serde(rename = "relatedImages", default)]
    pub related_images: Vec<String>,
    #[serde(flatten)]
    pub extra: Mapping,
}

impl AddonImageSet {
    pub fn load(path: &Path) -> Result<Self> {
        io::load_yaml(path)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        io::write_yaml(self, path)
    }
}

/// Pick the most recent staged image set in `dir`.
///
/// "Most recent" is the greatest file name in plain string order, not a
/// semantic version comparison: `addon.v2-rc1.yaml` sorts after `addon.v10.yaml`.
pub fn latest_by_name(dir: &Path) -> Result<PathBuf> {
    io::list_files_sorted(dir)?
        .pop()
        .ok_or_else(|| {
            Error::missing_file(
                dir.display().to_string(),
                "no staged addon image set found",
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn latest_by_name_is_lexicographic_not_semantic() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("addon.v1.yaml"), "").unwrap();
        fs::write(dir.path().join("addon.v2-rc1.yaml"), "").unwrap();

        let latest = latest_by_name(dir.path()).unwrap();
        assert_eq!(latest.file_name().unwrap(), "addon.v2-rc1.yaml");
    }

    #[test]
    fn latest_by_name_prefers_greater_string_over_greater_number() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("addon.v9.0.0.yaml"), "").unwrap();
        fs::write(dir.path().join("addon.v10.0.0.yaml"), "").unwrap();

        let latest = latest_by_name(dir.path()).unwrap();
        assert_eq!(latest.file_name().unwrap(), "addon.v9.0.0.yaml");
    }

    #[test]
    fn latest_by_name_fails_on_empty_directory() {
        let dir = TempDir::new().unwrap();
        let err = latest_by_name(dir.path()).unwrap_err();
        assert_eq!(err.code.as_str(), "transform.missing_file");
    }

    #[test]
    fn image_set_keeps_additional_fields() {
        let yaml = r#"name: foo.v1.0.0-rc2
indexImage: quay.io/foo/index@sha256:abc
relatedImages:
  - quay.io/foo/operator@sha256:def
addOnParameters:
  - id: size
"#;
        let set: AddonImageSet = serde_yml::from_str(yaml).unwrap();
        assert_eq!(set.related_images.len(), 1);
        let out = serde_yml::to_string(&set).unwrap();
        assert!(out.contains("addOnParameters"));
    }
}
