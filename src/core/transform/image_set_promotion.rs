use super::{StagedChange, TransformContext};
use crate::error::Result;
use crate::image_set::{self, AddonImageSet};

/// Copy the latest staged image set to the channel's environment under its release name.
pub(super) fn promote(ctx: &TransformContext) -> Result<StagedChange> {
    let stage_dir = ctx.target_path(&ctx.channel.stage_image_set_directory());
    let latest = image_set::latest_by_name(&stage_dir)?;
    log_status!("transform", "Using staged image set {}", latest.display());

    let mut set = AddonImageSet::load(&latest)?;
    // Drops any release-candidate suffix used while staging.
    set.name = ctx.channel.image_set_name(ctx.version);

    let relative = ctx.channel.image_set_path(ctx.version);
    set.write(&ctx.target_path(&relative))?;
    log_status!("transform", "Wrote {}", relative);

    Ok(StagedChange::File(relative))
}

#[cfg(test)]
mod tests {
    use super::super::transform;
    use super::*;
    use crate::catalog;
    use crate::version::Version;
    use std::fs;
    use tempfile::TempDir;

    const CATALOG: &str = r#"
addons:
  - name: foo
    bundle: { repo: https://example.com/foo, path: bundles }
    channels:
      - { name: stable, directory: foo, environment: production }
"#;

    fn stage_image_sets(root: &std::path::Path) {
        let dir = root.join("addons/foo/addonimagesets/stage");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("addon.v1.yaml"),
            "name: foo.v1.0.0\nindexImage: quay.io/foo/index:v1\nrelatedImages: []\n",
        )
        .unwrap();
        fs::write(
            dir.join("addon.v2-rc1.yaml"),
            "name: foo.v2.0.0-rc1\nindexImage: quay.io/foo/index:v2-rc1\nrelatedImages:\n  - quay.io/foo/operator:v2\n",
        )
        .unwrap();
    }

    #[test]
    fn stable_promotes_lexicographically_last_image_set() {
        let target = TempDir::new().unwrap();
        stage_image_sets(target.path());

        let catalog = catalog::parse(CATALOG, "addons.yaml").unwrap();
        let (addon, channel) = catalog::resolve(&catalog, "foo", "stable").unwrap();
        let version = Version::parse("2.0.0").unwrap();
        let ctx = TransformContext {
            addon,
            channel,
            version: &version,
            bundle_root: None,
            target_root: target.path(),
        };

        let change = transform(&ctx).unwrap();
        assert_eq!(
            change,
            StagedChange::File("addons/foo/addonimagesets/production/foo.v2.0.0.yaml".to_string())
        );

        let written = AddonImageSet::load(&target.path().join(change.path())).unwrap();
        assert_eq!(written.name, "foo.v2.0.0");
        assert_eq!(written.index_image, "quay.io/foo/index:v2-rc1");
        assert_eq!(written.related_images, vec!["quay.io/foo/operator:v2"]);
    }

    #[test]
    fn stable_without_staged_image_sets_fails() {
        let target = TempDir::new().unwrap();
        let catalog = catalog::parse(CATALOG, "addons.yaml").unwrap();
        let (addon, channel) = catalog::resolve(&catalog, "foo", "stable").unwrap();
        let version = Version::parse("2.0.0").unwrap();
        let ctx = TransformContext {
            addon,
            channel,
            version: &version,
            bundle_root: None,
            target_root: target.path(),
        };

        let err = transform(&ctx).unwrap_err();
        assert_eq!(err.code.as_str(), "transform.missing_file");
    }
}
