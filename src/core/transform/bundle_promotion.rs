use std::fs;
use std::path::Path;

use super::{identity, overrides, Promotion, StagedChange, TransformContext};
use crate::error::{Error, Result};
use crate::manifest::{self, ClusterServiceVersion, MetadataAnnotations, SINGLE_NAMESPACE};
use crate::utils::io;

const PACKAGING_DESCRIPTOR: &str = "bundle.Dockerfile";
const SCORECARD_TESTS_DIR: &str = "tests";

/// Copy the version's bundle into `addons/<dir>/main/<base>/` and rewrite its manifests.
pub(super) fn promote(ctx: &TransformContext, promotion: Promotion) -> Result<StagedChange> {
    let bundle_root = ctx.bundle_root.ok_or_else(|| {
        Error::missing_file(
            ctx.addon.bundle.repo.clone(),
            "bundle sources are required for stage and edge promotions",
        )
    })?;

    let base = ctx.version.base();
    let source = bundle_root.join(&ctx.addon.bundle.path).join(&base);
    let relative = ctx.channel.bundle_path(ctx.version);
    let destination = ctx.target_path(&relative);

    log_status!(
        "transform",
        "Copying {} to {}",
        source.display(),
        destination.display()
    );
    let copied = io::copy_directory(&source, &destination)?;
    log_status!("transform", "Copied {} file(s)", copied);

    remove_packaging_descriptor(&destination)?;
    remove_scorecard_tests(&destination)?;
    update_manifests(ctx, promotion, &destination)?;

    Ok(StagedChange::Directory(relative))
}

fn remove_packaging_descriptor(destination: &Path) -> Result<()> {
    let path = destination.join(PACKAGING_DESCRIPTOR);
    fs::remove_file(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::missing_file(
                path.display().to_string(),
                "bundle copy did not produce a packaging descriptor",
            )
        } else {
            Error::internal_io(e.to_string(), Some(format!("remove {}", path.display())))
        }
    })
}

/// Scorecard tests only exist in newer bundles.
fn remove_scorecard_tests(destination: &Path) -> Result<()> {
    let path = destination.join(SCORECARD_TESTS_DIR);
    match fs::metadata(&path) {
        Ok(_) => fs::remove_dir_all(&path)
            .map_err(|e| Error::internal_io(e.to_string(), Some(format!("remove {}", path.display())))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log_status!("transform", "No scorecard tests in bundle, skipping removal");
            Ok(())
        }
        Err(e) => Err(Error::internal_io(
            e.to_string(),
            Some(format!("stat {}", path.display())),
        )),
    }
}

fn update_manifests(ctx: &TransformContext, promotion: Promotion, bundle_dir: &Path) -> Result<()> {
    let csv_path = bundle_dir
        .join("manifests")
        .join(manifest::manifest_file_name(&ctx.addon.name));
    let annotations_path = bundle_dir.join("metadata").join("annotations.yaml");

    log_status!("transform", "Updating CSV manifest {}", csv_path.display());
    let mut csv = ClusterServiceVersion::load(&csv_path)?;
    let mut annotations = MetadataAnnotations::load(&annotations_path)?;

    if let Some(ov) = &ctx.addon.deployment_override {
        overrides::apply_override(&mut csv, ov);
    }

    if let Some(rule) = identity::rule_for(&ctx.addon.name, promotion.as_str()) {
        rule.apply(&mut csv, &mut annotations)?;
    }

    csv.enable_install_mode(SINGLE_NAMESPACE)?;

    csv.write(&csv_path)?;
    annotations.write(&annotations_path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::transform;
    use super::*;
    use crate::catalog::{self, AddonCatalog};
    use crate::manifest::fixtures::{ANNOTATIONS, CSV};
    use crate::version::Version;
    use tempfile::TempDir;

    const CATALOG: &str = r#"
addons:
  - name: managed-api-service
    bundle: { repo: https://example.com/rhoam, path: bundles/managed-api-service }
    channels:
      - { name: stage, directory: managed-api-service, environment: stage, allow_pre_release: true }
      - { name: edge, directory: managed-api-service-internal, environment: stage, allow_pre_release: true }
    override:
      deployment:
        name: rhmi-operator
        container:
          name: rhmi-operator
          env_vars:
            - { name: USE_CLUSTER_STORAGE, value: "false" }
"#;

    fn write_bundle(root: &Path, with_tests: bool) {
        let dir = root.join("bundles/managed-api-service/1.2.3");
        fs::create_dir_all(dir.join("manifests")).unwrap();
        fs::create_dir_all(dir.join("metadata")).unwrap();
        fs::write(dir.join("bundle.Dockerfile"), "FROM scratch\n").unwrap();
        fs::write(
            dir.join("manifests/managed-api-service.clusterserviceversion.yaml"),
            CSV,
        )
        .unwrap();
        fs::write(dir.join("manifests/crd.yaml"), "kind: CustomResourceDefinition\n").unwrap();
        fs::write(dir.join("metadata/annotations.yaml"), ANNOTATIONS).unwrap();
        if with_tests {
            fs::create_dir_all(dir.join("tests/scorecard")).unwrap();
            fs::write(dir.join("tests/scorecard/config.yaml"), "kind: Configuration\n").unwrap();
        }
    }

    fn run(channel: &str, with_tests: bool) -> (TempDir, TempDir, Result<StagedChange>) {
        let bundle = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        write_bundle(bundle.path(), with_tests);

        let catalog: AddonCatalog = catalog::parse(CATALOG, "addons.yaml").unwrap();
        let (addon, channel) = catalog::resolve(&catalog, "managed-api-service", channel).unwrap();
        let version = Version::parse("1.2.3-rc1").unwrap();
        let ctx = TransformContext {
            addon,
            channel,
            version: &version,
            bundle_root: Some(bundle.path()),
            target_root: target.path(),
        };
        let result = transform(&ctx);
        (bundle, target, result)
    }

    #[test]
    fn stage_copies_bundle_and_drops_packaging_and_tests() {
        let (_bundle, target, result) = run("stage", true);
        let change = result.unwrap();
        assert_eq!(
            change,
            StagedChange::Directory("addons/managed-api-service/main/1.2.3/".to_string())
        );

        let dest = target.path().join("addons/managed-api-service/main/1.2.3");
        assert!(dest.join("manifests/crd.yaml").is_file());
        assert!(!dest.join("bundle.Dockerfile").exists());
        assert!(!dest.join("tests").exists());
    }

    #[test]
    fn stage_without_tests_directory_succeeds() {
        let (_bundle, target, result) = run("stage", false);
        assert!(result.is_ok());
        let dest = target.path().join("addons/managed-api-service/main/1.2.3");
        assert!(!dest.join("bundle.Dockerfile").exists());
    }

    #[test]
    fn stage_applies_override_and_install_mode_but_keeps_identity() {
        let (_bundle, target, result) = run("stage", false);
        result.unwrap();

        let csv_path = target.path().join(
            "addons/managed-api-service/main/1.2.3/manifests/managed-api-service.clusterserviceversion.yaml",
        );
        let mut csv = ClusterServiceVersion::load(&csv_path).unwrap();
        assert_eq!(csv.metadata.name, "managed-api-service.v1.2.3");
        assert_eq!(csv.spec.replaces.as_deref(), Some("managed-api-service.v1.2.2"));
        assert!(csv
            .spec
            .install_modes
            .iter()
            .any(|m| m.mode_type == SINGLE_NAMESPACE && m.supported));

        let container = csv
            .find_deployment_mut("rhmi-operator")
            .unwrap()
            .find_container_mut("rhmi-operator")
            .unwrap();
        assert_eq!(container.env.len(), 1);
        assert_eq!(container.env[0].name, "USE_CLUSTER_STORAGE");
    }

    #[test]
    fn edge_rewrites_identity_and_annotations() {
        let (_bundle, target, result) = run("edge", false);
        result.unwrap();

        let dest = target.path().join("addons/managed-api-service-internal/main/1.2.3");
        let csv = ClusterServiceVersion::load(
            &dest.join("manifests/managed-api-service.clusterserviceversion.yaml"),
        )
        .unwrap();
        assert_eq!(csv.metadata.name, "managed-api-service-internal.v1.2.3");
        assert_eq!(
            csv.spec.replaces.as_deref(),
            Some("managed-api-service-internal.v1.2.2")
        );

        let annotations =
            MetadataAnnotations::load(&dest.join("metadata/annotations.yaml")).unwrap();
        assert_eq!(
            annotations.annotations["operators.operatorframework.io.bundle.channels.v1"],
            "edge"
        );
    }

    #[test]
    fn missing_packaging_descriptor_is_an_error() {
        let bundle = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        write_bundle(bundle.path(), false);
        fs::remove_file(bundle.path().join("bundles/managed-api-service/1.2.3/bundle.Dockerfile"))
            .unwrap();

        let catalog = catalog::parse(CATALOG, "addons.yaml").unwrap();
        let (addon, channel) = catalog::resolve(&catalog, "managed-api-service", "stage").unwrap();
        let version = Version::parse("1.2.3").unwrap();
        let ctx = TransformContext {
            addon,
            channel,
            version: &version,
            bundle_root: Some(bundle.path()),
            target_root: target.path(),
        };

        let err = transform(&ctx).unwrap_err();
        assert_eq!(err.code.as_str(), "transform.missing_file");
    }

    #[test]
    fn missing_bundle_version_is_a_copy_error() {
        let bundle = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();

        let catalog = catalog::parse(CATALOG, "addons.yaml").unwrap();
        let (addon, channel) = catalog::resolve(&catalog, "managed-api-service", "stage").unwrap();
        let version = Version::parse("9.9.9").unwrap();
        let ctx = TransformContext {
            addon,
            channel,
            version: &version,
            bundle_root: Some(bundle.path()),
            target_root: target.path(),
        };

        let err = transform(&ctx).unwrap_err();
        assert_eq!(err.code.as_str(), "transform.copy_failed");
    }
}
