//! End-to-end release: resolve, gate, clone, transform, assemble, publish.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::assembler::{self, ReleaseNames};
use crate::catalog::{self, AddonCatalog};
use crate::defaults::{Defaults, RepoPair};
use crate::error::Result;
use crate::git;
use crate::paths;
use crate::policy;
use crate::publish;
use crate::review::ReviewSystem;
use crate::transform::{self, Promotion, StagedChange, TransformContext};
use crate::version::Version;

#[derive(Debug, Clone)]
pub struct ReleaseRequest {
    pub addon: String,
    pub channel: String,
    pub version: String,
    pub addons_config: PathBuf,
    pub description: String,
    /// Overrides the origin project chosen for the channel.
    pub origin: Option<String>,
    /// Overrides the fork project chosen for the channel.
    pub fork: Option<String>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BundleCheckout {
    pub repo: String,
    pub tag: String,
}

/// Everything a release will do, derived without side effects.
#[derive(Debug, Clone, Serialize)]
pub struct ReleasePlan {
    pub addon: String,
    pub channel: String,
    pub version: Version,
    pub promotion: Promotion,
    #[serde(flatten)]
    pub names: ReleaseNames,
    pub staged: StagedChange,
    pub origin: String,
    pub fork: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle: Option<BundleCheckout>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReleaseOutcome {
    pub addon: String,
    pub channel: String,
    pub version: Version,
    pub branch: String,
    pub commit: String,
    pub commit_message: String,
    pub title: String,
    pub staged: String,
    pub clone_dir: String,
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_request_url: Option<String>,
}

/// Resolve and gate a release, reporting the names and targets it would use.
pub fn plan(request: &ReleaseRequest, defaults: &Defaults) -> Result<ReleasePlan> {
    let catalog = catalog::load(&request.addons_config)?;
    plan_from(&catalog, request, defaults)
}

fn plan_from(
    catalog: &AddonCatalog,
    request: &ReleaseRequest,
    defaults: &Defaults,
) -> Result<ReleasePlan> {
    let (addon, channel) = catalog::resolve(catalog, &request.addon, &request.channel)?;
    let version = Version::parse(&request.version)?;
    policy::check_allowed(&version, channel)?;

    let promotion = Promotion::from_channel_name(&channel.name)?;
    let repos = target_repos(request, defaults.repo_for(promotion));
    let bundle = promotion.needs_bundle_sources().then(|| BundleCheckout {
        repo: addon.bundle.repo.clone(),
        tag: version.tag_name(addon.tag_prefix()),
    });

    Ok(ReleasePlan {
        addon: addon.name.clone(),
        channel: channel.name.clone(),
        names: ReleaseNames::new(&addon.name, &channel.name, &version),
        staged: transform::planned_change(channel, &version)?,
        version,
        promotion,
        origin: repos.origin,
        fork: repos.fork,
        bundle,
    })
}

/// Perform the release. Stops after the commit when `request.dry_run` is set.
pub fn run(
    request: &ReleaseRequest,
    defaults: &Defaults,
    token: Option<&str>,
    review: &dyn ReviewSystem,
) -> Result<ReleaseOutcome> {
    let catalog = catalog::load(&request.addons_config)?;
    let release_plan = plan_from(&catalog, request, defaults)?;
    let (addon, channel) = catalog::resolve(&catalog, &request.addon, &request.channel)?;
    let repos = target_repos(request, defaults.repo_for(release_plan.promotion));

    let target_dir = paths::scratch_dir(&repos.name);
    clone_target(defaults, &repos, &target_dir)?;

    let bundle_dir = match &release_plan.bundle {
        Some(bundle) => {
            let dir = paths::scratch_dir(&addon.name);
            log_status!("clone", "Cloning {} at {}", bundle.repo, bundle.tag);
            git::clone_ref(&bundle.repo, &bundle.tag, &dir)?;
            log_status!("clone", "Addon cloned to {}", dir.display());
            Some(dir)
        }
        None => None,
    };

    assembler::begin(&target_dir, &defaults.git.main_branch, &release_plan.names)?;

    let staged = transform::transform(&TransformContext {
        addon,
        channel,
        version: &release_plan.version,
        bundle_root: bundle_dir.as_deref(),
        target_root: &target_dir,
    })?;

    let change_set = assembler::commit(
        &target_dir,
        &release_plan.names,
        &staged,
        &defaults.git.author,
    )?;

    let mut outcome = ReleaseOutcome {
        addon: release_plan.addon.clone(),
        channel: release_plan.channel.clone(),
        version: release_plan.version.clone(),
        branch: change_set.branch.clone(),
        commit: change_set.commit.clone(),
        commit_message: change_set.message.clone(),
        title: change_set.title.clone(),
        staged: change_set.staged.clone(),
        clone_dir: target_dir.display().to_string(),
        dry_run: request.dry_run,
        review_request_url: None,
    };

    if request.dry_run {
        log_status!(
            "release",
            "Dry run: {} committed on {} in {}",
            outcome.commit_message,
            outcome.branch,
            outcome.clone_dir
        );
        return Ok(outcome);
    }

    let published = publish::publish(
        &target_dir,
        &change_set,
        &repos,
        &defaults.git,
        &request.description,
        token,
        review,
    )?;
    outcome.review_request_url = Some(published.url);
    Ok(outcome)
}

fn target_repos(request: &ReleaseRequest, channel_default: &RepoPair) -> RepoPair {
    RepoPair {
        name: channel_default.name.clone(),
        origin: request
            .origin
            .clone()
            .unwrap_or_else(|| channel_default.origin.clone()),
        fork: request
            .fork
            .clone()
            .unwrap_or_else(|| channel_default.fork.clone()),
    }
}

/// Clone the origin's main branch and register the fork as a push remote.
fn clone_target(defaults: &Defaults, repos: &RepoPair, dir: &Path) -> Result<()> {
    let origin_url = defaults.project_url(&repos.origin);
    log_status!("clone", "Cloning {} ({})", origin_url, defaults.git.main_branch);
    git::clone_ref(&origin_url, &defaults.git.main_branch, dir)?;
    git::add_remote(dir, &defaults.git.fork_remote, &defaults.project_url(&repos.fork))?;
    log_status!("clone", "{} cloned to {}", repos.name, dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CATALOG: &str = r#"
addons:
  - name: foo
    bundle:
      repo: https://example.com/foo-operator.git
      path: bundles/foo
      tag_prefix: release-
    channels:
      - { name: stage, directory: foo-stage, environment: stage }
      - { name: stable, directory: foo, environment: production }
      - { name: edge, directory: foo-edge, environment: production, allow_pre_release: true }
"#;

    fn request(dir: &TempDir, channel: &str, version: &str) -> ReleaseRequest {
        let path = dir.path().join("addons.yaml");
        fs::write(&path, CATALOG).unwrap();
        ReleaseRequest {
            addon: "foo".to_string(),
            channel: channel.to_string(),
            version: version.to_string(),
            addons_config: path,
            description: String::new(),
            origin: None,
            fork: None,
            dry_run: false,
        }
    }

    #[test]
    fn stage_plan_targets_bundles_repo() {
        let dir = TempDir::new().unwrap();
        let plan = plan(&request(&dir, "stage", "1.2.3"), &Defaults::default()).unwrap();

        assert_eq!(plan.promotion, Promotion::Stage);
        assert_eq!(plan.names.branch, "foo-stage-v1.2.3");
        assert_eq!(plan.names.commit_message, "update foo stage to 1.2.3");
        assert_eq!(plan.names.title, "Update foo stage to 1.2.3");
        assert_eq!(plan.staged, StagedChange::Directory("addons/foo-stage/main/1.2.3/".to_string()));
        assert_eq!(plan.origin, "service/managed-tenants-bundles");
        let bundle = plan.bundle.unwrap();
        assert_eq!(bundle.tag, "release-1.2.3");
    }

    #[test]
    fn stable_plan_skips_bundle_checkout() {
        let dir = TempDir::new().unwrap();
        let plan = plan(&request(&dir, "stable", "1.2.3"), &Defaults::default()).unwrap();

        assert_eq!(plan.origin, "service/managed-tenants");
        assert!(plan.bundle.is_none());
        assert_eq!(
            plan.staged,
            StagedChange::File("addons/foo/addonimagesets/production/foo.v1.2.3.yaml".to_string())
        );
    }

    #[test]
    fn origin_and_fork_flags_override_channel_defaults() {
        let dir = TempDir::new().unwrap();
        let mut req = request(&dir, "stable", "1.2.3");
        req.origin = Some("me/tenants".to_string());
        req.fork = Some("me/tenants-fork".to_string());

        let plan = plan(&req, &Defaults::default()).unwrap();
        assert_eq!(plan.origin, "me/tenants");
        assert_eq!(plan.fork, "me/tenants-fork");
    }

    #[test]
    fn pre_release_is_gated_before_anything_else() {
        let dir = TempDir::new().unwrap();
        let err = plan(&request(&dir, "stable", "1.2.3-rc1"), &Defaults::default()).unwrap_err();
        assert_eq!(err.code.as_str(), "policy.pre_release_not_allowed");

        let edge = plan(&request(&dir, "edge", "1.2.3-rc1"), &Defaults::default()).unwrap();
        assert_eq!(edge.names.branch, "foo-edge-v1.2.3-rc1");
    }

    #[test]
    fn unknown_addon_is_reported() {
        let dir = TempDir::new().unwrap();
        let mut req = request(&dir, "stage", "1.2.3");
        req.addon = "bar".to_string();
        let err = plan(&req, &Defaults::default()).unwrap_err();
        assert_eq!(err.code.as_str(), "config.addon_not_found");
    }
}
