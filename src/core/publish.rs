use serde::Serialize;
use std::path::Path;

use crate::assembler::ChangeSet;
use crate::defaults::{GitConfig, RepoPair};
use crate::error::Result;
use crate::git;
use crate::review::{NewReviewRequest, ReviewSystem};

#[derive(Debug, Clone, Serialize)]
pub struct PublishOutput {
    pub iid: u64,
    pub url: String,
    pub target_project: String,
}

/// Push the release branch to the fork and open a review request upstream.
///
/// The clone is switched back to the main branch once the request exists.
pub fn publish(
    repo: &Path,
    change_set: &ChangeSet,
    repos: &RepoPair,
    git_config: &GitConfig,
    description: &str,
    token: Option<&str>,
    review: &dyn ReviewSystem,
) -> Result<PublishOutput> {
    git::push(repo, &git_config.fork_remote, &change_set.branch, token)?;
    log_status!("publish", "Pushed {} to {}", change_set.branch, git_config.fork_remote);

    let target = review.get_project(&repos.origin)?;
    let request = review.create_review_request(&NewReviewRequest {
        source_project: repos.fork.clone(),
        title: change_set.title.clone(),
        description: description.to_string(),
        source_branch: change_set.branch.clone(),
        target_branch: git_config.main_branch.clone(),
        target_project_id: target.id,
        remove_source_branch: true,
    })?;
    log_status!("publish", "Opened merge request {}", request.web_url);

    git::checkout(repo, &git_config.main_branch)?;

    Ok(PublishOutput {
        iid: request.iid,
        url: request.web_url,
        target_project: repos.origin.clone(),
    })
}


#[cfg(test)]
mod tests {
    use super::fake::FakeReviewSystem;
    use super::*;
    use crate::defaults::Defaults;
    use crate::git::test_support::{git, init_repo};
    use tempfile::TempDir;

    fn setup() -> (TempDir, TempDir, ChangeSet) {
        let fork = TempDir::new().unwrap();
        git(fork.path(), &["init", "--quiet", "--bare"]);
        let repo = TempDir::new().unwrap();
        init_repo(repo.path());
        git::add_remote(repo.path(), "fork", &fork.path().to_string_lossy()).unwrap();
        git::create_branch(repo.path(), "foo-stable-v1.2.3").unwrap();

        let change_set = ChangeSet {
            branch: "foo-stable-v1.2.3".to_string(),
            commit: git::head_commit(repo.path()).unwrap(),
            message: "update foo stable to 1.2.3".to_string(),
            title: "Update foo stable to 1.2.3".to_string(),
            staged: "addons/foo/addonimagesets/production/foo.v1.2.3.yaml".to_string(),
        };
        (fork, repo, change_set)
    }

    #[test]
    fn publish_pushes_and_opens_request() {
        let (_fork, repo, change_set) = setup();
        let defaults = Defaults::default();
        let review = FakeReviewSystem::default();

        let output = publish(
            repo.path(),
            &change_set,
            &defaults.tenants_repo,
            &defaults.git,
            "automated release",
            None,
            &review,
        )
        .unwrap();

        assert_eq!(output.iid, 7);
        assert_eq!(output.target_project, "service/managed-tenants");
        assert_eq!(git::current_branch(repo.path()).unwrap(), "main");

        let requests = review.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].source_project, "integreatly-qe/managed-tenants");
        assert_eq!(requests[0].target_project_id, 42);
        assert_eq!(requests[0].target_branch, "main");
        assert_eq!(requests[0].description, "automated release");
        assert!(requests[0].remove_source_branch);
    }

    #[test]
    fn failed_request_leaves_release_branch_checked_out() {
        let (_fork, repo, change_set) = setup();
        let defaults = Defaults::default();
        let review = FakeReviewSystem {
            fail_create: true,
            ..Default::default()
        };

        let err = publish(
            repo.path(),
            &change_set,
            &defaults.tenants_repo,
            &defaults.git,
            "",
            None,
            &review,
        )
        .unwrap_err();
        assert_eq!(err.code.as_str(), "publish.review_request_failed");
        assert_eq!(
            git::current_branch(repo.path()).unwrap(),
            "foo-stable-v1.2.3"
        );
    }
}
