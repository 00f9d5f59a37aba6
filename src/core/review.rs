//! Review system seam (GitLab merge requests).

use reqwest::blocking::{Client, Response};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Project {
    pub id: u64,
    pub web_url: String,
}

/// Request body for opening a merge request against an upstream project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewReviewRequest {
    /// Project the request is opened from (the fork).
    #[serde(skip)]
    pub source_project: String,
    pub title: String,
    pub description: String,
    pub source_branch: String,
    pub target_branch: String,
    pub target_project_id: u64,
    pub remove_source_branch: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReviewRequest {
    pub iid: u64,
    pub web_url: String,
}

/// Anything that can look up projects and open review requests.
pub trait ReviewSystem {
    fn get_project(&self, path: &str) -> Result<Project>;
    fn create_review_request(&self, request: &NewReviewRequest) -> Result<ReviewRequest>;
}

/// GitLab REST v4 client authenticated with a personal access token.
pub struct GitLabClient {
    client: Client,
    api_base: Url,
    token: String,
}

impl GitLabClient {
    pub fn new(api_base: &str, token: &str) -> Result<Self> {
        let api_base = Url::parse(api_base).map_err(|e| {
            Error::config_invalid_value(
                "defaults.gitlab.url",
                Some(api_base.to_string()),
                format!("not a valid URL: {}", e),
            )
        })?;

        let client = Client::builder()
            .user_agent(format!("addon-release/{}", VERSION))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::internal_io(e.to_string(), Some("create HTTP client".to_string())))?;

        Ok(Self {
            client,
            api_base,
            token: token.to_string(),
        })
    }

    /// `<api>/projects/<url-encoded path>[/<suffix>]`
    fn project_url(&self, project: &str, suffix: Option<&str>) -> Result<Url> {
        let mut url = self.api_base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                Error::config_invalid_value(
                    "defaults.gitlab.url",
                    Some(self.api_base.to_string()),
                    "URL cannot be a base",
                )
            })?;
            segments.pop_if_empty().push("projects").push(project);
            if let Some(suffix) = suffix {
                segments.push(suffix);
            }
        }
        Ok(url)
    }
}

impl ReviewSystem for GitLabClient {
    fn get_project(&self, path: &str) -> Result<Project> {
        let operation = format!("get project {}", path);
        let response = self
            .client
            .get(self.project_url(path, None)?)
            .header(TOKEN_HEADER, &self.token)
            .send()
            .map_err(|e| http_error(&operation, e))?;
        parse_response(&operation, response)
    }

    fn create_review_request(&self, request: &NewReviewRequest) -> Result<ReviewRequest> {
        let operation = format!("create merge request from {}", request.source_project);
        let response = self
            .client
            .post(self.project_url(&request.source_project, Some("merge_requests"))?)
            .header(TOKEN_HEADER, &self.token)
            .json(request)
            .send()
            .map_err(|e| http_error(&operation, e))?;
        parse_response(&operation, response)
    }
}

fn http_error(operation: &str, e: reqwest::Error) -> Error {
    Error::review_request_failed(operation, None, e.to_string()).with_retryable(true)
}

fn parse_response<T: serde::de::DeserializeOwned>(operation: &str, response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(Error::review_request_failed(operation, Some(status.as_u16()), body)
            .with_retryable(status.is_server_error()));
    }

    response.json().map_err(|e| {
        Error::internal_json(e.to_string(), Some(format!("parse response to {}", operation)))
    })
}
