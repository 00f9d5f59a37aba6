use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigMissingKey,
    ConfigInvalidJson,
    ConfigInvalidYaml,
    ConfigInvalidValue,
    ConfigAddonNotFound,
    ConfigChannelNotFound,

    ValidationInvalidArgument,

    PolicyPreReleaseNotAllowed,

    TransformCopyFailed,
    TransformMissingFile,
    TransformInstallModeNotFound,
    TransformUnsupportedChannel,
    TransformMalformedIdentity,

    AssemblyWrongBranch,
    AssemblyDirtyTree,

    PublishPushFailed,
    PublishReviewRequestFailed,

    GitCommandFailed,

    InternalIoError,
    InternalJsonError,
    InternalYamlError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigMissingKey => "config.missing_key",
            ErrorCode::ConfigInvalidJson => "config.invalid_json",
            ErrorCode::ConfigInvalidYaml => "config.invalid_yaml",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",
            ErrorCode::ConfigAddonNotFound => "config.addon_not_found",
            ErrorCode::ConfigChannelNotFound => "config.channel_not_found",

            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",

            ErrorCode::PolicyPreReleaseNotAllowed => "policy.pre_release_not_allowed",

            ErrorCode::TransformCopyFailed => "transform.copy_failed",
            ErrorCode::TransformMissingFile => "transform.missing_file",
            ErrorCode::TransformInstallModeNotFound => "transform.install_mode_not_found",
            ErrorCode::TransformUnsupportedChannel => "transform.unsupported_channel",
            ErrorCode::TransformMalformedIdentity => "transform.malformed_identity",

            ErrorCode::AssemblyWrongBranch => "assembly.wrong_branch",
            ErrorCode::AssemblyDirtyTree => "assembly.dirty_tree",

            ErrorCode::PublishPushFailed => "publish.push_failed",
            ErrorCode::PublishReviewRequestFailed => "publish.review_request_failed",

            ErrorCode::GitCommandFailed => "git.command_failed",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalYamlError => "internal.yaml_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMissingKeyDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigParseDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidValueDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tried: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelNotFoundDetails {
    pub addon: String,
    pub channel: String,
    pub available: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreReleaseDetails {
    pub version: String,
    pub channel: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyFailedDetails {
    pub source: String,
    pub destination: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WrongBranchDetails {
    pub expected: String,
    pub actual: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirtyTreeDetails {
    pub branch: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequestFailedDetails {
    pub operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
    pub retryable: Option<bool>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
            retryable: None,
        }
    }

    // === Configuration ===

    pub fn config_missing_key(key: impl Into<String>, path: Option<String>) -> Self {
        Self::new(
            ErrorCode::ConfigMissingKey,
            "Missing required configuration key",
            to_details(ConfigMissingKeyDetails {
                key: key.into(),
                path,
            }),
        )
    }

    pub fn config_invalid_json(path: impl Into<String>, err: serde_json::Error) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidJson,
            "Invalid JSON in configuration",
            to_details(ConfigParseDetails {
                path: path.into(),
                error: err.to_string(),
            }),
        )
    }

    pub fn config_invalid_yaml(path: impl Into<String>, err: serde_yml::Error) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidYaml,
            "Invalid YAML in configuration",
            to_details(ConfigParseDetails {
                path: path.into(),
                error: err.to_string(),
            }),
        )
    }

    pub fn config_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        let problem = problem.into();
        Self::new(
            ErrorCode::ConfigInvalidValue,
            format!("Invalid configuration value: {}", problem),
            to_details(ConfigInvalidValueDetails {
                key: key.into(),
                value,
                problem,
            }),
        )
    }

    pub fn addon_not_found(name: impl Into<String>, catalog: impl Into<String>) -> Self {
        let name = name.into();
        let catalog = catalog.into();
        Self::new(
            ErrorCode::ConfigAddonNotFound,
            format!(
                "can not find configuration for addon {} in config file {}",
                name, catalog
            ),
            serde_json::json!({ "addon": name, "catalog": catalog }),
        )
        .with_hint("Run 'addon-release catalog list' to see configured addons")
    }

    pub fn channel_not_found(
        addon: impl Into<String>,
        channel: impl Into<String>,
        available: Vec<String>,
    ) -> Self {
        let addon = addon.into();
        let channel = channel.into();
        Self::new(
            ErrorCode::ConfigChannelNotFound,
            format!("can not find channel {} for addon {}", channel, addon),
            to_details(ChannelNotFoundDetails {
                addon,
                channel,
                available,
            }),
        )
    }

    // === Validation ===

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
        id: Option<String>,
        tried: Option<Vec<String>>,
    ) -> Self {
        Self::new(
            ErrorCode::ValidationInvalidArgument,
            "Invalid argument",
            to_details(InvalidArgumentDetails {
                field: field.into(),
                problem: problem.into(),
                id,
                tried,
            }),
        )
    }

    // === Policy ===

    pub fn pre_release_not_allowed(version: impl Into<String>, channel: impl Into<String>) -> Self {
        let version = version.into();
        let channel = channel.into();
        Self::new(
            ErrorCode::PolicyPreReleaseNotAllowed,
            format!(
                "the prerelease version {} can't be pushed to the {} channel",
                version, channel
            ),
            to_details(PreReleaseDetails { version, channel }),
        )
    }

    // === Transform ===

    pub fn copy_failed(
        source: impl Into<String>,
        destination: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self::new(
            ErrorCode::TransformCopyFailed,
            "Failed to copy bundle files",
            to_details(CopyFailedDetails {
                source: source.into(),
                destination: destination.into(),
                error: error.into(),
            }),
        )
    }

    pub fn missing_file(path: impl Into<String>, problem: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(
            ErrorCode::TransformMissingFile,
            format!("Expected file is missing: {}", path),
            serde_json::json!({ "path": path, "problem": problem.into() }),
        )
    }

    pub fn install_mode_not_found(install_mode: impl Into<String>, manifest: impl Into<String>) -> Self {
        let install_mode = install_mode.into();
        Self::new(
            ErrorCode::TransformInstallModeNotFound,
            format!("Install mode {} not found in manifest", install_mode),
            serde_json::json!({ "installMode": install_mode, "manifest": manifest.into() }),
        )
    }

    pub fn unsupported_channel(channel: impl Into<String>) -> Self {
        let channel = channel.into();
        Self::new(
            ErrorCode::TransformUnsupportedChannel,
            format!(
                "channel provided is {} instead of stage, edge or stable",
                channel
            ),
            serde_json::json!({ "channel": channel }),
        )
    }

    pub fn malformed_identity(field: impl Into<String>, value: impl Into<String>) -> Self {
        let field = field.into();
        let value = value.into();
        Self::new(
            ErrorCode::TransformMalformedIdentity,
            format!("{} '{}' has no '.v' version marker", field, value),
            serde_json::json!({ "field": field, "value": value }),
        )
    }

    // === Assembly ===

    pub fn wrong_branch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        let expected = expected.into();
        let actual = actual.into();
        Self::new(
            ErrorCode::AssemblyWrongBranch,
            format!(
                "the target repo is pointing to {} instead of {}",
                actual, expected
            ),
            to_details(WrongBranchDetails { expected, actual }),
        )
    }

    pub fn dirty_tree(branch: impl Into<String>, status: impl Into<String>) -> Self {
        let status = status.into();
        Self::new(
            ErrorCode::AssemblyDirtyTree,
            format!("the tree is not clean, uncommitted changes:\n{}", status),
            to_details(DirtyTreeDetails {
                branch: branch.into(),
                status,
            }),
        )
    }

    // === Publish ===

    pub fn push_failed(remote: impl Into<String>, branch: impl Into<String>, reason: impl Into<String>) -> Self {
        let remote = remote.into();
        let branch = branch.into();
        Self::new(
            ErrorCode::PublishPushFailed,
            format!("Failed to push {} to {}", branch, remote),
            serde_json::json!({ "remote": remote, "branch": branch, "reason": reason.into() }),
        )
    }

    pub fn review_request_failed(
        operation: impl Into<String>,
        status: Option<u16>,
        error: impl Into<String>,
    ) -> Self {
        let operation = operation.into();
        Self::new(
            ErrorCode::PublishReviewRequestFailed,
            format!("Review system request failed: {}", operation),
            to_details(ReviewRequestFailedDetails {
                operation,
                status,
                error: error.into(),
            }),
        )
    }

    // === Git ===

    pub fn git_command_failed(message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::GitCommandFailed,
            message,
            Value::Object(serde_json::Map::new()),
        )
    }

    // === Internal ===

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        Self::new(
            ErrorCode::InternalIoError,
            "IO error",
            to_details(InternalErrorDetails {
                error: error.into(),
                context,
            }),
        )
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        Self::new(
            ErrorCode::InternalJsonError,
            "JSON error",
            to_details(InternalErrorDetails {
                error: error.into(),
                context,
            }),
        )
    }

    pub fn internal_yaml(error: impl Into<String>, context: Option<String>) -> Self {
        Self::new(
            ErrorCode::InternalYamlError,
            "YAML error",
            to_details(InternalErrorDetails {
                error: error.into(),
                context,
            }),
        )
    }

    pub fn internal_unexpected(error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InternalUnexpected,
            "Unexpected error",
            serde_json::json!({ "error": error.into() }),
        )
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = Some(retryable);
        self
    }
}
