//! CLI response formatting and output.
//!
//! Provides JSON envelope, printing, and exit code mapping.

use addon_release::error::Hint;
use addon_release::{Error, ErrorCode, Result};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CliResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CliError>,
}

#[derive(Debug, Serialize)]
pub struct CliError {
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints: Option<Vec<Hint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

impl<T: Serialize> CliResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            Error::internal_json(e.to_string(), Some("serialize response".to_string()))
        })
    }
}

impl CliResponse<()> {
    pub fn from_error(err: &Error) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(CliError {
                code: err.code.as_str().to_string(),
                message: err.message.clone(),
                details: err.details.clone(),
                hints: if err.hints.is_empty() {
                    None
                } else {
                    Some(err.hints.clone())
                },
                retryable: err.retryable,
            }),
        }
    }
}

fn print_response<T: Serialize>(response: &CliResponse<T>) -> Result<()> {
    use std::io::{self, Write};

    let payload = response.to_json()?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", payload) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            return Ok(()); // Exit gracefully on SIGPIPE
        }
        return Err(Error::internal_io(
            e.to_string(),
            Some("write stdout".to_string()),
        ));
    }
    Ok(())
}

pub fn print_success<T: Serialize>(data: T) -> Result<()> {
    print_response(&CliResponse::success(data))
}

pub fn map_cmd_result_to_json<T: Serialize>(
    result: Result<(T, i32)>,
) -> (Result<serde_json::Value>, i32) {
    match result {
        Ok((data, exit_code)) => match serde_json::to_value(data) {
            Ok(value) => (Ok(value), exit_code),
            Err(err) => (
                Err(Error::internal_json(
                    err.to_string(),
                    Some("serialize response".to_string()),
                )),
                1,
            ),
        },
        Err(err) => {
            let exit_code = exit_code_for_error(err.code);
            (Err(err), exit_code)
        }
    }
}

pub(crate) fn exit_code_for_error(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::ConfigMissingKey
        | ErrorCode::ConfigInvalidJson
        | ErrorCode::ConfigInvalidYaml
        | ErrorCode::ConfigInvalidValue
        | ErrorCode::ValidationInvalidArgument => 2,

        ErrorCode::ConfigAddonNotFound | ErrorCode::ConfigChannelNotFound => 4,

        ErrorCode::PolicyPreReleaseNotAllowed
        | ErrorCode::TransformCopyFailed
        | ErrorCode::TransformMissingFile
        | ErrorCode::TransformInstallModeNotFound
        | ErrorCode::TransformUnsupportedChannel
        | ErrorCode::TransformMalformedIdentity => 3,

        ErrorCode::AssemblyWrongBranch
        | ErrorCode::AssemblyDirtyTree
        | ErrorCode::PublishPushFailed
        | ErrorCode::PublishReviewRequestFailed
        | ErrorCode::GitCommandFailed => 20,

        ErrorCode::InternalIoError
        | ErrorCode::InternalJsonError
        | ErrorCode::InternalYamlError
        | ErrorCode::InternalUnexpected => 1,
    }
}

pub fn print_json_result(result: Result<serde_json::Value>) -> Result<()> {
    match result {
        Ok(data) => print_success(data),
        Err(err) => print_response(&CliResponse::<()>::from_error(&err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_carries_code_and_hints() {
        let err = Error::addon_not_found("foo", "addons.yaml");
        let response = CliResponse::<()>::from_error(&err);
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["error"]["code"], "config.addon_not_found");
        assert_eq!(value["error"]["details"]["addon"], "foo");
        assert!(value["error"]["hints"].is_array());
        assert!(value.get("data").is_none());
    }

    #[test]
    fn exit_codes_follow_error_category() {
        let (_, code) = map_cmd_result_to_json::<()>(Err(Error::pre_release_not_allowed(
            "1.2.3-rc1",
            "stable",
        )));
        assert_eq!(code, 3);

        let (_, code) = map_cmd_result_to_json::<()>(Err(Error::wrong_branch("main", "feature")));
        assert_eq!(code, 20);

        let (_, code) = map_cmd_result_to_json::<()>(Err(Error::channel_not_found(
            "foo",
            "beta",
            vec![],
        )));
        assert_eq!(code, 4);

        let (value, code) = map_cmd_result_to_json(Ok(("done", 0)));
        assert_eq!(code, 0);
        assert_eq!(value.unwrap(), "done");
    }
}
