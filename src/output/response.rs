//! CLI response formatting and output.
//!
//! Provides JSON envelope, printing, and exit code mapping.

use rollout::announce;
use rollout::error::Hint;
use rollout::{Error, ErrorCode, Result};
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

pub fn exit_code_for_error(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::ConfigMissingKey
        | ErrorCode::ConfigInvalidJson
        | ErrorCode::ConfigInvalidValue
        | ErrorCode::ValidationInvalidArgument => 2,

        ErrorCode::TargetNotFound | ErrorCode::TaskNotFound => 4,

        ErrorCode::SshIdentityFileNotFound | ErrorCode::SshConnectFailed => 10,

        ErrorCode::RemoteCommandFailed | ErrorCode::LocalCommandFailed => 20,

        ErrorCode::PreconditionLocalDirty | ErrorCode::PreconditionRemoteDirty => 30,

        ErrorCode::InternalIoError
        | ErrorCode::InternalJsonError
        | ErrorCode::InternalUnexpected => 1,
    }
}

/// Highlighted one-line summary of a failure on stderr, ahead of the JSON envelope.
pub fn announce_error(err: &Error) {
    announce::blank();
    match err.details.get("stage").and_then(|stage| stage.as_str()) {
        Some(stage) => announce::failure(format!("Aborted during {}: {}", stage, err.message)),
        None => announce::failure(&err.message),
    }
    for hint in &err.hints {
        announce::say(announce::Tone::Heading, format!("hint: {}", hint.message));
    }
}

pub fn print_json_result(result: Result<serde_json::Value>) -> Result<()> {
    match result {
        Ok(data) => print_success(data),
        Err(err) => {
            announce_error(&err);
            print_response(&CliResponse::<()>::from_error(&err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precondition_failures_have_their_own_exit_code() {
        assert_eq!(exit_code_for_error(ErrorCode::PreconditionLocalDirty), 30);
        assert_eq!(exit_code_for_error(ErrorCode::PreconditionRemoteDirty), 30);
        assert_eq!(exit_code_for_error(ErrorCode::RemoteCommandFailed), 20);
        assert_eq!(exit_code_for_error(ErrorCode::TaskNotFound), 4);
    }

    #[test]
    fn error_envelope_carries_dotted_code() {
        let err = Error::local_tree_dirty(vec![" M app.py".to_string()]);
        let json = serde_json::to_value(CliResponse::<()>::from_error(&err)).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "precondition.local_dirty");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn command_result_maps_to_value() {
        let (value, code) = map_cmd_result_to_json(Ok((vec!["pull"], 0)));
        assert_eq!(value.unwrap(), serde_json::json!(["pull"]));
        assert_eq!(code, 0);
    }
}
