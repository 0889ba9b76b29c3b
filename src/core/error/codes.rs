use serde::Serialize;

use super::ErrorCode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeSummary {
    pub code: &'static str,
    pub summary: &'static str,
}

pub fn all_codes() -> &'static [ErrorCode] {
    &[
        ErrorCode::ConfigMissingKey,
        ErrorCode::ConfigInvalidJson,
        ErrorCode::ConfigInvalidValue,
        ErrorCode::ValidationInvalidArgument,
        ErrorCode::TargetNotFound,
        ErrorCode::TaskNotFound,
        ErrorCode::SshIdentityFileNotFound,
        ErrorCode::SshConnectFailed,
        ErrorCode::RemoteCommandFailed,
        ErrorCode::LocalCommandFailed,
        ErrorCode::PreconditionLocalDirty,
        ErrorCode::PreconditionRemoteDirty,
        ErrorCode::InternalIoError,
        ErrorCode::InternalJsonError,
        ErrorCode::InternalUnexpected,
    ]
}

pub fn parse_code(code: &str) -> Option<ErrorCode> {
    all_codes()
        .iter()
        .copied()
        .find(|candidate| candidate.as_str() == code)
}

pub fn summary(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::ConfigMissingKey => "A setting a step needs was not declared",
        ErrorCode::ConfigInvalidJson => "Target declaration is not valid JSON",
        ErrorCode::ConfigInvalidValue => "A declared setting has an unusable value",
        ErrorCode::ValidationInvalidArgument => "An override or argument was rejected",
        ErrorCode::TargetNotFound => "No declaration exists for the target",
        ErrorCode::TaskNotFound => "No task has that name",
        ErrorCode::SshIdentityFileNotFound => "The configured SSH identity file does not exist",
        ErrorCode::SshConnectFailed => "Could not reach the host over SSH",
        ErrorCode::RemoteCommandFailed => "A command on the host exited non-zero",
        ErrorCode::LocalCommandFailed => "A local command exited non-zero",
        ErrorCode::PreconditionLocalDirty => "The local working tree has uncommitted changes",
        ErrorCode::PreconditionRemoteDirty => "The deploy path on the host has uncommitted changes",
        ErrorCode::InternalIoError => "Filesystem error",
        ErrorCode::InternalJsonError => "JSON serialization error",
        ErrorCode::InternalUnexpected => "Unexpected internal error",
    }
}

pub fn list() -> Vec<CodeSummary> {
    all_codes()
        .iter()
        .map(|code| CodeSummary {
            code: code.as_str(),
            summary: summary(*code),
        })
        .collect()
}
