use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod codes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigMissingKey,
    ConfigInvalidJson,
    ConfigInvalidValue,

    ValidationInvalidArgument,

    TargetNotFound,
    TaskNotFound,

    SshIdentityFileNotFound,
    SshConnectFailed,

    RemoteCommandFailed,
    LocalCommandFailed,

    PreconditionLocalDirty,
    PreconditionRemoteDirty,

    InternalIoError,
    InternalJsonError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigMissingKey => "config.missing_key",
            ErrorCode::ConfigInvalidJson => "config.invalid_json",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",

            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",

            ErrorCode::TargetNotFound => "target.not_found",
            ErrorCode::TaskNotFound => "task.not_found",

            ErrorCode::SshIdentityFileNotFound => "ssh.identity_file_not_found",
            ErrorCode::SshConnectFailed => "ssh.connect_failed",

            ErrorCode::RemoteCommandFailed => "remote.command_failed",
            ErrorCode::LocalCommandFailed => "local.command_failed",

            ErrorCode::PreconditionLocalDirty => "precondition.local_dirty",
            ErrorCode::PreconditionRemoteDirty => "precondition.remote_dirty",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
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

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMissingKeyDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidJsonDetails {
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
pub struct NotFoundDetails {
    pub id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub available: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalJsonErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandFailedDetails {
    pub command: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub host: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirtyTreeDetails {
    pub location: String,
    pub changes: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SshIdentityFileNotFoundDetails {
    pub target: String,
    pub identity_file: String,
}

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

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
        value: Option<String>,
        accepted: Option<Vec<String>>,
    ) -> Self {
        let problem = problem.into();
        let details = to_details(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.clone(),
            value,
            accepted,
        });

        Self::new(ErrorCode::ValidationInvalidArgument, problem, details)
    }

    pub fn target_not_found(id: impl Into<String>, available: Vec<String>) -> Self {
        let id = id.into();
        let message = format!("Deployment target '{}' not found", id);
        Self::new(
            ErrorCode::TargetNotFound,
            message,
            to_details(NotFoundDetails { id, available }),
        )
        .with_hint("Run 'rollout target list' to see declared targets")
    }

    pub fn task_not_found(name: impl Into<String>, available: Vec<String>) -> Self {
        let name = name.into();
        let message = format!("Unknown task '{}'", name);
        Self::new(
            ErrorCode::TaskNotFound,
            message,
            to_details(NotFoundDetails {
                id: name,
                available,
            }),
        )
        .with_hint("Run 'rollout tasks' to see available tasks")
    }

    pub fn ssh_identity_file_not_found(
        target: impl Into<String>,
        identity_file: impl Into<String>,
    ) -> Self {
        Self::new(
            ErrorCode::SshIdentityFileNotFound,
            "SSH identity file not found",
            to_details(SshIdentityFileNotFoundDetails {
                target: target.into(),
                identity_file: identity_file.into(),
            }),
        )
    }

    pub fn ssh_connect_failed(details: CommandFailedDetails) -> Self {
        let message = format!("Could not connect to {}", details.host);
        let mut err = Self::new(ErrorCode::SshConnectFailed, message, to_details(details));
        err.retryable = Some(true);
        err
    }

    pub fn remote_command_failed(details: CommandFailedDetails) -> Self {
        let message = format!(
            "Remote command failed with exit code {}: {}",
            details.exit_code, details.command
        );
        Self::new(ErrorCode::RemoteCommandFailed, message, to_details(details))
    }

    pub fn local_command_failed(details: CommandFailedDetails) -> Self {
        let message = format!(
            "Local command failed with exit code {}: {}",
            details.exit_code, details.command
        );
        Self::new(ErrorCode::LocalCommandFailed, message, to_details(details))
    }

    pub fn local_tree_dirty(changes: Vec<String>) -> Self {
        Self::new(
            ErrorCode::PreconditionLocalDirty,
            "Your working directory is not clean.",
            to_details(DirtyTreeDetails {
                location: "local".to_string(),
                changes,
            }),
        )
        .with_hint("Commit or stash local changes, or pass require_clean=false")
    }

    pub fn remote_tree_dirty(tree: impl Into<String>, changes: Vec<String>) -> Self {
        Self::new(
            ErrorCode::PreconditionRemoteDirty,
            "Remote working directory is not clean.",
            to_details(DirtyTreeDetails {
                location: tree.into(),
                changes,
            }),
        )
        .with_hint("Inspect the remote checkout; changes made on the server must be resolved by hand")
    }

    pub fn config_missing_key(key: impl Into<String>, target: Option<String>) -> Self {
        let key = key.into();
        let message = match &target {
            Some(t) => format!("Setting '{}' is not configured for target '{}'", key, t),
            None => format!("Setting '{}' is not configured", key),
        };
        Self::new(
            ErrorCode::ConfigMissingKey,
            message,
            to_details(ConfigMissingKeyDetails { key, target }),
        )
    }

    pub fn config_invalid_json(path: impl Into<String>, err: serde_json::Error) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidJson,
            "Invalid JSON in settings declaration",
            to_details(ConfigInvalidJsonDetails {
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
        Self::new(
            ErrorCode::ConfigInvalidValue,
            "Invalid configuration value",
            to_details(ConfigInvalidValueDetails {
                key: key.into(),
                value,
                problem: problem.into(),
            }),
        )
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        Self::new(
            ErrorCode::InternalIoError,
            "IO error",
            to_details(InternalIoErrorDetails {
                error: error.into(),
                context,
            }),
        )
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        Self::new(
            ErrorCode::InternalJsonError,
            "JSON error",
            to_details(InternalJsonErrorDetails {
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

    /// Attach a key to the details object. Non-object details are left untouched.
    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        if let Value::Object(ref mut map) = self.details {
            map.insert(key.to_string(), value.into());
        }
        self
    }

    /// True for failures raised by a precondition gate rather than a step.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::PreconditionLocalDirty | ErrorCode::PreconditionRemoteDirty
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_names_target() {
        let err = Error::config_missing_key("chown_target", Some("prod".to_string()));
        assert_eq!(err.code, ErrorCode::ConfigMissingKey);
        assert!(err.message.contains("chown_target"));
        assert!(err.message.contains("prod"));
        assert_eq!(err.details["key"], "chown_target");
    }

    #[test]
    fn remote_failure_carries_output() {
        let err = Error::remote_command_failed(CommandFailedDetails {
            command: "git pull".to_string(),
            exit_code: 128,
            stdout: String::new(),
            stderr: "fatal: not a git repository".to_string(),
            host: "web1".to_string(),
        });
        assert_eq!(err.details["exitCode"], 128);
        assert_eq!(err.details["stderr"], "fatal: not a git repository");
        assert!(err.message.contains("git pull"));
    }

    #[test]
    fn with_detail_extends_object() {
        let err = Error::local_tree_dirty(vec![" M src/lib.rs".to_string()])
            .with_detail("stage", "local_clean_check");
        assert_eq!(err.details["stage"], "local_clean_check");
        assert_eq!(err.details["location"], "local");
        assert!(err.is_precondition());
    }
}
