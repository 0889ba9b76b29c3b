//! Shell escaping and quoting utilities.

/// Escape a value for use inside single quotes.
/// Replaces `'` with `'\''` (end quote, escaped quote, start quote).
pub fn escape_single_quote_content(value: &str) -> String {
    value.replace('\'', "'\\''")
}

/// Quote a single argument for shell execution.
/// - Empty strings become `''`
/// - Strings with shell metacharacters are wrapped in single quotes
/// - Embedded single quotes are escaped
pub fn quote_arg(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }

    // Characters that require quoting
    const SHELL_META: &[char] = &[
        ' ', '\t', '\n', '\'', '"', '\\', '$', '`', '!', '*', '?', '[', ']', '(', ')', '{', '}',
        '<', '>', '|', '&', ';', '#', '~',
    ];

    if !arg.contains(SHELL_META) {
        return arg.to_string();
    }

    format!("'{}'", escape_single_quote_content(arg))
}

/// Escape an entire command string for `bash -c` / `sh -c`.
/// The composed command keeps its operators (`&&`, `;`) intact inside the quotes.
pub fn escape_command_for_shell(command: &str) -> String {
    format!("'{}'", escape_single_quote_content(command))
}

/// Quote a path for shell execution (always quotes).
pub fn quote_path(path: &str) -> String {
    format!("'{}'", escape_single_quote_content(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_arg_simple() {
        assert_eq!(quote_arg("master"), "master");
        assert_eq!(quote_arg("intranet:www-data"), "intranet:www-data");
        assert_eq!(quote_arg("requirements/prod.txt"), "requirements/prod.txt");
    }

    #[test]
    fn quote_arg_with_spaces() {
        assert_eq!(quote_arg("crons/my app"), "'crons/my app'");
    }

    #[test]
    fn quote_arg_with_glob_and_home() {
        assert_eq!(quote_arg("logs/*"), "'logs/*'");
        assert_eq!(quote_arg("~/crontab"), "'~/crontab'");
    }

    #[test]
    fn quote_arg_with_single_quote() {
        assert_eq!(quote_arg("it's"), "'it'\\''s'");
    }

    #[test]
    fn quote_arg_empty() {
        assert_eq!(quote_arg(""), "''");
    }

    #[test]
    fn quote_path_simple() {
        assert_eq!(quote_path("/deploy/intranet"), "'/deploy/intranet'");
    }

    #[test]
    fn quote_path_with_quote() {
        assert_eq!(quote_path("/deploy/it's"), "'/deploy/it'\\''s'");
    }

    #[test]
    fn command_escape_keeps_operators_inside_quotes() {
        assert_eq!(
            escape_command_for_shell("cd '/deploy/app' && source activate && pip install -r requirements.txt"),
            "'cd '\\''/deploy/app'\\'' && source activate && pip install -r requirements.txt'"
        );
    }
}
