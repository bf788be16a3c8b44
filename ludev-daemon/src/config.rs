use std::fmt;
use std::str::FromStr;

/// Environment variable consulted for the log filter before `RUST_LOG`.
pub const LOG_FILTER_ENV: &str = "LUDEV_LOG";

pub const DEFAULT_LOG_FILTER: &str = "info";

/// Shape of the log lines written to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'; expected: text, json")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => f.write_str("text"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DaemonConfig {
    pub log_format: LogFormat,
    /// Explicit `EnvFilter` directive. `None` falls back to `RUST_LOG`, then
    /// [`DEFAULT_LOG_FILTER`].
    pub log_filter: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("text", LogFormat::Text)]
    #[case("JSON", LogFormat::Json)]
    #[case("Json", LogFormat::Json)]
    fn log_format_parses_case_insensitively(#[case] input: &str, #[case] expected: LogFormat) {
        assert_eq!(input.parse::<LogFormat>().unwrap(), expected);
    }

    #[test]
    fn unknown_log_format_lists_accepted_values() {
        let err = "yaml".parse::<LogFormat>().unwrap_err();
        assert!(err.contains("text, json"), "got: {err}");
    }

    #[test]
    fn defaults_to_text_without_filter() {
        let config = DaemonConfig::default();
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.log_filter.is_none());
    }
}
