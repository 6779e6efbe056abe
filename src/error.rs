use std::path::PathBuf;
use thiserror::Error;

/// Failure signal for the fallible operations on a [`Config`](crate::Config)
/// handle.
///
/// These are per-call summaries. The individual anomalies — which descriptor
/// collided, which line failed to parse, which literal would not coerce — are
/// appended to the handle's diagnostics log as the call runs; a returned error
/// means at least one error-severity entry was logged during that call.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{count} registration error(s); none of the batch was registered")]
    Registration { count: usize },

    #[error("{count} error(s) while parsing; drain the diagnostics log for details")]
    ParseFailed { count: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_the_path() {
        let err = ConfigError::Io {
            path: "/etc/missing.conf".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().contains("/etc/missing.conf"));
    }

    #[test]
    fn registration_error_carries_count() {
        let err = ConfigError::Registration { count: 3 };
        let msg = err.to_string();
        assert!(msg.contains('3'));
        assert!(msg.contains("none of the batch"));
    }

    #[test]
    fn parse_failed_formats() {
        let err = ConfigError::ParseFailed { count: 2 };
        assert!(err.to_string().contains("2 error(s)"));
    }
}
