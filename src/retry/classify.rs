//! Default Retryability Classifier
//!
//! Treats network-, timeout- and throttling-shaped failures as transient.
//! Anything it does not recognise is permanent.

use std::error::Error;
use std::io;

/// Word sequences that mark an error message as transient. Matched against
/// whole words, so `timeout_ms` or `password reset` do not count.
const TRANSIENT_PHRASES: &[&[&str]] = &[
    &["timeout"],
    &["timed", "out"],
    &["connection", "reset"],
    &["connection", "refused"],
    &["connection", "closed"],
    &["connection", "aborted"],
    &["unavailable"],
    &["temporarily"],
    &["too", "many", "requests"],
    &["rate", "limit"],
    &["rate", "limited"],
    &["throttled"],
];

/// Status codes only count right after one of these words.
const STATUS_PREFIXES: &[&str] = &["http", "status", "code"];
const TRANSIENT_STATUS_CODES: &[&str] = &["429", "502", "503", "504"];

/// Whether `err`, or anything in its `source()` chain, looks transient.
///
/// An io error of a validation-shaped kind anywhere in the chain makes the
/// whole error permanent, whatever the messages say.
pub fn is_retryable(err: &(dyn Error + 'static)) -> bool {
    let mut transient = false;
    let mut current = Some(err);
    while let Some(link) = current {
        if let Some(io_err) = link.downcast_ref::<io::Error>() {
            if is_permanent_io(io_err.kind()) {
                return false;
            }
        }
        transient = transient || link_is_transient(link);
        current = link.source();
    }
    transient
}

fn link_is_transient(link: &(dyn Error + 'static)) -> bool {
    if let Some(io_err) = link.downcast_ref::<io::Error>() {
        if is_transient_io(io_err.kind()) {
            return true;
        }
    }
    if link.is::<tokio::time::error::Elapsed>() {
        return true;
    }
    message_is_transient(&link.to_string())
}

fn is_transient_io(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::TimedOut
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
    )
}

fn is_permanent_io(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::InvalidInput
            | io::ErrorKind::InvalidData
            | io::ErrorKind::NotFound
            | io::ErrorKind::PermissionDenied
    )
}

fn message_is_transient(message: &str) -> bool {
    let message = message.to_lowercase();
    let words: Vec<&str> = message
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| !word.is_empty())
        .collect();

    let phrase_match = TRANSIENT_PHRASES.iter().any(|phrase| {
        words
            .windows(phrase.len())
            .any(|window| window == *phrase)
    });
    let status_match = words.windows(2).any(|pair| {
        STATUS_PREFIXES.contains(&pair[0]) && TRANSIENT_STATUS_CODES.contains(&pair[1])
    });
    phrase_match || status_match
}

#[cfg(test)]
mod tests {
    use std::fmt;
    use std::time::Duration;

    use super::*;
    use crate::rate::RateLimitError;

    #[derive(Debug)]
    struct Wrapped {
        context: &'static str,
        source: io::Error,
    }

    impl fmt::Display for Wrapped {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.context)
        }
    }

    impl Error for Wrapped {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.source)
        }
    }

    #[test]
    fn test_io_timeout_is_retryable() {
        let err = io::Error::from(io::ErrorKind::TimedOut);
        assert!(is_retryable(&err));
    }

    #[test]
    fn test_io_connection_reset_is_retryable() {
        let err = io::Error::from(io::ErrorKind::ConnectionReset);
        assert!(is_retryable(&err));
    }

    #[test]
    fn test_io_not_found_is_not_retryable() {
        let err = io::Error::new(io::ErrorKind::NotFound, "no such file");
        assert!(!is_retryable(&err));
    }

    #[test]
    fn test_source_chain_is_walked() {
        let err = Wrapped {
            context: "loading profile",
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        };
        assert!(is_retryable(&err));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_elapsed_is_retryable() {
        let err = tokio::time::timeout(Duration::from_millis(1), std::future::pending::<()>())
            .await
            .unwrap_err();
        assert!(is_retryable(&err));
    }

    #[test]
    fn test_transient_messages() {
        for message in [
            "upstream returned HTTP 503",
            "status 429 from gateway",
            "connection reset by peer",
            "Service Unavailable",
            "request Timeout",
            "Too Many Requests",
            "resource temporarily exhausted",
        ] {
            let err = io::Error::other(message);
            assert!(is_retryable(&err), "{message} should be retryable");
        }
    }

    #[test]
    fn test_rate_limit_exceeded_is_retryable() {
        let err = RateLimitError::<io::Error>::Exceeded;
        assert!(is_retryable(&err));
    }

    #[test]
    fn test_validation_errors_are_not_retryable() {
        for message in ["invalid email address", "missing field `name`", "permission denied"] {
            let err = io::Error::other(message);
            assert!(!is_retryable(&err), "{message} should not be retryable");
        }
    }

    #[test]
    fn test_lookalike_messages_are_not_retryable() {
        for message in [
            "order 14290 not found",
            "invalid product id 5030",
            "password reset token expired",
            "invalid connection string",
            "field `timeout_ms` must be positive",
        ] {
            let err = io::Error::other(message);
            assert!(!is_retryable(&err), "{message} should not be retryable");
        }
    }

    #[test]
    fn test_validation_kinds_override_transient_messages() {
        for kind in [
            io::ErrorKind::InvalidInput,
            io::ErrorKind::InvalidData,
            io::ErrorKind::NotFound,
            io::ErrorKind::PermissionDenied,
        ] {
            let err = io::Error::new(kind, "service unavailable, request timeout");
            assert!(!is_retryable(&err), "{kind:?} should not be retryable");
        }
    }

    #[test]
    fn test_validation_kind_in_source_chain_is_not_retryable() {
        let err = Wrapped {
            context: "connection reset while saving",
            source: io::Error::new(io::ErrorKind::InvalidInput, "bad payload"),
        };
        assert!(!is_retryable(&err));
    }
}
