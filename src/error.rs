//! News server error types

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by the spool, the posting pipeline and client sessions
///
/// Every variant carries the human-readable reason that ends up both in the
/// client-facing response text and in the log.
#[derive(Error, Debug)]
pub enum NewsError {
    /// IO error while touching a spool file or directory
    #[error("{}: {source}", .path.display())]
    Io {
        /// File or directory the operation was working on
        path: PathBuf,
        /// Underlying system error
        #[source]
        source: std::io::Error,
    },

    /// IO error on the client connection
    #[error("IO error: {0}")]
    Network(#[from] std::io::Error),

    /// Group name contains characters or components that cannot map to the spool
    #[error("illegal group name '{0}'")]
    InvalidGroupName(String),

    /// Group directory or its `.config` file does not exist
    #[error("no such group '{0}'")]
    NoSuchGroup(String),

    /// Article file missing or unreadable
    #[error("article {number} no longer exists: {reason}")]
    NoSuchArticle {
        /// Article number that was requested
        number: u64,
        /// Why the load failed
        reason: String,
    },

    /// Linear message-id scan found nothing
    #[error("Message-ID not found: {0}")]
    MessageIdNotFound(String),

    /// Article lacks a required header or carries a malformed one
    #[error("{0}")]
    InvalidArticle(String),

    /// Posted message has no Newsgroups header
    #[error("article has no 'Newsgroups' field")]
    MissingNewsgroups,

    /// Posting is switched off for the target group
    #[error("posting disabled for group '{0}'")]
    PostingDisabled(String),

    /// Spam filter exited non-zero
    #[error("spam filter rejected message")]
    SpamRejected,

    /// Posting exceeded the group's line limit
    #[error("Not Posted: article exceeds sanity line limit of {0}.")]
    LineLimitExceeded(u32),

    /// Bad server configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Client went idle for longer than the configured timeout
    #[error("connection timed out")]
    Timeout,

    /// Client hung up
    #[error("connection closed")]
    ConnectionClosed,

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl NewsError {
    /// Build an [`NewsError::Io`] that remembers which path failed
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        NewsError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// True for errors that come from the storage layer rather than from the
    /// client's request. These are always logged with their system error text.
    pub fn is_storage(&self) -> bool {
        matches!(self, NewsError::Io { .. })
    }
}

/// Result type alias using NewsError
pub type Result<T> = std::result::Result<T, NewsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_names_path() {
        let err = NewsError::io(
            "/var/spool/news/a/b/.info",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied"),
        );
        assert_eq!(
            err.to_string(),
            "/var/spool/news/a/b/.info: Permission denied"
        );
        assert!(err.is_storage());
    }

    #[test]
    fn test_line_limit_message() {
        let err = NewsError::LineLimitExceeded(10);
        assert_eq!(
            err.to_string(),
            "Not Posted: article exceeds sanity line limit of 10."
        );
        assert!(!err.is_storage());
    }

    #[test]
    fn test_posting_disabled_message() {
        let err = NewsError::PostingDisabled("a.b".to_string());
        assert_eq!(err.to_string(), "posting disabled for group 'a.b'");
    }
}
