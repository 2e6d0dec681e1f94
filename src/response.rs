//! NNTP response types and status codes

use crate::codec;
use std::fmt;

/// Response sent by the server: status line plus optional multi-line body
///
/// A multi-line response is terminated by a line containing only `.`; body
/// lines are dot-stuffed and truncated to the wire line limit on encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// 3-digit NNTP response code
    pub code: u16,
    /// Text following the code on the status line
    pub message: String,
    /// Multi-line body; `None` for single-line responses
    pub lines: Option<Vec<String>>,
}

impl Response {
    /// Single-line response
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            lines: None,
        }
    }

    /// Multi-line response; an empty `lines` still sends the terminator
    pub fn multiline(code: u16, message: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            code,
            message: message.into(),
            lines: Some(lines),
        }
    }

    /// Wire form, CRLF terminated, including the `.` terminator for multi-line bodies
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64);
        out.extend_from_slice(self.to_string().as_bytes());
        out.extend_from_slice(b"\r\n");
        if let Some(lines) = &self.lines {
            for line in lines {
                codec::write_stuffed_line(&mut out, line.as_bytes());
            }
            out.extend_from_slice(b".\r\n");
        }
        out
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{} {}", self.code, self.message)
        }
    }
}

/// NNTP response codes used by the server (RFC 977 / RFC 3977)
pub mod codes {
    // 1xx - Informational
    /// Help text follows
    pub const HELP_TEXT_FOLLOWS: u16 = 100;
    /// Server date/time (RFC 3977 Section 7.1)
    pub const SERVER_DATE: u16 = 111;

    // 2xx - Success
    /// Server ready, posting allowed
    pub const READY_POSTING_ALLOWED: u16 = 200;
    /// Extension list follows (LIST EXTENSIONS)
    pub const EXTENSIONS_FOLLOW: u16 = 202;
    /// Closing connection
    pub const CLOSING_CONNECTION: u16 = 205;
    /// Group selected
    pub const GROUP_SELECTED: u16 = 211;
    /// List of newsgroups follows (RFC 3977 Section 7.6)
    pub const LIST_INFORMATION_FOLLOWS: u16 = 215;
    /// Article follows
    pub const ARTICLE_FOLLOWS: u16 = 220;
    /// Head follows
    pub const HEAD_FOLLOWS: u16 = 221;
    /// Body follows
    pub const BODY_FOLLOWS: u16 = 222;
    /// Article stat
    pub const ARTICLE_STAT: u16 = 223;
    /// Overview information follows
    pub const OVERVIEW_INFO_FOLLOWS: u16 = 224;
    /// List of new newsgroups follows (RFC 3977 Section 7.3)
    pub const NEW_NEWSGROUPS_FOLLOW: u16 = 231;
    /// Article posted successfully (RFC 3977 Section 6.3.1)
    pub const ARTICLE_POSTED: u16 = 240;
    /// AUTHINFO SIMPLE accepted
    pub const AUTH_SIMPLE_ACCEPTED: u16 = 250;
    /// Authentication accepted
    pub const AUTH_ACCEPTED: u16 = 281;

    // 3xx - Continuation
    /// Send article to be posted
    pub const SEND_ARTICLE: u16 = 340;
    /// AUTHINFO SIMPLE: send "user pass"
    pub const AUTH_SIMPLE_CONTINUE: u16 = 350;
    /// Continue with authentication
    pub const AUTH_CONTINUE: u16 = 381;

    // 4xx - Temporary errors
    /// Service temporarily unavailable
    pub const SERVICE_UNAVAILABLE: u16 = 400;
    /// Internal fault or server resource problem (RFC 3977)
    pub const INTERNAL_FAULT: u16 = 403;
    /// No such newsgroup
    pub const NO_SUCH_GROUP: u16 = 411;
    /// No newsgroup selected
    pub const NO_GROUP_SELECTED: u16 = 412;
    /// No current article
    pub const NO_CURRENT_ARTICLE: u16 = 420;
    /// No next article
    pub const NO_NEXT_ARTICLE: u16 = 421;
    /// No previous article
    pub const NO_PREV_ARTICLE: u16 = 422;
    /// No article with that number
    pub const NO_SUCH_ARTICLE_NUMBER: u16 = 423;
    /// No article with that message-id
    pub const NO_SUCH_ARTICLE_ID: u16 = 430;
    /// Posting failed (RFC 3977 Section 6.3.1)
    pub const POSTING_FAILED: u16 = 441;
    /// AUTHINFO SIMPLE rejected
    pub const AUTH_SIMPLE_REJECTED: u16 = 452;
    /// Authentication required (RFC 4643)
    pub const AUTH_REQUIRED: u16 = 480;
    /// Authentication rejected
    pub const AUTH_REJECTED: u16 = 481;
    /// Authentication out of sequence
    pub const AUTH_OUT_OF_SEQUENCE: u16 = 482;

    // 5xx - Permanent errors
    /// Command not recognized
    pub const COMMAND_NOT_RECOGNIZED: u16 = 500;
    /// Command syntax error
    pub const COMMAND_SYNTAX_ERROR: u16 = 501;
    /// Feature not supported / optional functionality absent (RFC 3977)
    pub const FEATURE_NOT_SUPPORTED: u16 = 503;
}
