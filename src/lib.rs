#![doc = include_str!("../README.md")]

/// Article files: parsing, overview records, wire rendering
pub mod article;
/// AUTHINFO state machine
pub mod auth;
/// Wire framing: command lines, POST bodies, dot-stuffing
pub mod codec;
/// NNTP command parsing
pub mod commands;
mod config;
mod error;
/// Mail-to-news gateway
pub mod gateway;
/// Daemon logging setup
pub mod logging;
/// cc-post mail delivery
pub mod mail;
/// Session-count limiting
pub mod ratelimit;
mod response;
mod server;
/// Client sessions
pub mod session;
/// Article spool: groups, locks, posting
pub mod spool;
/// Group name and Message-ID validation
pub mod validation;

pub use article::{ArticlePart, RawMessage, StoredArticle};
pub use auth::{AuthOp, AuthState};
pub use config::{AuthConfig, AuthProtect, ServerConfig};
pub use error::{NewsError, Result};
pub use gateway::mail_gateway;
pub use ratelimit::{ConnectionLimiter, ConnectionPermit};
pub use response::{Response, codes};
pub use server::{NewsServer, TOO_MANY_CONNECTIONS};
pub use session::{Session, SessionState};
pub use spool::{Group, GroupConfig, GroupInfo, GroupLock, Posted, Spool};
