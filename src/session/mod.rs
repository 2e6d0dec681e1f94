//! Session Engine
//!
//! One [`Session`] drives one client connection: it frames command lines,
//! dispatches them, and keeps the per-connection cursor and login state.
//!
//! Spool access is synchronous and may wait on a group lock, so every spool
//! call runs on tokio's blocking pool. Locks are taken and released inside
//! those calls and never held while talking to the client.
//!
//! The handlers are split by area:
//! - `io`: line framing, POST body reading, response writing
//! - `articles`: ARTICLE/HEAD/BODY/STAT, NEXT/LAST, XOVER
//! - `listing`: GROUP, LISTGROUP, LIST, NEWGROUPS
//! - `posting`: POST
//! - `authinfo`: AUTHINFO and the authorization gate

mod articles;
mod authinfo;
mod io;
mod listing;
mod posting;
mod state;

pub use state::SessionState;

use std::sync::Arc;

use chrono::Utc;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tracing::{Instrument, Span, debug, error, info, info_span};

use crate::auth::AuthOp;
use crate::codec::LineDecoder;
use crate::commands::{Command, CommandLine, HELP_TEXT, Mode};
use crate::config::ServerConfig;
use crate::error::{NewsError, Result};
use crate::response::{Response, codes};
use crate::spool::Spool;

/// Greeting sent on connect and in answer to MODE READER
pub const GREETING: &str = "newsd news server ready - posting ok";

/// Whether the command loop goes on after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// A client session over any bidirectional byte stream
pub struct Session<S> {
    stream: BufReader<S>,
    decoder: LineDecoder,
    spool: Arc<Spool>,
    config: Arc<ServerConfig>,
    peer: String,
    state: SessionState,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Session for a connection from `peer` (recorded in NNTP-Posting-Host)
    pub fn new(stream: S, peer: impl Into<String>, spool: Arc<Spool>, config: Arc<ServerConfig>) -> Self {
        Self {
            stream: BufReader::new(stream),
            decoder: LineDecoder::default(),
            state: SessionState::new(config.auth.clone()),
            spool,
            config,
            peer: peer.into(),
        }
    }

    /// Session state, for inspection
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Greet the client and serve commands until QUIT, disconnect or idle
    /// timeout
    ///
    /// A timeout or a client hang-up ends the session normally; only write
    /// failures and similar connection errors are returned.
    pub async fn run(mut self) -> Result<()> {
        let span = info_span!("session", peer = %self.peer);
        async move {
            info!("connection accepted");
            let result = self.serve().await;
            match result {
                Ok(()) => {
                    info!("connection closed");
                    Ok(())
                }
                Err(NewsError::Timeout) => {
                    info!("idle timeout, dropping connection");
                    Ok(())
                }
                Err(NewsError::ConnectionClosed) => {
                    info!("client hung up");
                    Ok(())
                }
                Err(e) => {
                    error!("session failed: {}", e);
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn serve(&mut self) -> Result<()> {
        self.send(Response::new(codes::READY_POSTING_ALLOWED, GREETING))
            .await?;

        while let Some(raw) = self.read_line().await? {
            let text = String::from_utf8_lossy(&raw);
            let Some(line) = CommandLine::parse(&text) else {
                continue;
            };
            debug!("GOT: {}", line);

            if self.dispatch(&line).await? == Flow::Quit {
                break;
            }
        }
        Ok(())
    }

    async fn dispatch(&mut self, line: &CommandLine) -> Result<Flow> {
        match Command::parse(line) {
            Command::AuthInfo(sub) => self.authinfo(sub).await?,
            Command::Retrieve(kind, selector) => self.retrieve(kind, selector).await?,
            Command::Next => self.step(true).await?,
            Command::Last => self.step(false).await?,
            Command::XOver(range) => self.xover(range).await?,
            Command::Group(name) => self.group(name).await?,
            Command::ListGroup(name) => self.listgroup(name).await?,
            Command::List(keyword) => self.list(keyword).await?,
            Command::NewGroups(since) => self.newgroups(since).await?,
            Command::Post => self.post().await?,
            Command::Date => {
                if self.gate(AuthOp::Read).await? {
                    let now = Utc::now().format("%Y%m%d%H%M%S").to_string();
                    self.send(Response::new(codes::SERVER_DATE, now)).await?;
                }
            }
            Command::Help => {
                let lines = HELP_TEXT.iter().map(|l| l.to_string()).collect();
                self.send(Response::multiline(
                    codes::HELP_TEXT_FOLLOWS,
                    "help text follows",
                    lines,
                ))
                .await?;
            }
            Command::Mode(Mode::Reader) => {
                self.send(Response::new(codes::READY_POSTING_ALLOWED, GREETING))
                    .await?;
            }
            Command::Mode(Mode::Stream) => {
                self.send(Response::new(
                    codes::FEATURE_NOT_SUPPORTED,
                    "Streaming not supported on this server",
                ))
                .await?;
            }
            Command::Mode(Mode::Unknown) => {
                self.send(Response::new(
                    codes::COMMAND_SYNTAX_ERROR,
                    "Bad or unknown argument",
                ))
                .await?;
            }
            Command::Quit => {
                self.send(Response::new(codes::CLOSING_CONNECTION, "goodbye."))
                    .await?;
                return Ok(Flow::Quit);
            }
            Command::Unsupported(verb) => {
                self.send(Response::new(
                    codes::FEATURE_NOT_SUPPORTED,
                    format!("'{verb}' not supported on this server"),
                ))
                .await?;
            }
            Command::Syntax(reason) => {
                self.send(Response::new(codes::COMMAND_SYNTAX_ERROR, reason))
                    .await?;
            }
            Command::Unknown(verb) => {
                debug!("unknown command {}", verb);
                self.send(Response::new(
                    codes::COMMAND_NOT_RECOGNIZED,
                    "Command not understood",
                ))
                .await?;
            }
        }
        Ok(Flow::Continue)
    }

    /// Run `f` against the spool on the blocking pool
    async fn with_spool<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Spool) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let spool = Arc::clone(&self.spool);
        let span = Span::current();
        tokio::task::spawn_blocking(move || span.in_scope(|| f(&spool)))
            .await
            .map_err(|e| NewsError::Other(format!("spool task failed: {e}")))?
    }
}

/// Log a spool error the way every handler does: storage failures at error
/// level with their system text, the rest at debug
fn log_failure(context: &str, err: &NewsError) {
    if err.is_storage() {
        error!("{}: {}", context, err);
    } else {
        debug!("{}: {}", context, err);
    }
}

/// Answer for a group that could not be loaded: 411 when it is gone or
/// unnameable, 403 for spool failures
fn group_failure(err: &NewsError) -> Response {
    match err {
        NewsError::NoSuchGroup(_) | NewsError::InvalidGroupName(_) => {
            Response::new(codes::NO_SUCH_GROUP, format!("No such newsgroup: {err}"))
        }
        _ => Response::new(codes::INTERNAL_FAULT, err.to_string()),
    }
}
