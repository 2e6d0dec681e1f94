//! AUTHINFO handling and the authorization gate

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use super::Session;
use crate::auth::{AuthOp, PassOutcome};
use crate::commands::AuthInfo;
use crate::error::{NewsError, Result};
use crate::response::{Response, codes};

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Check that `op` is permitted; sends 480 and returns false if not
    pub(super) async fn gate(&mut self, op: AuthOp) -> Result<bool> {
        if self.state.auth.is_allowed(op) {
            return Ok(true);
        }
        debug!("{:?} refused, not authenticated", op);
        self.send(Response::new(codes::AUTH_REQUIRED, "Authentication required"))
            .await?;
        Ok(false)
    }

    pub(super) async fn authinfo(&mut self, sub: AuthInfo) -> Result<()> {
        if !self.state.auth.is_required() {
            return self
                .send(Response::new(codes::AUTH_ACCEPTED, "No authentication needed"))
                .await;
        }

        let response = match sub {
            AuthInfo::User(Some(user)) => {
                self.state.auth.user(&user);
                Response::new(codes::AUTH_CONTINUE, "Now supply your password")
            }
            AuthInfo::Pass(Some(pass)) => match self.state.auth.pass(&pass) {
                PassOutcome::Accepted => Response::new(codes::AUTH_ACCEPTED, "Authenticated OK"),
                PassOutcome::Rejected => {
                    tokio::time::sleep(self.state.auth.failure_delay()).await;
                    Response::new(codes::AUTH_REJECTED, "Authentication failed")
                }
                PassOutcome::OutOfSequence => {
                    Response::new(codes::AUTH_OUT_OF_SEQUENCE, "User must be specified first")
                }
            },
            AuthInfo::Simple => {
                self.send(Response::new(
                    codes::AUTH_SIMPLE_CONTINUE,
                    "Go ahead with username and password",
                ))
                .await?;
                return self.authinfo_simple().await;
            }
            AuthInfo::Generic => Response::new(
                codes::FEATURE_NOT_SUPPORTED,
                "'AUTHINFO GENERIC' not supported",
            ),
            AuthInfo::User(None) | AuthInfo::Pass(None) | AuthInfo::Unknown => {
                Response::new(codes::COMMAND_SYNTAX_ERROR, "Bad or unknown argument")
            }
        };
        self.send(response).await
    }

    /// Second half of AUTHINFO SIMPLE: a `user pass` line
    async fn authinfo_simple(&mut self) -> Result<()> {
        let Some(raw) = self.read_line().await? else {
            return Err(NewsError::ConnectionClosed);
        };
        let text = String::from_utf8_lossy(&raw);
        let mut words = text.split_whitespace();
        let (Some(user), Some(pass)) = (words.next(), words.next()) else {
            return self
                .send(Response::new(codes::COMMAND_SYNTAX_ERROR, "Bad or unknown argument"))
                .await;
        };
        debug!("GOT: <AUTHINFO SIMPLE credentials for {}>", user);

        let response = if self.state.auth.login(user, pass) {
            Response::new(codes::AUTH_SIMPLE_ACCEPTED, "Authenticated OK")
        } else {
            tokio::time::sleep(self.state.auth.failure_delay()).await;
            Response::new(codes::AUTH_SIMPLE_REJECTED, "Authorization rejected")
        };
        self.send(response).await
    }
}
