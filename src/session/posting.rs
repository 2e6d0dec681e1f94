//! POST

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{info, warn};

use super::{Session, log_failure};
use crate::article::RawMessage;
use crate::auth::AuthOp;
use crate::codec::PostBody;
use crate::error::{NewsError, Result};
use crate::mail;
use crate::response::{Response, codes};
use crate::spool::prepend_path;

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// POST: collect the article, commit it to the spool, cc-post it
    ///
    /// The wire-level line cap comes from the currently selected group; the
    /// spool re-checks against the target group. The cursor is untouched.
    pub(super) async fn post(&mut self) -> Result<()> {
        if !self.gate(AuthOp::Post).await? {
            return Ok(());
        }
        let limit = self
            .state
            .group
            .as_ref()
            .map_or(0, |g| g.config.post_limit);

        self.send(Response::new(
            codes::SEND_ARTICLE,
            "Continue posting; Period on a line by itself to end",
        ))
        .await?;

        let raw = match self.read_post_body(limit).await? {
            PostBody::Complete(raw) => raw,
            PostBody::TooLong { limit } => {
                let e = NewsError::LineLimitExceeded(limit);
                warn!("POST rejected: {}", e);
                return self
                    .send(Response::new(codes::POSTING_FAILED, e.to_string()))
                    .await;
            }
        };

        let mut message = RawMessage::parse(&raw);
        prepend_path(&mut message.head, self.spool.server_name());

        let remote = self.peer.clone();
        let posted = match self
            .with_spool(move |spool| spool.post(message, &remote, false))
            .await
        {
            Ok(posted) => posted,
            Err(e) => {
                log_failure("POST", &e);
                return self
                    .send(Response::new(codes::POSTING_FAILED, e.to_string()))
                    .await;
            }
        };
        info!(
            "posted {} as {}/{}",
            posted.message_id, posted.group.name, posted.number
        );

        self.send(Response::new(
            codes::ARTICLE_POSTED,
            "Article posted successfully.",
        ))
        .await?;

        if posted.group.config.is_cc_post() {
            let config = Arc::clone(&self.config);
            let mailing = tokio::task::spawn_blocking(move || {
                mail::cc_post(
                    &config.sendmail,
                    &posted.group.name,
                    &posted.group.config,
                    &posted.head,
                    &posted.body,
                    false,
                );
            });
            if let Err(e) = mailing.await {
                warn!("ccpost task failed: {}", e);
            }
        }
        Ok(())
    }
}
