//! Article retrieval, navigation and overview commands

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use super::{Session, group_failure, log_failure};
use crate::article::OVERVIEW_FMT;
use crate::auth::AuthOp;
use crate::commands::{ArticleRange, ArticleSelector, Retrieve};
use crate::error::{NewsError, Result};
use crate::response::{Response, codes};
use crate::spool::Group;

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Reload the selected group so counters reflect other sessions' posts
    ///
    /// Sends 412 and returns `None` when no group is selected. A group that
    /// has vanished answers 411; a spool failure answers 403.
    async fn refresh_group(&mut self) -> Result<Option<Group>> {
        let Some(name) = self.state.group_name().map(str::to_string) else {
            self.send(Response::new(
                codes::NO_GROUP_SELECTED,
                "Not currently in newsgroup",
            ))
            .await?;
            return Ok(None);
        };
        let group = match self.with_spool(move |spool| spool.open_group(&name)).await {
            Ok(group) => group,
            Err(e) => {
                log_failure("reloading group", &e);
                self.send(group_failure(&e)).await?;
                return Ok(None);
            }
        };
        self.state.group = Some(group.clone());
        Ok(Some(group))
    }

    /// ARTICLE, HEAD, BODY and STAT
    pub(super) async fn retrieve(&mut self, kind: Retrieve, selector: ArticleSelector) -> Result<()> {
        if !self.gate(AuthOp::Read).await? {
            return Ok(());
        }
        let Some(group) = self.refresh_group().await? else {
            return Ok(());
        };

        let number = match &selector {
            ArticleSelector::Current => match self.state.current {
                Some(n) => Some(n),
                None => {
                    return self
                        .send(Response::new(
                            codes::NO_CURRENT_ARTICLE,
                            "no article has been selected",
                        ))
                        .await;
                }
            },
            ArticleSelector::Number(n) => {
                if !group.info.contains(*n) {
                    return self.send(out_of_range(&group)).await;
                }
                Some(*n)
            }
            ArticleSelector::MessageId(_) => None,
        };

        let part = kind.part();
        let message_id = match &selector {
            ArticleSelector::MessageId(id) => Some(id.clone()),
            _ => None,
        };
        let lookup = self
            .with_spool(move |spool| {
                let number = match (number, message_id) {
                    (Some(n), _) => n,
                    (None, Some(id)) => spool.find_by_message_id(&group, &id)?,
                    (None, None) => return Err(NewsError::Other("no article selected".into())),
                };
                let article = spool.load_article(&group, number)?;
                let data = match part {
                    Some(part) => Some(spool.render_article(&group, number, part)?),
                    None => None,
                };
                Ok((article, data))
            })
            .await;

        let (article, data) = match lookup {
            Ok(found) => found,
            Err(e @ NewsError::MessageIdNotFound(_)) => {
                log_failure("message-id lookup", &e);
                return self
                    .send(Response::new(codes::NO_SUCH_ARTICLE_ID, "no such article found"))
                    .await;
            }
            Err(e) => {
                log_failure("loading article", &e);
                return self
                    .send(Response::new(
                        codes::NO_SUCH_ARTICLE_NUMBER,
                        format!("no such article in group: {e}"),
                    ))
                    .await;
            }
        };

        // message-id lookups leave the cursor alone
        if matches!(selector, ArticleSelector::Number(_)) {
            self.state.current = Some(article.number);
        }

        let status = Response::new(
            kind.code(),
            format!("{} {} {}", article.number, article.message_id, kind.status_text()),
        );
        match data {
            Some(data) => self.send_data(status, &data).await,
            None => self.send(status).await,
        }
    }

    /// NEXT (`forward`) and LAST
    ///
    /// Moves to the nearest article that actually loads, skipping gaps.
    pub(super) async fn step(&mut self, forward: bool) -> Result<()> {
        if !self.gate(AuthOp::Read).await? {
            return Ok(());
        }
        let Some(group) = self.refresh_group().await? else {
            return Ok(());
        };
        let Some(current) = self.state.current else {
            return self
                .send(Response::new(
                    codes::NO_CURRENT_ARTICLE,
                    "no current article has been selected",
                ))
                .await;
        };

        let found = self
            .with_spool(move |spool| {
                let candidates: Box<dyn Iterator<Item = u64>> = if forward {
                    Box::new(current.saturating_add(1)..=group.info.end)
                } else {
                    Box::new((group.info.start..current).rev())
                };
                for number in candidates {
                    match spool.load_article(&group, number) {
                        Ok(article) => return Ok(Some(article)),
                        Err(e) => debug!("skipping article {}: {}", number, e),
                    }
                }
                Ok(None)
            })
            .await;

        match found {
            Ok(Some(article)) => {
                self.state.current = Some(article.number);
                self.send(Response::new(
                    codes::ARTICLE_STAT,
                    format!(
                        "{} {} {}",
                        article.number,
                        article.message_id,
                        Retrieve::Stat.status_text()
                    ),
                ))
                .await
            }
            Ok(None) if forward => {
                self.send(Response::new(
                    codes::NO_NEXT_ARTICLE,
                    "no next article in this group",
                ))
                .await
            }
            Ok(None) => {
                self.send(Response::new(
                    codes::NO_PREV_ARTICLE,
                    "no previous article in this group",
                ))
                .await
            }
            Err(e) => {
                log_failure("stepping through group", &e);
                self.send(Response::new(codes::INTERNAL_FAULT, e.to_string()))
                    .await
            }
        }
    }

    /// XOVER
    pub(super) async fn xover(&mut self, range: Option<ArticleRange>) -> Result<()> {
        if !self.gate(AuthOp::Read).await? {
            return Ok(());
        }
        let Some(group) = self.refresh_group().await? else {
            return Ok(());
        };

        let numbers = ArticleRange::clamp(range, &group.info);
        let records = self
            .with_spool(move |spool| {
                let mut records = Vec::new();
                for number in numbers {
                    match spool.load_article(&group, number) {
                        Ok(article) => records.push(article.overview(OVERVIEW_FMT)),
                        Err(e) => debug!("xover skipping {}: {}", number, e),
                    }
                }
                Ok(records)
            })
            .await;

        match records {
            Ok(records) => {
                self.send(Response::multiline(
                    codes::OVERVIEW_INFO_FOLLOWS,
                    "overview follows",
                    records,
                ))
                .await
            }
            Err(e) => {
                log_failure("xover", &e);
                self.send(Response::new(codes::INTERNAL_FAULT, e.to_string()))
                    .await
            }
        }
    }
}

fn out_of_range(group: &Group) -> Response {
    Response::new(
        codes::NO_SUCH_ARTICLE_NUMBER,
        format!(
            "no such article in group (range {}-{})",
            group.info.start, group.info.end
        ),
    )
}
