//! Group selection and listing commands

use chrono::{DateTime, Utc};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use super::{Session, group_failure, log_failure};
use crate::article::OVERVIEW_FMT;
use crate::auth::AuthOp;
use crate::commands::{EXTENSIONS, ListKeyword, active_line, active_times_line, newsgroups_line};
use crate::error::Result;
use crate::response::{Response, codes};
use crate::spool::Group;

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// GROUP
    pub(super) async fn group(&mut self, name: String) -> Result<()> {
        if !self.gate(AuthOp::Read).await? {
            return Ok(());
        }
        let Some(group) = self.select_group(name).await? else {
            return Ok(());
        };
        self.send(Response::new(
            codes::GROUP_SELECTED,
            format!("{} group selected", group_summary(&group)),
        ))
        .await
    }

    /// LISTGROUP, optionally switching group first
    pub(super) async fn listgroup(&mut self, name: Option<String>) -> Result<()> {
        if !self.gate(AuthOp::Read).await? {
            return Ok(());
        }
        let group = match name {
            Some(name) => match self.select_group(name).await? {
                Some(group) => group,
                None => return Ok(()),
            },
            None => {
                let Some(name) = self.state.group_name().map(str::to_string) else {
                    return self
                        .send(Response::new(
                            codes::NO_GROUP_SELECTED,
                            "Not currently in newsgroup",
                        ))
                        .await;
                };
                match self.select_group(name).await? {
                    Some(group) => group,
                    None => return Ok(()),
                }
            }
        };

        let summary = group_summary(&group);
        let numbers = self
            .with_spool(move |spool| spool.article_numbers(&group))
            .await;
        match numbers {
            Ok(numbers) => {
                let lines = numbers.iter().map(u64::to_string).collect();
                self.send(Response::multiline(
                    codes::GROUP_SELECTED,
                    format!("{summary} list follows"),
                    lines,
                ))
                .await
            }
            Err(e) => {
                log_failure("listing articles", &e);
                self.send(Response::new(codes::INTERNAL_FAULT, e.to_string()))
                    .await
            }
        }
    }

    /// Load group `name` and make it current; answers 411 or 403 itself on failure
    async fn select_group(&mut self, name: String) -> Result<Option<Group>> {
        match self.with_spool(move |spool| spool.open_group(&name)).await {
            Ok(group) => {
                debug!("selected {} ({} articles)", group.name, group.info.total);
                self.state.select(group.clone());
                Ok(Some(group))
            }
            Err(e) => {
                log_failure("GROUP", &e);
                self.send(group_failure(&e)).await?;
                Ok(None)
            }
        }
    }

    /// LIST and its keywords
    pub(super) async fn list(&mut self, keyword: ListKeyword) -> Result<()> {
        if !self.gate(AuthOp::Read).await? {
            return Ok(());
        }

        let (message, format): (&str, fn(&Group) -> String) = match keyword {
            ListKeyword::Active => ("list of newsgroups follows", active_line),
            ListKeyword::ActiveTimes => ("information follows", active_times_line),
            ListKeyword::Newsgroups => ("information follows", newsgroups_line),
            ListKeyword::Subscriptions => ("information follows", name_line),
            ListKeyword::OverviewFmt => {
                let lines = OVERVIEW_FMT.iter().map(|f| f.to_string()).collect();
                return self
                    .send(Response::multiline(
                        codes::LIST_INFORMATION_FOLLOWS,
                        "information follows",
                        lines,
                    ))
                    .await;
            }
            ListKeyword::Extensions => {
                let lines = EXTENSIONS.iter().map(|e| e.to_string()).collect();
                return self
                    .send(Response::multiline(
                        codes::EXTENSIONS_FOLLOW,
                        "Extensions supported:",
                        lines,
                    ))
                    .await;
            }
            ListKeyword::ActivePattern(pattern) => {
                debug!("LIST ACTIVE pattern refused: {}", pattern);
                return self
                    .send(Response::new(
                        codes::FEATURE_NOT_SUPPORTED,
                        "LIST ACTIVE <wildmat>: wildmats not supported",
                    ))
                    .await;
            }
            ListKeyword::Distributions => {
                return self
                    .send(Response::new(
                        codes::FEATURE_NOT_SUPPORTED,
                        "Not implemented on this server",
                    ))
                    .await;
            }
            ListKeyword::Unknown(keyword) => {
                debug!("unknown LIST keyword {}", keyword);
                return self
                    .send(Response::new(codes::COMMAND_SYNTAX_ERROR, "Syntax error"))
                    .await;
            }
        };

        self.send_groups(codes::LIST_INFORMATION_FOLLOWS, message, |_| true, format)
            .await
    }

    /// NEWGROUPS: groups created at or after `since`
    pub(super) async fn newgroups(&mut self, since: DateTime<Utc>) -> Result<()> {
        if !self.gate(AuthOp::Read).await? {
            return Ok(());
        }
        let since = u64::try_from(since.timestamp()).unwrap_or(0);
        self.send_groups(
            codes::NEW_NEWSGROUPS_FOLLOW,
            "list of new newsgroups follows",
            move |g| g.ctime_secs() >= since,
            active_line,
        )
        .await
    }

    /// Send one formatted line per group passing `filter`
    async fn send_groups(
        &mut self,
        code: u16,
        message: &str,
        filter: impl Fn(&Group) -> bool + Send + 'static,
        format: fn(&Group) -> String,
    ) -> Result<()> {
        let lines = self
            .with_spool(move |spool| {
                Ok(spool
                    .all_groups()?
                    .iter()
                    .filter(|g| filter(g))
                    .map(format)
                    .collect::<Vec<_>>())
            })
            .await;
        match lines {
            Ok(lines) => self.send(Response::multiline(code, message, lines)).await,
            Err(e) => {
                log_failure("listing groups", &e);
                self.send(Response::new(codes::INTERNAL_FAULT, e.to_string()))
                    .await
            }
        }
    }
}

fn name_line(group: &Group) -> String {
    group.name.clone()
}

/// `total start end name`, shared by GROUP and LISTGROUP
fn group_summary(group: &Group) -> String {
    format!(
        "{} {} {} {}",
        group.info.total, group.info.start, group.info.end, group.name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spool::{GroupConfig, GroupInfo};
    use std::time::SystemTime;

    #[test]
    fn test_group_summary() {
        let group = Group {
            name: "a.b".into(),
            dir: "/spool/a/b".into(),
            info: GroupInfo { start: 5, end: 42, total: 38 },
            config: GroupConfig::default(),
            ctime: SystemTime::UNIX_EPOCH,
        };
        assert_eq!(group_summary(&group), "38 5 42 a.b");
    }
}
