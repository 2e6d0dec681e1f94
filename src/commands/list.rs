//! LIST command variants and listing line formats

use crate::spool::Group;

/// Extensions advertised by LIST EXTENSIONS
pub const EXTENSIONS: &[&str] = &["LISTGROUP", "MODE", "XOVER", "DATE"];

/// LIST keyword
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListKeyword {
    /// `LIST` or `LIST ACTIVE`
    Active,
    /// `LIST ACTIVE <wildmat>`; patterns are not supported
    ActivePattern(String),
    /// `LIST ACTIVE.TIMES`
    ActiveTimes,
    /// `LIST NEWSGROUPS`
    Newsgroups,
    /// `LIST OVERVIEW.FMT`
    OverviewFmt,
    /// `LIST SUBSCRIPTIONS`
    Subscriptions,
    /// `LIST EXTENSIONS`
    Extensions,
    /// `LIST DISTRIBUTIONS`, `LIST DISTRIB.PATS`
    Distributions,
    /// Anything else
    Unknown(String),
}

impl ListKeyword {
    /// Parse the keyword and optional argument following LIST
    pub fn parse(keyword: Option<&str>, arg: Option<&str>) -> Self {
        let Some(keyword) = keyword else {
            return ListKeyword::Active;
        };
        match keyword.to_ascii_uppercase().as_str() {
            "ACTIVE" => match arg {
                Some(pattern) => ListKeyword::ActivePattern(pattern.to_string()),
                None => ListKeyword::Active,
            },
            "ACTIVE.TIMES" => ListKeyword::ActiveTimes,
            "NEWSGROUPS" => ListKeyword::Newsgroups,
            "OVERVIEW.FMT" => ListKeyword::OverviewFmt,
            "SUBSCRIPTIONS" => ListKeyword::Subscriptions,
            "EXTENSIONS" => ListKeyword::Extensions,
            "DISTRIBUTIONS" | "DISTRIB.PATS" => ListKeyword::Distributions,
            _ => ListKeyword::Unknown(keyword.to_string()),
        }
    }
}

/// `LIST ACTIVE` / `NEWGROUPS` line: `name end start y|n`
pub fn active_line(group: &Group) -> String {
    format!(
        "{} {} {} {}",
        group.name,
        group.info.end,
        group.info.start,
        if group.config.post_ok { 'y' } else { 'n' }
    )
}

/// `LIST ACTIVE.TIMES` line: `name ctime creator`
pub fn active_times_line(group: &Group) -> String {
    format!("{} {} {}", group.name, group.ctime_secs(), group.config.creator)
}

/// `LIST NEWSGROUPS` line: `name description`
pub fn newsgroups_line(group: &Group) -> String {
    format!("{} {}", group.name, group.config.description)
}
