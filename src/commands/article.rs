//! Article retrieval and navigation commands

use crate::article::ArticlePart;
use crate::response::codes;

/// Which retrieval command was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retrieve {
    /// ARTICLE: head and body
    Article,
    /// HEAD: header only
    Head,
    /// BODY: body only
    Body,
    /// STAT: status line only
    Stat,
}

impl Retrieve {
    /// Success code of the command
    pub fn code(self) -> u16 {
        match self {
            Retrieve::Article => codes::ARTICLE_FOLLOWS,
            Retrieve::Head => codes::HEAD_FOLLOWS,
            Retrieve::Body => codes::BODY_FOLLOWS,
            Retrieve::Stat => codes::ARTICLE_STAT,
        }
    }

    /// Text following `<n> <message-id>` in the success line
    pub fn status_text(self) -> &'static str {
        match self {
            Retrieve::Article => "article retrieved - head and body follow",
            Retrieve::Head => "article retrieved - head follows",
            Retrieve::Body => "article retrieved - body follows",
            Retrieve::Stat => "article retrieved - request text separately",
        }
    }

    /// Part of the article to send, `None` for STAT
    pub fn part(self) -> Option<ArticlePart> {
        match self {
            Retrieve::Article => Some(ArticlePart::Whole),
            Retrieve::Head => Some(ArticlePart::Head),
            Retrieve::Body => Some(ArticlePart::Body),
            Retrieve::Stat => None,
        }
    }
}

/// Argument of ARTICLE/HEAD/BODY/STAT
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleSelector {
    /// No argument: the current article
    Current,
    /// Article number in the current group
    Number(u64),
    /// `<message-id>`, searched for in the current group
    MessageId(String),
}

impl ArticleSelector {
    /// Parse the optional selector argument
    ///
    /// Returns `None` for an argument that is neither a number nor a
    /// bracketed message-id.
    pub fn parse(arg: Option<&str>) -> Option<Self> {
        match arg {
            None => Some(ArticleSelector::Current),
            Some(id) if id.starts_with('<') => Some(ArticleSelector::MessageId(id.to_string())),
            Some(number) => number.parse().ok().map(ArticleSelector::Number),
        }
    }
}
