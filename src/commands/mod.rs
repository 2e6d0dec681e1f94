//! NNTP command parsing
//!
//! A client line is split into a verb and its first two arguments; extra
//! words are ignored. [`Command::parse`] turns that into a typed command so
//! the session only deals with well-formed requests.

// Module declarations
pub mod article;
pub mod group;
pub mod list;
pub mod over;

pub use article::*;
pub use group::*;
pub use list::*;
pub use over::*;

use std::fmt;

/// A command line split into verb and arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Verb, uppercased
    pub verb: String,
    /// First argument
    pub arg1: Option<String>,
    /// Second argument
    pub arg2: Option<String>,
    /// Third argument (NEWGROUPS zone)
    pub arg3: Option<String>,
}

impl CommandLine {
    /// Split a line into words; `None` for a blank line
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let verb = words.next()?.to_ascii_uppercase();
        let mut next = || words.next().map(str::to_string);
        Some(Self {
            verb,
            arg1: next(),
            arg2: next(),
            arg3: next(),
        })
    }

    fn is_password(&self) -> bool {
        self.verb == "AUTHINFO"
            && self
                .arg1
                .as_deref()
                .is_some_and(|a| a.eq_ignore_ascii_case("PASS"))
    }
}

/// Logging form of the line; AUTHINFO PASS values are masked
impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.verb)?;
        if let Some(arg1) = &self.arg1 {
            write!(f, " {arg1}")?;
        }
        if self.is_password() {
            if self.arg2.is_some() {
                write!(f, " ********")?;
            }
            return Ok(());
        }
        for arg in [&self.arg2, &self.arg3].into_iter().flatten() {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// AUTHINFO sub-commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthInfo {
    /// `AUTHINFO USER name`
    User(Option<String>),
    /// `AUTHINFO PASS secret`
    Pass(Option<String>),
    /// `AUTHINFO SIMPLE`, credentials follow on the next line
    Simple,
    /// `AUTHINFO GENERIC ...`
    Generic,
    /// Anything else
    Unknown,
}

/// Argument of MODE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `MODE READER`
    Reader,
    /// `MODE STREAM`
    Stream,
    /// Anything else
    Unknown,
}

/// A parsed client command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// AUTHINFO
    AuthInfo(AuthInfo),
    /// ARTICLE/HEAD/BODY/STAT
    Retrieve(Retrieve, ArticleSelector),
    /// DATE
    Date,
    /// GROUP name
    Group(String),
    /// HELP
    Help,
    /// LAST
    Last,
    /// LIST variants
    List(ListKeyword),
    /// LISTGROUP [name]
    ListGroup(Option<String>),
    /// MODE
    Mode(Mode),
    /// NEWGROUPS
    NewGroups(chrono::DateTime<chrono::Utc>),
    /// NEXT
    Next,
    /// POST
    Post,
    /// QUIT
    Quit,
    /// XOVER [range]
    XOver(Option<ArticleRange>),
    /// Known verb that this server does not implement
    Unsupported(String),
    /// Known verb with unusable arguments; the text goes into a 501
    Syntax(&'static str),
    /// Unknown verb
    Unknown(String),
}

impl Command {
    /// Interpret a command line
    pub fn parse(line: &CommandLine) -> Self {
        let arg1 = line.arg1.as_deref();
        let arg2 = line.arg2.as_deref();
        match line.verb.as_str() {
            "AUTHINFO" => Command::AuthInfo(match arg1.map(str::to_ascii_uppercase).as_deref() {
                Some("USER") => AuthInfo::User(line.arg2.clone()),
                Some("PASS") => AuthInfo::Pass(line.arg2.clone()),
                Some("SIMPLE") => AuthInfo::Simple,
                Some("GENERIC") => AuthInfo::Generic,
                _ => AuthInfo::Unknown,
            }),
            verb @ ("ARTICLE" | "HEAD" | "BODY" | "STAT") => {
                let kind = match verb {
                    "ARTICLE" => Retrieve::Article,
                    "HEAD" => Retrieve::Head,
                    "BODY" => Retrieve::Body,
                    _ => Retrieve::Stat,
                };
                match ArticleSelector::parse(arg1) {
                    Some(selector) => Command::Retrieve(kind, selector),
                    None => Command::Syntax("bad article number or message-id"),
                }
            }
            "DATE" => Command::Date,
            "GROUP" => match arg1 {
                Some(name) => Command::Group(name.to_string()),
                None => Command::Syntax("syntax error; expected 'GROUP <group-name>'"),
            },
            "HELP" => Command::Help,
            "LAST" => Command::Last,
            "LIST" => Command::List(ListKeyword::parse(arg1, arg2)),
            "LISTGROUP" => Command::ListGroup(line.arg1.clone()),
            "MODE" => Command::Mode(match arg1.map(str::to_ascii_uppercase).as_deref() {
                Some("READER") => Mode::Reader,
                Some("STREAM") => Mode::Stream,
                _ => Mode::Unknown,
            }),
            "NEWGROUPS" => match (arg1, arg2) {
                (Some(date), Some(time)) => {
                    match parse_newgroups_time(date, time, line.arg3.as_deref()) {
                        Some(since) => Command::NewGroups(since),
                        None => Command::Syntax("Bad or missing date/time arguments"),
                    }
                }
                _ => Command::Syntax("Bad or missing date/time arguments"),
            },
            "NEXT" => Command::Next,
            "POST" => Command::Post,
            "QUIT" => Command::Quit,
            "XOVER" => match arg1 {
                None => Command::XOver(None),
                Some(range) => match ArticleRange::parse(range) {
                    Some(range) => Command::XOver(Some(range)),
                    None => Command::Syntax("bad article range"),
                },
            },
            "CHECK" | "TAKETHIS" | "IHAVE" | "NEWNEWS" | "XREPLIC" => {
                Command::Unsupported(line.verb.clone())
            }
            _ => Command::Unknown(line.verb.clone()),
        }
    }
}

/// HELP text lines
pub const HELP_TEXT: &[&str] = &[
    "GROUP newsgroup",
    "LIST [ACTIVE|ACTIVE.TIMES|NEWSGROUPS|OVERVIEW.FMT|SUBSCRIPTIONS|EXTENSIONS]",
    "LISTGROUP [newsgroup]",
    "MODE READER",
    "XOVER [range]",
    "NEWGROUPS [YY]yymmdd hhmmss [GMT|UTC]",
    "NEXT",
    "LAST",
    "HEAD [msg#|<msgid>]",
    "BODY [msg#|<msgid>]",
    "ARTICLE [msg#|<msgid>]",
    "STAT [msg#|<msgid>]",
    "AUTHINFO [user|pass] <value>",
    "AUTHINFO simple",
    "POST",
    "DATE",
    "QUIT",
];
