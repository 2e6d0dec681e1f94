//! Stored article metadata

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::codec::{LINE_LEN, read_capped_line};
use crate::error::{NewsError, Result};

use super::parsing::{append_folded, split_header};

/// Overview fields in XOVER order, as reported by `LIST OVERVIEW.FMT`
///
/// The same list drives header reordering when an article is posted.
pub const OVERVIEW_FMT: &[&str] = &[
    "Subject:",
    "From:",
    "Date:",
    "Message-ID:",
    "References:",
    "Bytes:",
    "Lines:",
    "Xref:full",
    "Reply-To:",
];

/// An article loaded from the spool
///
/// Only the header fields the server answers from are kept; the rest of the
/// file is streamed straight from disk when a client asks for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredArticle {
    /// Article number within its group
    pub number: u64,
    /// File the article was read from
    pub path: PathBuf,
    /// Subject header
    pub subject: String,
    /// From header
    pub from: String,
    /// Date header
    pub date: String,
    /// Message-ID header
    pub message_id: String,
    /// References header
    pub references: String,
    /// Xref header
    pub xref: String,
    /// Lines header (0 when absent or unparseable)
    pub lines: u32,
}

impl StoredArticle {
    /// Read and unfold the header of the article file at `path`
    ///
    /// Fails when the file cannot be opened or lacks a Message-ID or From
    /// header; such articles are never shown to clients.
    pub fn load(path: &Path, number: u64) -> Result<Self> {
        let file = File::open(path).map_err(|e| NewsError::NoSuchArticle {
            number,
            reason: format!("'{}': {e}", path.display()),
        })?;

        let mut article = StoredArticle {
            number,
            path: path.to_path_buf(),
            ..Default::default()
        };

        let mut reader = BufReader::new(file);
        let mut raw = Vec::with_capacity(LINE_LEN);
        let mut current: Option<(String, String)> = None;
        while read_capped_line(&mut reader, &mut raw, LINE_LEN).map_err(|e| NewsError::io(path, e))? {
            let line = String::from_utf8_lossy(&raw);
            let line = line.split('\r').next().unwrap_or_default();

            if line.starts_with([' ', '\t']) {
                if let Some((_, value)) = current.as_mut() {
                    append_folded(value, line);
                }
                continue;
            }
            if let Some((name, value)) = current.take() {
                article.set_field(&name, value);
            }
            if line.is_empty() {
                break;
            }
            current = split_header(line).map(|(n, v)| (n.to_string(), v.to_string()));
        }
        if let Some((name, value)) = current {
            article.set_field(&name, value);
        }

        if article.message_id.is_empty() {
            return Err(NewsError::InvalidArticle(format!(
                "article {number}: No 'Message-ID' field"
            )));
        }
        if article.from.is_empty() {
            return Err(NewsError::InvalidArticle(format!(
                "article {number}: No 'From' field"
            )));
        }
        Ok(article)
    }

    fn set_field(&mut self, name: &str, value: String) {
        match name.to_ascii_lowercase().as_str() {
            "subject" => self.subject = value,
            "from" => self.from = value,
            "date" => self.date = value,
            "message-id" => self.message_id = value,
            "references" => self.references = value,
            "xref" => self.xref = value,
            "lines" => self.lines = value.trim().parse().unwrap_or(0),
            _ => {}
        }
    }

    /// One XOVER record: the article number followed by a tab-separated
    /// column per entry of `fields`
    ///
    /// Tabs inside values become spaces. `Bytes:` is not tracked and is sent
    /// empty, as is any field the server does not keep.
    pub fn overview(&self, fields: &[&str]) -> String {
        let mut record = self.number.to_string();
        for field in fields {
            record.push('\t');
            match field.to_ascii_lowercase().as_str() {
                "subject:" => record.push_str(&sanitize(&self.subject)),
                "from:" => record.push_str(&sanitize(&self.from)),
                "date:" => record.push_str(&sanitize(&self.date)),
                "message-id:" => record.push_str(&sanitize(&self.message_id)),
                "references:" => record.push_str(&sanitize(&self.references)),
                "lines:" if self.lines > 0 => record.push_str(&self.lines.to_string()),
                "xref:full" if !self.xref.is_empty() => {
                    record.push_str("Xref: ");
                    record.push_str(&sanitize(&self.xref));
                }
                _ => {}
            }
        }
        record
    }
}

fn sanitize(value: &str) -> String {
    value.replace('\t', " ")
}

/// Read just far enough into an article to find its Message-ID
pub fn read_message_id(path: &Path) -> Option<String> {
    let mut reader = BufReader::new(File::open(path).ok()?);
    let mut raw = Vec::with_capacity(LINE_LEN);
    while read_capped_line(&mut reader, &mut raw, LINE_LEN).ok()? {
        let line = String::from_utf8_lossy(&raw);
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            return None;
        }
        if let Some((name, value)) = split_header(line)
            && name.eq_ignore_ascii_case("Message-ID")
        {
            return Some(value.trim_end().to_string());
        }
    }
    None
}
