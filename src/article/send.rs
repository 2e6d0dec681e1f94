//! Rendering stored articles for ARTICLE, HEAD and BODY

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::codec::{LINE_LEN, read_capped_line, write_stuffed_line};
use crate::error::{NewsError, Result};

/// Which part of an article a retrieval command sends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticlePart {
    /// Header, separator line and body
    Whole,
    /// Header only
    Head,
    /// Body only
    Body,
}

impl ArticlePart {
    fn head(self) -> bool {
        matches!(self, ArticlePart::Whole | ArticlePart::Head)
    }

    fn body(self) -> bool {
        matches!(self, ArticlePart::Whole | ArticlePart::Body)
    }
}

/// Wire form of part of an article file, without the closing `.` line
///
/// The file is read line by line. Every line gets a CRLF ending, is
/// truncated to the transfer line limit and dot-stuffed.
pub fn render_article(path: &Path, number: u64, part: ArticlePart) -> Result<Vec<u8>> {
    let file = File::open(path).map_err(|e| NewsError::NoSuchArticle {
        number,
        reason: e.to_string(),
    })?;
    let size = file.metadata().map(|m| m.len() as usize).unwrap_or(0);
    let mut out = Vec::with_capacity(size + size / 16);
    render_lines(BufReader::new(file), part, &mut out).map_err(|e| NewsError::io(path, e))?;
    Ok(out)
}

/// Same as [`render_article`] for an article already in memory
pub fn render_bytes(raw: &[u8], part: ArticlePart) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len() + raw.len() / 16);
    // reading from a slice cannot fail
    let _ = render_lines(raw, part, &mut out);
    out
}

fn render_lines(mut reader: impl BufRead, part: ArticlePart, out: &mut Vec<u8>) -> io::Result<()> {
    let mut line = Vec::with_capacity(LINE_LEN);
    let mut in_head = true;
    while read_capped_line(&mut reader, &mut line, LINE_LEN)? {
        if in_head {
            let trimmed = line.strip_suffix(b"\r").unwrap_or(&line[..]);
            if trimmed.is_empty() {
                in_head = false;
                if !part.body() {
                    break;
                }
                if part.head() {
                    out.extend_from_slice(b"\r\n");
                }
                continue;
            }
            if part.head() {
                write_stuffed_line(out, &line);
            }
        } else {
            write_stuffed_line(out, &line);
        }
    }
    Ok(())
}
