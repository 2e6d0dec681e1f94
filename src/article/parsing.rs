//! Article parsing functions
//!
//! Header lines are kept as a plain list so the posting pipeline can strip,
//! append and reorder fields without losing continuation lines or the
//! client's original ordering.

/// Maximum unfolded length of a single header value
pub const FIELD_MAX: usize = 1024;

/// A message split into header lines and body lines
///
/// Line terminators are removed. Header lines are text; body lines are
/// kept as bytes so 8-bit bodies are stored verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMessage {
    /// Header lines, including folded continuation lines
    pub head: Vec<String>,
    /// Body lines
    pub body: Vec<Vec<u8>>,
}

impl RawMessage {
    /// Split raw message text at the first blank line
    ///
    /// Both LF and CRLF line endings are accepted. A message without a blank
    /// line is all header.
    pub fn parse(raw: &[u8]) -> Self {
        let mut message = RawMessage::default();
        let mut in_head = true;

        let mut lines: Vec<&[u8]> = raw.split(|&b| b == b'\n').collect();
        // text ending in "\n" leaves an empty tail that is not a line
        if lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }

        for line in lines {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if in_head {
                if line.is_empty() {
                    in_head = false;
                } else {
                    message.head.push(String::from_utf8_lossy(line).into_owned());
                }
            } else {
                message.body.push(line.to_vec());
            }
        }
        message
    }

    /// Value of the first header called `name`, unfolded
    pub fn header(&self, name: &str) -> Option<String> {
        find_header(&self.head, name)
    }

    /// Serialize as stored on disk: header, blank line, body, LF endings
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for line in &self.head {
            out.extend_from_slice(line.as_bytes());
            out.push(b'\n');
        }
        out.push(b'\n');
        for line in &self.body {
            out.extend_from_slice(line);
            out.push(b'\n');
        }
        out
    }
}

/// True for a folded continuation line (starts with space or tab)
pub fn is_continuation(line: &str) -> bool {
    line.starts_with([' ', '\t'])
}

/// Split `Name: value` into name and value (leading blanks removed)
///
/// Returns `None` for lines without a colon.
pub fn split_header(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once(':')?;
    Some((name, value.trim_start_matches([' ', '\t'])))
}

/// Case-insensitive header name check
pub fn is_header(line: &str, name: &str) -> bool {
    split_header(line).is_some_and(|(n, _)| n.eq_ignore_ascii_case(name))
}

/// Index of the first header line called `name`
pub fn header_index(head: &[String], name: &str) -> Option<usize> {
    head.iter()
        .position(|line| !is_continuation(line) && is_header(line, name))
}

/// Unfolded value of the first header called `name`
pub fn find_header(head: &[String], name: &str) -> Option<String> {
    let index = header_index(head, name)?;
    let (_, value) = split_header(&head[index])?;
    let mut value = value.to_string();
    for line in head[index + 1..].iter().take_while(|l| is_continuation(l)) {
        append_folded(&mut value, line);
    }
    Some(value)
}

/// Append a continuation line to an unfolded value
///
/// The leading whitespace character is dropped and the result is capped at
/// [`FIELD_MAX`] - 1 bytes.
pub fn append_folded(value: &mut String, continuation: &str) {
    value.push_str(&continuation[1..]);
    if value.len() >= FIELD_MAX {
        let mut cut = FIELD_MAX - 1;
        while !value.is_char_boundary(cut) {
            cut -= 1;
        }
        value.truncate(cut);
    }
}

/// Group header lines into fields: a field line plus its continuations
pub fn header_fields(head: Vec<String>) -> Vec<Vec<String>> {
    let mut fields: Vec<Vec<String>> = Vec::new();
    for line in head {
        match fields.last_mut() {
            Some(field) if is_continuation(&line) => field.push(line),
            _ => fields.push(vec![line]),
        }
    }
    fields
}

/// Remove every field called `name`, continuation lines included
pub fn remove_header(head: &mut Vec<String>, name: &str) {
    let fields = header_fields(std::mem::take(head));
    *head = fields
        .into_iter()
        .filter(|field| !is_header(&field[0], name))
        .flatten()
        .collect();
}
