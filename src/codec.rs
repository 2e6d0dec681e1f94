//! Wire framing for the NNTP server
//!
//! Three small state machines sit between the socket and the session:
//! - [`LineDecoder`] frames command lines (bare LF or CRLF, hard length cap)
//! - [`PostDecoder`] collects a POST body until `<CRLF>.<CRLF>`, undoing
//!   dot-stuffing and enforcing the posting line limit
//! - [`write_stuffed_line`] does the reverse on the way out
//!
//! [`read_capped_line`] reads spool files the same way: one line at a time,
//! never buffering more than a line's worth.
//!
//! The decoders are fed whole buffers (`feed` returns how many bytes it
//! consumed) so they can sit directly on top of `AsyncBufRead::fill_buf`.

use std::io::{self, BufRead};

/// Size of the line buffers used throughout the server
pub const LINE_LEN: usize = 4096;

/// Longest command line accepted before it is cut short
pub const MAX_COMMAND_LEN: usize = LINE_LEN - 2;

/// Longest article line sent to a client (excluding CRLF)
pub const MAX_TRANSFER_LEN: usize = LINE_LEN - 4;

/// Width after which a posted line counts as another line for limit checks
pub const LINE_WIDTH: u32 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineState {
    Normal,
    /// Previous line ended on `\r`; a following `\n` belongs to it
    SawCr,
}

/// Command line framer
///
/// A line ends at `\n`, at `\r` (a directly following `\n` is swallowed), or
/// when it reaches the maximum length. A truncated line is returned as-is
/// and the rest of the oversized input becomes the next line.
#[derive(Debug)]
pub struct LineDecoder {
    state: LineState,
    buf: Vec<u8>,
    max_len: usize,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new(MAX_COMMAND_LEN)
    }
}

impl LineDecoder {
    /// Framer that cuts lines at `max_len` bytes
    pub fn new(max_len: usize) -> Self {
        Self {
            state: LineState::Normal,
            buf: Vec::with_capacity(128),
            max_len: max_len.max(1),
        }
    }

    /// Consume bytes from `input`, returning the count consumed and a
    /// completed line (without its terminator) if one was found
    pub fn feed(&mut self, input: &[u8]) -> (usize, Option<Vec<u8>>) {
        for (i, &byte) in input.iter().enumerate() {
            if self.state == LineState::SawCr {
                self.state = LineState::Normal;
                if byte == b'\n' {
                    continue;
                }
            }
            match byte {
                b'\n' => return (i + 1, Some(std::mem::take(&mut self.buf))),
                b'\r' => {
                    let line = std::mem::take(&mut self.buf);
                    if input.get(i + 1) == Some(&b'\n') {
                        return (i + 2, Some(line));
                    }
                    self.state = LineState::SawCr;
                    return (i + 1, Some(line));
                }
                _ => {
                    self.buf.push(byte);
                    if self.buf.len() >= self.max_len {
                        return (i + 1, Some(std::mem::take(&mut self.buf)));
                    }
                }
            }
        }
        (input.len(), None)
    }

    /// Partial line buffered so far
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }

    /// True when the last line ended on a `\r` whose `\n` has not been read
    pub fn awaits_lf(&self) -> bool {
        self.state == LineState::SawCr
    }

    /// Drop the `\n` completing a CRLF split across reads, before the input
    /// is handed to another decoder. Returns the bytes consumed (0 or 1).
    pub fn discard_lf(&mut self, input: &[u8]) -> usize {
        if self.state != LineState::SawCr || input.is_empty() {
            return 0;
        }
        self.state = LineState::Normal;
        usize::from(input[0] == b'\n')
    }
}

/// Counts "lines" the way the posting limit sees them: every `\n` ends a
/// line and every run of more than [`LINE_WIDTH`] bytes counts as one more.
///
/// A line of `n` bytes therefore counts as `1 + n / 81` lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineCounter {
    chars: u32,
    lines: u32,
}

impl LineCounter {
    /// Account for one stored byte
    pub fn tick(&mut self, byte: u8) {
        self.chars += 1;
        if self.chars > LINE_WIDTH || byte == b'\n' {
            self.chars = 0;
            self.lines += 1;
        }
    }

    /// Lines counted so far
    pub fn lines(&self) -> u32 {
        self.lines
    }

    /// Count a whole message
    pub fn count(text: &[u8]) -> u32 {
        let mut counter = Self::default();
        text.iter().for_each(|&b| counter.tick(b));
        counter.lines
    }

    /// True once `lines` exceeds `limit` (0 means unlimited)
    pub fn exceeds(&self, limit: u32) -> bool {
        limit > 0 && self.lines > limit
    }
}

/// POST body collection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostState {
    /// Inside a line
    Normal,
    /// Just saw a line terminator
    SawLf,
    /// Line terminator followed by a single `.`
    SawLfDot,
}

/// Outcome of a completed POST transfer
#[derive(Debug, PartialEq, Eq)]
pub enum PostBody {
    /// The unstuffed message, LF line endings, `\r` removed
    Complete(Vec<u8>),
    /// The message went over the line limit; its bytes were discarded
    TooLong {
        /// Limit that was exceeded
        limit: u32,
    },
}

/// POST body decoder
///
/// Starts in [`PostState::SawLf`] since the 340 response line already ended
/// a line, so a client sending only `.` posts an empty message. Once the
/// line limit is exceeded the decoder keeps consuming until the terminator
/// so the session stays in sync with the client.
#[derive(Debug)]
pub struct PostDecoder {
    state: PostState,
    message: Vec<u8>,
    counter: LineCounter,
    limit: u32,
    too_long: bool,
    done: bool,
}

impl PostDecoder {
    /// Decoder enforcing `limit` lines (0 = unlimited)
    pub fn new(limit: u32) -> Self {
        Self {
            state: PostState::SawLf,
            message: Vec::with_capacity(4096),
            counter: LineCounter::default(),
            limit,
            too_long: false,
            done: false,
        }
    }

    /// Current state of the terminator/unstuffing machine
    pub fn state(&self) -> PostState {
        self.state
    }

    /// True once the `.` terminator line has been consumed
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Consume bytes from `input`; returns how many were used. Bytes after the
    /// terminator are left for the command framer.
    pub fn feed(&mut self, input: &[u8]) -> usize {
        for (i, &byte) in input.iter().enumerate() {
            if self.done {
                return i;
            }
            if byte == b'\r' {
                continue;
            }
            match (self.state, byte) {
                (PostState::SawLfDot, b'\n') => {
                    self.done = true;
                    return i + 1;
                }
                (_, b'\n') => self.state = PostState::SawLf,
                (PostState::SawLf, b'.') => {
                    self.state = PostState::SawLfDot;
                    continue;
                }
                _ => self.state = PostState::Normal,
            }

            self.counter.tick(byte);
            if self.counter.exceeds(self.limit) {
                self.too_long = true;
                continue;
            }
            if !self.too_long {
                self.message.push(byte);
            }
        }
        input.len()
    }

    /// Finish the transfer
    pub fn finish(self) -> PostBody {
        if self.too_long {
            PostBody::TooLong { limit: self.limit }
        } else {
            PostBody::Complete(self.message)
        }
    }
}

/// Append one line to `out` in wire form: cut at the first `\r` or `\n`,
/// truncated to [`MAX_TRANSFER_LEN`], dot-stuffed and CRLF terminated
pub fn write_stuffed_line(out: &mut Vec<u8>, line: &[u8]) {
    let end = line
        .iter()
        .position(|&b| b == b'\r' || b == b'\n')
        .unwrap_or(line.len())
        .min(MAX_TRANSFER_LEN);
    let line = &line[..end];
    if line.first() == Some(&b'.') {
        out.push(b'.');
    }
    out.extend_from_slice(line);
    out.extend_from_slice(b"\r\n");
}

/// Read one LF-terminated line into `buf`, without the LF
///
/// At most `cap` bytes are kept; the rest of a longer line is consumed and
/// dropped. Returns `false` once the reader is exhausted.
pub fn read_capped_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>, cap: usize) -> io::Result<bool> {
    buf.clear();
    let mut read_any = false;
    loop {
        let available = match reader.fill_buf() {
            Ok(available) => available,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if available.is_empty() {
            return Ok(read_any);
        }
        read_any = true;

        let newline = available.iter().position(|&b| b == b'\n');
        let chunk = &available[..newline.unwrap_or(available.len())];
        let room = cap.saturating_sub(buf.len());
        buf.extend_from_slice(&chunk[..chunk.len().min(room)]);

        let used = newline.map_or(available.len(), |i| i + 1);
        reader.consume(used);
        if newline.is_some() {
            return Ok(true);
        }
    }
}
