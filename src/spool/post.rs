//! Posting Pipeline
//!
//! A parsed message is numbered, stamped and committed to its group while
//! the group's exclusive lock is held. The article file is created with
//! `create_new`, so two writers can never claim the same number even if the
//! counters are stale; counters are saved only after the file is complete.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use chrono::Local;
use tracing::{debug, error, info, warn};

use crate::article::{OVERVIEW_FMT, RawMessage, find_header, header_fields, is_header, remove_header};
use crate::codec::LineCounter;
use crate::error::{NewsError, Result};
use crate::validation::validate_message_id;

use super::group::{Group, save_info_locked};
use super::lock::GroupLock;
use super::{Spool, modulus_dir_name};

/// A committed posting
#[derive(Debug, Clone)]
pub struct Posted {
    /// Target group, counters updated
    pub group: Group,
    /// Number the article was stored under
    pub number: u64,
    /// Message-ID as stored
    pub message_id: String,
    /// Final header lines as written to disk
    pub head: Vec<String>,
    /// Body lines as written to disk
    pub body: Vec<Vec<u8>>,
}

/// Current local time as an RFC 822 date with a 4-digit year and a numeric
/// zone offset, e.g. `Sun, 27 Mar 2005 20:39:37 -0800`
pub fn date_rfc822() -> String {
    Local::now().format("%a, %d %b %Y %H:%M:%S %z").to_string()
}

/// Put `server_name` in front of the Path header, adding one if missing
pub fn prepend_path(head: &mut Vec<String>, server_name: &str) {
    let mut found = false;
    for line in head.iter_mut().filter(|l| is_header(l, "Path")) {
        let (name, value) = line.split_at(5);
        let value = value.trim_start_matches([' ', '\t']);
        *line = if value.is_empty() {
            format!("{name} {server_name}")
        } else {
            format!("{name} {server_name}!{value}")
        };
        found = true;
    }
    if !found {
        head.push(format!("Path: {server_name}"));
    }
}

/// Move header fields named in `order` to the top, in that order
///
/// Only the first field of each name moves. Continuation lines travel with
/// their field; everything else keeps its original relative order.
pub fn reorder_header(head: Vec<String>, order: &[&str]) -> Vec<String> {
    let mut fields: Vec<Option<Vec<String>>> = header_fields(head).into_iter().map(Some).collect();
    let mut sorted = Vec::with_capacity(fields.len());

    for entry in order {
        let name = entry.split(':').next().unwrap_or(entry);
        let hit = fields
            .iter()
            .position(|f| f.as_ref().is_some_and(|f| is_header(&f[0], name)));
        if let Some(field) = hit.and_then(|i| fields[i].take()) {
            sorted.push(field);
        }
    }
    sorted.extend(fields.into_iter().flatten());
    sorted.into_iter().flatten().collect()
}

/// First group named in the Newsgroups header
fn target_group(head: &[String]) -> Option<String> {
    let value = find_header(head, "Newsgroups")?;
    value
        .split([',', ' ', '\t'])
        .map(str::trim)
        .find(|g| !g.is_empty())
        .map(str::to_string)
}

impl Spool {
    /// Commit `message` to the group named in its Newsgroups header
    ///
    /// `remote` is recorded in NNTP-Posting-Host. `force` bypasses a
    /// group's `postok 0` setting for trusted callers such as the mail
    /// gateway. On failure after the article file was created the file is
    /// left behind unreferenced; counters are never touched.
    pub fn post(&self, message: RawMessage, remote: &str, force: bool) -> Result<Posted> {
        let RawMessage { mut head, body } = message;

        let name = target_group(&head).ok_or(NewsError::MissingNewsgroups)?;
        if let Some(id) = find_header(&head, "Message-ID") {
            validate_message_id(id.trim())?;
        }
        let dir = self.group_dir(&name)?;
        if !super::is_valid_group(&dir) {
            return Err(NewsError::NoSuchGroup(name));
        }

        let lock = GroupLock::exclusive(&dir)?;
        let mut group = self.open_group_locked(&name, &lock)?;

        if !group.config.post_ok && !force {
            warn!("posting disabled for group '{}'", name);
            return Err(NewsError::PostingDisabled(name));
        }

        let limit = group.config.post_limit;
        if limit > 0 {
            let lines = LineCounter::count(&RawMessage { head: head.clone(), body: body.clone() }.to_bytes());
            if lines > limit {
                info!("rejecting {} line posting to {} (limit {})", lines, name, limit);
                return Err(NewsError::LineLimitExceeded(limit));
            }
        }

        if let Some(filter) = self.spam_filter.as_deref() {
            run_spam_filter(filter, &head, &body)?;
        }

        let (number, path, file) = self.create_article_file(&group.dir, group.info.end + 1)?;

        remove_header(&mut head, "Date");
        remove_header(&mut head, "NNTP-Posting-Host");
        head.push(format!("Xref: {} {}:{}", self.server_name, name, number));
        head.push(format!("Date: {}", date_rfc822()));
        head.push(format!("NNTP-Posting-Host: {remote}"));
        let message_id = match find_header(&head, "Message-ID") {
            Some(id) => id.trim().to_string(),
            None => {
                let id = format!("<{}-{}@{}>", number, name, self.server_name);
                head.push(format!("Message-ID: {id}"));
                id
            }
        };
        if find_header(&head, "Lines").is_none() {
            head.push(format!("Lines: {}", body.len()));
        }
        let head = reorder_header(head, OVERVIEW_FMT);

        write_article(file, &head, &body).map_err(|e| {
            error!("writing {} failed: {}", path.display(), e);
            NewsError::io(&path, e)
        })?;

        group.info.record_post(number);
        save_info_locked(&group.dir, &group.info, &lock)?;
        drop(lock);

        info!("posted article {} to {} as {}", number, name, message_id);
        Ok(Posted {
            group,
            number,
            message_id,
            head,
            body,
        })
    }

    /// Claim the first free article number at or above `first`
    fn create_article_file(&self, dir: &Path, first: u64) -> Result<(u64, PathBuf, File)> {
        let mut number = first;
        loop {
            if self.msg_mod_dirs {
                ensure_modulus_dir(&dir.join(modulus_dir_name(number)))?;
            }
            let path = self.article_path(dir, number);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((number, path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    debug!("article {} already exists, trying the next number", path.display());
                    number += 1;
                }
                Err(e) => {
                    error!("cannot create {}: {}", path.display(), e);
                    return Err(NewsError::io(&path, e));
                }
            }
        }
    }
}

fn ensure_modulus_dir(path: &Path) -> Result<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => {
            error!("{} is not a directory (expected a modulus dir)", path.display());
            Err(NewsError::io(
                path,
                io::Error::other("not a directory (expected a modulus dir)"),
            ))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => match fs::create_dir(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => {
                error!("can't create modulus dir {}: {}", path.display(), e);
                Err(NewsError::io(path, e))
            }
        },
        Err(e) => Err(NewsError::io(path, e)),
    }
}

fn write_article(file: File, head: &[String], body: &[Vec<u8>]) -> io::Result<()> {
    let mut out = BufWriter::new(file);
    for line in head {
        out.write_all(line.as_bytes())?;
        out.write_all(b"\n")?;
    }
    out.write_all(b"\n")?;
    for line in body {
        out.write_all(line)?;
        out.write_all(b"\n")?;
    }
    let file = out.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()
}

/// Feed the message to `sh -c <filter>`; a non-zero exit rejects it
fn run_spam_filter(filter: &str, head: &[String], body: &[Vec<u8>]) -> Result<()> {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(filter)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| {
            error!("spam filter '{}' failed to execute: {}", filter, e);
            NewsError::Other("spam filter command failed to execute".into())
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        let message = RawMessage {
            head: head.to_vec(),
            body: body.to_vec(),
        };
        // a filter may exit without reading everything
        if let Err(e) = stdin.write_all(&message.to_bytes()) {
            debug!("spam filter closed its input early: {}", e);
        }
    }

    let status = child.wait().map_err(|e| {
        error!("waiting for spam filter '{}' failed: {}", filter, e);
        NewsError::Other("spam filter command failed to execute".into())
    })?;
    if status.success() {
        Ok(())
    } else {
        info!("spam filter rejected message ({})", status);
        Err(NewsError::SpamRejected)
    }
}
