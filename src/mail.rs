//! cc-posting: mailing a fresh article to a group's cc addresses
//!
//! The message is handed to the configured mail-sender command (run through
//! `sh -c`, reading the message on stdin). Delivery problems are logged and
//! never reach the poster; the article is already committed by then.

use std::io::Write;
use std::process::{Command, Stdio};

use tracing::{debug, error};

use crate::article::is_continuation;
use crate::error::{NewsError, Result};
use crate::spool::GroupConfig;

/// Header fields carried over from the article into the mail
const PRESERVED_FIELDS: &[&str] = &[
    "From: ",
    "Subject: ",
    "References: ",
    "Xref: ",
    "Path: ",
    "Content-Transfer-Encoding: ",
    "Content-Type: ",
    "MIME-Version: ",
    "Message-ID: ",
];

fn is_preserved(line: &str) -> bool {
    PRESERVED_FIELDS.iter().any(|field| {
        line.get(..field.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(field))
    })
}

/// Build the cc mail for an article posted to group `name`
///
/// `banner` puts a `[posted to <group>]` line in front of the body, as the
/// mail gateway does.
pub fn cc_message(
    name: &str,
    config: &GroupConfig,
    head: &[String],
    body: &[Vec<u8>],
    banner: bool,
) -> Vec<u8> {
    let mut out = Vec::new();
    let mut line = |text: &str| {
        out.extend_from_slice(text.as_bytes());
        out.push(b'\n');
    };

    line(&format!("To: {}", config.void_email));
    for address in &config.cc_post {
        line(&format!("Bcc: {address}"));
    }

    let mut keep = false;
    for field in head {
        if is_continuation(field) {
            if keep {
                line(field);
            }
            continue;
        }
        keep = is_preserved(field);
        if keep {
            line(field);
        }
    }

    if let Some(reply_to) = &config.reply_to {
        line(&format!("Reply-To: {reply_to}"));
    }
    line(&format!("Errors-To: {}", config.creator));
    line("");
    if banner {
        line(&format!("[posted to {name}]"));
        line("");
    }

    for body_line in body {
        out.extend_from_slice(body_line);
        out.push(b'\n');
    }
    out
}

/// Pipe `message` into `sh -c <sendmail>` and wait for it
pub fn send_mail(sendmail: &str, message: &[u8]) -> Result<()> {
    debug!("delivering {} bytes via '{}'", message.len(), sendmail);
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(sendmail)
        .stdin(Stdio::piped())
        .spawn()
        .map_err(|e| NewsError::Other(format!("can't execute '{sendmail}': {e}")))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(message)
            .map_err(|e| NewsError::Other(format!("writing to '{sendmail}' failed: {e}")))?;
    }

    let status = child
        .wait()
        .map_err(|e| NewsError::Other(format!("waiting for '{sendmail}' failed: {e}")))?;
    if status.success() {
        Ok(())
    } else {
        Err(NewsError::Other(format!("'{sendmail}' exited with {status}")))
    }
}

/// Mail an article to the group's cc addresses, logging any failure
pub fn cc_post(
    sendmail: &str,
    name: &str,
    config: &GroupConfig,
    head: &[String],
    body: &[Vec<u8>],
    banner: bool,
) {
    if !config.is_cc_post() {
        return;
    }
    let message = cc_message(name, config, head, body, banner);
    if let Err(e) = send_mail(sendmail, &message) {
        error!("ccpost for {} failed: {}", name, e);
    }
}
