//! Mail-to-news gateway
//!
//! Feeds one RFC 822 mail (usually from a mail alias pipe) into a group.
//! The gateway is a trusted caller: it posts with `force` so groups closed
//! to NNTP posting can still be fed by mail.

use std::io::Read;

use tracing::{debug, info, warn};

use crate::article::{RawMessage, is_header};
use crate::codec::LineCounter;
use crate::config::ServerConfig;
use crate::error::{NewsError, Result};
use crate::mail;
use crate::spool::{DEADLETTERS_FILE, Posted, Spool, prepend_path};

/// Header added to every gatewayed article
pub const GATEWAY_HEADER: &str = concat!("X-Mail-To-News-Gateway: via newsd ", env!("CARGO_PKG_VERSION"));

/// Read a mail from `input` and post it to `group`
pub fn mail_gateway(config: &ServerConfig, group: &str, mut input: impl Read) -> Result<Posted> {
    let spool = Spool::from_config(config);
    let target = spool.open_group(group)?;

    let mut raw = Vec::new();
    input
        .read_to_end(&mut raw)
        .map_err(|e| NewsError::io("<stdin>", e))?;
    raw.retain(|&b| b != b'\r');

    let limit = target.config.post_limit;
    if limit > 0 && LineCounter::count(&raw) > limit {
        warn!("mail for {} longer than {} lines, not posted", group, limit);
        return Err(NewsError::LineLimitExceeded(limit));
    }

    let mut text = format!("Newsgroups: {group}\n{GATEWAY_HEADER}\n").into_bytes();
    text.extend_from_slice(&raw);
    let mut message = RawMessage::parse(&text);

    for index in 0..message.head.len() {
        let line = message.head[index].clone();
        if let Some(rest) = line.strip_prefix("From ") {
            message.head[index] = format!("X-Original-From: {rest}");
        } else if is_header(&line, "X-Newsd-Loop") || is_header(&line, "X-Loop") {
            let reason = format!(
                "NOT POSTED: '{}' mail loop detected: message dropped to {}",
                line,
                spool.root().join(DEADLETTERS_FILE).display()
            );
            spool.append_deadletter(&message.to_bytes())?;
            warn!("mailgateway {}: {}", group, reason);
            return Err(NewsError::Other(reason));
        }
    }

    prepend_path(&mut message.head, spool.server_name());
    for line in &message.head {
        debug!("gateway head: {}", line);
    }

    let posted = spool.post(message, "localhost", true)?;
    info!(
        "mailgateway posted {} to {} as {}",
        posted.message_id, group, posted.number
    );

    mail::cc_post(
        &config.sendmail,
        group,
        &posted.group.config,
        &posted.head,
        &posted.body,
        true,
    );
    Ok(posted)
}
