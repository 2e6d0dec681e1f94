//! Low-level I/O for a client session
//!
//! - Command line framing with the idle timer armed before each read
//! - POST body collection
//! - Response writing

use std::future::Future;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::trace;

use super::Session;
use crate::codec::{PostBody, PostDecoder};
use crate::error::{NewsError, Result};
use crate::response::Response;

/// Run `fut`, failing with [`NewsError::Timeout`] once `limit` passes
async fn idle_timeout<T>(limit: Option<Duration>, fut: impl Future<Output = Result<T>>) -> Result<T> {
    match limit {
        Some(limit) => timeout(limit, fut).await.map_err(|_| NewsError::Timeout)?,
        None => fut.await,
    }
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Read the next command line; `None` once the client has hung up
    pub(super) async fn read_line(&mut self) -> Result<Option<Vec<u8>>> {
        let limit = self.config.idle_timeout();
        idle_timeout(limit, self.read_line_inner()).await
    }

    async fn read_line_inner(&mut self) -> Result<Option<Vec<u8>>> {
        loop {
            let input = self.stream.fill_buf().await?;
            if input.is_empty() {
                return Ok(None);
            }
            let (used, line) = self.decoder.feed(input);
            self.stream.consume(used);
            if line.is_some() {
                return Ok(line);
            }
        }
    }

    /// Read a POST body up to its `.` line, enforcing `limit` lines
    pub(super) async fn read_post_body(&mut self, limit: u32) -> Result<PostBody> {
        let idle = self.config.idle_timeout();
        idle_timeout(idle, self.read_post_body_inner(limit)).await
    }

    async fn read_post_body_inner(&mut self, limit: u32) -> Result<PostBody> {
        let mut decoder = PostDecoder::new(limit);
        while !decoder.is_done() {
            let input = self.stream.fill_buf().await?;
            if input.is_empty() {
                return Err(NewsError::ConnectionClosed);
            }
            let skipped = self.decoder.discard_lf(input);
            let used = skipped + decoder.feed(&input[skipped..]);
            self.stream.consume(used);
        }
        Ok(decoder.finish())
    }

    /// Send a response
    pub(super) async fn send(&mut self, response: Response) -> Result<()> {
        trace!("SEND: {}", response);
        self.write(&response.encode()).await
    }

    /// Send a status line followed by pre-encoded multi-line data and the
    /// closing `.` line
    pub(super) async fn send_data(&mut self, status: Response, data: &[u8]) -> Result<()> {
        trace!("SEND: {} ({} bytes)", status, data.len());
        let mut out = status.encode();
        out.reserve(data.len() + 3);
        out.extend_from_slice(data);
        out.extend_from_slice(b".\r\n");
        self.write(&out).await
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let writer = self.stream.get_mut();
        writer.write_all(bytes).await?;
        writer.flush().await?;
        Ok(())
    }
}
