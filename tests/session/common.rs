//! Shared harness for session tests

use std::fs;
use std::sync::Arc;

use newsd::{GroupConfig, GroupInfo, Posted, RawMessage, ServerConfig, Session, Spool};
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, DuplexStream, ReadHalf, WriteHalf};

pub const SERVER_NAME: &str = "news.test";

/// A spool in a temporary directory plus the config sessions run with
pub struct TestServer {
    _dir: TempDir,
    pub config: ServerConfig,
    pub spool: Arc<Spool>,
}

impl TestServer {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(tweak: impl FnOnce(&mut ServerConfig)) -> Self {
        let dir = TempDir::new().unwrap();
        let mut config = ServerConfig::for_spool(dir.path(), SERVER_NAME);
        tweak(&mut config);
        let spool = Arc::new(Spool::from_config(&config));
        Self {
            _dir: dir,
            config,
            spool,
        }
    }

    /// Create an open group without a line limit
    pub fn group(&self, name: &str) {
        self.group_with(
            name,
            GroupConfig {
                post_limit: 0,
                ..GroupConfig::default()
            },
        );
    }

    pub fn group_with(&self, name: &str, config: GroupConfig) {
        self.spool.create_group(name, &config).unwrap();
    }

    /// Overwrite a group's counters
    pub fn set_info(&self, name: &str, info: GroupInfo) {
        let dir = self.spool.group_dir(name).unwrap();
        fs::write(dir.join(".info"), info.render()).unwrap();
    }

    /// Post straight into the spool, bypassing any session
    pub fn post(&self, group: &str, subject: &str) -> Posted {
        let text = format!(
            "From: poster@example.com\nNewsgroups: {group}\nSubject: {subject}\n\nbody of {subject}\n"
        );
        self.spool
            .post(RawMessage::parse(text.as_bytes()), "localhost", false)
            .unwrap()
    }

    /// Start a session and consume its greeting
    pub async fn connect(&self) -> Client {
        let (client, server) = tokio::io::duplex(64 * 1024);
        let session = Session::new(
            server,
            "127.0.0.1",
            Arc::clone(&self.spool),
            Arc::new(self.config.clone()),
        );
        tokio::spawn(session.run());

        let (reader, writer) = tokio::io::split(client);
        let mut client = Client {
            reader: BufReader::new(reader),
            writer,
        };
        let greeting = client.line().await;
        assert_eq!(greeting, "200 newsd news server ready - posting ok");
        client
    }
}

/// Client end of a session
pub struct Client {
    reader: BufReader<ReadHalf<DuplexStream>>,
    writer: WriteHalf<DuplexStream>,
}

impl Client {
    /// Next response line without its CRLF
    pub async fn line(&mut self) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).await.unwrap();
        assert!(line.ends_with("\r\n"), "unterminated line {line:?}");
        line.truncate(line.len() - 2);
        line
    }

    /// Everything the server sends until it closes the connection
    pub async fn remaining(&mut self) -> Vec<u8> {
        let mut rest = Vec::new();
        self.reader.read_to_end(&mut rest).await.unwrap();
        rest
    }

    pub async fn send(&mut self, text: &str) {
        self.writer.write_all(text.as_bytes()).await.unwrap();
        self.writer.flush().await.unwrap();
    }

    /// Send a command and return the status line
    pub async fn command(&mut self, command: &str) -> String {
        self.send(&format!("{command}\r\n")).await;
        self.line().await
    }

    /// Read multi-line data up to the `.` line, undoing dot-stuffing
    pub async fn data(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        loop {
            let line = self.line().await;
            if line == "." {
                return lines;
            }
            match line.strip_prefix('.') {
                Some(rest) => lines.push(rest.to_string()),
                None => lines.push(line),
            }
        }
    }

    /// Run a full POST exchange; `article` uses LF line endings
    pub async fn post(&mut self, article: &str) -> String {
        let status = self.command("POST").await;
        assert!(status.starts_with("340 "), "unexpected {status}");
        let mut wire = String::new();
        for line in article.lines() {
            if line.starts_with('.') {
                wire.push('.');
            }
            wire.push_str(line);
            wire.push_str("\r\n");
        }
        wire.push_str(".\r\n");
        self.send(&wire).await;
        self.line().await
    }
}

/// Status code of a response line
pub fn code(status: &str) -> u16 {
    status[..3].parse().unwrap()
}
