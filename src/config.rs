//! News server configuration

use crate::error::{NewsError, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Which operation classes require a successful AUTHINFO login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProtect {
    /// Nothing is protected
    #[default]
    None,
    /// Reading commands need a login
    Read,
    /// Only POST needs a login
    Post,
    /// Reading and posting need a login
    All,
}

/// AUTHINFO credentials and policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Accepted username; authentication is off unless both user and pass are set
    pub user: Option<String>,
    /// Accepted password
    pub pass: Option<String>,
    /// Operation classes that require a login
    pub protect: AuthProtect,
    /// Seconds to stall a client after a failed login
    pub sleep_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            user: None,
            pass: None,
            protect: AuthProtect::None,
            sleep_secs: 5,
        }
    }
}

impl AuthConfig {
    /// Authentication is enabled when both credentials are configured
    pub fn is_enabled(&self) -> bool {
        self.user.is_some() && self.pass.is_some()
    }
}

/// News server configuration
///
/// Loaded once at start-up and shared read-only (behind an `Arc`) with the
/// listener, every session and the posting pipeline.
///
/// # Example
///
/// ```
/// use newsd::ServerConfig;
///
/// let config = ServerConfig::for_spool("/var/spool/news", "news.example.com");
/// assert_eq!(config.server_name, "news.example.com");
/// assert!(!config.msg_mod_dirs);
/// ```
#[must_use]
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the listener binds to
    pub listen: SocketAddr,

    /// Root of the article spool
    pub spool_dir: PathBuf,

    /// Host name used in Xref, Path and generated Message-IDs
    pub server_name: String,

    /// Idle seconds before a session is dropped (0 disables the timer)
    pub timeout_secs: u64,

    /// Maximum concurrent sessions (0 = unlimited)
    pub max_clients: usize,

    /// Store articles under `<group>/<(n/1000)*1000>/<n>` instead of `<group>/<n>`
    pub msg_mod_dirs: bool,

    /// Do not descend into group directories while listing groups
    pub no_recurse_msg_dir: bool,

    /// Shell command fed every posting on stdin; non-zero exit rejects it
    pub spam_filter: Option<String>,

    /// Shell command used to deliver cc-post mail (reads the message on stdin)
    pub sendmail: String,

    /// Default log filter when RUST_LOG is unset
    pub log_level: String,

    /// Optional log file in addition to stderr
    pub error_log: Option<PathBuf>,

    /// AUTHINFO settings
    pub auth: AuthConfig,
}

fn default_server_name() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 119)),
            spool_dir: PathBuf::from("/var/spool/news"),
            server_name: default_server_name(),
            timeout_secs: 12 * 3600,
            max_clients: 0,
            msg_mod_dirs: false,
            no_recurse_msg_dir: true,
            spam_filter: None,
            sendmail: "/usr/sbin/sendmail -t".to_string(),
            log_level: "info".to_string(),
            error_log: None,
            auth: AuthConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults with an explicit spool root and server name
    pub fn for_spool(spool_dir: impl Into<PathBuf>, server_name: impl Into<String>) -> Self {
        Self {
            spool_dir: spool_dir.into(),
            server_name: server_name.into(),
            ..Self::default()
        }
    }

    /// Parse a TOML configuration document
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: ServerConfig =
            toml::from_str(text).map_err(|e| NewsError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate the configuration file at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| NewsError::io(path, e))?;
        Self::from_toml(&text)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.server_name.trim().is_empty() {
            return Err(NewsError::Config("server_name must not be empty".into()));
        }
        if self.server_name.chars().any(char::is_whitespace) {
            return Err(NewsError::Config(format!(
                "server_name '{}' must not contain whitespace",
                self.server_name
            )));
        }
        if self.spool_dir.as_os_str().is_empty() {
            return Err(NewsError::Config("spool_dir must not be empty".into()));
        }
        if self.sendmail.trim().is_empty() {
            return Err(NewsError::Config("sendmail must not be empty".into()));
        }
        if self.auth.user.is_some() != self.auth.pass.is_some() {
            return Err(NewsError::Config(
                "auth.user and auth.pass must be set together".into(),
            ));
        }
        Ok(())
    }

    /// Idle timeout, `None` when disabled
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}
