//! AUTHINFO policy and per-session login state
//!
//! The server knows a single user/password pair. Which commands need a login
//! is decided by [`AuthProtect`]; without configured credentials nothing is
//! ever gated.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{AuthConfig, AuthProtect};

/// Class of operation a command performs, for the authorization gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOp {
    /// Reading articles, groups or listings
    Read,
    /// Posting
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LoginState {
    /// No login attempted (or the last one failed)
    Ready,
    /// AUTHINFO USER seen, waiting for PASS
    UserGiven(String),
    /// Successfully authenticated
    Authenticated,
}

/// Result of AUTHINFO PASS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// Credentials matched
    Accepted,
    /// Wrong user or password
    Rejected,
    /// PASS arrived before USER
    OutOfSequence,
}

/// Login state of one session
#[derive(Debug, Clone)]
pub struct AuthState {
    config: AuthConfig,
    state: LoginState,
}

impl AuthState {
    /// Fresh, unauthenticated state
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config,
            state: LoginState::Ready,
        }
    }

    /// Whether the server has credentials configured at all
    pub fn is_required(&self) -> bool {
        self.config.is_enabled()
    }

    /// Whether this session has logged in
    pub fn is_authenticated(&self) -> bool {
        self.state == LoginState::Authenticated
    }

    /// Whether `op` may run in the current state
    pub fn is_allowed(&self, op: AuthOp) -> bool {
        if !self.is_required() || self.is_authenticated() {
            return true;
        }
        match self.config.protect {
            AuthProtect::None => true,
            AuthProtect::Read => op != AuthOp::Read,
            AuthProtect::Post => op != AuthOp::Post,
            AuthProtect::All => false,
        }
    }

    /// AUTHINFO USER
    pub fn user(&mut self, name: &str) {
        debug!("AUTHINFO USER {}", name);
        self.state = LoginState::UserGiven(name.to_string());
    }

    /// AUTHINFO PASS, completing a login started by [`AuthState::user`]
    pub fn pass(&mut self, pass: &str) -> PassOutcome {
        let LoginState::UserGiven(user) = &self.state else {
            return PassOutcome::OutOfSequence;
        };
        let user = user.clone();
        if self.login(&user, pass) {
            PassOutcome::Accepted
        } else {
            PassOutcome::Rejected
        }
    }

    /// Check a user/password pair in one step (AUTHINFO SIMPLE)
    pub fn login(&mut self, user: &str, pass: &str) -> bool {
        let ok = self.config.user.as_deref() == Some(user) && self.config.pass.as_deref() == Some(pass);
        if ok {
            info!("user {} authenticated", user);
            self.state = LoginState::Authenticated;
        } else {
            warn!("authentication failed for user {}", user);
            self.state = LoginState::Ready;
        }
        ok
    }

    /// How long to stall the client after a failed login
    pub fn failure_delay(&self) -> Duration {
        Duration::from_secs(self.config.sleep_secs)
    }
}
