//! Per-connection session state

use crate::auth::AuthState;
use crate::config::AuthConfig;
use crate::spool::Group;

/// Cursor and login state of one client session
///
/// Nothing here is shared with other sessions; the spool on disk is the
/// only shared state.
#[derive(Debug)]
pub struct SessionState {
    /// Currently selected group, as last loaded
    pub group: Option<Group>,
    /// Current article number within `group`
    pub current: Option<u64>,
    /// AUTHINFO state
    pub auth: AuthState,
}

impl SessionState {
    /// State of a freshly accepted connection
    pub fn new(auth: AuthConfig) -> Self {
        Self {
            group: None,
            current: None,
            auth: AuthState::new(auth),
        }
    }

    /// Make `group` current; the article cursor moves to its first article
    pub fn select(&mut self, group: Group) {
        self.current = (group.info.total > 0).then_some(group.info.start);
        self.group = Some(group);
    }

    /// Name of the selected group
    pub fn group_name(&self) -> Option<&str> {
        self.group.as_ref().map(|g| g.name.as_str())
    }
}
