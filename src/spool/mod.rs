//! Group Store
//!
//! The spool is a directory tree: group `a.b.c` lives in `<root>/a/b/c/`
//! with its `.config`, `.info` and `.lock` files next to the numbered article
//! files (optionally one level down in `(n/1000)*1000` modulus directories).
//!
//! All methods here are synchronous and may block on an advisory lock;
//! async callers run them on the blocking pool.

mod group;
mod lock;
mod post;

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::article::{ArticlePart, StoredArticle, read_message_id, render_article};
use crate::config::ServerConfig;
use crate::error::{NewsError, Result};
use crate::validation::validate_group_name;

pub use self::group::{
    CONFIG_FILE, Group, GroupConfig, GroupInfo, INFO_FILE, is_valid_group, scan_article_numbers,
};
pub use self::lock::{GroupLock, LOCK_FILE, LockMode};
pub use self::post::{Posted, date_rfc822, prepend_path, reorder_header};

use self::group::{dir_ctime, read_config, read_info, rebuild_info_locked, write_config_locked};

/// File collecting gateway mail that was refused to break a loop
pub const DEADLETTERS_FILE: &str = ".deadletters";

/// Handle on the article spool
#[derive(Debug, Clone)]
pub struct Spool {
    root: PathBuf,
    msg_mod_dirs: bool,
    no_recurse_msg_dir: bool,
    server_name: String,
    spam_filter: Option<String>,
}

impl Spool {
    /// Spool rooted at `root` with flat article directories
    pub fn new(root: impl Into<PathBuf>, server_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            msg_mod_dirs: false,
            no_recurse_msg_dir: true,
            server_name: server_name.into(),
            spam_filter: None,
        }
    }

    /// Spool described by the server configuration
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            root: config.spool_dir.clone(),
            msg_mod_dirs: config.msg_mod_dirs,
            no_recurse_msg_dir: config.no_recurse_msg_dir,
            server_name: config.server_name.clone(),
            spam_filter: config.spam_filter.clone(),
        }
    }

    /// Store articles in modulus subdirectories
    pub fn with_msg_mod_dirs(mut self, enabled: bool) -> Self {
        self.msg_mod_dirs = enabled;
        self
    }

    /// Descend into group directories when listing groups
    pub fn with_recursive_listing(mut self, enabled: bool) -> Self {
        self.no_recurse_msg_dir = !enabled;
        self
    }

    /// Pipe every posting through `command` first
    pub fn with_spam_filter(mut self, command: Option<String>) -> Self {
        self.spam_filter = command;
        self
    }

    /// Spool root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Name this server stamps into Xref, Path and Message-ID headers
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Whether articles live in modulus subdirectories
    pub fn msg_mod_dirs(&self) -> bool {
        self.msg_mod_dirs
    }

    /// Directory of group `name` (`a.b.c` becomes `<root>/a/b/c`)
    pub fn group_dir(&self, name: &str) -> Result<PathBuf> {
        validate_group_name(name)?;
        let mut dir = self.root.clone();
        dir.extend(name.split('.'));
        Ok(dir)
    }

    /// Path of article `number` inside `group_dir`
    pub fn article_path(&self, group_dir: &Path, number: u64) -> PathBuf {
        if self.msg_mod_dirs {
            group_dir
                .join(modulus_dir_name(number))
                .join(number.to_string())
        } else {
            group_dir.join(number.to_string())
        }
    }

    /// Whether `name` is an existing group
    pub fn is_valid_group(&self, name: &str) -> bool {
        self.group_dir(name).is_ok_and(|dir| is_valid_group(&dir))
    }

    /// Load a group's counters and policy under a shared lock
    ///
    /// A missing `.info` is rebuilt from the directory contents under the
    /// exclusive lock; whoever gets the exclusive lock first does the work
    /// and later comers find the file in place.
    pub fn open_group(&self, name: &str) -> Result<Group> {
        let dir = self.existing_group_dir(name)?;
        let ctime = dir_ctime(&dir)?;

        let (info, config) = {
            let _lock = GroupLock::shared(&dir)?;
            (read_info(&dir)?, read_config(&dir)?)
        };
        let info = match info {
            Some(info) => info,
            None => {
                let lock = GroupLock::exclusive(&dir)?;
                match read_info(&dir)? {
                    Some(info) => info,
                    None => rebuild_info_locked(&dir, self.msg_mod_dirs, &lock)?,
                }
            }
        };

        Ok(Group {
            name: name.to_string(),
            dir,
            info,
            config,
            ctime,
        })
    }

    /// Load a group while the caller already holds its exclusive lock
    pub(crate) fn open_group_locked(&self, name: &str, lock: &GroupLock) -> Result<Group> {
        let dir = self.existing_group_dir(name)?;
        let ctime = dir_ctime(&dir)?;
        let info = match read_info(&dir)? {
            Some(info) => info,
            None => rebuild_info_locked(&dir, self.msg_mod_dirs, lock)?,
        };
        let config = read_config(&dir)?;
        Ok(Group {
            name: name.to_string(),
            dir,
            info,
            config,
            ctime,
        })
    }

    fn existing_group_dir(&self, name: &str) -> Result<PathBuf> {
        let dir = self.group_dir(name)?;
        if !is_valid_group(&dir) {
            return Err(NewsError::NoSuchGroup(name.to_string()));
        }
        Ok(dir)
    }

    /// Load the header fields of article `number`
    pub fn load_article(&self, group: &Group, number: u64) -> Result<StoredArticle> {
        StoredArticle::load(&self.article_path(&group.dir, number), number)
    }

    /// Wire form of (part of) article `number`, dot-stuffed, without the
    /// closing `.` line
    pub fn render_article(&self, group: &Group, number: u64, part: ArticlePart) -> Result<Vec<u8>> {
        render_article(&self.article_path(&group.dir, number), number, part)
    }

    /// Find the number of the article carrying `message_id` in `group`
    ///
    /// This opens every article from `end` down to `start` until one matches,
    /// so it costs O(group size). Newest articles are checked first.
    pub fn find_by_message_id(&self, group: &Group, message_id: &str) -> Result<u64> {
        if group.info.total > 0 {
            for number in (group.info.start..=group.info.end).rev() {
                let path = self.article_path(&group.dir, number);
                if read_message_id(&path).as_deref() == Some(message_id) {
                    return Ok(number);
                }
            }
        }
        debug!("Message-ID not found in {}: {}", group.name, message_id);
        Err(NewsError::MessageIdNotFound(message_id.to_string()))
    }

    /// Article numbers present on disk within the group's `[start, end]`
    pub fn article_numbers(&self, group: &Group) -> Result<Vec<u64>> {
        if group.info.total == 0 {
            return Ok(Vec::new());
        }
        let numbers = scan_article_numbers(&group.dir, self.msg_mod_dirs)?;
        Ok(numbers
            .into_iter()
            .filter(|n| group.info.contains(*n))
            .collect())
    }

    /// Names of all groups in the spool, sorted
    ///
    /// Any directory holding a `.config` file is a group. Dot entries are
    /// skipped, and group directories are not searched for nested groups
    /// unless recursive listing is enabled.
    pub fn list_groups(&self) -> Result<Vec<String>> {
        let mut groups = Vec::new();
        let mut pending: Vec<(PathBuf, Vec<String>)> = vec![(self.root.clone(), Vec::new())];

        while let Some((dir, components)) = pending.pop() {
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) if dir == self.root => return Err(NewsError::io(&dir, e)),
                Err(e) => {
                    warn!("skipping {}: {}", dir.display(), e);
                    continue;
                }
            };
            for entry in entries.flatten() {
                let file_name = entry.file_name();
                let Some(file_name) = file_name.to_str() else {
                    continue;
                };
                if file_name.starts_with('.') || !entry.file_type().is_ok_and(|t| t.is_dir()) {
                    continue;
                }
                let mut name = components.clone();
                name.push(file_name.to_string());
                let path = entry.path();

                let is_group = is_valid_group(&path);
                if is_group {
                    let dotted = name.join(".");
                    if validate_group_name(&dotted).is_ok() {
                        groups.push(dotted);
                    }
                }
                if !(is_group && self.no_recurse_msg_dir) {
                    pending.push((path, name));
                }
            }
        }
        groups.sort();
        Ok(groups)
    }

    /// Load every group, skipping (and logging) any that fail to load
    pub fn all_groups(&self) -> Result<Vec<Group>> {
        Ok(self
            .list_groups()?
            .into_iter()
            .filter_map(|name| {
                self.open_group(&name)
                    .inspect_err(|e| warn!("cannot load group {}: {}", name, e))
                    .ok()
            })
            .collect())
    }

    /// Provision a new group: directory tree, `.config` and `.info`
    pub fn create_group(&self, name: &str, config: &GroupConfig) -> Result<Group> {
        let dir = self.group_dir(name)?;
        if is_valid_group(&dir) {
            return Err(NewsError::Other(format!("group '{name}' already exists")));
        }
        fs::create_dir_all(&dir).map_err(|e| NewsError::io(&dir, e))?;
        {
            let lock = GroupLock::exclusive(&dir)?;
            write_config_locked(&dir, config, &lock)?;
            rebuild_info_locked(&dir, self.msg_mod_dirs, &lock)?;
        }
        info!("created group {} in {}", name, dir.display());
        self.open_group(name)
    }

    /// Append a refused message to the spool's dead-letter file
    pub fn append_deadletter(&self, message: &[u8]) -> Result<()> {
        let path = self.root.join(DEADLETTERS_FILE);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| NewsError::io(&path, e))?;
        let mut record = Vec::with_capacity(message.len() + 2);
        record.extend_from_slice(message);
        if !message.ends_with(b"\n") {
            record.push(b'\n');
        }
        record.push(b'\n');
        file.write_all(&record).map_err(|e| NewsError::io(&path, e))
    }
}

fn modulus_dir_name(number: u64) -> String {
    ((number / 1000) * 1000).to_string()
}
