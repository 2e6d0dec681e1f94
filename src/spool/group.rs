//! Group metadata: the `.info` counters and `.config` policy files

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, error, info};

use crate::error::{NewsError, Result};

use super::lock::GroupLock;

/// Counters file name
pub const INFO_FILE: &str = ".info";
/// Policy file name
pub const CONFIG_FILE: &str = ".config";

/// Article-number counters of a group
///
/// `total` may be smaller than `end - start + 1` when articles were removed
/// from the spool behind the server's back; gaps are never reconciled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupInfo {
    /// Lowest article number (0 for a group that never had articles)
    pub start: u64,
    /// Highest article number
    pub end: u64,
    /// Number of articles
    pub total: u64,
}

impl GroupInfo {
    /// Parse `.info` text; comments, blank and unknown lines are skipped
    pub fn parse(text: &str) -> Self {
        let mut info = GroupInfo::default();
        for line in text.lines() {
            if line.starts_with('#') {
                continue;
            }
            let mut words = line.split_whitespace();
            let (Some(key), Some(value)) = (words.next(), words.next()) else {
                continue;
            };
            let Ok(value) = value.parse::<u64>() else {
                continue;
            };
            match key {
                "start" => info.start = value,
                "end" => info.end = value,
                "total" => info.total = value,
                _ => {}
            }
        }
        info
    }

    /// `.info` file contents
    pub fn render(&self) -> String {
        format!(
            "start       {}\nend         {}\ntotal       {}\n",
            self.start, self.end, self.total
        )
    }

    /// True when `number` lies inside `[start, end]` of a non-empty group
    pub fn contains(&self, number: u64) -> bool {
        self.total > 0 && number >= self.start && number <= self.end
    }

    /// Account for a newly stored article
    pub fn record_post(&mut self, number: u64) {
        if self.total == 0 && self.start == 0 {
            self.start = 1;
        }
        self.end = number;
        self.total += 1;
    }

    /// Counters derived from a set of article numbers
    pub fn from_numbers(numbers: impl IntoIterator<Item = u64>) -> Self {
        let mut info = GroupInfo::default();
        for n in numbers {
            if info.total == 0 || n < info.start {
                info.start = n;
            }
            if info.total == 0 || n > info.end {
                info.end = n;
            }
            info.total += 1;
        }
        info
    }
}

/// Posting policy and mail routing of a group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupConfig {
    /// One-line description shown by LIST NEWSGROUPS
    pub description: String,
    /// Administrator address, `-` when unset
    pub creator: String,
    /// Whether clients may post
    pub post_ok: bool,
    /// Maximum posting size in lines (0 = unlimited)
    pub post_limit: u32,
    /// Addresses every posting is mailed to (empty = no cc-posting)
    pub cc_post: Vec<String>,
    /// Reply-To for cc-posted mail
    pub reply_to: Option<String>,
    /// `To:` address of cc-posted mail
    pub void_email: String,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            description: "-".to_string(),
            creator: "-".to_string(),
            post_ok: true,
            post_limit: 1000,
            cc_post: Vec::new(),
            reply_to: None,
            void_email: "root".to_string(),
        }
    }
}

impl GroupConfig {
    /// Parse `.config` text
    ///
    /// `ccpost` may appear on several lines; the addresses accumulate in
    /// order. Unknown lines are ignored.
    pub fn parse(text: &str) -> Self {
        let mut config = GroupConfig {
            post_ok: false,
            post_limit: 0,
            ..Default::default()
        };
        let mut cc_post = String::new();

        for line in text.lines() {
            if line.starts_with('#') {
                continue;
            }
            if let Some(rest) = line.strip_prefix("description ") {
                config.description = rest.to_string();
                continue;
            }
            let mut words = line.split_whitespace();
            let (Some(key), Some(value)) = (words.next(), words.next()) else {
                continue;
            };
            match key {
                "creator" => config.creator = value.to_string(),
                "postok" => {
                    if let Ok(v) = value.parse::<i64>() {
                        config.post_ok = v != 0;
                    }
                }
                "postlimit" => {
                    if let Ok(v) = value.parse::<i64>() {
                        config.post_limit = u32::try_from(v.max(0)).unwrap_or(u32::MAX);
                    }
                }
                "ccpost" => {
                    if !cc_post.is_empty() && cc_post != "-" && !cc_post.ends_with(',') {
                        cc_post.push(',');
                    }
                    cc_post.push_str(value);
                }
                "replyto" => config.reply_to = Some(value.to_string()),
                "voidemail" => config.void_email = value.to_string(),
                _ => {}
            }
        }

        config.cc_post = cc_post
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty() && *a != "-")
            .map(str::to_string)
            .collect();
        config.reply_to = config.reply_to.filter(|r| r != "-");
        config
    }

    /// `.config` file contents
    pub fn render(&self) -> String {
        let cc_post = if self.cc_post.is_empty() {
            "-".to_string()
        } else {
            self.cc_post.join(",")
        };
        format!(
            "description {}\ncreator     {}\npostok      {}\npostlimit   {}\nccpost      {}\nreplyto     {}\nvoidemail   {}\n",
            self.description,
            self.creator,
            u8::from(self.post_ok),
            self.post_limit,
            cc_post,
            self.reply_to.as_deref().unwrap_or("-"),
            self.void_email,
        )
    }

    /// True when postings are mailed on
    pub fn is_cc_post(&self) -> bool {
        !self.cc_post.is_empty()
    }
}

/// A loaded group: name, location, counters and policy
#[derive(Debug, Clone)]
pub struct Group {
    /// Dotted group name
    pub name: String,
    /// Spool directory of the group
    pub dir: PathBuf,
    /// Counters as read when the group was loaded
    pub info: GroupInfo,
    /// Posting policy
    pub config: GroupConfig,
    /// Creation time of the group directory
    pub ctime: SystemTime,
}

impl Group {
    /// Creation time as seconds since the epoch
    pub fn ctime_secs(&self) -> u64 {
        self.ctime
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// A group is valid exactly when its `.config` file exists
pub fn is_valid_group(dir: &Path) -> bool {
    dir.join(CONFIG_FILE).is_file()
}

/// Directory creation time, falling back to the modification time
pub fn dir_ctime(dir: &Path) -> Result<SystemTime> {
    let meta = fs::metadata(dir).map_err(|e| NewsError::io(dir, e))?;
    Ok(meta
        .created()
        .or_else(|_| meta.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH))
}

/// Read `.info`; `Ok(None)` when the file does not exist
pub fn read_info(dir: &Path) -> Result<Option<GroupInfo>> {
    let path = dir.join(INFO_FILE);
    match fs::read_to_string(&path) {
        Ok(text) => Ok(Some(GroupInfo::parse(&text))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => {
            error!("cannot read {}: {}", path.display(), e);
            Err(NewsError::io(&path, e))
        }
    }
}

/// Read `.config`
pub fn read_config(dir: &Path) -> Result<GroupConfig> {
    let path = dir.join(CONFIG_FILE);
    let text = fs::read_to_string(&path).map_err(|e| {
        error!("cannot read {}: {}", path.display(), e);
        NewsError::io(&path, e)
    })?;
    let config = GroupConfig::parse(&text);
    debug!("{}: ccpost is now {:?}", path.display(), config.cc_post);
    Ok(config)
}

/// Write `.config` atomically; the caller holds the exclusive lock
pub fn write_config_locked(dir: &Path, config: &GroupConfig, _lock: &GroupLock) -> Result<()> {
    replace_file(&dir.join(CONFIG_FILE), config.render().as_bytes())
}

/// Persist counters; the caller holds the exclusive lock
///
/// The new contents go to `.info.new` first and are renamed over `.info`,
/// so readers never see a half-written counters file.
pub fn save_info_locked(dir: &Path, info: &GroupInfo, _lock: &GroupLock) -> Result<()> {
    replace_file(&dir.join(INFO_FILE), info.render().as_bytes())
}

fn replace_file(path: &Path, contents: &[u8]) -> Result<()> {
    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".new");
    let tmp = PathBuf::from(tmp_name);

    let write = || -> io::Result<()> {
        let mut file = File::create(&tmp)?;
        file.write_all(contents)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    };
    write().map_err(|e| {
        error!("cannot write {}: {}", path.display(), e);
        let _ = fs::remove_file(&tmp);
        NewsError::io(path, e)
    })
}

/// Numeric article file names present in the group directory
///
/// With modulus directories the numbered subdirectories are searched one
/// level deep; other entries are ignored.
pub fn scan_article_numbers(dir: &Path, msg_mod_dirs: bool) -> Result<Vec<u64>> {
    let mut numbers = Vec::new();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(numbers),
        Err(e) => return Err(NewsError::io(dir, e)),
    };

    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !name.starts_with(|c: char| c.is_ascii_digit()) {
            continue;
        }
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if msg_mod_dirs {
            if !file_type.is_dir() {
                continue;
            }
            let Ok(sub) = fs::read_dir(entry.path()) else {
                continue;
            };
            for article in sub.flatten() {
                if article.file_type().is_ok_and(|t| t.is_file())
                    && let Some(n) = leading_number(&article.file_name().to_string_lossy())
                {
                    numbers.push(n);
                }
            }
        } else if file_type.is_file()
            && let Some(n) = leading_number(name)
        {
            numbers.push(n);
        }
    }
    numbers.sort_unstable();
    Ok(numbers)
}

fn leading_number(name: &str) -> Option<u64> {
    let digits = name.bytes().take_while(u8::is_ascii_digit).count();
    name[..digits].parse().ok()
}

/// Recompute counters from the directory contents and persist them; the
/// caller holds the exclusive lock
pub fn rebuild_info_locked(dir: &Path, msg_mod_dirs: bool, lock: &GroupLock) -> Result<GroupInfo> {
    let info = GroupInfo::from_numbers(scan_article_numbers(dir, msg_mod_dirs)?);
    info!(
        "rebuilt {}/{}: start={} end={} total={}",
        dir.display(),
        INFO_FILE,
        info.start,
        info.end,
        info.total
    );
    save_info_locked(dir, &info, lock)?;
    Ok(info)
}
