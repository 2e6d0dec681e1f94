//! Group name and Message-ID validation
//!
//! Group names map straight onto spool directories, so anything that could
//! escape the spool root (empty components, `..`, slashes) is refused before
//! a path is ever built from it.

use crate::error::{NewsError, Result};

/// Validates a newsgroup name
///
/// Allowed characters are ASCII letters, digits and `.+_-`. Components are
/// separated by single dots; none may be empty.
///
/// # Examples
///
/// ```
/// use newsd::validation::validate_group_name;
///
/// assert!(validate_group_name("comp.lang.rust").is_ok());
/// assert!(validate_group_name("alt.binaries.x-y_z+1").is_ok());
/// assert!(validate_group_name("../etc").is_err());
/// assert!(validate_group_name("a..b").is_err());
/// assert!(validate_group_name(".hidden").is_err());
/// ```
pub fn validate_group_name(name: &str) -> Result<()> {
    let invalid = || NewsError::InvalidGroupName(name.to_string());

    if name.is_empty() || name.len() > 512 {
        return Err(invalid());
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'+' | b'_' | b'-'))
    {
        return Err(invalid());
    }
    if name.split('.').any(str::is_empty) {
        return Err(invalid());
    }
    Ok(())
}

/// Validates a Message-ID selector of the form `<local-part@domain>`
///
/// Only the bracket form and the absence of whitespace are enforced; stored
/// articles are compared verbatim, so nothing else matters for lookups.
///
/// # Examples
///
/// ```
/// use newsd::validation::validate_message_id;
///
/// assert!(validate_message_id("<abc123@example.com>").is_ok());
/// assert!(validate_message_id("<17-a.b@news>").is_ok());
/// assert!(validate_message_id("abc123@example.com").is_err());
/// assert!(validate_message_id("<>").is_err());
/// ```
pub fn validate_message_id(message_id: &str) -> Result<()> {
    if message_id.len() < 3 || !message_id.starts_with('<') || !message_id.ends_with('>') {
        return Err(NewsError::InvalidArticle(format!(
            "bad Message-ID '{message_id}': must be enclosed in angle brackets"
        )));
    }
    if message_id
        .chars()
        .any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(NewsError::InvalidArticle(format!(
            "bad Message-ID '{message_id}': contains whitespace"
        )));
    }
    Ok(())
}
