//! Article Store
//!
//! Articles are flat files: a header block, a blank line, then the body,
//! stored exactly as posted (LF line endings). This module reads them back:
//! - `parsing`: header/body splitting and header field helpers
//! - `types`: [`StoredArticle`] metadata and XOVER records
//! - `send`: wire rendering for ARTICLE/HEAD/BODY

mod parsing;
mod send;
mod types;

pub use self::parsing::{
    FIELD_MAX, RawMessage, find_header, header_fields, header_index, is_continuation, is_header,
    remove_header, split_header,
};
pub use self::send::{ArticlePart, render_article, render_bytes};
pub use self::types::{OVERVIEW_FMT, StoredArticle, read_message_id};
