//! XOVER range handling

use std::ops::RangeInclusive;

use crate::spool::GroupInfo;

/// Range argument of XOVER
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleRange {
    /// `N`
    Single(u64),
    /// `N-`
    From(u64),
    /// `N-M`
    Between(u64, u64),
}

impl ArticleRange {
    /// Parse `N`, `N-` or `N-M`
    pub fn parse(arg: &str) -> Option<Self> {
        match arg.split_once('-') {
            None => arg.parse().ok().map(ArticleRange::Single),
            Some((low, "")) => low.parse().ok().map(ArticleRange::From),
            Some((low, high)) => Some(ArticleRange::Between(low.parse().ok()?, high.parse().ok()?)),
        }
    }

    /// Article numbers to report for a group with counters `info`
    ///
    /// Both bounds are clamped into `[start, end]`. An empty group, or a
    /// range that ends up inverted after clamping, yields nothing.
    pub fn clamp(range: Option<Self>, info: &GroupInfo) -> RangeInclusive<u64> {
        let (low, high) = match range {
            None => (info.start, info.end),
            Some(ArticleRange::Single(n)) => (n, n),
            Some(ArticleRange::From(n)) => (n, info.end),
            Some(ArticleRange::Between(low, high)) => (low, high),
        };
        if info.total == 0 || info.start > info.end {
            return RangeInclusive::new(1, 0);
        }
        low.clamp(info.start, info.end)..=high.clamp(info.start, info.end)
    }
}
