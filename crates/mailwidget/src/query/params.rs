//! List view parameters: filter, sort and paging

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::MailRecord;

/// Default number of rows per page
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Page sizes offered by the page-size selector
pub const DEFAULT_PAGE_SIZES: [usize; 7] = [5, 10, 15, 20, 50, 100, 1000];

/// Error returned when parsing a list parameter from text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseParamError {
    kind: &'static str,
    value: String,
}

/// Which records the list shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Unread,
    Attachments,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Unread, Filter::Attachments];

    pub fn matches(self, record: &MailRecord) -> bool {
        match self {
            Filter::All => true,
            Filter::Unread => !record.seen,
            Filter::Attachments => record.has_attachments(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Unread => "unread",
            Filter::Attachments => "attachments",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = ParseParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "unread" => Ok(Filter::Unread),
            "attachments" | "attach" => Ok(Filter::Attachments),
            _ => Err(ParseParamError {
                kind: "filter",
                value: s.to_string(),
            }),
        }
    }
}

/// Column the list is sorted by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Sender,
    Subject,
    #[default]
    Date,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Sender => "sender",
            SortKey::Subject => "subject",
            SortKey::Date => "date",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ParseParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sender" | "from" => Ok(SortKey::Sender),
            "subject" => Ok(SortKey::Subject),
            "date" => Ok(SortKey::Date),
            _ => Err(ParseParamError {
                kind: "sort key",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

impl SortDir {
    pub fn flipped(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }

    /// Arrow shown next to the active column header
    pub fn indicator(self) -> &'static str {
        match self {
            SortDir::Asc => "↑",
            SortDir::Desc => "↓",
        }
    }
}

/// Everything the derivation pipeline needs besides the records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    pub search_query: String,
    pub filter: Filter,
    pub sort_by: SortKey,
    pub sort_dir: SortDir,
    /// 1-based page number
    pub page: usize,
    pub page_size: usize,
}

impl ListParams {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            search_query: String::new(),
            filter: Filter::All,
            sort_by: SortKey::Date,
            sort_dir: SortDir::Desc,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert_eq!("Unread".parse::<Filter>().unwrap(), Filter::Unread);
        assert_eq!("attach".parse::<Filter>().unwrap(), Filter::Attachments);
        let err = "starred".parse::<Filter>().unwrap_err();
        assert_eq!(err.to_string(), "unknown filter: starred");
    }

    #[test]
    fn test_parse_sort_key() {
        assert_eq!("from".parse::<SortKey>().unwrap(), SortKey::Sender);
        assert!("size".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_defaults() {
        let params = ListParams::default();
        assert_eq!(params.filter, Filter::All);
        assert_eq!(params.sort_by, SortKey::Date);
        assert_eq!(params.sort_dir, SortDir::Desc);
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Filter::Attachments).unwrap(), "\"attachments\"");
        assert_eq!(serde_json::from_str::<SortDir>("\"asc\"").unwrap(), SortDir::Asc);
    }
}
