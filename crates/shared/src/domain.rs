use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed page size used by every directory query.
pub const PAGE_LIMIT: u32 = 10;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);
    };
}

id_newtype!(RecordId);

/// A persisted directory entry. Records are never edited or deleted by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub username: String,
    pub age: i64,
    pub created_at: DateTime<Utc>,
}

/// Unsaved form contents, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftRecord {
    pub username: String,
    pub age: String,
}

impl DraftRecord {
    pub fn is_empty(&self) -> bool {
        self.username.is_empty() && self.age.is_empty()
    }
}

/// Body of `POST /users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    pub username: String,
    pub age: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    pub limit: u32,
    pub offset: u64,
}

impl QueryParams {
    /// Builds the query for a 1-based page. Blank keywords are omitted and
    /// page numbers below 1 are treated as page 1.
    pub fn for_page(keyword: &str, page: u32) -> Self {
        let keyword = keyword.trim();
        let page = u64::from(page.max(1));
        Self {
            keyword: (!keyword.is_empty()).then(|| keyword.to_string()),
            limit: PAGE_LIMIT,
            offset: (page - 1) * u64::from(PAGE_LIMIT),
        }
    }

    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(3);
        if let Some(keyword) = &self.keyword {
            pairs.push(("keyword".to_string(), keyword.clone()));
        }
        pairs.push(("limit".to_string(), self.limit.to_string()));
        pairs.push(("offset".to_string(), self.offset.to_string()));
        pairs
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageResult {
    pub records: Vec<Record>,
    pub pagination: Pagination,
}

impl PageResult {
    pub fn total_pages(&self) -> u64 {
        total_pages(self.pagination.total)
    }
}

/// `ceil(total / PAGE_LIMIT)`; zero when there are no records.
pub fn total_pages(total: u64) -> u64 {
    total.div_ceil(u64::from(PAGE_LIMIT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_derived_from_page_and_limit() {
        assert_eq!(QueryParams::for_page("", 1).offset, 0);
        assert_eq!(QueryParams::for_page("", 3).offset, 20);
        assert_eq!(QueryParams::for_page("", 0).offset, 0);
    }

    #[test]
    fn blank_keyword_is_omitted_from_query() {
        let params = QueryParams::for_page("   ", 2);
        assert_eq!(params.keyword, None);
        assert_eq!(
            params.query_pairs(),
            vec![
                ("limit".to_string(), "10".to_string()),
                ("offset".to_string(), "10".to_string()),
            ]
        );

        let params = QueryParams::for_page(" bob ", 1);
        assert_eq!(params.keyword.as_deref(), Some("bob"));
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0), 0);
        assert_eq!(total_pages(1), 1);
        assert_eq!(total_pages(10), 1);
        assert_eq!(total_pages(11), 2);
    }
}
