use serde::{Deserialize, Serialize};

use crate::domain::{PageResult, Pagination, Record};

/// `POST /users` success body. The store wraps the record together with a
/// confirmation message; a bare record is accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CreateRecordResponse {
    Wrapped {
        #[serde(default)]
        message: Option<String>,
        user: Record,
    },
    Bare(Record),
}

impl CreateRecordResponse {
    pub fn record(&self) -> &Record {
        match self {
            Self::Wrapped { user, .. } => user,
            Self::Bare(record) => record,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Wrapped { message, .. } => message.as_deref(),
            Self::Bare(_) => None,
        }
    }

    pub fn into_record(self) -> Record {
        match self {
            Self::Wrapped { user, .. } => user,
            Self::Bare(record) => record,
        }
    }
}

/// `GET /users` success body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRecordsResponse {
    #[serde(default)]
    pub users: Vec<Record>,
    pub pagination: Pagination,
}

impl From<ListRecordsResponse> for PageResult {
    fn from(value: ListRecordsResponse) -> Self {
        Self {
            records: value.users,
            pagination: value.pagination,
        }
    }
}

/// `GET /users/{id}` success body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRecordResponse {
    pub user: Record,
}
