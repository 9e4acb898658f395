use crate::EntryContent;
use crate::InvalidArgumentError;
use crate::Result;
use crate::StoreError;
use crate::StoreResult;

/// Addresses exactly one logical path, with an optional projection of the
/// stored raw content. Immutable, stateless and reusable across revisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    path: String,
    kind: QueryKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryKind {
    /// The entry as stored, no projection.
    Identity,
    /// An RFC 6901 JSON pointer applied to JSON content.
    JsonPointer(String),
}

impl Query {
    /// A query that resolves the entry as stored.
    pub fn identity(path: impl Into<String>) -> Result<Self> {
        Ok(Self {
            path: validate_path(path.into())?,
            kind: QueryKind::Identity,
        })
    }

    /// A query that projects JSON content through `pointer`.
    ///
    /// The pointer must be empty (whole document) or start with `/`.
    pub fn json_pointer(
        path: impl Into<String>,
        pointer: impl Into<String>,
    ) -> Result<Self> {
        let pointer = pointer.into();
        if !pointer.is_empty() && !pointer.starts_with('/') {
            return Err(InvalidArgumentError::InvalidPointer(pointer).into());
        }
        Ok(Self {
            path: validate_path(path.into())?,
            kind: QueryKind::JsonPointer(pointer),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> &QueryKind {
        &self.kind
    }

    /// Applies this query's projection to raw stored content.
    pub fn apply(
        &self,
        content: &EntryContent,
    ) -> StoreResult<EntryContent> {
        match &self.kind {
            QueryKind::Identity => Ok(content.clone()),
            QueryKind::JsonPointer(pointer) => match content {
                EntryContent::Json(value) => value
                    .pointer(pointer)
                    .cloned()
                    .map(EntryContent::Json)
                    .ok_or_else(|| StoreError::QueryEvaluation {
                        path: self.path.clone(),
                        detail: format!("no value at JSON pointer '{pointer}'"),
                    }),
                EntryContent::Text(_) => Err(StoreError::QueryEvaluation {
                    path: self.path.clone(),
                    detail: "JSON pointer query on non-JSON content".to_string(),
                }),
            },
        }
    }
}

fn validate_path(path: String) -> Result<String> {
    if path.is_empty() {
        return Err(InvalidArgumentError::EmptyPath.into());
    }
    if !path.starts_with('/') {
        return Err(InvalidArgumentError::RelativePath(path).into());
    }
    Ok(path)
}
