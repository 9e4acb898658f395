use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::Entry;
use crate::Query;
use crate::Revision;
use crate::StoreError;
use crate::StoreResult;

/// The revisioned repository the watch layer is built on.
///
/// Implementations own how revisions are created, how content is stored and
/// how change notifications are generated. The watch loop consumes exactly
/// this surface and nothing more.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VersionedStore: Send + Sync + 'static {
    /// Point-in-time read of `query` at `revision`.
    ///
    /// Resolves for any revision up to the head and never blocks waiting for
    /// a future revision (those fail with [`StoreError::RevisionOutOfRange`]).
    /// A missing path resolves to `None`, never to an error.
    async fn get(
        &self,
        revision: Revision,
        query: &Query,
    ) -> StoreResult<Option<Entry>>;

    /// Resolves with the earliest committed revision newer than `since` that
    /// may affect `path`.
    ///
    /// `since` is the last revision the caller has already observed. The
    /// notification is at-least-once: false positives are allowed (a commit
    /// that touches the path without changing its resolved content still
    /// notifies) but real changes are never missed. If such a revision is
    /// already committed when the call is made, it resolves immediately.
    ///
    /// Dropping the returned future cancels the subscription with no side
    /// effects on committed state.
    async fn await_change(
        &self,
        since: Revision,
        path: &str,
    ) -> StoreResult<Revision>;

    /// Whether `path` resolves to an entry at `revision`, without fetching
    /// content. Implementations with a cheaper existence check override this.
    async fn exists(
        &self,
        revision: Revision,
        path: &str,
    ) -> StoreResult<bool> {
        let query = Query::identity(path).map_err(|e| StoreError::QueryEvaluation {
            path: path.to_string(),
            detail: e.to_string(),
        })?;
        Ok(self.get(revision, &query).await?.is_some())
    }
}
