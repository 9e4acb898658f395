use std::collections::HashMap;
use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::debug;

use crate::Entry;
use crate::EntryContent;
use crate::Query;
use crate::Result;
use crate::Revision;
use crate::StoreConfig;
use crate::StoreError;
use crate::StoreResult;
use crate::VersionedStore;

/// A single mutation inside one commit.
#[derive(Debug, Clone)]
pub enum Change {
    Upsert { path: String, content: EntryContent },
    Remove { path: String },
}

impl Change {
    pub fn upsert(
        path: impl Into<String>,
        content: EntryContent,
    ) -> Self {
        Change::Upsert {
            path: path.into(),
            content,
        }
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Change::Remove { path: path.into() }
    }

    fn path(&self) -> &str {
        match self {
            Change::Upsert { path, .. } => path,
            Change::Remove { path } => path,
        }
    }
}

struct Commit {
    revision: Revision,
    /// Paths touched by this commit, removals included. Drives change
    /// notification, not content comparison.
    touched: Vec<String>,
    /// Materialized state after this commit.
    snapshot: HashMap<String, EntryContent>,
}

struct CommitLog {
    /// Oldest retained commit at the front. Never empty.
    commits: VecDeque<Commit>,
    head: Revision,
    head_snapshot: HashMap<String, EntryContent>,
}

impl CommitLog {
    fn oldest(&self) -> Revision {
        self.commits
            .front()
            .map(|c| c.revision)
            .unwrap_or(self.head)
    }

    fn snapshot_at(
        &self,
        revision: Revision,
    ) -> StoreResult<&HashMap<String, EntryContent>> {
        if revision > self.head {
            return Err(StoreError::RevisionOutOfRange {
                requested: revision,
                head: self.head,
            });
        }
        let oldest = self.oldest();
        if revision < oldest {
            return Err(StoreError::RevisionPruned {
                requested: revision,
                oldest,
            });
        }
        let index = (revision.number() - oldest.number()) as usize;
        match self.commits.get(index) {
            Some(commit) => Ok(&commit.snapshot),
            None => Err(StoreError::Backend(format!(
                "commit log inconsistent: no commit at {revision}"
            ))),
        }
    }
}

/// In-process [`VersionedStore`] keeping a bounded window of revision
/// snapshots. A fresh store holds one empty commit at [`Revision::INIT`].
pub struct MemoryStore {
    inner: RwLock<CommitLog>,
    head_tx: watch::Sender<Revision>,
    config: StoreConfig,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::build(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: StoreConfig) -> Self {
        let initial = Commit {
            revision: Revision::INIT,
            touched: Vec::new(),
            snapshot: HashMap::new(),
        };
        let (head_tx, _) = watch::channel(Revision::INIT);
        Self {
            inner: RwLock::new(CommitLog {
                commits: VecDeque::from([initial]),
                head: Revision::INIT,
                head_snapshot: HashMap::new(),
            }),
            head_tx,
            config,
        }
    }

    pub fn head_revision(&self) -> Revision {
        self.inner.read().head
    }

    /// Applies a batch of changes as one commit and publishes the new head.
    pub fn push(
        &self,
        changes: Vec<Change>,
    ) -> StoreResult<Revision> {
        let revision = {
            let mut log = self.inner.write();
            let mut snapshot = log.head_snapshot.clone();
            let mut touched = Vec::with_capacity(changes.len());
            for change in changes {
                touched.push(change.path().to_string());
                match change {
                    Change::Upsert { path, content } => {
                        snapshot.insert(path, content);
                    }
                    Change::Remove { path } => {
                        snapshot.remove(&path);
                    }
                }
            }
            let revision = log.head.forward(1);
            log.commits.push_back(Commit {
                revision,
                touched,
                snapshot: snapshot.clone(),
            });
            while log.commits.len() > self.config.history_limit {
                log.commits.pop_front();
            }
            log.head = revision;
            log.head_snapshot = snapshot;
            revision
        };
        debug!("committed {revision}");
        self.head_tx.send_replace(revision);
        Ok(revision)
    }

    /// Convenience single-path commit.
    pub fn put(
        &self,
        path: impl Into<String>,
        content: EntryContent,
    ) -> StoreResult<Revision> {
        self.push(vec![Change::upsert(path, content)])
    }

    /// Convenience single-path removal.
    pub fn remove(
        &self,
        path: impl Into<String>,
    ) -> StoreResult<Revision> {
        self.push(vec![Change::remove(path)])
    }

    /// The earliest retained commit newer than `since` that may affect
    /// `path`, if one is already committed. When commits between `since` and
    /// the retained window were pruned, their touched sets are unknown and
    /// the oldest retained revision is reported instead (over-notification
    /// is allowed, missing a change is not).
    fn first_change_after(
        &self,
        since: Revision,
        path: &str,
    ) -> Option<Revision> {
        let log = self.inner.read();
        let oldest = log.oldest();
        if since.forward(1) < oldest {
            return Some(oldest);
        }
        log.commits
            .iter()
            .filter(|c| c.revision > since)
            .find(|c| c.touched.iter().any(|p| p == path))
            .map(|c| c.revision)
    }
}

#[async_trait]
impl VersionedStore for MemoryStore {
    async fn get(
        &self,
        revision: Revision,
        query: &Query,
    ) -> StoreResult<Option<Entry>> {
        let log = self.inner.read();
        let snapshot = log.snapshot_at(revision)?;
        match snapshot.get(query.path()) {
            None => Ok(None),
            Some(raw) => {
                let projected = query.apply(raw)?;
                Ok(Some(Entry::new(revision, query.path(), projected)))
            }
        }
    }

    async fn await_change(
        &self,
        since: Revision,
        path: &str,
    ) -> StoreResult<Revision> {
        // Subscribe before scanning so a commit landing between the scan and
        // the await is not lost.
        let mut head_rx = self.head_tx.subscribe();
        loop {
            if let Some(revision) = self.first_change_after(since, path) {
                debug!("change at {revision} may affect {path} (since {since})");
                return Ok(revision);
            }
            head_rx
                .changed()
                .await
                .map_err(|_| StoreError::Unavailable("memory store dropped".to_string()))?;
        }
    }

    async fn exists(
        &self,
        revision: Revision,
        path: &str,
    ) -> StoreResult<bool> {
        let log = self.inner.read();
        Ok(log.snapshot_at(revision)?.contains_key(path))
    }
}
