//! Shared State Store contract consumed by every client of the session.
//!
//! The store offers field-merge writes on the session document, append and
//! bulk-delete on the buzz and vote collections, one document per team, and a
//! per-key revision channel for change notification. There are no
//! transactions across keys.

/// Storage error type.
pub mod error;
pub mod memory;
pub mod models;

use futures::future::BoxFuture;
use tokio::sync::watch;

use self::{
    error::StorageResult,
    models::{BuzzEntity, SessionDoc, SessionPatch, TeamEntity, TeamKey, VoteEntity},
};
use crate::game::{boon::BoonId, clock::Millis};

pub use self::memory::InMemoryStore;

/// Logical keys that can be subscribed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// The session document.
    Session,
    /// The buzz ledger.
    Buzzes,
    /// The vote tally.
    Votes,
    /// Team documents.
    Teams,
}

impl StoreKey {
    /// Every key, for watchers that follow the whole store.
    pub const ALL: [StoreKey; 4] = [
        StoreKey::Session,
        StoreKey::Buzzes,
        StoreKey::Votes,
        StoreKey::Teams,
    ];
}

/// Outcome of a version-conditioned session write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionalWrite {
    /// The patch landed on the expected version.
    Committed(SessionDoc),
    /// Another write landed first; nothing was written.
    VersionMismatch {
        /// Version the caller planned against.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },
}

/// Abstraction over the replicated document store.
pub trait SessionStore: Send + Sync {
    /// Current session document.
    fn session(&self) -> BoxFuture<'static, StorageResult<SessionDoc>>;
    /// Atomically merge `patch` into the session document and return the result.
    fn merge_session(&self, patch: SessionPatch) -> BoxFuture<'static, StorageResult<SessionDoc>>;
    /// Merge `patch` only if the stored version still equals `expected`.
    fn merge_session_if(
        &self,
        expected: u64,
        patch: SessionPatch,
    ) -> BoxFuture<'static, StorageResult<ConditionalWrite>>;
    /// Overwrite the whole document; the stored version keeps increasing.
    fn replace_session(&self, doc: SessionDoc) -> BoxFuture<'static, StorageResult<SessionDoc>>;

    /// Buzz ledger in append order.
    fn buzzes(&self) -> BoxFuture<'static, StorageResult<Vec<BuzzEntity>>>;
    /// Append a buzz unless the team already has one; returns whether it was stored.
    fn append_buzz(&self, buzz: BuzzEntity) -> BoxFuture<'static, StorageResult<bool>>;
    /// Rewrite the timestamp of an existing buzz; returns whether one was found.
    fn retime_buzz(
        &self,
        team: TeamKey,
        timestamp: Millis,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Empty the buzz ledger.
    fn clear_buzzes(&self) -> BoxFuture<'static, StorageResult<()>>;

    /// Vote tally in append order.
    fn votes(&self) -> BoxFuture<'static, StorageResult<Vec<VoteEntity>>>;
    /// Append a vote unless the team already voted; returns whether it was stored.
    fn append_vote(&self, vote: VoteEntity) -> BoxFuture<'static, StorageResult<bool>>;
    /// Empty the vote tally.
    fn clear_votes(&self) -> BoxFuture<'static, StorageResult<()>>;

    /// Team document for `key`.
    fn team(&self, key: TeamKey) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>>;
    /// Teams in join order.
    fn teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>>;
    /// Create the team document on first join and return the stored entity.
    fn ensure_team(&self, name: String) -> BoxFuture<'static, StorageResult<TeamEntity>>;
    /// Append a boon to a team inventory; returns whether the team exists.
    fn push_inventory(&self, key: TeamKey, boon: BoonId)
    -> BoxFuture<'static, StorageResult<bool>>;
    /// Remove one copy of a boon; returns whether a copy was held.
    fn pull_inventory(&self, key: TeamKey, boon: BoonId)
    -> BoxFuture<'static, StorageResult<bool>>;
    /// Drop every team document.
    fn clear_teams(&self) -> BoxFuture<'static, StorageResult<()>>;

    /// Revision channel for `key`; the receiver holds the current revision immediately.
    fn subscribe(&self, key: StoreKey) -> watch::Receiver<u64>;
    /// Probe the backing store.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Consistent-enough read of every key, used to derive views.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Session document.
    pub doc: SessionDoc,
    /// Buzz ledger.
    pub buzzes: Vec<BuzzEntity>,
    /// Vote tally.
    pub votes: Vec<VoteEntity>,
    /// Teams in join order.
    pub teams: Vec<TeamEntity>,
}

impl Snapshot {
    /// Read all keys concurrently.
    pub async fn load(store: &dyn SessionStore) -> StorageResult<Self> {
        let (doc, buzzes, votes, teams) = futures::try_join!(
            store.session(),
            store.buzzes(),
            store.votes(),
            store.teams()
        )?;
        Ok(Self {
            doc,
            buzzes,
            votes,
            teams,
        })
    }

    /// Team document for `key`, if joined.
    pub fn team(&self, key: &TeamKey) -> Option<&TeamEntity> {
        self.teams.iter().find(|team| team.key() == *key)
    }
}
