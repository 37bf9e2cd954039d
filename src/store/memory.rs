//! In-process implementation of [`SessionStore`].

use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use tokio::sync::{RwLock, watch};

use super::{
    ConditionalWrite, SessionStore, StoreKey,
    error::{StorageError, StorageResult},
    models::{BuzzEntity, SessionDoc, SessionPatch, TeamEntity, TeamKey, VoteEntity},
};
use crate::game::{boon::BoonId, clock::Millis, inventory};

#[derive(Default)]
struct Data {
    session: SessionDoc,
    buzzes: Vec<BuzzEntity>,
    votes: Vec<VoteEntity>,
    teams: IndexMap<TeamKey, TeamEntity>,
}

struct Revisions {
    session: watch::Sender<u64>,
    buzzes: watch::Sender<u64>,
    votes: watch::Sender<u64>,
    teams: watch::Sender<u64>,
}

impl Revisions {
    fn new() -> Self {
        Self {
            session: watch::channel(0).0,
            buzzes: watch::channel(0).0,
            votes: watch::channel(0).0,
            teams: watch::channel(0).0,
        }
    }

    fn sender(&self, key: StoreKey) -> &watch::Sender<u64> {
        match key {
            StoreKey::Session => &self.session,
            StoreKey::Buzzes => &self.buzzes,
            StoreKey::Votes => &self.votes,
            StoreKey::Teams => &self.teams,
        }
    }

    fn bump(&self, key: StoreKey) {
        self.sender(key).send_modify(|revision| *revision += 1);
    }
}

struct Inner {
    data: RwLock<Data>,
    revisions: Revisions,
    offline: AtomicBool,
}

impl Inner {
    fn ensure_online(&self) -> StorageResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable(
                "in-memory store is offline".into(),
                io::Error::new(io::ErrorKind::NotConnected, "store offline"),
            ));
        }
        Ok(())
    }
}

/// Shared State Store living inside the server process.
#[derive(Clone)]
pub struct InMemoryStore {
    inner: Arc<Inner>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Empty store holding a default lobby session.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                data: RwLock::new(Data::default()),
                revisions: Revisions::new(),
                offline: AtomicBool::new(false),
            }),
        }
    }

    /// Make every operation fail with [`StorageError::Unavailable`] until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }
}

impl SessionStore for InMemoryStore {
    fn session(&self) -> BoxFuture<'static, StorageResult<SessionDoc>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.ensure_online()?;
            Ok(inner.data.read().await.session.clone())
        })
    }

    fn merge_session(&self, patch: SessionPatch) -> BoxFuture<'static, StorageResult<SessionDoc>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.ensure_online()?;
            let doc = {
                let mut data = inner.data.write().await;
                data.session.merge(patch);
                data.session.clone()
            };
            inner.revisions.bump(StoreKey::Session);
            Ok(doc)
        })
    }

    fn merge_session_if(
        &self,
        expected: u64,
        patch: SessionPatch,
    ) -> BoxFuture<'static, StorageResult<ConditionalWrite>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.ensure_online()?;
            let doc = {
                let mut data = inner.data.write().await;
                let actual = data.session.version;
                if actual != expected {
                    return Ok(ConditionalWrite::VersionMismatch { expected, actual });
                }
                data.session.merge(patch);
                data.session.clone()
            };
            inner.revisions.bump(StoreKey::Session);
            Ok(ConditionalWrite::Committed(doc))
        })
    }

    fn replace_session(&self, doc: SessionDoc) -> BoxFuture<'static, StorageResult<SessionDoc>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.ensure_online()?;
            let doc = {
                let mut data = inner.data.write().await;
                let version = data.session.version + 1;
                data.session = SessionDoc { version, ..doc };
                data.session.clone()
            };
            inner.revisions.bump(StoreKey::Session);
            Ok(doc)
        })
    }

    fn buzzes(&self) -> BoxFuture<'static, StorageResult<Vec<BuzzEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.ensure_online()?;
            Ok(inner.data.read().await.buzzes.clone())
        })
    }

    fn append_buzz(&self, buzz: BuzzEntity) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.ensure_online()?;
            {
                let mut data = inner.data.write().await;
                let key = buzz.key();
                if data.buzzes.iter().any(|existing| existing.key() == key) {
                    return Ok(false);
                }
                data.buzzes.push(buzz);
            }
            inner.revisions.bump(StoreKey::Buzzes);
            Ok(true)
        })
    }

    fn retime_buzz(
        &self,
        team: TeamKey,
        timestamp: Millis,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.ensure_online()?;
            {
                let mut data = inner.data.write().await;
                let Some(buzz) = data.buzzes.iter_mut().find(|buzz| buzz.key() == team) else {
                    return Ok(false);
                };
                buzz.timestamp = timestamp;
            }
            inner.revisions.bump(StoreKey::Buzzes);
            Ok(true)
        })
    }

    fn clear_buzzes(&self) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.ensure_online()?;
            inner.data.write().await.buzzes.clear();
            inner.revisions.bump(StoreKey::Buzzes);
            Ok(())
        })
    }

    fn votes(&self) -> BoxFuture<'static, StorageResult<Vec<VoteEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.ensure_online()?;
            Ok(inner.data.read().await.votes.clone())
        })
    }

    fn append_vote(&self, vote: VoteEntity) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.ensure_online()?;
            {
                let mut data = inner.data.write().await;
                let key = vote.key();
                if data.votes.iter().any(|existing| existing.key() == key) {
                    return Ok(false);
                }
                data.votes.push(vote);
            }
            inner.revisions.bump(StoreKey::Votes);
            Ok(true)
        })
    }

    fn clear_votes(&self) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.ensure_online()?;
            inner.data.write().await.votes.clear();
            inner.revisions.bump(StoreKey::Votes);
            Ok(())
        })
    }

    fn team(&self, key: TeamKey) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.ensure_online()?;
            Ok(inner.data.read().await.teams.get(&key).cloned())
        })
    }

    fn teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.ensure_online()?;
            Ok(inner.data.read().await.teams.values().cloned().collect())
        })
    }

    fn ensure_team(&self, name: String) -> BoxFuture<'static, StorageResult<TeamEntity>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.ensure_online()?;
            let key = TeamKey::normalize(&name);
            let (team, created) = {
                let mut data = inner.data.write().await;
                match data.teams.get(&key) {
                    Some(existing) => (existing.clone(), false),
                    None => {
                        let team = TeamEntity::new(name.trim());
                        data.teams.insert(key, team.clone());
                        (team, true)
                    }
                }
            };
            if created {
                inner.revisions.bump(StoreKey::Teams);
            }
            Ok(team)
        })
    }

    fn push_inventory(
        &self,
        key: TeamKey,
        boon: BoonId,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.ensure_online()?;
            {
                let mut data = inner.data.write().await;
                let Some(team) = data.teams.get_mut(&key) else {
                    return Ok(false);
                };
                inventory::grant(&mut team.inventory, boon);
            }
            inner.revisions.bump(StoreKey::Teams);
            Ok(true)
        })
    }

    fn pull_inventory(
        &self,
        key: TeamKey,
        boon: BoonId,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.ensure_online()?;
            let spent = {
                let mut data = inner.data.write().await;
                data.teams
                    .get_mut(&key)
                    .is_some_and(|team| inventory::spend(&mut team.inventory, boon))
            };
            if spent {
                inner.revisions.bump(StoreKey::Teams);
            }
            Ok(spent)
        })
    }

    fn clear_teams(&self) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.ensure_online()?;
            inner.data.write().await.teams.clear();
            inner.revisions.bump(StoreKey::Teams);
            Ok(())
        })
    }

    fn subscribe(&self, key: StoreKey) -> watch::Receiver<u64> {
        self.inner.revisions.sender(key).subscribe()
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move { inner.ensure_online() })
    }
}
