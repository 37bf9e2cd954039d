/// Scheduled writes: spin reveal, hint vote resolution and wager expiry.
pub mod deadline_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Host actions driving the session.
pub mod host_service;
/// Read-only projections of the session.
pub mod public_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Team actions: joining, buzzing, voting, boons and wagers.
pub mod team_service;

#[cfg(test)]
pub(crate) mod test_support {
    use std::{sync::Arc, time::Duration};

    use futures::future::BoxFuture;
    use tokio::sync::watch;

    use crate::{
        config::{AppConfig, GameTimings},
        game::{
            boon::BoonId,
            clock::{ManualClock, Millis},
        },
        state::{AppState, SharedState},
        store::{
            ConditionalWrite, InMemoryStore, SessionStore, StoreKey,
            error::StorageResult,
            models::{BuzzEntity, SessionDoc, SessionPatch, TeamEntity, TeamKey, VoteEntity},
        },
    };

    pub(crate) struct Harness {
        pub state: SharedState,
        pub store: InMemoryStore,
        pub clock: Arc<ManualClock>,
    }

    impl Harness {
        pub fn new(start: Millis) -> Self {
            let store = InMemoryStore::new();
            Self::build(start, Arc::new(store.clone()), store)
        }

        /// Harness whose service calls see `read` / `write` latency on every
        /// store round trip, so concurrent callers interleave.
        pub fn with_latency(start: Millis, read: Duration, write: Duration) -> Self {
            let store = InMemoryStore::new();
            let slow = SlowStore {
                inner: store.clone(),
                read,
                write,
            };
            Self::build(start, Arc::new(slow), store)
        }

        fn build(start: Millis, backend: Arc<dyn SessionStore>, store: InMemoryStore) -> Self {
            let clock = Arc::new(ManualClock::new(start));
            let state = AppState::new(
                backend,
                clock.clone(),
                AppConfig::with_timings(GameTimings::default()),
            );
            Self {
                state,
                store,
                clock,
            }
        }
    }

    struct SlowStore {
        inner: InMemoryStore,
        read: Duration,
        write: Duration,
    }

    fn delayed<T: Send + 'static>(
        delay: Duration,
        op: BoxFuture<'static, T>,
    ) -> BoxFuture<'static, T> {
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            op.await
        })
    }

    impl SessionStore for SlowStore {
        fn session(&self) -> BoxFuture<'static, StorageResult<SessionDoc>> {
            delayed(self.read, self.inner.session())
        }

        fn merge_session(
            &self,
            patch: SessionPatch,
        ) -> BoxFuture<'static, StorageResult<SessionDoc>> {
            delayed(self.write, self.inner.merge_session(patch))
        }

        fn merge_session_if(
            &self,
            expected: u64,
            patch: SessionPatch,
        ) -> BoxFuture<'static, StorageResult<ConditionalWrite>> {
            delayed(self.write, self.inner.merge_session_if(expected, patch))
        }

        fn replace_session(
            &self,
            doc: SessionDoc,
        ) -> BoxFuture<'static, StorageResult<SessionDoc>> {
            delayed(self.write, self.inner.replace_session(doc))
        }

        fn buzzes(&self) -> BoxFuture<'static, StorageResult<Vec<BuzzEntity>>> {
            delayed(self.read, self.inner.buzzes())
        }

        fn append_buzz(&self, buzz: BuzzEntity) -> BoxFuture<'static, StorageResult<bool>> {
            delayed(self.write, self.inner.append_buzz(buzz))
        }

        fn retime_buzz(
            &self,
            team: TeamKey,
            timestamp: Millis,
        ) -> BoxFuture<'static, StorageResult<bool>> {
            delayed(self.write, self.inner.retime_buzz(team, timestamp))
        }

        fn clear_buzzes(&self) -> BoxFuture<'static, StorageResult<()>> {
            delayed(self.write, self.inner.clear_buzzes())
        }

        fn votes(&self) -> BoxFuture<'static, StorageResult<Vec<VoteEntity>>> {
            delayed(self.read, self.inner.votes())
        }

        fn append_vote(&self, vote: VoteEntity) -> BoxFuture<'static, StorageResult<bool>> {
            delayed(self.write, self.inner.append_vote(vote))
        }

        fn clear_votes(&self) -> BoxFuture<'static, StorageResult<()>> {
            delayed(self.write, self.inner.clear_votes())
        }

        fn team(&self, key: TeamKey) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
            delayed(self.read, self.inner.team(key))
        }

        fn teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
            delayed(self.read, self.inner.teams())
        }

        fn ensure_team(&self, name: String) -> BoxFuture<'static, StorageResult<TeamEntity>> {
            delayed(self.write, self.inner.ensure_team(name))
        }

        fn push_inventory(
            &self,
            key: TeamKey,
            boon: BoonId,
        ) -> BoxFuture<'static, StorageResult<bool>> {
            delayed(self.write, self.inner.push_inventory(key, boon))
        }

        fn pull_inventory(
            &self,
            key: TeamKey,
            boon: BoonId,
        ) -> BoxFuture<'static, StorageResult<bool>> {
            delayed(self.write, self.inner.pull_inventory(key, boon))
        }

        fn clear_teams(&self) -> BoxFuture<'static, StorageResult<()>> {
            delayed(self.write, self.inner.clear_teams())
        }

        fn subscribe(&self, key: StoreKey) -> watch::Receiver<u64> {
            self.inner.subscribe(key)
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.health_check()
        }
    }
}
