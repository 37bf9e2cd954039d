//! Cancellable deadline tasks.
//!
//! Each task only sleeps and then runs its work; the work itself must re-check
//! the session before writing, so a task that fires twice or late is harmless.

use std::{future::Future, time::Duration};

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use crate::game::clock::Millis;

/// Identity of a scheduled write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeadlineKey {
    /// Spin delay of a Lightning round.
    Reveal(Uuid),
    /// Vote window of the hint request stamped at this instant.
    HintVote(Millis),
    /// Expiry of a double-jeopardy offer.
    WagerExpiry(Uuid),
}

/// Registry of pending deadline tasks keyed by what they resolve.
#[derive(Default)]
pub struct DeadlineScheduler {
    tasks: DashMap<DeadlineKey, JoinHandle<()>>,
}

impl DeadlineScheduler {
    /// Empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `work` after `delay` unless a live task already owns `key`.
    ///
    /// Returns whether a new task was spawned.
    pub fn schedule<F>(&self, key: DeadlineKey, delay: Duration, work: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.is_scheduled(&key) {
            return false;
        }

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            work.await;
        });
        debug!(?key, delay_ms = delay.as_millis() as u64, "deadline armed");

        if let Some(previous) = self.tasks.insert(key, handle) {
            previous.abort();
        }
        true
    }

    /// Whether a live task owns `key`.
    pub fn is_scheduled(&self, key: &DeadlineKey) -> bool {
        self.tasks
            .get(key)
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Abort every task whose key is not wanted any more and forget finished ones.
    pub fn retain<P>(&self, mut wanted: P)
    where
        P: FnMut(&DeadlineKey) -> bool,
    {
        self.tasks.retain(|key, handle| {
            if handle.is_finished() {
                return false;
            }
            let keep = wanted(key);
            if !keep {
                handle.abort();
                debug!(?key, "deadline cancelled");
            }
            keep
        });
    }

    /// Abort every pending task.
    pub fn cancel_all(&self) {
        self.retain(|_| false);
    }

    /// Number of tracked tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no task is tracked.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
