mod scheduler;
mod sse;
/// Session phases and the pure transition planner.
pub mod state_machine;
/// Plan-then-write execution of session events.
pub mod transitions;

use std::sync::Arc;

use crate::{
    config::{AppConfig, GameTimings},
    error::ServiceError,
    game::clock::{Clock, Millis, SystemClock},
    store::{SessionStore, Snapshot},
};

pub use self::scheduler::{DeadlineKey, DeadlineScheduler};
pub use self::sse::SseHub;

/// Shared application state handed to every handler.
pub type SharedState = Arc<AppState>;

/// Capacity of the session SSE broadcast channel.
const SSE_CAPACITY: usize = 32;

/// Central application state: the injected store, the clock and the session side tasks.
pub struct AppState {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    config: AppConfig,
    sse: SseHub,
    deadlines: DeadlineScheduler,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(
        store: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
        config: AppConfig,
    ) -> SharedState {
        Arc::new(Self {
            store,
            clock,
            config,
            sse: SseHub::new(SSE_CAPACITY),
            deadlines: DeadlineScheduler::new(),
        })
    }

    /// State backed by the wall clock.
    pub fn with_system_clock(store: Arc<dyn SessionStore>, config: AppConfig) -> SharedState {
        Self::new(store, Arc::new(SystemClock), config)
    }

    /// Backing session store.
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Current instant on the injected clock.
    pub fn now(&self) -> Millis {
        self.clock.now_ms()
    }

    /// Game durations.
    pub fn timings(&self) -> &GameTimings {
        self.config.timings()
    }

    /// Broadcast hub used for the session SSE stream.
    pub fn sse(&self) -> &SseHub {
        &self.sse
    }

    /// Scheduler holding pending deadline writes.
    pub fn deadlines(&self) -> &DeadlineScheduler {
        &self.deadlines
    }

    /// Read every store key at once.
    pub async fn snapshot(&self) -> Result<Snapshot, ServiceError> {
        Ok(Snapshot::load(self.store.as_ref()).await?)
    }
}
