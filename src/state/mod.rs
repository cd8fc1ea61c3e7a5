pub mod match_lifecycle;
mod sse;

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, RwLock, watch};

use crate::{dao::league_store::LeagueStore, error::ServiceError, services::sse_events};

pub use self::sse::SseHub;

pub type SharedState = Arc<AppState>;

/// Capacity of the league event channel when none is configured.
pub const DEFAULT_EVENTS_CAPACITY: usize = 64;

/// Central application state holding the storage handle and broadcast channels.
pub struct AppState {
    store: RwLock<Option<Arc<dyn LeagueStore>>>,
    events: SseHub,
    degraded: watch::Sender<bool>,
    write_gate: Mutex<()>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(events_capacity: usize) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            store: RwLock::new(None),
            events: SseHub::new(events_capacity),
            degraded: degraded_tx,
            write_gate: Mutex::new(()),
        })
    }

    /// Construct a state with `store` already installed.
    pub fn with_store(store: Arc<dyn LeagueStore>, events_capacity: usize) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(false);
        Arc::new(Self {
            store: RwLock::new(Some(store)),
            events: SseHub::new(events_capacity),
            degraded: degraded_tx,
            write_gate: Mutex::new(()),
        })
    }

    /// Obtain a handle to the current store, if one is installed.
    pub async fn store(&self) -> Option<Arc<dyn LeagueStore>> {
        let guard = self.store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the current store or fail with [`ServiceError::Degraded`].
    pub async fn require_store(&self) -> Result<Arc<dyn LeagueStore>, ServiceError> {
        self.store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new store implementation and leave degraded mode.
    pub async fn install_store(&self, store: Arc<dyn LeagueStore>) {
        {
            let mut guard = self.store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current store and enter degraded mode.
    pub async fn clear_store(&self) {
        {
            let mut guard = self.store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update the degraded flag, broadcasting a status event when it changes.
    pub fn update_degraded(&self, value: bool) {
        let changed = self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });

        if changed {
            sse_events::broadcast_system_status(&self.events, value);
        }
    }

    /// Broadcast hub used for the league event stream.
    pub fn events(&self) -> &SseHub {
        &self.events
    }

    /// Serialize a read-modify-write sequence against every other one in this process.
    pub async fn write_gate(&self) -> MutexGuard<'_, ()> {
        self.write_gate.lock().await
    }
}
