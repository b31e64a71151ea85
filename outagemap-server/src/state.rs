//! Application state management

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use lru::LruCache;
use outagemap::guard::AnonymousGuard;
use outagemap::service::ReportService;
use uuid::Uuid;

use crate::config::ServerConfig;

/// Application state shared across all handlers
#[derive(Debug)]
pub struct AppState {
    /// Report operations
    pub service: ReportService,

    /// Server configuration
    pub config: ServerConfig,

    /// Anonymous confirmation guards keyed by the client's device id. The
    /// least recently used device is dropped once `max_device_guards` is hit.
    device_guards: Mutex<LruCache<String, Arc<AnonymousGuard>>>,

    /// Open WebSocket connections and when they were opened
    pub websocket_connections: DashMap<Uuid, DateTime<Utc>>,
}

impl AppState {
    /// Create new application state
    pub fn new(service: ReportService, config: ServerConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_device_guards).unwrap_or(NonZeroUsize::MIN);
        Self {
            service,
            config,
            device_guards: Mutex::new(LruCache::new(capacity)),
            websocket_connections: DashMap::new(),
        }
    }

    /// The guard for `device_id`, created on first use
    pub fn device_guard(&self, device_id: &str) -> Arc<AnonymousGuard> {
        let mut guards = self
            .device_guards
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(guard) = guards.get(device_id) {
            return Arc::clone(guard);
        }

        let guard = Arc::new(AnonymousGuard::in_memory());
        if let Some((evicted, _)) = guards.push(device_id.to_string(), Arc::clone(&guard)) {
            tracing::debug!(device_id = %evicted, "Dropped least recently used device guard");
        }
        guard
    }

    /// Number of devices with a live guard
    pub fn device_guard_count(&self) -> usize {
        self.device_guards
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Add a WebSocket connection
    pub fn add_websocket_connection(&self, id: Uuid) {
        self.websocket_connections.insert(id, Utc::now());
    }

    /// Remove a WebSocket connection
    pub fn remove_websocket_connection(&self, id: &Uuid) {
        self.websocket_connections.remove(id);
    }

    /// Get the number of active WebSocket connections
    pub fn websocket_connection_count(&self) -> usize {
        self.websocket_connections.len()
    }
}
