//! Shared application state for the HTTP layer and the escalation monitor.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::broadcast;

use crate::escalation::{
    start_escalation_monitor, EscalationAlert, MonitorHandle, ALERT_CHANNEL_CAPACITY,
};
use crate::service::QueueService;

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

/// Wrapped in `Arc` at startup and shared by every request handler.
pub struct CoreState {
    service: Arc<QueueService>,
    /// Escalation alerts from the monitor. Each SSE client subscribes.
    alerts: broadcast::Sender<EscalationAlert>,
    /// Running monitor, if started. Uses std Mutex: never held across await.
    monitor: Mutex<Option<MonitorHandle>>,
}

impl CoreState {
    pub fn new(service: QueueService) -> Self {
        let (alerts, _) = broadcast::channel(ALERT_CHANNEL_CAPACITY);
        Self {
            service: Arc::new(service),
            alerts,
            monitor: Mutex::new(None),
        }
    }

    pub fn service(&self) -> &Arc<QueueService> {
        &self.service
    }

    pub fn subscribe_alerts(&self) -> broadcast::Receiver<EscalationAlert> {
        self.alerts.subscribe()
    }

    /// Start the escalation monitor. No-op if it is already running.
    /// Must be called from within the tokio runtime.
    pub fn start_monitor(&self, interval: Duration) -> Result<(), CoreError> {
        let mut guard = self.lock_monitor()?;
        if guard.is_none() {
            *guard = Some(start_escalation_monitor(
                self.service.clone(),
                self.alerts.clone(),
                interval,
            ));
        }
        Ok(())
    }

    /// Take the monitor handle so the caller can await its shutdown.
    pub fn take_monitor(&self) -> Result<Option<MonitorHandle>, CoreError> {
        Ok(self.lock_monitor()?.take())
    }

    pub fn is_monitor_running(&self) -> bool {
        self.lock_monitor().map(|g| g.is_some()).unwrap_or(false)
    }

    fn lock_monitor(&self) -> Result<MutexGuard<'_, Option<MonitorHandle>>, CoreError> {
        self.monitor.lock().map_err(|_| CoreError::LockPoisoned)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Lock poisoned")]
    LockPoisoned,
}
