//! Background escalation monitor.
//!
//! Ticks on a fixed interval, runs the escalation policy for every hospital
//! and publishes an alert for each hospital with at least one escalation.
//! Subscribers (the SSE alert stream) receive alerts over a broadcast channel.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::Serialize;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::policy::Escalation;
use crate::service::{QueueService, ServiceError};

/// Default tick interval.
pub const DEFAULT_MONITOR_INTERVAL_SECS: u64 = 30;

/// Capacity of the alert channel. Slow subscribers skip older alerts.
pub const ALERT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Serialize)]
pub struct EscalationAlert {
    pub hospital_id: Uuid,
    pub escalations: Vec<Escalation>,
    pub timestamp: NaiveDateTime,
}

/// Handle for the running monitor task.
///
/// Dropping the handle stops the monitor.
pub struct MonitorHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Stop ticking. A scan already in progress completes.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("Escalation monitor shutdown signal sent");
        }
    }

    /// Stop and wait for the task to exit.
    pub async fn stop(mut self) {
        self.shutdown();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Evaluate every hospital once. Hospitals without escalations yield no alert.
pub fn scan_hospitals(
    service: &QueueService,
    now: NaiveDateTime,
) -> Result<Vec<EscalationAlert>, ServiceError> {
    let mut alerts = Vec::new();
    for hospital in service.hospitals()? {
        let overview = service.emergency_overview(hospital.id, now)?;
        if overview.escalations.is_empty() {
            continue;
        }
        tracing::warn!(
            hospital_id = %hospital.id,
            escalations = overview.escalations.len(),
            critical = overview.critical_count,
            "Escalation required"
        );
        alerts.push(EscalationAlert {
            hospital_id: hospital.id,
            escalations: overview.escalations,
            timestamp: now,
        });
    }
    Ok(alerts)
}

/// Spawn the monitor on the current tokio runtime.
pub fn start_escalation_monitor(
    service: Arc<QueueService>,
    alerts: broadcast::Sender<EscalationAlert>,
    interval: Duration,
) -> MonitorHandle {
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        tracing::info!(interval_secs = interval.as_secs(), "Escalation monitor started");
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                _ = ticker.tick() => {
                    let now = chrono::Local::now().naive_local();
                    match scan_hospitals(&service, now) {
                        Ok(found) => {
                            for alert in found {
                                // No subscribers is not an error.
                                let _ = alerts.send(alert);
                            }
                        }
                        Err(e) => tracing::error!(error = %e, "Escalation scan failed"),
                    }
                }
            }
        }

        tracing::info!("Escalation monitor stopped");
    });

    MonitorHandle {
        shutdown_tx: Some(shutdown_tx),
        task: Some(task),
    }
}
