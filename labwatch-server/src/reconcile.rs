use std::sync::Arc;
use std::time::Duration;

use labwatch_core::{ComputerStatus, LogId, MaintenanceLog, today_utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use ulid::Ulid;

use crate::probe::Prober;
use crate::registry::{ComputerRegistry, MaintenanceLogStore, ScheduleStore};

/// Substring identifying a "went into maintenance" audit entry. At most
/// one entry containing it may exist per computer per day.
pub const MAINTENANCE_MARKER: &str = "to under-maintenance";

/// Periodically drives every computer's stored status toward what the
/// network and today's schedule say it should be.
///
/// Each pass snapshots the inventory and today's scheduled set, probes
/// unscheduled computers, writes back statuses that changed and appends
/// one audit entry per transition. A computer entering maintenance is
/// logged at most once per day.
pub struct Reconciler<C, S, L> {
    registry: C,
    schedule: S,
    logs: L,
    prober: Arc<dyn Prober>,
    interval: Duration,
}

/// Counters for one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Computers in the snapshot.
    pub computers: usize,
    /// Computers scheduled for maintenance today.
    pub scheduled: usize,
    /// Status transitions written.
    pub transitions: usize,
    /// Audit entries appended.
    pub logged: usize,
    /// Computers skipped because a store operation failed.
    pub failed: usize,
}

/// Failure that aborts a whole pass before any write happens.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    #[error("failed to list computers: {0}")]
    Computers(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("failed to read schedule: {0}")]
    Schedule(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl<C, S, L> Reconciler<C, S, L>
where
    C: ComputerRegistry,
    S: ScheduleStore,
    L: MaintenanceLogStore,
{
    pub fn new(
        registry: C,
        schedule: S,
        logs: L,
        prober: Arc<dyn Prober>,
        interval: Duration,
    ) -> Self {
        Self {
            registry,
            schedule,
            logs,
            prober,
            interval,
        }
    }

    /// Run one reconciliation pass over the current inventory.
    ///
    /// Day boundaries are resolved in UTC, both for the schedule lookup
    /// and for dating audit entries.
    pub async fn tick(&self) -> Result<TickSummary, TickError> {
        let today = today_utc();

        let computers = self
            .registry
            .computers()
            .await
            .map_err(|e| TickError::Computers(Box::new(e)))?;
        let scheduled = self
            .schedule
            .scheduled_computers(today)
            .await
            .map_err(|e| TickError::Schedule(Box::new(e)))?;

        let mut summary = TickSummary {
            computers: computers.len(),
            scheduled: scheduled.len(),
            ..TickSummary::default()
        };

        for computer in computers {
            let desired = if scheduled.contains(&computer.id) {
                ComputerStatus::UnderMaintenance
            } else if self.prober.probe(&computer.addr).await {
                ComputerStatus::Online
            } else {
                ComputerStatus::Offline
            };

            if desired == computer.status {
                continue;
            }

            match self.registry.set_status(computer.id, desired).await {
                Ok(true) => summary.transitions += 1,
                Ok(false) => {
                    // Removed between snapshot and write; the next pass picks it up.
                    debug!(computer_id = ?computer.id, "Computer vanished mid-pass");
                    continue;
                }
                Err(e) => {
                    warn!(computer_id = ?computer.id, error = %e, "Failed to update status");
                    summary.failed += 1;
                    continue;
                }
            }

            if desired == ComputerStatus::UnderMaintenance {
                match self
                    .logs
                    .has_entry_matching(computer.id, today, MAINTENANCE_MARKER)
                    .await
                {
                    Ok(true) => continue,
                    Ok(false) => {}
                    Err(e) => {
                        // Cannot prove the entry is absent, so don't risk a duplicate.
                        warn!(
                            computer_id = ?computer.id,
                            error = %e,
                            "Failed to check for an existing maintenance entry"
                        );
                        summary.failed += 1;
                        continue;
                    }
                }
            }

            let entry = MaintenanceLog {
                id: LogId(Ulid::new()),
                computer_id: computer.id,
                date: today,
                description: format!("Status changed from {} to {}", computer.status, desired)
                    .into_boxed_str(),
            };

            match self.logs.append(entry).await {
                Ok(()) => summary.logged += 1,
                Err(e) => {
                    warn!(computer_id = ?computer.id, error = %e, "Failed to append audit entry");
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Drive passes on the configured interval until cancelled.
    ///
    /// The first pass runs immediately. A pass that overruns the interval
    /// delays the next firing instead of stacking a second one.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(interval_secs = self.interval.as_secs(), "Reconciler started");

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Reconciler shutting down");
                    break;
                }
                _ = interval.tick() => {
                    match self.tick().await {
                        Ok(summary) if summary.transitions > 0 || summary.failed > 0 => {
                            info!(
                                computers = summary.computers,
                                scheduled = summary.scheduled,
                                transitions = summary.transitions,
                                logged = summary.logged,
                                failed = summary.failed,
                                "Reconciliation pass complete"
                            );
                        }
                        Ok(summary) => {
                            debug!(
                                computers = summary.computers,
                                scheduled = summary.scheduled,
                                "Reconciliation pass complete, no changes"
                            );
                        }
                        Err(e) => {
                            warn!(error = %e, "Reconciliation pass aborted");
                        }
                    }
                }
            }
        }
    }
}
