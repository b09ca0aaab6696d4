//! uptime-notify Driver - one load, fetch, notify, save cycle per process

use std::{sync::Arc, time::Duration};

use config::{NameMatch, Opts};
use eyre::{Context, Result};
use incident::{
    Client as IncidentClient, IncidentId, IncidentSource, NameFilter, Transition,
};
use notify::{LogNotifier, MessageFormatter, Notifier, NotifyError, TelegramNotifier};
use state::{FileStateStore, StateStore};
use tracing::{debug, error, info, warn};

use crate::{
    error::RunError,
    reconcile::{commit, plan},
};

/// A transition whose notification was not delivered. It is planned again on the next run.
#[derive(Debug)]
pub struct FailedNotification {
    /// The undelivered transition
    pub transition: Transition,
    /// Why delivery failed
    pub error: NotifyError,
}

/// What a completed run did.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Incidents reported as opened
    pub opened: Vec<IncidentId>,
    /// Incidents reported as resolved
    pub resolved: Vec<IncidentId>,
    /// Transitions whose notification failed
    pub failed: Vec<FailedNotification>,
    /// Acknowledgements that failed. These never affect the saved state.
    pub acknowledge_failures: usize,
    /// Whether the new state was written
    pub state_saved: bool,
}

impl RunReport {
    /// Notifications delivered during the run.
    pub fn delivered(&self) -> usize {
        self.opened.len() + self.resolved.len()
    }

    /// Whether every planned notification went out.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Process exit status: `0` for a clean run, `2` when some notifications
    /// must be retried by the next run.
    pub fn exit_code(&self) -> u8 {
        if self.is_clean() { 0 } else { 2 }
    }
}

/// Driver that reconciles provider incidents with saved state
#[derive(Clone)]
pub struct Driver {
    source: Arc<dyn IncidentSource>,
    store: Arc<dyn StateStore>,
    notifier: Arc<dyn Notifier>,
    filter: NameFilter,
    acknowledge: bool,
    persist: bool,
}

impl std::fmt::Debug for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("notifier", &self.notifier.name())
            .field("filter", &self.filter.as_str())
            .field("acknowledge", &self.acknowledge)
            .field("persist", &self.persist)
            .finish_non_exhaustive()
    }
}

impl Driver {
    /// Create a driver from its collaborators. Acknowledgement is off and state is saved.
    pub fn new(
        source: Arc<dyn IncidentSource>,
        store: Arc<dyn StateStore>,
        notifier: Arc<dyn Notifier>,
        filter: NameFilter,
    ) -> Self {
        Self { source, store, notifier, filter, acknowledge: false, persist: true }
    }

    /// Acknowledge newly opened incidents once their notification is delivered.
    pub const fn with_acknowledge(mut self, acknowledge: bool) -> Self {
        self.acknowledge = acknowledge;
        self
    }

    /// Whether the new state is saved at the end of a run.
    pub const fn with_persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    /// Create a driver with the given configuration
    pub fn from_opts(opts: &Opts) -> Result<Self> {
        info!("Initializing driver");

        let bu = &opts.betteruptime;
        let filter = match bu.name_match {
            NameMatch::Exact => NameFilter::exact(bu.incident_name.clone()),
            NameMatch::Regex => NameFilter::pattern(&bu.incident_name),
        }
        .wrap_err("Invalid incident name filter")?;

        let timeout = Duration::from_secs(opts.http_timeout_secs);
        let lookback_hours =
            i64::try_from(bu.lookback_hours).wrap_err("Incident lookback is too large")?;
        let source = IncidentClient::with_base_url(bu.token.clone(), bu.url.clone(), timeout)
            .wrap_err("Failed to build Better Uptime client")?
            .with_lookback(chrono::Duration::hours(lookback_hours));

        let formatter = MessageFormatter::new(opts.telegram.display_offset);
        let notifier: Arc<dyn Notifier> = if opts.dry_run {
            info!("🧪 DRY-RUN MODE: notifications are logged, state file is left untouched");
            Arc::new(LogNotifier::new(formatter))
        } else {
            let tg = &opts.telegram;
            Arc::new(
                TelegramNotifier::new(
                    tg.api_url.clone(),
                    tg.token.clone(),
                    tg.chat_id.clone(),
                    timeout,
                    formatter,
                )
                .wrap_err("Failed to build Telegram client")?
                .with_debug_chat(tg.debug_chat_id.clone()),
            )
        };

        let store = FileStateStore::new(opts.state.state_file.clone());
        info!(
            filter = filter.as_str(),
            state_file = %store.path().display(),
            acknowledge = bu.acknowledge,
            "Driver ready"
        );

        Ok(Self::new(Arc::new(source), Arc::new(store), notifier, filter)
            .with_acknowledge(bu.acknowledge && !opts.dry_run)
            .with_persist(!opts.dry_run))
    }

    /// Run one reconciliation cycle.
    ///
    /// Load and fetch failures abort before any notification is sent and leave the
    /// saved state untouched. Failed notifications are reported in the
    /// [`RunReport`] and left out of the saved state so the next run retries them.
    pub async fn run(&self) -> Result<RunReport, RunError> {
        match self.execute().await {
            Ok(report) => Ok(report),
            Err(e) => {
                self.notifier.report_failure(&format!("{} ({})", e, e.kind())).await;
                Err(e)
            }
        }
    }

    async fn execute(&self) -> Result<RunReport, RunError> {
        let previous = self.store.load().map_err(RunError::StoreRead)?;
        let current = self.source.fetch_incidents(&self.filter).await?;
        debug!(previous = previous.len(), current = current.len(), "Reconciling incidents");

        let transitions = plan(&current, &previous);
        if transitions.is_empty() {
            info!(open = previous.len(), "No incident changes");
        }

        let mut report = RunReport::default();
        let mut delivered = Vec::with_capacity(transitions.len());
        for transition in transitions {
            match self.notifier.send(&transition).await {
                Ok(()) => {
                    self.after_delivery(&transition, &mut report).await;
                    delivered.push(transition);
                }
                Err(e) => {
                    warn!(
                        incident_id = %transition.id(),
                        kind = transition.kind(),
                        channel = self.notifier.name(),
                        error = %e,
                        "Notification failed, will retry next run"
                    );
                    report.failed.push(FailedNotification { transition, error: e });
                }
            }
        }

        let next = commit(&previous, &delivered);
        if !self.persist {
            info!(open = next.len(), "Dry run - state not saved");
        } else if let Err(source) = self.store.save(&next) {
            let delivered = report.delivered();
            error!(
                delivered,
                error = %source,
                "Notifications delivered but state could not be saved; they may be repeated"
            );
            return Err(RunError::StoreWrite { delivered, source });
        } else {
            report.state_saved = true;
        }

        info!(
            opened = report.opened.len(),
            resolved = report.resolved.len(),
            failed = report.failed.len(),
            open = next.len(),
            "Run complete"
        );
        Ok(report)
    }

    async fn after_delivery(&self, transition: &Transition, report: &mut RunReport) {
        match transition {
            Transition::Opened(incident) => {
                report.opened.push(incident.id.clone());
                if self.acknowledge && !incident.is_acknowledged() {
                    if let Err(e) = self.source.acknowledge(&incident.id).await {
                        warn!(incident_id = %incident.id, error = %e, "Failed to acknowledge incident");
                        report.acknowledge_failures += 1;
                    }
                }
            }
            Transition::Resolved(incident) => report.resolved.push(incident.id.clone()),
        }
    }
}
