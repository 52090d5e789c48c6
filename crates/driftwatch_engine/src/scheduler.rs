//! Job scheduling: config registry, due checks, triggers, and backfill.

use crate::evaluator::{DriftEvaluator, RunKind};
use crate::interface::DataStore;
use chrono::{DateTime, Utc};
use driftwatch_core::{JobConfig, JobConfigUpdate, JobRun, JobRunSummary, JobStatus, normalize_cron};
use driftwatch_error::{DriftwatchResult, SchedulerError, SchedulerErrorKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Cooperative cancellation for a backfill sequence, checked between
/// periods.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// A fresh, uncancelled flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Outcome of a backfill request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillReport {
    /// Historical runs created and executed
    pub runs_created: usize,
    /// Whether the sequence stopped early on the cancellation flag
    pub cancelled: bool,
}

/// One registered job: its config, run lock, and trigger bookkeeping.
struct JobEntry {
    config: JobConfig,
    /// Serializes run execution per config; `try_lock` turns an overlap
    /// into a conflict instead of queueing.
    run_lock: Arc<Mutex<()>>,
    last_trigger: Option<DateTime<Utc>>,
    history: Vec<JobRunSummary>,
}

impl JobEntry {
    fn new(config: JobConfig) -> Self {
        Self {
            config,
            run_lock: Arc::new(Mutex::new(())),
            last_trigger: None,
            history: Vec::new(),
        }
    }
}

/// Owns the set of job configs and decides when runs happen.
///
/// An explicit process-wide component with explicit construction and no
/// ambient globals: the external cron-tick collaborator calls
/// [`JobScheduler::due_check`] at least once per minute, operators call
/// [`JobScheduler::trigger`] and [`JobScheduler::backfill`], and the
/// per-config run lock guarantees at most one `Running` job run per config.
pub struct JobScheduler {
    evaluator: DriftEvaluator,
    data: Arc<dyn DataStore>,
    jobs: RwLock<HashMap<Uuid, JobEntry>>,
}

impl JobScheduler {
    /// Create a scheduler over an evaluator and the data store used for
    /// backfill range discovery.
    pub fn new(evaluator: DriftEvaluator, data: Arc<dyn DataStore>) -> Self {
        Self {
            evaluator,
            data,
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// Register a job config, validating it first.
    pub async fn insert(&self, config: JobConfig) -> DriftwatchResult<()> {
        config.validate()?;
        info!(job_id = %config.id, schedule = %config.schedule, "Registering job");
        self.jobs
            .write()
            .await
            .insert(config.id, JobEntry::new(config));
        Ok(())
    }

    /// Remove a job config from the registry.
    pub async fn remove(&self, job_id: Uuid) -> DriftwatchResult<()> {
        let removed = self.jobs.write().await.remove(&job_id);
        if removed.is_none() {
            Err(unknown_job(job_id))?;
        }
        info!(%job_id, "Unregistered job");
        Ok(())
    }

    /// Pause or resume a job's participation in due checks.
    pub async fn set_active(&self, job_id: Uuid, is_active: bool) -> DriftwatchResult<()> {
        let mut jobs = self.jobs.write().await;
        let entry = jobs.get_mut(&job_id).ok_or_else(|| unknown_job(job_id))?;
        entry.config.is_active = is_active;
        Ok(())
    }

    /// Apply a validated partial update to a job config.
    ///
    /// Takes effect at the next due check or explicit trigger; an in-flight
    /// run keeps the snapshot it started with.
    pub async fn update(&self, job_id: Uuid, changes: JobConfigUpdate) -> DriftwatchResult<()> {
        let mut jobs = self.jobs.write().await;
        let entry = jobs.get_mut(&job_id).ok_or_else(|| unknown_job(job_id))?;
        entry.config.apply(changes)?;
        debug!(%job_id, "Job config updated");
        Ok(())
    }

    /// The current config of a registered job.
    pub async fn get(&self, job_id: Uuid) -> DriftwatchResult<JobConfig> {
        let jobs = self.jobs.read().await;
        let entry = jobs.get(&job_id).ok_or_else(|| unknown_job(job_id))?;
        Ok(entry.config.clone())
    }

    /// Job run summaries, most recent first.
    pub async fn get_history(&self, job_id: Uuid) -> DriftwatchResult<Vec<JobRunSummary>> {
        let jobs = self.jobs.read().await;
        let entry = jobs.get(&job_id).ok_or_else(|| unknown_job(job_id))?;
        let mut history = entry.history.clone();
        history.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(history)
    }

    /// Trigger an immediate run for a job.
    ///
    /// # Errors
    ///
    /// Returns a conflict when a run for the same config is already in
    /// flight; the request is rejected, not queued.
    #[instrument(skip(self))]
    pub async fn trigger(&self, job_id: Uuid) -> DriftwatchResult<JobRun> {
        self.run_once(job_id, RunKind::Manual).await
    }

    /// Evaluate every active job's cron schedule and trigger those that are
    /// due. Returns the number of runs triggered.
    ///
    /// Invoked by the external cron-tick collaborator at a cadence no
    /// coarser than one minute. A job whose fire time elapsed since its
    /// last trigger runs once; an overlap with a manual run is skipped with
    /// a warning rather than treated as an error.
    #[instrument(skip(self))]
    pub async fn due_check(&self, now: DateTime<Utc>) -> DriftwatchResult<usize> {
        let due_jobs: Vec<Uuid> = {
            let jobs = self.jobs.read().await;
            jobs.values()
                .filter(|entry| entry.config.is_active)
                .filter(|entry| is_due(&entry.config.schedule, entry.last_trigger, now))
                .map(|entry| entry.config.id)
                .collect()
        };

        let mut triggered = 0;
        for job_id in due_jobs {
            match self.run_once(job_id, RunKind::Scheduled).await {
                Ok(run) => {
                    info!(%job_id, status = %run.status, "Scheduled run finished");
                    triggered += 1;
                }
                Err(e) => {
                    // A manual run may have grabbed the lock between the due
                    // scan and execution; skip this tick.
                    warn!(%job_id, error = %e, "Skipping due job");
                }
            }
        }
        Ok(triggered)
    }

    /// Run drift detection for every missed historical period, sequentially.
    ///
    /// Periods step back one window length at a time from `now` until the
    /// earliest inference record; periods that already have a completed run
    /// are skipped, as are failed periods (logged, without stopping the
    /// sequence). Backfill runs never notify.
    pub async fn backfill(&self, job_id: Uuid) -> DriftwatchResult<BackfillReport> {
        self.backfill_with_flag(job_id, &CancellationFlag::new())
            .await
    }

    /// [`JobScheduler::backfill`] with a cooperative cancellation flag
    /// checked between periods.
    #[instrument(skip(self, cancel))]
    pub async fn backfill_with_flag(
        &self,
        job_id: Uuid,
        cancel: &CancellationFlag,
    ) -> DriftwatchResult<BackfillReport> {
        let (config, run_lock) = self.snapshot(job_id).await?;
        let _guard = run_lock
            .try_lock_owned()
            .map_err(|_| already_running(job_id))?;

        let Some(earliest) = self.data.earliest_record(config.model_version_id).await? else {
            return Ok(BackfillReport {
                runs_created: 0,
                cancelled: false,
            });
        };

        let window = config.window_size.as_duration();
        let covered = self.completed_period_ends(job_id).await;
        let mut period_end = Utc::now();
        let mut runs_created = 0;
        let mut cancelled = false;

        while period_end - window >= earliest {
            if cancel.is_cancelled() {
                info!(%job_id, runs_created, "Backfill cancelled");
                cancelled = true;
                break;
            }
            let period_start = period_end - window;

            if covered.iter().any(|&t| t > period_start && t <= period_end) {
                debug!(%job_id, %period_end, "Period already covered, skipping");
                period_end = period_start;
                continue;
            }

            match self
                .evaluator
                .execute(&config, period_end, RunKind::Backfill)
                .await
            {
                Ok(run) => {
                    self.record_run(job_id, &run).await;
                    runs_created += 1;
                }
                Err(e) => {
                    warn!(%job_id, %period_end, error = %e, "Backfill period failed");
                }
            }
            period_end = period_start;
        }

        info!(%job_id, runs_created, "Backfill finished");
        Ok(BackfillReport {
            runs_created,
            cancelled,
        })
    }

    /// Execute one run under the job's run lock.
    async fn run_once(&self, job_id: Uuid, kind: RunKind) -> DriftwatchResult<JobRun> {
        let (config, run_lock) = self.snapshot(job_id).await?;
        let _guard = run_lock
            .try_lock_owned()
            .map_err(|_| already_running(job_id))?;

        let run = self.evaluator.execute(&config, Utc::now(), kind).await?;
        self.record_run(job_id, &run).await;
        if let Some(entry) = self.jobs.write().await.get_mut(&job_id) {
            entry.last_trigger = Some(run.started_at);
        }
        Ok(run)
    }

    /// Snapshot a job's config and run lock without holding the registry
    /// lock across execution.
    async fn snapshot(&self, job_id: Uuid) -> DriftwatchResult<(JobConfig, Arc<Mutex<()>>)> {
        let jobs = self.jobs.read().await;
        let entry = jobs.get(&job_id).ok_or_else(|| unknown_job(job_id))?;
        Ok((entry.config.clone(), Arc::clone(&entry.run_lock)))
    }

    async fn record_run(&self, job_id: Uuid, run: &JobRun) {
        if let Some(entry) = self.jobs.write().await.get_mut(&job_id) {
            entry.history.push(run.summary());
        }
    }

    /// Start times of completed runs, used to skip covered backfill periods.
    async fn completed_period_ends(&self, job_id: Uuid) -> Vec<DateTime<Utc>> {
        let jobs = self.jobs.read().await;
        jobs.get(&job_id)
            .map(|entry| {
                entry
                    .history
                    .iter()
                    .filter(|summary| summary.status == JobStatus::Completed)
                    .map(|summary| summary.started_at)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Whether a cron schedule has a fire time in `(last_trigger, now]`.
///
/// A job that has never triggered measures from `now` and so waits for its
/// next fire time, mirroring a fresh registration.
fn is_due(schedule: &str, last_trigger: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    let Ok(normalized) = normalize_cron(schedule) else {
        // Validation rejects bad expressions before they reach the
        // registry; a stale entry just never fires.
        return false;
    };
    let Ok(parsed) = cron::Schedule::from_str(&normalized) else {
        return false;
    };
    let after = last_trigger.unwrap_or(now);
    match parsed.after(&after).next() {
        Some(next) => next <= now,
        None => false,
    }
}

fn unknown_job(job_id: Uuid) -> SchedulerError {
    SchedulerError::new(SchedulerErrorKind::UnknownJob(job_id.to_string()))
}

fn already_running(job_id: Uuid) -> SchedulerError {
    SchedulerError::new(SchedulerErrorKind::AlreadyRunning(job_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_is_due_after_fire_time_elapsed() {
        let last = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        // Daily at 09:00, last triggered 08:00: the 09:00 fire elapsed
        assert!(is_due("0 9 * * *", Some(last), now));
    }

    #[test]
    fn test_not_due_before_fire_time() {
        let last = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 45, 0).unwrap();
        assert!(!is_due("0 9 * * *", Some(last), now));
    }

    #[test]
    fn test_never_triggered_waits_for_next_fire() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 30).unwrap();
        assert!(!is_due("0 9 * * *", None, now));
    }

    #[test]
    fn test_invalid_schedule_never_due() {
        assert!(!is_due("not a cron", None, Utc::now()));
    }
}
