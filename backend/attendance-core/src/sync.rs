// src/sync.rs

use std::fmt;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use chrono::NaiveDate;

use crate::attendance_api::{AttendanceApi, BatchEntryApi, Identity};
use crate::attendance_client::{AuthContext, RemoteError};
use crate::date_range::DateRange;
use crate::error::ScheduleError;
use crate::exceptions::{resolve_exceptions, ExceptionInterval};
use crate::generator::{generate, named_day_entries, EntryDescriptor, Generation, SkipRecord};
use crate::jitter::JitterSource;
use crate::schedule::{DayKey, ScheduleTemplate};

// --- Phases and events ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncPhase {
    Idle,
    Authenticating,
    FetchingContext,
    Generating,
    Persisting,
    Done,
    Failed,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncPhase::Idle => "Idle",
            SyncPhase::Authenticating => "Authenticating",
            SyncPhase::FetchingContext => "FetchingContext",
            SyncPhase::Generating => "Generating",
            SyncPhase::Persisting => "Persisting",
            SyncPhase::Done => "Done",
            SyncPhase::Failed => "Failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillOutcome {
    pub created: usize,
    pub skipped: Vec<SkipRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub deleted: usize,
}

/// What a successful run reports with its terminal event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunSummary {
    Filled(FillOutcome),
    Planned {
        entries: usize,
        skipped: Vec<SkipRecord>,
    },
    Deleted(DeleteOutcome),
}

/// Notifications delivered to the observer, in order. `Finished` and `Failed`
/// are terminal: nothing is delivered after either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    Phase(SyncPhase),
    Progress { completed: usize, total: usize },
    Finished(RunSummary),
    Failed {
        phase: SyncPhase,
        committed: usize,
        message: String,
    },
}

impl SyncEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncEvent::Finished(_) | SyncEvent::Failed { .. })
    }
}

pub trait SyncObserver {
    fn notify(&mut self, event: SyncEvent);
}

impl<F: FnMut(SyncEvent)> SyncObserver for F {
    fn notify(&mut self, event: SyncEvent) {
        self(event)
    }
}

/// Forwards every event to tracing.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl SyncObserver for LoggingObserver {
    fn notify(&mut self, event: SyncEvent) {
        match event {
            SyncEvent::Phase(phase) => info!("Sync phase: {}", phase),
            SyncEvent::Progress { completed, total } => {
                info!("Committed {}/{} entries", completed, total)
            }
            SyncEvent::Finished(RunSummary::Filled(outcome)) => info!(
                "Sync finished: {} entries created, {} days skipped",
                outcome.created,
                outcome.skipped.len()
            ),
            SyncEvent::Finished(RunSummary::Planned { entries, skipped }) => info!(
                "Plan finished: {} entries, {} days skipped",
                entries,
                skipped.len()
            ),
            SyncEvent::Finished(RunSummary::Deleted(outcome)) => {
                info!("Sync finished: {} entries deleted", outcome.deleted)
            }
            SyncEvent::Failed {
                phase,
                committed,
                message,
            } => error!(
                "Sync failed during {} ({} committed): {}",
                phase, committed, message
            ),
        }
    }
}

// --- Requests and errors ---

#[derive(Debug, Clone)]
pub struct FillRequest {
    pub template: ScheduleTemplate,
    pub entropy_minutes: u32,
    pub range: DateRange,
}

#[derive(Error, Debug)]
pub enum SyncFailure {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("Missing data: {0}")]
    MissingData(String),
}

#[derive(Error, Debug)]
#[error("Sync failed during {phase} after {committed} committed entries: {source}")]
pub struct SyncError {
    pub phase: SyncPhase,
    /// Entries already written when the run stopped. They are not rolled back.
    pub committed: usize,
    #[source]
    pub source: SyncFailure,
}

// --- Run bookkeeping ---

struct Run<'o, O: SyncObserver + ?Sized> {
    observer: &'o mut O,
    phase: SyncPhase,
    committed: usize,
}

impl<'o, O: SyncObserver + ?Sized> Run<'o, O> {
    fn new(observer: &'o mut O) -> Self {
        Self {
            observer,
            phase: SyncPhase::Idle,
            committed: 0,
        }
    }

    fn enter(&mut self, phase: SyncPhase) {
        debug!("Entering phase {}", phase);
        self.phase = phase;
        self.observer.notify(SyncEvent::Phase(phase));
    }

    fn committed_one(&mut self, total: usize) {
        self.committed += 1;
        self.observer.notify(SyncEvent::Progress {
            completed: self.committed,
            total,
        });
    }

    // Both terminal helpers consume the run so nothing can be emitted afterwards
    fn finish(self, summary: RunSummary) -> SyncPhase {
        self.observer.notify(SyncEvent::Finished(summary));
        SyncPhase::Done
    }

    fn fail(self, source: SyncFailure) -> SyncError {
        warn!(
            "Run failed in {} with {} committed: {}",
            self.phase, self.committed, source
        );
        self.observer.notify(SyncEvent::Failed {
            phase: self.phase,
            committed: self.committed,
            message: source.to_string(),
        });
        SyncError {
            phase: self.phase,
            committed: self.committed,
            source,
        }
    }
}

struct Prepared {
    auth: AuthContext,
    identity: Identity,
    generation: Generation,
}

// --- Orchestrator ---

/// Drives the remote call sequence for fill, plan and delete runs.
///
/// Run methods borrow the orchestrator mutably, so one value never has two
/// runs in flight. Remote calls are awaited one at a time.
pub struct SyncOrchestrator<A: AttendanceApi, J: JitterSource> {
    api: A,
    jitter: J,
    last_phase: SyncPhase,
}

impl<A: AttendanceApi, J: JitterSource> SyncOrchestrator<A, J> {
    pub fn new(api: A, jitter: J) -> Self {
        Self {
            api,
            jitter,
            last_phase: SyncPhase::Idle,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// `Done` or `Failed` after a run, `Idle` before the first one.
    pub fn last_phase(&self) -> SyncPhase {
        self.last_phase
    }

    /// Generates entries for `request.range` and writes them one by one.
    pub async fn run_fill_range<O: SyncObserver + ?Sized>(
        &mut self,
        request: &FillRequest,
        observer: &mut O,
    ) -> Result<FillOutcome, SyncError> {
        info!(
            "Starting fill for {} (entropy {} min)",
            request.range, request.entropy_minutes
        );
        let mut run = Run::new(observer);

        let prepared = match self.prepare(&mut run, request).await {
            Ok(prepared) => prepared,
            Err(failure) => return Err(self.failed(run, failure)),
        };

        if let Err(failure) = self.persist(&mut run, &prepared).await {
            return Err(self.failed(run, failure));
        }

        let outcome = FillOutcome {
            created: prepared.generation.entries.len(),
            skipped: prepared.generation.skipped,
        };
        self.last_phase = run.finish(RunSummary::Filled(outcome.clone()));
        Ok(outcome)
    }

    /// Same as a fill up to generation, without writing anything.
    pub async fn plan_fill_range<O: SyncObserver + ?Sized>(
        &mut self,
        request: &FillRequest,
        observer: &mut O,
    ) -> Result<Generation, SyncError> {
        info!("Planning fill for {}", request.range);
        let mut run = Run::new(observer);

        let prepared = match self.prepare(&mut run, request).await {
            Ok(prepared) => prepared,
            Err(failure) => return Err(self.failed(run, failure)),
        };

        let generation = prepared.generation;
        self.last_phase = run.finish(RunSummary::Planned {
            entries: generation.entries.len(),
            skipped: generation.skipped.clone(),
        });
        Ok(generation)
    }

    /// Removes every existing entry in `range` with a single delete call.
    pub async fn run_delete_range<O: SyncObserver + ?Sized>(
        &mut self,
        range: &DateRange,
        observer: &mut O,
    ) -> Result<DeleteOutcome, SyncError> {
        info!("Starting delete for {}", range);
        let mut run = Run::new(observer);

        match self.delete(&mut run, range).await {
            Ok(outcome) => {
                self.last_phase = run.finish(RunSummary::Deleted(outcome));
                Ok(outcome)
            }
            Err(failure) => Err(self.failed(run, failure)),
        }
    }

    fn failed<O: SyncObserver + ?Sized>(&mut self, run: Run<'_, O>, failure: SyncFailure) -> SyncError {
        self.last_phase = SyncPhase::Failed;
        run.fail(failure)
    }

    async fn prepare<O: SyncObserver + ?Sized>(
        &mut self,
        run: &mut Run<'_, O>,
        request: &FillRequest,
    ) -> Result<Prepared, SyncFailure> {
        // A broken template fails before any remote call
        request.template.validate()?;

        run.enter(SyncPhase::Authenticating);
        let auth = self.api.authenticate().await?;

        run.enter(SyncPhase::FetchingContext);
        let identity = self.api.fetch_identity(&auth).await?;
        let assignment = self.api.fetch_calendar_assignment(&auth, &identity).await?;
        let calendar = self
            .api
            .fetch_calendar(&auth, &assignment)
            .await?
            .ok_or_else(|| {
                SyncFailure::MissingData(format!("no calendar with id {}", assignment.calendar_id))
            })?;
        let templates = self.api.fetch_calendar_templates(&auth).await?;
        let holidays = templates
            .into_iter()
            .find(|t| t.template_key == calendar.template_key)
            .map(|t| t.holidays)
            .ok_or_else(|| {
                SyncFailure::MissingData(format!(
                    "no calendar template with key {}",
                    calendar.template_key
                ))
            })?;
        let time_off = self
            .api
            .fetch_time_off(&auth, &identity, &request.range)
            .await?;
        debug!(
            "Context for {}: {} holidays, {} custom holidays, {} time-off requests",
            identity.user_id,
            holidays.len(),
            calendar.custom_holidays.len(),
            time_off.len()
        );

        run.enter(SyncPhase::Generating);
        let exceptions = resolve_exceptions(
            &time_off,
            &holidays,
            &calendar.custom_holidays,
            &request.range,
        );
        let generation = generate(
            &request.template,
            &exceptions,
            &request.range,
            request.entropy_minutes,
            &mut self.jitter,
        )?;

        Ok(Prepared {
            auth,
            identity,
            generation,
        })
    }

    async fn persist<O: SyncObserver + ?Sized>(
        &self,
        run: &mut Run<'_, O>,
        prepared: &Prepared,
    ) -> Result<(), SyncFailure> {
        run.enter(SyncPhase::Persisting);
        let total = prepared.generation.entries.len();
        for entry in &prepared.generation.entries {
            self.api
                .create_entry(&prepared.auth, &prepared.identity, entry)
                .await?;
            run.committed_one(total);
        }
        Ok(())
    }

    async fn delete<O: SyncObserver + ?Sized>(
        &self,
        run: &mut Run<'_, O>,
        range: &DateRange,
    ) -> Result<DeleteOutcome, SyncFailure> {
        run.enter(SyncPhase::Authenticating);
        let auth = self.api.authenticate().await?;

        run.enter(SyncPhase::FetchingContext);
        let identity = self.api.fetch_identity(&auth).await?;
        let existing = self.api.fetch_entries(&auth, &identity, range).await?;
        for entry in &existing {
            match entry.date {
                Some(date) => debug!("Deleting entry {} on {}", entry.id, date),
                None => debug!("Deleting entry {} (no date)", entry.id),
            }
        }
        let ids: Vec<String> = existing.into_iter().map(|e| e.id).collect();

        run.enter(SyncPhase::Persisting);
        if ids.is_empty() {
            info!("No entries to delete in {}", range);
            return Ok(DeleteOutcome { deleted: 0 });
        }
        self.api.delete_entries(&auth, &ids).await?;
        run.committed = ids.len();
        run.observer.notify(SyncEvent::Progress {
            completed: ids.len(),
            total: ids.len(),
        });

        Ok(DeleteOutcome { deleted: ids.len() })
    }
}

// --- Batch orchestrator ---

/// Drives integrations that take a whole run in one request. There is no
/// remote context to fetch: days off are supplied by the caller and the
/// token is already known, so a run goes Idle, Generating, Persisting.
pub struct BatchOrchestrator<B: BatchEntryApi, J: JitterSource> {
    api: B,
    jitter: J,
    last_phase: SyncPhase,
}

impl<B: BatchEntryApi, J: JitterSource> BatchOrchestrator<B, J> {
    pub fn new(api: B, jitter: J) -> Self {
        Self {
            api,
            jitter,
            last_phase: SyncPhase::Idle,
        }
    }

    pub fn api(&self) -> &B {
        &self.api
    }

    pub fn last_phase(&self) -> SyncPhase {
        self.last_phase
    }

    /// Generates jittered entries for `request.range`, skipping `days_off`,
    /// and posts them together.
    pub async fn run_fill_range<O: SyncObserver + ?Sized>(
        &mut self,
        request: &FillRequest,
        days_off: &[ExceptionInterval],
        observer: &mut O,
    ) -> Result<FillOutcome, SyncError> {
        info!(
            "Starting batch fill for {} (entropy {} min, {} days off)",
            request.range,
            request.entropy_minutes,
            days_off.len()
        );
        let mut run = Run::new(observer);

        // A broken template fails before anything is generated
        if let Err(e) = request.template.validate() {
            return Err(self.failed(run, e.into()));
        }

        run.enter(SyncPhase::Generating);
        let generation = match generate(
            &request.template,
            days_off,
            &request.range,
            request.entropy_minutes,
            &mut self.jitter,
        ) {
            Ok(generation) => generation,
            Err(e) => return Err(self.failed(run, e.into())),
        };

        if let Err(failure) = self.persist(&mut run, &generation.entries).await {
            return Err(self.failed(run, failure));
        }

        let outcome = FillOutcome {
            created: generation.entries.len(),
            skipped: generation.skipped,
        };
        self.last_phase = run.finish(RunSummary::Filled(outcome.clone()));
        Ok(outcome)
    }

    /// Posts one day's slots exactly as the template lists them under `key`
    /// (or under the date's weekday when `key` is `None`).
    pub async fn run_fill_day<O: SyncObserver + ?Sized>(
        &mut self,
        template: &ScheduleTemplate,
        key: Option<DayKey>,
        date: NaiveDate,
        observer: &mut O,
    ) -> Result<FillOutcome, SyncError> {
        info!("Starting single-day fill for {}", date);
        let mut run = Run::new(observer);

        run.enter(SyncPhase::Generating);
        let entries = match named_day_entries(template, key, date) {
            Ok(entries) => entries,
            Err(e) => return Err(self.failed(run, e.into())),
        };

        if let Err(failure) = self.persist(&mut run, &entries).await {
            return Err(self.failed(run, failure));
        }

        let outcome = FillOutcome {
            created: entries.len(),
            skipped: Vec::new(),
        };
        self.last_phase = run.finish(RunSummary::Filled(outcome.clone()));
        Ok(outcome)
    }

    fn failed<O: SyncObserver + ?Sized>(&mut self, run: Run<'_, O>, failure: SyncFailure) -> SyncError {
        self.last_phase = SyncPhase::Failed;
        run.fail(failure)
    }

    // All or nothing: the single request either stored every entry or none
    async fn persist<O: SyncObserver + ?Sized>(
        &self,
        run: &mut Run<'_, O>,
        entries: &[EntryDescriptor],
    ) -> Result<(), SyncFailure> {
        run.enter(SyncPhase::Persisting);
        if entries.is_empty() {
            info!("Nothing to create");
            return Ok(());
        }
        self.api.create_entries(entries).await?;
        run.committed = entries.len();
        run.observer.notify(SyncEvent::Progress {
            completed: entries.len(),
            total: entries.len(),
        });
        Ok(())
    }
}
