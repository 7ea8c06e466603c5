use crate::discover::{ScriptLog, discover};
use crate::events::EventCallback;
use crate::harvest::{DEFAULT_CONCURRENCY, harvest};
use crate::pace::{DEFAULT_PACE, RateLimiter};
use crate::record::Report;
use oto_scanner::{CategorySelection, Classifier, FetchConfig, FetchError, Fetcher};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Client(#[from] FetchError),
}

/// Options for configuring a run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub seeds: Vec<String>,
    pub categories: CategorySelection,
    pub concurrency: usize,
    /// Minimum spacing between discovery requests. Zero disables pacing.
    pub pace: Duration,
    pub record_script_log: bool,
    pub fetch: FetchConfig,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            seeds: Vec::new(),
            categories: CategorySelection::all(),
            concurrency: DEFAULT_CONCURRENCY,
            pace: DEFAULT_PACE,
            record_script_log: false,
            fetch: FetchConfig::default(),
        }
    }
}

#[derive(Debug)]
pub struct RunOutput {
    pub report: Report,
    pub script_log: Option<ScriptLog>,
    pub targets: usize,
}

/// Discovery followed by harvest over one shared client.
///
/// Only a client that cannot be built (bad proxy address) fails the run;
/// per-target problems end up in `Report::failures`.
pub async fn execute_run(
    options: RunOptions,
    classifier: Arc<Classifier>,
    events: Option<EventCallback>,
) -> Result<RunOutput, CoreError> {
    let RunOptions {
        seeds,
        categories,
        concurrency,
        pace,
        record_script_log,
        fetch,
    } = options;

    let fetcher = Arc::new(Fetcher::new(&fetch)?);
    let limiter = RateLimiter::fixed_interval(pace);

    let discovery = discover(
        &seeds,
        &fetcher,
        &classifier,
        &limiter,
        record_script_log,
        events.as_ref(),
    )
    .await;

    let mut report = harvest(
        &discovery.work,
        fetcher,
        classifier,
        &categories,
        concurrency,
        events,
    )
    .await;

    let mut failures = discovery.rejected;
    failures.append(&mut report.failures);
    report.failures = failures;

    Ok(RunOutput {
        report,
        script_log: discovery.script_log,
        targets: discovery.work.len(),
    })
}
