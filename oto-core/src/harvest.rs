// Harvest pass: fetch and classify every target under a concurrency cap.

use crate::discover::WorkSet;
use crate::events::{EventCallback, PipelineEvent, emit};
use crate::record::{ExtractionRecord, Report, TargetFailure};
use futures::future::join_all;
use oto_scanner::classify::{dedup_preserving_order, filter_html_tags};
use oto_scanner::{CategorySelection, Classifier, Fetcher};
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, info, warn};

pub const DEFAULT_CONCURRENCY: usize = 5;

/// Classify `text` for every selected category.
///
/// Endpoint and path matches lose bare HTML tag names first. Every category
/// is then deduplicated, keeping first-seen order.
pub fn extract_record(
    classifier: &Classifier,
    url: &str,
    text: &str,
    categories: &CategorySelection,
) -> ExtractionRecord {
    let mut record = ExtractionRecord::new(url);

    for category in categories.iter() {
        let mut matches = classifier.classify(text, category);
        if category.needs_tag_filter() {
            matches = filter_html_tags(matches);
        }
        record.set(category, dedup_preserving_order(matches));
    }

    record
}

/// Fetch and classify every target in `work`.
///
/// One task is spawned per target up front; a semaphore of `concurrency`
/// permits bounds how many fetch at once. Returns only after every task has
/// finished. Records come back in work-set order regardless of completion
/// order; failed targets are listed in `Report::failures` instead.
pub async fn harvest(
    work: &WorkSet,
    fetcher: Arc<Fetcher>,
    classifier: Arc<Classifier>,
    categories: &CategorySelection,
    concurrency: usize,
    events: Option<EventCallback>,
) -> Report {
    let concurrency = concurrency.max(1);
    info!(
        "Starting harvest of {} target(s) with concurrency {}",
        work.len(),
        concurrency
    );
    emit(events.as_ref(), PipelineEvent::HarvestStarted { targets: work.len() });

    let semaphore = Arc::new(Semaphore::new(concurrency));
    let records: Arc<Mutex<Vec<(usize, ExtractionRecord)>>> = Arc::new(Mutex::new(Vec::new()));
    let failures: Arc<Mutex<Vec<(usize, TargetFailure)>>> = Arc::new(Mutex::new(Vec::new()));
    let categories = Arc::new(categories.clone());

    let mut units = Vec::with_capacity(work.len());

    for (index, target) in work.iter().cloned().enumerate() {
        let semaphore = semaphore.clone();
        let fetcher = fetcher.clone();
        let classifier = classifier.clone();
        let categories = categories.clone();
        let records = records.clone();
        let failures = failures.clone();
        let events = events.clone();

        units.push(tokio::spawn(async move {
            let Ok(permit) = semaphore.acquire_owned().await else {
                return;
            };

            let page = match fetcher.fetch(&target).await {
                Ok(page) => page,
                Err(e) => {
                    drop(permit);
                    debug!("Error fetching {}: {}", target, e);
                    let failure = TargetFailure::from_error(target.as_str(), &e);
                    emit(
                        events.as_ref(),
                        PipelineEvent::TargetDropped {
                            target,
                            kind: failure.kind,
                            reason: failure.reason.clone(),
                        },
                    );
                    failures.lock().await.push((index, failure));
                    return;
                }
            };

            let record = extract_record(&classifier, target.as_str(), &page.text(), &categories);
            drop(permit);

            emit(
                events.as_ref(),
                PipelineEvent::TargetFetched {
                    target,
                    status_code: page.status_code,
                    findings: record.finding_count(),
                    response_time: page.response_time,
                },
            );
            records.lock().await.push((index, record));
        }));
    }

    for outcome in join_all(units).await {
        if let Err(e) = outcome {
            warn!("Harvest task failed: {}", e);
        }
    }

    let mut records = std::mem::take(&mut *records.lock().await);
    let mut failures = std::mem::take(&mut *failures.lock().await);
    records.sort_by_key(|(index, _)| *index);
    failures.sort_by_key(|(index, _)| *index);

    let report = Report {
        records: records.into_iter().map(|(_, record)| record).collect(),
        failures: failures.into_iter().map(|(_, failure)| failure).collect(),
    };

    info!(
        "Harvest complete. {} record(s), {} dropped",
        report.records.len(),
        report.failures.len()
    );
    emit(
        events.as_ref(),
        PipelineEvent::HarvestFinished {
            records: report.records.len(),
            dropped: report.failures.len(),
        },
    );

    report
}
