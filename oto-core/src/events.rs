// Progress events emitted by the pipeline. Rendering is the caller's job.

use crate::record::FailureKind;
use oto_scanner::Target;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    DiscoveryStarted { seeds: usize },
    /// Seed that could not be parsed into scheme + host.
    SeedSkipped { seed: String, reason: String },
    SeedFailed { seed: Target, reason: String },
    ScriptDiscovered { seed: Target, script: String },
    DiscoveryFinished { targets: usize },
    HarvestStarted { targets: usize },
    TargetFetched {
        target: Target,
        status_code: u16,
        findings: usize,
        response_time: Duration,
    },
    TargetDropped {
        target: Target,
        kind: FailureKind,
        reason: String,
    },
    HarvestFinished { records: usize, dropped: usize },
}

/// Callback for reporting pipeline progress
pub type EventCallback = Arc<dyn Fn(PipelineEvent) + Send + Sync>;

pub(crate) fn emit(callback: Option<&EventCallback>, event: PipelineEvent) {
    if let Some(callback) = callback {
        callback(event);
    }
}
