// Discovery pass: fetch each seed, follow its <script src> references, and
// fold everything into one ordered, duplicate-free work set.

use crate::events::{EventCallback, PipelineEvent, emit};
use crate::pace::RateLimiter;
use crate::record::{FailureKind, TargetFailure};
use oto_scanner::{Classifier, Fetcher, Target, normalize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// Seed address -> script addresses discovered on it.
pub type ScriptLog = BTreeMap<String, Vec<String>>;

/// Insertion-ordered set of targets awaiting harvest.
#[derive(Debug, Clone, Default)]
pub struct WorkSet {
    seen: HashSet<String>,
    targets: Vec<Target>,
}

impl WorkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a target unless it is already present. Returns true if added.
    pub fn insert(&mut self, target: Target) -> bool {
        if self.seen.insert(target.as_str().to_string()) {
            self.targets.push(target);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Target> {
        self.targets.iter()
    }

    pub fn as_slice(&self) -> &[Target] {
        &self.targets
    }
}

impl FromIterator<Target> for WorkSet {
    fn from_iter<I: IntoIterator<Item = Target>>(iter: I) -> Self {
        let mut work = WorkSet::new();
        for target in iter {
            work.insert(target);
        }
        work
    }
}

impl<'a> IntoIterator for &'a WorkSet {
    type Item = &'a Target;
    type IntoIter = std::slice::Iter<'a, Target>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.iter()
    }
}

/// Result of the discovery pass
#[derive(Debug, Default)]
pub struct Discovery {
    pub work: WorkSet,
    /// Present only when requested. Seeds with no scripts are left out.
    pub script_log: Option<ScriptLog>,
    /// Seeds and script addresses that never made it into the work set
    /// because they lack a scheme or host. Each address is listed once.
    pub rejected: Vec<TargetFailure>,
}

/// Run discovery over `seeds` in order, one seed at a time.
///
/// Every valid seed lands in the work set even when its own fetch fails, so
/// harvest still gets a chance at it. Script addresses are normalized
/// against the seed and inserted after it, first occurrence winning.
pub async fn discover(
    seeds: &[String],
    fetcher: &Fetcher,
    classifier: &Classifier,
    limiter: &RateLimiter,
    record_scripts: bool,
    events: Option<&EventCallback>,
) -> Discovery {
    info!("Starting discovery over {} seed(s)", seeds.len());
    emit(events, PipelineEvent::DiscoveryStarted { seeds: seeds.len() });

    let mut work = WorkSet::new();
    let mut script_log = record_scripts.then(ScriptLog::new);
    let mut rejected = Vec::new();

    for raw in seeds {
        let seed = match Target::parse(raw) {
            Ok(seed) => seed,
            Err(e) => {
                debug!("Invalid URL: {}, skipping", raw.trim());
                rejected.push(TargetFailure {
                    url: raw.trim().to_string(),
                    kind: FailureKind::Invalid,
                    reason: e.to_string(),
                });
                emit(
                    events,
                    PipelineEvent::SeedSkipped {
                        seed: raw.trim().to_string(),
                        reason: e.to_string(),
                    },
                );
                continue;
            }
        };

        // already queued, either as a seed or as a script of an earlier seed
        if !work.insert(seed.clone()) {
            continue;
        }

        limiter.acquire().await;

        let page = match fetcher.fetch(&seed).await {
            Ok(page) => page,
            Err(e) => {
                debug!("Error fetching seed {}: {}", seed, e);
                emit(
                    events,
                    PipelineEvent::SeedFailed {
                        seed: seed.clone(),
                        reason: e.to_string(),
                    },
                );
                continue;
            }
        };

        let scripts: Vec<String> = classifier
            .script_references(&page.text())
            .iter()
            .map(|reference| normalize(reference, seed.as_str()))
            .collect();

        for script in &scripts {
            emit(
                events,
                PipelineEvent::ScriptDiscovered {
                    seed: seed.clone(),
                    script: script.clone(),
                },
            );
        }

        if let Some(ref mut log) = script_log
            && !scripts.is_empty()
        {
            log.entry(seed.as_str().to_string())
                .or_default()
                .extend(scripts.iter().cloned());
        }

        for script in scripts {
            match Target::parse(&script) {
                Ok(target) => {
                    work.insert(target);
                }
                Err(e) => {
                    debug!("Invalid script address {} on {}, skipping", script, seed);
                    if !rejected.iter().any(|f: &TargetFailure| f.url == script) {
                        rejected.push(TargetFailure {
                            url: script,
                            kind: FailureKind::Invalid,
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }
    }

    info!("Discovery complete. {} unique target(s)", work.len());
    emit(events, PipelineEvent::DiscoveryFinished { targets: work.len() });

    Discovery {
        work,
        script_log,
        rejected,
    }
}
