pub mod discover;
pub mod events;
pub mod harvest;
pub mod pace;
pub mod pipeline;
pub mod record;
pub mod report;

pub use discover::{Discovery, ScriptLog, WorkSet, discover};
pub use events::{EventCallback, PipelineEvent};
pub use harvest::{DEFAULT_CONCURRENCY, extract_record, harvest};
pub use pace::RateLimiter;
pub use pipeline::{CoreError, RunOptions, RunOutput, execute_run};
pub use record::{ExtractionRecord, FailureKind, Report, TargetFailure};
