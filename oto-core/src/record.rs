use oto_scanner::{Category, FetchError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Findings for one successfully fetched address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub endpoints: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub info: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub critical_paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sensitive: Vec<String>,
}

impl ExtractionRecord {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Store matches for a category. Script references are not reported.
    pub fn set(&mut self, category: Category, matches: Vec<String>) {
        match category {
            Category::Endpoint => self.endpoints = matches,
            Category::Path => self.paths = matches,
            Category::Info => self.info = matches,
            Category::Critical => self.critical_paths = matches,
            Category::Sensitive => self.sensitive = matches,
            Category::ScriptReference => {}
        }
    }

    pub fn get(&self, category: Category) -> &[String] {
        match category {
            Category::Endpoint => &self.endpoints,
            Category::Path => &self.paths,
            Category::Info => &self.info,
            Category::Critical => &self.critical_paths,
            Category::Sensitive => &self.sensitive,
            Category::ScriptReference => &[],
        }
    }

    pub fn finding_count(&self) -> usize {
        Category::REPORTABLE.iter().map(|c| self.get(*c).len()).sum()
    }
}

/// Why a target produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Invalid,
    FetchFailed,
    ReadFailed,
}

impl From<&FetchError> for FailureKind {
    fn from(error: &FetchError) -> Self {
        match error {
            FetchError::InvalidTarget(_) => FailureKind::Invalid,
            FetchError::Read(_) => FailureKind::ReadFailed,
            _ => FailureKind::FetchFailed,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::Invalid => "invalid",
            FailureKind::FetchFailed => "fetch failed",
            FailureKind::ReadFailed => "read failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetFailure {
    pub url: String,
    pub kind: FailureKind,
    pub reason: String,
}

impl TargetFailure {
    pub fn from_error(url: impl Into<String>, error: &FetchError) -> Self {
        Self {
            url: url.into(),
            kind: FailureKind::from(error),
            reason: error.to_string(),
        }
    }
}

/// Records in work-set order. Failed targets have no record; they are kept
/// apart in `failures` and never serialized with the records.
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub records: Vec<ExtractionRecord>,
    pub failures: Vec<TargetFailure>,
}

impl Report {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record_for(&self, url: &str) -> Option<&ExtractionRecord> {
        self.records.iter().find(|r| r.url == url)
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.url.as_str())
    }

    pub fn failure_count(&self, kind: FailureKind) -> usize {
        self.failures.iter().filter(|f| f.kind == kind).count()
    }
}
