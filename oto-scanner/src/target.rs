use crate::error::{FetchError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// An absolute address with an explicit scheme and a non-empty host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Target(String);

impl Target {
    /// Validate an already-schemed address. The string is kept verbatim so
    /// that dedup works on what the user (or the page) actually wrote.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let parsed = Url::parse(raw).map_err(|e| FetchError::InvalidTarget(format!("{}: {}", raw, e)))?;

        if parsed.scheme().is_empty() || parsed.host_str().is_none_or(str::is_empty) {
            return Err(FetchError::InvalidTarget(format!("{}: missing scheme or host", raw)));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Target {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Prefix `https://` unless the input already names http or https.
pub fn with_default_scheme(line: &str) -> String {
    let line = line.trim();
    if has_http_scheme(line) {
        line.to_string()
    } else {
        format!("https://{}", line)
    }
}

pub(crate) fn has_http_scheme(s: &str) -> bool {
    let lower = s.get(..8).unwrap_or(s).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_input_verbatim() {
        let target = Target::parse("https://example.com").unwrap();
        assert_eq!(target.as_str(), "https://example.com");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let target = Target::parse("  https://example.com/a  \n").unwrap();
        assert_eq!(target.as_str(), "https://example.com/a");
    }

    #[test]
    fn test_parse_rejects_missing_scheme() {
        assert!(matches!(
            Target::parse("example.com"),
            Err(FetchError::InvalidTarget(_))
        ));
    }

    #[test]
    fn test_parse_rejects_missing_host() {
        assert!(Target::parse("mailto:someone").is_err());
        assert!(Target::parse("https://").is_err());
    }

    #[test]
    fn test_default_scheme_then_parse() {
        let target = Target::parse(&with_default_scheme("example.com")).unwrap();
        assert_eq!(target.as_str(), "https://example.com");

        let target = Target::parse(&with_default_scheme("http://example.com")).unwrap();
        assert_eq!(target.as_str(), "http://example.com");
    }

    #[test]
    fn test_with_default_scheme_is_case_insensitive() {
        assert_eq!(with_default_scheme("HTTPS://Example.com"), "HTTPS://Example.com");
        assert_eq!(with_default_scheme("example.com/x"), "https://example.com/x");
    }
}
