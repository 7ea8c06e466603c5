use crate::target::has_http_scheme;
use url::{Position, Url};

/// Resolve a script reference found on `base` into an absolute address.
///
/// This is deliberately not RFC 3986 resolution: bare relative references are
/// anchored at the host root, never at the directory of `base`. A malformed
/// base degrades to an empty scheme and host; the composed string is still
/// returned and the fetch step is left to reject it.
pub fn normalize(reference: &str, base: &str) -> String {
    if has_http_scheme(reference) {
        return reference.to_string();
    }

    let parsed = Url::parse(base).ok();
    let scheme = parsed.as_ref().map(Url::scheme).unwrap_or("");
    // host plus any explicit port
    let authority = parsed
        .as_ref()
        .map(|u| &u[Position::BeforeHost..Position::AfterPort])
        .unwrap_or("");

    if reference.starts_with("//") {
        format!("{}:{}", scheme, reference)
    } else if reference.starts_with('/') {
        format!("{}://{}{}", scheme, authority, reference)
    } else {
        format!(
            "{}://{}/{}",
            scheme,
            authority,
            reference.trim_start_matches('/')
        )
    }
}
