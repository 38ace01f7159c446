//! Shared URL resolution for storage backends.
//!
//! Asset names are path-shaped, so the encoding keeps `/` (and the handful
//! of other characters conventionally left literal in file-path URIs) while
//! percent-encoding everything else.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left literal when encoding an asset name into a URL path.
const FILEPATH_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'!')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode an asset name for use in a URL path.
///
/// Backslashes are normalized to forward slashes first, so names produced on
/// Windows-style paths resolve to the same URLs.
pub fn filepath_to_uri(name: &str) -> String {
    let normalized = name.replace('\\', "/");
    utf8_percent_encode(&normalized, FILEPATH_SAFE).to_string()
}

/// Join a base URL and an asset name into a full URL.
pub fn join_url(base_url: &str, name: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        filepath_to_uri(name)
    )
}
