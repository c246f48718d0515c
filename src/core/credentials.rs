//! Derivation of the URL used for authenticated remote operations.

use gitship_types::{AuthMode, ProjectConfig};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Only URLs on this transport get a token embedded.
pub const SECURE_TRANSPORT_PREFIX: &str = "https://";

/// Characters left readable inside the userinfo component (RFC 3986 unreserved).
const USERINFO: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// URL handed to `git remote` for this project.
///
/// Token mode on an `https://` URL yields `https://TOKEN@host/path`. Every
/// other combination returns the repository URL unchanged, including token
/// mode on a non-https URL, where the token is silently left out.
pub fn authenticated_url(config: &ProjectConfig) -> String {
    if config.auth_mode != AuthMode::Token || config.token.is_empty() {
        return config.repository_url.clone();
    }
    match config.repository_url.strip_prefix(SECURE_TRANSPORT_PREFIX) {
        Some(rest) => format!(
            "{}{}@{}",
            SECURE_TRANSPORT_PREFIX,
            utf8_percent_encode(&config.token, USERINFO),
            rest
        ),
        None => {
            tracing::debug!(
                url = %config.repository_url,
                "token mode configured but repository URL is not https; token not embedded"
            );
            config.repository_url.clone()
        }
    }
}

/// Replace any `user[:secret]@` part of a URL with `***@`.
///
/// Strings without a scheme separator are returned unchanged, so this is safe
/// to apply to every argument of a logged command line.
pub fn redact_url(value: &str) -> String {
    let Some(scheme_end) = value.find("://") else {
        return value.to_string();
    };
    let authority_start = scheme_end + 3;
    let authority_end = value[authority_start..]
        .find('/')
        .map(|offset| authority_start + offset)
        .unwrap_or(value.len());
    match value[authority_start..authority_end].rfind('@') {
        Some(at) => format!(
            "{}***{}",
            &value[..authority_start],
            &value[authority_start + at..]
        ),
        None => value.to_string(),
    }
}
