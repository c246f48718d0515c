//! Browser-facing pages derived from the configured repository URL.
//!
//! Pure string work; nothing here touches the network.

const REPOSITORY_SUFFIX: &str = ".git";

/// `https://host/owner/repo.git` -> `https://host/owner/repo`.
pub fn repository_page_url(repository_url: &str) -> Option<String> {
    let trimmed = repository_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    let base = trimmed.strip_suffix(REPOSITORY_SUFFIX).unwrap_or(trimmed);
    Some(base.trim_end_matches('/').to_string())
}

/// Page listing CI runs for the repository.
pub fn ci_status_url(repository_url: &str) -> Option<String> {
    repository_page_url(repository_url).map(|base| format!("{}/actions", base))
}

/// Page listing published releases.
pub fn releases_url(repository_url: &str) -> Option<String> {
    repository_page_url(repository_url).map(|base| format!("{}/releases", base))
}
