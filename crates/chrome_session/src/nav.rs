//! File URL construction and bounded navigation.

use anyhow::{Result, anyhow};
use chromiumoxide::page::Page;
use log::debug;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use url::Url;

/// Converts a filesystem path to a `file://` URL.
///
/// The path is canonicalized when possible so relative paths and symlinks
/// resolve to the same URL Chrome will report back.
///
/// # Errors
///
/// Returns an error if the path cannot be represented as a file URL.
pub fn to_file_url(path: &Path) -> Result<Url> {
    let absolute = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    Url::from_file_path(&absolute)
        .map_err(|()| anyhow!("Cannot build a file URL from {}", absolute.display()))
}

/// Navigates `page` to `url` and waits for the load to finish.
///
/// Both the navigation request and the load wait are bounded by
/// `nav_timeout`; a page that never finishes loading is an error, not a hang.
///
/// # Errors
///
/// Returns an error if navigation fails or either phase times out.
pub async fn goto(page: &Page, url: &Url, nav_timeout: Duration) -> Result<()> {
    let start = Instant::now();

    match timeout(nav_timeout, page.goto(url.as_str())).await {
        Ok(Ok(_)) => {}
        Ok(Err(err)) => return Err(anyhow!("Navigation to {url} failed: {err}")),
        Err(_) => return Err(anyhow!("Navigation to {url} timed out after {nav_timeout:?}")),
    }

    match timeout(nav_timeout, page.wait_for_navigation()).await {
        Ok(Ok(_)) => {
            debug!("Loaded {url} in {:?}", start.elapsed());
            Ok(())
        }
        Ok(Err(err)) => Err(anyhow!("Load wait for {url} failed: {err}")),
        Err(_) => Err(anyhow!("Load of {url} timed out after {nav_timeout:?}")),
    }
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::to_file_url;
    use std::fs::write;

    #[test]
    fn to_file_url_produces_absolute_file_scheme() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("index.html");
        write(&page, "<html></html>").unwrap();

        let url = to_file_url(&page).unwrap();
        assert_eq!(url.scheme(), "file");
        assert!(url.as_str().starts_with("file:///"));
        assert!(url.as_str().ends_with("index.html"));
        assert!(!url.as_str().contains('\\'));
    }

    #[test]
    fn to_file_url_survives_missing_files() {
        // Canonicalization fails for paths that do not exist yet; the URL
        // should still come out well-formed for absolute inputs.
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("not_written_yet.html");

        let url = to_file_url(&page).unwrap();
        assert_eq!(url.scheme(), "file");
        assert!(url.as_str().ends_with("not_written_yet.html"));
    }
}
