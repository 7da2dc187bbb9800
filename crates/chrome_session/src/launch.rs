//! Chrome discovery, launch, and teardown.

use anyhow::{Result, anyhow};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use log::{debug, info};
use std::env;
use std::path::PathBuf;
use std::process::Command;
use tokio::task::JoinHandle;

/// Finds a Chrome or Chromium executable on the system.
///
/// The `CHROME_BIN` environment variable takes priority. After that,
/// well-known binary names are probed by running them with `--version`,
/// and finally a few conventional install paths are checked.
///
/// # Errors
///
/// Returns an error if no usable executable can be found.
pub fn find_chrome_executable() -> Result<PathBuf> {
    if let Ok(chrome_bin) = env::var("CHROME_BIN") {
        let path = PathBuf::from(&chrome_bin);
        if path.exists() {
            return Ok(path);
        }
        debug!("CHROME_BIN is set to {chrome_bin} but that path does not exist");
    }

    let candidates = [
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
    ];
    for candidate in candidates {
        if let Ok(output) = Command::new(candidate).arg("--version").output() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            // Snap stub binaries print a snap message instead of a version.
            if (stdout.contains("Chrome") || stdout.contains("Chromium"))
                && !stderr.contains("snap")
            {
                return Ok(PathBuf::from(candidate));
            }
        }
    }

    let file_candidates = [
        "/usr/bin/google-chrome",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    ];
    for candidate in file_candidates {
        let path = PathBuf::from(candidate);
        if path.exists() {
            return Ok(path);
        }
    }

    Err(anyhow!(
        "Chrome/Chromium executable not found. Install Chrome or set CHROME_BIN."
    ))
}

/// A launched headless Chrome with its CDP event handler task.
///
/// The handler task drains browser events for the whole session; dropping it
/// without draining would stall every in-flight CDP command.
pub struct ChromeSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl ChromeSession {
    /// Launches headless Chrome with the given window size.
    ///
    /// # Errors
    ///
    /// Returns an error if no executable is found, the config is invalid,
    /// or the browser fails to start.
    pub async fn launch(window_width: u32, window_height: u32) -> Result<Self> {
        let chrome_bin = find_chrome_executable()?;
        debug!("Using Chrome executable: {}", chrome_bin.display());

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_bin)
            .no_sandbox()
            .window_size(window_width, window_height)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--allow-file-access-from-files")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--hide-scrollbars")
            .arg("--mute-audio")
            .build()
            .map_err(|err| anyhow!("Browser config error: {err}"))?;

        let (browser, mut handler) = Browser::launch(config).await?;
        info!("Launched headless Chrome ({window_width}x{window_height} window)");

        let handler_task = tokio::task::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!("Browser event error: {err:?}");
                }
            }
        });

        Ok(Self {
            browser,
            handler_task,
        })
    }

    /// Opens a new page at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be created.
    pub async fn new_page(&self, url: &str) -> Result<Page> {
        Ok(self.browser.new_page(url).await?)
    }

    /// Shuts the browser down and stops the event handler task.
    ///
    /// # Errors
    ///
    /// Returns an error if the browser does not close cleanly.
    pub async fn close(mut self) -> Result<()> {
        self.browser.close().await?;
        self.handler_task.abort();
        Ok(())
    }
}
