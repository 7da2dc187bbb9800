//! The start-screen / game-screen verification scenario.
//!
//! Loads the local page under an iPhone 12 Pro profile forced to landscape,
//! checks that the hero header sits at the top of the start screen, clicks
//! the first category card, and checks that the header is gone from the game
//! screen. Every check is printed as it happens and recorded in a
//! [`VerifyReport`]; screenshots of both screens are written alongside a
//! JSON copy of the report.

use crate::report::{Check, VerifyReport};
use anyhow::{Result, anyhow};
use chrome_session::device::DeviceProfile;
use chrome_session::launch::ChromeSession;
use chrome_session::nav::{goto, to_file_url};
use chrome_session::probe::{BoundingBox, Visibility, bounding_box, visibility};
use chrome_session::screenshot::{capture_full_page_png, write_png};
use chrome_session::wait::{wait_for_selector, wait_for_settled};
use log::{info, warn};
use std::env;
use std::fs::write;
use std::path::PathBuf;
use std::time::Duration;

const HERO_SELECTOR: &str = ".hero";
const CATEGORY_CARD_SELECTOR: &str = ".category-card";

const START_SCREENSHOT: &str = "debug_start_screen.png";
const GAME_SCREENSHOT: &str = "debug_game_screen.png";
const REPORT_FILE: &str = "debug_layout_report.json";

const DEFAULT_NAV_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_SETTLE_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_SELECTOR_TIMEOUT: Duration = Duration::from_secs(30);

/// Landscape dimensions forced onto the device profile.
const LANDSCAPE_WIDTH: u32 = 844;
const LANDSCAPE_HEIGHT: u32 = 390;

/// Tunables for one verification run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory holding the page under test (`index.html`).
    pub page_dir: PathBuf,
    /// Directory screenshots and the JSON report are written to.
    pub artifact_dir: PathBuf,
    pub nav_timeout: Duration,
    pub settle_timeout: Duration,
    pub selector_timeout: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            page_dir: cwd.clone(),
            artifact_dir: cwd,
            nav_timeout: DEFAULT_NAV_TIMEOUT,
            settle_timeout: DEFAULT_SETTLE_TIMEOUT,
            selector_timeout: DEFAULT_SELECTOR_TIMEOUT,
        }
    }
}

impl RunOptions {
    /// Builds options from the environment, falling back to defaults.
    ///
    /// Recognized variables:
    /// - `LAYOUT_VERIFY_DIR`: directory of the page under test
    /// - `LAYOUT_VERIFY_NAV_TIMEOUT_MS`
    /// - `LAYOUT_VERIFY_SETTLE_MS`
    /// - `LAYOUT_VERIFY_SELECTOR_TIMEOUT_MS`
    #[must_use]
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Some(dir) = env::var_os("LAYOUT_VERIFY_DIR") {
            options.page_dir = PathBuf::from(dir);
        }
        options.nav_timeout =
            duration_from_env("LAYOUT_VERIFY_NAV_TIMEOUT_MS", DEFAULT_NAV_TIMEOUT);
        options.settle_timeout =
            duration_from_env("LAYOUT_VERIFY_SETTLE_MS", DEFAULT_SETTLE_TIMEOUT);
        options.selector_timeout = duration_from_env(
            "LAYOUT_VERIFY_SELECTOR_TIMEOUT_MS",
            DEFAULT_SELECTOR_TIMEOUT,
        );
        options
    }
}

fn duration_from_env(var: &str, default: Duration) -> Duration {
    duration_override(env::var(var).ok(), default)
}

/// Interprets a raw override as a millisecond count, keeping `default` when
/// the value is absent or not a number.
fn duration_override(value: Option<String>, default: Duration) -> Duration {
    value
        .and_then(|raw| raw.parse::<u64>().ok())
        .map_or(default, Duration::from_millis)
}

/// Runs the full verification scenario.
///
/// Layout deviations are recorded as failed checks, not errors; the returned
/// report says what was found. Errors are reserved for the run itself going
/// wrong: Chrome missing, navigation failing, no category card ever
/// appearing, artifacts not writable.
///
/// # Errors
///
/// Returns an error if any step of driving the browser fails.
pub async fn run(options: &RunOptions) -> Result<VerifyReport> {
    let mut report = VerifyReport::default();

    let profile = DeviceProfile::iphone_12_pro().with_dimensions(LANDSCAPE_WIDTH, LANDSCAPE_HEIGHT);
    let session = ChromeSession::launch(profile.viewport_width, profile.viewport_height).await?;
    let page = session.new_page("about:blank").await?;
    profile.apply(&page).await?;

    // ===== Start screen =====

    let url = to_file_url(&options.page_dir.join("index.html"))?;
    println!("Loading {url}");
    goto(&page, &url, options.nav_timeout).await?;
    wait_for_settled(&page, options.settle_timeout).await?;

    let hero_box = bounding_box(&page, HERO_SELECTOR).await?;
    println!("Start Screen Hero BBox: {hero_box:?}");
    let check = report.record(start_screen_check(hero_box.as_ref()));
    println!("{}", check.line);

    let start_path = options.artifact_dir.join(START_SCREENSHOT);
    write_png(&start_path, &capture_full_page_png(&page).await?)?;
    println!("Captured start screen");
    report.record_artifact(start_path);

    // ===== Transition =====

    wait_for_selector(&page, CATEGORY_CARD_SELECTOR, options.selector_timeout).await?;
    let card = page.find_element(CATEGORY_CARD_SELECTOR).await?;
    card.click().await?;
    wait_for_settled(&page, options.settle_timeout).await?;

    // ===== Game screen =====

    let hero_visibility = visibility(&page, HERO_SELECTOR).await?;
    let check = report.record(game_screen_check(&hero_visibility));
    println!("{}", check.line);

    let game_path = options.artifact_dir.join(GAME_SCREENSHOT);
    write_png(&game_path, &capture_full_page_png(&page).await?)?;
    println!("Captured game screen");
    report.record_artifact(game_path);

    let report_path = options.artifact_dir.join(REPORT_FILE);
    report.record_artifact(report_path.clone());
    write(&report_path, report.to_json()?)
        .map_err(|err| anyhow!("Failed to write {}: {err}", report_path.display()))?;

    if report.all_passed() {
        info!("{}", report.summary());
    } else {
        warn!("{}", report.summary());
    }
    session.close().await?;
    Ok(report)
}

/// Builds the start-screen check: the hero must be rendered with its top
/// edge at exactly y = 0.
fn start_screen_check(hero_box: Option<&BoundingBox>) -> Check {
    const NAME: &str = "start_hero_at_top";
    const EXPECTED: &str = "hero rendered with top edge at y = 0";
    match hero_box {
        Some(rect) if rect.y == 0.0 => Check::pass(
            NAME,
            EXPECTED,
            format!("{rect:?}"),
            "PASS: Header is at top of start screen".to_owned(),
        ),
        Some(rect) => Check::fail(
            NAME,
            EXPECTED,
            format!("{rect:?}"),
            format!("FAIL: Header position unexpected: {rect:?}"),
        ),
        None => Check::fail(
            NAME,
            EXPECTED,
            "no rendered hero".to_owned(),
            "FAIL: Header position unexpected: None".to_owned(),
        ),
    }
}

/// Builds the game-screen check from the hero's visibility verdict.
///
/// Detached and zero-sized are both acceptable ways for the header to be
/// gone; only a rendered box with positive height fails.
fn game_screen_check(hero: &Visibility) -> Check {
    const NAME: &str = "game_hero_hidden";
    const EXPECTED: &str = "hero detached, hidden, or zero-sized";
    match hero {
        Visibility::Detached => Check::pass(
            NAME,
            EXPECTED,
            "detached".to_owned(),
            format!(
                "PASS: Header checking threw exception (good if detached): \
                 selector {HERO_SELECTOR} no longer matches any node"
            ),
        ),
        Visibility::Hidden => Check::pass(
            NAME,
            EXPECTED,
            "hidden".to_owned(),
            "PASS: Header is hidden on Game Screen".to_owned(),
        ),
        Visibility::Visible(rect) if rect.height > 0.0 => Check::fail(
            NAME,
            EXPECTED,
            format!("{rect:?}"),
            format!("FAIL: Header is VISIBLE on Game Screen! BBox: {rect:?}"),
        ),
        Visibility::Visible(rect) => Check::pass(
            NAME,
            EXPECTED,
            format!("{rect:?}"),
            "PASS: Header is effectively hidden (size 0 or detached)".to_owned(),
        ),
    }
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::{
        DEFAULT_NAV_TIMEOUT, RunOptions, duration_from_env, duration_override, game_screen_check,
        start_screen_check,
    };
    use chrome_session::probe::{BoundingBox, Visibility};
    use std::time::Duration;

    fn rect(y: f64, height: f64) -> BoundingBox {
        BoundingBox {
            x: 0.0,
            y,
            width: 844.0,
            height,
        }
    }

    #[test]
    fn start_check_passes_at_top() {
        let hero = rect(0.0, 60.0);
        let check = start_screen_check(Some(&hero));
        assert!(check.passed());
        assert_eq!(check.line, "PASS: Header is at top of start screen");
    }

    #[test]
    fn start_check_fails_off_top() {
        let hero = rect(40.0, 60.0);
        let check = start_screen_check(Some(&hero));
        assert!(!check.passed());
        assert!(check.line.starts_with("FAIL: Header position unexpected:"));
        assert!(check.line.contains("40.0"));
    }

    #[test]
    fn start_check_fails_when_hero_is_missing() {
        let check = start_screen_check(None);
        assert!(!check.passed());
        assert_eq!(check.line, "FAIL: Header position unexpected: None");
    }

    #[test]
    fn game_check_accepts_hidden() {
        let check = game_screen_check(&Visibility::Hidden);
        assert!(check.passed());
        assert_eq!(check.line, "PASS: Header is hidden on Game Screen");
    }

    #[test]
    fn game_check_accepts_detached_with_exception_wording() {
        let check = game_screen_check(&Visibility::Detached);
        assert!(check.passed());
        assert!(
            check
                .line
                .starts_with("PASS: Header checking threw exception (good if detached):")
        );
    }

    #[test]
    fn game_check_accepts_zero_height() {
        let check = game_screen_check(&Visibility::Visible(rect(0.0, 0.0)));
        assert!(check.passed());
        assert_eq!(
            check.line,
            "PASS: Header is effectively hidden (size 0 or detached)"
        );
    }

    #[test]
    fn game_check_rejects_a_rendered_hero() {
        let check = game_screen_check(&Visibility::Visible(rect(0.0, 60.0)));
        assert!(!check.passed());
        assert!(check.line.starts_with("FAIL: Header is VISIBLE on Game Screen! BBox:"));
        assert!(check.line.contains("60.0"));
    }

    #[test]
    fn default_options_use_generous_timeouts() {
        let options = RunOptions::default();
        assert_eq!(options.nav_timeout, Duration::from_secs(60));
        assert_eq!(options.settle_timeout, Duration::from_secs(5));
        assert_eq!(options.selector_timeout, Duration::from_secs(30));
        assert_eq!(options.page_dir, options.artifact_dir);
    }

    #[test]
    fn duration_from_env_falls_back_when_unset() {
        assert_eq!(
            duration_from_env("LAYOUT_VERIFY_TEST_UNSET_VAR", DEFAULT_NAV_TIMEOUT),
            DEFAULT_NAV_TIMEOUT
        );
    }

    #[test]
    fn duration_override_reads_numeric_millis() {
        assert_eq!(
            duration_override(Some("2500".to_owned()), DEFAULT_NAV_TIMEOUT),
            Duration::from_millis(2500)
        );
    }

    #[test]
    fn duration_override_keeps_the_default_on_garbage() {
        assert_eq!(
            duration_override(Some("soon".to_owned()), DEFAULT_NAV_TIMEOUT),
            DEFAULT_NAV_TIMEOUT
        );
        assert_eq!(
            duration_override(Some("-5".to_owned()), DEFAULT_NAV_TIMEOUT),
            DEFAULT_NAV_TIMEOUT
        );
        assert_eq!(
            duration_override(Some(String::new()), DEFAULT_NAV_TIMEOUT),
            DEFAULT_NAV_TIMEOUT
        );
        assert_eq!(duration_override(None, DEFAULT_NAV_TIMEOUT), DEFAULT_NAV_TIMEOUT);
    }
}
