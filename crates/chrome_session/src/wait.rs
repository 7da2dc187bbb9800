//! Bounded waiting primitives.
//!
//! Fixed-length sleeps either waste time or flake; everything here polls a
//! real page condition under a deadline instead.

use crate::probe::js_string_literal;
use anyhow::{Result, anyhow};
use chromiumoxide::page::Page;
use log::{debug, warn};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Default interval between condition polls.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Interval between layout signature samples in [`wait_for_settled`]. Two
/// identical consecutive samples mean the page has stopped mutating.
const SETTLE_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// Polls `predicate` every `interval` until it holds or `wait_timeout`
/// elapses. The predicate is always tried at least once.
///
/// Returns `Ok(true)` once the predicate holds and `Ok(false)` on timeout;
/// timing out is an observation, not an error.
///
/// # Errors
///
/// Returns an error only if the predicate itself fails.
pub async fn poll_until<F, Fut>(
    wait_timeout: Duration,
    interval: Duration,
    mut predicate: F,
) -> Result<bool>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let deadline = Instant::now() + wait_timeout;
    loop {
        if predicate().await? {
            return Ok(true);
        }
        if Instant::now() >= deadline {
            return Ok(false);
        }
        sleep(interval).await;
    }
}

async fn selector_exists(page: &Page, selector: &str) -> Result<bool> {
    let literal = js_string_literal(selector);
    let script = format!("document.querySelector({literal}) !== null");
    let result = page.evaluate(script).await?;
    Ok(result.value().and_then(Value::as_bool).unwrap_or(false))
}

/// Waits until a node matching `selector` is attached to the document.
///
/// # Errors
///
/// Returns an error if no match appears within `wait_timeout`, or if the
/// existence probe fails.
pub async fn wait_for_selector(page: &Page, selector: &str, wait_timeout: Duration) -> Result<()> {
    let start = Instant::now();
    let found = poll_until(wait_timeout, POLL_INTERVAL, || {
        selector_exists(page, selector)
    })
    .await?;
    if found {
        debug!("Selector {selector} appeared after {:?}", start.elapsed());
        Ok(())
    } else {
        Err(anyhow!(
            "Timed out after {wait_timeout:?} waiting for selector {selector}"
        ))
    }
}

async fn layout_signature(page: &Page) -> Result<String> {
    let script = "(function() {
    var body = document.body ? document.body.getBoundingClientRect() : { width: 0, height: 0 };
    return JSON.stringify({
        ready: document.readyState,
        nodes: document.getElementsByTagName('*').length,
        width: body.width,
        height: body.height
    });
})()";
    let result = page.evaluate(script).await?;
    let value = result
        .value()
        .ok_or_else(|| anyhow!("Layout signature script returned no value"))?;
    let json_text = value
        .as_str()
        .ok_or_else(|| anyhow!("Layout signature script returned non-string JSON"))?;
    Ok(json_text.to_owned())
}

/// Samples `sample` every `interval` until two consecutive samples agree or
/// `wait_timeout` elapses.
///
/// Returns `Ok(true)` once two consecutive samples match, `Ok(false)` if the
/// source was still changing at the deadline.
///
/// # Errors
///
/// Returns an error if the sampler itself fails.
pub async fn sample_until_stable<F, Fut>(
    wait_timeout: Duration,
    interval: Duration,
    mut sample: F,
) -> Result<bool>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String>>,
{
    let deadline = Instant::now() + wait_timeout;
    let mut last = sample().await?;
    loop {
        sleep(interval).await;
        let current = sample().await?;
        if current == last {
            return Ok(true);
        }
        if Instant::now() >= deadline {
            return Ok(false);
        }
        last = current;
    }
}

/// Waits until the page layout stops changing.
///
/// Samples a cheap signature of the document (ready state, node count, body
/// extent) until two consecutive samples agree. Returns `Ok(true)` once
/// settled, `Ok(false)` with a warning if the page was still mutating at the
/// deadline; callers typically proceed either way.
///
/// # Errors
///
/// Returns an error if the signature probe fails.
pub async fn wait_for_settled(page: &Page, wait_timeout: Duration) -> Result<bool> {
    let settled = sample_until_stable(wait_timeout, SETTLE_SAMPLE_INTERVAL, || {
        layout_signature(page)
    })
    .await?;
    if !settled {
        warn!("Page layout still changing after {wait_timeout:?}");
    }
    Ok(settled)
}

// ===== Tests =====
