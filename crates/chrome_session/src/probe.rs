//! Element geometry and visibility probes.
//!
//! Probes run a script in the page that serializes its findings with
//! `JSON.stringify`, then parse the returned string on the Rust side. The
//! selector is embedded as a JSON string literal so arbitrary selectors
//! cannot break out of the script.

use anyhow::{Result, anyhow};
use chromiumoxide::page::Page;
use serde::{Deserialize, Serialize};
use serde_json::{Value, from_str};

/// On-page rectangle of a rendered element, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Visibility verdict for a probed selector.
#[derive(Debug, Clone, PartialEq)]
pub enum Visibility {
    /// No node in the document matches the selector.
    Detached,
    /// A node matches but is not rendered: `display: none` on it or an
    /// ancestor, `visibility: hidden`, or no client rects at all.
    Hidden,
    /// A node matches and is rendered. The box may still be zero-sized.
    Visible(BoundingBox),
}

// ===== Probe scripts =====

/// Shared helpers injected ahead of each probe body. `sel` is defined by the
/// wrapper before these run.
const PROBE_HELPERS: &str = "
function rectOf(el) {
    var r = el.getBoundingClientRect();
    return { x: r.x, y: r.y, width: r.width, height: r.height };
}
function isRendered(el) {
    if (!el.getClientRects().length) return false;
    var cs = window.getComputedStyle(el);
    if (String(cs.display || '').toLowerCase() === 'none') return false;
    if (String(cs.visibility || '').toLowerCase() === 'hidden') return false;
    return true;
}";

const BOUNDING_BOX_BODY: &str = "
var el = document.querySelector(sel);
if (!el) { return JSON.stringify({ found: false }); }
if (!el.getClientRects().length) { return JSON.stringify({ found: true }); }
return JSON.stringify({ found: true, rect: rectOf(el) });";

const VISIBILITY_BODY: &str = "
var el = document.querySelector(sel);
if (!el) { return JSON.stringify({ state: 'detached' }); }
if (!isRendered(el)) { return JSON.stringify({ state: 'hidden' }); }
return JSON.stringify({ state: 'visible', rect: rectOf(el) });";

/// Quotes `text` as a JavaScript string literal.
pub(crate) fn js_string_literal(text: &str) -> String {
    Value::String(text.to_owned()).to_string()
}

fn bounding_box_script(selector: &str) -> String {
    let literal = js_string_literal(selector);
    format!("(function() {{ var sel = {literal}; {PROBE_HELPERS} {BOUNDING_BOX_BODY} }})()")
}

fn visibility_script(selector: &str) -> String {
    let literal = js_string_literal(selector);
    format!("(function() {{ var sel = {literal}; {PROBE_HELPERS} {VISIBILITY_BODY} }})()")
}

// ===== Payload parsing =====

#[derive(Deserialize)]
struct BoxPayload {
    found: bool,
    rect: Option<BoundingBox>,
}

#[derive(Deserialize)]
struct VisibilityPayload {
    state: String,
    rect: Option<BoundingBox>,
}

fn classify_box(payload: &BoxPayload) -> Option<BoundingBox> {
    if payload.found { payload.rect } else { None }
}

fn classify_visibility(payload: VisibilityPayload) -> Result<Visibility> {
    match payload.state.as_str() {
        "detached" => Ok(Visibility::Detached),
        "hidden" => Ok(Visibility::Hidden),
        "visible" => {
            let rect = payload
                .rect
                .ok_or_else(|| anyhow!("Visibility probe returned visible without a rect"))?;
            Ok(Visibility::Visible(rect))
        }
        other => Err(anyhow!("Visibility probe returned unknown state: {other}")),
    }
}

async fn eval_payload<T: for<'de> Deserialize<'de>>(page: &Page, script: String) -> Result<T> {
    let result = page.evaluate(script).await?;
    let value = result
        .value()
        .ok_or_else(|| anyhow!("Probe script returned no value"))?;
    let json_text = value
        .as_str()
        .ok_or_else(|| anyhow!("Probe script returned non-string JSON"))?;
    Ok(from_str(json_text)?)
}

// ===== Public probes =====

/// Queries the bounding box of the first node matching `selector`.
///
/// Returns `None` when no node matches or the matching node has no client
/// rects, so callers can treat "not attached" and "not rendered" uniformly.
///
/// # Errors
///
/// Returns an error if evaluation fails or the payload is malformed.
pub async fn bounding_box(page: &Page, selector: &str) -> Result<Option<BoundingBox>> {
    let payload: BoxPayload = eval_payload(page, bounding_box_script(selector)).await?;
    Ok(classify_box(&payload))
}

/// Classifies the first node matching `selector` as detached, hidden, or
/// visible with its current bounding box.
///
/// # Errors
///
/// Returns an error if evaluation fails or the payload is malformed.
pub async fn visibility(page: &Page, selector: &str) -> Result<Visibility> {
    let payload: VisibilityPayload = eval_payload(page, visibility_script(selector)).await?;
    classify_visibility(payload)
}

// ===== Tests =====
