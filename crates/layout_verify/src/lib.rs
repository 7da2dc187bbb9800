//! Layout verification for the word-game page.
//!
//! Drives headless Chrome through the page's two screens under a mobile
//! landscape profile and records what it finds:
//! - [`verify_core`]: the start-screen / game-screen scenario itself
//! - [`report`]: the structured pass/fail record behind the printed
//!   transcript

pub mod report;
pub mod verify_core;

pub use report::{Check, CheckOutcome, VerifyReport};
pub use verify_core::{RunOptions, run};
