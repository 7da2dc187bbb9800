//! Headless Chrome plumbing for layout verification.
//!
//! This crate provides:
//! - [`ChromeSession`]: discovery, launch, and teardown of a headless
//!   Chrome instance together with its CDP event handler task
//! - [`DeviceProfile`]: mobile device emulation applied over CDP
//! - [`probe`]: element geometry and tri-state visibility queries
//! - [`wait`]: bounded polling primitives that replace fixed sleeps
//! - [`screenshot`]: full-page PNG capture and validated writes

pub mod device;
pub mod launch;
pub mod nav;
pub mod probe;
pub mod screenshot;
pub mod wait;

pub use device::DeviceProfile;
pub use launch::ChromeSession;
pub use probe::{BoundingBox, Visibility};
