//! Mobile device emulation over CDP.

use anyhow::{Result, anyhow};
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetDeviceMetricsOverrideParams, SetTouchEmulationEnabledParams,
};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::page::Page;
use log::debug;

/// An emulated device: viewport, screen, scale factor, touch, and user agent.
///
/// Presets mirror real hardware; [`DeviceProfile::with_dimensions`] rotates
/// or resizes a preset while keeping viewport and screen in lockstep.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceProfile {
    pub name: &'static str,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub screen_width: u32,
    pub screen_height: u32,
    pub device_scale_factor: f64,
    pub mobile: bool,
    pub has_touch: bool,
    pub user_agent: &'static str,
}

impl DeviceProfile {
    /// iPhone 12 Pro in portrait orientation.
    #[must_use]
    pub const fn iphone_12_pro() -> Self {
        Self {
            name: "iPhone 12 Pro",
            viewport_width: 390,
            viewport_height: 844,
            screen_width: 390,
            screen_height: 844,
            device_scale_factor: 3.0,
            mobile: true,
            has_touch: true,
            user_agent: "Mozilla/5.0 (iPhone; CPU iPhone OS 14_4_2 like Mac OS X) \
                AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0.3 Mobile/15E148 \
                Safari/604.1",
        }
    }

    /// Overrides the profile's dimensions, e.g. to force landscape.
    ///
    /// Viewport and screen are both set to `width` x `height` so the page
    /// cannot observe a screen larger than its viewport.
    #[must_use]
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self.screen_width = width;
        self.screen_height = height;
        self
    }

    /// Applies the profile to `page`: device metrics, user agent, and touch.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the CDP override commands fail.
    pub async fn apply(&self, page: &Page) -> Result<()> {
        let metrics = SetDeviceMetricsOverrideParams::builder()
            .width(i64::from(self.viewport_width))
            .height(i64::from(self.viewport_height))
            .screen_width(i64::from(self.screen_width))
            .screen_height(i64::from(self.screen_height))
            .device_scale_factor(self.device_scale_factor)
            .mobile(self.mobile)
            .build()
            .map_err(|err| anyhow!("Failed to build device metrics override: {err}"))?;
        page.execute(metrics).await?;

        let user_agent = SetUserAgentOverrideParams::builder()
            .user_agent(self.user_agent)
            .build()
            .map_err(|err| anyhow!("Failed to build user agent override: {err}"))?;
        page.execute(user_agent).await?;

        let touch = SetTouchEmulationEnabledParams::builder()
            .enabled(self.has_touch)
            .max_touch_points(5)
            .build()
            .map_err(|err| anyhow!("Failed to build touch emulation params: {err}"))?;
        page.execute(touch).await?;

        debug!(
            "Applied device profile {} ({}x{} @ {}x scale)",
            self.name, self.viewport_width, self.viewport_height, self.device_scale_factor
        );
        Ok(())
    }
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::DeviceProfile;

    #[test]
    fn iphone_12_pro_is_portrait_mobile() {
        let profile = DeviceProfile::iphone_12_pro();
        assert_eq!(profile.viewport_width, 390);
        assert_eq!(profile.viewport_height, 844);
        assert_eq!(profile.screen_width, profile.viewport_width);
        assert_eq!(profile.screen_height, profile.viewport_height);
        assert!(profile.mobile);
        assert!(profile.has_touch);
        assert!(profile.user_agent.contains("iPhone"));
    }

    #[test]
    fn with_dimensions_keeps_viewport_and_screen_in_lockstep() {
        let profile = DeviceProfile::iphone_12_pro().with_dimensions(844, 390);
        assert_eq!(profile.viewport_width, 844);
        assert_eq!(profile.viewport_height, 390);
        assert_eq!(profile.screen_width, 844);
        assert_eq!(profile.screen_height, 390);
        // Everything else is untouched by a resize.
        assert_eq!(profile.device_scale_factor, 3.0);
        assert!(profile.mobile);
    }
}
