//! Host strategy model shared by the browser and desktop compositions.

/// Host composition selected for the current build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStrategy {
    /// Browser front end talking to the dashboard server.
    Browser,
    /// Frameless Tauri desktop window.
    DesktopTauri,
    /// Desktop composition with in-memory adapters, for UI work without a native shell.
    DesktopStub,
}

impl HostStrategy {
    /// Returns a stable string token for diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::DesktopTauri => "desktop-tauri",
            Self::DesktopStub => "desktop-stub",
        }
    }

    /// Whether block data is pushed by the host rather than polled by the runtime.
    pub const fn pushes_updates(self) -> bool {
        matches!(self, Self::Browser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_browser_strategy_is_push_driven() {
        assert!(HostStrategy::Browser.pushes_updates());
        assert!(!HostStrategy::DesktopTauri.pushes_updates());
        assert_eq!(HostStrategy::DesktopStub.as_str(), "desktop-stub");
    }
}
