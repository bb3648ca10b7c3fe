//! Native window control for the frameless desktop host.

/// Asks the desktop host to write back the window geometry and close the window.
///
/// # Errors
///
/// Returns an error outside the Tauri host or when the command fails.
pub async fn close_desktop_window() -> Result<(), String> {
    crate::bridge::tauri_window_close().await
}
