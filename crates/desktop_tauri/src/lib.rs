//! Tauri desktop host for the bubble dashboard.
//!
//! The window is frameless and stays on top. The dashboard front end talks to this process
//! through four commands (configuration load/save, block catalog, block fetch) plus a close
//! command that writes the window geometry back to the configuration document.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod commands;
#[doc(hidden)]
pub mod config_store;

use tauri::{Manager, PhysicalPosition, PhysicalSize, WindowEvent};
use tracing_subscriber::EnvFilter;

use crate::{
    commands::DashboardHost,
    config_store::{ConfigFileStore, WindowGeometry},
};

const MAIN_WINDOW: &str = "main";

/// Converts physical outer geometry to logical pixels for the configuration document.
pub(crate) fn logical_geometry(
    position: PhysicalPosition<i32>,
    size: PhysicalSize<u32>,
    scale_factor: f64,
) -> WindowGeometry {
    let position = position.to_logical::<i32>(scale_factor);
    let size = size.to_logical::<u32>(scale_factor);
    WindowGeometry {
        x: position.x,
        y: position.y,
        width: size.width,
        height: size.height,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn setup(app: &mut tauri::App) -> Result<(), Box<dyn std::error::Error>> {
    let registry = block_registry::builtin_registry()?;
    let store = ConfigFileStore::from_app(app.handle())?;
    let config = store.load_or_create()?;
    tracing::info!(path = %store.path().display(), "loaded dashboard config");

    if let Some(window) = app.get_webview_window(MAIN_WINDOW) {
        let prefs = &config.window;
        let placed = window
            .set_position(tauri::LogicalPosition::new(prefs.x, prefs.y))
            .and_then(|()| {
                window.set_size(tauri::LogicalSize::new(prefs.width, prefs.height))
            })
            .and_then(|()| window.set_always_on_top(prefs.always_on_top));
        if let Err(err) = placed {
            tracing::warn!(error = %err, "failed to apply window preferences");
        }
    }

    app.manage(DashboardHost::new(registry, store, config));
    Ok(())
}

fn on_window_event(window: &tauri::Window, event: &WindowEvent) {
    if !matches!(event, WindowEvent::CloseRequested { .. }) {
        return;
    }
    let (Ok(position), Ok(size), Ok(scale)) = (
        window.outer_position(),
        window.outer_size(),
        window.scale_factor(),
    ) else {
        return;
    };
    let Some(host) = window.try_state::<DashboardHost>() else {
        return;
    };
    if let Err(err) = host.record_geometry(logical_geometry(position, size, scale)) {
        tracing::warn!(error = %err, "failed to save window geometry");
    }
}

/// Starts the Tauri desktop host process.
pub fn run() {
    init_tracing();
    tauri::Builder::default()
        .setup(setup)
        .on_window_event(on_window_event)
        .invoke_handler(tauri::generate_handler![
            commands::dashboard_config_load,
            commands::dashboard_config_save,
            commands::block_catalog,
            commands::block_fetch,
            commands::dashboard_window_close
        ])
        .run(tauri::generate_context!())
        .expect("desktop_tauri failed to run Tauri application");
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn geometry_is_recorded_in_logical_pixels() {
        let geometry = logical_geometry(
            PhysicalPosition::new(100, 60),
            PhysicalSize::new(2200, 1400),
            2.0,
        );
        assert_eq!(
            geometry,
            WindowGeometry {
                x: 50,
                y: 30,
                width: 1100,
                height: 700,
            }
        );
    }
}
