//! Dashboard shell UI composition and pointer wiring.

mod block_body;
mod grid;
mod sidebar;

use grid_layout::Cell;
use leptos::*;

use self::{
    grid::{DashboardGrid, DragGhost},
    sidebar::BlockSidebar,
};
use crate::{
    reducer::DashboardAction,
    runtime_context::{use_dashboard_runtime, DashboardRuntimeContext},
    surface::PointerPosition,
};

pub use crate::runtime_context::DashboardProvider;

#[component]
/// Frameless dashboard window: title bar, block toggles, and the block grid.
pub fn DashboardShell() -> impl IntoView {
    let runtime = use_dashboard_runtime();
    let state = runtime.state;

    let escape_listener = window_event_listener(ev::keydown, move |ev| {
        if ev.default_prevented() || ev.key() != "Escape" {
            return;
        }
        if state.with_untracked(|s| s.surface.is_busy()) {
            ev.prevent_default();
            runtime.dispatch_action(DashboardAction::CancelDrag);
        }
    });
    on_cleanup(move || escape_listener.remove());

    let on_pointer_move = move |ev: web_sys::PointerEvent| track_pointer(runtime, &ev);
    let on_pointer_up = move |_| {
        if state.with_untracked(|s| s.surface.is_busy()) {
            runtime.dispatch_action(DashboardAction::PointerUp);
        }
    };
    let on_pointer_cancel = move |_| runtime.dispatch_action(DashboardAction::CancelDrag);

    view! {
        <div
            id="dashboard-shell-root"
            class="dashboard-shell"
            class:dragging=move || state.with(|s| s.surface.dragging().is_some())
            class:booting=move || !state.with(|s| s.booted)
            data-host=runtime.host.get_value().host_strategy_name()
            style=move || shell_opacity_style(state.with(|s| s.config.window.opacity))
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_up
            on:pointercancel=on_pointer_cancel
        >
            <TitleBar />
            <div class="dashboard-body">
                <BlockSidebar />
                <DashboardGrid />
            </div>
            <DragGhost />
        </div>
    }
}

#[component]
fn TitleBar() -> impl IntoView {
    let runtime = use_dashboard_runtime();
    let host = runtime.host.get_value();
    let closable = host.strategy() == platform_host::HostStrategy::DesktopTauri;
    let active = move || {
        runtime
            .state
            .with(|s| s.config.enabled_blocks().len())
    };
    let close = move |_| {
        spawn_local(async {
            if let Err(err) = platform_host_web::close_desktop_window().await {
                logging::warn!("close dashboard window failed: {err}");
            }
        });
    };

    view! {
        <header class="dashboard-titlebar" data-tauri-drag-region="true">
            <span class="dashboard-title" data-tauri-drag-region="true">"BUBBLE"</span>
            <span class="dashboard-subtitle" data-tauri-drag-region="true">
                {move || format!("{} active", active())}
            </span>
            <span class="dashboard-host-badge">{host.host_strategy_name()}</span>
            <Show when=move || closable fallback=|| ()>
                <button
                    class="dashboard-close"
                    aria-label="Close dashboard"
                    on:pointerdown=move |ev: web_sys::PointerEvent| ev.stop_propagation()
                    on:click=close
                >
                    "×"
                </button>
            </Show>
        </header>
    }
}

/// Window opacity is applied to the shell background; clamped so a bad value never hides it.
fn shell_opacity_style(opacity: f64) -> String {
    let opacity = if opacity.is_finite() {
        opacity.clamp(0.2, 1.0)
    } else {
        1.0
    };
    format!("--dashboard-opacity:{opacity:.2};")
}

fn pointer_from_pointer_event(ev: &web_sys::PointerEvent) -> PointerPosition {
    PointerPosition {
        x: ev.client_x(),
        y: ev.client_y(),
    }
}

/// Accepts the primary button of a mouse and the primary contact of touch or pen input.
fn is_primary_press(ev: &web_sys::PointerEvent) -> bool {
    if ev.pointer_type() == "mouse" {
        ev.button() == 0
    } else {
        ev.is_primary()
    }
}

fn track_pointer(runtime: DashboardRuntimeContext, ev: &web_sys::PointerEvent) {
    let state = runtime.state;
    if !state.with_untracked(|s| s.surface.is_busy()) {
        return;
    }
    runtime.dispatch_action(DashboardAction::PointerMove {
        pointer: pointer_from_pointer_event(ev),
    });

    let (dragging, hovered) = state.with_untracked(|s| {
        (s.surface.dragging().is_some(), s.surface.hover_target())
    });
    if !dragging {
        return;
    }
    let cell = cell_under_pointer(ev);
    if cell != hovered {
        runtime.dispatch_action(DashboardAction::HoverCell { cell });
    }
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn parse_cell_attrs(row: Option<&str>, col: Option<&str>) -> Option<Cell> {
    Some(Cell::new(row?.parse().ok()?, col?.parse().ok()?))
}

/// The cell under the pointer coordinates wins over the cell of the event target.
///
/// Touch and pen pointers stay implicitly captured by the pressed header, so their event target
/// never changes while the finger moves.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn pick_hover_cell(at_point: Option<Cell>, at_target: Option<Cell>) -> Option<Cell> {
    at_point.or(at_target)
}

#[cfg(target_arch = "wasm32")]
fn cell_of_element(element: &web_sys::Element) -> Option<Cell> {
    let cell = element.closest("[data-grid-row]").ok()??;
    parse_cell_attrs(
        cell.get_attribute("data-grid-row").as_deref(),
        cell.get_attribute("data-grid-col").as_deref(),
    )
}

#[cfg(target_arch = "wasm32")]
fn cell_under_pointer(ev: &web_sys::PointerEvent) -> Option<Cell> {
    use wasm_bindgen::JsCast;

    let at_point = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| {
            document.element_from_point(ev.client_x() as f32, ev.client_y() as f32)
        })
        .and_then(|element| cell_of_element(&element));
    let at_target = ev
        .target()
        .and_then(|target| target.dyn_into::<web_sys::Element>().ok())
        .and_then(|element| cell_of_element(&element));
    pick_hover_cell(at_point, at_target)
}

#[cfg(not(target_arch = "wasm32"))]
fn cell_under_pointer(_: &web_sys::PointerEvent) -> Option<Cell> {
    None
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn cell_attrs_parse_into_cells() {
        assert_eq!(parse_cell_attrs(Some("2"), Some("1")), Some(Cell::new(2, 1)));
        assert_eq!(parse_cell_attrs(Some("x"), Some("1")), None);
        assert_eq!(parse_cell_attrs(None, Some("1")), None);
    }

    #[test]
    fn hover_prefers_cell_under_pointer_over_captured_target() {
        let origin = Some(Cell::new(0, 0));
        let under_finger = Some(Cell::new(1, 2));
        assert_eq!(pick_hover_cell(under_finger, origin), under_finger);
        assert_eq!(pick_hover_cell(None, origin), origin);
        assert_eq!(pick_hover_cell(None, None), None);
    }

    #[test]
    fn shell_opacity_is_clamped() {
        assert_eq!(shell_opacity_style(0.95), "--dashboard-opacity:0.95;");
        assert_eq!(shell_opacity_style(0.0), "--dashboard-opacity:0.20;");
        assert_eq!(shell_opacity_style(f64::NAN), "--dashboard-opacity:1.00;");
    }
}
