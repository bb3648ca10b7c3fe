use block_contract::BlockId;
use grid_layout::{Cell, PLACEHOLDER_ROWS};
use leptos::*;

use super::{
    block_body::{summarize, BlockBodyView},
    is_primary_press, pointer_from_pointer_event,
};
use crate::{
    reducer::DashboardAction, runtime_context::use_dashboard_runtime, surface::CellView,
};

fn grid_placement_style(cell: Cell) -> String {
    format!("grid-row:{};grid-column:{};", cell.row + 1, cell.col + 1)
}

#[component]
pub(super) fn DashboardGrid() -> impl IntoView {
    let runtime = use_dashboard_runtime();
    let state = runtime.state;
    let columns = move || state.with(|s| s.surface.grid().columns());
    let cells = move || state.with(|s| s.surface.cells(PLACEHOLDER_ROWS));

    view! {
        <section
            class="dashboard-grid"
            style=move || format!("grid-template-columns:repeat({}, minmax(0, 1fr));", columns())
            on:pointerleave=move |_| {
                if state.with_untracked(|s| s.surface.hover_target().is_some()) {
                    runtime.dispatch_action(DashboardAction::HoverCell { cell: None });
                }
            }
        >
            <For each=cells key=|cell_view| cell_view.clone() let:cell_view>
                {match cell_view {
                    CellView::Card { block_id, cell } => {
                        view! { <BlockCard block_id=block_id cell=cell /> }.into_view()
                    }
                    CellView::Placeholder { cell, .. } => {
                        view! { <DropZone cell=cell origin=true /> }.into_view()
                    }
                    CellView::DropZone(cell) => {
                        view! { <DropZone cell=cell origin=false /> }.into_view()
                    }
                }}
            </For>
        </section>
    }
}

#[component]
fn DropZone(cell: Cell, origin: bool) -> impl IntoView {
    let runtime = use_dashboard_runtime();
    let hovered = move || runtime.state.with(|s| s.surface.hover_target() == Some(cell));

    view! {
        <div
            class="drop-zone"
            class:drop-zone-origin=origin
            class:drop-zone-hovered=hovered
            style=grid_placement_style(cell)
            data-grid-row=cell.row
            data-grid-col=cell.col
        ></div>
    }
}

#[component]
fn BlockCard(block_id: BlockId, cell: Cell) -> impl IntoView {
    let runtime = use_dashboard_runtime();
    let state = runtime.state;

    let title = {
        let block_id = block_id.clone();
        move || state.with(|s| s.title_of(&block_id))
    };
    let code = {
        let block_id = block_id.clone();
        move || {
            state.with(|s| {
                s.descriptor(&block_id)
                    .map(|descriptor| descriptor.code.clone())
                    .unwrap_or_default()
            })
        }
    };
    let status = {
        let block_id = block_id.clone();
        create_memo(move |_| state.with(|s| s.status(&block_id)))
    };
    let hovered = move || state.with(|s| s.surface.hover_target() == Some(cell));

    let press_block = block_id.clone();
    let begin_press = move |ev: web_sys::PointerEvent| {
        if !is_primary_press(&ev) {
            return;
        }
        ev.prevent_default();
        runtime.dispatch_action(DashboardAction::PointerDown {
            block_id: press_block.clone(),
            pointer: pointer_from_pointer_event(&ev),
        });
    };
    let refresh_block = block_id.clone();
    let refresh = move |_| {
        runtime.dispatch_action(DashboardAction::RefreshRequested {
            block_id: refresh_block.clone(),
        })
    };
    let body_block = block_id.clone();

    view! {
        <article
            class="block-card"
            class:block-card-hovered=hovered
            class:block-card-error=move || status.with(|s| s.has_error())
            style=grid_placement_style(cell)
            data-grid-row=cell.row
            data-grid-col=cell.col
            data-block-id=block_id.to_string()
        >
            <header class="block-card-header" on:pointerdown=begin_press>
                <span class="block-card-title">{title}</span>
                <span class="block-card-code">{code}</span>
                <span
                    class="block-card-status"
                    class:in-flight=move || status.with(|s| s.in_flight)
                    title=move || status.with(|s| s.error.clone().unwrap_or_default())
                    aria-hidden="true"
                ></span>
                <button
                    class="block-card-refresh"
                    aria-label="Refresh block"
                    on:pointerdown=move |ev: web_sys::PointerEvent| ev.stop_propagation()
                    on:click=refresh
                >
                    "↻"
                </button>
            </header>
            <div class="block-card-body">
                {move || {
                    let body = status
                        .with(|s| summarize(body_block.as_str(), s.data.as_ref()));
                    view! { <BlockBodyView body=body /> }
                }}
            </div>
            <Show when=move || status.with(|s| s.has_error()) fallback=|| ()>
                <p class="block-card-error-text">
                    {move || status.with(|s| s.error.clone().unwrap_or_default())}
                </p>
            </Show>
        </article>
    }
}

#[component]
pub(super) fn DragGhost() -> impl IntoView {
    let runtime = use_dashboard_runtime();
    let state = runtime.state;
    let ghost = move || {
        state.with(|s| {
            let block_id = s.surface.dragging()?;
            let pointer = s.surface.drag_pointer()?;
            Some((s.title_of(block_id), pointer))
        })
    };

    view! {
        {move || {
            ghost()
                .map(|(title, pointer)| {
                    view! {
                        <div
                            class="block-card block-card-ghost"
                            style=format!(
                                "position:fixed;left:{}px;top:{}px;pointer-events:none;",
                                pointer.x + 8,
                                pointer.y + 8
                            )
                            aria-hidden="true"
                        >
                            <span class="block-card-title">{title}</span>
                        </div>
                    }
                })
        }}
    }
}
