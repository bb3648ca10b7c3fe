use block_contract::BlockId;
use leptos::*;

use crate::{model::DashboardState, reducer::DashboardAction, runtime_context::use_dashboard_runtime};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ToggleRow {
    block_id: BlockId,
    title: String,
    code: String,
}

/// Catalog order when the catalog has loaded, otherwise the configured blocks.
fn toggle_rows(state: &DashboardState) -> Vec<ToggleRow> {
    if state.catalog.is_empty() {
        return state
            .config
            .blocks
            .iter()
            .map(|entry| ToggleRow {
                block_id: entry.id.clone(),
                title: entry.id.to_string(),
                code: String::new(),
            })
            .collect();
    }
    state
        .catalog
        .iter()
        .map(|descriptor| ToggleRow {
            block_id: descriptor.id.clone(),
            title: descriptor.title.clone(),
            code: descriptor.code.clone(),
        })
        .collect()
}

#[component]
pub(super) fn BlockSidebar() -> impl IntoView {
    let runtime = use_dashboard_runtime();
    let state = runtime.state;
    let rows = move || state.with(toggle_rows);

    view! {
        <nav class="dashboard-sidebar" aria-label="Blocks">
            <For each=rows key=|row| row.clone() let:row>
                {
                    let enabled_id = row.block_id.clone();
                    let toggle_id = row.block_id.clone();
                    let enabled = move || state.with(|s| s.is_enabled(&enabled_id));
                    view! {
                        <label class="dashboard-toggle">
                            <input
                                type="checkbox"
                                prop:checked=enabled
                                on:change=move |ev| {
                                    runtime.dispatch_action(DashboardAction::ToggleBlock {
                                        block_id: toggle_id.clone(),
                                        enabled: event_target_checked(&ev),
                                    });
                                }
                            />
                            <span class="dashboard-toggle-code">{row.code}</span>
                            <span class="dashboard-toggle-title">{row.title}</span>
                        </label>
                    }
                }
            </For>
        </nav>
    }
}
