use leptos::{logging, spawn_local, SignalGetUntracked};

use crate::{host::DashboardHostContext, runtime_context::DashboardRuntimeContext};

pub(super) fn persist_config(host: DashboardHostContext, runtime: DashboardRuntimeContext) {
    let config = runtime.state.get_untracked().config;
    spawn_local(async move {
        if let Err(err) = host.layout_store().save_layout(&config).await {
            logging::warn!("persist dashboard config failed: {err}");
        }
    });
}
