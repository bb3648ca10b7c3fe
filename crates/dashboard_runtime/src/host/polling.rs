use std::time::Duration;

use block_contract::BlockId;
use leptos::{logging, set_interval_with_handle, spawn_local, Callable, SignalGetUntracked};
use platform_host::unix_time_ms_now;

use crate::{
    host::DashboardHostContext, reducer::DashboardAction, runtime_context::DashboardRuntimeContext,
};

/// Cadence for blocks whose descriptor has not arrived.
const FALLBACK_REFRESH_SECS: u64 = 60;

pub(super) fn start_polling(
    host: &DashboardHostContext,
    runtime: DashboardRuntimeContext,
    block_id: BlockId,
) {
    stop_polling(host, &block_id);
    runtime.dispatch_action(DashboardAction::RefreshRequested {
        block_id: block_id.clone(),
    });
    if host.push_active() {
        return;
    }

    let refresh_secs = runtime
        .state
        .get_untracked()
        .descriptor(&block_id)
        .map_or(FALLBACK_REFRESH_SECS, |descriptor| descriptor.refresh_secs);
    let dispatch = runtime.dispatch;
    let tick_block = block_id.clone();
    match set_interval_with_handle(
        move || {
            dispatch.call(DashboardAction::RefreshRequested {
                block_id: tick_block.clone(),
            })
        },
        Duration::from_secs(refresh_secs.max(1)),
    ) {
        Ok(handle) => {
            host.pollers.borrow_mut().insert(block_id, handle);
        }
        Err(err) => logging::warn!("schedule refresh for `{block_id}` failed: {err:?}"),
    }
}

pub(super) fn stop_polling(host: &DashboardHostContext, block_id: &BlockId) {
    if let Some(handle) = host.pollers.borrow_mut().remove(block_id) {
        handle.clear();
    }
}

pub(super) fn fetch_block(
    host: DashboardHostContext,
    runtime: DashboardRuntimeContext,
    block_id: BlockId,
) {
    spawn_local(async move {
        let fetched = host.block_feed().fetch_block(&block_id).await;
        let action = match fetched {
            Ok(response) => match response.into_result() {
                Ok(data) => DashboardAction::BlockDataReceived {
                    block_id,
                    data,
                    at_ms: unix_time_ms_now(),
                },
                Err(error) => DashboardAction::BlockFetchFailed { block_id, error },
            },
            Err(err) => {
                logging::warn!("fetch block `{block_id}` failed: {err}");
                DashboardAction::BlockFetchFailed {
                    block_id,
                    error: err,
                }
            }
        };
        runtime.dispatch_action(action);
    });
}
