use std::rc::Rc;

use block_contract::BlockUpdate;
use leptos::{create_effect, logging, spawn_local, Callable, Callback};
use platform_host::{load_layout_or_default, unix_time_ms_now, DashboardConfig, UpdateSink};

use crate::{host::DashboardHostContext, reducer::DashboardAction};

pub(super) fn install_boot_hydration(
    host: DashboardHostContext,
    dispatch: Callback<DashboardAction>,
) {
    create_effect(move |_| {
        let dispatch = dispatch;
        let host = host.clone();
        spawn_local(async move {
            // Catalog first: polling cadence is read from it when the config hydrates.
            match host.block_feed().catalog().await {
                Ok(catalog) => dispatch.call(DashboardAction::CatalogLoaded { catalog }),
                Err(err) => logging::warn!("block catalog load failed: {err}"),
            }

            let sink: UpdateSink = Rc::new(move |update: BlockUpdate| {
                dispatch.call(DashboardAction::BlockDataReceived {
                    block_id: update.block,
                    data: update.data,
                    at_ms: unix_time_ms_now(),
                });
            });
            match host.block_feed().subscribe(sink) {
                Ok(pushed) => host.set_push_active(pushed),
                Err(err) => {
                    logging::warn!("block update channel unavailable, polling instead: {err}")
                }
            }

            let config = match load_layout_or_default(host.layout_store().as_ref()).await {
                Ok(config) => config,
                Err(err) => {
                    logging::warn!("dashboard config load failed, using defaults: {err}");
                    DashboardConfig::default()
                }
            };
            dispatch.call(DashboardAction::HydrateConfig { config });
            dispatch.call(DashboardAction::BootComplete);
        });
    });
}
