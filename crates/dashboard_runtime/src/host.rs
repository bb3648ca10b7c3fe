//! Host-side runtime helpers that execute reducer effects against the injected platform services.
//!
//! The reducer stays pure; everything that touches storage, the block feed, or timers lives
//! behind [`DashboardHostContext`].

mod boot;
mod persistence_effects;
mod polling;

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use block_contract::BlockId;
use leptos::{logging, Callback, IntervalHandle};
use platform_host::{BlockFeed, HostStrategy, LayoutStore};
use platform_host_web::{block_feed, layout_store, selected_host_strategy};

use crate::{
    reducer::{DashboardAction, RuntimeEffect},
    runtime_context::DashboardRuntimeContext,
};

#[derive(Clone)]
/// Host service bundle for dashboard runtime side effects.
pub struct DashboardHostContext {
    layout: Rc<dyn LayoutStore>,
    feed: Rc<dyn BlockFeed>,
    strategy: HostStrategy,
    push_active: Rc<Cell<bool>>,
    pollers: Rc<RefCell<HashMap<BlockId, IntervalHandle>>>,
}

impl Default for DashboardHostContext {
    fn default() -> Self {
        Self::new(
            Rc::new(layout_store()),
            Rc::new(block_feed()),
            selected_host_strategy(),
        )
    }
}

impl DashboardHostContext {
    /// Creates a host context from explicit services.
    pub fn new(
        layout: Rc<dyn LayoutStore>,
        feed: Rc<dyn BlockFeed>,
        strategy: HostStrategy,
    ) -> Self {
        Self {
            layout,
            feed,
            strategy,
            push_active: Rc::new(Cell::new(false)),
            pollers: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Returns the configured configuration store.
    pub fn layout_store(&self) -> Rc<dyn LayoutStore> {
        self.layout.clone()
    }

    /// Returns the configured block feed.
    pub fn block_feed(&self) -> Rc<dyn BlockFeed> {
        self.feed.clone()
    }

    /// Returns the host strategy this context was built for.
    pub fn strategy(&self) -> HostStrategy {
        self.strategy
    }

    /// Returns the stable name of the host strategy.
    pub fn host_strategy_name(&self) -> &'static str {
        self.strategy.as_str()
    }

    /// Whether the feed pushes refreshes, making interval polling unnecessary.
    pub fn push_active(&self) -> bool {
        self.push_active.get()
    }

    pub(crate) fn set_push_active(&self, active: bool) {
        self.push_active.set(active);
    }

    /// Installs the asynchronous boot sequence: catalog, push channel, then configuration.
    pub fn install_boot_hydration(&self, dispatch: Callback<DashboardAction>) {
        boot::install_boot_hydration(self.clone(), dispatch);
    }

    /// Executes a single [`RuntimeEffect`] emitted by the reducer.
    pub fn run_runtime_effect(&self, runtime: DashboardRuntimeContext, effect: RuntimeEffect) {
        match effect {
            RuntimeEffect::PersistConfig => {
                persistence_effects::persist_config(self.clone(), runtime)
            }
            RuntimeEffect::FetchBlock(block_id) => {
                polling::fetch_block(self.clone(), runtime, block_id)
            }
            RuntimeEffect::StartPolling(block_id) => {
                polling::start_polling(self, runtime, block_id)
            }
            RuntimeEffect::StopPolling(block_id) => polling::stop_polling(self, &block_id),
            RuntimeEffect::ReportLayoutFault(err) => {
                logging::warn!("grid layout fault, kept last-known-good layout: {err}")
            }
        }
    }
}
