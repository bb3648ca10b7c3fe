//! Drains the reducer's effect queue into the host.

use leptos::*;

use crate::runtime_context::DashboardRuntimeContext;

/// Installs the executor. Effects run in the order the reducer emitted them; effects that
/// dispatch while the batch runs land in a fresh queue and trigger the next pass.
pub fn install(runtime: DashboardRuntimeContext) {
    create_effect(move |_| {
        if runtime.effects.with(Vec::is_empty) {
            return;
        }
        let batch = runtime
            .effects
            .try_update(std::mem::take)
            .unwrap_or_default();

        let host = runtime.host.get_value();
        for effect in batch {
            host.run_runtime_effect(runtime, effect);
        }
    });
}
