//! Runtime provider and context wiring for the dashboard shell.
//!
//! This module owns the long-lived reducer container, the runtime effect queue, and host
//! bootstrap wiring. UI composition stays in [`crate::components`].

use leptos::*;

use crate::{
    effect_executor,
    host::DashboardHostContext,
    model::DashboardState,
    reducer::{reduce_dashboard, DashboardAction, RuntimeEffect},
};

#[derive(Clone, Copy)]
/// Leptos context for reading dashboard state and dispatching [`DashboardAction`] values.
pub struct DashboardRuntimeContext {
    /// Host service bundle for executing runtime side effects.
    pub host: StoredValue<DashboardHostContext>,
    /// Reactive dashboard state signal.
    pub state: RwSignal<DashboardState>,
    /// Queue of runtime effects emitted by the reducer and processed by the executor.
    pub effects: RwSignal<Vec<RuntimeEffect>>,
    /// Reducer dispatch callback.
    pub dispatch: Callback<DashboardAction>,
}

impl DashboardRuntimeContext {
    /// Dispatches a reducer action through the runtime context callback.
    pub fn dispatch_action(&self, action: DashboardAction) {
        self.dispatch.call(action);
    }
}

fn install_runtime_orchestration(runtime: DashboardRuntimeContext) {
    runtime
        .host
        .get_value()
        .install_boot_hydration(runtime.dispatch);
    effect_executor::install(runtime);
}

#[component]
/// Provides [`DashboardRuntimeContext`] to descendant components and boots persisted state.
pub fn DashboardProvider(
    /// Host bundle; defaults to the adapters selected at compile time.
    #[prop(optional)]
    host: Option<DashboardHostContext>,
    children: Children,
) -> impl IntoView {
    let host = store_value(host.unwrap_or_default());
    let state = create_rw_signal(DashboardState::default());
    let effects = create_rw_signal(Vec::<RuntimeEffect>::new());

    let dispatch = Callback::new(move |action: DashboardAction| {
        let mut dashboard = state.get_untracked();
        let previous = dashboard.clone();

        match reduce_dashboard(&mut dashboard, action) {
            Ok(new_effects) => {
                if dashboard != previous {
                    state.set(dashboard);
                }
                if !new_effects.is_empty() {
                    effects.update(|queue| queue.extend(new_effects));
                }
            }
            Err(err) => logging::warn!("dashboard reducer error: {err}"),
        }
    });

    let runtime = DashboardRuntimeContext {
        host,
        state,
        effects,
        dispatch,
    };

    provide_context(runtime);

    install_runtime_orchestration(runtime);

    children().into_view()
}

/// Returns the current [`DashboardRuntimeContext`].
///
/// # Panics
///
/// Panics if called outside [`DashboardProvider`].
pub fn use_dashboard_runtime() -> DashboardRuntimeContext {
    use_context::<DashboardRuntimeContext>().expect("DashboardRuntimeContext not provided")
}
