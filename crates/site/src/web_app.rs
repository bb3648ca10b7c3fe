use dashboard_runtime::{DashboardProvider, DashboardShell};
use leptos::*;
use leptos_meta::*;

#[component]
pub fn SiteApp() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text="Bubble" />
        <Meta name="description" content="Always-on-top dashboard of live information blocks." />
        <main class="site-root" data-host=platform_host_web::host_strategy_name()>
            <DashboardEntry />
        </main>
    }
}

#[component]
pub fn DashboardEntry() -> impl IntoView {
    view! {
        <DashboardProvider>
            <DashboardShell />
        </DashboardProvider>
    }
}
