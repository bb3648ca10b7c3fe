//! `trunk` entry point for the dashboard front end.

#[cfg(all(target_arch = "wasm32", feature = "csr"))]
fn main() {
    site::mount();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!(
        "site_app only runs in the browser: use `trunk serve` in crates/site, start `dashboard_server` for block data, or launch `desktop_tauri` for the desktop window."
    );
}
