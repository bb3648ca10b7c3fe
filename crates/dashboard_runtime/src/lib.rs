//! Reactive runtime for the bubble dashboard.
//!
//! [`surface::DashboardSurface`] drives the drag-and-drop grid from pointer input,
//! [`reducer::reduce_dashboard`] owns every state transition, and the host layer executes the
//! resulting [`reducer::RuntimeEffect`] values (persistence, fetches, polling) against the
//! services injected through [`DashboardProvider`].

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod components;
mod effect_executor;
pub mod host;
pub mod model;
pub mod reducer;
mod runtime_context;
pub mod surface;

pub use components::{DashboardProvider, DashboardShell};
pub use host::DashboardHostContext;
pub use model::{BlockStatus, DashboardState};
pub use reducer::{reduce_dashboard, DashboardAction, ReducerError, RuntimeEffect};
pub use runtime_context::{use_dashboard_runtime, DashboardRuntimeContext};
pub use surface::{CellView, DashboardSurface, PointerPosition, SurfaceEffect, DRAG_THRESHOLD_PX};
