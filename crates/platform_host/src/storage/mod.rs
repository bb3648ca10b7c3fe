//! Persistence contracts for the dashboard configuration.

pub mod layout;
