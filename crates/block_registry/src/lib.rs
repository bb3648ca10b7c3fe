//! The built-in block catalog shared by the native hosts.
//!
//! Registration order is the catalog order shown in the dashboard sidebar.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use block_contract::{BlockRegistry, RegistryError};

/// Builds a registry holding every built-in block type.
///
/// # Errors
///
/// Returns [`RegistryError::Duplicate`] if two built-in blocks share an id.
pub fn builtin_registry() -> Result<BlockRegistry, RegistryError> {
    let mut registry = BlockRegistry::new();
    registry.register(
        dashboard_block_clock::descriptor(),
        dashboard_block_clock::build,
    )?;
    registry.register(
        dashboard_block_emails::descriptor(),
        dashboard_block_emails::build,
    )?;
    registry.register(
        dashboard_block_jobs::descriptor(),
        dashboard_block_jobs::build,
    )?;
    registry.register(
        dashboard_block_movies::descriptor(),
        dashboard_block_movies::build,
    )?;
    registry.register(
        dashboard_block_weather::descriptor(),
        dashboard_block_weather::build,
    )?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use block_contract::{BlockId, BlockSettings};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn builtin_catalog_lists_blocks_in_registration_order() {
        let registry = builtin_registry().expect("builtin registry");
        let ids: Vec<String> = registry
            .descriptors()
            .into_iter()
            .map(|descriptor| descriptor.id.to_string())
            .collect();

        assert_eq!(ids, vec!["clock", "emails", "jobs", "movies", "weather"]);
    }

    #[test]
    fn descriptor_codes_and_intervals_match_block_crates() {
        let registry = builtin_registry().expect("builtin registry");
        let weather = registry
            .descriptor(&BlockId::trusted("weather"))
            .expect("weather registered");

        assert_eq!(weather.code, "WTH-05");
        assert_eq!(weather.refresh_secs, 600);
    }

    #[test]
    fn build_returns_source_for_known_block_only() {
        let registry = builtin_registry().expect("builtin registry");
        let settings = BlockSettings::default();

        let clock = registry
            .build(&BlockId::trusted("clock"), &settings)
            .expect("clock source");
        assert_eq!(clock.descriptor().id, BlockId::trusted("clock"));
        assert!(registry
            .build(&BlockId::trusted("stocks"), &settings)
            .is_none());
    }
}
