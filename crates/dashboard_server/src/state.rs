use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError, TryLockError};

use block_contract::{BlockDescriptor, BlockId, BlockRegistry, BlockSource, FetchError};
use platform_host::DashboardConfig;
use serde_json::Value;
use thiserror::Error;

use crate::cache::BlockCache;
use crate::events::EventHub;

struct SourceSlot {
    source: Box<dyn BlockSource>,
    // Held for the duration of a fetch; one fetch per source at a time.
    fetch_lock: Mutex<()>,
}

/// Why a block payload could not be served.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// No registered block has this id.
    #[error("unknown block `{0}`")]
    Unknown(String),
    /// The block's source failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Result of one scheduled refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The payload was cached and broadcast.
    Updated,
    /// A fetch of the same source was still running; nothing was done.
    Busy,
    /// The source failed; the cached payload is untouched.
    Failed(FetchError),
    /// No source with that id.
    Unknown,
}

/// Shared server state: built sources, the cache and the push hub.
pub struct ServerState {
    registry: BlockRegistry,
    slots: BTreeMap<BlockId, SourceSlot>,
    cache: BlockCache,
    hub: EventHub,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("blocks", &self.slots.keys().collect::<Vec<_>>())
            .field("cache", &self.cache)
            .field("hub", &self.hub)
            .finish()
    }
}

impl ServerState {
    /// Builds one source per registered block using the settings in `config`.
    pub fn new(registry: BlockRegistry, config: &DashboardConfig) -> Self {
        let slots = registry
            .descriptors()
            .into_iter()
            .filter_map(|descriptor| {
                let settings = config.settings_for(&descriptor.id);
                let source = registry.build(&descriptor.id, &settings)?;
                Some((
                    descriptor.id,
                    SourceSlot {
                        source,
                        fetch_lock: Mutex::new(()),
                    },
                ))
            })
            .collect();
        Self {
            registry,
            slots,
            cache: BlockCache::new(),
            hub: EventHub::new(),
        }
    }

    /// Block catalog in registration order.
    pub fn catalog(&self) -> Vec<BlockDescriptor> {
        self.registry.descriptors()
    }

    /// Refresh interval of every source, in seconds.
    pub fn intervals(&self) -> Vec<(BlockId, u64)> {
        self.slots
            .iter()
            .map(|(id, slot)| (id.clone(), slot.source.descriptor().refresh_secs))
            .collect()
    }

    /// Payload cache.
    pub fn cache(&self) -> &BlockCache {
        &self.cache
    }

    /// Push hub.
    pub fn hub(&self) -> &EventHub {
        &self.hub
    }

    /// Cached payload for `raw_id`, fetching and caching it on a miss.
    ///
    /// A miss waits for a fetch already in flight and serves its result when it succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Unknown`] for ids with no source and [`LookupError::Fetch`] when
    /// the source fails.
    pub fn lookup(&self, raw_id: &str) -> Result<Value, LookupError> {
        let unknown = || LookupError::Unknown(raw_id.to_string());
        let id = BlockId::new(raw_id).map_err(|_| unknown())?;
        let slot = self.slots.get(&id).ok_or_else(unknown)?;
        if let Some(data) = self.cache.get(&id) {
            return Ok(data);
        }

        let _guard = slot.fetch_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(data) = self.cache.get(&id) {
            return Ok(data);
        }
        let data = slot.source.fetch()?;
        self.cache.insert(id, data.clone());
        Ok(data)
    }

    /// Fetches `id` unless a fetch is already running, then caches and broadcasts the result.
    pub fn refresh(&self, id: &BlockId) -> RefreshOutcome {
        let Some(slot) = self.slots.get(id) else {
            return RefreshOutcome::Unknown;
        };
        let _guard = match slot.fetch_lock.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return RefreshOutcome::Busy,
        };
        match slot.source.fetch() {
            Ok(data) => {
                self.cache.insert(id.clone(), data.clone());
                self.hub.broadcast(id, &data);
                RefreshOutcome::Updated
            }
            Err(err) => RefreshOutcome::Failed(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use block_contract::BlockSettings;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    struct Fixed(BlockDescriptor);

    impl BlockSource for Fixed {
        fn descriptor(&self) -> &BlockDescriptor {
            &self.0
        }

        fn fetch(&self) -> Result<Value, FetchError> {
            Ok(json!({"n": 1}))
        }
    }

    struct Broken(BlockDescriptor);

    impl BlockSource for Broken {
        fn descriptor(&self) -> &BlockDescriptor {
            &self.0
        }

        fn fetch(&self) -> Result<Value, FetchError> {
            Err(FetchError::NotConfigured("api key missing".to_string()))
        }
    }

    fn fixed_descriptor() -> BlockDescriptor {
        BlockDescriptor::new("fixed", "Fixed", "FIX-01", 5)
    }

    fn broken_descriptor() -> BlockDescriptor {
        BlockDescriptor::new("broken", "Broken", "BRK-02", 30)
    }

    fn build_fixed(_: &BlockSettings) -> Box<dyn BlockSource> {
        Box::new(Fixed(fixed_descriptor()))
    }

    fn build_broken(_: &BlockSettings) -> Box<dyn BlockSource> {
        Box::new(Broken(broken_descriptor()))
    }

    fn state() -> ServerState {
        let mut registry = BlockRegistry::new();
        registry
            .register(fixed_descriptor(), build_fixed)
            .expect("fixed");
        registry
            .register(broken_descriptor(), build_broken)
            .expect("broken");
        ServerState::new(registry, &DashboardConfig::default())
    }

    #[test]
    fn lookup_fetches_on_miss_and_caches() {
        let state = state();
        assert_eq!(state.lookup("fixed"), Ok(json!({"n": 1})));
        assert_eq!(state.cache().ids(), vec![BlockId::trusted("fixed")]);
    }

    #[test]
    fn lookup_reports_unknown_and_invalid_ids() {
        let state = state();
        assert_eq!(
            state.lookup("nope"),
            Err(LookupError::Unknown("nope".to_string()))
        );
        assert_eq!(
            state.lookup("../etc").map_err(|err| err.to_string()),
            Err("unknown block `../etc`".to_string())
        );
    }

    #[test]
    fn failed_refresh_leaves_cache_untouched() {
        let state = state();
        let broken = BlockId::trusted("broken");
        state.cache().insert(broken.clone(), json!({"stale": true}));

        let outcome = state.refresh(&broken);

        assert!(matches!(outcome, RefreshOutcome::Failed(FetchError::NotConfigured(_))));
        assert_eq!(state.cache().get(&broken), Some(json!({"stale": true})));
    }

    #[test]
    fn refresh_broadcasts_to_listeners() {
        let state = state();
        let listener = state.hub().subscribe();

        assert_eq!(state.refresh(&BlockId::trusted("fixed")), RefreshOutcome::Updated);
        assert_eq!(state.refresh(&BlockId::trusted("ghost")), RefreshOutcome::Unknown);

        let frame = listener.try_recv().expect("broadcast");
        assert_eq!(frame.data, r#"{"block":"fixed","data":{"n":1}}"#);
    }

    #[test]
    fn intervals_follow_descriptors() {
        assert_eq!(
            state().intervals(),
            vec![
                (BlockId::trusted("broken"), 30),
                (BlockId::trusted("fixed"), 5)
            ]
        );
    }
}
