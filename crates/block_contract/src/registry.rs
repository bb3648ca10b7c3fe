use std::collections::BTreeMap;

use thiserror::Error;

use crate::{BlockDescriptor, BlockId, BlockSettings, BlockSource};

/// Constructor for a block source from its per-block settings.
pub type BlockFactory = fn(&BlockSettings) -> Box<dyn BlockSource>;

/// One registry entry: a block's static descriptor and its source constructor.
#[derive(Clone)]
pub struct BlockRegistration {
    /// Static metadata.
    pub descriptor: BlockDescriptor,
    /// Source constructor.
    pub factory: BlockFactory,
}

impl std::fmt::Debug for BlockRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockRegistration")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Registry errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A block with the same id was registered twice.
    #[error("block `{0}` is already registered")]
    Duplicate(BlockId),
}

/// Explicitly populated mapping from block id to descriptor and source factory.
///
/// Hosts construct one registry at startup and pass it to whatever needs to build sources.
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    entries: BTreeMap<BlockId, BlockRegistration>,
    order: Vec<BlockId>,
}

impl BlockRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a block type.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] when the descriptor id is already registered.
    pub fn register(
        &mut self,
        descriptor: BlockDescriptor,
        factory: BlockFactory,
    ) -> Result<(), RegistryError> {
        if self.entries.contains_key(&descriptor.id) {
            return Err(RegistryError::Duplicate(descriptor.id));
        }
        self.order.push(descriptor.id.clone());
        self.entries.insert(
            descriptor.id.clone(),
            BlockRegistration {
                descriptor,
                factory,
            },
        );
        Ok(())
    }

    /// Returns descriptors in registration order.
    pub fn descriptors(&self) -> Vec<BlockDescriptor> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id))
            .map(|entry| entry.descriptor.clone())
            .collect()
    }

    /// Returns the descriptor registered for `id`.
    pub fn descriptor(&self, id: &BlockId) -> Option<&BlockDescriptor> {
        self.entries.get(id).map(|entry| &entry.descriptor)
    }

    /// Returns `true` when `id` is registered.
    pub fn contains(&self, id: &BlockId) -> bool {
        self.entries.contains_key(id)
    }

    /// Builds a source for `id` from `settings`, or `None` for unknown ids.
    pub fn build(&self, id: &BlockId, settings: &BlockSettings) -> Option<Box<dyn BlockSource>> {
        self.entries.get(id).map(|entry| (entry.factory)(settings))
    }

    /// Number of registered block types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
