//! Block feed backed by the desktop host's `block_catalog` and `block_fetch` commands.

use block_contract::{BlockDescriptor, BlockId, BlockResponse};
use platform_host::{BlockFeed, BlockFeedFuture};

#[derive(Debug, Clone, Copy, Default)]
/// Desktop block feed; the runtime polls it on each block's cadence.
pub struct TauriBlockFeed;

impl BlockFeed for TauriBlockFeed {
    fn catalog<'a>(&'a self) -> BlockFeedFuture<'a, Result<Vec<BlockDescriptor>, String>> {
        Box::pin(async move { crate::bridge::tauri_block_catalog().await })
    }

    fn fetch_block<'a>(
        &'a self,
        block_id: &'a BlockId,
    ) -> BlockFeedFuture<'a, Result<BlockResponse, String>> {
        Box::pin(async move { crate::bridge::tauri_block_fetch(block_id).await })
    }
}
