use block_contract::{BlockDescriptor, BlockId, BlockResponse};
use serde_json::json;

pub async fn tauri_block_catalog() -> Result<Vec<BlockDescriptor>, String> {
    super::interop::tauri_invoke("block_catalog", json!({})).await
}

pub async fn tauri_block_fetch(block_id: &BlockId) -> Result<BlockResponse, String> {
    super::interop::tauri_invoke("block_fetch", json!({ "blockId": block_id })).await
}
