//! Block-data collaborator contract used by the dashboard runtime.

use std::{cell::RefCell, collections::HashMap, future::Future, pin::Pin, rc::Rc};

use block_contract::{BlockDescriptor, BlockId, BlockResponse, BlockUpdate};

/// Object-safe boxed future used by [`BlockFeed`] async methods.
pub type BlockFeedFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Callback receiving pushed block updates.
pub type UpdateSink = Rc<dyn Fn(BlockUpdate)>;

/// Host service supplying the block catalog and block data.
pub trait BlockFeed {
    /// Lists the block types the host can fetch.
    fn catalog<'a>(&'a self) -> BlockFeedFuture<'a, Result<Vec<BlockDescriptor>, String>>;

    /// Fetches one block's current data.
    ///
    /// Fetch failures of the block itself arrive as a failed [`BlockResponse`]; the outer
    /// `Err` is reserved for transport failures.
    fn fetch_block<'a>(
        &'a self,
        block_id: &'a BlockId,
    ) -> BlockFeedFuture<'a, Result<BlockResponse, String>>;

    /// Subscribes `sink` to pushed updates.
    ///
    /// Returns `Ok(true)` when the host pushes refreshes on its own, in which case the runtime
    /// does not poll. The default implementation reports no push channel.
    ///
    /// # Errors
    ///
    /// Returns an error when the push channel cannot be opened.
    fn subscribe(&self, sink: UpdateSink) -> Result<bool, String> {
        let _ = sink;
        Ok(false)
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Feed with an empty catalog; every fetch reports the block as unavailable.
pub struct NoopBlockFeed;

impl BlockFeed for NoopBlockFeed {
    fn catalog<'a>(&'a self) -> BlockFeedFuture<'a, Result<Vec<BlockDescriptor>, String>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn fetch_block<'a>(
        &'a self,
        block_id: &'a BlockId,
    ) -> BlockFeedFuture<'a, Result<BlockResponse, String>> {
        Box::pin(async move {
            Ok(BlockResponse::failure(format!(
                "block `{block_id}` is unavailable on this host"
            )))
        })
    }
}

#[derive(Clone, Default)]
/// In-memory feed serving canned responses; used by tests and the stub desktop host.
pub struct MemoryBlockFeed {
    catalog: Rc<RefCell<Vec<BlockDescriptor>>>,
    responses: Rc<RefCell<HashMap<BlockId, BlockResponse>>>,
    sinks: Rc<RefCell<Vec<UpdateSink>>>,
    fetch_log: Rc<RefCell<Vec<BlockId>>>,
}

impl std::fmt::Debug for MemoryBlockFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBlockFeed")
            .field("catalog", &self.catalog.borrow().len())
            .field("subscribers", &self.sinks.borrow().len())
            .finish_non_exhaustive()
    }
}

impl MemoryBlockFeed {
    /// Creates a feed advertising `catalog`.
    pub fn with_catalog(catalog: Vec<BlockDescriptor>) -> Self {
        Self {
            catalog: Rc::new(RefCell::new(catalog)),
            ..Self::default()
        }
    }

    /// Sets the response returned for `block_id`.
    pub fn set_response(&self, block_id: BlockId, response: BlockResponse) {
        self.responses.borrow_mut().insert(block_id, response);
    }

    /// Delivers `update` to every subscriber.
    pub fn push(&self, update: &BlockUpdate) {
        let sinks = self.sinks.borrow().clone();
        for sink in sinks {
            sink(update.clone());
        }
    }

    /// Block ids fetched so far, in call order.
    pub fn fetch_log(&self) -> Vec<BlockId> {
        self.fetch_log.borrow().clone()
    }
}

impl BlockFeed for MemoryBlockFeed {
    fn catalog<'a>(&'a self) -> BlockFeedFuture<'a, Result<Vec<BlockDescriptor>, String>> {
        Box::pin(async move { Ok(self.catalog.borrow().clone()) })
    }

    fn fetch_block<'a>(
        &'a self,
        block_id: &'a BlockId,
    ) -> BlockFeedFuture<'a, Result<BlockResponse, String>> {
        Box::pin(async move {
            self.fetch_log.borrow_mut().push(block_id.clone());
            self.responses
                .borrow()
                .get(block_id)
                .cloned()
                .ok_or_else(|| format!("no response registered for `{block_id}`"))
        })
    }

    fn subscribe(&self, sink: UpdateSink) -> Result<bool, String> {
        self.sinks.borrow_mut().push(sink);
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use block_contract::BlockDescriptor;
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn noop_feed_reports_blocks_unavailable() {
        let feed: &dyn BlockFeed = &NoopBlockFeed;
        assert!(block_on(feed.catalog()).expect("catalog").is_empty());

        let response =
            block_on(feed.fetch_block(&BlockId::trusted("clock"))).expect("transport ok");
        assert!(!response.ok);
        assert_eq!(feed.subscribe(Rc::new(|_| {})), Ok(false));
    }

    #[test]
    fn memory_feed_serves_canned_responses_and_logs_fetches() {
        let clock = BlockDescriptor::new("clock", "Clock", "CLK-01", 1);
        let feed = MemoryBlockFeed::with_catalog(vec![clock.clone()]);
        feed.set_response(
            BlockId::trusted("clock"),
            BlockResponse::success(json!({"time": "09:00:00"})),
        );

        assert_eq!(block_on(feed.catalog()).expect("catalog"), vec![clock]);
        let response =
            block_on(feed.fetch_block(&BlockId::trusted("clock"))).expect("fetch clock");
        assert_eq!(response.into_result(), Ok(json!({"time": "09:00:00"})));
        assert!(block_on(feed.fetch_block(&BlockId::trusted("jobs"))).is_err());
        assert_eq!(
            feed.fetch_log(),
            vec![BlockId::trusted("clock"), BlockId::trusted("jobs")]
        );
    }

    #[test]
    fn memory_feed_pushes_to_subscribers() {
        let feed = MemoryBlockFeed::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink_seen = Rc::clone(&seen);
        feed.subscribe(Rc::new(move |update: BlockUpdate| {
            sink_seen.borrow_mut().push(update.block);
        }))
        .expect("subscribe");

        feed.push(&BlockUpdate {
            block: BlockId::trusted("weather"),
            data: json!({"temp": 12}),
        });

        assert_eq!(*seen.borrow(), vec![BlockId::trusted("weather")]);
    }
}
