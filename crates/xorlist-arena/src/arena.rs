//! Node arena built from a stack of pinned blocks.

use crate::block::{Block, BlockId};
use crate::node::Node;
use std::ptr::NonNull;
use xorlist_common::{ListConfig, Result, XorListError};

/// Point-in-time counters for an arena.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArenaStats {
    /// Number of blocks currently held.
    pub blocks: usize,
    /// Total slot capacity across held blocks.
    pub capacity: usize,
    /// Slots handed out across held blocks.
    pub allocated: usize,
    /// Live nodes across held blocks.
    pub live: usize,
}

/// Growable node storage with stable node addresses.
///
/// Nodes are appended to the most recent block. When it fills up, a new block
/// is pushed with `previous * growth_rate` slots. Older blocks are never
/// resized, so a node keeps its address until it is released. A block is
/// retired once every node it handed out has been released.
pub struct Arena<T> {
    /// Growth parameters.
    config: ListConfig,
    /// Block stack, most recent last.
    blocks: Vec<Block<T>>,
    /// Identifier for the next block.
    next_block_id: u64,
    /// Live nodes across all blocks.
    live: usize,
}

impl<T> Arena<T> {
    /// Creates an arena, pre-allocating the first block if
    /// `initial_capacity` is set.
    pub fn new(config: ListConfig) -> Result<Self> {
        config.validate()?;
        let initial_capacity = config.initial_capacity;
        let mut arena = Self {
            config,
            blocks: Vec::new(),
            next_block_id: 0,
            live: 0,
        };
        if let Some(capacity) = initial_capacity {
            arena.push_block(capacity)?;
        }
        Ok(arena)
    }

    /// Returns the arena configuration.
    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    /// Returns the number of live nodes.
    #[inline]
    pub fn live(&self) -> usize {
        self.live
    }

    /// Returns the number of blocks currently held.
    #[inline]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Returns a snapshot of the arena counters.
    pub fn stats(&self) -> ArenaStats {
        self.blocks.iter().fold(
            ArenaStats {
                live: self.live,
                ..Default::default()
            },
            |mut stats, block| {
                stats.blocks += 1;
                stats.capacity += block.capacity();
                stats.allocated += block.len();
                stats
            },
        )
    }

    /// Moves `data` into a fresh, unlinked node.
    ///
    /// Grows the arena when the active block is full. Allocation failure is
    /// returned as AllocationFailed and is not retried.
    pub fn acquire(&mut self, data: T) -> Result<NonNull<Node<T>>> {
        if self.blocks.last().map_or(true, Block::is_full) {
            self.grow()?;
        }
        match self.blocks.last_mut() {
            Some(block) => {
                let node = block.push(data);
                self.live += 1;
                Ok(node)
            }
            None => Err(XorListError::Internal(
                "arena has no active block after growth".to_string(),
            )),
        }
    }

    /// Pushes a block sized from the block currently on top of the stack.
    fn grow(&mut self) -> Result<()> {
        let capacity = match self.blocks.last().map(Block::capacity) {
            Some(previous) => self.config.next_capacity(previous),
            None => self.config.block_size,
        };
        self.push_block(capacity)
    }

    fn push_block(&mut self, capacity: usize) -> Result<()> {
        let block = Block::new(BlockId(self.next_block_id), capacity)?;
        self.next_block_id += 1;
        tracing::debug!(
            block = %block.id(),
            capacity,
            blocks = self.blocks.len() + 1,
            "Allocated arena block"
        );
        self.blocks.push(block);
        Ok(())
    }

    /// Moves the payload out of a node and retires its block if that was the
    /// block's last live node.
    ///
    /// # Safety
    ///
    /// `node` must have been returned by [`Arena::acquire`] on this arena and
    /// must not have been released since. It must already be unlinked from
    /// any chain that could still reach it.
    pub unsafe fn release(&mut self, node: NonNull<Node<T>>) -> Result<T> {
        // Recent blocks hold most of the nodes, so search from the top.
        let index = self
            .blocks
            .iter()
            .rposition(|block| block.contains(node))
            .ok_or_else(|| XorListError::Internal("node is not owned by this arena".to_string()))?;

        let block = &mut self.blocks[index];
        let data = unsafe { block.take(node) };
        self.live -= 1;

        if block.is_exhausted() {
            let block = self.blocks.remove(index);
            tracing::debug!(
                block = %block.id(),
                capacity = block.capacity(),
                blocks = self.blocks.len(),
                "Retired arena block"
            );
        }
        Ok(data)
    }

    /// Releases every block without touching payloads.
    ///
    /// Live payloads must already have been moved out or dropped by the
    /// caller; otherwise they are leaked.
    pub fn clear(&mut self) {
        if !self.blocks.is_empty() {
            tracing::debug!(blocks = self.blocks.len(), live = self.live, "Clearing arena");
        }
        self.blocks.clear();
        self.live = 0;
    }
}

impl<T> Default for Arena<T> {
    /// An empty arena with the default configuration; nothing is pre-allocated.
    fn default() -> Self {
        Self {
            config: ListConfig::default(),
            blocks: Vec::new(),
            next_block_id: 0,
            live: 0,
        }
    }
}

impl<T> std::fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("config", &self.config)
            .field("blocks", &self.blocks)
            .field("live", &self.live)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> ListConfig {
        ListConfig {
            block_size: 2,
            growth_rate: 2.0,
            initial_capacity: None,
        }
    }

    #[test]
    fn test_arena_new_is_empty() {
        let arena = Arena::<u32>::new(small_config()).unwrap();
        assert_eq!(arena.live(), 0);
        assert_eq!(arena.block_count(), 0);
        assert_eq!(arena.stats(), ArenaStats::default());
    }

    #[test]
    fn test_arena_default() {
        let mut arena = Arena::default();
        assert_eq!(arena.config(), &ListConfig::default());
        arena.acquire(1u8).unwrap();
        assert_eq!(arena.stats().capacity, 1024);
        arena.clear();
    }

    #[test]
    fn test_arena_new_rejects_invalid_config() {
        let config = ListConfig {
            growth_rate: 1.0,
            ..Default::default()
        };
        assert!(matches!(
            Arena::<u32>::new(config),
            Err(XorListError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_arena_initial_capacity_preallocates() {
        let config = ListConfig {
            initial_capacity: Some(5),
            ..small_config()
        };
        let arena = Arena::<u32>::new(config).unwrap();
        let stats = arena.stats();
        assert_eq!(stats.blocks, 1);
        assert_eq!(stats.capacity, 5);
        assert_eq!(stats.allocated, 0);
    }

    #[test]
    fn test_arena_grows_geometrically() {
        let mut arena = Arena::new(small_config()).unwrap();
        let nodes: Vec<_> = (0..7).map(|i| arena.acquire(i).unwrap()).collect();

        // 2 + 4 + 8 slots
        let stats = arena.stats();
        assert_eq!(stats.blocks, 3);
        assert_eq!(stats.capacity, 14);
        assert_eq!(stats.allocated, 7);
        assert_eq!(stats.live, 7);

        for (i, node) in nodes.into_iter().enumerate() {
            assert_eq!(unsafe { arena.release(node) }.unwrap(), i);
        }
        assert_eq!(arena.block_count(), 0);
    }

    #[test]
    fn test_arena_growth_follows_initial_capacity() {
        let config = ListConfig {
            block_size: 64,
            growth_rate: 1.5,
            initial_capacity: Some(4),
        };
        let mut arena = Arena::new(config).unwrap();
        for i in 0..5 {
            arena.acquire(i).unwrap();
        }
        // 4 preallocated, then 4 * 1.5 = 6
        assert_eq!(arena.stats().capacity, 10);
        arena.clear();
    }

    #[test]
    fn test_arena_addresses_survive_growth() {
        let mut arena = Arena::new(small_config()).unwrap();
        let first = arena.acquire(String::from("first")).unwrap();
        for i in 0..100 {
            arena.acquire(i.to_string()).unwrap();
        }
        assert_eq!(unsafe { first.as_ref() }.data(), "first");
        assert_eq!(unsafe { arena.release(first) }.unwrap(), "first");
    }

    #[test]
    fn test_arena_retires_exhausted_block() {
        let mut arena = Arena::new(small_config()).unwrap();
        let a = arena.acquire(1).unwrap();
        let b = arena.acquire(2).unwrap();
        let c = arena.acquire(3).unwrap();
        assert_eq!(arena.block_count(), 2);

        // Releasing one node of the first block keeps it.
        assert_eq!(unsafe { arena.release(b) }.unwrap(), 2);
        assert_eq!(arena.block_count(), 2);

        // Its last node retires it.
        assert_eq!(unsafe { arena.release(a) }.unwrap(), 1);
        assert_eq!(arena.block_count(), 1);
        assert_eq!(arena.stats().capacity, 4);

        assert_eq!(unsafe { arena.release(c) }.unwrap(), 3);
        assert_eq!(arena.block_count(), 0);
        assert_eq!(arena.live(), 0);
    }

    #[test]
    fn test_arena_restarts_at_block_size_when_emptied() {
        let mut arena = Arena::new(small_config()).unwrap();
        let nodes: Vec<_> = (0..3).map(|i| arena.acquire(i).unwrap()).collect();
        for node in nodes {
            unsafe { arena.release(node) }.unwrap();
        }
        arena.acquire(9).unwrap();
        assert_eq!(arena.stats().capacity, 2);
        arena.clear();
    }

    #[test]
    fn test_arena_growth_follows_surviving_top_block() {
        let mut arena = Arena::new(ListConfig {
            block_size: 1,
            growth_rate: 2.0,
            initial_capacity: None,
        })
        .unwrap();
        let first = arena.acquire(0u64).unwrap();

        // Each cycle spills into a new block and retires it again.
        for i in 0..100 {
            let node = arena.acquire(i).unwrap();
            assert_eq!(arena.stats().capacity, 1 + 2);
            assert_eq!(unsafe { arena.release(node) }.unwrap(), i);
            assert_eq!(arena.block_count(), 1);
        }
        assert_eq!(unsafe { arena.release(first) }.unwrap(), 0);
    }

    #[test]
    fn test_arena_never_reuses_slots() {
        let mut arena = Arena::new(ListConfig {
            block_size: 4,
            ..small_config()
        })
        .unwrap();
        let a = arena.acquire(1).unwrap();
        let b = arena.acquire(2).unwrap();
        unsafe { arena.release(b) }.unwrap();

        let c = arena.acquire(3).unwrap();
        assert_ne!(b, c);
        assert_eq!(arena.stats().allocated, 3);
        assert_eq!(arena.live(), 2);

        unsafe {
            arena.release(a).unwrap();
            arena.release(c).unwrap();
        }
    }

    #[test]
    fn test_arena_release_foreign_node() {
        let mut owner = Arena::new(small_config()).unwrap();
        let mut other = Arena::<i32>::new(small_config()).unwrap();
        let node = owner.acquire(1).unwrap();
        other.acquire(2).unwrap();

        let result = unsafe { other.release(node) };
        assert!(matches!(result, Err(XorListError::Internal(_))));
        assert_eq!(unsafe { owner.release(node) }.unwrap(), 1);
        other.clear();
    }

    #[test]
    fn test_arena_clear() {
        let mut arena = Arena::new(small_config()).unwrap();
        for i in 0..10u32 {
            arena.acquire(i).unwrap();
        }
        arena.clear();
        assert_eq!(arena.stats(), ArenaStats::default());

        // A cleared arena starts over from block_size.
        arena.acquire(1).unwrap();
        assert_eq!(arena.stats().capacity, 2);
        arena.clear();
    }
}
