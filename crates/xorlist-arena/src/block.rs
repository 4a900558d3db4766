//! Pinned node blocks.

use crate::node::Node;
use std::mem::{size_of, MaybeUninit};
use std::ptr::NonNull;
use xorlist_common::{Result, XorListError};

/// Unique identifier for a block within an arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u64);

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "block:{}", self.0)
    }
}

/// Fixed-capacity run of node slots.
///
/// Storage is allocated once and never resized, so every slot keeps its
/// address until the block itself is dropped. Slots are handed out in order
/// and never reused. Payloads are moved out or dropped by the owner of the
/// chain; dropping a block only releases its storage.
pub struct Block<T> {
    /// Block identifier.
    id: BlockId,
    /// Slot storage (pinned for the block's lifetime).
    slots: NonNull<[MaybeUninit<Node<T>>]>,
    /// Number of slots handed out so far.
    len: usize,
    /// Number of handed-out slots whose payload is still alive.
    live: usize,
}

// Blocks own their payloads exclusively.
unsafe impl<T: Send> Send for Block<T> {}
unsafe impl<T: Sync> Sync for Block<T> {}

impl<T> Block<T> {
    /// Allocates a block with room for `capacity` nodes.
    ///
    /// Returns AllocationFailed if the storage cannot be reserved.
    pub fn new(id: BlockId, capacity: usize) -> Result<Self> {
        let mut storage: Vec<MaybeUninit<Node<T>>> = Vec::new();
        storage
            .try_reserve_exact(capacity)
            .map_err(|source| XorListError::AllocationFailed { capacity, source })?;
        storage.resize_with(capacity, MaybeUninit::uninit);

        Ok(Self {
            id,
            slots: NonNull::from(Box::leak(storage.into_boxed_slice())),
            len: 0,
            live: 0,
        })
    }

    /// Returns the block ID.
    #[inline]
    pub fn id(&self) -> BlockId {
        self.id
    }

    /// Returns the total number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of slots handed out.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the number of live nodes.
    #[inline]
    pub fn live(&self) -> usize {
        self.live
    }

    /// Returns true if no slot is left to hand out.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Returns true if no slot has been handed out yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if slots were handed out and every one of them is dead.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.len > 0 && self.live == 0
    }

    #[inline]
    fn base(&self) -> *mut Node<T> {
        self.slots.as_ptr().cast::<Node<T>>()
    }

    /// Returns true if `node` points into this block's storage.
    #[inline]
    pub fn contains(&self, node: NonNull<Node<T>>) -> bool {
        let start = self.base().addr();
        let end = start + self.capacity() * size_of::<Node<T>>();
        (start..end).contains(&node.as_ptr().addr())
    }

    /// Moves `data` into the next free slot and returns its node.
    ///
    /// # Panics
    ///
    /// Panics if the block is full.
    pub fn push(&mut self, data: T) -> NonNull<Node<T>> {
        assert!(!self.is_full(), "{} is full", self.id);
        // SAFETY: len < capacity, so the slot is in bounds and was never handed out.
        let node = unsafe {
            let slot = self.base().add(self.len);
            slot.write(Node::new(data));
            NonNull::new_unchecked(slot)
        };
        self.len += 1;
        self.live += 1;
        node
    }

    /// Moves the payload out of a live node in this block.
    ///
    /// # Safety
    ///
    /// `node` must have been returned by [`Block::push`] on this block and
    /// must not have been taken or dropped since.
    pub unsafe fn take(&mut self, node: NonNull<Node<T>>) -> T {
        debug_assert!(self.contains(node));
        debug_assert!(self.live > 0);
        let data = unsafe { node.as_ptr().read() }.into_data();
        self.live -= 1;
        data
    }
}

impl<T> Drop for Block<T> {
    fn drop(&mut self) {
        // SAFETY: slots came from Box::leak in new() and is released only here.
        // MaybeUninit never drops its contents.
        unsafe { drop(Box::from_raw(self.slots.as_ptr())) }
    }
}

impl<T> std::fmt::Debug for Block<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Block")
            .field("id", &self.id)
            .field("capacity", &self.capacity())
            .field("len", &self.len)
            .field("live", &self.live)
            .finish()
    }
}
