//! XOR-linked list container.

use crate::cursor::Cursor;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, Ordering};
use xorlist_arena::{Arena, ArenaStats, Node};
use xorlist_common::{Address, ListConfig, Result, XorListError};

/// End of the list an operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum End {
    /// The head.
    Front,
    /// The tail.
    Back,
}

/// State guarded by the list lock.
pub(crate) struct ListInner<T> {
    head: Option<NonNull<Node<T>>>,
    tail: Option<NonNull<Node<T>>>,
    arena: Arena<T>,
    len: usize,
    /// Bumped on every structural change; cursors use it to detect mutation.
    pub(crate) version: u64,
}

impl<T> ListInner<T> {
    fn new(arena: Arena<T>) -> Self {
        Self {
            head: None,
            tail: None,
            arena,
            len: 0,
            version: 0,
        }
    }

    #[inline]
    pub(crate) fn end(&self, end: End) -> Option<NonNull<Node<T>>> {
        match end {
            End::Front => self.head,
            End::Back => self.tail,
        }
    }

    #[inline]
    fn set_end(&mut self, end: End, node: Option<NonNull<Node<T>>>) {
        match end {
            End::Front => self.head = node,
            End::Back => self.tail = node,
        }
    }

    /// Splices a new node onto one end. Touches at most two links.
    fn push(&mut self, data: T, end: End) -> Result<()> {
        let node = self.arena.acquire(data)?;
        match self.end(end) {
            None => {
                self.head = Some(node);
                self.tail = Some(node);
            }
            Some(old) => {
                // SAFETY: old is a live end node and the write lock is held.
                // node is fresh, so its link starts out null.
                unsafe {
                    Node::toggle_neighbor(node, Node::address_of(old));
                    Node::toggle_neighbor(old, Node::address_of(node));
                }
                self.set_end(end, Some(node));
            }
        }
        self.len += 1;
        self.version += 1;
        Ok(())
    }

    /// Detaches the node at one end and returns its payload.
    fn pop(&mut self, end: End) -> Result<T> {
        let node = self.end(end).ok_or(XorListError::EmptyList)?;

        if self.head == self.tail {
            self.head = None;
            self.tail = None;
            self.len = 0;
            self.version += 1;
            // SAFETY: node was the only live node and is no longer reachable.
            let data = unsafe { self.arena.release(node) };
            self.arena.clear();
            return data;
        }

        // SAFETY: an end node's link holds only its single neighbor.
        let neighbor = unsafe { Node::step(Address::NULL, node) }.ok_or_else(|| {
            XorListError::Internal(format!("{:?} node of a multi-node list has no neighbor", end))
        })?;
        // SAFETY: neighbor is live and the write lock is held.
        unsafe { Node::toggle_neighbor(neighbor, Node::address_of(node)) };
        self.set_end(end, Some(neighbor));
        self.len -= 1;
        self.version += 1;

        // SAFETY: node is unlinked from the chain above.
        unsafe { self.arena.release(node) }
    }

    /// Visits every payload starting from one end.
    fn walk<F>(&self, from: End, mut visit: F)
    where
        F: FnMut(&T),
    {
        let mut prev = Address::NULL;
        let mut current = self.end(from);
        while let Some(node) = current {
            // SAFETY: nodes reachable from an end stay live while the lock is held.
            unsafe {
                visit(node.as_ref().data());
                current = Node::step(prev, node);
            }
            prev = Node::address_of(node);
        }
    }

    /// Drops every live payload and releases the arena.
    fn teardown(&mut self) {
        if std::mem::needs_drop::<T>() {
            let mut prev = Address::NULL;
            let mut current = self.head;
            while let Some(node) = current {
                // SAFETY: each node is visited once; its link is read before
                // the payload is dropped and the node is not read afterwards.
                unsafe {
                    current = Node::step(prev, node);
                    Node::drop_data(node);
                }
                prev = Node::address_of(node);
            }
        }
        self.head = None;
        self.tail = None;
        self.len = 0;
        self.version += 1;
        self.arena.clear();
    }
}

/// A doubly traversable list whose nodes carry one combined link.
///
/// Each node stores `address(prev) ^ address(next)`. Nodes live in an arena
/// of blocks that are never resized, so the stored addresses stay valid for
/// as long as a node is reachable.
///
/// Operations may be called from many threads. Insert and delete take the
/// lock exclusively; a traversal holds it shared for its whole walk, so a
/// visitor must not mutate the list it is visiting.
pub struct XorList<T> {
    /// Chain ends, arena, and counters.
    pub(crate) inner: RwLock<ListInner<T>>,
    /// Set once by a successful free().
    freed: AtomicBool,
}

// The list owns its payloads; raw node pointers never escape the lock.
unsafe impl<T: Send> Send for XorList<T> {}
unsafe impl<T: Send + Sync> Sync for XorList<T> {}

impl<T> XorList<T> {
    /// Creates an empty list with the default configuration.
    pub fn new() -> Self {
        Self::from_arena(Arena::default())
    }

    /// Creates an empty list with the given configuration.
    ///
    /// Returns InvalidParameter for out-of-range options and AllocationFailed
    /// if the initial block cannot be reserved.
    pub fn with_config(config: ListConfig) -> Result<Self> {
        Ok(Self::from_arena(Arena::new(config)?))
    }

    fn from_arena(arena: Arena<T>) -> Self {
        Self {
            inner: RwLock::new(ListInner::new(arena)),
            freed: AtomicBool::new(false),
        }
    }

    /// Returns true once free() has succeeded.
    #[inline]
    pub fn is_freed(&self) -> bool {
        self.freed.load(Ordering::Acquire)
    }

    /// Locks the list exclusively, failing fast if it has been freed.
    fn write_live(&self) -> Result<RwLockWriteGuard<'_, ListInner<T>>> {
        if self.is_freed() {
            return Err(XorListError::FreedList);
        }
        let inner = self.inner.write();
        // free() may have finished while we waited.
        if self.is_freed() {
            return Err(XorListError::FreedList);
        }
        Ok(inner)
    }

    /// Locks the list shared, failing fast if it has been freed.
    fn read_live(&self) -> Result<RwLockReadGuard<'_, ListInner<T>>> {
        if self.is_freed() {
            return Err(XorListError::FreedList);
        }
        let inner = self.inner.read();
        if self.is_freed() {
            return Err(XorListError::FreedList);
        }
        Ok(inner)
    }

    /// Inserts `data` at the given end.
    pub fn insert(&self, data: T, end: End) -> Result<()> {
        self.write_live()?.push(data, end)
    }

    /// Inserts `data` before the current head.
    pub fn insert_front(&self, data: T) -> Result<()> {
        self.insert(data, End::Front)
    }

    /// Inserts `data` after the current tail.
    pub fn insert_back(&self, data: T) -> Result<()> {
        self.insert(data, End::Back)
    }

    /// Removes the node at the given end and returns its payload.
    ///
    /// Returns EmptyList if there is nothing to remove.
    pub fn pop(&self, end: End) -> Result<T> {
        self.write_live()?.pop(end)
    }

    /// Removes the head and returns its payload.
    pub fn pop_front(&self) -> Result<T> {
        self.pop(End::Front)
    }

    /// Removes the tail and returns its payload.
    pub fn pop_back(&self) -> Result<T> {
        self.pop(End::Back)
    }

    /// Removes the head.
    pub fn delete_front(&self) -> Result<()> {
        self.pop_front().map(drop)
    }

    /// Removes the tail.
    pub fn delete_back(&self) -> Result<()> {
        self.pop_back().map(drop)
    }

    /// Calls `visit` on every payload, starting from the given end.
    ///
    /// The list is read-locked for the whole walk. `visit` must not insert
    /// into or delete from this list.
    pub fn traverse<F>(&self, from: End, visit: F) -> Result<()>
    where
        F: FnMut(&T),
    {
        self.read_live()?.walk(from, visit);
        Ok(())
    }

    /// Calls `visit` on every payload from head to tail.
    pub fn traverse_forward<F>(&self, visit: F) -> Result<()>
    where
        F: FnMut(&T),
    {
        self.traverse(End::Front, visit)
    }

    /// Calls `visit` on every payload from tail to head.
    pub fn traverse_backward<F>(&self, visit: F) -> Result<()>
    where
        F: FnMut(&T),
    {
        self.traverse(End::Back, visit)
    }

    /// Returns the number of elements. Always 0 once freed.
    pub fn size(&self) -> usize {
        // Recursive so it can be called from inside a traversal.
        self.inner.read_recursive().len
    }

    /// Returns true if the list holds no elements.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Returns a snapshot of the arena counters.
    pub fn stats(&self) -> ArenaStats {
        self.inner.read_recursive().arena.stats()
    }

    /// Returns the configuration the list was created with.
    pub fn config(&self) -> ListConfig {
        self.inner.read_recursive().arena.config().clone()
    }

    /// Returns a cursor that walks from head to tail.
    pub fn cursor(&self) -> Cursor<'_, T> {
        Cursor::new(self, End::Front)
    }

    /// Returns a cursor that walks from tail to head.
    pub fn cursor_back(&self) -> Cursor<'_, T> {
        Cursor::new(self, End::Back)
    }

    /// Drops every element and releases all blocks.
    ///
    /// Only the first call succeeds; later calls return AlreadyFreed. Every
    /// other operation on a freed list returns FreedList.
    pub fn free(&self) -> Result<()> {
        if self.is_freed() {
            return Err(XorListError::AlreadyFreed);
        }
        let mut inner = self.inner.write();
        if self
            .freed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(XorListError::AlreadyFreed);
        }
        let released = inner.len;
        let blocks = inner.arena.block_count();
        inner.teardown();
        tracing::debug!(released, blocks, "Freed list");
        Ok(())
    }
}

impl<T: Clone> XorList<T> {
    /// Copies the payloads into a vector, head first.
    pub fn to_vec(&self) -> Result<Vec<T>> {
        let inner = self.read_live()?;
        let mut out = Vec::with_capacity(inner.len);
        inner.walk(End::Front, |data| out.push(data.clone()));
        Ok(out)
    }
}

impl<T> Default for XorList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for XorList<T> {
    fn drop(&mut self) {
        if *self.freed.get_mut() {
            return;
        }
        let inner = self.inner.get_mut();
        if inner.arena.block_count() > 0 {
            tracing::debug!(live = inner.len, "Releasing list on drop");
        }
        inner.teardown();
    }
}

impl<T> std::fmt::Debug for XorList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read_recursive();
        f.debug_struct("XorList")
            .field("size", &inner.len)
            .field("freed", &self.is_freed())
            .field("arena", &inner.arena.stats())
            .finish()
    }
}
