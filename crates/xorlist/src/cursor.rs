//! Pull-style cursor over a list.

use crate::list::{End, XorList};
use parking_lot::{MappedRwLockReadGuard, RwLockReadGuard};
use std::ptr::NonNull;
use xorlist_arena::Node;
use xorlist_common::{Address, Result, XorListError};

/// Where the cursor sits in the chain.
enum Position<T> {
    /// Before the first element.
    Start,
    /// On a live node.
    At(NonNull<Node<T>>),
    /// Past the last element, or stopped.
    Done,
}

/// A cursor that steps through a list one element per call.
///
/// The cursor holds no lock between calls; each step briefly read-locks the
/// list. Any insert, delete, or free after the cursor was created stops it:
/// `next()` returns false and `try_next()` reports why.
///
/// Stepping works for any payload. `current()` borrows the payload under a
/// read guard; `value()` clones it and needs `T: Clone`.
///
/// ```
/// use xorlist::XorList;
///
/// let list = XorList::new();
/// list.insert_back(1).unwrap();
/// list.insert_back(2).unwrap();
///
/// let mut cursor = list.cursor();
/// let mut seen = Vec::new();
/// while cursor.next() {
///     seen.push(cursor.value());
/// }
/// assert_eq!(seen, vec![1, 2]);
/// ```
pub struct Cursor<'a, T> {
    list: &'a XorList<T>,
    from: End,
    position: Position<T>,
    /// Address of the node visited before the current one.
    prev: Address,
    /// List version the cursor is valid for.
    version: u64,
}

impl<'a, T> Cursor<'a, T> {
    pub(crate) fn new(list: &'a XorList<T>, from: End) -> Self {
        let version = list.inner.read_recursive().version;
        Self {
            list,
            from,
            position: Position::Start,
            prev: Address::NULL,
            version,
        }
    }

    /// Borrows the current payload, if the cursor is on a live element.
    ///
    /// The returned guard holds the list's read lock. Writers block until it
    /// is dropped, so do not call a mutating list method while holding it.
    /// Returns None before the first step, after the last, and once the list
    /// was freed or modified.
    pub fn current(&self) -> Option<MappedRwLockReadGuard<'a, T>> {
        let Position::At(node) = self.position else {
            return None;
        };
        if self.list.is_freed() {
            return None;
        }
        let inner = self.list.inner.read_recursive();
        if inner.version != self.version {
            return None;
        }
        // SAFETY: the version is unchanged, so node is still live, and the
        // guard keeps writers out for as long as the borrow lives.
        Some(RwLockReadGuard::map(inner, |_| unsafe { node.as_ref() }.data()))
    }

    fn stop(&mut self) {
        self.position = Position::Done;
    }

    /// Advances to the next element and returns whether one exists.
    ///
    /// The first call moves onto the starting end.
    pub fn next(&mut self) -> bool {
        self.try_next().unwrap_or(false)
    }

    /// Advances to the next element.
    ///
    /// Returns FreedList if the list was freed and ModifiedDuringIteration if
    /// it changed since the cursor was created. The cursor stays stopped
    /// after either error.
    pub fn try_next(&mut self) -> Result<bool> {
        if matches!(self.position, Position::Done) {
            return Ok(false);
        }
        if self.list.is_freed() {
            self.stop();
            return Err(XorListError::FreedList);
        }

        let inner = self.list.inner.read_recursive();
        if inner.version != self.version {
            drop(inner);
            self.stop();
            return Err(XorListError::ModifiedDuringIteration);
        }

        let next = match self.position {
            Position::Start => inner.end(self.from),
            Position::At(node) => {
                // SAFETY: the version is unchanged, so node is still live.
                let next = unsafe { Node::step(self.prev, node) };
                self.prev = Node::address_of(node);
                next
            }
            Position::Done => None,
        };

        match next {
            Some(node) => {
                self.position = Position::At(node);
                Ok(true)
            }
            None => {
                drop(inner);
                self.stop();
                Ok(false)
            }
        }
    }
}

impl<T: Clone> Cursor<'_, T> {
    /// Returns a copy of the current payload.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is not on a live element, see [`Cursor::current`].
    pub fn value(&self) -> T {
        match self.current() {
            Some(value) => T::clone(&value),
            None => panic!("value called on a cursor with no current element"),
        }
    }
}
