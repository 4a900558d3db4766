//! List node layout.

use std::ptr::{self, NonNull};
use xorlist_common::Address;

/// A payload and its combined link.
///
/// `link` holds `address(prev) ^ address(next)`, with [`Address::NULL`]
/// standing in for a missing neighbor at either end of the chain.
#[derive(Debug)]
pub struct Node<T> {
    data: T,
    link: Address,
}

impl<T> Node<T> {
    /// Creates an unlinked node.
    #[inline]
    pub(crate) fn new(data: T) -> Self {
        Self {
            data,
            link: Address::NULL,
        }
    }

    /// Returns the payload.
    #[inline]
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Returns the combined link.
    #[inline]
    pub fn link(&self) -> Address {
        self.link
    }

    /// Consumes the node and returns its payload.
    #[inline]
    pub(crate) fn into_data(self) -> T {
        self.data
    }

    /// Returns the address of a node, exposing its provenance so that the
    /// address can later be decoded back into a pointer.
    #[inline]
    pub fn address_of(node: NonNull<Self>) -> Address {
        Address(node.as_ptr().expose_provenance())
    }

    /// Turns a decoded address back into a node pointer.
    ///
    /// Returns None for the null sentinel.
    #[inline]
    pub fn from_address(address: Address) -> Option<NonNull<Self>> {
        NonNull::new(ptr::with_exposed_provenance_mut(address.get()))
    }

    /// Decodes the neighbor on the far side of `node` when coming from `from`.
    ///
    /// # Safety
    ///
    /// `node` must point at a live node whose link was encoded with `from`
    /// as one of its two neighbors.
    #[inline]
    pub unsafe fn step(from: Address, node: NonNull<Self>) -> Option<NonNull<Self>> {
        let link = unsafe { (*node.as_ptr()).link };
        Self::from_address(from.combine(link))
    }

    /// XORs `address` into the node's link, adding or removing that neighbor.
    ///
    /// # Safety
    ///
    /// `node` must point at a live node and the caller must hold exclusive
    /// access to the chain.
    #[inline]
    pub unsafe fn toggle_neighbor(node: NonNull<Self>, address: Address) {
        unsafe {
            let link = &raw mut (*node.as_ptr()).link;
            *link = (*link).combine(address);
        }
    }

    /// Drops the payload in place, leaving the slot dead.
    ///
    /// # Safety
    ///
    /// `node` must point at a live node. The node must not be read again.
    #[inline]
    pub unsafe fn drop_data(node: NonNull<Self>) {
        unsafe { ptr::drop_in_place(&raw mut (*node.as_ptr()).data) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_new_is_unlinked() {
        let node = Node::new(7u32);
        assert_eq!(*node.data(), 7);
        assert!(node.link().is_null());
    }

    #[test]
    fn test_into_data_moves_payload_out() {
        let mut node = Node::new(String::from("owned"));
        unsafe { Node::toggle_neighbor(NonNull::from(&mut node), Address(0x40)) };
        assert_eq!(node.into_data(), "owned");
    }

    #[test]
    fn test_address_roundtrip() {
        let mut node = Node::new("payload");
        let ptr = NonNull::from(&mut node);
        let address = Node::address_of(ptr);
        assert!(!address.is_null());
        assert_eq!(Node::<&str>::from_address(address), Some(ptr));
    }

    #[test]
    fn test_from_null_address() {
        assert!(Node::<u8>::from_address(Address::NULL).is_none());
    }

    #[test]
    fn test_step_decodes_both_directions() {
        let mut left = Node::new(1);
        let mut middle = Node::new(2);
        let mut right = Node::new(3);
        let left_ptr = NonNull::from(&mut left);
        let middle_ptr = NonNull::from(&mut middle);
        let right_ptr = NonNull::from(&mut right);
        let left_addr = Node::address_of(left_ptr);
        let right_addr = Node::address_of(right_ptr);

        unsafe {
            Node::toggle_neighbor(middle_ptr, left_addr);
            Node::toggle_neighbor(middle_ptr, right_addr);
            assert_eq!(Node::step(left_addr, middle_ptr), Some(right_ptr));
            assert_eq!(Node::step(right_addr, middle_ptr), Some(left_ptr));

            // Removing a neighbor leaves the other one as the full link.
            Node::toggle_neighbor(middle_ptr, left_addr);
            assert_eq!(Node::step(Address::NULL, middle_ptr), Some(right_ptr));
        }
    }

    #[test]
    fn test_drop_data_runs_destructor() {
        use std::rc::Rc;

        let shared = Rc::new(());
        let mut node = std::mem::ManuallyDrop::new(Node::new(Rc::clone(&shared)));
        assert_eq!(Rc::strong_count(&shared), 2);
        unsafe { Node::drop_data(NonNull::from(&mut *node)) };
        assert_eq!(Rc::strong_count(&shared), 1);
    }
}
