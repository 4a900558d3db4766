//! XOR-linked list with arena-pinned nodes.
//!
//! This crate provides:
//! - A thread-safe list whose nodes keep one combined link instead of two
//! - O(1) insert and delete at either end
//! - Forward and backward traversal under a shared lock
//! - Cursors that detect concurrent modification
//! - Idempotent, explicit teardown with a drop-time fallback

mod cursor;
mod list;
mod print;

pub use cursor::Cursor;
pub use list::{End, XorList};
pub use xorlist_arena::ArenaStats;
pub use xorlist_common::{Address, ListConfig, Result, XorListError};
