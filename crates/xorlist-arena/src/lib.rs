//! Node storage for xorlist.
//!
//! This crate provides:
//! - Nodes carrying a payload and a single combined link
//! - Fixed-capacity blocks whose slots never move
//! - An arena that stacks blocks with geometric growth and retires
//!   blocks once all of their nodes are released

mod arena;
mod block;
mod node;

pub use arena::{Arena, ArenaStats};
pub use block::{Block, BlockId};
pub use node::Node;
