//! Text output helpers.

use crate::list::{End, XorList};
use std::fmt::Display;
use std::io::Write;
use xorlist_common::Result;

impl<T: Display> XorList<T> {
    /// Writes every element head to tail, each followed by a space, then a newline.
    pub fn print_forward<W: Write>(&self, out: &mut W) -> Result<()> {
        self.print(End::Front, out)
    }

    /// Writes every element tail to head, each followed by a space, then a newline.
    pub fn print_backward<W: Write>(&self, out: &mut W) -> Result<()> {
        self.print(End::Back, out)
    }

    fn print<W: Write>(&self, from: End, out: &mut W) -> Result<()> {
        // The visitor cannot fail, so keep the first write error and skip the rest.
        let mut written = Ok(());
        self.traverse(from, |data| {
            if written.is_ok() {
                written = write!(out, "{} ", data);
            }
        })?;
        written?;
        writeln!(out)?;
        Ok(())
    }
}
