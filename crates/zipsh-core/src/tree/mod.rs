//! Directory tree view over the flat entry list.
//!
//! [`index::DirectoryTree`] answers "children of directory X" for `ls`,
//! `cd` and `tree`; [`render`] draws it as an ASCII tree.

pub mod index;
pub mod render;

pub use index::{DirectoryTree, TreeChild};
pub use render::{render_tree, TreeReport};
