//! Archive access for zipsh.
//!
//! [`codec`] wraps the byte format behind the [`codec::ArchiveCodec`] trait;
//! [`handle::Archive`] is an opened archive together with its entry index.

pub mod codec;
pub mod handle;

pub use codec::{ArchiveCodec, ArchiveFormat, ZipCodec};
pub use handle::Archive;
