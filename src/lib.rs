//! A single-file, memory-mapped, persistent hierarchical filesystem.
//!
//! A [`Mapper`] owns one backing file, memory-mapped and grown one block at
//! a time as it fills up. Inodes and file data live in that mapping at
//! fixed offsets; free inode slots and free blocks are threaded into their
//! own singly-linked lists so reuse never needs a separate bitmap. Every
//! persistent reference is a byte offset rather than a pointer, so nothing
//! is invalidated when a write grows the file and the mapping is
//! recreated at a new base address — the usual hazard of a memory-mapped
//! structure that outlives its original mapping simply does not arise
//! here, because no API in this crate hands back a reference that spans a
//! call that might grow the store.
//!
//! ```no_run
//! use mmapfs::{FileIo, Namespace, Mapper};
//!
//! # fn main() -> mmapfs::Result<()> {
//! let mut fs = Mapper::open_store("example.img")?;
//! let root = fs.root_dir()?;
//! let docs = fs.create_dir(root, "docs")?;
//! let readme = fs.create_file(docs, "readme.txt")?;
//!
//! let fd = fs.open_file(readme)?;
//! fs.write(fd, b"hello")?;
//! fs.close_file(fd)?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

mod block_alloc;
mod error;
mod handle;
mod layout;
mod mapper;
mod namespace;
mod node_alloc;
mod store;

pub use block_alloc::BlockAllocator;
pub use error::{FsError, Result};
pub use handle::{FileIo, Whence};
pub use layout::{NodeType, Offset, BLOCK, FD_MAX, NAME_MAX, NONE};
pub use mapper::Mapper;
pub use namespace::{ChildIter, Namespace};
pub use node_alloc::NodeAllocator;
