//! The backing store: one memory-mapped file, grown one block at a time.
//!
//! This is the component the rest of the crate leans on to honor the
//! mapping-move hazard. Every access goes through [`BackingStore::read_struct`],
//! [`BackingStore::write_struct`], [`BackingStore::bytes`] or
//! [`BackingStore::bytes_mut`]; none of them hand back something that
//! outlives the borrow of `self` used to produce it, so a caller simply
//! cannot hold a view into the mapping across a later call that grows it
//! (the borrow checker would refuse to compile it).

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use memmap::{MmapMut, MmapOptions};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{FsError, Result};
use crate::layout::{Offset, BLOCK};

/// Owns the file descriptor, its current length, and the read/write mapping
/// of its entire length.
#[derive(Debug)]
pub struct BackingStore {
    path: PathBuf,
    file: File,
    mmap: MmapMut,
    len: u64,
}

impl BackingStore {
    /// Open `path`, creating it if it does not exist. Returns the store and
    /// whether the file was empty (and thus just extended to one block) so
    /// the caller knows whether to initialize a fresh root record.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<(BackingStore, bool)> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;

        let mut len = file.metadata()?.len();
        let freshly_created = len == 0;
        if freshly_created {
            file.set_len(BLOCK)?;
            len = BLOCK;
        }

        let mmap = unsafe { MmapOptions::new().map_mut(&file)? };
        Ok((
            BackingStore {
                path,
                file,
                mmap,
                len,
            },
            freshly_created,
        ))
    }

    /// Path of the file backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current length of the backing store, in bytes. Always a multiple of
    /// `BLOCK`.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Extend the backing file by one `BLOCK`, remap it (the mapping base
    /// may move), and return the offset of the freshly appended block.
    pub fn grow_one_block(&mut self) -> Result<Offset> {
        let new_block = self.len;
        let new_len = self.len + BLOCK;
        self.file.set_len(new_len)?;
        // The old mapping is dropped before the new one is created, since
        // `memmap` has no in-place `mremap`; this is the safe-Rust
        // equivalent of the source's `mremap(..., MREMAP_MAYMOVE)`.
        self.mmap = unsafe { MmapOptions::new().map_mut(&self.file)? };
        self.len = new_len;
        Ok(new_block)
    }

    /// Flush the mapping to the backing file.
    pub fn flush(&mut self) -> Result<()> {
        self.mmap.flush()?;
        Ok(())
    }

    fn check_bounds(&self, offset: Offset, len: u64) -> Result<()> {
        if offset.checked_add(len).map_or(true, |end| end > self.len) {
            return Err(FsError::Other(anyhow::anyhow!(
                "access at offset {} length {} falls outside a store of length {}",
                offset,
                len,
                self.len
            )));
        }
        Ok(())
    }

    /// Borrow `len` raw bytes starting at `offset`.
    pub fn bytes(&self, offset: Offset, len: u64) -> Result<&[u8]> {
        self.check_bounds(offset, len)?;
        Ok(&self.mmap[offset as usize..(offset + len) as usize])
    }

    /// Mutably borrow `len` raw bytes starting at `offset`.
    pub fn bytes_mut(&mut self, offset: Offset, len: u64) -> Result<&mut [u8]> {
        self.check_bounds(offset, len)?;
        Ok(&mut self.mmap[offset as usize..(offset + len) as usize])
    }

    /// Decode a fixed-size record of type `T` starting at `offset`.
    pub fn read_struct<T: DeserializeOwned>(&self, offset: Offset) -> Result<T> {
        if offset >= self.len {
            return Err(FsError::Other(anyhow::anyhow!(
                "read at offset {} falls outside a store of length {}",
                offset,
                self.len
            )));
        }
        let tail = &self.mmap[offset as usize..];
        Ok(bincode::deserialize_from(tail)?)
    }

    /// Encode `value` and write it starting at `offset`.
    pub fn write_struct<T: Serialize>(&mut self, offset: Offset, value: &T) -> Result<()> {
        let encoded = bincode::serialize(value)?;
        let dst = self.bytes_mut(offset, encoded.len() as u64)?;
        dst.copy_from_slice(&encoded);
        Ok(())
    }
}

impl Drop for BackingStore {
    /// Persist all writes before the mapping goes away.
    fn drop(&mut self) {
        let _ = self.mmap.flush();
    }
}
