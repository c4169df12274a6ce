//! The file I/O engine: an open-handle table plus read/write/seek against
//! a file's data-block chain.

use crate::block_alloc::BlockAllocator;
use crate::error::{FsError, Result};
use crate::layout::{data_payload_offset, DataBlockHeader, Node, NodeType, Offset, DATA_PER_BLOCK, NONE};
use crate::mapper::{HandleSlot, Mapper};

/// Reference point for a `seek`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    /// Relative to the start of the file.
    Set,
    /// Relative to the current cursor.
    Cur,
    /// Relative to the end of the file.
    End,
}

/// Opening, closing, and streaming I/O against file inodes.
pub trait FileIo {
    /// Open `file_inode` for I/O, returning a handle positioned at offset
    /// zero. Fails if the inode is not a file or the handle table is full.
    fn open_file(&mut self, file_inode: Offset) -> Result<usize>;

    /// Release a handle. The slot becomes available for reuse.
    fn close_file(&mut self, fd: usize) -> Result<()>;

    /// Read up to `buf.len()` bytes starting at the handle's cursor,
    /// advancing it by the amount read. Reading at or past the end of the
    /// file returns `Ok(0)` without allocating anything.
    fn read(&mut self, fd: usize, buf: &mut [u8]) -> Result<usize>;

    /// Write `buf` starting at the handle's cursor, extending the file and
    /// allocating data blocks as needed, and advancing the cursor by the
    /// amount written.
    fn write(&mut self, fd: usize, buf: &[u8]) -> Result<usize>;

    /// Reposition a handle's cursor.
    fn seek(&mut self, fd: usize, offset: i64, whence: Whence) -> Result<()>;
}

impl FileIo for Mapper {
    fn open_file(&mut self, file_inode: Offset) -> Result<usize> {
        let node = self.get_node(file_inode)?;
        if node.node_type != NodeType::File {
            return Err(FsError::NotAFile);
        }
        let slot = self
            .handles
            .iter()
            .position(|h| !h.in_use)
            .ok_or(FsError::TooManyOpen)?;
        self.handles[slot] = HandleSlot {
            in_use: true,
            file_off: file_inode,
            cursor: 0,
        };
        Ok(slot)
    }

    fn close_file(&mut self, fd: usize) -> Result<()> {
        self.check_handle(fd)?;
        self.handles[fd].in_use = false;
        Ok(())
    }

    fn read(&mut self, fd: usize, buf: &mut [u8]) -> Result<usize> {
        self.check_handle(fd)?;
        let file_off = self.handles[fd].file_off;
        let cursor = self.handles[fd].cursor;
        let node: Node = self.get_node(file_off)?;

        if cursor >= node.size {
            return Ok(0);
        }
        let want = std::cmp::min(buf.len() as u64, node.size - cursor) as usize;
        if want == 0 {
            return Ok(0);
        }

        let per_block = *DATA_PER_BLOCK;
        let mut block = node.first_block;
        let mut to_skip = cursor / per_block;
        while to_skip > 0 {
            let header: DataBlockHeader = self.store.read_struct(block)?;
            block = header.next_block;
            to_skip -= 1;
        }

        let mut copied = 0usize;
        let mut block_offset = cursor % per_block;
        while copied < want {
            let n = std::cmp::min(per_block - block_offset, (want - copied) as u64) as usize;
            let src = self
                .store
                .bytes(block + data_payload_offset() + block_offset, n as u64)?;
            buf[copied..copied + n].copy_from_slice(src);
            copied += n;
            block_offset = 0;
            if copied < want {
                let header: DataBlockHeader = self.store.read_struct(block)?;
                block = header.next_block;
            }
        }

        self.handles[fd].cursor += copied as u64;
        Ok(copied)
    }

    fn write(&mut self, fd: usize, buf: &[u8]) -> Result<usize> {
        self.check_handle(fd)?;
        let file_off = self.handles[fd].file_off;
        let cursor = self.handles[fd].cursor;
        if buf.is_empty() {
            return Ok(0);
        }

        let node = self.get_node(file_off)?;
        if node.first_block == NONE {
            let first = self.alloc_data_block()?;
            let mut node = self.get_node(file_off)?;
            node.first_block = first;
            self.put_node(file_off, &node)?;
        }

        let per_block = *DATA_PER_BLOCK;
        let mut block = self.get_node(file_off)?.first_block;
        let mut remaining_hops = cursor / per_block;
        while remaining_hops > 0 {
            block = self.next_block_or_extend(block)?;
            remaining_hops -= 1;
        }

        let mut block_offset = cursor % per_block;
        let mut written = 0usize;
        while written < buf.len() {
            let n = std::cmp::min(per_block - block_offset, (buf.len() - written) as u64) as usize;
            let dst = self
                .store
                .bytes_mut(block + data_payload_offset() + block_offset, n as u64)?;
            dst.copy_from_slice(&buf[written..written + n]);
            written += n;
            block_offset = 0;
            if written < buf.len() {
                block = self.next_block_or_extend(block)?;
            }
        }

        let mut node = self.get_node(file_off)?;
        node.size = std::cmp::max(node.size, cursor + buf.len() as u64);
        self.put_node(file_off, &node)?;

        self.handles[fd].cursor += written as u64;
        Ok(written)
    }

    fn seek(&mut self, fd: usize, offset: i64, whence: Whence) -> Result<()> {
        self.check_handle(fd)?;
        let file_off = self.handles[fd].file_off;
        let node = self.get_node(file_off)?;

        let new_cursor = match whence {
            Whence::Set => offset,
            Whence::Cur => self.handles[fd].cursor as i64 + offset,
            Whence::End => node.size as i64 - offset,
        };
        if new_cursor < 0 {
            return Err(FsError::InvalidSeek);
        }

        self.handles[fd].cursor = new_cursor as u64;
        Ok(())
    }
}

impl Mapper {
    fn check_handle(&self, fd: usize) -> Result<()> {
        if fd >= self.handles.len() || !self.handles[fd].in_use {
            return Err(FsError::BadHandle);
        }
        Ok(())
    }

    /// Follow `block`'s chain by one hop, allocating and linking a fresh
    /// data block first if the chain ends here.
    fn next_block_or_extend(&mut self, block: Offset) -> Result<Offset> {
        let header: DataBlockHeader = self.store.read_struct(block)?;
        if header.next_block != NONE {
            return Ok(header.next_block);
        }
        let next = self.alloc_data_block()?;
        self.store.write_struct(block, &DataBlockHeader { next_block: next })?;
        Ok(next)
    }
}
