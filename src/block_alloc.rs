//! The block allocator: a LIFO free list of whole blocks, rooted in the
//! root record, that falls back to growing the backing store on
//! exhaustion.

use crate::error::Result;
use crate::layout::{
    data_payload_offset, DataBlockHeader, EmptyBlockHeader, NodeBlockHeader, Offset, DATA_PER_BLOCK,
    NONE,
};
use crate::mapper::Mapper;

/// Allocation and deallocation of whole blocks.
pub trait BlockAllocator {
    /// Return a block: the head of the free-block list if non-empty,
    /// otherwise a freshly grown block. Contents of a reused block are
    /// whatever was left behind by `free_block`; callers zero or
    /// initialize as needed.
    fn alloc_block(&mut self) -> Result<Offset>;

    /// Allocate a block and zero its data payload, ready to be linked into
    /// a file's block chain.
    fn alloc_data_block(&mut self) -> Result<Offset>;

    /// Allocate a block, initialize it as an empty node block, and push it
    /// onto the head of the node-block list so it becomes the block the
    /// node allocator fills next.
    fn alloc_node_block(&mut self) -> Result<Offset>;

    /// Return `off` to the head of the free-block list.
    fn free_block(&mut self, off: Offset) -> Result<()>;
}

impl BlockAllocator for Mapper {
    fn alloc_block(&mut self) -> Result<Offset> {
        let mut root = self.root_record()?;
        if root.first_free_block != NONE {
            let head = root.first_free_block;
            let empty: EmptyBlockHeader = self.store.read_struct(head)?;
            root.first_free_block = empty.next_block;
            self.put_root_record(&root)?;
            return Ok(head);
        }
        self.store.grow_one_block()
    }

    fn alloc_data_block(&mut self) -> Result<Offset> {
        let off = self.alloc_block()?;
        self.store
            .write_struct(off, &DataBlockHeader { next_block: NONE })?;
        let zero = vec![0u8; *DATA_PER_BLOCK as usize];
        let dst = self
            .store
            .bytes_mut(off + data_payload_offset(), *DATA_PER_BLOCK)?;
        dst.copy_from_slice(&zero);
        Ok(off)
    }

    fn alloc_node_block(&mut self) -> Result<Offset> {
        let off = self.alloc_block()?;
        let mut root = self.root_record()?;
        self.store.write_struct(
            off,
            &NodeBlockHeader {
                next_block: root.first_node_block,
                node_count: 0,
            },
        )?;
        root.first_node_block = off;
        self.put_root_record(&root)?;
        Ok(off)
    }

    fn free_block(&mut self, off: Offset) -> Result<()> {
        let mut root = self.root_record()?;
        self.store.write_struct(
            off,
            &EmptyBlockHeader {
                next_block: root.first_free_block,
            },
        )?;
        root.first_free_block = off;
        self.put_root_record(&root)
    }
}
