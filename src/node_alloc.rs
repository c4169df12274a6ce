//! The node allocator: a free list of inode slots, backed by a chain of
//! node blocks that grows (via the block allocator) when every existing
//! slot is in use.

use crate::block_alloc::BlockAllocator;
use crate::error::Result;
use crate::layout::{node_slot_offset, EmptyNode, NodeBlockHeader, Offset, NODES_PER_BLOCK, NONE};
use crate::mapper::Mapper;

/// Allocation and deallocation of inode slots.
pub trait NodeAllocator {
    /// Return a node slot: the head of the free-node list if non-empty,
    /// otherwise the next unused slot in the current node block, otherwise
    /// a freshly allocated node block's first slot.
    fn alloc_node(&mut self) -> Result<Offset>;

    /// Return `off` to the head of the free-node list.
    fn free_node(&mut self, off: Offset) -> Result<()>;
}

impl NodeAllocator for Mapper {
    fn alloc_node(&mut self) -> Result<Offset> {
        let mut root = self.root_record()?;
        if root.first_free_node != NONE {
            let head = root.first_free_node;
            let empty: EmptyNode = self.store.read_struct(head)?;
            root.first_free_node = empty.next_node;
            self.put_root_record(&root)?;
            return Ok(head);
        }

        if root.first_node_block != NONE {
            let block_off = root.first_node_block;
            let mut header: NodeBlockHeader = self.store.read_struct(block_off)?;
            if header.node_count < *NODES_PER_BLOCK {
                let slot = block_off + node_slot_offset(header.node_count);
                header.node_count += 1;
                self.store.write_struct(block_off, &header)?;
                return Ok(slot);
            }
        }

        let block_off = self.alloc_node_block()?;
        let mut header: NodeBlockHeader = self.store.read_struct(block_off)?;
        header.node_count = 1;
        self.store.write_struct(block_off, &header)?;
        Ok(block_off + node_slot_offset(0))
    }

    fn free_node(&mut self, off: Offset) -> Result<()> {
        let mut root = self.root_record()?;
        self.store.write_struct(
            off,
            &EmptyNode {
                next_node: root.first_free_node,
            },
        )?;
        root.first_free_node = off;
        self.put_root_record(&root)
    }
}
