//! On-disk record types and the fixed sizing constants that govern how many
//! of them pack into a block.
//!
//! Every record here derives `Serialize`/`Deserialize` and is encoded with
//! `bincode`. Encoding is deterministic and content-independent in length,
//! which is what lets us compute `NODES_PER_BLOCK` once and reuse it for
//! slot arithmetic.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Size of a block, in bytes. Both node blocks and data blocks are exactly
/// this size.
pub const BLOCK: u64 = 4096;

/// Maximum length, including the implicit terminator, of a stored name.
pub const NAME_MAX: usize = 64;

/// Number of slots in the open-handle table.
pub const FD_MAX: usize = 1024;

/// A byte offset from the start of the backing store. The only form a
/// persistent reference takes; `NONE` is the reserved "absent" sentinel.
pub type Offset = u64;

/// Reserved sentinel meaning "no offset" in every `next_*`/`first_*` field.
pub const NONE: Offset = 0;

/// Distinguishes what a node slot currently holds.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// The root record at offset 0, when read back as a node-shaped tag.
    Root,
    /// A regular file.
    File,
    /// A directory.
    Dir,
    /// Reserved for a future symbolic link type; never constructed.
    Symlink,
}

/// A fixed-width, NUL-padded name buffer.
pub type NameBuf = [u8; NAME_MAX];

/// Encode a `&str` into a zero-padded `NameBuf`, failing if it does not fit.
pub fn pack_name(name: &str) -> Option<NameBuf> {
    let bytes = name.as_bytes();
    if bytes.is_empty() || bytes.len() > NAME_MAX - 1 || bytes.contains(&b'/') {
        return None;
    }
    let mut buf = [0u8; NAME_MAX];
    buf[..bytes.len()].copy_from_slice(bytes);
    Some(buf)
}

/// Decode a `NameBuf` back into a `String`, stopping at the first NUL.
pub fn unpack_name(buf: &NameBuf) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

/// An inode: a directory, a file, or (when read by accident) the root
/// record. Directory-only and file-only fields are both always present so
/// every node has the same encoded length, the flattened analogue of the
/// source's `union { FileNode file; DirNode dir; }`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    /// What kind of node this is.
    pub node_type: NodeType,
    /// Offset of the parent directory's inode, or `NONE` for the root.
    pub parent: Offset,
    /// Offset of the next sibling within the same parent, or `NONE`.
    pub next_sibling: Offset,
    /// Fixed-width, NUL-padded name.
    pub name: NameBuf,
    /// DIR only: offset of the first child, or `NONE`.
    pub first_child: Offset,
    /// FILE only: length of the file's contents, in bytes.
    pub size: u64,
    /// FILE only: offset of the first data block in the chain, or `NONE`.
    pub first_block: Offset,
}

impl Node {
    /// A zeroed node of the given type, parent and name, with both variant
    /// payloads cleared. Callers still need to set up the payload that
    /// matters for `node_type`.
    pub fn new(node_type: NodeType, parent: Offset, name: NameBuf) -> Node {
        Node {
            node_type,
            parent,
            next_sibling: NONE,
            name,
            first_child: NONE,
            size: 0,
            first_block: NONE,
        }
    }
}

/// Overwrites a freed node slot. Only the leading bytes of the slot are
/// touched; whatever stale `Node` bytes follow are never read back, because
/// `EmptyNode` is all a slot on the free list is ever decoded as.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyNode {
    /// Offset of the next free node, or `NONE`.
    pub next_node: Offset,
}

/// Header of a block that holds a packed array of node slots.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeBlockHeader {
    /// Offset of the next node block in the node-block list, or `NONE`.
    pub next_block: Offset,
    /// Number of slots in this block that have ever been handed out.
    /// Monotonically non-decreasing; freed slots are recycled through the
    /// free-node list, not by shrinking this count.
    pub node_count: u64,
}

/// Header of a block that holds raw file bytes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataBlockHeader {
    /// Offset of the next data block in this file's chain, or `NONE`.
    pub next_block: Offset,
}

/// Overwrites a freed block. A block on the free-block list is only ever
/// decoded as this header.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyBlockHeader {
    /// Offset of the next free block, or `NONE`.
    pub next_block: Offset,
}

/// The fixed header at offset 0 of the backing store.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootRecord {
    /// Leads with the same tag type a `Node` leads with, so decoding just
    /// the tag at offset 0 reliably reports `NodeType::Root`.
    pub tag: NodeType,
    /// Head of the free-inode list, or `NONE`.
    pub first_free_node: Offset,
    /// Head of the free-block list, or `NONE`.
    pub first_free_block: Offset,
    /// Offset of the root directory's inode.
    pub root_dir: Offset,
    /// Head of the node-block list, or `NONE`.
    pub first_node_block: Offset,
}

impl RootRecord {
    /// A freshly initialized root record: every list empty, `root_dir`
    /// filled in once the root directory inode has been allocated.
    pub fn empty() -> RootRecord {
        RootRecord {
            tag: NodeType::Root,
            first_free_node: NONE,
            first_free_block: NONE,
            root_dir: NONE,
            first_node_block: NONE,
        }
    }
}

/// Decodes only the leading tag of a node-shaped record, without requiring
/// the rest of the record's bytes to be a valid `Node`. Used to recognize
/// the root record if it is ever reached through an inode-shaped path.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeTypeTag(pub NodeType);

lazy_static! {
    /// Encoded size, in bytes, of a `Node`. Computed once and reused
    /// everywhere a slot's length is needed, rather than re-deriving it.
    pub static ref NODE_SIZE: u64 = {
        let sample = Node::new(NodeType::Dir, NONE, [0u8; NAME_MAX]);
        bincode::serialize(&sample).unwrap().len() as u64
    };

    /// Encoded size, in bytes, of a `NodeBlockHeader`.
    pub static ref NODE_BLOCK_HEADER_SIZE: u64 = {
        let sample = NodeBlockHeader { next_block: NONE, node_count: 0 };
        bincode::serialize(&sample).unwrap().len() as u64
    };

    /// Encoded size, in bytes, of a `DataBlockHeader`.
    pub static ref DATA_BLOCK_HEADER_SIZE: u64 = {
        let sample = DataBlockHeader { next_block: NONE };
        bincode::serialize(&sample).unwrap().len() as u64
    };

    /// How many inode slots fit in one node block after its header.
    pub static ref NODES_PER_BLOCK: u64 = (BLOCK - *NODE_BLOCK_HEADER_SIZE) / *NODE_SIZE;

    /// How many bytes of file data fit in one data block after its header.
    pub static ref DATA_PER_BLOCK: u64 = BLOCK - *DATA_BLOCK_HEADER_SIZE;
}

/// Byte offset, within a node block, of the header.
pub const NODE_BLOCK_HEADER_OFFSET: u64 = 0;

/// Byte offset, within a node block, of the first inode slot.
pub fn node_slot_offset(index: u64) -> u64 {
    *NODE_BLOCK_HEADER_SIZE + index * (*NODE_SIZE)
}

/// Byte offset, within a data block, of the payload.
pub fn data_payload_offset() -> u64 {
    *DATA_BLOCK_HEADER_SIZE
}
