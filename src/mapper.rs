//! [`Mapper`]: the handle on an open filesystem, tying the backing store,
//! the open-file table, and the root record together.

use std::path::Path;

use crate::error::{FsError, Result};
use crate::layout::{Node, NodeType, NodeTypeTag, Offset, RootRecord, FD_MAX, NAME_MAX, NONE};
use crate::node_alloc::NodeAllocator;
use crate::store::BackingStore;

/// One open file handle: which inode it points at, and where the next
/// read or write will pick up.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HandleSlot {
    pub(crate) in_use: bool,
    pub(crate) file_off: Offset,
    pub(crate) cursor: u64,
}

impl Default for HandleSlot {
    fn default() -> Self {
        HandleSlot {
            in_use: false,
            file_off: NONE,
            cursor: 0,
        }
    }
}

/// An open filesystem. Owns the memory-mapped backing store and the table
/// of open file handles; every operation in this crate is a method (direct
/// or through one of the `*Allocator`/`Namespace`/`FileIo` traits) on this
/// type.
#[derive(Debug)]
pub struct Mapper {
    pub(crate) store: BackingStore,
    pub(crate) handles: Vec<HandleSlot>,
}

impl Mapper {
    /// Open the file at `path` as a filesystem, creating and initializing
    /// it (a root record and an empty root directory) if it does not
    /// already exist or is empty.
    pub fn open_store<P: AsRef<Path>>(path: P) -> Result<Mapper> {
        let (store, freshly_created) = BackingStore::open(path)?;
        let handles = vec![HandleSlot::default(); FD_MAX];
        let mut mapper = Mapper { store, handles };

        if freshly_created {
            mapper.store.write_struct(0, &RootRecord::empty())?;
            let root_dir_off = mapper.alloc_node()?;
            let root_dir_node = Node::new(NodeType::Dir, NONE, [0u8; NAME_MAX]);
            mapper.put_node(root_dir_off, &root_dir_node)?;

            let mut root = mapper.root_record()?;
            root.root_dir = root_dir_off;
            mapper.put_root_record(&root)?;
        }

        Ok(mapper)
    }

    /// Flush pending writes and drop the mapping.
    pub fn close_store(mut self) -> Result<()> {
        self.store.flush()
    }

    /// Flush pending writes without closing.
    pub fn flush(&mut self) -> Result<()> {
        self.store.flush()
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// Current length of the backing store, in bytes. Always a multiple of
    /// [`crate::BLOCK`]; exposed mainly so callers can observe that
    /// deletion frees space for reuse rather than forcing further growth.
    pub fn store_len(&self) -> u64 {
        self.store.len()
    }

    pub(crate) fn root_record(&self) -> Result<RootRecord> {
        self.store.read_struct(0)
    }

    pub(crate) fn put_root_record(&mut self, root: &RootRecord) -> Result<()> {
        self.store.write_struct(0, root)
    }

    pub(crate) fn get_node(&self, off: Offset) -> Result<Node> {
        let tag: NodeTypeTag = self.store.read_struct(off)?;
        if tag.0 == NodeType::Root {
            return Err(FsError::Other(anyhow::anyhow!(
                "offset {} holds the root record, not an inode",
                off
            )));
        }
        self.store.read_struct(off)
    }

    pub(crate) fn put_node(&mut self, off: Offset, node: &Node) -> Result<()> {
        self.store.write_struct(off, node)
    }
}
