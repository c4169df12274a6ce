//! The namespace engine: directory children threaded as a singly-linked
//! sibling chain, path resolution, and subtree deletion.

use crate::block_alloc::BlockAllocator;
use crate::error::{FsError, Result};
use crate::layout::{pack_name, unpack_name, DataBlockHeader, Node, NodeType, Offset, NONE};
use crate::mapper::Mapper;
use crate::node_alloc::NodeAllocator;

/// Directory structure and path resolution.
pub trait Namespace {
    /// Offset of the root directory's inode.
    fn root_dir(&self) -> Result<Offset>;

    /// Iterate the immediate children of `dir`, in sibling-chain order.
    fn iter_children(&self, dir: Offset) -> Result<ChildIter<'_>>;

    /// Create a child directory named `name` under `parent`.
    fn create_dir(&mut self, parent: Offset, name: &str) -> Result<Offset>;

    /// Create a child file named `name` under `parent`, zero bytes long.
    fn create_file(&mut self, parent: Offset, name: &str) -> Result<Offset>;

    /// Resolve a `/`-separated path starting at `from`. `.` stays in place,
    /// `..` moves to the parent (a no-op at the root), and an empty path
    /// resolves to `from` itself. Returns `Ok(None)` if any component is
    /// missing.
    fn resolve(&self, from: Offset, path: &str) -> Result<Option<Offset>>;

    /// Delete `off` and, if it is a directory, everything beneath it,
    /// unlinking it from its parent's sibling chain and returning every
    /// node slot and data block it owned to their respective free lists.
    fn delete(&mut self, off: Offset) -> Result<()>;
}

/// Iterator over a directory's immediate children, yielded as inode
/// offsets in sibling-chain order.
pub struct ChildIter<'a> {
    mapper: &'a Mapper,
    next: Offset,
}

impl<'a> Iterator for ChildIter<'a> {
    type Item = Offset;

    fn next(&mut self) -> Option<Offset> {
        if self.next == NONE {
            return None;
        }
        let cur = self.next;
        let node = self.mapper.get_node(cur).ok()?;
        self.next = node.next_sibling;
        Some(cur)
    }
}

impl Namespace for Mapper {
    fn root_dir(&self) -> Result<Offset> {
        Ok(self.root_record()?.root_dir)
    }

    fn iter_children(&self, dir: Offset) -> Result<ChildIter<'_>> {
        let node = self.get_node(dir)?;
        if node.node_type != NodeType::Dir {
            return Err(FsError::NotADir);
        }
        Ok(ChildIter {
            mapper: self,
            next: node.first_child,
        })
    }

    fn create_dir(&mut self, parent: Offset, name: &str) -> Result<Offset> {
        self.create_child(parent, name, NodeType::Dir)
    }

    fn create_file(&mut self, parent: Offset, name: &str) -> Result<Offset> {
        self.create_child(parent, name, NodeType::File)
    }

    fn resolve(&self, from: Offset, path: &str) -> Result<Option<Offset>> {
        if path.is_empty() {
            return Ok(Some(from));
        }

        let mut cur = from;
        for token in path.split('/') {
            if token.is_empty() || token == "." {
                continue;
            }
            if token == ".." {
                let node = self.get_node(cur)?;
                if node.parent != NONE {
                    cur = node.parent;
                }
                continue;
            }
            match self.child_named(cur, token)? {
                Some(off) => cur = off,
                None => return Ok(None),
            }
        }
        Ok(Some(cur))
    }

    fn delete(&mut self, off: Offset) -> Result<()> {
        let root = self.root_dir()?;
        if off == root {
            return Err(FsError::IsRoot);
        }

        let node = self.get_node(off)?;
        self.unlink_from_parent(node.parent, off)?;

        // Collect the whole subtree with an explicit stack so a deep tree
        // cannot overflow the call stack the way a recursive walk would.
        let mut to_free = Vec::new();
        let mut stack = vec![off];
        while let Some(cur) = stack.pop() {
            let cur_node = self.get_node(cur)?;
            if cur_node.node_type == NodeType::Dir {
                let mut child = cur_node.first_child;
                while child != NONE {
                    let child_node = self.get_node(child)?;
                    stack.push(child);
                    child = child_node.next_sibling;
                }
            }
            to_free.push(cur);
        }

        for n in to_free {
            let n_node = self.get_node(n)?;
            if n_node.node_type == NodeType::File {
                self.free_block_chain(n_node.first_block)?;
            }
            self.free_node(n)?;
        }
        Ok(())
    }
}

impl Mapper {
    fn child_named(&self, dir: Offset, name: &str) -> Result<Option<Offset>> {
        for child in self.iter_children(dir)? {
            let child_node = self.get_node(child)?;
            if unpack_name(&child_node.name) == name {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }

    fn create_child(&mut self, parent: Offset, name: &str, kind: NodeType) -> Result<Offset> {
        let parent_node = self.get_node(parent)?;
        if parent_node.node_type != NodeType::Dir {
            return Err(FsError::NotADir);
        }
        let name_buf = pack_name(name).ok_or(FsError::InvalidName(
            "name must be 1..=63 bytes and contain no '/'",
        ))?;

        if self.child_named(parent, name)?.is_some() {
            return Err(FsError::AlreadyExists(name.to_string()));
        }

        // `alloc_node` may grow the store, so the parent's node is
        // re-fetched afterward rather than reused from above.
        let new_off = self.alloc_node()?;
        let parent_node = self.get_node(parent)?;

        let mut new_node = Node::new(kind, parent, name_buf);
        new_node.next_sibling = parent_node.first_child;
        self.put_node(new_off, &new_node)?;

        let mut parent_node = parent_node;
        parent_node.first_child = new_off;
        self.put_node(parent, &parent_node)?;

        Ok(new_off)
    }

    fn unlink_from_parent(&mut self, parent: Offset, off: Offset) -> Result<()> {
        let parent_node = self.get_node(parent)?;
        if parent_node.first_child == off {
            let node = self.get_node(off)?;
            let mut updated = parent_node;
            updated.first_child = node.next_sibling;
            return self.put_node(parent, &updated);
        }

        let mut prev = parent_node.first_child;
        while prev != NONE {
            let mut prev_node = self.get_node(prev)?;
            if prev_node.next_sibling == off {
                let node = self.get_node(off)?;
                prev_node.next_sibling = node.next_sibling;
                return self.put_node(prev, &prev_node);
            }
            prev = prev_node.next_sibling;
        }
        Ok(())
    }

    fn free_block_chain(&mut self, first: Offset) -> Result<()> {
        let mut cur = first;
        while cur != NONE {
            let header: DataBlockHeader = self.store.read_struct(cur)?;
            let next = header.next_block;
            self.free_block(cur)?;
            cur = next;
        }
        Ok(())
    }
}
