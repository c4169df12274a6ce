//! The error type returned by every fallible operation in this crate.
//!
//! One `thiserror` enum covers every layer, with `#[from]` conversions so
//! `?` composes across the store, allocator, and namespace layers without
//! manual wrapping.

use std::io;
use thiserror::Error;

/// Errors that can occur while operating on a [`crate::Mapper`].
#[derive(Error, Debug)]
pub enum FsError {
    /// A read, write, growth, or sync of the backing file failed. Fatal:
    /// the mapper should not be used further once this is returned.
    #[error("I/O error in the backing store")]
    Io(#[from] io::Error),

    /// Encoding or decoding a fixed-size on-disk record failed.
    #[error("failed to (de)serialize an on-disk record")]
    Serialize(#[from] bincode::Error),

    /// `create_dir`/`create_file` was called with a name that is already
    /// in use among the parent's children.
    #[error("a child named {0:?} already exists in this directory")]
    AlreadyExists(String),

    /// `resolve` walked off a path component that does not exist.
    #[error("path component not found")]
    NotFound,

    /// An operation that requires a FILE inode was given something else.
    #[error("inode is not a file")]
    NotAFile,

    /// An operation that requires a DIR inode was given something else.
    #[error("inode is not a directory")]
    NotADir,

    /// A name was empty, contained `'/'`, or exceeded `NAME_MAX - 1` bytes.
    #[error("invalid name: {0}")]
    InvalidName(&'static str),

    /// The open-handle table had no free slot left.
    #[error("too many open files")]
    TooManyOpen,

    /// A handle index was out of range, or referred to a closed slot.
    #[error("bad file handle")]
    BadHandle,

    /// An attempt was made to delete the root directory.
    #[error("cannot delete the root directory")]
    IsRoot,

    /// A `seek` would have moved the cursor before the start of the file.
    #[error("seek would move the cursor before the start of the file")]
    InvalidSeek,

    /// Catch-all for error conditions raised by callers composing this
    /// crate with other fallible code.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Shorthand `Result` alias used throughout this crate.
pub type Result<T> = std::result::Result<T, FsError>;
