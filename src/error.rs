//! Error types for the blobfs read-only filesystem.

use std::io;

use crate::format::{Inode, Offset};

/// Filesystem error type covering traversal, handle, and backend failures.
///
/// Variants follow the POSIX error taxonomy the on-disk format was designed
/// around (`ENOENT`, `ENOTDIR`, `EISDIR`, `ENOSYS`, `EINVAL`, `EIO`), with
/// structured context where it helps diagnosis. Uses `#[non_exhaustive]` for
/// forward compatibility.
///
/// # Examples
///
/// ```rust
/// use blobfs::BlobFsError;
///
/// let err = BlobFsError::NotADirectory { inode: 13 };
/// assert_eq!(err.to_string(), "not a directory: inode 0x0000000d");
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum BlobFsError {
    // Traversal errors
    /// A path segment or directory entry does not exist.
    ///
    /// Also used by [`DirHandle::next_entry`](crate::DirHandle::next_entry) as
    /// the end-of-iteration signal, matching `ENOENT` from `readdir`-style
    /// interfaces. It is not a fault in that role.
    #[error("not found")]
    NotFound,

    /// Expected a directory inode but found a regular file.
    #[error("not a directory: inode {inode:#010x}")]
    NotADirectory {
        /// Address of the offending inode record.
        inode: Inode,
    },

    /// Expected a regular file inode but found a directory.
    #[error("is a directory: inode {inode:#010x}")]
    IsADirectory {
        /// Address of the offending inode record.
        inode: Inode,
    },

    /// The image uses a feature this reader does not implement.
    ///
    /// Raised for compressed directory indexes and for compressed file
    /// contents when no decoder is wired in.
    #[error("not supported: {operation}")]
    NotSupported {
        /// The unsupported operation.
        operation: &'static str,
    },

    // Handle errors
    /// Seek target outside the handle's valid cursor range.
    #[error("seek position {position} out of range (size {size})")]
    InvalidSeek {
        /// The rejected cursor position.
        position: u32,
        /// The handle's size (file bytes, or directory entry count).
        size: u32,
    },

    // Backend errors
    /// A read extends past the end of the backing blob.
    #[error("read past end of blob: offset {offset:#x} len {len} (blob is {blob_len} bytes)")]
    OutOfBounds {
        /// Blob offset where the read started.
        offset: Offset,
        /// Number of bytes requested.
        len: usize,
        /// Total length of the backing blob.
        blob_len: usize,
    },

    /// A name string ran to the end of the blob without a NUL terminator.
    #[error("unterminated name string at offset {offset:#x}")]
    UnterminatedString {
        /// Blob offset where the string started.
        offset: Offset,
    },

    /// I/O failure surfaced by the byte-access backend.
    #[error("{operation} failed at offset {offset:#x}: {source}")]
    Io {
        /// The backend operation that failed.
        operation: &'static str,
        /// Blob offset involved in the operation.
        offset: Offset,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Generic backend error (e.g. a poisoned reader lock).
    #[error("backend error: {0}")]
    Backend(String),
}

impl BlobFsError {
    /// Returns `true` for [`BlobFsError::NotFound`].
    ///
    /// Convenient when treating `NotFound` from directory iteration as a clean
    /// end-of-listing rather than a failure.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, BlobFsError::NotFound)
    }
}
