//! # blobfs
//!
//! A read-only filesystem whose entire contents — metadata and data — are
//! packed into one contiguous binary blob. Typical homes for such an image are
//! firmware flash partitions, `include_bytes!`-embedded assets, or a region of
//! RAM on a microcontroller: anywhere a mutable storage layer is unavailable
//! or unwanted.
//!
//! The crate resolves POSIX-style paths, iterates directories, and reads file
//! contents through a pluggable byte-access layer, without ever mutating the
//! image.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use blobfs::{BlobFs, MemoryStore};
//!
//! // A one-file image: root directory with a single "hi.txt" entry.
//! let blob: &[u8] = &[
//!     0, 0, 0, 1, 0, 0, 0, 9, 1, // root inode: 1 entry at offset 9
//!     0, 0, 0, 22, 0, 0, 0, 5, 0, 0, 0, 29, 0, // entry: name at 22, 5 bytes at 29
//!     b'h', b'i', b'.', b't', b'x', b't', 0, // name string
//!     b'h', b'e', b'l', b'l', b'o', // file contents
//! ];
//! let store = MemoryStore::new(blob);
//! let fs = BlobFs::new(&store);
//!
//! assert_eq!(fs.read("/hi.txt")?, b"hello");
//!
//! let dir = fs.opendir_path("/")?;
//! for item in dir.entries() {
//!     let (entry, child_inode) = item?;
//!     println!("inode {child_inode}: {} bytes", entry.inode_data.data_size);
//! }
//! # Ok::<(), blobfs::BlobFsError>(())
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`BlobFs`] | Facade — `lookup`, `stat`, `open`, `opendir` |
//! | [`BlobStore`] | Byte-access trait backends implement |
//! | [`MemoryStore`] | Backend over an in-memory byte slice |
//! | [`ReaderStore`] | Backend over any `Read + Seek` source |
//! | [`FileHandle`] | Seek/tell/read cursor over one file |
//! | [`DirHandle`] | Seek/tell/next-entry cursor over one directory |
//! | [`InodeData`] | Decoded inode record (size, offset, flags) |
//! | [`DirEntry`] | Decoded directory entry (name offset + inode record) |
//! | [`BlobFsError`] | POSIX-style error taxonomy |
//!
//! ---
//!
//! ## On-Disk Format
//!
//! See the [`format`] module for the bit-exact layout. In short: the root
//! directory's 9-byte inode record sits at offset 0; directories are flat
//! arrays of 13-byte entries; names are NUL-terminated byte strings referenced
//! by absolute offset; every multi-byte integer is big-endian. An inode's
//! *address* is simply the blob offset of its record.
//!
//! The format reserves a compression flag for file contents. No decoder ships
//! with this crate; opening a compressed file (or traversing a compressed
//! directory index, which the format forbids) returns
//! [`BlobFsError::NotSupported`].
//!
//! ---
//!
//! ## Error Handling
//!
//! All operations return `Result<T, BlobFsError>`. End-of-file reads are not
//! errors (they return `Ok(0)`), and directory iteration signals its end with
//! [`BlobFsError::NotFound`], mirroring `readdir`'s `ENOENT` convention.
//!
//! ---
//!
//! ## Concurrency
//!
//! Everything is synchronous: a backend fetch blocks the caller until done.
//! The core takes no locks of its own because the image is immutable; sharing
//! a store across threads is safe exactly when the backend is
//! (`BlobStore: Send + Sync` is required, and both shipped backends qualify).
//! Handles are independent single-owner cursors — operations on one handle
//! never observe another.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Enable serialization for [`InodeData`], [`DirEntry`], [`FileType`] |

// Private modules
mod dir;
mod error;
mod file;
mod fs;
mod store;

// The wire format is public: image tooling needs the exact constants.
pub mod format;

// Public re-exports - error type
pub use error::BlobFsError;

// Public re-exports - facade and handles
pub use dir::{DirHandle, Entries};
pub use file::FileHandle;
pub use fs::BlobFs;

// Public re-exports - byte-access layer
pub use store::{BlobStore, MemoryStore, ReaderStore};

// Public re-exports - format types
pub use format::{DirEntry, FileType, Inode, InodeData, Offset, ROOT_INODE};
