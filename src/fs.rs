//! The filesystem facade: path resolution, directory lookup, stat, open.

use crate::dir::DirHandle;
use crate::error::BlobFsError;
use crate::file::FileHandle;
use crate::format::{
    DIR_ENTRY_INODE_OFFSET, DIR_ENTRY_LEN, INODE_DATA_LEN, Inode, InodeData, Offset, ROOT_INODE,
};
use crate::store::BlobStore;

/// Read-only view over a packed filesystem image.
///
/// The facade borrows a [`BlobStore`] owned by the embedding application;
/// handles it creates copy that borrow, so they are independent of the facade
/// itself. The image must outlive every handle, which the borrow checker
/// enforces.
///
/// # Example
///
/// ```rust
/// use blobfs::{BlobFs, MemoryStore};
///
/// // A one-file image: root directory with a single "hi.txt" entry.
/// let blob: &[u8] = &[
///     0, 0, 0, 1, 0, 0, 0, 9, 1, // root inode: 1 entry at offset 9
///     0, 0, 0, 22, 0, 0, 0, 5, 0, 0, 0, 29, 0, // entry: name at 22, 5 bytes at 29
///     b'h', b'i', b'.', b't', b'x', b't', 0, // name string
///     b'h', b'e', b'l', b'l', b'o', // file contents
/// ];
/// let store = MemoryStore::new(blob);
/// let fs = BlobFs::new(&store);
///
/// assert_eq!(fs.read("/hi.txt")?, b"hello");
/// # Ok::<(), blobfs::BlobFsError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BlobFs<'b, S: ?Sized> {
    store: &'b S,
}

impl<'b, S: BlobStore + ?Sized> BlobFs<'b, S> {
    /// Mount an image through the given byte-access backend.
    ///
    /// No validation is performed; a malformed image surfaces as lookup and
    /// read errors, not at mount time.
    pub fn new(store: &'b S) -> Self {
        Self { store }
    }

    /// The byte-access backend this facade reads through.
    pub fn store(&self) -> &'b S {
        self.store
    }

    // ==== Path resolution ====

    /// Resolve an absolute path to an inode address.
    ///
    /// The path must start with `/`. Segments are matched one at a time with
    /// [`lookup_child`](Self::lookup_child), left to right, no backtracking.
    /// Empty segments are skipped, so `"/foo//bar/"` resolves like
    /// `"/foo/bar"`, and `"/"` resolves to [`ROOT_INODE`].
    ///
    /// # Errors
    ///
    /// - [`BlobFsError::NotFound`] if the path is empty, does not start with
    ///   `/`, or names a missing entry
    /// - any error from a failed lookup step, propagated as-is
    pub fn lookup(&self, path: &str) -> Result<Inode, BlobFsError> {
        if !path.starts_with('/') {
            return Err(BlobFsError::NotFound);
        }

        let mut inode = ROOT_INODE;
        for segment in path.split('/') {
            if segment.is_empty() {
                continue;
            }
            inode = self.lookup_child(inode, segment.as_bytes())?;
        }
        Ok(inode)
    }

    /// Look up a child by name directly under `parent`.
    ///
    /// Scans the parent's entry array from index 0 and returns the address of
    /// the first matching entry's embedded inode record. Names compare as raw
    /// bytes; the format neither sorts nor deduplicates entries, so the first
    /// match wins.
    ///
    /// # Errors
    ///
    /// - [`BlobFsError::NotADirectory`] if `parent` is a regular file
    /// - [`BlobFsError::NotSupported`] if the parent's entry array is flagged
    ///   compressed
    /// - [`BlobFsError::NotFound`] if the scan exhausts all entries
    pub fn lookup_child(&self, parent: Inode, name: &[u8]) -> Result<Inode, BlobFsError> {
        let parent_data = self.stat(parent)?;

        if !parent_data.is_dir() {
            return Err(BlobFsError::NotADirectory { inode: parent });
        }
        if parent_data.is_compressed() {
            return Err(BlobFsError::NotSupported {
                operation: "compressed directory index",
            });
        }

        // TODO: switch to binary search once the image builder writes entries
        // in sorted name order.
        let mut entry_offset = parent_data.data_offset;
        for _ in 0..parent_data.data_size {
            let mut raw = [0u8; 4];
            self.store.load_chunk(&mut raw, entry_offset)?;
            let name_offset = u32::from_be_bytes(raw);

            let child_name = self.store.load_str(name_offset)?;
            if child_name.as_ref() == name {
                return Ok(entry_offset + DIR_ENTRY_INODE_OFFSET);
            }

            entry_offset += DIR_ENTRY_LEN as Offset;
        }

        Err(BlobFsError::NotFound)
    }

    // ==== Stat ====

    /// Load and decode the inode record at `inode`.
    pub fn stat(&self, inode: Inode) -> Result<InodeData, BlobFsError> {
        let mut raw = [0u8; INODE_DATA_LEN];
        self.store.load_chunk(&mut raw, inode)?;
        Ok(InodeData::from_bytes(&raw))
    }

    /// Resolve `path` and stat it, returning the inode address alongside the
    /// metadata.
    pub fn stat_path(&self, path: &str) -> Result<(InodeData, Inode), BlobFsError> {
        let inode = self.lookup(path)?;
        Ok((self.stat(inode)?, inode))
    }

    // ==== Open ====

    /// Open the regular file at `inode` for reading.
    ///
    /// # Errors
    ///
    /// - [`BlobFsError::IsADirectory`] if the inode is a directory
    /// - [`BlobFsError::NotSupported`] if the file's contents are compressed
    ///   and no decoder is available
    pub fn open(&self, inode: Inode) -> Result<FileHandle<'b, S>, BlobFsError> {
        let inode_data = self.stat(inode)?;

        if inode_data.is_dir() {
            return Err(BlobFsError::IsADirectory { inode });
        }
        if inode_data.is_compressed() {
            return Err(BlobFsError::NotSupported {
                operation: "compressed file contents",
            });
        }

        Ok(FileHandle::new(self.store, inode, inode_data))
    }

    /// Resolve `path` and open it as a regular file.
    pub fn open_path(&self, path: &str) -> Result<FileHandle<'b, S>, BlobFsError> {
        let inode = self.lookup(path)?;
        self.open(inode)
    }

    /// Open the directory at `inode` for listing.
    ///
    /// # Errors
    ///
    /// - [`BlobFsError::NotADirectory`] if the inode is a regular file
    pub fn opendir(&self, inode: Inode) -> Result<DirHandle<'b, S>, BlobFsError> {
        let inode_data = self.stat(inode)?;

        if !inode_data.is_dir() {
            return Err(BlobFsError::NotADirectory { inode });
        }

        Ok(DirHandle::new(self.store, inode, inode_data))
    }

    /// Resolve `path` and open it as a directory.
    pub fn opendir_path(&self, path: &str) -> Result<DirHandle<'b, S>, BlobFsError> {
        let inode = self.lookup(path)?;
        self.opendir(inode)
    }

    // ==== Convenience ====

    /// Read an entire file by path.
    pub fn read(&self, path: &str) -> Result<Vec<u8>, BlobFsError> {
        let mut file = self.open_path(path)?;
        let mut contents = vec![0u8; file.size() as usize];
        let n = file.read(&mut contents)?;
        contents.truncate(n);
        Ok(contents)
    }
}
