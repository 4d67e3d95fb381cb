//! Directory handles: stateful cursors over a directory's entry array.

use std::borrow::Cow;

use crate::error::BlobFsError;
use crate::format::{DIR_ENTRY_INODE_OFFSET, DIR_ENTRY_LEN, DirEntry, Inode, InodeData, Offset};
use crate::store::BlobStore;

/// An open directory, used for listing its contents.
///
/// The cursor counts entries already returned (`0..=entry count`). Like
/// [`FileHandle`](crate::FileHandle), the handle holds a metadata snapshot and
/// borrows only the byte-access backend, not the facade.
///
/// Obtained from [`BlobFs::opendir`](crate::BlobFs::opendir); released by
/// dropping.
#[derive(Debug)]
pub struct DirHandle<'b, S: ?Sized> {
    store: &'b S,
    inode: Inode,
    inode_data: InodeData,
    position: u32,
}

impl<'b, S: BlobStore + ?Sized> DirHandle<'b, S> {
    pub(crate) fn new(store: &'b S, inode: Inode, inode_data: InodeData) -> Self {
        Self {
            store,
            inode,
            inode_data,
            position: 0,
        }
    }

    /// Address of this directory's inode record.
    #[inline]
    pub fn inode(&self) -> Inode {
        self.inode
    }

    /// The inode metadata snapshot captured at open time.
    #[inline]
    pub fn metadata(&self) -> InodeData {
        self.inode_data
    }

    /// Number of entries in the directory.
    #[inline]
    pub fn size(&self) -> u32 {
        self.inode_data.data_size
    }

    /// Index of the next entry to be returned.
    #[inline]
    pub fn tell(&self) -> u32 {
        self.position
    }

    /// Move the cursor to entry index `position`.
    ///
    /// # Errors
    ///
    /// - [`BlobFsError::InvalidSeek`] if `position` exceeds the entry count;
    ///   the cursor is unchanged
    pub fn seek(&mut self, position: u32) -> Result<(), BlobFsError> {
        if position > self.inode_data.data_size {
            return Err(BlobFsError::InvalidSeek {
                position,
                size: self.inode_data.data_size,
            });
        }
        self.position = position;
        Ok(())
    }

    /// Read the next entry, returning it together with the address of its
    /// embedded inode record.
    ///
    /// Entries come back in image order; the format guarantees no particular
    /// sort.
    ///
    /// # Errors
    ///
    /// - [`BlobFsError::NotFound`] when the cursor is past the last entry —
    ///   the end-of-iteration signal, not a fault
    /// - backend errors from the chunk load
    pub fn next_entry(&mut self) -> Result<(DirEntry, Inode), BlobFsError> {
        if self.position >= self.inode_data.data_size {
            return Err(BlobFsError::NotFound);
        }

        let entry_offset = self.inode_data.data_offset + self.position * DIR_ENTRY_LEN as Offset;
        self.position += 1;

        let mut raw = [0u8; DIR_ENTRY_LEN];
        self.store.load_chunk(&mut raw, entry_offset)?;
        let entry = DirEntry::from_bytes(&raw);

        Ok((entry, entry_offset + DIR_ENTRY_INODE_OFFSET))
    }

    /// Like [`next_entry`](Self::next_entry), additionally resolving the
    /// entry's name string.
    ///
    /// The name borrows from the store for zero-copy backends and is owned for
    /// streaming ones; see [`BlobStore::load_str`].
    pub fn next_entry_named(
        &mut self,
    ) -> Result<(DirEntry, Inode, Cow<'b, [u8]>), BlobFsError> {
        let (entry, inode) = self.next_entry()?;
        let store: &'b S = self.store;
        let name = store.load_str(entry.name_offset)?;
        Ok((entry, inode, name))
    }

    /// Consume the handle into an iterator over the remaining entries.
    ///
    /// The end-of-directory sentinel becomes iterator exhaustion; real backend
    /// faults are yielded as `Err` items.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use blobfs::{BlobFs, MemoryStore};
    /// # let blob: &[u8] = &[
    /// #     0, 0, 0, 1, 0, 0, 0, 9, 1,
    /// #     0, 0, 0, 22, 0, 0, 0, 5, 0, 0, 0, 29, 0,
    /// #     b'h', b'i', b'.', b't', b'x', b't', 0,
    /// #     b'h', b'e', b'l', b'l', b'o',
    /// # ];
    /// # let store = MemoryStore::new(blob);
    /// # let fs = BlobFs::new(&store);
    /// let dir = fs.opendir_path("/")?;
    /// for item in dir.entries() {
    ///     let (entry, child) = item?;
    ///     println!("entry at inode {child}: {} bytes", entry.inode_data.data_size);
    /// }
    /// # Ok::<(), blobfs::BlobFsError>(())
    /// ```
    pub fn entries(self) -> Entries<'b, S> {
        Entries { dir: self }
    }
}

/// Iterator over a directory's remaining entries.
///
/// Created by [`DirHandle::entries`].
#[derive(Debug)]
pub struct Entries<'b, S: ?Sized> {
    dir: DirHandle<'b, S>,
}

impl<S: BlobStore + ?Sized> Iterator for Entries<'_, S> {
    type Item = Result<(DirEntry, Inode), BlobFsError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.dir.next_entry() {
            Err(e) if e.is_not_found() => None,
            other => Some(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    /// Root inode at 0, two entries at 9: "a" (file, 1 byte at 41) and
    /// "bb" (empty directory). Names at 35 and 37.
    fn dir_fixture() -> Vec<u8> {
        let mut blob = Vec::new();
        blob.extend_from_slice(&2u32.to_be_bytes()); // root: 2 entries
        blob.extend_from_slice(&9u32.to_be_bytes()); //   at offset 9
        blob.push(crate::format::FLAG_DIR);

        blob.extend_from_slice(&35u32.to_be_bytes()); // entry 0: name "a"
        blob.extend_from_slice(&1u32.to_be_bytes()); //   1 byte
        blob.extend_from_slice(&41u32.to_be_bytes()); //   at 41
        blob.push(0);

        blob.extend_from_slice(&37u32.to_be_bytes()); // entry 1: name "bb"
        blob.extend_from_slice(&0u32.to_be_bytes()); //   empty dir
        blob.extend_from_slice(&0u32.to_be_bytes());
        blob.push(crate::format::FLAG_DIR);

        blob.extend_from_slice(b"a\0"); // 35
        blob.extend_from_slice(b"bb\0"); // 37
        blob.push(0); // 40: padding
        blob.push(b'!'); // 41: contents of "a"
        blob
    }

    fn root_inode_data() -> InodeData {
        InodeData {
            data_size: 2,
            data_offset: 9,
            flags: crate::format::FLAG_DIR,
        }
    }

    #[test]
    fn iterates_exactly_size_entries_then_not_found() {
        let blob = dir_fixture();
        let store = MemoryStore::new(&blob);
        let mut dir = DirHandle::new(&store, 0, root_inode_data());

        for _ in 0..dir.size() {
            dir.next_entry().unwrap();
        }
        let err = dir.next_entry().unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn next_entry_returns_embedded_inode_address() {
        let blob = dir_fixture();
        let store = MemoryStore::new(&blob);
        let mut dir = DirHandle::new(&store, 0, root_inode_data());

        let (entry, inode) = dir.next_entry().unwrap();
        assert_eq!(entry.name_offset, 35);
        assert_eq!(entry.inode_data.data_size, 1);
        assert_eq!(inode, 9 + DIR_ENTRY_INODE_OFFSET);

        let (entry, inode) = dir.next_entry().unwrap();
        assert_eq!(entry.name_offset, 37);
        assert!(entry.inode_data.is_dir());
        assert_eq!(inode, 9 + DIR_ENTRY_LEN as u32 + DIR_ENTRY_INODE_OFFSET);
    }

    #[test]
    fn next_entry_named_resolves_names() {
        let blob = dir_fixture();
        let store = MemoryStore::new(&blob);
        let mut dir = DirHandle::new(&store, 0, root_inode_data());

        let (_, _, name) = dir.next_entry_named().unwrap();
        assert_eq!(name.as_ref(), b"a");
        let (_, _, name) = dir.next_entry_named().unwrap();
        assert_eq!(name.as_ref(), b"bb");
    }

    #[test]
    fn seek_bounds_are_checked_against_target() {
        let blob = dir_fixture();
        let store = MemoryStore::new(&blob);
        let mut dir = DirHandle::new(&store, 0, root_inode_data());

        // The whole 0..=size range is valid.
        for target in 0..=dir.size() {
            dir.seek(target).unwrap();
            assert_eq!(dir.tell(), target);
        }

        let err = dir.seek(3).unwrap_err();
        assert!(matches!(err, BlobFsError::InvalidSeek { position: 3, size: 2 }));
        assert_eq!(dir.tell(), 2, "failed seek must not move the cursor");
    }

    #[test]
    fn seek_rewinds_iteration() {
        let blob = dir_fixture();
        let store = MemoryStore::new(&blob);
        let mut dir = DirHandle::new(&store, 0, root_inode_data());

        let (first, _) = dir.next_entry().unwrap();
        dir.next_entry().unwrap();
        dir.seek(0).unwrap();
        let (again, _) = dir.next_entry().unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn entries_iterator_ends_cleanly() {
        let blob = dir_fixture();
        let store = MemoryStore::new(&blob);
        let dir = DirHandle::new(&store, 0, root_inode_data());

        let collected: Result<Vec<_>, _> = dir.entries().collect();
        assert_eq!(collected.unwrap().len(), 2);
    }
}
