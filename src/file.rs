//! File handles: stateful read cursors over a regular file's contents.

use std::io;

use crate::error::BlobFsError;
use crate::format::{Inode, InodeData};
use crate::store::BlobStore;

/// An open regular file.
///
/// Holds a snapshot of the inode's metadata taken at open time (never
/// re-validated against the image — the image is immutable), a byte cursor,
/// and a borrow of the byte-access backend. The handle does not borrow the
/// [`BlobFs`](crate::BlobFs) that created it, only the store, so the facade
/// may be dropped while handles stay open.
///
/// Obtained from [`BlobFs::open`](crate::BlobFs::open); released by dropping.
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
/// let mut file = fs.open_path("/hi.txt")?;
/// let mut buf = [0u8; 16];
/// let n = file.read(&mut buf)?;
/// assert_eq!(&buf[..n], b"hello");
/// # Ok::<(), blobfs::BlobFsError>(())
/// ```
#[derive(Debug)]
pub struct FileHandle<'b, S: ?Sized> {
    store: &'b S,
    inode: Inode,
    inode_data: InodeData,
    position: u32,
}

impl<'b, S: BlobStore + ?Sized> FileHandle<'b, S> {
    pub(crate) fn new(store: &'b S, inode: Inode, inode_data: InodeData) -> Self {
        Self {
            store,
            inode,
            inode_data,
            position: 0,
        }
    }

    /// Address of this file's inode record.
    #[inline]
    pub fn inode(&self) -> Inode {
        self.inode
    }

    /// The inode metadata snapshot captured at open time.
    #[inline]
    pub fn metadata(&self) -> InodeData {
        self.inode_data
    }

    /// File length in bytes.
    #[inline]
    pub fn size(&self) -> u32 {
        self.inode_data.data_size
    }

    /// Current cursor position.
    #[inline]
    pub fn tell(&self) -> u32 {
        self.position
    }

    /// Move the cursor to `position`.
    ///
    /// The bound check inspects the cursor as it was *before* this call, so an
    /// out-of-range target is accepted; only the next `seek` on the handle can
    /// then fail, and reads at an out-of-range cursor return `Ok(0)`.
    ///
    /// # Errors
    ///
    /// - [`BlobFsError::InvalidSeek`] if the pre-seek cursor exceeds the file
    ///   size
    pub fn seek(&mut self, position: u32) -> Result<(), BlobFsError> {
        if self.position > self.inode_data.data_size {
            return Err(BlobFsError::InvalidSeek {
                position,
                size: self.inode_data.data_size,
            });
        }
        self.position = position;
        Ok(())
    }

    /// Read up to `dest.len()` bytes at the cursor, advancing it by the number
    /// of bytes actually read.
    ///
    /// Returns `Ok(0)` at end of file; the cursor is unchanged on error.
    pub fn read(&mut self, dest: &mut [u8]) -> Result<usize, BlobFsError> {
        let n = self.pread(dest, self.position)?;
        self.position += n as u32;
        Ok(n)
    }

    /// Read up to `dest.len()` bytes at `position` without touching the cursor.
    ///
    /// Returns `Ok(0)` if `position` is at or past end of file. Otherwise the
    /// request is clamped to the bytes remaining and served by exactly one
    /// backend chunk load; bytes past the file's declared size are never read,
    /// even if the image has more.
    pub fn pread(&self, dest: &mut [u8], position: u32) -> Result<usize, BlobFsError> {
        if position >= self.inode_data.data_size {
            return Ok(0);
        }

        let remaining = (self.inode_data.data_size - position) as usize;
        let len = dest.len().min(remaining);

        self.store
            .load_chunk(&mut dest[..len], self.inode_data.data_offset + position)?;
        Ok(len)
    }
}

impl<S: BlobStore + ?Sized> io::Read for FileHandle<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        FileHandle::read(self, buf).map_err(io::Error::other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const DATA_OFFSET: u32 = 9;

    fn file_fixture() -> (&'static [u8], InodeData) {
        // Inode record at 0, then 5 content bytes. Trailing junk past the
        // declared size must never be readable.
        let blob: &'static [u8] = &[
            0, 0, 0, 5, 0, 0, 0, 9, 0, // data_size=5, data_offset=9, flags=0
            b'h', b'e', b'l', b'l', b'o', b'!', b'!',
        ];
        let inode_data = InodeData {
            data_size: 5,
            data_offset: DATA_OFFSET,
            flags: 0,
        };
        (blob, inode_data)
    }

    #[test]
    fn read_advances_by_bytes_returned() {
        let (blob, inode_data) = file_fixture();
        let store = MemoryStore::new(blob);
        let mut file = FileHandle::new(&store, 0, inode_data);

        let mut buf = [0u8; 3];
        assert_eq!(file.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf, b"hel");
        assert_eq!(file.tell(), 3);

        // A request larger than the remainder advances only by what was read.
        let mut buf = [0u8; 8];
        assert_eq!(file.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"lo");
        assert_eq!(file.tell(), 5);

        assert_eq!(file.read(&mut buf).unwrap(), 0);
        assert_eq!(file.tell(), 5);
    }

    #[test]
    fn pread_at_or_past_eof_returns_zero() {
        let (blob, inode_data) = file_fixture();
        let store = MemoryStore::new(blob);
        let file = FileHandle::new(&store, 0, inode_data);

        let mut buf = [0u8; 4];
        assert_eq!(file.pread(&mut buf, 5).unwrap(), 0);
        assert_eq!(file.pread(&mut buf, 1000).unwrap(), 0);
    }

    #[test]
    fn pread_clamps_to_declared_size() {
        let (blob, inode_data) = file_fixture();
        let store = MemoryStore::new(blob);
        let file = FileHandle::new(&store, 0, inode_data);

        // The blob holds "hello!!" but the inode declares 5 bytes.
        let mut buf = [0u8; 16];
        assert_eq!(file.pread(&mut buf, 3).unwrap(), 2);
        assert_eq!(&buf[..2], b"lo");
    }

    #[test]
    fn pread_does_not_move_cursor() {
        let (blob, inode_data) = file_fixture();
        let store = MemoryStore::new(blob);
        let file = FileHandle::new(&store, 0, inode_data);

        let mut buf = [0u8; 2];
        assert_eq!(file.pread(&mut buf, 2).unwrap(), 2);
        assert_eq!(file.tell(), 0);
    }

    #[test]
    fn seek_tell_round_trip() {
        let (blob, inode_data) = file_fixture();
        let store = MemoryStore::new(blob);
        let mut file = FileHandle::new(&store, 0, inode_data);

        for target in 0..=inode_data.data_size {
            file.seek(target).unwrap();
            assert_eq!(file.tell(), target);
        }
    }

    #[test]
    fn seek_checks_previous_cursor_not_target() {
        let (blob, inode_data) = file_fixture();
        let store = MemoryStore::new(blob);
        let mut file = FileHandle::new(&store, 0, inode_data);

        // An out-of-range target is accepted because the check looks at the
        // cursor as it was before the call.
        file.seek(100).unwrap();
        assert_eq!(file.tell(), 100);

        // Reads at the stranded cursor clamp to zero bytes.
        let mut buf = [0u8; 4];
        assert_eq!(file.read(&mut buf).unwrap(), 0);

        // Only now does a seek observe the out-of-range cursor and fail,
        // leaving it unchanged.
        let err = file.seek(0).unwrap_err();
        assert!(matches!(err, BlobFsError::InvalidSeek { position: 0, size: 5 }));
        assert_eq!(file.tell(), 100);
    }

    #[test]
    fn io_read_adapter() {
        use std::io::Read;

        let (blob, inode_data) = file_fixture();
        let store = MemoryStore::new(blob);
        let mut file = FileHandle::new(&store, 0, inode_data);

        let mut contents = String::new();
        file.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "hello");
    }

    #[test]
    fn metadata_snapshot_accessors() {
        let (blob, inode_data) = file_fixture();
        let store = MemoryStore::new(blob);
        let file = FileHandle::new(&store, 0, inode_data);

        assert_eq!(file.inode(), 0);
        assert_eq!(file.size(), 5);
        assert_eq!(file.metadata(), inode_data);
    }
}
