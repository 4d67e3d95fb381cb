//! On-disk format of a blobfs image.
//!
//! An image is a single contiguous byte blob. The root directory's inode
//! record sits at offset 0; everything else is reached by following 32-bit
//! offsets stored inside records. All multi-byte integers are big-endian on
//! disk, whatever the host byte order.
//!
//! ## Record layouts
//!
//! | Record | Size | Fields |
//! |--------|------|--------|
//! | [`InodeData`] | 9 bytes | `data_size: u32`, `data_offset: u32`, `flags: u8` |
//! | [`DirEntry`] | 13 bytes | `name_offset: u32`, `inode_data: InodeData` |
//!
//! A directory's contents are `data_size` consecutive [`DirEntry`] records at
//! `data_offset`; a file's contents are `data_size` raw bytes at `data_offset`.
//! Entry names are NUL-terminated byte strings stored independently, referenced
//! by absolute offset.

/// An offset (pointer) within the blob.
pub type Offset = u32;

/// An inode identifier: the offset of an [`InodeData`] record inside the blob.
///
/// Inode addresses are direct pointers into the image, not stable identifiers
/// independent of its layout.
pub type Inode = Offset;

/// The root directory's inode record is always at offset 0.
pub const ROOT_INODE: Inode = 0;

/// Flag bit marking a directory inode. Unset means regular file.
pub const FLAG_DIR: u8 = 0x1;

/// Flag bit marking zlib-deflated file contents. Only valid on regular files;
/// a directory carrying it is a malformed image and is rejected during lookup.
pub const FLAG_DEFLATE: u8 = 0x2;

/// Encoded size of an [`InodeData`] record. Packed, no padding.
pub const INODE_DATA_LEN: usize = 9;

/// Encoded size of a [`DirEntry`] record. Packed, no padding.
pub const DIR_ENTRY_LEN: usize = 13;

/// Byte offset of the embedded [`InodeData`] within a [`DirEntry`]: the
/// 4-byte `name_offset` field comes first.
pub const DIR_ENTRY_INODE_OFFSET: Offset = 4;

/// Type of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
}

/// Decoded inode metadata.
///
/// For a regular file, `data_size` is the byte length of its contents and
/// `data_offset` points at those bytes. For a directory, `data_size` is the
/// number of entries and `data_offset` points at the entry array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InodeData {
    /// File length in bytes, or directory entry count.
    pub data_size: u32,
    /// Blob offset of the file contents or entry array.
    pub data_offset: Offset,
    /// Flag bits: [`FLAG_DIR`], [`FLAG_DEFLATE`].
    pub flags: u8,
}

impl InodeData {
    /// Decode a record from its wire representation, converting every
    /// multi-byte field from big-endian to host order.
    pub fn from_bytes(raw: &[u8; INODE_DATA_LEN]) -> Self {
        let [s0, s1, s2, s3, o0, o1, o2, o3, flags] = *raw;
        Self {
            data_size: u32::from_be_bytes([s0, s1, s2, s3]),
            data_offset: u32::from_be_bytes([o0, o1, o2, o3]),
            flags,
        }
    }

    /// Returns `true` if this inode is a directory.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.flags & FLAG_DIR != 0
    }

    /// Returns `true` if this inode's contents are stored compressed.
    #[inline]
    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_DEFLATE != 0
    }

    /// Type of the entry this inode describes.
    #[inline]
    pub fn file_type(&self) -> FileType {
        if self.is_dir() {
            FileType::Directory
        } else {
            FileType::File
        }
    }
}

/// Decoded directory entry: a name reference plus the child's inode record.
///
/// The child's inode record is embedded in the entry itself, so the child's
/// inode *address* is the entry's offset plus [`DIR_ENTRY_INODE_OFFSET`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirEntry {
    /// Blob offset of the entry's NUL-terminated name string.
    pub name_offset: Offset,
    /// The child's inode metadata.
    pub inode_data: InodeData,
}

impl DirEntry {
    /// Decode an entry from its wire representation.
    pub fn from_bytes(raw: &[u8; DIR_ENTRY_LEN]) -> Self {
        let [n0, n1, n2, n3, rest @ ..] = *raw;
        Self {
            name_offset: u32::from_be_bytes([n0, n1, n2, n3]),
            inode_data: InodeData::from_bytes(&rest),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inode_data_decodes_big_endian_on_any_host() {
        let raw = [
            0x00, 0x00, 0x01, 0x00, // data_size = 256
            0x00, 0x00, 0x00, 0x09, // data_offset = 9
            FLAG_DIR,
        ];
        let inode = InodeData::from_bytes(&raw);
        assert_eq!(inode.data_size, 256);
        assert_eq!(inode.data_offset, 9);
        assert!(inode.is_dir());
        assert!(!inode.is_compressed());
    }

    #[test]
    fn dir_entry_decodes_name_offset_and_inode() {
        let raw = [
            0x00, 0x00, 0x00, 0x16, // name_offset = 22
            0x00, 0x00, 0x00, 0x05, // data_size = 5
            0x00, 0x00, 0x00, 0x1b, // data_offset = 27
            0x00,
        ];
        let entry = DirEntry::from_bytes(&raw);
        assert_eq!(entry.name_offset, 22);
        assert_eq!(entry.inode_data.data_size, 5);
        assert_eq!(entry.inode_data.data_offset, 27);
        assert_eq!(entry.inode_data.file_type(), FileType::File);
    }

    #[test]
    fn record_sizes_match_wire_layout() {
        assert_eq!(INODE_DATA_LEN, 9);
        assert_eq!(DIR_ENTRY_LEN, 13);
        assert_eq!(DIR_ENTRY_INODE_OFFSET as usize + INODE_DATA_LEN, DIR_ENTRY_LEN);
    }

    #[test]
    fn compressed_file_flags() {
        let raw = [0, 0, 0, 0, 0, 0, 0, 0, FLAG_DEFLATE];
        let inode = InodeData::from_bytes(&raw);
        assert!(!inode.is_dir());
        assert!(inode.is_compressed());
        assert_eq!(inode.file_type(), FileType::File);
    }

    #[test]
    fn root_inode_is_offset_zero() {
        assert_eq!(ROOT_INODE, 0);
    }
}
