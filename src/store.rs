//! Byte-access layer: pluggable backends for fetching raw bytes of an image.
//!
//! The traversal engine never assumes how an image's bytes are stored; it only
//! requires the two operations of [`BlobStore`]. A memory-mapped image, a
//! flash-backed image behind a driver, and a plain file all satisfy the same
//! contract —
//!
//! - [`MemoryStore`] serves a borrowed byte slice and hands out zero-copy
//!   string views.
//! - [`ReaderStore`] serves any `Read + Seek` source (a `File`, a `Cursor`,
//!   a flash abstraction exposing `Read`), allocating for each name string.

use std::borrow::Cow;
use std::io::{self, Read, Seek, SeekFrom};
use std::sync::Mutex;

use crate::error::BlobFsError;
use crate::format::Offset;

/// Byte-access capability over an opaque filesystem image.
///
/// Every fetch is synchronous and blocks the caller; a fetch either fully
/// succeeds or returns an error. `Ok` from [`load_chunk`](Self::load_chunk)
/// guarantees the destination buffer is entirely valid — backends must never
/// report success for a partial read.
///
/// # Name strings
///
/// [`load_str`](Self::load_str) returns a [`Cow`] because the string's length
/// is unknown until the backend scans for the NUL terminator. In-memory
/// backends return `Cow::Borrowed` views straight into the blob; streaming
/// backends return `Cow::Owned` copies. Either way the buffer is released when
/// the `Cow` is dropped, on every exit path.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; methods take `&self`. Backends with
/// mutable underlying state (e.g. a seekable reader) manage their own
/// synchronization.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn BlobStore`.
pub trait BlobStore: Send + Sync {
    /// Copy exactly `dest.len()` bytes starting at `offset` into `dest`.
    ///
    /// # Errors
    ///
    /// Backend-defined. On error the contents of `dest` are unspecified, but
    /// the backend's own state must remain usable for further calls.
    fn load_chunk(&self, dest: &mut [u8], offset: Offset) -> Result<(), BlobFsError>;

    /// Load the NUL-terminated byte string starting at `offset`.
    ///
    /// The returned bytes exclude the terminator.
    ///
    /// # Errors
    ///
    /// - [`BlobFsError::UnterminatedString`] if the blob ends before a NUL
    /// - backend-defined I/O errors
    fn load_str(&self, offset: Offset) -> Result<Cow<'_, [u8]>, BlobFsError>;
}

/// The simplest backend: the whole image resides in addressable memory.
///
/// Reads are bounds-checked slice copies and name strings are borrowed
/// directly from the blob, so no allocation ever happens.
#[derive(Debug, Clone, Copy)]
pub struct MemoryStore<'a> {
    blob: &'a [u8],
}

impl<'a> MemoryStore<'a> {
    /// Wrap an in-memory image.
    pub fn new(blob: &'a [u8]) -> Self {
        Self { blob }
    }

    /// Length of the backing blob in bytes.
    pub fn len(&self) -> usize {
        self.blob.len()
    }

    /// Returns `true` if the backing blob is empty.
    pub fn is_empty(&self) -> bool {
        self.blob.is_empty()
    }
}

impl BlobStore for MemoryStore<'_> {
    fn load_chunk(&self, dest: &mut [u8], offset: Offset) -> Result<(), BlobFsError> {
        let start = offset as usize;
        let end = start
            .checked_add(dest.len())
            .filter(|&end| end <= self.blob.len())
            .ok_or(BlobFsError::OutOfBounds {
                offset,
                len: dest.len(),
                blob_len: self.blob.len(),
            })?;
        dest.copy_from_slice(&self.blob[start..end]);
        Ok(())
    }

    fn load_str(&self, offset: Offset) -> Result<Cow<'_, [u8]>, BlobFsError> {
        let start = offset as usize;
        if start > self.blob.len() {
            return Err(BlobFsError::OutOfBounds {
                offset,
                len: 1,
                blob_len: self.blob.len(),
            });
        }
        let tail = &self.blob[start..];
        let len = tail
            .iter()
            .position(|&b| b == 0)
            .ok_or(BlobFsError::UnterminatedString { offset })?;
        Ok(Cow::Borrowed(&tail[..len]))
    }
}

/// Backend over any seekable byte source.
///
/// Suited to images too large to map, or fetched through a driver that only
/// exposes a `Read + Seek` surface. The reader is kept behind a [`Mutex`] so
/// the store can be shared by reference across handles; each call seeks and
/// reads under the lock. Name strings are copied into owned buffers.
#[derive(Debug)]
pub struct ReaderStore<R> {
    inner: Mutex<R>,
}

/// Block size used when scanning for a name's NUL terminator.
const STR_SCAN_CHUNK: usize = 32;

impl<R: Read + Seek + Send> ReaderStore<R> {
    /// Wrap a seekable reader positioned anywhere; offsets are absolute.
    pub fn new(reader: R) -> Self {
        Self {
            inner: Mutex::new(reader),
        }
    }

    /// Consume the store, returning the underlying reader.
    ///
    /// # Errors
    ///
    /// [`BlobFsError::Backend`] if the lock was poisoned by a panicking reader.
    pub fn into_inner(self) -> Result<R, BlobFsError> {
        self.inner
            .into_inner()
            .map_err(|_| BlobFsError::Backend("reader lock poisoned".into()))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, R>, BlobFsError> {
        self.inner
            .lock()
            .map_err(|_| BlobFsError::Backend("reader lock poisoned".into()))
    }
}

impl<R: Read + Seek + Send> BlobStore for ReaderStore<R> {
    fn load_chunk(&self, dest: &mut [u8], offset: Offset) -> Result<(), BlobFsError> {
        let mut reader = self.lock()?;
        reader
            .seek(SeekFrom::Start(offset as u64))
            .map_err(|source| BlobFsError::Io {
                operation: "seek",
                offset,
                source,
            })?;
        reader.read_exact(dest).map_err(|source| BlobFsError::Io {
            operation: "load_chunk",
            offset,
            source,
        })
    }

    fn load_str(&self, offset: Offset) -> Result<Cow<'_, [u8]>, BlobFsError> {
        let mut reader = self.lock()?;
        reader
            .seek(SeekFrom::Start(offset as u64))
            .map_err(|source| BlobFsError::Io {
                operation: "seek",
                offset,
                source,
            })?;

        let mut name = Vec::new();
        let mut block = [0u8; STR_SCAN_CHUNK];
        loop {
            let n = match reader.read(&mut block) {
                Ok(0) => return Err(BlobFsError::UnterminatedString { offset }),
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(BlobFsError::Io {
                        operation: "load_str",
                        offset,
                        source,
                    });
                }
            };
            if let Some(end) = block[..n].iter().position(|&b| b == 0) {
                name.extend_from_slice(&block[..end]);
                return Ok(Cow::Owned(name));
            }
            name.extend_from_slice(&block[..n]);
        }
    }
}
