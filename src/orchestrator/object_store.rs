//! Object-store client (C1): fetch/put archive bytes by logical path, with
//! a streaming content hash computed on read so a document record is never
//! committed before its hash is finalised (`spec.md` §4.1).
//!
//! Grounded on `io::reader::FileReader`'s file-access style, generalized
//! from a direct local-disk reader to a capability trait boundary — this
//! crate never reads a local path directly outside this module, per
//! `DESIGN.md`'s dependency-drop note on `memmap2`.

use crate::core::chunk_id::content_hash;
use crate::error::{IoError, Result};
use std::collections::HashMap;
use std::fs;
use std::io::{Read, Seek};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Summary metadata for a stored object, per `spec.md` §4.1 `stat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStat {
    /// Size in bytes.
    pub size: u64,
    /// Unix timestamp (seconds) of last modification.
    pub mtime: i64,
    /// Content hash, if known without a full read (local implementations
    /// may need to hash on demand).
    pub etag: Option<String>,
}

/// Fetches/stores archive and document bytes by logical path. The sole
/// capability this crate uses to reach outside its own process; the real
/// production object store is out of scope per `spec.md` §1.
pub trait ObjectStore: Send + Sync {
    /// Fetches the full bytes at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::NotFound`] if the path does not exist,
    /// [`IoError::Unavailable`] if the store could not be reached.
    fn fetch(&self, path: &str) -> Result<Vec<u8>>;

    /// Fetches `length` bytes starting at `offset` within the object at
    /// `path`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::NotFound`] if the path does not exist.
    fn fetch_range(&self, path: &str, offset: u64, length: u64) -> Result<Vec<u8>>;

    /// Writes `bytes` to `path`, returning the SHA-256 content hash
    /// computed while streaming the write.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFailed`] on a write failure.
    fn put(&self, path: &str, bytes: &[u8]) -> Result<String>;

    /// Returns a time-limited URL for `path`, valid for `ttl_seconds`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::NotFound`] if the path does not exist.
    fn presign(&self, path: &str, ttl_seconds: u64) -> Result<String>;

    /// Returns size/mtime/etag metadata for `path` without fetching its
    /// bytes.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::NotFound`] if the path does not exist.
    fn stat(&self, path: &str) -> Result<ObjectStat>;
}

/// A local-filesystem-backed object store, rooted at a base directory.
/// Stands in for the real object-store interface boundary (`spec.md` §1,
/// "external collaborators ... specified only by interface"); paths are
/// resolved relative to `root` and rejected if they would escape it.
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    /// Creates a store rooted at `root`. Does not require `root` to exist
    /// yet; `put` creates parent directories as needed.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        if path.contains("..") {
            return Err(IoError::PathTraversal {
                path: path.to_string(),
            }
            .into());
        }
        Ok(self.root.join(path))
    }
}

impl ObjectStore for LocalObjectStore {
    fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.resolve(path)?;
        fs::read(&full).map_err(|e| map_io_error(path, &e))
    }

    fn fetch_range(&self, path: &str, offset: u64, length: u64) -> Result<Vec<u8>> {
        let full = self.resolve(path)?;
        let mut file = fs::File::open(&full).map_err(|e| map_io_error(path, &e))?;
        file.seek_relative(offset.try_into().unwrap_or(i64::MAX))
            .map_err(|e| map_io_error(path, &e))?;
        let mut buf = vec![0_u8; usize::try_from(length).unwrap_or(usize::MAX)];
        let read = file.read(&mut buf).map_err(|e| map_io_error(path, &e))?;
        buf.truncate(read);
        Ok(buf)
    }

    fn put(&self, path: &str, bytes: &[u8]) -> Result<String> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| IoError::WriteFailed {
                key: path.to_string(),
                reason: e.to_string(),
            })?;
        }
        fs::write(&full, bytes).map_err(|e| IoError::WriteFailed {
            key: path.to_string(),
            reason: e.to_string(),
        })?;
        Ok(content_hash(bytes))
    }

    fn presign(&self, path: &str, ttl_seconds: u64) -> Result<String> {
        let full = self.resolve(path)?;
        if !full.exists() {
            return Err(IoError::NotFound {
                key: path.to_string(),
            }
            .into());
        }
        Ok(format!("file://{}?ttl={ttl_seconds}", full.display()))
    }

    fn stat(&self, path: &str) -> Result<ObjectStat> {
        let full = self.resolve(path)?;
        let meta = fs::metadata(&full).map_err(|e| map_io_error(path, &e))?;
        let mtime = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |d| d.as_secs() as i64);
        Ok(ObjectStat {
            size: meta.len(),
            mtime,
            etag: None,
        })
    }
}

fn map_io_error(path: &str, e: &std::io::Error) -> crate::error::Error {
    if e.kind() == std::io::ErrorKind::NotFound {
        IoError::NotFound {
            key: path.to_string(),
        }
        .into()
    } else {
        IoError::FetchFailed {
            key: path.to_string(),
            reason: e.to_string(),
        }
        .into()
    }
}

/// An in-memory object store backed by a `HashMap`, for tests and the
/// deterministic fake fixtures used across this crate (mirroring
/// `storage::sqlite::SqliteStorage::in_memory`'s pattern).
#[derive(Default)]
pub struct FakeObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl FakeObjectStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an object directly, for test fixtures.
    pub fn seed(&self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.objects
            .lock()
            .expect("object map poisoned")
            .insert(path.into(), bytes.into());
    }
}

impl ObjectStore for FakeObjectStore {
    fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        self.objects
            .lock()
            .expect("object map poisoned")
            .get(path)
            .cloned()
            .ok_or_else(|| {
                IoError::NotFound {
                    key: path.to_string(),
                }
                .into()
            })
    }

    fn fetch_range(&self, path: &str, offset: u64, length: u64) -> Result<Vec<u8>> {
        let bytes = self.fetch(path)?;
        let start = usize::try_from(offset).unwrap_or(bytes.len());
        let end = start
            .saturating_add(usize::try_from(length).unwrap_or(0))
            .min(bytes.len());
        Ok(bytes.get(start.min(end)..end).unwrap_or_default().to_vec())
    }

    fn put(&self, path: &str, bytes: &[u8]) -> Result<String> {
        let hash = content_hash(bytes);
        self.seed(path, bytes.to_vec());
        Ok(hash)
    }

    fn presign(&self, path: &str, ttl_seconds: u64) -> Result<String> {
        self.fetch(path)?;
        Ok(format!("fake://{path}?ttl={ttl_seconds}"))
    }

    fn stat(&self, path: &str) -> Result<ObjectStat> {
        let bytes = self.fetch(path)?;
        Ok(ObjectStat {
            #[allow(clippy::cast_possible_truncation)]
            size: bytes.len() as u64,
            mtime: 0,
            etag: Some(content_hash(&bytes)),
        })
    }
}

/// Returns the current Unix timestamp in seconds.
#[must_use]
pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs() as i64)
}
