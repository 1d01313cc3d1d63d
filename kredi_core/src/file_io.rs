//! # Catalog File I/O
//!
//! Catalogs live in `.krd` files (pretty-printed JSON). Several admins may
//! edit the same file from a shared drive, so writes go through two guards:
//!
//! - **Atomic saves**: write `.krd.tmp`, fsync, rename over the target
//! - **File locking**: an OS lock (fs2) plus a `.krd.lock` file saying who
//!   holds it, so other admins see a name instead of a bare failure
//!
//! ## Example
//!
//! ```rust,no_run
//! use kredi_core::catalog::Catalog;
//! use kredi_core::file_io::{load_catalog, save_catalog, FileLock};
//! use std::path::Path;
//!
//! let path = Path::new("catalog.krd");
//! let lock = FileLock::acquire(path, "admin@kredi.local")?;
//!
//! let mut catalog = load_catalog(path).unwrap_or_else(|_| Catalog::new("admin"));
//! catalog.settings.deposit_withholding_percent = 5.0;
//! save_catalog(&catalog, path)?;
//!
//! drop(lock);
//! # Ok::<(), kredi_core::errors::KrediError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, SCHEMA_VERSION};
use crate::errors::{KrediError, KrediResult};

/// Locks older than this are taken over regardless of owner
const STALE_LOCK_AGE_HOURS: i64 = 24;

/// Metadata written into `.lock` files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Admin identifier (email or username)
    pub user_id: String,
    /// Machine the lock was taken on
    pub machine: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Lock info for the current process
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    /// Whether the holder is gone: same machine with a dead pid, or simply too old.
    fn is_stale(&self) -> bool {
        if Utc::now() - self.locked_at > Duration::hours(STALE_LOCK_AGE_HOURS) {
            return true;
        }
        match hostname() {
            Some(ours) if ours == self.machine => !process_alive(self.pid),
            _ => false,
        }
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{}", pid)).exists()
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    // no cheap check; fall back to the age rule
    true
}

/// Exclusive lock on a catalog file, released on drop.
pub struct FileLock {
    catalog_path: PathBuf,
    lock_path: PathBuf,
    /// Holds the OS-level lock for as long as the guard lives
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock on a catalog file.
    ///
    /// Fails with [`KrediError::FileLocked`] when a live holder exists.
    /// Stale locks (dead process on this machine, or older than 24 h) are
    /// taken over.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> KrediResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if let Some(existing) = read_lock_info(&lock_path) {
            if !existing.is_stale() {
                return Err(KrediError::file_locked(
                    path.display().to_string(),
                    format!("{} ({})", existing.user_id, existing.machine),
                    existing.locked_at.to_rfc3339(),
                ));
            }
            warn!(
                path = %path.display(),
                holder = %existing.user_id,
                "taking over stale catalog lock"
            );
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| KrediError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            KrediError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let lock_json = serde_json::to_string_pretty(&info)?;
        lock_file
            .write_all(lock_json.as_bytes())
            .and_then(|_| lock_file.sync_all())
            .map_err(|e| KrediError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;

        debug!(path = %path.display(), user = %info.user_id, "catalog lock acquired");

        Ok(FileLock {
            catalog_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Who holds the lock on `path`, if anyone live does.
    pub fn check(path: &Path) -> Option<LockInfo> {
        read_lock_info(&lock_path_for(path)).filter(|info| !info.is_stale())
    }

    pub fn catalog_path(&self) -> &Path {
        &self.catalog_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // OS lock goes away with the file handle
        let _ = fs::remove_file(&self.lock_path);
        debug!(path = %self.catalog_path.display(), "catalog lock released");
    }
}

/// `catalog.krd` → `catalog.krd.lock`
fn lock_path_for(catalog_path: &Path) -> PathBuf {
    let mut lock_path = catalog_path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

/// `catalog.krd` → `catalog.krd.tmp`
fn tmp_path_for(catalog_path: &Path) -> PathBuf {
    let mut tmp_path = catalog_path.to_path_buf();
    let extension = tmp_path
        .extension()
        .map(|e| format!("{}.tmp", e.to_string_lossy()))
        .unwrap_or_else(|| "tmp".to_string());
    tmp_path.set_extension(extension);
    tmp_path
}

fn read_lock_info(lock_path: &Path) -> Option<LockInfo> {
    let contents = fs::read_to_string(lock_path).ok()?;
    serde_json::from_str(&contents).ok()
}

/// Save a catalog with atomic write semantics.
///
/// Serializes to a sibling `.tmp` file, syncs it, then renames it over
/// `path`. An interrupted save leaves the previous file intact.
pub fn save_catalog(catalog: &Catalog, path: &Path) -> KrediResult<()> {
    let json = serde_json::to_string_pretty(catalog)?;
    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        KrediError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file
        .write_all(json.as_bytes())
        .and_then(|_| tmp_file.sync_all())
        .map_err(|e| KrediError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        KrediError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    info!(path = %path.display(), records = catalog.record_count(), "catalog saved");
    Ok(())
}

/// Load a catalog and check its schema version.
pub fn load_catalog(path: &Path) -> KrediResult<Catalog> {
    let contents = fs::read_to_string(path)
        .map_err(|e| KrediError::file_error("read", path.display().to_string(), e.to_string()))?;

    let catalog: Catalog = serde_json::from_str(&contents).map_err(|e| KrediError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })?;

    validate_version(&catalog.meta.version)?;

    debug!(path = %path.display(), records = catalog.record_count(), "catalog loaded");
    Ok(catalog)
}

/// Load a catalog and report whether someone else currently holds its lock.
pub fn load_catalog_with_lock_check(path: &Path) -> KrediResult<(Catalog, Option<LockInfo>)> {
    let catalog = load_catalog(path)?;
    Ok((catalog, FileLock::check(path)))
}

/// Accept files with the same major version; on 0.x the file's minor
/// version may not be newer than ours.
fn validate_version(file_version: &str) -> KrediResult<()> {
    let mismatch = || KrediError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };
    let file_parts = parse(file_version);
    let current_parts = parse(SCHEMA_VERSION);

    let (Some(file_major), Some(current_major)) = (file_parts.first(), current_parts.first()) else {
        return Err(mismatch());
    };
    if file_major != current_major {
        return Err(mismatch());
    }

    if *current_major == 0 {
        if let (Some(file_minor), Some(current_minor)) = (file_parts.get(1), current_parts.get(1)) {
            if file_minor > current_minor {
                return Err(mismatch());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::Bank;
    use std::env::temp_dir;

    fn temp_catalog_path(name: &str) -> PathBuf {
        temp_dir().join(format!("kredi_test_{}_{}.krd", name, std::process::id()))
    }

    #[test]
    fn test_sidecar_paths() {
        let path = Path::new("/data/catalog.krd");
        assert_eq!(lock_path_for(path), Path::new("/data/catalog.krd.lock"));
        assert_eq!(tmp_path_for(path), Path::new("/data/catalog.krd.tmp"));
    }

    #[test]
    fn test_lock_info_creation() {
        let info = LockInfo::new("admin@kredi.local");
        assert_eq!(info.user_id, "admin@kredi.local");
        assert!(info.pid > 0);
        assert!(!info.is_stale());
    }

    #[test]
    fn test_old_lock_is_stale() {
        let mut info = LockInfo::new("admin");
        info.locked_at = Utc::now() - Duration::hours(STALE_LOCK_AGE_HOURS + 1);
        assert!(info.is_stale());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_catalog_path("roundtrip");

        let mut catalog = Catalog::new("Test Admin");
        catalog.add_bank(Bank::new("Örnek Bank").with_tax_rates(0.05, 0.15)).unwrap();
        save_catalog(&catalog, &path).unwrap();

        let loaded = load_catalog(&path).unwrap();
        assert_eq!(loaded.meta.owner, "Test Admin");
        assert_eq!(loaded.banks.len(), 1);
        let bank = loaded.banks.values().next().unwrap();
        assert_eq!(bank.bsmv_rate, Some(0.05));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_atomic_save_leaves_no_tmp_file() {
        let path = temp_catalog_path("atomic");
        save_catalog(&Catalog::new("admin"), &path).unwrap();

        assert!(!tmp_path_for(&path).exists());
        assert!(path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file_is_file_error() {
        let err = load_catalog(&temp_catalog_path("missing")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_load_invalid_json() {
        let path = temp_catalog_path("invalid");
        fs::write(&path, "{ not json").unwrap();
        let err = load_catalog(&path).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_lock_acquire_and_release() {
        let path = temp_catalog_path("lock");
        File::create(&path).unwrap();

        let lock = FileLock::acquire(&path, "admin@kredi.local").unwrap();
        assert_eq!(lock.info.user_id, "admin@kredi.local");
        assert_eq!(lock.catalog_path(), path.as_path());

        let lock_path = lock_path_for(&path);
        assert!(lock_path.exists());

        // Same process is alive, so a second acquire is refused
        let second = FileLock::acquire(&path, "other@kredi.local");
        assert!(matches!(second, Err(KrediError::FileLocked { .. })));

        drop(lock);
        assert!(!lock_path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_stale_lock_is_taken_over() {
        let path = temp_catalog_path("stale");
        File::create(&path).unwrap();

        let mut old = LockInfo::new("gone@kredi.local");
        old.locked_at = Utc::now() - Duration::hours(STALE_LOCK_AGE_HOURS + 1);
        fs::write(lock_path_for(&path), serde_json::to_string(&old).unwrap()).unwrap();

        let lock = FileLock::acquire(&path, "admin@kredi.local").unwrap();
        let on_disk = read_lock_info(&lock_path_for(&path)).unwrap();
        assert_eq!(on_disk.user_id, "admin@kredi.local");

        drop(lock);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.7").is_ok());
        assert!(validate_version("0.0.9").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("garbage").is_err());
    }

    #[test]
    fn test_load_with_lock_check() {
        let path = temp_catalog_path("lock_check");
        save_catalog(&Catalog::new("admin"), &path).unwrap();

        let (loaded, lock_info) = load_catalog_with_lock_check(&path).unwrap();
        assert_eq!(loaded.meta.owner, "admin");
        assert!(lock_info.is_none());

        let _ = fs::remove_file(&path);
    }
}
