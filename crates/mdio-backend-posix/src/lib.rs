//! Reference storage backend: datasets are directories under a configured
//! root, objects are regular files within them.
//!
//! Grounded on `ior-backend-posix/src/lib.rs` for the raw syscall style
//! (`libc::{open,pread,pwrite,close,mkdir,rmdir,unlink,stat}`, the
//! pread/pwrite retry loop borrowed almost verbatim as `retrying_xfer`) and
//! on `original_source/plugins/md-posix.c`'s flat `(rank, dataset, index)`
//! naming scheme and its directory-per-dataset layout.

use std::ffi::CString;
use std::fs;
use std::path::{Path, PathBuf};

use mdio_core::backend::{Backend, BackendOptionSpec, BackendStatus};
use mdio_core::backend_options::BackendOptions;
use mdio_core::error::DriverError;

/// Maximum retries for a partial pread/pwrite, matching the retry cap used
/// by `ior-backend-posix`'s `execute_posix_io`.
const MAX_RETRY: usize = 10_000;

const INDEX_FILE_NAME: &str = ".mdio-index";

/// POSIX filesystem backend. Datasets are directories under `root`;
/// objects are plain files inside the dataset directory.
pub struct PosixBackend {
    root: PathBuf,
}

impl PosixBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn dataset_path(&self, dataset: &str) -> PathBuf {
        self.root.join(dataset)
    }

    fn object_path(&self, dataset: &str, name: &str) -> PathBuf {
        self.dataset_path(dataset).join(name)
    }

    fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE_NAME)
    }

    fn errno() -> i32 {
        unsafe { *libc::__errno_location() }
    }

    fn path_to_cstring(path: &Path) -> Option<CString> {
        CString::new(path.as_os_str().as_encoded_bytes()).ok()
    }
}

impl Backend for PosixBackend {
    fn name(&self) -> &str {
        "posix"
    }

    fn options(&self) -> Vec<BackendOptionSpec> {
        vec![BackendOptionSpec {
            name: "root",
            help: "directory under which datasets (subdirectories) and objects (files) are created",
            takes_value: true,
        }]
    }

    fn configure(&mut self, opts: &BackendOptions) -> Result<(), DriverError> {
        if let Some(root) = opts
            .for_prefix("posix")
            .find(|(key, _)| *key == "root")
            .and_then(|(_, value)| value.as_str())
        {
            self.root = PathBuf::from(root);
        }
        Ok(())
    }

    fn initialize(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    fn prepare_global(&mut self) -> BackendStatus {
        match fs::create_dir_all(&self.root) {
            Ok(()) => BackendStatus::Success,
            Err(_) => BackendStatus::ErrorUnknown,
        }
    }

    fn purge_global(&mut self) -> BackendStatus {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => BackendStatus::Success,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BackendStatus::Success,
            Err(_) => BackendStatus::ErrorUnknown,
        }
    }

    fn get_index(&mut self) -> i64 {
        fs::read_to_string(self.index_path())
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0)
    }

    fn put_index(&mut self, index: i64) {
        let _ = fs::write(self.index_path(), index.to_string());
    }

    fn name_of_dataset(&self, rank: i32, dataset: i32) -> String {
        format!("r{rank}-d{dataset}")
    }

    fn create_dataset(&mut self, name: &str) -> BackendStatus {
        match fs::create_dir(self.dataset_path(name)) {
            Ok(()) => BackendStatus::Success,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => BackendStatus::Success,
            Err(_) => BackendStatus::ErrorCreate,
        }
    }

    fn remove_dataset(&mut self, name: &str) -> BackendStatus {
        match fs::remove_dir(self.dataset_path(name)) {
            Ok(()) => BackendStatus::Success,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BackendStatus::ErrorFind,
            Err(_) => BackendStatus::ErrorUnknown,
        }
    }

    fn name_of_object(&self, rank: i32, dataset: i32, index: i64) -> String {
        format!("r{rank}-d{dataset}-o{index}")
    }

    fn write_object(&mut self, dataset: &str, name: &str, buf: &[u8]) -> BackendStatus {
        let path = self.object_path(dataset, name);
        let Some(cpath) = Self::path_to_cstring(&path) else {
            return BackendStatus::ErrorCreate;
        };

        let fd = unsafe { libc::open(cpath.as_ptr(), libc::O_CREAT | libc::O_WRONLY | libc::O_TRUNC, 0o644) };
        if fd < 0 {
            return BackendStatus::ErrorCreate;
        }

        let written = retrying_xfer(fd, buf.as_ptr() as *mut u8, buf.len() as i64, 0, true);
        unsafe { libc::close(fd) };

        match written {
            Some(n) if n == buf.len() as i64 => BackendStatus::Success,
            Some(_) => BackendStatus::ErrorUnknown,
            None => BackendStatus::ErrorCreate,
        }
    }

    fn read_object(&mut self, dataset: &str, name: &str, buf: &mut [u8]) -> BackendStatus {
        let path = self.object_path(dataset, name);
        let Some(cpath) = Self::path_to_cstring(&path) else {
            return BackendStatus::ErrorFind;
        };

        let fd = unsafe { libc::open(cpath.as_ptr(), libc::O_RDONLY) };
        if fd < 0 {
            return if Self::errno() == libc::ENOENT {
                BackendStatus::ErrorFind
            } else {
                BackendStatus::ErrorUnknown
            };
        }

        let read = retrying_xfer(fd, buf.as_mut_ptr(), buf.len() as i64, 0, false);
        unsafe { libc::close(fd) };

        match read {
            Some(n) if n == buf.len() as i64 => BackendStatus::Success,
            Some(_) => BackendStatus::ErrorUnknown,
            None => BackendStatus::ErrorUnknown,
        }
    }

    fn stat_object(&mut self, dataset: &str, name: &str, expected_len: usize) -> BackendStatus {
        let path = self.object_path(dataset, name);
        match fs::metadata(&path) {
            Ok(meta) if meta.len() == expected_len as u64 => BackendStatus::Success,
            Ok(_) => BackendStatus::ErrorUnknown,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BackendStatus::ErrorFind,
            Err(_) => BackendStatus::ErrorUnknown,
        }
    }

    fn delete_object(&mut self, dataset: &str, name: &str) -> BackendStatus {
        match fs::remove_file(self.object_path(dataset, name)) {
            Ok(()) => BackendStatus::Success,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BackendStatus::ErrorFind,
            Err(_) => BackendStatus::ErrorUnknown,
        }
    }
}

/// pread/pwrite with retry on partial transfer, capped at [`MAX_RETRY`].
/// Returns `None` on a hard I/O error, `Some(bytes_transferred)` otherwise
/// (which may be less than `len` if the file is shorter, on read).
fn retrying_xfer(fd: i32, buf: *mut u8, len: i64, offset: i64, write: bool) -> Option<i64> {
    let mut remaining = len;
    let mut ptr = buf;
    let mut off = offset as libc::off_t;
    let mut retries = 0;

    while remaining > 0 {
        let rc = if write {
            unsafe { libc::pwrite(fd, ptr as *const libc::c_void, remaining as usize, off) }
        } else {
            unsafe { libc::pread(fd, ptr as *mut libc::c_void, remaining as usize, off) }
        };

        if rc < 0 {
            return None;
        }
        if rc == 0 {
            break;
        }

        let transferred = rc as i64;
        remaining -= transferred;
        ptr = unsafe { ptr.add(transferred as usize) };
        off += transferred as libc::off_t;

        if remaining > 0 {
            retries += 1;
            if retries >= MAX_RETRY {
                break;
            }
        }
    }

    Some(len - remaining)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_backend() -> (PosixBackend, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        (PosixBackend::new(dir.path()), dir)
    }

    #[test]
    fn dataset_lifecycle() {
        let (mut backend, _dir) = fresh_backend();
        assert_eq!(backend.prepare_global(), BackendStatus::Success);
        let name = backend.name_of_dataset(0, 0);
        assert_eq!(backend.create_dataset(&name), BackendStatus::Success);
        assert_eq!(backend.remove_dataset(&name), BackendStatus::Success);
        assert_eq!(backend.remove_dataset(&name), BackendStatus::ErrorFind);
    }

    #[test]
    fn object_write_stat_read_delete() {
        let (mut backend, _dir) = fresh_backend();
        backend.prepare_global();
        let dset = backend.name_of_dataset(0, 0);
        backend.create_dataset(&dset);
        let name = backend.name_of_object(0, 0, 0);

        let payload = vec![7u8; 64];
        assert_eq!(backend.write_object(&dset, &name, &payload), BackendStatus::Success);
        assert_eq!(backend.stat_object(&dset, &name, 64), BackendStatus::Success);
        assert_eq!(backend.stat_object(&dset, &name, 32), BackendStatus::ErrorUnknown);

        let mut buf = vec![0u8; 64];
        assert_eq!(backend.read_object(&dset, &name, &mut buf), BackendStatus::Success);
        assert_eq!(buf, payload);

        assert_eq!(backend.delete_object(&dset, &name), BackendStatus::Success);
        assert_eq!(backend.stat_object(&dset, &name, 64), BackendStatus::ErrorFind);
    }

    #[test]
    fn missing_object_reports_error_find() {
        let (mut backend, _dir) = fresh_backend();
        backend.prepare_global();
        let dset = backend.name_of_dataset(0, 0);
        backend.create_dataset(&dset);
        assert_eq!(backend.stat_object(&dset, "ghost", 8), BackendStatus::ErrorFind);
        assert_eq!(backend.delete_object(&dset, "ghost"), BackendStatus::ErrorFind);
    }

    #[test]
    fn configure_overrides_root_from_posix_dot_root() {
        let mut backend = PosixBackend::new("/unused");
        let dir = tempfile::tempdir().unwrap();
        let mut opts = mdio_core::backend_options::BackendOptions::new();
        opts.insert(
            "posix.root".to_string(),
            mdio_core::backend_options::OptionValue::Str(dir.path().to_string_lossy().into_owned()),
        );
        backend.configure(&opts).unwrap();
        assert_eq!(backend.root, dir.path());
    }

    #[test]
    fn index_roundtrips_through_the_ledger() {
        let (mut backend, _dir) = fresh_backend();
        backend.prepare_global();
        assert_eq!(backend.get_index(), 0);
        backend.put_index(42);
        assert_eq!(backend.get_index(), 42);
    }
}
