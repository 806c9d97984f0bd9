//! The storage-backend contract: the polymorphic interface the phase engines
//! drive, and the registry backends are looked up by name through.
//!
//! Grounded on `ior-core/src/aiori.rs`'s `Aiori` trait and
//! `original_source/plugins/md-plugin.h`'s `struct md_plugin` /
//! `enum MD_ERROR`. Unlike `Aiori`, operations here return a closed status
//! enum rather than `Result`: the original C plugin interface returns an
//! `int` drawn from a fixed small set, and `no-op` is meaningful data (a
//! flat backend's honest answer to "create a dataset"), not an error.

use crate::backend_options::BackendOptions;
use crate::error::DriverError;

/// Outcome of a single backend operation.
///
/// `NoOp` never counts as a success or an error: it is the backend's way of
/// saying "this call does not apply to my storage model", e.g. a flat
/// key-value backend asked to create a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendStatus {
    Success,
    NoOp,
    ErrorCreate,
    ErrorFind,
    ErrorUnknown,
}

impl BackendStatus {
    pub fn is_success(self) -> bool {
        matches!(self, BackendStatus::Success)
    }

    pub fn is_no_op(self) -> bool {
        matches!(self, BackendStatus::NoOp)
    }

    pub fn is_error(self) -> bool {
        matches!(
            self,
            BackendStatus::ErrorCreate | BackendStatus::ErrorFind | BackendStatus::ErrorUnknown
        )
    }

    /// Short human-readable reason, used in the `(reason)` suffix of the
    /// per-op error diagnostics printed by the phase engines (spec.md §4.2.2).
    pub fn reason(self) -> &'static str {
        match self {
            BackendStatus::Success => "success",
            BackendStatus::NoOp => "no-op",
            BackendStatus::ErrorCreate => "could not create",
            BackendStatus::ErrorFind => "not found",
            BackendStatus::ErrorUnknown => "unknown error",
        }
    }
}

/// Descriptor for one backend-private CLI option, as returned by
/// [`Backend::options`]. Printed under "Plugin options for interface X"
/// and consumed by [`crate::backend_options::extract_backend_options`].
#[derive(Debug, Clone)]
pub struct BackendOptionSpec {
    pub name: &'static str,
    pub help: &'static str,
    pub takes_value: bool,
}

/// The polymorphic storage interface the phase engines drive.
///
/// All per-operation failures are data (a [`BackendStatus`]), never a
/// propagated error; only setup/teardown may fail fatally, and that failure
/// is a [`DriverError`] the caller turns into an abort.
pub trait Backend: Send {
    /// Short identifying name, e.g. `"posix"`.
    fn name(&self) -> &str;

    /// Additional option descriptors this backend understands.
    fn options(&self) -> Vec<BackendOptionSpec> {
        Vec::new()
    }

    /// Apply this backend's `--<name>.<key>[=value]` options (see
    /// [`Backend::options`]). Default is a no-op; backends that declare
    /// options override this to read their own namespaced values out of
    /// `opts`. Called once, after the backend is built and before
    /// `initialize()`.
    fn configure(&mut self, _opts: &BackendOptions) -> Result<(), DriverError> {
        Ok(())
    }

    /// Per-process setup (connections, client state). Called once after
    /// configuration is final.
    fn initialize(&mut self) -> Result<(), DriverError>;

    /// Tear down per-process setup.
    fn finalize(&mut self) -> Result<(), DriverError>;

    /// Rank-0-only global setup (root namespace, top-level table, ...).
    fn prepare_global(&mut self) -> BackendStatus;

    /// Rank-0-only global teardown.
    fn purge_global(&mut self) -> BackendStatus;

    /// Read the persisted resume index. No-op backends may return 0.
    fn get_index(&mut self) -> i64;

    /// Persist the resume index. May be a no-op.
    fn put_index(&mut self, index: i64);

    /// Canonical dataset name for `(rank, dataset)`.
    fn name_of_dataset(&self, rank: i32, dataset: i32) -> String;

    /// Create the dataset. May return `NoOp` for flat (hierarchy-less)
    /// backends.
    fn create_dataset(&mut self, name: &str) -> BackendStatus;

    /// Remove the dataset. May return `NoOp` for flat backends.
    fn remove_dataset(&mut self, name: &str) -> BackendStatus;

    /// Canonical object name for `(rank, dataset, index)`.
    fn name_of_object(&self, rank: i32, dataset: i32, index: i64) -> String;

    /// Write exactly `buf.len()` bytes as the named object.
    fn write_object(&mut self, dataset: &str, name: &str, buf: &[u8]) -> BackendStatus;

    /// Read exactly `buf.len()` bytes from the named object. Payload
    /// equality with what was written is never verified by the caller.
    fn read_object(&mut self, dataset: &str, name: &str, buf: &mut [u8]) -> BackendStatus;

    /// Verify the object exists (and, where supported, that its size
    /// matches `expected_len`).
    fn stat_object(&mut self, dataset: &str, name: &str, expected_len: usize) -> BackendStatus;

    /// Remove the named object.
    fn delete_object(&mut self, dataset: &str, name: &str) -> BackendStatus;
}

/// A registered backend: a name plus a constructor.
///
/// Concrete backend crates are external to `mdio-core`; a binary assembles
/// the registry at startup by registering the backends it was linked
/// against, mirroring `original_source/src/md-real-io.c`'s static
/// `interfaces[]` array.
pub struct BackendEntry {
    pub name: &'static str,
    pub factory: fn() -> Box<dyn Backend>,
}

/// Process-wide ordered list of registered backends, searched by name.
#[derive(Default)]
pub struct BackendRegistry {
    entries: Vec<BackendEntry>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &'static str, factory: fn() -> Box<dyn Backend>) {
        self.entries.push(BackendEntry { name, factory });
    }

    /// Look up a backend by name and instantiate it.
    pub fn build(&self, name: &str) -> Option<Box<dyn Backend>> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| (e.factory)())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stub;
    impl Backend for Stub {
        fn name(&self) -> &str {
            "stub"
        }
        fn initialize(&mut self) -> Result<(), DriverError> {
            Ok(())
        }
        fn finalize(&mut self) -> Result<(), DriverError> {
            Ok(())
        }
        fn prepare_global(&mut self) -> BackendStatus {
            BackendStatus::NoOp
        }
        fn purge_global(&mut self) -> BackendStatus {
            BackendStatus::NoOp
        }
        fn get_index(&mut self) -> i64 {
            0
        }
        fn put_index(&mut self, _index: i64) {}
        fn name_of_dataset(&self, rank: i32, dataset: i32) -> String {
            format!("{rank}-{dataset}")
        }
        fn create_dataset(&mut self, _name: &str) -> BackendStatus {
            BackendStatus::NoOp
        }
        fn remove_dataset(&mut self, _name: &str) -> BackendStatus {
            BackendStatus::NoOp
        }
        fn name_of_object(&self, rank: i32, dataset: i32, index: i64) -> String {
            format!("{rank}-{dataset}-{index}")
        }
        fn write_object(&mut self, _dataset: &str, _name: &str, _buf: &[u8]) -> BackendStatus {
            BackendStatus::Success
        }
        fn read_object(&mut self, _dataset: &str, _name: &str, _buf: &mut [u8]) -> BackendStatus {
            BackendStatus::Success
        }
        fn stat_object(&mut self, _dataset: &str, _name: &str, _expected_len: usize) -> BackendStatus {
            BackendStatus::Success
        }
        fn delete_object(&mut self, _dataset: &str, _name: &str) -> BackendStatus {
            BackendStatus::Success
        }
    }

    #[test]
    fn registry_finds_by_name() {
        let mut reg = BackendRegistry::new();
        reg.register("stub", || Box::new(Stub));
        assert!(reg.build("stub").is_some());
        assert!(reg.build("nonesuch").is_none());
        assert_eq!(reg.names().collect::<Vec<_>>(), vec!["stub"]);
    }

    #[test]
    fn no_op_is_neither_success_nor_error() {
        assert!(!BackendStatus::NoOp.is_success());
        assert!(!BackendStatus::NoOp.is_error());
    }

    #[test]
    fn error_variants_have_distinct_reasons() {
        assert_eq!(BackendStatus::ErrorCreate.reason(), "could not create");
        assert_eq!(BackendStatus::ErrorFind.reason(), "not found");
        assert_eq!(BackendStatus::ErrorUnknown.reason(), "unknown error");
    }
}
