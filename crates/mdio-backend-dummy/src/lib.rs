//! In-memory backend used by the test harness and by `--interface dummy`.
//! Datasets are not modelled (flat key space, `create_dataset`/
//! `remove_dataset` are a first-class no-op); objects are plain byte
//! vectors keyed by `(dataset, name)`.
//!
//! Grounded on `original_source/plugins/md-dummy.c`: the `fake_errors` flag
//! (here `fail_ops`) that makes write/read/stat/delete return an error for
//! testing the driver's error paths, and `print_pattern` printing each
//! operation's target name. Unlike the C dummy (which is purely stateless),
//! this one actually stores payloads so scenario tests can assert on read
//! content and on stat-after-write/delete-after-write behavior.

use std::collections::HashMap;

use mdio_core::backend::{Backend, BackendOptionSpec, BackendStatus};
use mdio_core::backend_options::BackendOptions;
use mdio_core::error::DriverError;

/// In-memory storage backend with optional fault injection.
pub struct DummyBackend {
    objects: HashMap<(String, String), Vec<u8>>,
    index: i64,
    /// When set, every write/read/stat/delete returns an error instead of
    /// touching storage. Mirrors `md-dummy.c`'s `fake_errors`.
    pub fail_ops: bool,
    /// Print each operation's target name before performing it.
    pub print_pattern: bool,
}

impl DummyBackend {
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            index: 0,
            fail_ops: false,
            print_pattern: false,
        }
    }

    pub fn with_fail_ops(mut self, fail: bool) -> Self {
        self.fail_ops = fail;
        self
    }
}

impl Default for DummyBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for DummyBackend {
    fn name(&self) -> &str {
        "dummy"
    }

    fn options(&self) -> Vec<BackendOptionSpec> {
        vec![
            BackendOptionSpec {
                name: "fail-ops",
                help: "fake errors on every write/read/stat/delete (best used with --ignore-precreate-errors)",
                takes_value: false,
            },
            BackendOptionSpec {
                name: "print-pattern",
                help: "print each operation's target name",
                takes_value: false,
            },
        ]
    }

    fn configure(&mut self, opts: &BackendOptions) -> Result<(), DriverError> {
        for (key, value) in opts.for_prefix("dummy") {
            match key {
                "fail-ops" => self.fail_ops = value.as_bool(),
                "print-pattern" => self.print_pattern = value.as_bool(),
                _ => {}
            }
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
        BackendStatus::Success
    }

    fn purge_global(&mut self) -> BackendStatus {
        BackendStatus::Success
    }

    fn get_index(&mut self) -> i64 {
        self.index
    }

    fn put_index(&mut self, index: i64) {
        self.index = index;
    }

    fn name_of_dataset(&self, rank: i32, dataset: i32) -> String {
        format!("n={rank}/d={dataset}")
    }

    fn create_dataset(&mut self, name: &str) -> BackendStatus {
        if self.print_pattern {
            println!("create dset: {name}");
        }
        BackendStatus::NoOp
    }

    fn remove_dataset(&mut self, name: &str) -> BackendStatus {
        if self.print_pattern {
            println!("rm dset: {name}");
        }
        BackendStatus::NoOp
    }

    fn name_of_object(&self, rank: i32, dataset: i32, index: i64) -> String {
        format!("n={rank}/d={dataset}/i={index}")
    }

    fn write_object(&mut self, dataset: &str, name: &str, buf: &[u8]) -> BackendStatus {
        if self.print_pattern {
            println!("write obj: {name}");
        }
        if self.fail_ops {
            return BackendStatus::ErrorUnknown;
        }
        self.objects.insert((dataset.to_string(), name.to_string()), buf.to_vec());
        BackendStatus::Success
    }

    fn read_object(&mut self, dataset: &str, name: &str, buf: &mut [u8]) -> BackendStatus {
        if self.print_pattern {
            println!("read obj: {name}");
        }
        if self.fail_ops {
            return BackendStatus::ErrorUnknown;
        }
        match self.objects.get(&(dataset.to_string(), name.to_string())) {
            Some(stored) if stored.len() == buf.len() => {
                buf.copy_from_slice(stored);
                BackendStatus::Success
            }
            Some(_) => BackendStatus::ErrorUnknown,
            None => BackendStatus::ErrorFind,
        }
    }

    fn stat_object(&mut self, dataset: &str, name: &str, expected_len: usize) -> BackendStatus {
        if self.print_pattern {
            println!("stat obj: {name}");
        }
        if self.fail_ops {
            return BackendStatus::ErrorFind;
        }
        match self.objects.get(&(dataset.to_string(), name.to_string())) {
            Some(stored) if stored.len() == expected_len => BackendStatus::Success,
            Some(_) => BackendStatus::ErrorUnknown,
            None => BackendStatus::ErrorFind,
        }
    }

    fn delete_object(&mut self, dataset: &str, name: &str) -> BackendStatus {
        if self.print_pattern {
            println!("delete obj: {name}");
        }
        if self.fail_ops {
            return BackendStatus::ErrorUnknown;
        }
        match self.objects.remove(&(dataset.to_string(), name.to_string())) {
            Some(_) => BackendStatus::Success,
            None => BackendStatus::ErrorFind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_ops_are_no_ops() {
        let mut backend = DummyBackend::new();
        assert_eq!(backend.create_dataset("x"), BackendStatus::NoOp);
        assert_eq!(backend.remove_dataset("x"), BackendStatus::NoOp);
    }

    #[test]
    fn write_then_read_round_trips_payload() {
        let mut backend = DummyBackend::new();
        let payload = vec![9u8; 16];
        assert_eq!(backend.write_object("d", "o", &payload), BackendStatus::Success);
        let mut buf = vec![0u8; 16];
        assert_eq!(backend.read_object("d", "o", &mut buf), BackendStatus::Success);
        assert_eq!(buf, payload);
        assert_eq!(backend.stat_object("d", "o", 16), BackendStatus::Success);
    }

    #[test]
    fn missing_object_is_error_find() {
        let mut backend = DummyBackend::new();
        let mut buf = vec![0u8; 4];
        assert_eq!(backend.read_object("d", "ghost", &mut buf), BackendStatus::ErrorFind);
        assert_eq!(backend.stat_object("d", "ghost", 4), BackendStatus::ErrorFind);
        assert_eq!(backend.delete_object("d", "ghost"), BackendStatus::ErrorFind);
    }

    #[test]
    fn fail_ops_forces_errors_everywhere() {
        let mut backend = DummyBackend::new().with_fail_ops(true);
        let mut buf = vec![0u8; 4];
        assert_eq!(backend.write_object("d", "o", &buf), BackendStatus::ErrorUnknown);
        assert_eq!(backend.read_object("d", "o", &mut buf), BackendStatus::ErrorUnknown);
        assert_eq!(backend.stat_object("d", "o", 4), BackendStatus::ErrorFind);
        assert_eq!(backend.delete_object("d", "o"), BackendStatus::ErrorUnknown);
    }

    #[test]
    fn configure_applies_dummy_dot_fail_ops() {
        let mut backend = DummyBackend::new();
        let mut opts = mdio_core::backend_options::BackendOptions::new();
        opts.insert("dummy.fail-ops".to_string(), mdio_core::backend_options::OptionValue::Flag);
        backend.configure(&opts).unwrap();
        assert!(backend.fail_ops);
    }

    #[test]
    fn index_ledger_roundtrips() {
        let mut backend = DummyBackend::new();
        assert_eq!(backend.get_index(), 0);
        backend.put_index(17);
        assert_eq!(backend.get_index(), 17);
    }
}
