//! Cleanup phase engine (spec.md §4.2.3): remove every object and dataset
//! this process created during precreate and steady-state. Never fatal.

use mdio_core::backend::Backend;
use mdio_core::{Config, PhaseStats};

use super::{maybe_finish, maybe_start};

/// Run the cleanup phase, removing object indices
/// `[start_index, start_index + precreate + num*iterations)` in each
/// dataset, then the dataset itself. `cumulative_index` is the object
/// count written since precreate (`precreate + num*iterations` on a
/// straight-through run, or whatever the index ledger recorded on a
/// cleanup-only resume).
pub fn run(cfg: &Config, backend: &mut dyn Backend, rank: i32, cumulative_index: i64) -> PhaseStats {
    let capture = cfg.latency_file_prefix.is_some();
    let mut stats = PhaseStats::new(capture);

    for d in 0..cfg.dset_count as i32 {
        let dataset = backend.name_of_dataset(rank, d);
        stats.dataset_name.success += 1;

        for f in 0..cfg.precreate as i64 {
            let name = backend.name_of_object(rank, d, f + cumulative_index);
            stats.object_name.success += 1;

            if cfg.verbosity >= 2 {
                println!("{rank} delete {dataset}:{name}");
            }
            let start = maybe_start(capture);
            let status = backend.delete_object(&dataset, &name);
            stats.object_delete.record(status);
            if let Some(latency) = stats.latency.as_mut() {
                maybe_finish(&mut latency.delete, start);
            }
            if status.is_error() {
                println!("{rank}: Error while deleting file {name} ({})", status.reason());
            }
        }

        let status = backend.remove_dataset(&dataset);
        stats.dataset_delete.record(status);
        if status.is_error() && cfg.verbosity >= 1 {
            println!("{rank}: Error while removing dataset {dataset} ({})", status.reason());
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdio_backend_dummy::DummyBackend;

    fn cfg(dset_count: u32, precreate: u64) -> Config {
        let mut c = Config::default();
        c.dset_count = dset_count;
        c.precreate = precreate;
        c.object_size = 8;
        c
    }

    #[test]
    fn empty_backend_reports_only_find_errors() {
        let mut backend = DummyBackend::new();
        let stats = run(&cfg(2, 3), &mut backend, 0, 0);

        assert_eq!(stats.object_delete.success, 0);
        assert_eq!(stats.object_delete.error, 6);
        // create_dataset/remove_dataset are no-ops on the flat dummy backend
        assert_eq!(stats.dataset_delete.success, 0);
        assert_eq!(stats.dataset_delete.error, 0);
    }

    #[test]
    fn removes_every_precreated_object_and_its_dataset() {
        let mut backend = DummyBackend::new();
        let dataset = backend.name_of_dataset(0, 0);
        backend.create_dataset(&dataset);
        for f in 0..3i64 {
            let name = backend.name_of_object(0, 0, f);
            backend.write_object(&dataset, &name, &vec![0u8; 8]);
        }

        let stats = run(&cfg(1, 3), &mut backend, 0, 0);
        assert_eq!(stats.object_delete.success, 3);
        assert_eq!(stats.total_errors(), 0);
    }
}
