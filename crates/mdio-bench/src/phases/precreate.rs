//! Precreate phase engine (spec.md §4.2.1): build each process's datasets,
//! then populate `[0, precreate)` objects in each, filling the latency
//! sequence at position `dataset * precreate + object`.
//!
//! Takes `rank` rather than a live [`mdio_core::groupcomm::GroupComm`] and
//! signals a fatal condition back through [`PrecreateOutcome::fatal`]
//! instead of aborting itself: only the phase driver owns the collective
//! group, so only it may call `abort`. This keeps the engine a pure
//! function of its inputs, testable without an MPI universe.

use mdio_core::backend::Backend;
use mdio_core::{Config, PhaseStats};

use super::{maybe_finish, maybe_start};

/// Result of running the precreate phase on this process.
pub struct PrecreateOutcome {
    pub stats: PhaseStats,
    /// `true` if a dataset or object creation failed and
    /// `ignore_precreate_errors` is unset: the caller must abort the group.
    pub fatal: bool,
}

/// Run the precreate phase for this process.
pub fn run(cfg: &Config, backend: &mut dyn Backend, rank: i32, write_buf: &[u8]) -> PrecreateOutcome {
    let capture = cfg.latency_file_prefix.is_some();
    let mut stats = PhaseStats::new(capture);
    let mut fatal = false;

    for d in 0..cfg.dset_count as i32 {
        let name = backend.name_of_dataset(rank, d);
        stats.dataset_name.success += 1;

        let status = backend.create_dataset(&name);
        stats.dataset_create.record(status);
        if status.is_error() {
            if cfg.verbosity >= 1 {
                println!("{rank}: Error while creating dataset {name} ({})", status.reason());
            }
            if !cfg.ignore_precreate_errors {
                println!("ERROR: dataset creation failed and --ignore-precreate-errors is not set");
                fatal = true;
                break;
            }
        }
    }

    'outer: for d in 0..cfg.dset_count as i32 {
        if fatal {
            break;
        }
        let dataset = backend.name_of_dataset(rank, d);
        for f in 0..cfg.precreate as i64 {
            let name = backend.name_of_object(rank, d, f);
            stats.object_name.success += 1;

            if cfg.verbosity >= 2 {
                println!("{rank} write {dataset}:{name}");
            }

            let start = maybe_start(capture);
            let status = backend.write_object(&dataset, &name, write_buf);
            stats.object_create.record(status);
            if let Some(latency) = stats.latency.as_mut() {
                maybe_finish(&mut latency.create, start);
            }

            if status.is_error() {
                if cfg.verbosity >= 1 {
                    println!("{rank}: Error while writing file {name} ({})", status.reason());
                }
                if !cfg.ignore_precreate_errors {
                    println!("ERROR: object creation failed and --ignore-precreate-errors is not set");
                    fatal = true;
                    break 'outer;
                }
            }
        }
    }

    PrecreateOutcome { stats, fatal }
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
    fn creates_datasets_and_precreates_objects() {
        let mut backend = DummyBackend::new();
        let buf = vec![0u8; 8];
        let outcome = run(&cfg(2, 4), &mut backend, 0, &buf);

        assert!(!outcome.fatal);
        assert_eq!(outcome.stats.dataset_create.success, 2);
        assert_eq!(outcome.stats.object_create.success, 8);
        assert_eq!(outcome.stats.object_create.error, 0);
        assert_eq!(outcome.stats.total_errors(), 0);
    }

    #[test]
    fn latency_positions_match_dataset_major_order() {
        let mut backend = DummyBackend::new();
        let mut c = cfg(2, 3);
        c.latency_file_prefix = Some("lat".into());
        let buf = vec![0u8; 8];
        let outcome = run(&c, &mut backend, 0, &buf);

        let latency = outcome.stats.latency.expect("latency capture enabled");
        assert_eq!(latency.create.len(), 6);
    }

    #[test]
    fn errors_are_counted_and_ignored_when_flag_is_set() {
        let mut backend = DummyBackend::new().with_fail_ops(true);
        let mut c = cfg(1, 3);
        c.ignore_precreate_errors = true;
        let buf = vec![0u8; 8];
        let outcome = run(&c, &mut backend, 0, &buf);

        assert!(!outcome.fatal);
        assert_eq!(outcome.stats.object_create.error, 3);
        assert_eq!(outcome.stats.object_create.success, 0);
    }

    #[test]
    fn errors_are_fatal_without_the_ignore_flag() {
        let mut backend = DummyBackend::new().with_fail_ops(true);
        let c = cfg(1, 3);
        let buf = vec![0u8; 8];
        let outcome = run(&c, &mut backend, 0, &buf);

        assert!(outcome.fatal);
        // the first failing write stops further precreate work this phase
        assert_eq!(outcome.stats.object_create.error, 1);
    }
}
