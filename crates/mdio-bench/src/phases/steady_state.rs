//! Steady-state (benchmark) phase engine (spec.md §4.2.2): one outer round
//! over `[0, num)` objects, each touching `dset_count` datasets with a
//! write to a future-index neighbour object and a stat+read+delete against
//! a past-index neighbour object. Never fatal: every error is counted and
//! execution proceeds (spec.md §7).

use mdio_core::access_pattern::{read_rank, write_rank};
use mdio_core::backend::Backend;
use mdio_core::{Config, PhaseStats};

use super::{maybe_finish, maybe_start};

/// Run one steady-state round (one of `cfg.iterations`) starting from
/// `cumulative_index` (the number of objects already written to each
/// neighbour by earlier rounds, since precreate).
pub fn run(
    cfg: &Config,
    backend: &mut dyn Backend,
    rank: i32,
    size: i32,
    cumulative_index: i64,
    write_buf: &[u8],
    read_buf: &mut [u8],
) -> PhaseStats {
    let capture = cfg.latency_file_prefix.is_some();
    let mut stats = PhaseStats::new(capture);

    for f in 0..cfg.num as i64 {
        let prev_file = f + cumulative_index;
        for d in 0..cfg.dset_count as i32 {
            let w = write_rank(rank, d, cfg.offset, size);
            let write_dataset = backend.name_of_dataset(w, d);
            stats.dataset_name.success += 1;
            let write_name = backend.name_of_object(w, d, cfg.precreate as i64 + prev_file);
            stats.object_name.success += 1;

            if cfg.verbosity >= 2 {
                println!("{rank} write {write_dataset}:{write_name}");
            }
            let start = maybe_start(capture);
            let write_status = backend.write_object(&write_dataset, &write_name, write_buf);
            stats.object_create.record(write_status);
            if let Some(latency) = stats.latency.as_mut() {
                maybe_finish(&mut latency.create, start);
            }
            if write_status.is_error() && cfg.verbosity >= 1 {
                println!("{rank}: Error while writing file {write_name} ({})", write_status.reason());
            }

            let r = read_rank(rank, d, cfg.offset, size);
            let read_dataset = backend.name_of_dataset(r, d);
            stats.dataset_name.success += 1;
            let read_name = backend.name_of_object(r, d, prev_file);
            stats.object_name.success += 1;

            if cfg.verbosity >= 2 {
                println!("{rank} stat {read_dataset}:{read_name}");
            }
            let start = maybe_start(capture);
            let stat_status = backend.stat_object(&read_dataset, &read_name, cfg.object_size);
            stats.object_stat.record(stat_status);
            if let Some(latency) = stats.latency.as_mut() {
                maybe_finish(&mut latency.stat, start);
            }
            if stat_status.is_error() {
                if cfg.verbosity >= 1 {
                    println!("{rank}: Error while stat'ing file {read_name} ({})", stat_status.reason());
                }
                // the object is assumed absent: skip read and delete
                continue;
            }

            if cfg.verbosity >= 2 {
                println!("{rank} read {read_dataset}:{read_name}");
            }
            let start = maybe_start(capture);
            let read_status = backend.read_object(&read_dataset, &read_name, read_buf);
            stats.object_read.record(read_status);
            if let Some(latency) = stats.latency.as_mut() {
                maybe_finish(&mut latency.read, start);
            }
            if read_status.is_error() {
                println!("{rank}: Error while reading file {read_name} ({})", read_status.reason());
            }

            if cfg.verbosity >= 2 {
                println!("{rank} delete {read_dataset}:{read_name}");
            }
            let start = maybe_start(capture);
            let delete_status = backend.delete_object(&read_dataset, &read_name);
            stats.object_delete.record(delete_status);
            if let Some(latency) = stats.latency.as_mut() {
                maybe_finish(&mut latency.delete, start);
            }
            if delete_status.is_error() {
                println!("{rank}: Error while deleting file {read_name} ({})", delete_status.reason());
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdio_backend_dummy::DummyBackend;

    fn cfg(num: u64, dset_count: u32, offset: i32) -> Config {
        let mut c = Config::default();
        c.num = num;
        c.dset_count = dset_count;
        c.offset = offset;
        c.object_size = 8;
        c
    }

    /// Precreate every rank's objects, then run one steady-state round and
    /// verify the neighbour-exchange pattern (spec.md S2).
    fn precreate_all(backend: &mut DummyBackend, size: i32, dset_count: u32, precreate: u64, object_size: usize) {
        for r in 0..size {
            for d in 0..dset_count as i32 {
                let dataset = backend.name_of_dataset(r, d);
                backend.create_dataset(&dataset);
                for f in 0..precreate as i64 {
                    let name = backend.name_of_object(r, d, f);
                    backend.write_object(&dataset, &name, &vec![0u8; object_size]);
                }
            }
        }
    }

    #[test]
    fn single_rank_group_reads_its_own_writes() {
        let mut backend = DummyBackend::new();
        precreate_all(&mut backend, 1, 1, 2, 8);
        let c = cfg(2, 1, 1);
        let write_buf = vec![9u8; 8];
        let mut read_buf = vec![0u8; 8];
        let stats = run(&c, &mut backend, 0, 1, 0, &write_buf, &mut read_buf);

        assert_eq!(stats.object_create.success, 2);
        assert_eq!(stats.object_stat.success, 2);
        assert_eq!(stats.object_read.success, 2);
        assert_eq!(stats.object_delete.success, 2);
        assert_eq!(stats.total_errors(), 0);
    }

    #[test]
    fn stat_error_short_circuits_read_and_delete() {
        let mut backend = DummyBackend::new();
        // nothing precreated: every stat target is absent.
        let c = cfg(1, 1, 1);
        let write_buf = vec![1u8; 8];
        let mut read_buf = vec![0u8; 8];
        let stats = run(&c, &mut backend, 0, 4, 0, &write_buf, &mut read_buf);

        assert_eq!(stats.object_stat.error, 1);
        assert_eq!(stats.object_read.success + stats.object_read.error, 0);
        assert_eq!(stats.object_delete.success + stats.object_delete.error, 0);
    }

    #[test]
    fn neighbour_exchange_targets_the_offset_rank() {
        // rank 1 of a 4-rank group with offset=1, dataset 0 writes to rank 2
        // and reads from rank 0.
        assert_eq!(write_rank(1, 0, 1, 4), 2);
        assert_eq!(read_rank(1, 0, 1, 4), 0);
    }
}
