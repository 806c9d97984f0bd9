//! The per-process statistics bundle: success/error counters per operation
//! kind, the two phase wall-clocks, and optional per-op latency sequences,
//! plus their cross-process reduction.
//!
//! Grounded on `original_source/src/md-real-io.c`'s `prepare_report`
//! (two `MPI_Reduce` calls: MAX over the wall-clock pair, SUM over the
//! eight success/error pairs) and `ior-bench/src/report.rs`'s
//! `reduce_timers`/`reduce_data_moved` (the per-field MPI reduce pattern
//! this module generalizes from a fixed timer array to a named bundle).

use crate::backend::BackendStatus;
use crate::groupcomm::GroupComm;

/// A (successes, errors) pair for one operation kind. `no-op` results never
/// touch either counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpCounter {
    pub success: u64,
    pub error: u64,
}

impl OpCounter {
    pub fn record(&mut self, status: BackendStatus) {
        match status {
            BackendStatus::Success => self.success += 1,
            BackendStatus::NoOp => {}
            BackendStatus::ErrorCreate | BackendStatus::ErrorFind | BackendStatus::ErrorUnknown => {
                self.error += 1
            }
        }
    }

    pub fn total(&self) -> u64 {
        self.success + self.error
    }
}

/// Number of distinct operation kinds tracked per phase.
pub const NUM_OP_KINDS: usize = 8;

/// `(time_since_global_start, duration)` pair for one captured operation.
pub type LatencySample = (f64, f64);

/// Lazily-allocated per-op latency sequences. Only populated when
/// `latency_file_prefix` is set.
#[derive(Debug, Clone, Default)]
pub struct LatencyCapture {
    pub create: Vec<LatencySample>,
    pub read: Vec<LatencySample>,
    pub stat: Vec<LatencySample>,
    pub delete: Vec<LatencySample>,
}

/// Per-process statistics for a single phase (one precreate run, one
/// steady-state iteration, or the cleanup run).
#[derive(Debug, Clone, Default)]
pub struct PhaseStats {
    pub dataset_name: OpCounter,
    pub dataset_create: OpCounter,
    pub dataset_delete: OpCounter,
    pub object_name: OpCounter,
    pub object_create: OpCounter,
    pub object_read: OpCounter,
    pub object_stat: OpCounter,
    pub object_delete: OpCounter,

    /// Phase wall-clock not including the end-of-phase barrier.
    pub wall_clock_pre_barrier: f64,
    /// Phase wall-clock including the end-of-phase barrier.
    pub wall_clock_post_barrier: f64,

    pub latency: Option<LatencyCapture>,
}

impl PhaseStats {
    pub fn new(capture_latency: bool) -> Self {
        Self {
            latency: capture_latency.then(LatencyCapture::default),
            ..Default::default()
        }
    }

    fn counters_in_order(&self) -> [OpCounter; NUM_OP_KINDS] {
        [
            self.dataset_name,
            self.dataset_create,
            self.dataset_delete,
            self.object_name,
            self.object_create,
            self.object_read,
            self.object_stat,
            self.object_delete,
        ]
    }

    fn set_counters_in_order(&mut self, c: [OpCounter; NUM_OP_KINDS]) {
        self.dataset_name = c[0];
        self.dataset_create = c[1];
        self.dataset_delete = c[2];
        self.object_name = c[3];
        self.object_create = c[4];
        self.object_read = c[5];
        self.object_stat = c[6];
        self.object_delete = c[7];
    }

    /// Total errors across every operation kind.
    pub fn total_errors(&self) -> u64 {
        self.counters_in_order().iter().map(|c| c.error).sum()
    }

    /// Reduce this process's statistics across the group: wall-clocks via
    /// MPI max, counters via MPI sum. Only the value returned on rank 0 is
    /// meaningful; other ranks get an unspecified bundle.
    pub fn reduce(&self, comm: &GroupComm) -> PhaseStats {
        let local_timers = [self.wall_clock_pre_barrier, self.wall_clock_post_barrier];
        let mut reduced_timers = [0.0f64; 2];
        comm.max_reduce(&local_timers, &mut reduced_timers);

        let counters = self.counters_in_order();
        let mut local_ints = [0u64; NUM_OP_KINDS * 2];
        for (i, c) in counters.iter().enumerate() {
            local_ints[i * 2] = c.success;
            local_ints[i * 2 + 1] = c.error;
        }
        let mut reduced_ints = [0u64; NUM_OP_KINDS * 2];
        comm.sum_reduce(&local_ints, &mut reduced_ints);

        let mut reduced_counters = [OpCounter::default(); NUM_OP_KINDS];
        for i in 0..NUM_OP_KINDS {
            reduced_counters[i] = OpCounter {
                success: reduced_ints[i * 2],
                error: reduced_ints[i * 2 + 1],
            };
        }

        let mut out = PhaseStats {
            wall_clock_pre_barrier: reduced_timers[0],
            wall_clock_post_barrier: reduced_timers[1],
            latency: None,
            ..Default::default()
        };
        out.set_counters_in_order(reduced_counters);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_op_status_counts_neither() {
        let mut c = OpCounter::default();
        c.record(BackendStatus::NoOp);
        assert_eq!(c, OpCounter::default());
    }

    #[test]
    fn success_and_error_accumulate() {
        let mut c = OpCounter::default();
        c.record(BackendStatus::Success);
        c.record(BackendStatus::ErrorFind);
        c.record(BackendStatus::Success);
        assert_eq!(c.success, 2);
        assert_eq!(c.error, 1);
        assert_eq!(c.total(), 3);
    }

    #[test]
    fn total_errors_sums_every_kind() {
        let mut s = PhaseStats::default();
        s.object_create.error = 2;
        s.object_read.error = 1;
        s.dataset_create.success = 5;
        assert_eq!(s.total_errors(), 3);
    }
}
