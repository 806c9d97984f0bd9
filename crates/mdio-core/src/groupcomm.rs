//! Thin wrapper around the `mpi` crate's collective-group primitives:
//! rank/size discovery, barrier, max/sum reduction on small arrays, tagged
//! point-to-point exchange of fixed-size byte buffers, and abort.
//!
//! Grounded on `mdtest-bench`'s direct use of `mpi::traits::*` /
//! `SimpleCommunicator` and `ior-bench/src/report.rs`'s
//! `reduce_timers`/`reduce_data_moved` (the min/max-per-field reduce
//! pattern). Promoted to its own type because the phase driver must depend
//! on an adapter, not the raw `mpi` API, to keep `mdio-core` the single
//! place that knows about the collective layer.

use mpi::collective::SystemOperation;
use mpi::topology::SimpleCommunicator;
use mpi::traits::*;

/// Adapter around a single MPI communicator representing the benchmark's
/// collective group.
pub struct GroupComm {
    comm: SimpleCommunicator,
}

impl GroupComm {
    pub fn new(comm: SimpleCommunicator) -> Self {
        Self { comm }
    }

    pub fn rank(&self) -> i32 {
        self.comm.rank()
    }

    pub fn size(&self) -> i32 {
        self.comm.size()
    }

    pub fn is_root(&self) -> bool {
        self.rank() == 0
    }

    pub fn barrier(&self) {
        self.comm.barrier();
    }

    /// Element-wise max-reduce of a small double array onto rank 0.
    /// Non-root ranks receive an unspecified buffer back.
    pub fn max_reduce(&self, local: &[f64], out: &mut [f64]) {
        debug_assert_eq!(local.len(), out.len());
        let root = self.comm.process_at_rank(0);
        if self.is_root() {
            root.reduce_into_root(&local, out, SystemOperation::max());
        } else {
            root.reduce_into(&local, SystemOperation::max());
        }
    }

    /// Element-wise sum-reduce of a small unsigned integer array onto rank 0.
    pub fn sum_reduce(&self, local: &[u64], out: &mut [u64]) {
        debug_assert_eq!(local.len(), out.len());
        let root = self.comm.process_at_rank(0);
        if self.is_root() {
            root.reduce_into_root(&local, out, SystemOperation::sum());
        } else {
            root.reduce_into(&local, SystemOperation::sum());
        }
    }

    /// Send a byte buffer to `dest` tagged with `tag`.
    pub fn send_tagged(&self, dest: i32, tag: i32, buf: &[u8]) {
        self.comm.process_at_rank(dest).send_with_tag(buf, tag);
    }

    /// Blockingly receive a byte buffer tagged with `tag` from `source`.
    pub fn recv_tagged(&self, source: i32, tag: i32) -> Vec<u8> {
        let (buf, _status) = self.comm.process_at_rank(source).receive_vec_with_tag::<u8>(tag);
        buf
    }

    /// Abort every process in the group with the given exit code. Does not
    /// return.
    pub fn abort(&self, code: i32) -> ! {
        self.comm.abort(code);
        unreachable!("MPI_Abort does not return")
    }
}
