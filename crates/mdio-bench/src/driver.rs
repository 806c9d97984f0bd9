//! The phase driver (spec.md §4.5): startup, the three-phase run loop, and
//! shutdown. Owns the one real [`GroupComm`] for the process and is the
//! only thing in this crate allowed to call `abort` — the phase engines
//! are plain functions of their inputs and only ever report a fatal
//! condition back (see [`crate::phases::precreate::PrecreateOutcome`]).

use mdio_core::backend::{Backend, BackendRegistry};
use mdio_core::backend_options::BackendOptions;
use mdio_core::groupcomm::GroupComm;
use mdio_core::memory_ballast::MemoryBallast;
use mdio_core::stats::LatencyCapture;
use mdio_core::{Clock, Config, DriverError, PhaseStats};

use crate::latency;
use crate::phases::{cleanup, precreate, steady_state};
use crate::report;

/// Tag used for the rank-0 tagged-receive of per-process report lines.
/// Reused across phases: each phase's collection happens strictly before
/// the next phase starts any communication.
const PROCESS_REPORT_TAG: i32 = 7301;

/// Run the full benchmark (startup, phases, shutdown) and return the
/// process exit code.
pub fn run(cfg: &Config, comm: &GroupComm, registry: &BackendRegistry, backend_options: &BackendOptions) -> i32 {
    let rank = comm.rank();
    let size = comm.size();

    if cfg.backend_name == "list" {
        if rank == 0 {
            println!("registered backends:");
            for name in registry.names() {
                println!("  {name}");
            }
        }
        return 0;
    }

    if cfg.print_pattern {
        if rank == 0 {
            report::print_access_pattern(cfg, size);
        }
        return 0;
    }

    let Some(mut backend) = registry.build(&cfg.backend_name) else {
        if rank == 0 {
            println!("ERROR: {}", DriverError::BackendNotFound(cfg.backend_name.clone()));
        }
        comm.abort(1);
    };

    if rank == 0 && !cfg.quiet {
        report::print_backend_options(&cfg.backend_name, &backend.options());
    }

    if let Err(e) = backend.configure(backend_options) {
        if rank == 0 {
            println!("ERROR: invalid backend option: {e}");
        }
        comm.abort(1);
    }

    if let Err(e) = backend.initialize() {
        if rank == 0 {
            println!("ERROR: {}", DriverError::BackendInitFailed(e.to_string()));
        }
        comm.abort(1);
    }

    let mut cfg = cfg.clone();
    if cfg.no_phase_selected() {
        cfg.enable_all_phases();
    }

    if cfg.start_index > 0 && cfg.run_precreate {
        if rank == 0 {
            println!("ERROR: {}", DriverError::ResumeIncompatibleWithPrecreate);
        }
        comm.abort(1);
    }

    let mut startup_ballast = MemoryBallast::new();
    let _ = startup_ballast.grow_to_ceiling(cfg.limit_memory, cfg.verbosity >= 2);

    // Resuming without a fresh precreate: the ledger is best-effort
    // (spec.md §9) and may be a no-op backend returning 0, so an explicit
    // `--start-index` always takes precedence when it names a later index.
    let mut cumulative_index: i64 = if cfg.run_precreate {
        0
    } else {
        cfg.start_index.max(backend.get_index())
    };

    let total_runtime = Clock::start();
    if !cfg.quiet && rank == 0 {
        report::print_banner(&cfg, size);
    }

    let write_buf = vec![(rank.rem_euclid(256)) as u8; cfg.object_size];
    let mut read_buf = vec![0u8; cfg.object_size];

    if cfg.run_precreate {
        if rank == 0 {
            let status = backend.prepare_global();
            if status.is_error() {
                println!("ERROR: {}", DriverError::PrepareGlobalFailed);
                comm.abort(1);
            }
        }
        comm.barrier();

        let phase_start = Clock::start();
        let outcome = precreate::run(&cfg, backend.as_mut(), rank, &write_buf);
        let mut stats = outcome.stats;
        if outcome.fatal {
            // abort-group happens before the phase's end-of-phase barrier
            // (spec.md S3): other ranks may be mid-phase or already waiting
            // at their own barrier, and MPI_Abort tears down the whole group
            // regardless.
            comm.abort(1);
        }
        end_phase(&cfg, comm, "precreate", phase_start, &mut stats, 0);
    }

    if cfg.run_benchmark {
        for i in 0..cfg.iterations {
            let phase_start = Clock::start();
            let mut stats = steady_state::run(
                &cfg,
                backend.as_mut(),
                rank,
                size,
                cumulative_index,
                &write_buf,
                &mut read_buf,
            );
            end_phase(&cfg, comm, "benchmark", phase_start, &mut stats, i as i64);
            cumulative_index += cfg.num as i64;
        }
    }

    if cfg.run_cleanup {
        let phase_start = Clock::start();
        let mut stats = cleanup::run(&cfg, backend.as_mut(), rank, cumulative_index);
        end_phase(&cfg, comm, "cleanup", phase_start, &mut stats, 0);

        if rank == 0 {
            backend.purge_global();
        }
    } else {
        backend.put_index(cumulative_index);
    }

    if !cfg.quiet && rank == 0 {
        report::print_closing(total_runtime.elapsed());
    }

    startup_ballast.release();
    let _ = backend.finalize();
    0
}

/// End-of-phase bookkeeping common to all three phases (spec.md §4.2.4):
/// stop the pre-barrier clock, barrier, stop the post-barrier clock,
/// reduce across the group, report, write latency files, then apply and
/// release the between-phases memory ballast.
fn end_phase(cfg: &Config, comm: &GroupComm, phase_name: &str, phase_start: Clock, stats: &mut PhaseStats, iteration: i64) {
    stats.wall_clock_pre_barrier = phase_start.elapsed();
    comm.barrier();
    stats.wall_clock_post_barrier = phase_start.elapsed();

    let reduced = stats.reduce(comm);
    let rank = comm.rank();

    if rank == 0 && !cfg.quiet {
        println!("{}", report::phase_summary_line(phase_name, &reduced, cfg));
        if cfg.print_detailed_stats {
            report::print_detailed_stats_header();
            println!("{}", report::detailed_stats_line(phase_name, &reduced, cfg));
        }
    }

    if cfg.process_report {
        run_process_reports(cfg, comm, phase_name, stats);
    }

    if let Some(prefix) = &cfg.latency_file_prefix {
        if rank == 0 {
            write_latency_files(prefix, phase_name, iteration, rank, &stats.latency);
        }
    }

    stats.latency = None;

    let mut ballast = MemoryBallast::new();
    let _ = ballast.grow_to_ceiling(cfg.limit_memory_between_phases, cfg.verbosity >= 2);
    ballast.release();
}

/// Rank 0 collects and prints each rank's own phase summary line, in rank
/// order, via tagged point-to-point receive.
fn run_process_reports(cfg: &Config, comm: &GroupComm, phase_name: &str, own_stats: &PhaseStats) {
    let rank = comm.rank();
    let size = comm.size();
    let own_line = report::phase_summary_line(phase_name, own_stats, cfg);

    if rank == 0 {
        println!("{}", report::process_report_line(0, &own_line));
        for source in 1..size {
            let buf = comm.recv_tagged(source, PROCESS_REPORT_TAG);
            let line = String::from_utf8_lossy(&buf);
            println!("{}", report::process_report_line(source, &line));
        }
    } else {
        comm.send_tagged(0, PROCESS_REPORT_TAG, own_line.as_bytes());
    }
}

fn write_latency_files(prefix: &str, phase_name: &str, iteration: i64, rank: i32, latency: &Option<LatencyCapture>) {
    let Some(latency) = latency else { return };
    match phase_name.chars().next() {
        Some('p') => {
            let _ = latency::write_csv(prefix, iteration, "precreate", rank, &latency.create);
        }
        Some('b') => {
            let _ = latency::write_csv(prefix, iteration, "create", rank, &latency.create);
            let _ = latency::write_csv(prefix, iteration, "read", rank, &latency.read);
            let _ = latency::write_csv(prefix, iteration, "stat", rank, &latency.stat);
            let _ = latency::write_csv(prefix, iteration, "delete", rank, &latency.delete);
        }
        _ => {
            let _ = latency::write_csv(prefix, iteration, "cleanup", rank, &latency.delete);
        }
    }
}
