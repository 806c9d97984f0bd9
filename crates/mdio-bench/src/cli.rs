//! Command-line surface (spec.md §6). A thin `clap` derive that converts
//! into the immutable [`mdio_core::Config`] exactly once, mirroring
//! `mdtest-bench/src/cli.rs`'s `CliArgs::into_mdtest_param`.

use clap::Parser;
use mdio_core::Config;

#[derive(Parser, Debug)]
#[command(name = "mdio-bench", about = "Metadata and small-object I/O benchmark")]
pub struct CliArgs {
    /// Rank-shift base controlling how far writers are from the ranks they
    /// also read from.
    #[arg(short = 'O', long = "offset", default_value_t = 1)]
    pub offset: i32,

    /// Storage backend name; `list` prints the registry and exits.
    #[arg(short = 'i', long = "interface", default_value = "posix")]
    pub interface: String,

    /// Objects per process per dataset per iteration.
    #[arg(short = 'I', long = "obj-per-proc", default_value_t = 1)]
    pub obj_per_proc: u64,

    /// Preloaded objects per process per dataset.
    #[arg(short = 'P', long = "precreate-per-set", default_value_t = 0)]
    pub precreate_per_set: u64,

    /// Datasets per process.
    #[arg(short = 'D', long = "data-sets", default_value_t = 1)]
    pub data_sets: u32,

    /// Payload bytes per object.
    #[arg(short = 'S', long = "object-size", default_value_t = 4096)]
    pub object_size: usize,

    /// Steady-state repeats.
    #[arg(short = 'R', long = "iterations", default_value_t = 1)]
    pub iterations: u32,

    /// Enable per-op latency CSVs, named with this prefix.
    #[arg(short = 'L', long = "latency")]
    pub latency: Option<String>,

    /// Memory ballast ceiling applied at startup (MiB).
    #[arg(short = 'm', long = "lim-free-mem", default_value_t = 0)]
    pub lim_free_mem: u64,

    /// Memory ballast ceiling applied between phases (MiB).
    #[arg(short = 'M', long = "lim-free-mem-phase", default_value_t = 0)]
    pub lim_free_mem_phase: u64,

    /// Object index offset for resumed runs.
    #[arg(long = "start-index", default_value_t = 0)]
    pub start_index: i64,

    /// Run the precreate phase. If none of --run-precreate/--run-benchmark/
    /// --run-cleanup is given, all three run.
    #[arg(long = "run-precreate")]
    pub run_precreate: bool,

    /// Run the steady-state (benchmark) phase.
    #[arg(long = "run-benchmark")]
    pub run_benchmark: bool,

    /// Run the cleanup phase.
    #[arg(long = "run-cleanup")]
    pub run_cleanup: bool,

    /// Don't abort the group on a precreate error; count it instead.
    #[arg(long = "ignore-precreate-errors")]
    pub ignore_precreate_errors: bool,

    /// Print each rank's phase summary line, not just the aggregate.
    #[arg(long = "process-reports")]
    pub process_reports: bool,

    /// Print one tab-delimited line with every counter, both wall-clocks,
    /// and throughput, per phase.
    #[arg(long = "print-detailed-stats")]
    pub print_detailed_stats: bool,

    /// Print the write_rank/read_rank table for every (rank, dataset) pair
    /// and exit without touching the backend.
    #[arg(long = "print-pattern")]
    pub print_pattern: bool,

    /// Suppress the startup banner and phase summary lines.
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Increase verbosity (repeatable).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl CliArgs {
    /// Convert parsed CLI arguments into the immutable benchmark
    /// configuration. Called exactly once at startup.
    pub fn into_config(self) -> Config {
        Config {
            backend_name: self.interface,
            num: self.obj_per_proc,
            precreate: self.precreate_per_set,
            dset_count: self.data_sets,
            offset: self.offset,
            iterations: self.iterations.max(1),
            object_size: self.object_size,
            run_precreate: self.run_precreate,
            run_benchmark: self.run_benchmark,
            run_cleanup: self.run_cleanup,
            ignore_precreate_errors: self.ignore_precreate_errors,
            process_report: self.process_reports,
            verbosity: self.verbose,
            quiet: self.quiet,
            print_detailed_stats: self.print_detailed_stats,
            print_pattern: self.print_pattern,
            latency_file_prefix: self.latency,
            limit_memory: self.lim_free_mem,
            limit_memory_between_phases: self.lim_free_mem_phase,
            start_index: self.start_index,
        }
    }
}
