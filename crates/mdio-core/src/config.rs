//! The configuration record: immutable once parsed, shared by every phase
//! engine and the reporter.
//!
//! Grounded on `ior-core/src/params.rs`'s `IorParam` and
//! `mdtest-bench/src/params.rs`'s `MdtestParam` (both immutable-after-parse
//! records built once from CLI args); field list drawn from spec.md §3.

/// Benchmark configuration. Constructed once per process at startup and
/// never mutated afterward.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend_name: String,

    /// Objects per process per dataset per steady-state iteration.
    pub num: u64,
    /// Preloaded objects per process per dataset.
    pub precreate: u64,
    /// Datasets per process.
    pub dset_count: u32,
    /// Rank-shift base, >= 1 in a well-configured run.
    pub offset: i32,
    /// Steady-state repeats, >= 1.
    pub iterations: u32,
    /// Payload bytes per object.
    pub object_size: usize,

    pub run_precreate: bool,
    pub run_benchmark: bool,
    pub run_cleanup: bool,

    pub ignore_precreate_errors: bool,
    pub process_report: bool,
    pub verbosity: u8,
    pub quiet: bool,
    pub print_detailed_stats: bool,
    pub print_pattern: bool,

    pub latency_file_prefix: Option<String>,

    /// Ballast ceiling applied at startup (MiB).
    pub limit_memory: u64,
    /// Ballast ceiling applied between phases (MiB).
    pub limit_memory_between_phases: u64,

    /// Object index offset for resumed runs.
    pub start_index: i64,
}

impl Config {
    /// `true` if none of the three phase flags were explicitly requested —
    /// the caller must then enable all three (spec.md §4.5 step 5).
    pub fn no_phase_selected(&self) -> bool {
        !self.run_precreate && !self.run_benchmark && !self.run_cleanup
    }

    /// Enable all three phases. Call only when [`Config::no_phase_selected`].
    pub fn enable_all_phases(&mut self) {
        self.run_precreate = true;
        self.run_benchmark = true;
        self.run_cleanup = true;
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_name: String::new(),
            num: 0,
            precreate: 0,
            dset_count: 1,
            offset: 1,
            iterations: 1,
            object_size: 0,
            run_precreate: false,
            run_benchmark: false,
            run_cleanup: false,
            ignore_precreate_errors: false,
            process_report: false,
            verbosity: 0,
            quiet: false,
            print_detailed_stats: false,
            print_pattern: false,
            latency_file_prefix: None,
            limit_memory: 0,
            limit_memory_between_phases: 0,
            start_index: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_phases_selected_means_all_enabled() {
        let mut cfg = Config::default();
        assert!(cfg.no_phase_selected());
        cfg.enable_all_phases();
        assert!(cfg.run_precreate && cfg.run_benchmark && cfg.run_cleanup);
    }

    #[test]
    fn explicit_phase_selection_is_not_all() {
        let mut cfg = Config::default();
        cfg.run_cleanup = true;
        assert!(!cfg.no_phase_selected());
    }
}
