//! Stdout formatting (spec.md §6, §4.4): the startup banner, one summary
//! line per phase (shape selected by the phase name's first letter),
//! the optional detailed-stats line, per-process report lines, and the
//! closing line.
//!
//! Grounded on `mdtest-bench/src/report.rs`'s print-on-rank-0 style and
//! `original_source/src/md-real-io.c`'s `prepare_report` formatting; the
//! exact field layout follows spec.md §6 literally.

use mdio_core::access_pattern::{read_rank, write_rank};
use mdio_core::backend::BackendOptionSpec;
use mdio_core::{Config, PhaseStats};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `MD-REAL-IO total objects: <N> workingset size: <X> MiB (version: <v>) time: <timestamp>`
pub fn print_banner(cfg: &Config, size: i32) {
    let total_objects =
        size as u64 * cfg.dset_count as u64 * (cfg.precreate + cfg.num * cfg.iterations as u64);
    let workingset_mib = (total_objects as f64 * cfg.object_size as f64) / (1024.0 * 1024.0);
    println!(
        "MD-REAL-IO total objects: {total_objects} workingset size: {workingset_mib:.2} MiB (version: {VERSION}) time: {}",
        timestamp()
    );
}

/// `Total runtime: <T>s time: <timestamp>`
pub fn print_closing(total_runtime: f64) {
    println!("Total runtime: {total_runtime:.3}s time: {}", timestamp());
}

/// The write_rank/read_rank table for every (rank, dataset) pair, printed
/// when `--print-pattern` is set, before the backend is ever touched.
pub fn print_access_pattern(cfg: &Config, size: i32) {
    println!("access pattern (offset={}):", cfg.offset);
    for r in 0..size {
        for d in 0..cfg.dset_count as i32 {
            let w = write_rank(r, d, cfg.offset, size);
            let rd = read_rank(r, d, cfg.offset, size);
            println!("  rank {r} dataset {d}: writes -> {w}, reads <- {rd}");
        }
    }
}

/// `Plugin options for interface <name>`, one line per descriptor declared
/// by [`mdio_core::backend::Backend::options`]. Mirrors
/// `original_source/option.c::print_help_section`'s flag-name-padded-to-
/// column-30-then-help layout. No-op when the backend declares no options.
pub fn print_backend_options(name: &str, options: &[BackendOptionSpec]) {
    if options.is_empty() {
        return;
    }
    println!("\nPlugin options for interface {name}");
    for opt in options {
        let flag = if opt.takes_value {
            format!("--{name}.{} <value>", opt.name)
        } else {
            format!("--{name}.{}", opt.name)
        };
        let pad = 30usize.saturating_sub(flag.len()).max(1);
        println!("{flag}{}{}", " ".repeat(pad), opt.help);
    }
}

/// One summary line for a completed phase, selected by the phase name's
/// first letter (spec.md §6): `p`recreate, `b`enchmark, `c`leanup.
pub fn phase_summary_line(phase: &str, stats: &PhaseStats, cfg: &Config) -> String {
    let t = stats.wall_clock_post_barrier;
    let errs = stats.total_errors();
    let err_suffix = if errs > 0 {
        format!("({errs} errs!!!)")
    } else {
        format!("({errs} errs)")
    };

    match phase.chars().next() {
        Some('p') => {
            let n_d = stats.dataset_create.success;
            let n_o = stats.object_create.success;
            let rate = per_sec(n_d + n_o, t);
            let dset_rate = per_sec(n_d, t);
            let obj_rate = per_sec(n_o, t);
            let mib_rate = mib_per_sec(n_o, cfg.object_size, t);
            format!(
                "precreate {t:.3}s {rate:.3} iops/s {n_d} dset {n_o} obj {dset_rate:.3} dset/s {obj_rate:.3} obj/s {mib_rate:.3} Mib/s {err_suffix}"
            )
        }
        Some('b') => {
            let n_o = stats.object_create.success;
            let four_ops = stats.object_create.success
                + stats.object_stat.success
                + stats.object_read.success
                + stats.object_delete.success;
            let rate = per_sec(four_ops, t);
            let throughput_objs = stats.object_create.success + stats.object_read.success;
            let obj_rate = per_sec(throughput_objs, t);
            let mib_rate = mib_per_sec(throughput_objs, cfg.object_size, t);
            format!(
                "benchmark {t:.3}s {rate:.3} iops/s {n_o} obj {obj_rate:.3} obj/s {mib_rate:.3} Mib/s {err_suffix}"
            )
        }
        _ => {
            let n_o = stats.object_delete.success;
            let n_d = stats.dataset_delete.success;
            let rate = per_sec(n_o + n_d, t);
            let obj_rate = per_sec(n_o, t);
            let dset_rate = per_sec(n_d, t);
            format!(
                "cleanup {t:.3}s {rate:.3} iops/s {n_o} obj {n_d} dset {obj_rate:.3} obj/s {dset_rate:.3} dset/s {err_suffix}"
            )
        }
    }
}

fn per_sec(count: u64, seconds: f64) -> f64 {
    if seconds > 0.0 { count as f64 / seconds } else { 0.0 }
}

fn mib_per_sec(object_count: u64, object_size: usize, seconds: f64) -> f64 {
    let mib = (object_count as f64 * object_size as f64) / (1024.0 * 1024.0);
    if seconds > 0.0 { mib / seconds } else { 0.0 }
}

/// `phase\t\td name\tcreate\tdelete\tob nam\tcreate\tread\tstat\tdelete\tt_inc_b\tt_no_bar\tthp`
pub fn print_detailed_stats_header() {
    println!("phase\t\td name\tcreate\tdelete\tob nam\tcreate\tread\tstat\tdelete\tt_inc_b\tt_no_bar\tthp");
}

/// One tab-delimited line with all eight counter pairs plus both
/// wall-clocks and throughput, for `--print-detailed-stats`.
pub fn detailed_stats_line(phase: &str, stats: &PhaseStats, cfg: &Config) -> String {
    let throughput = mib_per_sec(
        stats.object_create.success + stats.object_read.success,
        cfg.object_size,
        stats.wall_clock_post_barrier,
    );
    format!(
        "{phase}\t\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.3}\t{:.3}\t{:.3}",
        pair(stats.dataset_name),
        pair(stats.dataset_create),
        pair(stats.dataset_delete),
        pair(stats.object_name),
        pair(stats.object_create),
        pair(stats.object_read),
        pair(stats.object_stat),
        pair(stats.object_delete),
        stats.wall_clock_post_barrier,
        stats.wall_clock_pre_barrier,
        throughput,
    )
}

fn pair(c: mdio_core::OpCounter) -> String {
    format!("{}/{}", c.success, c.error)
}

/// `<rank>: <line>`, used for the optional per-process report block.
pub fn process_report_line(rank: i32, line: &str) -> String {
    format!("{rank}: {line}")
}

/// Human-readable timestamp, shelling out to `ctime(3)` the way the raw
/// POSIX backend already reaches for `libc` instead of a date/time crate.
fn timestamp() -> String {
    unsafe {
        let t = libc::time(std::ptr::null_mut());
        let c_str = libc::ctime(&t);
        if c_str.is_null() {
            return String::from("(unknown)");
        }
        std::ffi::CStr::from_ptr(c_str)
            .to_string_lossy()
            .trim_end()
            .to_string()
    }
}
