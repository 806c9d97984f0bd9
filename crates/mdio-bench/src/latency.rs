//! Per-operation latency CSVs (spec.md §6): `<prefix>-<iteration>-<op>-<rank>.csv`,
//! header `time,runtime`, one row per captured operation, written by rank 0
//! only even though every rank captures its own samples (spec.md §9's
//! "Latency output ownership" open question, resolved in DESIGN.md).

use std::fs::File;
use std::io::{self, Write};

use mdio_core::stats::LatencySample;

/// Write one CSV file for a single measured operation kind within one phase.
pub fn write_csv(prefix: &str, iteration: i64, op: &str, rank: i32, samples: &[LatencySample]) -> io::Result<()> {
    let path = format!("{prefix}-{iteration}-{op}-{rank}.csv");
    let mut file = File::create(path)?;
    writeln!(file, "time,runtime")?;
    for (time, runtime) in samples {
        writeln!(file, "{time:.7},{runtime:.4e}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_one_row_per_sample() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("lat").to_string_lossy().into_owned();
        let samples = vec![(0.0_f64, 0.000_123_4_f64), (0.5, 0.000_2)];
        write_csv(&prefix, 0, "create", 0, &samples).unwrap();

        let contents = std::fs::read_to_string(format!("{prefix}-0-create-0.csv")).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("time,runtime"));
        assert_eq!(lines.next(), Some("0.0000000,1.2340e-4"));
        assert_eq!(lines.count(), 1);
    }
}
