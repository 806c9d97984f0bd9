//! Memory ballast: grow a buffer that consumes free RAM to a configured
//! ceiling, then release it, so the steady-state and cleanup phases are not
//! helped by page cache left over from a previous phase.
//!
//! Grounded on `original_source/src/memory.c`'s `mem_preallocate` /
//! `mem_free_preallocated` (`/proc/meminfo`-driven `MemFree + Cached +
//! Buffers`, grown page-by-page until under the ceiling). Reworked as an
//! owned growable buffer instead of a realloc'd raw pointer threaded through
//! an out-parameter.

use std::fs;
use std::io;

/// Largest single growth step, mirroring the C source's `pagesize * 1000`
/// per-iteration cap so a single call to `getFreeRamKB` never goes far out
/// of date mid-allocation.
const MAX_CHUNK_BYTES: u64 = 4 * 1024 * 1024;

/// A preallocated buffer consuming free RAM between phases. Empty (no
/// allocation) when constructed.
#[derive(Debug, Default)]
pub struct MemoryBallast {
    buf: Vec<u8>,
}

impl MemoryBallast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocated_bytes(&self) -> usize {
        self.buf.len()
    }

    /// Grow the ballast until free RAM is at or below `ceiling_mib` MiB.
    /// `ceiling_mib == 0` disables the ballast entirely (matches the C
    /// source's early return).
    pub fn grow_to_ceiling(&mut self, ceiling_mib: u64, verbose: bool) -> io::Result<()> {
        if ceiling_mib == 0 {
            return Ok(());
        }
        let ceiling_bytes = ceiling_mib * 1024 * 1024;
        let page_size = page_size();

        loop {
            let free_bytes = free_ram_bytes()?;
            if verbose {
                eprintln!(
                    "memory ballast: free={free_bytes} goal={ceiling_bytes} allocated={}",
                    self.buf.len()
                );
            }
            if free_bytes <= ceiling_bytes {
                break;
            }
            let delta = free_bytes - ceiling_bytes;
            let chunk = delta.min(MAX_CHUNK_BYTES).max(page_size as u64);
            let old_len = self.buf.len();
            let new_len = old_len + chunk as usize;
            self.buf.resize(new_len, 0);
            for p in (old_len..new_len).step_by(page_size) {
                self.buf[p] = 1;
            }
        }
        Ok(())
    }

    /// Release the ballast, freeing its memory immediately.
    pub fn release(&mut self) {
        self.buf = Vec::new();
    }
}

fn page_size() -> usize {
    // SAFETY: sysconf(_SC_PAGESIZE) has no preconditions and never fails in
    // practice on any platform this crate targets.
    let n = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if n > 0 { n as usize } else { 4096 }
}

fn free_ram_bytes() -> io::Result<u64> {
    let meminfo = fs::read_to_string("/proc/meminfo")?;
    let mem_free = meminfo_value_kb(&meminfo, "MemFree")?;
    let cached = meminfo_value_kb(&meminfo, "Cached")?;
    let buffers = meminfo_value_kb(&meminfo, "Buffers")?;
    Ok((mem_free + cached + buffers) * 1024)
}

fn meminfo_value_kb(meminfo: &str, key: &str) -> io::Result<u64> {
    for line in meminfo.lines() {
        if let Some(rest) = line.strip_prefix(key) {
            let rest = rest.trim_start_matches(':').trim();
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            return digits
                .parse()
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, format!("malformed {key} in /proc/meminfo")));
        }
    }
    Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("{key} not found in /proc/meminfo"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_ceiling_is_a_no_op() {
        let mut ballast = MemoryBallast::new();
        ballast.grow_to_ceiling(0, false).unwrap();
        assert_eq!(ballast.allocated_bytes(), 0);
    }

    #[test]
    fn release_empties_the_buffer() {
        let mut ballast = MemoryBallast::new();
        ballast.buf = vec![1u8; 4096];
        ballast.release();
        assert_eq!(ballast.allocated_bytes(), 0);
    }

    #[test]
    fn parses_meminfo_fields() {
        let sample = "MemTotal:       16384000 kB\nMemFree:         1024000 kB\nCached:           512000 kB\nBuffers:           20000 kB\n";
        assert_eq!(meminfo_value_kb(sample, "MemFree").unwrap(), 1024000);
        assert_eq!(meminfo_value_kb(sample, "Cached").unwrap(), 512000);
        assert_eq!(meminfo_value_kb(sample, "Buffers").unwrap(), 20000);
    }
}
