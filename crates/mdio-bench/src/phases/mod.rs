pub mod cleanup;
pub mod precreate;
pub mod steady_state;

use mdio_core::stats::LatencySample;
use mdio_core::{now, Clock};

/// Capture a `(time_since_global_start, Clock)` pair just before an
/// operation, when latency capture is enabled. `None` otherwise.
pub(crate) fn maybe_start(capture: bool) -> Option<(f64, Clock)> {
    capture.then(|| (now(), Clock::start()))
}

/// Finish a latency capture started by [`maybe_start`], pushing the sample
/// onto `seq`. No-op if capture wasn't enabled.
pub(crate) fn maybe_finish(seq: &mut Vec<LatencySample>, start: Option<(f64, Clock)>) {
    if let Some((t0, clock)) = start {
        seq.push((t0, clock.elapsed()));
    }
}
