use std::cell::Cell;
use std::time::Instant;

thread_local! {
    /// Per-process monotonic epoch, lazily initialized on first call to `now()`.
    static EPOCH: Cell<Option<Instant>> = const { Cell::new(None) };
}

/// Current timestamp in seconds, monotonic, relative to the first call.
pub fn now() -> f64 {
    EPOCH.with(|cell| {
        let epoch = match cell.get() {
            Some(e) => e,
            None => {
                let e = Instant::now();
                cell.set(Some(e));
                e
            }
        };
        epoch.elapsed().as_secs_f64()
    })
}

/// A captured start point, used to compute elapsed seconds.
///
/// Reference: `original_source/src/md-real-io.c`'s `timer` + `start_timer`/`stop_timer`.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    start: Instant,
}

impl Clock {
    /// Capture the current instant as a start point.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Seconds elapsed since this clock was started.
    pub fn elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn elapsed_is_monotonic_and_nonnegative() {
        let c = Clock::start();
        sleep(Duration::from_millis(5));
        let e1 = c.elapsed();
        sleep(Duration::from_millis(5));
        let e2 = c.elapsed();
        assert!(e1 >= 0.0);
        assert!(e2 >= e1);
    }

    #[test]
    fn now_is_monotonic() {
        let a = now();
        let b = now();
        assert!(b >= a);
    }
}
