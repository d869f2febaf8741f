#![deny(warnings)]
#![warn(clippy::pedantic)]

use std::hint::black_box;
use std::time::{Duration, Instant};

/// Fraction of wall-clock time a spin loop actively computes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DutyCycle {
    Full,
    Half,
}

/// Length of one busy slice, and of the sleep that follows it under
/// `DutyCycle::Half`.
const HALF_LOAD_PAUSE: Duration = Duration::from_micros(200);

/// Busy-loops trivial arithmetic for `duration` wall-clock time.
///
/// Work is paced in ~200µs wall-clock slices. Under `DutyCycle::Half` an
/// equal sleep follows every slice, so consumed CPU time lands near half the
/// wall-clock run without shortening it.
pub fn spin_cpu(duration: Duration, duty: DutyCycle) {
    let start = Instant::now();
    let mut counter: u64 = 0;
    while start.elapsed() < duration {
        let spin_until = Instant::now() + HALF_LOAD_PAUSE;
        while Instant::now() < spin_until {
            counter = black_box(counter.wrapping_add(1));
        }
        if duty == DutyCycle::Half {
            std::thread::sleep(HALF_LOAD_PAUSE);
        }
    }
    black_box(counter);
}

/// Paces CPU use per one-second tick: busy for `percent`% of the tick,
/// asleep for the remainder. Runs for `total_secs` ticks.
pub fn spin_cpu_percentage(total_secs: u64, percent: u32) {
    let percent = percent.clamp(1, 100);
    let busy = Duration::from_millis(u64::from(percent) * 10);
    let tick_len = Duration::from_secs(1);
    for _ in 0..total_secs {
        let tick = Instant::now();
        let mut value = 1.0_f64;
        while tick.elapsed() < busy {
            value = black_box((value * 1.000_000_1).sqrt());
        }
        let elapsed = tick.elapsed();
        if elapsed < tick_len {
            std::thread::sleep(tick_len - elapsed);
        }
    }
}
