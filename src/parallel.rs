#![deny(warnings)]
#![warn(clippy::pedantic)]

use anyhow::{anyhow, Result as AnyResult};

/// Launches `workers` concurrent invocations of `pattern` and blocks until
/// every one has terminated.
///
/// No return values are aggregated; this is purely a synchronization barrier.
/// The first worker failure (or panic) is reported to the caller, but only
/// after all siblings have been joined, so no worker outlives the call.
pub fn run_concurrently<F>(pattern: F, workers: usize) -> AnyResult<()>
where
    F: Fn() -> AnyResult<()> + Sync,
{
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers).map(|_| scope.spawn(|| pattern())).collect();
        let mut first_err = None;
        for handle in handles {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                }
                Err(_) => {
                    if first_err.is_none() {
                        first_err = Some(anyhow!("worker panicked"));
                    }
                }
            }
        }
        first_err.map_or(Ok(()), Err)
    })
}
