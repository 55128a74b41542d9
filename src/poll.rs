use anyhow::{Result, bail};
use std::thread;
use std::time::{Duration, Instant};

pub const POLL_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(20);

/// Polls `status` every 500 ms until `predicate` accepts the trimmed output
/// or `deadline` of wall-clock time has elapsed. Errors from `status` are
/// propagated immediately, the in-flight invocation is never killed.
pub fn await_condition<F, P>(what: &str, deadline: Duration, mut status: F, predicate: P) -> Result<()>
where
    F: FnMut() -> Result<String>,
    P: Fn(&str) -> bool,
{
    let start = Instant::now();
    loop {
        let output = status()?;
        if predicate(output.trim()) {
            return Ok(());
        }
        if start.elapsed() >= deadline {
            bail!(
                "Timed out after {}s waiting for {what}",
                deadline.as_secs()
            );
        }
        thread::sleep(POLL_INTERVAL);
    }
}
