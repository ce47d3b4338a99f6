//! Timing decisions over the remediation marker.
//!
//! The marker is the only record of when remediation started, so everything
//! here is a pure function of the marker, the configured safety window and
//! the current time.

use std::cmp;

use super::*;

/// Where a machine stands relative to its safety window
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deadline {
    /// The safety window has fully elapsed.
    Passed,
    /// The safety window elapses after the given duration.
    Pending(Duration),
    /// The marker could not be read; never act on it.
    Unparsable,
}

/// Render `now` the way the marker stores it: RFC3339, whole seconds, UTC.
///
/// Fractions round up, so a window measured from the marker never starts
/// before remediation actually did.
pub fn format_marker(now: Timestamp) -> String {
    let second = if now.subsec_nanosecond() > 0 {
        now.as_second().saturating_add(1)
    } else {
        now.as_second()
    };
    Timestamp::from_second(second).unwrap_or(now).to_string()
}

pub fn parse_marker(marker: &str) -> Result<Timestamp, k8s::jiff::Error> {
    marker.parse()
}

/// Compare `now` against a remediation that started at `marked`.
///
/// A marker in the future (clock skew between writers) only extends the wait.
pub fn deadline_at(marked: Timestamp, safe: Duration, now: Timestamp) -> Deadline {
    let elapsed = now.as_millisecond().saturating_sub(marked.as_millisecond());
    let safe = i64::try_from(safe.as_millis()).unwrap_or(i64::MAX);
    if elapsed >= safe {
        Deadline::Passed
    } else {
        let remaining = u64::try_from(safe.saturating_sub(elapsed)).unwrap_or(u64::MAX);
        Deadline::Pending(Duration::from_millis(remaining))
    }
}

pub fn deadline(marker: &str, safe: Duration, now: Timestamp) -> Deadline {
    parse_marker(marker).map_or(Deadline::Unparsable, |marked| {
        deadline_at(marked, safe, now)
    })
}

/// Delay before the next pass: never later than `interval`, never later than the deadline.
pub fn requeue_after(deadline: Deadline, interval: Duration) -> Duration {
    match deadline {
        Deadline::Pending(remaining) => cmp::min(remaining, interval),
        Deadline::Passed | Deadline::Unparsable => interval,
    }
}
