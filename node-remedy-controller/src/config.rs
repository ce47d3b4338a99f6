use time::ext::NumericalStdDuration as _;

use super::*;

/// Timing knobs of the remediation state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RemediationConfig {
    /// How long to wait after cordoning before assuming the watchdog has
    /// rebooted the host and deleting its node.
    pub safe_time_to_assume_node_rebooted: Duration,
    /// Upper bound on the delay between two passes over the same machine.
    pub reconcile_interval: Duration,
    /// Delay before retrying a pass that failed with anything but a conflict.
    pub error_backoff: Duration,
}

impl Default for RemediationConfig {
    fn default() -> Self {
        Self {
            safe_time_to_assume_node_rebooted: 90.std_seconds(),
            reconcile_interval: 10.std_seconds(),
            error_backoff: 30.std_seconds(),
        }
    }
}

/// Parse Go style durations such as `90s`, `1m30s` or `250ms`
pub fn parse_duration(text: &str) -> Result<Duration, String> {
    let nanos = go_parse_duration::parse_duration(text)
        .map_err(|_| format!("invalid duration {text:?}"))?;
    u64::try_from(nanos)
        .map(Duration::from_nanos)
        .map_err(|_| format!("negative duration {text:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RemediationConfig::default();

        assert_eq!(config.safe_time_to_assume_node_rebooted, 90.std_seconds());
        assert_eq!(config.reconcile_interval, 10.std_seconds());
        assert_eq!(config.error_backoff, 30.std_seconds());
    }

    #[test]
    fn parse_go_durations() {
        assert_eq!(parse_duration("90s"), Ok(90.std_seconds()));
        assert_eq!(parse_duration("1m30s"), Ok(90.std_seconds()));
        assert_eq!(parse_duration("250ms"), Ok(250.std_milliseconds()));
    }

    #[test]
    fn parse_rejects_garbage_and_negative() {
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("-5s").is_err());
    }
}
