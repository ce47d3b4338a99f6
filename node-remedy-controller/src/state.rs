use super::*;

use clock::Deadline;

/// Remediation progress of a machine, recomputed from scratch on every pass
///
/// Nothing but the machine annotations and the existence of its node feeds
/// into this, which is what lets a restarted controller pick up where the
/// previous one stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemediationState {
    /// No marker on the machine.
    Healthy,
    /// Marker present but empty: flagged by the detector, not acted on yet.
    UnhealthyNew,
    /// Node cordoned, safety window still open. `remaining` is `None` when
    /// the marker cannot be parsed.
    Waiting { remaining: Option<Duration> },
    /// Safety window elapsed and the stale node is still registered.
    Timeout,
    /// Node deleted, waiting for it to register again.
    AwaitingRecovery,
    /// Node registered again after remediation started.
    Recovered,
}

/// What a single pass does for a given state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    FeedWatchdog,
    CordonAndMark,
    Requeue(Duration),
    DeleteNode,
    ClearAnnotations,
}

impl RemediationState {
    pub fn classify(
        marker: Option<&str>,
        node: Option<&corev1::Node>,
        safe: Duration,
        now: Timestamp,
    ) -> Self {
        let Some(marker) = marker else {
            return Self::Healthy;
        };

        if marker.is_empty() {
            return Self::UnhealthyNew;
        }

        let Some(node) = node else {
            return Self::AwaitingRecovery;
        };

        let Ok(marked) = clock::parse_marker(marker) else {
            return Self::Waiting { remaining: None };
        };

        if node.is_created_after(marked) {
            return Self::Recovered;
        }

        match clock::deadline_at(marked, safe, now) {
            Deadline::Passed => Self::Timeout,
            Deadline::Pending(remaining) => Self::Waiting {
                remaining: Some(remaining),
            },
            Deadline::Unparsable => Self::Waiting { remaining: None },
        }
    }

    pub fn step(self, reconcile_interval: Duration) -> Step {
        match self {
            Self::Healthy => Step::FeedWatchdog,
            Self::UnhealthyNew => Step::CordonAndMark,
            Self::Waiting {
                remaining: Some(remaining),
            } => Step::Requeue(clock::requeue_after(
                Deadline::Pending(remaining),
                reconcile_interval,
            )),
            Self::Waiting { remaining: None } | Self::AwaitingRecovery => {
                Step::Requeue(reconcile_interval)
            }
            Self::Timeout => Step::DeleteNode,
            Self::Recovered => Step::ClearAnnotations,
        }
    }

    pub fn is_remediating(self) -> bool {
        !matches!(self, Self::Healthy)
    }
}
