//! Counters describing a session's edit traffic.
//!
//! [`SessionMetrics`] is updated by the session as edits start and
//! finish; read it through
//! [`Session::metrics`](crate::session::Session::metrics).

/// Cumulative edit and service statistics for one session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionMetrics {
    /// Edits accepted by `submit`.
    pub edits_submitted: u64,
    /// Edits that finished with a grid change.
    pub edits_applied: u64,
    /// Edits that finished without changing anything.
    pub edits_noop: u64,
    /// Edits that finished using a fallback after a service problem.
    pub edits_degraded: u64,
    /// Edits that finished with an error.
    pub edits_failed: u64,
    /// Edits rejected because another was in flight.
    pub busy_rejections: u64,
    /// Requests handed to the service worker.
    pub service_requests: u64,
    /// Service replies dropped as stale.
    pub stale_replies: u64,
    /// Time the service spent on the latest reply, in microseconds.
    pub last_service_us: u64,
    /// History snapshots saved automatically.
    pub snapshots_saved: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = SessionMetrics::default();
        assert_eq!(m.edits_submitted, 0);
        assert_eq!(m.edits_applied, 0);
        assert_eq!(m.edits_noop, 0);
        assert_eq!(m.edits_degraded, 0);
        assert_eq!(m.edits_failed, 0);
        assert_eq!(m.busy_rejections, 0);
        assert_eq!(m.service_requests, 0);
        assert_eq!(m.stale_replies, 0);
        assert_eq!(m.last_service_us, 0);
        assert_eq!(m.snapshots_saved, 0);
    }
}
