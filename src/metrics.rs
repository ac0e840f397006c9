use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing assistant activity.
#[derive(Default)]
pub struct AssistantMetrics {
    chat_requests: AtomicU64,
    greetings: AtomicU64,
    refusals: AtomicU64,
    backend_invocations: AtomicU64,
    fallbacks: AtomicU64,
    unavailable: AtomicU64,
    documents_uploaded: AtomicU64,
}

impl AssistantMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an incoming chat request before routing.
    pub fn record_chat(&self) {
        self.chat_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a chat answered with the canned greeting.
    pub fn record_greeting(&self) {
        self.greetings.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a chat refused as out of domain.
    pub fn record_refusal(&self) {
        self.refusals.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one gateway invocation and how it ended.
    ///
    /// `attempts` is the number of transports tried; anything past the first counts as a
    /// fallback.
    pub fn record_invocation(&self, attempts: usize, answered: bool) {
        self.backend_invocations.fetch_add(1, Ordering::Relaxed);
        if attempts > 1 {
            self.fallbacks.fetch_add(1, Ordering::Relaxed);
        }
        if !answered {
            self.unavailable.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a successfully stored upload.
    pub fn record_upload(&self) {
        self.documents_uploaded.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            chat_requests: self.chat_requests.load(Ordering::Relaxed),
            greetings: self.greetings.load(Ordering::Relaxed),
            refusals: self.refusals.load(Ordering::Relaxed),
            backend_invocations: self.backend_invocations.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            unavailable: self.unavailable.load(Ordering::Relaxed),
            documents_uploaded: self.documents_uploaded.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of assistant counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Chat requests received since startup.
    pub chat_requests: u64,
    /// Chats answered with the greeting response.
    pub greetings: u64,
    /// Chats refused as non-legal.
    pub refusals: u64,
    /// Calls made through the backend gateway.
    pub backend_invocations: u64,
    /// Invocations that had to try the secondary transport.
    pub fallbacks: u64,
    /// Invocations where every transport failed.
    pub unavailable: u64,
    /// Documents stored in memory.
    pub documents_uploaded: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_invocation_outcomes() {
        let metrics = AssistantMetrics::new();
        metrics.record_invocation(1, true);
        metrics.record_invocation(2, true);
        metrics.record_invocation(2, false);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.backend_invocations, 3);
        assert_eq!(snapshot.fallbacks, 2);
        assert_eq!(snapshot.unavailable, 1);
    }

    #[test]
    fn snapshot_starts_empty() {
        let metrics = AssistantMetrics::new();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }
}
