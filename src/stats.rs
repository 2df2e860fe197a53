//! Request counters for the geocoding client.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Counts provider requests made by one [`crate::GeocodeClient`].
#[derive(Debug)]
pub struct RequestStats {
    started: Instant,
    forward_requests: AtomicUsize,
    reverse_requests: AtomicUsize,
    failed_requests: AtomicUsize,
    total_request_time: AtomicUsize, // microseconds
}

impl RequestStats {
    /// Create a new set of zeroed counters
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            forward_requests: AtomicUsize::new(0),
            reverse_requests: AtomicUsize::new(0),
            failed_requests: AtomicUsize::new(0),
            total_request_time: AtomicUsize::new(0),
        }
    }

    /// Record a forward (free text) search
    pub fn record_forward(&self, duration: Duration) {
        self.forward_requests.fetch_add(1, Ordering::Relaxed);
        self.add_time(duration);
    }

    /// Record a reverse (coordinate) search
    pub fn record_reverse(&self, duration: Duration) {
        self.reverse_requests.fetch_add(1, Ordering::Relaxed);
        self.add_time(duration);
    }

    /// Record a request that ended in an error
    pub fn record_failure(&self) {
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
    }

    fn add_time(&self, duration: Duration) {
        let micros = usize::try_from(duration.as_micros()).unwrap_or(usize::MAX);
        self.total_request_time.fetch_add(micros, Ordering::Relaxed);
    }

    /// Get a snapshot of the counters
    pub fn snapshot(&self) -> StatsSnapshot {
        let forward = self.forward_requests.load(Ordering::Relaxed);
        let reverse = self.reverse_requests.load(Ordering::Relaxed);
        let total_us = self.total_request_time.load(Ordering::Relaxed);
        let count = forward + reverse;

        StatsSnapshot {
            forward_requests: forward,
            reverse_requests: reverse,
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            uptime: self.started.elapsed(),
            average_request_time: if count > 0 {
                Duration::from_micros((total_us / count) as u64)
            } else {
                Duration::ZERO
            },
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.forward_requests.store(0, Ordering::Relaxed);
        self.reverse_requests.store(0, Ordering::Relaxed);
        self.failed_requests.store(0, Ordering::Relaxed);
        self.total_request_time.store(0, Ordering::Relaxed);
    }
}

impl Default for RequestStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`RequestStats`].
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    /// Forward searches issued, including failed ones
    pub forward_requests: usize,
    /// Reverse searches issued, including failed ones
    pub reverse_requests: usize,
    /// Requests that returned an error
    pub failed_requests: usize,
    /// Time since the counters were created
    pub uptime: Duration,
    /// Mean round trip over all requests
    pub average_request_time: Duration,
}

impl StatsSnapshot {
    /// Total requests of either kind
    pub fn total_requests(&self) -> usize {
        self.forward_requests + self.reverse_requests
    }
}
