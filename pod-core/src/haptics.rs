//! Haptic feedback sink.
//!
//! The controller pulses once each time an item snaps into place. Pulses are
//! fire-and-forget: implementations must return immediately.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Receives snap pulses.
pub trait HapticFeedback: Send {
    /// Emit a single light impact.
    fn impact(&self);
}

/// Discards every pulse.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHaptics;

impl HapticFeedback for NoHaptics {
    fn impact(&self) {}
}

/// Records pulses as `debug` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHaptics;

impl HapticFeedback for TracingHaptics {
    fn impact(&self) {
        tracing::debug!("haptic impact");
    }
}

/// Counts pulses; clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct CountingHaptics {
    count: Arc<AtomicUsize>,
}

impl CountingHaptics {
    /// Create a counter starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pulses received so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl HapticFeedback for CountingHaptics {
    fn impact(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting_clones_share_counter() {
        let haptics = CountingHaptics::new();
        let boxed: Box<dyn HapticFeedback> = Box::new(haptics.clone());
        boxed.impact();
        boxed.impact();
        assert_eq!(haptics.count(), 2);
    }
}
