//! Pity counter

use serde::{Deserialize, Serialize};

/// Draws since the last top-tier result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PityState {
    counter: u32,
}

impl PityState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a persisted counter
    pub fn with_counter(counter: u32) -> Self {
        Self { counter }
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Record one decided draw. Call exactly once per draw, after the tier
    /// decision and before the next probability computation.
    pub fn observe(&mut self, is_top_tier: bool) {
        self.counter = self.counter.saturating_add(1);
        if is_top_tier {
            self.counter = 0;
        }
    }

    pub fn reset(&mut self) {
        self.counter = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_increments_and_resets() {
        let mut pity = PityState::new();
        pity.observe(false);
        pity.observe(false);
        assert_eq!(pity.counter(), 2);

        pity.observe(true);
        assert_eq!(pity.counter(), 0);
    }

    #[test]
    fn test_serializes_as_plain_number() {
        let pity = PityState::with_counter(42);
        assert_eq!(serde_json::to_string(&pity).unwrap(), "42");
        let back: PityState = serde_json::from_str("7").unwrap();
        assert_eq!(back.counter(), 7);
    }
}
